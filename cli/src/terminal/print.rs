use colored::*;
use safenet_core::{Outcome, Report};

use crate::terminal::{colors, format};

pub const TOTAL_WIDTH: usize = 64;
const TREE_KEY_WIDTH: usize = 7;

pub fn print(msg: &str) {
    println!("{msg}");
}

pub fn header(msg: &str, quiet: bool) {
    if quiet {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn tree_head(idx: usize, name: &str, kind: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let output: String = format!(
        "{} {} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY),
        format!("({kind})").color(colors::SEPARATOR)
    );
    print(&output);
}

pub fn as_tree_one_level(key_value_pair: Vec<(String, ColoredString)>) {
    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let last: bool = i + 1 == key_value_pair.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        let dots: String = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len()));
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        );
        print(&output);
    }
}

pub fn centerln(msg: &str, visible_width: usize) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(visible_width) / 2);
    print(&format!("{}{}", space, msg));
}

/// Per-target tree followed by a one-line summary.
pub fn report(report: &Report) {
    if report.is_empty() {
        header("nothing to check", false);
        return;
    }

    header("safety check results", false);
    for (idx, result) in report.results().iter().enumerate() {
        tree_head(idx, &result.name, &result.kind.to_string());
        as_tree_one_level(format::result_to_details(result));
        if idx + 1 != report.len() {
            print("");
        }
    }

    fat_separator();
    summary(report);
}

fn summary(report: &Report) {
    let plain: String = summary_line(report);
    let colored: ColoredString = match report.outcome() {
        Outcome::Pass => plain.green().bold(),
        Outcome::Fail => plain.red().bold(),
    };
    centerln(&colored.to_string(), plain.chars().count());
}

fn summary_line(report: &Report) -> String {
    let verdict: &str = match report.outcome() {
        Outcome::Pass => "PASS",
        Outcome::Fail => "FAIL",
    };
    format!(
        "{verdict}: {} safe, {} unsafe, {} errors in {:.2}s",
        report.safe_count(),
        report.unsafe_count(),
        report.error_count(),
        report.elapsed().as_secs_f64()
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

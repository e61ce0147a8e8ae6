use colored::*;
use safenet_core::CheckResult;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn expectation_str(expected_safe: bool) -> &'static str {
    if expected_safe { "reachable" } else { "blocked" }
}

pub fn observation_str(result: &CheckResult) -> &'static str {
    match (&result.error, result.available) {
        (Some(_), _) => "no answer (probe failed)",
        (None, true) => "reachable",
        (None, false) => "blocked",
    }
}

pub fn verdict_to_colored(result: &CheckResult) -> ColoredString {
    match (&result.error, result.safe) {
        (Some(_), true) => "SAFE (unverified)".yellow().bold(),
        (Some(_), false) => "UNSAFE (unverified)".red().bold(),
        (None, true) => "SAFE".green().bold(),
        (None, false) => "UNSAFE".red().bold(),
    }
}

pub fn result_to_details(result: &CheckResult) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("Address".to_string(), result.address.color(colors::ADDRESS)),
        (
            "Expects".to_string(),
            expectation_str(result.expected_safe).normal(),
        ),
        ("Observe".to_string(), observation_str(result).normal()),
        ("Verdict".to_string(), verdict_to_colored(result)),
    ];

    if let Some(error) = &result.error {
        details.push(("Error".to_string(), error.to_string().red()));
    }

    details
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

use safenet_common::config::Config;
use safenet_core::{Checker, Outcome, target};
use tracing::{info, warn};

use crate::terminal::print;

pub async fn check(cfg: &Config, quiet: bool) -> anyhow::Result<Outcome> {
    if !cfg.systems.is_empty() && !is_root::is_root() {
        warn!("ICMP checks need raw socket privileges; system targets will likely report errors");
    }

    let targets = target::build_targets(cfg)?;
    if targets.is_empty() {
        warn!("No targets configured");
    }

    info!("starting scan");
    let report = Checker::new(&cfg.checks).run(targets).await;
    info!("scan complete");

    if !quiet {
        print::report(&report);
    }

    Ok(report.outcome())
}

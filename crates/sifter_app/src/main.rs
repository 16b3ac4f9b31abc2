//! Demo binary: run one filtering session over listing HTML loaded from
//! disk, with optional scripted continuation chunks standing in for the
//! load-more pagination, and print the status stream.

mod controller;
mod logging;
mod monitor;
mod prefs;
mod relay;
mod tabs;

use std::fs;
use std::path::Path;

use anyhow::Context;
use sifter_core::Report;
use sifter_engine::{HtmlPageDriver, ScriptedMoreSource};

use controller::ControllerRuntime;
use monitor::MonitorRuntime;
use prefs::PrefsStore;
use tabs::FixedTab;

const DEMO_TAB: u32 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::Terminal);

    let mut args = std::env::args().skip(1);
    let Some(listing_path) = args.next() else {
        anyhow::bail!("usage: sifter_app <listing.html> [chunk.html ...]");
    };
    let listing = fs::read_to_string(&listing_path)
        .with_context(|| format!("reading listing from {listing_path}"))?;
    let chunks = args
        .map(|path| fs::read_to_string(&path).with_context(|| format!("reading chunk from {path}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let prefs = PrefsStore::new(Path::new("."));
    let (controller_end, monitor_end) = relay::relay();

    let driver = HtmlPageDriver::from_html(&listing, Box::new(ScriptedMoreSource::new(chunks)));
    let runtime = MonitorRuntime::new(
        Box::new(driver),
        monitor_end,
        prefs.clone(),
        Some(DEMO_TAB),
    );
    let monitor = tokio::spawn(runtime.run());

    let mut controller = ControllerRuntime::new(controller_end, prefs);
    controller.open(&FixedTab(DEMO_TAB));
    controller.action_clicked();
    println!("{}", controller.view().status_line);
    // No further commands: the session runs to completion on its own.
    controller.close();

    while let Some(report) = controller.recv_report().await {
        if let Report::UpdateStatus { .. } = report {
            println!("{}", controller.view().status_line);
        }
    }

    monitor
        .await
        .context("monitor runtime panicked")?;
    Ok(())
}

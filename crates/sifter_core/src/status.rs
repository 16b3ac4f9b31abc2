//! Status line formatting.
//!
//! Localization is an external concern; the English templates live here as
//! the single formatting point.

use crate::monitor::PageCounts;

/// The label attached to highlighted products, derived from the threshold
/// that admitted them.
pub fn discount_label(threshold: u8) -> String {
    format!("{threshold}%+ OFF")
}

pub(crate) fn loading() -> String {
    "Loading products...".to_string()
}

pub(crate) fn resuming() -> String {
    "Resuming...".to_string()
}

pub(crate) fn stopped_line() -> String {
    "Stopped".to_string()
}

pub(crate) fn loading_and_filtering() -> String {
    "Loading and filtering...".to_string()
}

pub(crate) fn discount_updated(threshold: u8) -> String {
    format!("Minimum discount updated to {threshold}%")
}

pub(crate) fn currently_filtering(threshold: u8) -> String {
    format!("Currently filtering: {threshold}%+ discount")
}

pub(crate) fn progress(counts: PageCounts, threshold: u8) -> String {
    format!(
        "Loading products... ({} of {} total, {} with {}%+ discount)",
        counts.pending,
        counts.total.unwrap_or(0),
        counts.highlighted,
        threshold
    )
}

pub(crate) fn stopped_with_progress(counts: PageCounts, threshold: u8) -> String {
    format!(
        "Stopped: {} of {} loaded, {} with {}%+ discount",
        counts.pending,
        counts.total.unwrap_or(0),
        counts.highlighted,
        threshold
    )
}

fn completed(counts: PageCounts, threshold: u8) -> String {
    format!(
        "Loaded {} products. Found {} with {}%+ discount.",
        counts.pending, counts.highlighted, threshold
    )
}

/// Status line for the current session: progress while loading, a summary
/// once finished. A finished session with nothing found stays silent.
pub(crate) fn session_status(loading: bool, counts: PageCounts, threshold: u8) -> Option<String> {
    if loading {
        Some(progress(counts, threshold))
    } else if counts.highlighted > 0 {
        Some(completed(counts, threshold))
    } else {
        None
    }
}

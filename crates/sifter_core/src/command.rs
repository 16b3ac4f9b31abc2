use serde::{Deserialize, Serialize};

/// Identity of the browser tab a monitor instance works for.
pub type TabId = u32;

/// Controller → monitor commands.
///
/// One variant per relay action; matching is exhaustive so a new command
/// cannot be silently dropped by either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Start a loading session.
    #[serde(rename_all = "camelCase")]
    LoadAllProducts {
        optimize_memory: bool,
        /// `None` keeps the monitor's current threshold.
        min_discount_percentage: Option<u8>,
    },
    /// Pause the running session; the pending tick defers itself.
    StopLoading,
    /// Resume a paused session.
    ResumeLoading,
    /// Live threshold change; also triggers a preference write when the
    /// controller knows its tab.
    #[serde(rename_all = "camelCase")]
    UpdateDiscount {
        min_discount_percentage: u8,
        #[serde(rename = "tabId")]
        tab: Option<TabId>,
    },
    /// Ask the monitor to report its current state and status line.
    GetStatus,
    /// Silent state seed on controller startup; no reclassification.
    #[serde(rename_all = "camelCase")]
    InitWithSettings {
        min_discount_percentage: Option<u8>,
        optimize_memory: Option<bool>,
    },
}

/// Monitor → controller reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Report {
    /// Free-text status line for the controller to display.
    UpdateStatus { message: String },
    /// State sync for the controller's action button and threshold field.
    #[serde(rename_all = "camelCase")]
    UpdateState {
        is_loading: bool,
        is_stopped: bool,
        min_discount_percentage: u8,
    },
}

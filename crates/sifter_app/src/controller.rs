//! The controller runtime: binds the popup state machine to the relay and
//! the preference store, and keeps the rendered view in one place.

use sifter_core::{
    ButtonLabel, ControllerEffect, ControllerEvent, ControllerState, Report,
    DEFAULT_MIN_DISCOUNT,
};
use sift_logging::{sift_error, sift_info};

use crate::prefs::PrefsStore;
use crate::relay::ControllerEnd;
use crate::tabs::TabResolver;

/// What the popup currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub status_line: String,
    pub button: ButtonLabel,
    pub discount_field: u8,
    pub optimize_field: bool,
}

impl Default for PopupView {
    fn default() -> Self {
        Self {
            status_line: String::new(),
            button: ButtonLabel::LoadAndFilter,
            discount_field: DEFAULT_MIN_DISCOUNT,
            optimize_field: false,
        }
    }
}

pub struct ControllerRuntime {
    state: ControllerState,
    relay: ControllerEnd,
    prefs: PrefsStore,
    view: PopupView,
}

impl ControllerRuntime {
    pub fn new(relay: ControllerEnd, prefs: PrefsStore) -> Self {
        Self {
            state: ControllerState::new(),
            relay,
            prefs,
            view: PopupView::default(),
        }
    }

    /// The popup opened: resolve the tab, restore its saved preferences and
    /// seed the monitor.
    pub fn open(&mut self, resolver: &dyn TabResolver) {
        let tab = resolver.active_tab();
        let saved = tab.map(|tab| self.prefs.tab_prefs(tab)).unwrap_or_default();
        self.apply(ControllerEvent::Opened {
            tab,
            saved_discount: saved.discount,
            saved_optimize: saved.optimize,
        });
    }

    pub fn action_clicked(&mut self) {
        self.apply(ControllerEvent::ActionClicked);
    }

    pub fn submit_discount(&mut self, value: i64) {
        self.apply(ControllerEvent::DiscountSubmitted { value });
    }

    pub fn toggle_optimize(&mut self, enabled: bool) {
        self.apply(ControllerEvent::OptimizeToggled { enabled });
    }

    /// Wait for the next monitor report and apply it. `None` once the
    /// monitor has exited.
    pub async fn recv_report(&mut self) -> Option<Report> {
        let report = self.relay.recv_report().await?;
        self.apply(ControllerEvent::ReportReceived(report.clone()));
        Some(report)
    }

    /// Stop sending commands, the way a closed popup does.
    pub fn close(&mut self) {
        self.relay.close();
    }

    pub fn view(&self) -> &PopupView {
        &self.view
    }

    fn apply(&mut self, event: ControllerEvent) {
        for effect in self.state.step(event) {
            match effect {
                ControllerEffect::Send(command) => self.relay.send(command),
                ControllerEffect::SavePreferences {
                    tab,
                    min_discount_percentage,
                    optimize_memory,
                } => {
                    if let Err(err) =
                        self.prefs
                            .save_tab_prefs(tab, min_discount_percentage, optimize_memory)
                    {
                        sift_error!("failed to persist preferences for tab {}: {}", tab, err);
                    }
                }
                ControllerEffect::SetStatusLine(message) => {
                    sift_info!("status: {}", message);
                    self.view.status_line = message;
                }
                ControllerEffect::SetButton(label) => self.view.button = label,
                ControllerEffect::SetDiscountField(value) => self.view.discount_field = value,
                ControllerEffect::SetOptimizeField(enabled) => self.view.optimize_field = enabled,
            }
        }
    }
}

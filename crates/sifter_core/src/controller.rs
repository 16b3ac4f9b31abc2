//! Popup controller state machine.
//!
//! Owns the 3-way action button, the threshold field and the
//! memory-optimization checkbox. The popup's DOM binding is an external
//! collaborator; this machine consumes user intents and monitor reports and
//! describes what the binding layer should do about them.

use crate::command::{Command, Report, TabId};
use crate::monitor::DEFAULT_MIN_DISCOUNT;
use crate::status;

/// What the action button should read, mirroring the monitor's
/// Idle/Loading/Stopped states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLabel {
    LoadAndFilter,
    Stop,
    Resume,
}

/// User intents and relay traffic reaching the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The popup opened: the tab was resolved and its saved preferences
    /// loaded (both may be absent).
    Opened {
        tab: Option<TabId>,
        saved_discount: Option<u8>,
        saved_optimize: Option<bool>,
    },
    /// The action button was clicked.
    ActionClicked,
    /// The threshold field was submitted with this raw value.
    DiscountSubmitted { value: i64 },
    /// The memory-optimization checkbox changed.
    OptimizeToggled { enabled: bool },
    /// A monitor report arrived on the relay.
    ReportReceived(Report),
}

/// Work the binding layer must perform for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEffect {
    /// Send a command to the monitor. Only emitted when a tab is known.
    Send(Command),
    /// Persist the current preferences under the tab's key.
    SavePreferences {
        tab: TabId,
        min_discount_percentage: u8,
        optimize_memory: bool,
    },
    /// Replace the status line.
    SetStatusLine(String),
    /// Update the action button.
    SetButton(ButtonLabel),
    /// Echo the threshold into the input field.
    SetDiscountField(u8),
    /// Echo the checkbox state.
    SetOptimizeField(bool),
}

/// The controller's view of the session, synced from monitor reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    tab: Option<TabId>,
    min_discount: u8,
    optimize_memory: bool,
    is_loading: bool,
    is_stopped: bool,
}

impl ControllerState {
    /// A fresh controller before the popup has opened.
    pub fn new() -> Self {
        Self {
            tab: None,
            min_discount: DEFAULT_MIN_DISCOUNT,
            optimize_memory: false,
            is_loading: false,
            is_stopped: false,
        }
    }

    /// The tab this controller is bound to, once resolved.
    pub fn tab(&self) -> Option<TabId> {
        self.tab
    }

    /// Current threshold shown in the popup.
    pub fn min_discount(&self) -> u8 {
        self.min_discount
    }

    /// Current checkbox state.
    pub fn optimize_memory(&self) -> bool {
        self.optimize_memory
    }

    /// Apply one event and return the effects it produced.
    pub fn step(&mut self, event: ControllerEvent) -> Vec<ControllerEffect> {
        match event {
            ControllerEvent::Opened {
                tab,
                saved_discount,
                saved_optimize,
            } => self.on_opened(tab, saved_discount, saved_optimize),
            ControllerEvent::ActionClicked => self.on_action_clicked(),
            ControllerEvent::DiscountSubmitted { value } => self.on_discount_submitted(value),
            ControllerEvent::OptimizeToggled { enabled } => {
                self.optimize_memory = enabled;
                self.save_preferences().into_iter().collect()
            }
            ControllerEvent::ReportReceived(report) => self.on_report(report),
        }
    }

    fn on_opened(
        &mut self,
        tab: Option<TabId>,
        saved_discount: Option<u8>,
        saved_optimize: Option<bool>,
    ) -> Vec<ControllerEffect> {
        self.tab = tab;

        let mut effects = Vec::new();
        if let Some(value) = saved_discount {
            self.min_discount = value.min(100);
            effects.push(ControllerEffect::SetDiscountField(self.min_discount));
        }
        if let Some(value) = saved_optimize {
            self.optimize_memory = value;
            effects.push(ControllerEffect::SetOptimizeField(value));
        }

        // Seed the monitor with the restored settings, then ask where the
        // session stands.
        effects.extend(self.send(Command::InitWithSettings {
            min_discount_percentage: Some(self.min_discount),
            optimize_memory: Some(self.optimize_memory),
        }));
        effects.extend(self.send(Command::GetStatus));
        effects
    }

    fn on_action_clicked(&mut self) -> Vec<ControllerEffect> {
        let mut effects = if !self.is_loading {
            self.is_loading = true;
            self.is_stopped = false;
            let mut effects = vec![ControllerEffect::SetButton(ButtonLabel::Stop)];
            effects.extend(self.send(Command::LoadAllProducts {
                optimize_memory: self.optimize_memory,
                min_discount_percentage: Some(self.min_discount),
            }));
            effects.push(ControllerEffect::SetStatusLine(
                status::loading_and_filtering(),
            ));
            effects
        } else if self.is_stopped {
            self.is_stopped = false;
            let mut effects = vec![ControllerEffect::SetButton(ButtonLabel::Stop)];
            effects.extend(self.send(Command::ResumeLoading));
            effects.push(ControllerEffect::SetStatusLine(status::resuming()));
            effects
        } else {
            self.is_stopped = true;
            let mut effects = vec![ControllerEffect::SetButton(ButtonLabel::Resume)];
            effects.extend(self.send(Command::StopLoading));
            effects.push(ControllerEffect::SetStatusLine(status::stopped_line()));
            effects
        };

        // Every click persists the current preferences, independent of
        // monitor feedback.
        effects.extend(self.save_preferences());
        effects
    }

    fn on_discount_submitted(&mut self, value: i64) -> Vec<ControllerEffect> {
        if !(0..=100).contains(&value) {
            return Vec::new();
        }
        self.min_discount = value as u8;

        let mut effects: Vec<ControllerEffect> = self
            .send(Command::UpdateDiscount {
                min_discount_percentage: self.min_discount,
                tab: self.tab,
            })
            .into_iter()
            .collect();
        effects.push(ControllerEffect::SetStatusLine(status::discount_updated(
            self.min_discount,
        )));
        effects.extend(self.save_preferences());
        effects
    }

    fn on_report(&mut self, report: Report) -> Vec<ControllerEffect> {
        match report {
            Report::UpdateStatus { message } => vec![ControllerEffect::SetStatusLine(message)],
            Report::UpdateState {
                is_loading,
                is_stopped,
                min_discount_percentage,
            } => {
                self.is_loading = is_loading;
                self.is_stopped = is_stopped;
                self.min_discount = min_discount_percentage.min(100);

                let label = if self.is_loading {
                    if self.is_stopped {
                        ButtonLabel::Resume
                    } else {
                        ButtonLabel::Stop
                    }
                } else {
                    ButtonLabel::LoadAndFilter
                };

                vec![
                    ControllerEffect::SetButton(label),
                    ControllerEffect::SetDiscountField(self.min_discount),
                ]
            }
        }
    }

    /// Commands are only deliverable once a tab is known; without one the
    /// send is silently skipped.
    fn send(&self, command: Command) -> Option<ControllerEffect> {
        self.tab.map(|_| ControllerEffect::Send(command))
    }

    fn save_preferences(&self) -> Option<ControllerEffect> {
        self.tab.map(|tab| ControllerEffect::SavePreferences {
            tab,
            min_discount_percentage: self.min_discount,
            optimize_memory: self.optimize_memory,
        })
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

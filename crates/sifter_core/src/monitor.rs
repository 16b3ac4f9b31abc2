use std::collections::HashSet;

use crate::classify::{verdict, ProductSnapshot, Verdict};
use crate::command::{Command, Report, TabId};
use crate::status;

/// Threshold used until a saved preference or a command overrides it.
pub const DEFAULT_MIN_DISCOUNT: u8 = 50;

/// Consecutive stagnant ticks tolerated before the monitor tries to trigger
/// the page's "load more" control.
pub const MAX_STAGNANT_TICKS: u32 = 3;

/// Counts observed on the page at the moment an event is processed.
///
/// The runtime snapshots these before every [`MonitorState::step`] call, so
/// the state machine itself never touches the page (injectable count
/// observer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCounts {
    /// Products present on the page and not highlighted. Hidden products
    /// still count; removed ones do not.
    pub pending: usize,
    /// Products currently carrying the highlight marker.
    pub highlighted: usize,
    /// Page-reported total from the numeric label, when parseable.
    pub total: Option<u32>,
}

/// Lifecycle of a loading session.
///
/// `Stopped` is a sub-state of a live session: polling is suspended but the
/// session's counters survive, so `Stopped` implies "loading" for status
/// reporting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Stopped,
}

/// Poll cadence requested by a [`MonitorEffect::ScheduleTick`].
///
/// The slow delay follows session start and stop-deferral; the fast delay is
/// the steady-state cadence. The asymmetry trades responsiveness against
/// page-query overhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDelay {
    /// 1000 ms: after start, and while a stopped session defers its tick.
    Slow,
    /// 200 ms: steady-state polling and resume.
    Fast,
}

impl TickDelay {
    /// The delay in milliseconds.
    pub fn as_millis(self) -> u64 {
        match self {
            TickDelay::Slow => 1000,
            TickDelay::Fast => 200,
        }
    }
}

/// Everything that can happen to the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A controller command arrived on the relay.
    Command(Command),
    /// The scheduled poll tick fired.
    Tick,
    /// Result of a [`MonitorEffect::TriggerLoadMore`] attempt. `clicked`
    /// is false when the control was not found, which means end of results.
    LoadMoreOutcome { clicked: bool },
    /// The page swapped in new category containers without a navigation.
    CategoryChanged,
    /// Saved preferences arrived after a [`MonitorEffect::LoadPreferences`].
    PreferencesLoaded {
        min_discount_percentage: Option<u8>,
        optimize_memory: Option<bool>,
    },
}

/// Work the runtime must perform on the monitor's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEffect {
    /// Un-highlight every product; restore visibility unless memory
    /// optimization is active.
    ResetDisplay,
    /// Force every product visible (threshold change undoing prior hides).
    ShowAllProducts,
    /// Replace the label on currently highlighted products.
    RelabelHighlighted { label: String },
    /// Run [`MonitorState::classify`] over every pending product and apply
    /// the verdicts to the page.
    ClassifyPending,
    /// Try to invoke the page's "load more" control; the outcome comes back
    /// as [`MonitorEvent::LoadMoreOutcome`].
    TriggerLoadMore,
    /// Arm the single poll tick. Replaces any tick already pending.
    ScheduleTick { delay: TickDelay },
    /// Send a report to the controller.
    Emit(Report),
    /// Reload this tab's saved preferences; the result comes back as
    /// [`MonitorEvent::PreferencesLoaded`].
    LoadPreferences,
    /// Persist a threshold change carried by an `UpdateDiscount` command.
    SavePreference { tab: TabId, min_discount_percentage: u8 },
}

/// The monitor's complete session and classification state.
///
/// One value per monitored tab, owned by the runtime task; there is no
/// module-global state. [`MonitorState::step`] is a pure transition
/// function: it mutates only `self` and describes all side effects as
/// [`MonitorEffect`]s for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    session: SessionState,
    min_discount: u8,
    optimize_memory: bool,
    last_product_count: usize,
    stagnant_ticks: u32,
    processed: HashSet<String>,
}

impl MonitorState {
    /// A fresh monitor with the default threshold and no session.
    pub fn new() -> Self {
        Self {
            session: SessionState::Idle,
            min_discount: DEFAULT_MIN_DISCOUNT,
            optimize_memory: false,
            last_product_count: 0,
            stagnant_ticks: 0,
            processed: HashSet::new(),
        }
    }

    /// Current session state.
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Current threshold, always within 0..=100.
    pub fn min_discount(&self) -> u8 {
        self.min_discount
    }

    /// Whether non-matching products are removed rather than hidden.
    pub fn optimize_memory(&self) -> bool {
        self.optimize_memory
    }

    /// Number of identifiers classified in the current epoch.
    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    /// Classify one pending product under the current settings, recording
    /// its identifier. Called by the runtime while executing
    /// [`MonitorEffect::ClassifyPending`].
    pub fn classify(&mut self, product: &ProductSnapshot) -> Verdict {
        verdict(
            self.min_discount,
            self.optimize_memory,
            &mut self.processed,
            product,
        )
    }

    /// Apply one event and return the effects it produced.
    ///
    /// `counts` is the page observation taken just before the event was
    /// dispatched; status lines and stagnation decisions are based on it.
    pub fn step(&mut self, event: MonitorEvent, counts: PageCounts) -> Vec<MonitorEffect> {
        match event {
            MonitorEvent::Command(command) => self.on_command(command, counts),
            MonitorEvent::Tick => self.on_tick(counts),
            MonitorEvent::LoadMoreOutcome { clicked } => self.on_load_more(clicked, counts),
            MonitorEvent::CategoryChanged => vec![MonitorEffect::LoadPreferences],
            MonitorEvent::PreferencesLoaded {
                min_discount_percentage,
                optimize_memory,
            } => {
                if let Some(value) = min_discount_percentage {
                    self.min_discount = clamp_percentage(value);
                }
                if let Some(value) = optimize_memory {
                    self.optimize_memory = value;
                }
                vec![MonitorEffect::Emit(Report::UpdateStatus {
                    message: status::currently_filtering(self.min_discount),
                })]
            }
        }
    }

    fn on_command(&mut self, command: Command, counts: PageCounts) -> Vec<MonitorEffect> {
        match command {
            Command::LoadAllProducts {
                optimize_memory,
                min_discount_percentage,
            } => self.start_session(optimize_memory, min_discount_percentage),
            Command::StopLoading => {
                if self.session == SessionState::Loading {
                    self.session = SessionState::Stopped;
                }
                vec![MonitorEffect::Emit(Report::UpdateStatus {
                    message: status::stopped_with_progress(counts, self.min_discount),
                })]
            }
            Command::ResumeLoading => {
                if self.session != SessionState::Stopped {
                    return Vec::new();
                }
                self.session = SessionState::Loading;
                vec![
                    MonitorEffect::Emit(Report::UpdateStatus {
                        message: status::resuming(),
                    }),
                    MonitorEffect::ScheduleTick {
                        delay: TickDelay::Fast,
                    },
                ]
            }
            Command::UpdateDiscount {
                min_discount_percentage,
                tab,
            } => self.update_threshold(min_discount_percentage, tab),
            Command::GetStatus => {
                let mut effects = vec![MonitorEffect::Emit(Report::UpdateState {
                    is_loading: self.is_loading(),
                    is_stopped: self.session == SessionState::Stopped,
                    min_discount_percentage: self.min_discount,
                })];
                if let Some(message) =
                    status::session_status(self.is_loading(), counts, self.min_discount)
                {
                    effects.push(MonitorEffect::Emit(Report::UpdateStatus { message }));
                }
                effects
            }
            Command::InitWithSettings {
                min_discount_percentage,
                optimize_memory,
            } => {
                if let Some(value) = min_discount_percentage {
                    self.min_discount = clamp_percentage(value);
                }
                if let Some(value) = optimize_memory {
                    self.optimize_memory = value;
                }
                Vec::new()
            }
        }
    }

    fn start_session(
        &mut self,
        optimize_memory: bool,
        min_discount_percentage: Option<u8>,
    ) -> Vec<MonitorEffect> {
        // Starting while a session is live is a no-op.
        if self.is_loading() {
            return Vec::new();
        }

        self.session = SessionState::Loading;
        self.last_product_count = 0;
        self.stagnant_ticks = 0;
        self.optimize_memory = optimize_memory;
        if let Some(value) = min_discount_percentage {
            self.min_discount = clamp_percentage(value);
        }

        vec![
            MonitorEffect::ResetDisplay,
            MonitorEffect::Emit(Report::UpdateStatus {
                message: status::loading(),
            }),
            MonitorEffect::ScheduleTick {
                delay: TickDelay::Slow,
            },
        ]
    }

    fn on_tick(&mut self, counts: PageCounts) -> Vec<MonitorEffect> {
        match self.session {
            // A tick that outlived its session. The runtime keeps a single
            // pending tick, so this only covers completion races.
            SessionState::Idle => Vec::new(),
            // Busy-wait deferral: stopped sessions keep the tick alive but
            // do no work.
            SessionState::Stopped => vec![MonitorEffect::ScheduleTick {
                delay: TickDelay::Slow,
            }],
            SessionState::Loading => {
                let mut effects = Vec::new();

                if counts.pending > self.last_product_count {
                    effects.push(MonitorEffect::ClassifyPending);
                }

                if counts.pending == self.last_product_count {
                    self.stagnant_ticks += 1;
                    if self.stagnant_ticks >= MAX_STAGNANT_TICKS {
                        // Polling pauses here until the outcome arrives.
                        effects.push(MonitorEffect::TriggerLoadMore);
                        return effects;
                    }
                } else {
                    self.stagnant_ticks = 0;
                    self.last_product_count = counts.pending;
                    if let Some(message) = status::session_status(true, counts, self.min_discount)
                    {
                        effects.push(MonitorEffect::Emit(Report::UpdateStatus { message }));
                    }
                }

                effects.push(MonitorEffect::ScheduleTick {
                    delay: TickDelay::Fast,
                });
                effects
            }
        }
    }

    fn on_load_more(&mut self, clicked: bool, counts: PageCounts) -> Vec<MonitorEffect> {
        // A stop or completion may have landed while the attempt ran.
        if self.session != SessionState::Loading {
            return Vec::new();
        }

        if clicked {
            self.stagnant_ticks = 0;
            return vec![MonitorEffect::ScheduleTick {
                delay: TickDelay::Fast,
            }];
        }

        // No control found: the listing is exhausted.
        self.session = SessionState::Idle;
        match status::session_status(false, counts, self.min_discount) {
            Some(message) => vec![MonitorEffect::Emit(Report::UpdateStatus { message })],
            None => Vec::new(),
        }
    }

    fn update_threshold(&mut self, value: u8, tab: Option<TabId>) -> Vec<MonitorEffect> {
        self.min_discount = clamp_percentage(value);

        let mut effects = Vec::new();
        if !self.optimize_memory {
            // Previously hidden products may qualify under the new
            // threshold; they must be visible before reclassification.
            effects.push(MonitorEffect::ShowAllProducts);
        }
        effects.push(MonitorEffect::RelabelHighlighted {
            label: status::discount_label(self.min_discount),
        });

        // New epoch: everything still on the page gets reclassified.
        self.processed.clear();
        effects.push(MonitorEffect::ClassifyPending);

        effects.push(MonitorEffect::Emit(Report::UpdateStatus {
            message: status::discount_updated(self.min_discount),
        }));

        if let Some(tab) = tab {
            effects.push(MonitorEffect::SavePreference {
                tab,
                min_discount_percentage: self.min_discount,
            });
        }
        effects
    }

    fn is_loading(&self) -> bool {
        matches!(
            self.session,
            SessionState::Loading | SessionState::Stopped
        )
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_percentage(value: u8) -> u8 {
    value.min(100)
}

//! Sifter core: pure monitor/controller state machines and classification.
mod classify;
mod command;
mod controller;
mod coupon;
mod monitor;
mod status;

pub use classify::{verdict, ProductSnapshot, Verdict};
pub use command::{Command, Report, TabId};
pub use controller::{ButtonLabel, ControllerEffect, ControllerEvent, ControllerState};
pub use coupon::{best_discount, extract_discount, COUPON_PREFIXES};
pub use monitor::{
    MonitorEffect, MonitorEvent, MonitorState, PageCounts, SessionState, TickDelay,
    DEFAULT_MIN_DISCOUNT, MAX_STAGNANT_TICKS,
};
pub use status::discount_label;

use std::sync::Once;

use sifter_core::{
    Command, MonitorEffect, MonitorEvent, MonitorState, PageCounts, ProductSnapshot, Report,
    Verdict,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sift_logging::initialize_for_tests);
}

fn no_counts() -> PageCounts {
    PageCounts::default()
}

fn update(state: &mut MonitorState, value: u8, tab: Option<u32>) -> Vec<MonitorEffect> {
    state.step(
        MonitorEvent::Command(Command::UpdateDiscount {
            min_discount_percentage: value,
            tab,
        }),
        no_counts(),
    )
}

#[test]
fn threshold_update_unhides_relabels_and_reclassifies() {
    init_logging();
    let mut state = MonitorState::new();

    let effects = update(&mut state, 30, None);

    assert_eq!(
        effects,
        vec![
            MonitorEffect::ShowAllProducts,
            MonitorEffect::RelabelHighlighted {
                label: "30%+ OFF".to_string(),
            },
            MonitorEffect::ClassifyPending,
            MonitorEffect::Emit(Report::UpdateStatus {
                message: "Minimum discount updated to 30%".to_string(),
            }),
        ]
    );
    assert_eq!(state.min_discount(), 30);
}

#[test]
fn optimize_memory_skips_the_unhide_pass() {
    init_logging();
    let mut state = MonitorState::new();
    state.step(
        MonitorEvent::Command(Command::InitWithSettings {
            min_discount_percentage: None,
            optimize_memory: Some(true),
        }),
        no_counts(),
    );

    let effects = update(&mut state, 30, None);

    // Removed products are gone; forcing visibility would be meaningless.
    assert!(!effects.contains(&MonitorEffect::ShowAllProducts));
    assert_eq!(
        effects[0],
        MonitorEffect::RelabelHighlighted {
            label: "30%+ OFF".to_string(),
        }
    );
}

#[test]
fn threshold_update_starts_a_new_epoch() {
    init_logging();
    let mut state = MonitorState::new();

    let p = ProductSnapshot::new("p1", vec!["ALZADNI40".to_string()]);
    assert_eq!(state.classify(&p), Verdict::Hide { remove: false });
    assert_eq!(state.classify(&p), Verdict::AlreadyProcessed);
    assert_eq!(state.processed_len(), 1);

    update(&mut state, 30, None);

    // Same identifier, new epoch, new outcome under the lower threshold.
    assert_eq!(state.processed_len(), 0);
    assert_eq!(
        state.classify(&p),
        Verdict::Highlight {
            label: "30%+ OFF".to_string(),
            force_visible: true,
        }
    );
}

#[test]
fn threshold_update_with_a_tab_persists_the_preference() {
    init_logging();
    let mut state = MonitorState::new();

    let effects = update(&mut state, 65, Some(7));

    assert_eq!(
        effects.last(),
        Some(&MonitorEffect::SavePreference {
            tab: 7,
            min_discount_percentage: 65,
        })
    );
}

#[test]
fn threshold_is_clamped_to_one_hundred() {
    init_logging();
    let mut state = MonitorState::new();

    update(&mut state, 200, None);

    assert_eq!(state.min_discount(), 100);
}

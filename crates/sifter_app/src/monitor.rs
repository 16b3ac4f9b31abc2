//! The monitor runtime: one task owning the session state machine, the page
//! driver and the single scheduled tick.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use sifter_core::{MonitorEffect, MonitorEvent, MonitorState, TabId};
use sifter_engine::{LoadMoreReport, PageDriver};
use sift_logging::{sift_error, sift_info, sift_warn};
use tokio::time::Sleep;

use crate::prefs::PrefsStore;
use crate::relay::MonitorEnd;

pub struct MonitorRuntime {
    state: MonitorState,
    driver: Box<dyn PageDriver>,
    relay: MonitorEnd,
    prefs: PrefsStore,
    tab: Option<TabId>,
    /// The one pending poll tick; scheduling replaces it, so two ticks can
    /// never be in flight.
    tick: Option<Pin<Box<Sleep>>>,
    /// Events produced while executing effects (load-more outcomes,
    /// category changes, loaded preferences). Drained before the runtime
    /// waits again.
    events: VecDeque<MonitorEvent>,
}

impl MonitorRuntime {
    pub fn new(
        driver: Box<dyn PageDriver>,
        relay: MonitorEnd,
        prefs: PrefsStore,
        tab: Option<TabId>,
    ) -> Self {
        Self {
            state: MonitorState::new(),
            driver,
            relay,
            prefs,
            tab,
            tick: None,
            events: VecDeque::new(),
        }
    }

    /// Run until the command channel closes and any live session has
    /// finished.
    pub async fn run(mut self) {
        sift_info!("monitor runtime started for tab {:?}", self.tab);

        let mut commands_open = true;
        loop {
            let event = if let Some(mut sleep) = self.tick.take() {
                if commands_open {
                    tokio::select! {
                        _ = &mut sleep => MonitorEvent::Tick,
                        command = self.relay.recv_command() => match command {
                            Some(command) => {
                                self.tick = Some(sleep);
                                MonitorEvent::Command(command)
                            }
                            None => {
                                commands_open = false;
                                self.tick = Some(sleep);
                                continue;
                            }
                        },
                    }
                } else {
                    sleep.await;
                    MonitorEvent::Tick
                }
            } else if commands_open {
                match self.relay.recv_command().await {
                    Some(command) => MonitorEvent::Command(command),
                    None => break,
                }
            } else {
                break;
            };

            self.dispatch(event).await;
        }

        sift_info!("monitor runtime finished for tab {:?}", self.tab);
    }

    /// Feed one event through the state machine and execute everything it
    /// produces, including follow-up events.
    async fn dispatch(&mut self, event: MonitorEvent) {
        self.events.push_back(event);
        while let Some(event) = self.events.pop_front() {
            let counts = self.driver.counts();
            for effect in self.state.step(event, counts) {
                self.execute(effect).await;
            }
        }
    }

    async fn execute(&mut self, effect: MonitorEffect) {
        match effect {
            MonitorEffect::ResetDisplay => {
                self.driver.reset_display(self.state.optimize_memory());
            }
            MonitorEffect::ShowAllProducts => self.driver.show_all(),
            MonitorEffect::RelabelHighlighted { label } => {
                self.driver.relabel_highlighted(&label);
            }
            MonitorEffect::ClassifyPending => {
                for snapshot in self.driver.pending_products() {
                    let verdict = self.state.classify(&snapshot);
                    self.driver.apply(&snapshot.id, &verdict);
                }
            }
            MonitorEffect::TriggerLoadMore => {
                let outcome = match self.driver.trigger_load_more().await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        // A failed fetch reads the same as the control
                        // disappearing: the session completes.
                        sift_warn!("load-more attempt failed: {}", err);
                        LoadMoreReport::default()
                    }
                };
                if outcome.category_changed {
                    self.events.push_back(MonitorEvent::CategoryChanged);
                }
                self.events.push_back(MonitorEvent::LoadMoreOutcome {
                    clicked: outcome.clicked,
                });
            }
            MonitorEffect::ScheduleTick { delay } => {
                self.tick = Some(Box::pin(tokio::time::sleep(Duration::from_millis(
                    delay.as_millis(),
                ))));
            }
            MonitorEffect::Emit(report) => self.relay.send_report(report),
            MonitorEffect::LoadPreferences => {
                let Some(tab) = self.tab else {
                    return;
                };
                let saved = self.prefs.tab_prefs(tab);
                self.events.push_back(MonitorEvent::PreferencesLoaded {
                    min_discount_percentage: saved.discount,
                    optimize_memory: saved.optimize,
                });
            }
            MonitorEffect::SavePreference {
                tab,
                min_discount_percentage,
            } => {
                if let Err(err) = self.prefs.save_discount(tab, min_discount_percentage) {
                    sift_error!("failed to persist threshold for tab {}: {}", tab, err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sifter_core::{Command, Report};
    use sifter_engine::{HtmlPageDriver, MoreSource, ScriptedMoreSource, SiftError};

    use super::*;
    use crate::relay::relay;

    fn product(id: &str, coupon: &str) -> String {
        format!(
            r#"<div class="box browsingitem" data-id="{id}"><span class="coupon-block__label--code">{coupon}</span></div>"#
        )
    }

    fn listing(body: &str) -> String {
        format!("<html><body>{body}</body></html>")
    }

    fn store_in(dir: &tempfile::TempDir) -> PrefsStore {
        PrefsStore::new(dir.path())
    }

    /// Collect status lines until the completion message, then close the
    /// relay and let the runtime wind down.
    async fn run_session_to_completion(html: &str, chunks: Vec<String>) -> Vec<String> {
        sift_logging::initialize_for_tests();
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, monitor_end) = relay();
        let driver = HtmlPageDriver::from_html(html, Box::new(ScriptedMoreSource::new(chunks)));
        let runtime = MonitorRuntime::new(Box::new(driver), monitor_end, store_in(&dir), Some(1));
        let handle = tokio::spawn(runtime.run());

        controller.send(Command::LoadAllProducts {
            optimize_memory: false,
            min_discount_percentage: Some(50),
        });

        let mut messages = Vec::new();
        while let Some(report) = controller.recv_report().await {
            if let Report::UpdateStatus { message } = report {
                let done = message.starts_with("Loaded ");
                messages.push(message);
                if done {
                    break;
                }
            }
        }

        controller.close();
        handle.await.unwrap();
        messages
    }

    #[tokio::test(start_paused = true)]
    async fn session_over_the_relay_reports_progress_and_completion() {
        let html = listing(&format!(
            r#"{}{}<a class="js-button-more button-more" href="/p2">more</a>"#,
            product("p1", "ALZADNY60"),
            product("p2", "ALZADNI40"),
        ));
        let chunk = listing(&format!(
            r##"{}<a class="js-button-more button-more hdn" href="#">more</a>"##,
            product("p3", "ALZADNY70"),
        ));

        let messages = run_session_to_completion(&html, vec![chunk]).await;

        assert_eq!(messages.first().unwrap(), "Loading products...");
        assert_eq!(
            messages.last().unwrap(),
            "Loaded 1 products. Found 2 with 50%+ discount."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_load_more_fetch_completes_the_session() {
        struct FailingSource;

        #[async_trait]
        impl MoreSource for FailingSource {
            async fn next_chunk(&mut self) -> Result<Option<String>, SiftError> {
                Err(SiftError::Network("connection reset".to_string()))
            }
        }

        sift_logging::initialize_for_tests();
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, monitor_end) = relay();
        let html = listing(&format!(
            r#"{}<a class="js-button-more button-more" href="/p2">more</a>"#,
            product("p1", "ALZADNY60"),
        ));
        let driver = HtmlPageDriver::from_html(&html, Box::new(FailingSource));
        let runtime = MonitorRuntime::new(Box::new(driver), monitor_end, store_in(&dir), Some(1));
        let handle = tokio::spawn(runtime.run());

        controller.send(Command::LoadAllProducts {
            optimize_memory: false,
            min_discount_percentage: Some(50),
        });

        let mut last = String::new();
        while let Some(report) = controller.recv_report().await {
            if let Report::UpdateStatus { message } = report {
                let done = message.starts_with("Loaded ");
                last = message;
                if done {
                    break;
                }
            }
        }
        controller.close();
        handle.await.unwrap();

        assert_eq!(last, "Loaded 0 products. Found 1 with 50%+ discount.");
    }

    #[tokio::test(start_paused = true)]
    async fn category_change_reloads_saved_preferences() {
        sift_logging::initialize_for_tests();
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_tab_prefs(7, 30, false).unwrap();

        let (mut controller, monitor_end) = relay();
        let driver =
            HtmlPageDriver::from_html(&listing(""), Box::new(ScriptedMoreSource::empty()));
        let mut runtime = MonitorRuntime::new(Box::new(driver), monitor_end, store, Some(7));

        runtime.dispatch(MonitorEvent::CategoryChanged).await;

        assert_eq!(runtime.state.min_discount(), 30);
        assert_eq!(
            controller.recv_report().await,
            Some(Report::UpdateStatus {
                message: "Currently filtering: 30%+ discount".to_string(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn threshold_command_with_a_tab_writes_through_the_store() {
        sift_logging::initialize_for_tests();
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let (_controller, monitor_end) = relay();
        let driver =
            HtmlPageDriver::from_html(&listing(""), Box::new(ScriptedMoreSource::empty()));
        let mut runtime =
            MonitorRuntime::new(Box::new(driver), monitor_end, store.clone(), Some(7));

        runtime
            .dispatch(MonitorEvent::Command(Command::UpdateDiscount {
                min_discount_percentage: 65,
                tab: Some(7),
            }))
            .await;

        assert_eq!(store.tab_prefs(7).discount, Some(65));
    }
}

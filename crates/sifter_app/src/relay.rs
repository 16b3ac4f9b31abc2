//! The message relay between the controller and the monitor: one channel of
//! commands, one channel of reports.

use sifter_core::{Command, Report};
use sift_logging::sift_debug;
use tokio::sync::mpsc;

/// Controller's side of the relay.
pub struct ControllerEnd {
    commands: Option<mpsc::UnboundedSender<Command>>,
    reports: mpsc::UnboundedReceiver<Report>,
}

/// Monitor's side of the relay.
pub struct MonitorEnd {
    commands: mpsc::UnboundedReceiver<Command>,
    reports: mpsc::UnboundedSender<Report>,
}

/// A fresh relay pair.
pub fn relay() -> (ControllerEnd, MonitorEnd) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    (
        ControllerEnd {
            commands: Some(command_tx),
            reports: report_rx,
        },
        MonitorEnd {
            commands: command_rx,
            reports: report_tx,
        },
    )
}

impl ControllerEnd {
    /// Dispatch a command. A monitor that has already exited is not an
    /// error for the controller.
    pub fn send(&self, command: Command) {
        let Some(tx) = &self.commands else {
            return;
        };
        if tx.send(command).is_err() {
            sift_debug!("command dropped: monitor side of the relay is gone");
        }
    }

    /// Wait for the next report. `None` once the monitor has exited and the
    /// channel drained.
    pub async fn recv_report(&mut self) -> Option<Report> {
        self.reports.recv().await
    }

    /// Stop sending commands, the way a closed popup does. A monitor with a
    /// running session finishes it before exiting.
    pub fn close(&mut self) {
        self.commands = None;
    }
}

impl MonitorEnd {
    /// Wait for the next command. `None` once the controller side is closed
    /// and the channel drained.
    pub async fn recv_command(&mut self) -> Option<Command> {
        self.commands.recv().await
    }

    /// Deliver a report. A closed controller is absorbed silently.
    pub fn send_report(&self, report: Report) {
        if self.reports.send(report).is_err() {
            sift_debug!("report dropped: controller side of the relay is gone");
        }
    }
}

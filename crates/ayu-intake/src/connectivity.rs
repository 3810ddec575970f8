//! Online/offline notices.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::controller::SubmissionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

/// Poll the endpoint's health check and feed transitions into the controller.
pub fn spawn_connectivity_probe(
    controller: SubmissionController,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            controller.probe_connectivity().await;
        }
    })
}

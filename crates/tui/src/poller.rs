//! Auto-refresh timer.
//!
//! At most one ticking task exists at a time. Each start bumps the
//! generation, and ticks carry the generation they were produced under, so a
//! tick still queued in the channel after a stop can be recognised and
//! dropped.
use std::time::Duration;

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::app::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
}

#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    events: UnboundedSender<AppEvent>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl Poller {
    pub fn new(interval: Duration, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            interval,
            events,
            task: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> PollState {
        if self.task.is_some() {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    /// Polls only while live mode is on and the transaction list is shown.
    pub fn sync(&mut self, live: bool, on_transactions: bool) {
        if live && on_transactions {
            self.start();
        } else {
            self.stop();
        }
    }

    /// `true` if a tick of `generation` comes from the running timer.
    pub fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }

    fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        self.generation += 1;
        let generation = self.generation;
        let interval = self.interval;
        let events = self.events.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if events.send(AppEvent::PollTick { generation }).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(generation, ?interval, "polling started");
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(generation = self.generation, "polling stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

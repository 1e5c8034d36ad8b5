//! Gravity scheduler - the periodic tick driver
//!
//! An explicit capability held by the room, never a global. Each `start`
//! spawns a fresh interval task and bumps a generation counter; ticks carry
//! the generation they were scheduled under, and the room drops any tick from
//! a superseded generation. Aborting the old task plus the generation check
//! means a restart can never let a stray old-period tick through.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::room::room::RoomEvent;

pub struct GravityScheduler {
    events: mpsc::Sender<RoomEvent>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl GravityScheduler {
    pub fn new(events: mpsc::Sender<RoomEvent>) -> Self {
        Self {
            events,
            generation: 0,
            task: None,
        }
    }

    /// Begin ticking at `period`. Any previous schedule is stopped first.
    pub fn start(&mut self, period: Duration) {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; skip it so the
            // first gravity step lands one full period after start.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if events
                    .send(RoomEvent::Tick { generation })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }));
    }

    /// Stop ticking. Queued ticks from the stopped schedule become stale.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop and start with a new period (level-up path)
    pub fn restart(&mut self, period: Duration) {
        self.start(period);
    }

    /// Whether a tick stamped with `generation` belongs to the live schedule
    pub fn accepts(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for GravityScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

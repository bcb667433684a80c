use crate::controller::Event;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Periodic task feeding loop-check ticks to the controller.
///
/// Every start opens a new generation; a tick is only current while its
/// generation is the running one, so ticks still queued after a stop are
/// recognisable as stale.
#[derive(Debug)]
pub struct LoopMonitor {
    period: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl LoopMonitor {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            task: None,
        }
    }

    pub fn start(&mut self, events: UnboundedSender<Event>) {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        debug!("Starting loop monitor generation {}", generation);
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events.send(Event::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.generation += 1;
            debug!("Stopped loop monitor");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for LoopMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

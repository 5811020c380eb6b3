// SPDX-License-Identifier: MIT

//! Scheduler - re-runs the apply cycle whenever its trigger fires
//!
//! Cycles run inline on the scheduler task, so a cycle never overlaps the
//! previous one. With [`IntervalTrigger`], ticks missed while a cycle was
//! running are skipped rather than replayed.

use super::apply::CycleReport;
use crate::error::WhereError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Decides when the next apply cycle runs
#[async_trait]
pub trait Trigger: Send {
    /// Resolves when the next cycle is due
    async fn fired(&mut self);
}

/// Shortest period an [`IntervalTrigger`] will tick at
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fires every `period`, first one `period` after the first poll
pub struct IntervalTrigger {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalTrigger {
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            interval: None,
        }
    }
}

#[async_trait]
impl Trigger for IntervalTrigger {
    async fn fired(&mut self) {
        let period = self.period;
        // Created lazily so that the timer is registered on the scheduler's runtime.
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
    }
}

pub struct Scheduler<T> {
    trigger: T,
    max_cycles: Option<u64>,
}

impl<T: Trigger + 'static> Scheduler<T> {
    pub fn new(trigger: T) -> Self {
        Self {
            trigger,
            max_cycles: None,
        }
    }

    /// Stop on its own after `max_cycles` cycles
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    /// Spawn the polling loop on the current tokio runtime
    pub fn spawn<F>(self, cycle: F) -> SchedulerHandle
    where
        F: Fn() -> CycleReport + Send + Sync + 'static,
    {
        let Scheduler {
            mut trigger,
            max_cycles,
        } = self;
        let (stop, mut stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut cycles: u64 = 0;
            loop {
                if max_cycles.is_some_and(|max| cycles >= max) {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = trigger.fired() => {
                        let report = cycle();
                        cycles += 1;
                        if report.mutations() > 0 || report.failed_queries > 0 {
                            log::debug!("Cycle {}: {:?}", cycles, report);
                        }
                    }
                }
            }
            log::info!("Scheduler stopped after {} cycle(s)", cycles);
            cycles
        });

        SchedulerHandle { stop, task }
    }
}

/// Handle to a running scheduler. Dropping it stops the scheduler.
pub struct SchedulerHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<u64>,
}

impl SchedulerHandle {
    /// Stop the loop and return how many cycles ran
    pub async fn stop(self) -> Result<u64, WhereError> {
        let SchedulerHandle { stop, task } = self;
        // The loop may already have ended on its own.
        let _ = stop.send(());
        join(task).await
    }

    /// Wait for the loop to end on its own (see [`Scheduler::with_max_cycles`])
    pub async fn wait(self) -> Result<u64, WhereError> {
        let SchedulerHandle { stop, task } = self;
        let cycles = join(task).await;
        drop(stop);
        cycles
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn join(task: JoinHandle<u64>) -> Result<u64, WhereError> {
    task.await
        .map_err(|e| WhereError::Scheduler(format!("scheduler task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    /// Fires once per message received
    struct ChannelTrigger {
        ticks: mpsc::UnboundedReceiver<()>,
    }

    #[async_trait]
    impl Trigger for ChannelTrigger {
        async fn fired(&mut self) {
            if self.ticks.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
    }

    fn counting_cycle() -> (Arc<AtomicUsize>, impl Fn() -> CycleReport + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        (count, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            CycleReport::default()
        })
    }

    #[tokio::test]
    async fn test_runs_one_cycle_per_trigger() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (count, cycle) = counting_cycle();
        let handle = Scheduler::new(ChannelTrigger { ticks: rx })
            .with_max_cycles(3)
            .spawn(cycle);

        for _ in 0..3 {
            tx.send(()).unwrap();
        }
        assert_eq!(handle.wait().await.unwrap(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stop_without_any_trigger() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (count, cycle) = counting_cycle();
        let handle = Scheduler::new(ChannelTrigger { ticks: rx }).spawn(cycle);

        assert_eq!(handle.stop().await.unwrap(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_trigger_fires_every_period() {
        let (count, cycle) = counting_cycle();
        let handle =
            Scheduler::new(IntervalTrigger::new(Duration::from_millis(400))).spawn(cycle);

        time::sleep(Duration::from_millis(1000)).await;
        let cycles = handle.stop().await.unwrap();
        assert_eq!(cycles, 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_trigger_does_not_fire_immediately() {
        let (count, cycle) = counting_cycle();
        let handle =
            Scheduler::new(IntervalTrigger::new(Duration::from_millis(400))).spawn(cycle);

        time::sleep(Duration::from_millis(399)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_the_loop() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (count, cycle) = counting_cycle();
        let handle = Scheduler::new(ChannelTrigger { ticks: rx }).spawn(cycle);

        drop(handle);
        // The receiver goes away with the trigger once the task exits.
        tx.closed().await;
        assert!(tx.send(()).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_clamped() {
        let trigger = IntervalTrigger::new(Duration::ZERO);
        assert_eq!(trigger.period, MIN_PERIOD);

        let (count, cycle) = counting_cycle();
        let handle = Scheduler::new(trigger).spawn(cycle);
        time::sleep(Duration::from_millis(5)).await;
        let cycles = handle.stop().await.unwrap();
        assert!(cycles >= 1);
        assert_eq!(count.load(Ordering::SeqCst) as u64, cycles);
    }

    #[tokio::test]
    async fn test_max_cycles_zero_finishes_immediately() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (_count, cycle) = counting_cycle();
        let handle = Scheduler::new(ChannelTrigger { ticks: rx })
            .with_max_cycles(0)
            .spawn(cycle);
        assert_eq!(handle.wait().await.unwrap(), 0);
    }
}

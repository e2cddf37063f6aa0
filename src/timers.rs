//! Repeating match timers with explicit cancellation handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::runtime::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Once per second, recomputes elapsed match time
    MatchClock,
    /// Computer auto-pull in single mode
    OpponentPull,
}

/// Payload delivered each time a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub kind: TimerKind,
    pub match_id: u64,
}

/// Owning handle for a scheduled timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Something that can run a repeating timer
pub trait Scheduler {
    fn every(&self, period: Duration, tick: TimerTick) -> TimerHandle;
}

/// Production scheduler: one thread per timer posting into the event channel
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    tx: Sender<GameEvent>,
}

impl ThreadScheduler {
    pub fn new(tx: Sender<GameEvent>) -> Self {
        Self { tx }
    }
}

impl Scheduler for ThreadScheduler {
    fn every(&self, period: Duration, tick: TimerTick) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let start = Instant::now();
            let mut fired: u32 = 0;
            loop {
                fired += 1;
                // deadlines are anchored to start so sleeps don't accumulate drift
                let deadline = start + period * fired;
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(GameEvent::Timer(tick)).is_err() {
                    break;
                }
            }
        });

        TimerHandle::new(cancelled)
    }
}

/// One entry recorded by [`ManualScheduler`]
#[derive(Debug, Clone)]
pub struct ScheduledTimer {
    pub period: Duration,
    pub tick: TimerTick,
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTimer {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scheduler that never fires on its own; tests deliver ticks by hand and
/// inspect what was scheduled or cancelled.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    scheduled: Arc<Mutex<Vec<ScheduledTimer>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<ScheduledTimer> {
        self.scheduled
            .lock()
            .map(|timers| timers.clone())
            .unwrap_or_default()
    }

    /// Timers that have not been cancelled yet
    pub fn live(&self) -> Vec<ScheduledTimer> {
        self.scheduled()
            .into_iter()
            .filter(|t| !t.is_cancelled())
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration, tick: TimerTick) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Ok(mut timers) = self.scheduled.lock() {
            timers.push(ScheduledTimer {
                period,
                tick,
                cancelled: Arc::clone(&cancelled),
            });
        }
        TimerHandle::new(cancelled)
    }
}

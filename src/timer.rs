use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::clock::SharedClock;
use crate::display::{write_optional, TimerReadouts};

pub const DEFAULT_MAX_TIME_SECS: u64 = 30;
pub const TICK_RATE_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Notifications produced by the timer, drained by whoever owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Started,
    Tick {
        remaining: Duration,
        elapsed: Duration,
    },
    Completed,
}

/// Countdown clock for a single round
pub struct Timer {
    max_time: Duration,
    elapsed: Duration,
    /// Elapsed time carried over from before the current run (pause/resume).
    carried: Duration,
    started_at: Option<Instant>,
    state: TimerState,
    clock: SharedClock,
    readouts: TimerReadouts,
    events: VecDeque<TimerEvent>,
}

impl Timer {
    pub fn new(max_time_secs: u64, clock: SharedClock) -> Self {
        Self {
            max_time: Duration::from_secs(max_time_secs),
            elapsed: Duration::ZERO,
            carried: Duration::ZERO,
            started_at: None,
            state: TimerState::Idle,
            clock,
            readouts: TimerReadouts::default(),
            events: VecDeque::new(),
        }
    }

    pub fn with_readouts(mut self, readouts: TimerReadouts) -> Self {
        self.readouts = readouts;
        self.update_display();
        self
    }

    pub fn reset(&mut self) {
        self.stop();
        self.elapsed = Duration::ZERO;
        self.carried = Duration::ZERO;
        self.started_at = None;
        self.state = TimerState::Idle;
        self.update_display();
    }

    pub fn start(&mut self) {
        if self.state == TimerState::Running {
            return;
        }

        self.carried = self.elapsed;
        self.started_at = Some(self.clock.now());
        self.state = TimerState::Running;
        log::debug!("timer started with {:?} already elapsed", self.carried);
        self.events.push_back(TimerEvent::Started);
    }

    /// Periodic callback body. A tick that arrives while not running is ignored.
    pub fn tick(&mut self) {
        if self.state != TimerState::Running {
            return;
        }

        self.elapsed = self.measure();
        let remaining = self.time_remaining();
        self.update_display();
        self.events.push_back(TimerEvent::Tick {
            remaining,
            elapsed: self.elapsed,
        });

        if remaining.is_zero() {
            self.stop();
            log::debug!("timer expired after {:?}", self.elapsed);
            self.events.push_back(TimerEvent::Completed);
        }
    }

    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.elapsed = self.measure();
            self.carried = self.elapsed;
            self.started_at = None;
            self.state = TimerState::Stopped;
        }
        self.update_display();
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.stop();
            self.state = TimerState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.start();
        }
    }

    // Derived from the start instant, never from summing ticks.
    fn measure(&self) -> Duration {
        let running = self
            .started_at
            .map(|at| self.clock.now().saturating_duration_since(at))
            .unwrap_or(Duration::ZERO);
        (self.carried + running).min(self.max_time)
    }

    pub fn update_display(&self) {
        write_optional(&self.readouts.clock, format_clock(self.remaining_secs()));
        write_optional(
            &self.readouts.elapsed,
            format!("{}s", self.elapsed_secs()),
        );
    }

    pub fn drain_events(&mut self) -> Vec<TimerEvent> {
        self.events.drain(..).collect()
    }

    pub fn max_time(&self) -> Duration {
        self.max_time
    }

    pub fn time_remaining(&self) -> Duration {
        self.max_time.saturating_sub(self.elapsed)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.max_time.as_secs().saturating_sub(self.elapsed_secs())
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining().is_zero()
    }
}

/// Whole seconds as zero-padded MM:SS
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

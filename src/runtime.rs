use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Everything the event loop reacts to
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Queue of terminal input. Fed by a crossterm reader thread in the app and
/// by a plain channel in tests.
pub struct InputQueue {
    rx: Receiver<AppEvent>,
}

impl InputQueue {
    pub fn from_channel(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    pub fn crossterm() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let ev = match event::read() {
                // Release is only reported with the kitty protocol and would
                // double every char
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    log::error!("terminal event reader stopped: {err}");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

/// Fixed-rate tick deadlines. Deadlines missed while busy collapse into a
/// single tick rather than a burst.
#[derive(Debug)]
pub struct TickSchedule {
    interval: Duration,
    next: Cell<Instant>,
}

impl TickSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Cell::new(Instant::now() + interval),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Zero once the next tick is overdue.
    fn until_due(&self, now: Instant) -> Duration {
        self.next.get().saturating_duration_since(now)
    }

    fn fire(&self, now: Instant) {
        let mut next = self.next.get() + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next.set(next);
    }
}

/// Interleaves input with the timer cadence. Ticks are driven by their own
/// deadline, so a steady stream of keys cannot hold them back.
pub struct Scheduler {
    input: InputQueue,
    ticks: TickSchedule,
}

impl Scheduler {
    pub fn new(input: InputQueue, ticks: TickSchedule) -> Self {
        Self { input, ticks }
    }

    pub fn next_event(&self) -> AppEvent {
        let wait = self.ticks.until_due(Instant::now());
        if wait.is_zero() {
            self.ticks.fire(Instant::now());
            return AppEvent::Tick;
        }

        match self.input.rx.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.ticks.fire(Instant::now());
                AppEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                // no more input; keep the cadence without spinning
                thread::sleep(wait);
                self.ticks.fire(Instant::now());
                AppEvent::Tick
            }
        }
    }
}

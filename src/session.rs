use chrono::{DateTime, Local};
use serde::Serialize;

use crate::clock::SharedClock;
use crate::config::{Config, Readout};
use crate::display::{InputField, MetricsReadouts, SharedText, TimerReadouts};
use crate::error::Result;
use crate::metrics::{MetricsCalculator, MetricsSnapshot};
use crate::paragraphs::TextProvider;
use crate::timer::{Timer, TimerEvent};
use crate::typing_test::{EndReason, RoundState, TestSurfaces, TypingTest};

pub const LOAD_ERROR_MESSAGE: &str = "Error: could not load a paragraph.";

/// Readout handles shared with the UI. Hidden readouts are `None`.
#[derive(Clone, Debug, Default)]
pub struct Readouts {
    pub timer: TimerReadouts,
    pub metrics: MetricsReadouts,
}

impl Readouts {
    pub fn wired(config: &Config) -> Self {
        let slot = |readout| config.shows(readout).then(SharedText::new);
        Self {
            timer: TimerReadouts {
                clock: slot(Readout::Timer),
                elapsed: slot(Readout::Time),
            },
            metrics: MetricsReadouts {
                wpm: slot(Readout::Wpm),
                cpm: slot(Readout::Cpm),
                accuracy: slot(Readout::Accuracy),
                mistakes: slot(Readout::Mistakes),
            },
        }
    }
}

/// What a finished round looked like, captured the moment it ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundSummary {
    pub reason: String,
    pub finished_at: DateTime<Local>,
    pub paragraph_chars: usize,
    pub timer_elapsed_seconds: f64,
    pub metrics: MetricsSnapshot,
}

/// Composition root: one timer, one metrics calculator and one typing test
/// for the lifetime of the program, plus the paragraph source.
pub struct Session {
    timer: Timer,
    metrics: MetricsCalculator,
    test: TypingTest,
    provider: Box<dyn TextProvider>,
    readouts: Readouts,
    last_round: Option<RoundSummary>,
}

impl Session {
    pub fn new(
        config: &Config,
        mut provider: Box<dyn TextProvider>,
        clock: SharedClock,
    ) -> Result<Self> {
        let readouts = Readouts::wired(config);
        let mut timer =
            Timer::new(config.round_secs, clock.clone()).with_readouts(readouts.timer.clone());
        let mut metrics = MetricsCalculator::new(clock).with_readouts(readouts.metrics.clone());
        let test = TypingTest::init(TestSurfaces::all(), &mut timer, &mut metrics)?;

        if !provider.initialize() {
            log::warn!("paragraph source unavailable, continuing with the built-in paragraph");
        }

        let mut session = Self {
            timer,
            metrics,
            test,
            provider,
            readouts,
            last_round: None,
        };
        session.load_paragraph();
        Ok(session)
    }

    pub fn load_paragraph(&mut self) {
        let paragraph = self.provider.get_random_paragraph();
        if paragraph.is_empty() {
            self.test.show_message(LOAD_ERROR_MESSAGE);
        } else {
            self.test.set_paragraph(paragraph);
        }
    }

    /// Start a round. Ignored without a paragraph to type.
    pub fn start(&mut self) -> bool {
        if self.test.paragraph().is_empty() {
            return false;
        }
        self.test.start(&mut self.timer, &mut self.metrics);
        true
    }

    /// Back to the pre-start state with a fresh paragraph.
    pub fn try_again(&mut self) {
        self.test.reset(&mut self.timer, &mut self.metrics);
        self.load_paragraph();
    }

    pub fn type_char(&mut self, c: char) {
        self.edit_input(|input| input.push(c));
    }

    pub fn backspace(&mut self) {
        self.edit_input(InputField::backspace);
    }

    pub fn delete_word(&mut self) {
        self.edit_input(InputField::delete_word);
    }

    pub fn delete_line(&mut self) {
        self.edit_input(InputField::delete_line);
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut InputField) -> bool) {
        if !edit(self.test.input_mut()) {
            return;
        }
        let before = self.test.state();
        self.test.handle_input(&mut self.timer, &mut self.metrics);
        self.note_round_end(before);
    }

    /// Periodic callback: advance the timer and deliver what it reported.
    pub fn on_tick(&mut self) {
        self.timer.tick();
        for event in self.timer.drain_events() {
            if event == TimerEvent::Started {
                log::debug!("countdown running");
            }
            let before = self.test.state();
            self.test
                .handle_timer_event(event, &mut self.timer, &self.metrics);
            self.note_round_end(before);
        }
    }

    pub fn toggle_pause(&mut self) {
        if !self.test.is_running() {
            return;
        }
        if self.timer.is_paused() {
            self.timer.resume();
        } else {
            self.timer.pause();
        }
    }

    pub fn flush_render(&mut self) -> bool {
        self.test.flush_render()
    }

    fn note_round_end(&mut self, before: RoundState) {
        if before != RoundState::Running {
            return;
        }
        if let RoundState::Ended(reason) = self.test.state() {
            self.last_round = Some(self.summarize(reason));
        }
    }

    fn summarize(&self, reason: EndReason) -> RoundSummary {
        RoundSummary {
            reason: reason.to_string(),
            finished_at: Local::now(),
            paragraph_chars: self.test.paragraph().chars().count(),
            timer_elapsed_seconds: self.timer.elapsed().as_secs_f64(),
            metrics: self.metrics.get_metrics(),
        }
    }

    pub fn test(&self) -> &TypingTest {
        &self.test
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn metrics(&self) -> &MetricsCalculator {
        &self.metrics
    }

    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round.as_ref()
    }
}

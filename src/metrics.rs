use std::time::Instant;

use serde::Serialize;

use crate::clock::SharedClock;
use crate::display::{write_optional, MetricsReadouts};

/// Standard word length used for wpm: 5 characters, spaces included.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Point-in-time view of the current round's metrics
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub wpm: u32,
    pub cpm: u32,
    pub accuracy: f64,
    pub mistakes: usize,
    pub total_characters: usize,
    pub correct_characters: usize,
    pub elapsed_seconds: u64,
}

/// WPM / CPM / accuracy for the current round.
///
/// Counts are overwritten on every update and belong to one round only.
/// Derived values are recomputed on demand and never stored.
pub struct MetricsCalculator {
    total_characters: usize,
    correct_characters: usize,
    mistakes: usize,
    started_at: Option<Instant>,
    active: bool,
    clock: SharedClock,
    readouts: MetricsReadouts,
}

impl MetricsCalculator {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            total_characters: 0,
            correct_characters: 0,
            mistakes: 0,
            started_at: None,
            active: false,
            clock,
            readouts: MetricsReadouts::default(),
        }
    }

    pub fn with_readouts(mut self, readouts: MetricsReadouts) -> Self {
        self.readouts = readouts;
        self.update_display(0, 0, 0.0);
        self
    }

    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.started_at = Some(self.clock.now());
    }

    pub fn reset(&mut self) {
        self.total_characters = 0;
        self.correct_characters = 0;
        self.mistakes = 0;
        self.started_at = None;
        self.active = false;
        self.update_display(0, 0, 0.0);
    }

    /// Counts are taken as given, except `correct` is capped at `total`.
    pub fn set_counts(&mut self, total: usize, correct: usize, mistakes: usize) {
        if !self.active && total > 0 {
            self.start();
        }
        self.total_characters = total;
        self.correct_characters = correct.min(total);
        self.mistakes = mistakes;
    }

    pub fn update(&mut self, total: usize, correct: usize, mistakes: usize) {
        self.set_counts(total, correct, mistakes);
        self.calculate_and_update();
    }

    /// Recompute from the calculator's own clock and refresh the readouts.
    pub fn calculate_and_update(&self) {
        let minutes = self.elapsed_minutes();
        self.update_display(
            self.calculate_wpm(minutes),
            self.calculate_cpm(minutes),
            self.calculate_accuracy(),
        );
    }

    /// Words per minute from correct characters only.
    pub fn calculate_wpm(&self, elapsed_minutes: f64) -> u32 {
        if elapsed_minutes <= 0.0 || self.total_characters == 0 {
            return 0;
        }
        let words = self.correct_characters as f64 / CHARS_PER_WORD;
        (words / elapsed_minutes).round() as u32
    }

    /// Characters per minute from everything typed, mistakes included.
    pub fn calculate_cpm(&self, elapsed_minutes: f64) -> u32 {
        if elapsed_minutes <= 0.0 || self.total_characters == 0 {
            return 0;
        }
        (self.total_characters as f64 / elapsed_minutes).round() as u32
    }

    /// Percentage of correct characters, one decimal place.
    pub fn calculate_accuracy(&self) -> f64 {
        if self.total_characters == 0 {
            return 0.0;
        }
        let accuracy = self.correct_characters as f64 / self.total_characters as f64 * 100.0;
        (accuracy * 10.0).round() / 10.0
    }

    /// Refresh the readouts using elapsed time supplied by an external timer.
    pub fn update_with_elapsed_time(&self, elapsed_seconds: f64) {
        if elapsed_seconds <= 0.0 || self.total_characters == 0 {
            self.update_display(0, 0, 0.0);
            return;
        }
        let minutes = elapsed_seconds / 60.0;
        self.update_display(
            self.calculate_wpm(minutes),
            self.calculate_cpm(minutes),
            self.calculate_accuracy(),
        );
    }

    /// Snapshot based on the calculator's own clock, not the timer's.
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let minutes = self.elapsed_minutes();
        MetricsSnapshot {
            wpm: self.calculate_wpm(minutes),
            cpm: self.calculate_cpm(minutes),
            accuracy: self.calculate_accuracy(),
            mistakes: self.mistakes,
            total_characters: self.total_characters,
            correct_characters: self.correct_characters,
            elapsed_seconds: self.elapsed_seconds(),
        }
    }

    fn elapsed_minutes(&self) -> f64 {
        self.started_at
            .map(|at| self.clock.now().saturating_duration_since(at).as_secs_f64() / 60.0)
            .unwrap_or(0.0)
    }

    fn elapsed_seconds(&self) -> u64 {
        self.started_at
            .map(|at| self.clock.now().saturating_duration_since(at).as_secs())
            .unwrap_or(0)
    }

    fn update_display(&self, wpm: u32, cpm: u32, accuracy: f64) {
        write_optional(&self.readouts.wpm, wpm.to_string());
        write_optional(&self.readouts.cpm, cpm.to_string());
        write_optional(&self.readouts.accuracy, format!("{accuracy}%"));
        write_optional(&self.readouts.mistakes, self.mistakes.to_string());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn total_characters(&self) -> usize {
        self.total_characters
    }

    pub fn correct_characters(&self) -> usize {
        self.correct_characters
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }
}

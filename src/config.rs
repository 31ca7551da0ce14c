use clap::ValueEnum;
use std::path::PathBuf;

use crate::paragraphs::{FixedText, ParagraphBank, TextProvider};
use crate::timer::{DEFAULT_MAX_TIME_SECS, TICK_RATE_MS};

/// On-screen readouts that can be switched off.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Readout {
    Timer,
    Time,
    Wpm,
    Cpm,
    Accuracy,
    Mistakes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub round_secs: u64,
    pub tick_ms: u64,
    pub paragraphs: Option<PathBuf>,
    pub prompt: Option<String>,
    pub hidden: Vec<Readout>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            round_secs: DEFAULT_MAX_TIME_SECS,
            tick_ms: TICK_RATE_MS,
            paragraphs: None,
            prompt: None,
            hidden: Vec::new(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn shows(&self, readout: Readout) -> bool {
        !self.hidden.contains(&readout)
    }

    /// Fixed prompt wins over a paragraph file, which wins over the bundled list.
    pub fn text_provider(&self) -> Box<dyn TextProvider> {
        match (&self.prompt, &self.paragraphs) {
            (Some(prompt), _) => Box::new(FixedText::new(prompt.clone())),
            (None, Some(path)) => Box::new(ParagraphBank::from_file(path)),
            (None, None) => Box::new(ParagraphBank::bundled()),
        }
    }
}

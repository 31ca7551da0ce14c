use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;
use std::fs;
use std::path::PathBuf;

use crate::error::{KeysprintError, Result};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/data");

const BUNDLED_FILE: &str = "paragraphs.json";

pub const FALLBACK_PARAGRAPH: &str =
    "The quick brown fox jumps over the lazy dog. This is a sample paragraph for typing practice.";

/// Where target paragraphs come from.
pub trait TextProvider {
    /// Load the source. Returns false when the built-in fallback had to be used.
    fn initialize(&mut self) -> bool;
    /// A random paragraph, or an empty string when nothing is loaded.
    fn get_random_paragraph(&mut self) -> String;
    fn current_paragraph(&self) -> &str;
    fn is_loaded(&self) -> bool;
}

#[derive(Deserialize, Debug)]
struct ParagraphList {
    #[serde(default)]
    paragraphs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParagraphSource {
    Bundled,
    File(PathBuf),
}

/// Paragraph list read from a `{"paragraphs": [...]}` JSON document.
#[derive(Debug)]
pub struct ParagraphBank {
    source: ParagraphSource,
    paragraphs: Vec<String>,
    current: String,
    loaded: bool,
}

impl ParagraphBank {
    pub fn new(source: ParagraphSource) -> Self {
        Self {
            source,
            paragraphs: Vec::new(),
            current: String::new(),
            loaded: false,
        }
    }

    pub fn bundled() -> Self {
        Self::new(ParagraphSource::Bundled)
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(ParagraphSource::File(path.into()))
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    fn load(&self) -> Result<Vec<String>> {
        let text = match &self.source {
            ParagraphSource::Bundled => DATA_DIR
                .get_file(BUNDLED_FILE)
                .and_then(|file| file.contents_utf8())
                .ok_or(KeysprintError::MissingBundledList(BUNDLED_FILE))?
                .to_string(),
            ParagraphSource::File(path) => {
                fs::read_to_string(path).map_err(|source| KeysprintError::ParagraphSource {
                    path: path.clone(),
                    source,
                })?
            }
        };
        let list: ParagraphList = from_str(&text)?;
        Ok(list.paragraphs)
    }
}

impl TextProvider for ParagraphBank {
    fn initialize(&mut self) -> bool {
        let ok = match self.load() {
            Ok(paragraphs) => {
                if paragraphs.is_empty() {
                    log::warn!("no paragraphs found in {:?}", self.source);
                }
                self.paragraphs = paragraphs;
                true
            }
            Err(err) => {
                log::warn!("loading paragraphs failed ({err}), using the built-in paragraph");
                self.paragraphs = vec![FALLBACK_PARAGRAPH.to_string()];
                false
            }
        };
        self.loaded = true;
        ok
    }

    fn get_random_paragraph(&mut self) -> String {
        if !self.loaded {
            log::error!("paragraphs requested before they were loaded");
            self.current.clear();
            return String::new();
        }

        match self.paragraphs.choose(&mut rand::thread_rng()) {
            Some(paragraph) => self.current = paragraph.clone(),
            None => {
                log::error!("paragraph list is empty");
                self.current.clear();
            }
        }
        self.current.clone()
    }

    fn current_paragraph(&self) -> &str {
        &self.current
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Provider that always hands out the same text, for `--prompt`.
#[derive(Debug, Clone)]
pub struct FixedText {
    text: String,
    loaded: bool,
}

impl FixedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            loaded: false,
        }
    }
}

impl TextProvider for FixedText {
    fn initialize(&mut self) -> bool {
        self.loaded = true;
        true
    }

    fn get_random_paragraph(&mut self) -> String {
        if self.loaded {
            self.text.clone()
        } else {
            String::new()
        }
    }

    fn current_paragraph(&self) -> &str {
        &self.text
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_bundled_list_loads() {
        let mut bank = ParagraphBank::bundled();
        assert!(!bank.is_loaded());
        assert!(bank.initialize());
        assert!(bank.is_loaded());
        assert!(bank.paragraphs().len() > 1);
        assert!(bank.paragraphs().iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_random_paragraph_comes_from_list() {
        let mut bank = ParagraphBank::bundled();
        bank.initialize();

        for _ in 0..20 {
            let p = bank.get_random_paragraph();
            assert!(bank.paragraphs().contains(&p));
            assert_eq!(bank.current_paragraph(), p);
        }
    }

    #[test]
    fn test_not_loaded_returns_empty() {
        let mut bank = ParagraphBank::bundled();
        assert_eq!(bank.get_random_paragraph(), "");
        assert_eq!(bank.current_paragraph(), "");
    }

    #[test]
    fn test_file_source() {
        let file = file_with(r#"{"paragraphs": ["one two", "three four"]}"#);
        let mut bank = ParagraphBank::from_file(file.path());

        assert!(bank.initialize());
        assert_eq!(bank.paragraphs(), ["one two", "three four"]);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let mut bank = ParagraphBank::from_file(dir.path().join("absent.json"));

        assert!(!bank.initialize());
        assert!(bank.is_loaded());
        assert_eq!(bank.get_random_paragraph(), FALLBACK_PARAGRAPH);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let file = file_with("{ not json");
        let mut bank = ParagraphBank::from_file(file.path());

        assert!(!bank.initialize());
        assert_eq!(bank.paragraphs(), [FALLBACK_PARAGRAPH]);
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        let file = file_with(r#"{"paragraphs": "not a list"}"#);
        let mut bank = ParagraphBank::from_file(file.path());

        assert!(!bank.initialize());
        assert_eq!(bank.get_random_paragraph(), FALLBACK_PARAGRAPH);
    }

    #[test]
    fn test_empty_list_loads_but_yields_nothing() {
        let file = file_with(r#"{"paragraphs": []}"#);
        let mut bank = ParagraphBank::from_file(file.path());

        assert!(bank.initialize());
        assert_eq!(bank.get_random_paragraph(), "");
    }

    #[test]
    fn test_missing_key_is_an_empty_list() {
        let file = file_with(r#"{"other": 1}"#);
        let mut bank = ParagraphBank::from_file(file.path());

        assert!(bank.initialize());
        assert!(bank.paragraphs().is_empty());
    }

    #[test]
    fn test_fixed_text() {
        let mut fixed = FixedText::new("hello");
        assert_eq!(fixed.get_random_paragraph(), "");
        assert!(fixed.initialize());
        assert_eq!(fixed.get_random_paragraph(), "hello");
        assert_eq!(fixed.current_paragraph(), "hello");
    }
}

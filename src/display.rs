//! Display surfaces written by the timer, the metrics calculator and the
//! typing test. Every write is a full textual replacement; the terminal
//! front-end reads these surfaces back when it draws a frame.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A text readout shared between the component that writes it and the UI that draws it.
#[derive(Clone, Default, PartialEq)]
pub struct SharedText(Rc<RefCell<String>>);

impl SharedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.0.borrow_mut() = text.into();
    }

    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }
}

impl fmt::Debug for SharedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedText").field(&*self.0.borrow()).finish()
    }
}

/// Write `text` to an optional readout; absent readouts are skipped.
pub fn write_optional(slot: &Option<SharedText>, text: impl Into<String>) {
    if let Some(slot) = slot {
        slot.set(text);
    }
}

#[derive(Clone, Debug, Default)]
pub struct TimerReadouts {
    /// Remaining time as MM:SS
    pub clock: Option<SharedText>,
    /// Elapsed whole seconds, e.g. "12s"
    pub elapsed: Option<SharedText>,
}

#[derive(Clone, Debug, Default)]
pub struct MetricsReadouts {
    pub wpm: Option<SharedText>,
    pub cpm: Option<SharedText>,
    pub accuracy: Option<SharedText>,
    pub mistakes: Option<SharedText>,
}

/// A button-like control that is either shown or hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Control {
    pub visible: bool,
}

impl Control {
    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// The editable input line the user types into.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
    pub enabled: bool,
    pub focused: bool,
}

impl InputField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Edits are ignored while disabled, like a disabled form field.
    pub fn push(&mut self, c: char) -> bool {
        if !self.enabled {
            return false;
        }
        self.value.push(c);
        true
    }

    pub fn backspace(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.value.pop().is_some()
    }

    /// Delete back to the previous word boundary (Ctrl+W).
    pub fn delete_word(&mut self) -> bool {
        if !self.enabled || self.value.is_empty() {
            return false;
        }
        let trimmed = self.value.trim_end_matches(' ').len();
        let cut = self.value[..trimmed]
            .rfind(' ')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        self.value.truncate(cut);
        true
    }

    pub fn delete_line(&mut self) -> bool {
        if !self.enabled || self.value.is_empty() {
            return false;
        }
        self.value.clear();
        true
    }
}

/// Classification of one target position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharClass {
    Untyped,
    CorrectTyped,
    IncorrectTyped,
    Cursor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub class: CharClass,
}

/// Last rendered output of the target text area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextDisplay {
    Message(String),
    Glyphs(Vec<Glyph>),
}

impl Default for TextDisplay {
    fn default() -> Self {
        TextDisplay::Message(String::new())
    }
}

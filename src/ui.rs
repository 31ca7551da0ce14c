use itertools::Itertools;
use keysprint::{
    display::{CharClass, Glyph, SharedText, TextDisplay},
    session::Readouts,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn class_style(class: CharClass) -> Style {
    match class {
        CharClass::CorrectTyped => bold().fg(Color::Green),
        CharClass::IncorrectTyped => bold().fg(Color::Red),
        CharClass::Cursor => dim_bold().add_modifier(Modifier::UNDERLINED),
        CharClass::Untyped => dim_bold(),
    }
}

/// Never let target text reach the terminal as a control sequence.
fn visible_char(glyph: &Glyph) -> char {
    match glyph.ch {
        ' ' if glyph.class == CharClass::IncorrectTyped => '·',
        c if c.is_control() => char::REPLACEMENT_CHARACTER,
        c => c,
    }
}

fn glyph_spans(glyphs: &[Glyph]) -> Vec<Span<'static>> {
    let runs = glyphs.iter().chunk_by(|g| g.class);
    runs.into_iter()
        .map(|(class, run)| {
            Span::styled(run.map(visible_char).collect::<String>(), class_style(class))
        })
        .collect()
}

fn readout_spans(readouts: &Readouts) -> Vec<Span<'static>> {
    let labeled: [(&Option<SharedText>, &str); 5] = [
        (&readouts.timer.elapsed, ""),
        (&readouts.metrics.wpm, " wpm"),
        (&readouts.metrics.cpm, " cpm"),
        (&readouts.metrics.accuracy, " acc"),
        (&readouts.metrics.mistakes, " mistakes"),
    ];

    let parts = labeled
        .iter()
        .filter_map(|&(slot, label)| {
            slot.as_ref()
                .map(|text| format!("{}{}", text.get(), label))
        });

    Itertools::intersperse(parts, "   ".to_string())
        .map(|s| Span::styled(s, bold()))
        .collect()
}

/// Tail of the typed text that fits in `width` columns.
fn input_tail(typed: &str, width: usize) -> String {
    let mut used = 0;
    let mut tail: Vec<char> = typed
        .chars()
        .rev()
        .map(|c| if c.is_control() { char::REPLACEMENT_CHARACTER } else { c })
        .take_while(|c| {
            used += c.to_string().width();
            used <= width
        })
        .collect();
    tail.reverse();
    tail.into_iter().collect()
}

pub fn draw(app: &App, f: &mut Frame) {
    let session = &app.session;
    let test = session.test();
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // countdown
            Constraint::Length(1), // metrics
            Constraint::Length(1), // padding
            Constraint::Min(3),    // target text
            Constraint::Length(1), // input
            Constraint::Length(1), // key hints
        ])
        .split(area);

    let mut clock_spans = Vec::new();
    if let Some(clock) = &session.readouts().timer.clock {
        clock_spans.push(Span::styled(clock.get(), bold().fg(Color::Cyan)));
    }
    if session.timer().is_paused() {
        clock_spans.push(Span::styled(
            "  PAUSED",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(clock_spans)).alignment(Alignment::Center),
        chunks[0],
    );

    f.render_widget(
        Paragraph::new(Line::from(readout_spans(session.readouts()))).alignment(Alignment::Center),
        chunks[1],
    );

    let text_area = chunks[3];
    let text = match test.text_display() {
        TextDisplay::Message(message) => Paragraph::new(Span::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        TextDisplay::Glyphs(glyphs) => {
            // short prompts look best centered, long ones read better left aligned
            let fits = test.paragraph().width() <= text_area.width as usize;
            Paragraph::new(Line::from(glyph_spans(glyphs))).alignment(if fits {
                Alignment::Center
            } else {
                Alignment::Left
            })
        }
    };
    f.render_widget(text.wrap(Wrap { trim: false }), text_area);

    let input = test.input();
    let input_style = if input.enabled {
        bold()
    } else {
        dim_bold()
    };
    let tail = input_tail(input.value(), chunks[4].width.saturating_sub(2) as usize);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("› ", dim_bold()),
            Span::styled(tail, input_style),
        ])),
        chunks[4],
    );

    let hints = if test.is_running() {
        "tab pause   ctrl+w delete word   esc quit"
    } else if test.retry_control().is_some_and(|c| c.visible) {
        "enter / r try again   esc quit"
    } else if test.start_control().is_some_and(|c| c.visible) {
        "enter start   esc quit"
    } else {
        "esc quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            hints,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        chunks[5],
    );
}

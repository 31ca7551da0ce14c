mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use env_logger::{Env, Target};
use keysprint::{
    app_dirs::AppDirs,
    clock::system_clock,
    config::{Config, Readout},
    runtime::{AppEvent, InputQueue, Scheduler, TickSchedule},
    session::Session,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin, Stdout},
    path::{Path, PathBuf},
};

/// paragraph typing sprints against the clock
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a random paragraph against a countdown. The clock starts on your first keystroke; wpm, cpm, accuracy and mistakes update live."
)]
pub struct Cli {
    /// length of a round in seconds
    #[clap(short = 's', long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    seconds: u64,

    /// JSON file with a "paragraphs" list to practice on
    #[clap(short = 'p', long)]
    paragraphs: Option<PathBuf>,

    /// practice a fixed text instead of random paragraphs
    #[clap(long)]
    prompt: Option<String>,

    /// timer refresh interval in milliseconds
    #[clap(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(10..=1000))]
    tick_ms: u64,

    /// hide a readout; may be given more than once
    #[clap(long, value_enum)]
    hide: Vec<Readout>,

    /// append logs to this file (defaults to the state directory when RUST_LOG is set)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the last finished round as JSON on exit
    #[clap(long)]
    json: bool,
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            round_secs: self.seconds,
            tick_ms: self.tick_ms,
            paragraphs: self.paragraphs.clone(),
            prompt: self.prompt.clone(),
            hidden: self.hide.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: Session,
}

impl App {
    pub fn new(config: &Config) -> keysprint::Result<Self> {
        let session = Session::new(config, config.text_provider(), system_clock())?;
        Ok(Self { session })
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if ctrl => return Flow::Quit,
            _ => {}
        }

        if self.session.test().is_running() {
            match key.code {
                KeyCode::Tab => self.session.toggle_pause(),
                KeyCode::Backspace if ctrl || alt => self.session.delete_word(),
                KeyCode::Backspace => self.session.backspace(),
                KeyCode::Char('w') if ctrl => self.session.delete_word(),
                KeyCode::Char('u') if ctrl => self.session.delete_line(),
                KeyCode::Char(c) if !ctrl => self.session.type_char(c),
                _ => {}
            }
            return Flow::Continue;
        }

        let test = self.session.test();
        let start_shown = test.start_control().is_some_and(|c| c.visible);
        let retry_shown = test.retry_control().is_some_and(|c| c.visible);

        match key.code {
            KeyCode::Enter if start_shown => {
                self.session.start();
            }
            KeyCode::Enter | KeyCode::Char('r') if retry_shown => self.session.try_again(),
            _ => {}
        }
        Flow::Continue
    }
}

fn open_log_file(path: &Path) -> keysprint::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

fn init_logging(config: &Config) -> keysprint::Result<()> {
    let path = match &config.log_file {
        Some(path) => path.clone(),
        None if std::env::var_os("RUST_LOG").is_some() => match AppDirs::log_path() {
            Some(path) => path,
            None => return Ok(()),
        },
        // the terminal is in raw mode, so without a file there is nowhere to log
        None => return Ok(()),
    };

    let file = open_log_file(&path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
    Ok(())
}

fn setup_terminal() -> keysprint::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> keysprint::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.to_config();
    init_logging(&config)?;

    let mut app = App::new(&config)?;
    let mut terminal = setup_terminal()?;

    let scheduler = Scheduler::new(
        InputQueue::crossterm(),
        TickSchedule::from_millis(config.tick_ms),
    );
    let result = run_app(&mut terminal, &mut app, &scheduler);

    restore_terminal(&mut terminal)?;
    result?;

    if cli.json {
        if let Some(summary) = app.session.last_round() {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    scheduler: &Scheduler,
) -> keysprint::Result<()> {
    loop {
        // pending renders are coalesced into one per frame
        app.session.flush_render();
        terminal.draw(|f| ui::draw(app, f))?;

        match scheduler.next_event() {
            AppEvent::Tick => app.session.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keysprint::typing_test::{EndReason, RoundState};
    use ratatui::backend::TestBackend;
    use assert_matches::assert_matches;
    use keysprint::KeysprintError;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn app_with_prompt(prompt: &str) -> App {
        let config = Config {
            prompt: Some(prompt.to_string()),
            ..Default::default()
        };
        App::new(&config).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c))), Flow::Continue);
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["keysprint"]);
        let config = cli.to_config();
        assert_eq!(config, Config::default());
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from([
            "keysprint",
            "-s",
            "60",
            "--paragraphs",
            "list.json",
            "--tick-ms",
            "50",
            "--hide",
            "cpm",
            "--hide",
            "mistakes",
            "--log-file",
            "/tmp/keysprint-test.log",
            "--json",
        ]);
        let config = cli.to_config();
        assert_eq!(config.round_secs, 60);
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.paragraphs, Some(PathBuf::from("list.json")));
        assert_eq!(config.hidden, vec![Readout::Cpm, Readout::Mistakes]);
        assert_eq!(
            config.log_file,
            Some(PathBuf::from("/tmp/keysprint-test.log"))
        );
        assert!(cli.json);
    }

    #[test]
    fn test_cli_rejects_zero_seconds() {
        assert!(Cli::try_parse_from(["keysprint", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["keysprint", "--tick-ms", "5"]).is_err());
        assert!(Cli::try_parse_from(["keysprint", "--hide", "everything"]).is_err());
    }

    #[test]
    fn test_cli_prompt() {
        let cli = Cli::parse_from(["keysprint", "--prompt", "hello world"]);
        assert_eq!(cli.to_config().prompt, Some("hello world".to_string()));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with_prompt("abc");
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(app.handle_key(ctrl('c')), Flow::Quit);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.handle_key(ctrl('c')), Flow::Quit);
    }

    #[test]
    fn test_enter_starts_and_keys_type() {
        let mut app = app_with_prompt("abc");
        type_str(&mut app, "ab");
        assert_eq!(app.session.test().typed(), "");

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.test().state(), RoundState::Running);

        type_str(&mut app, "ab");
        assert_eq!(app.session.test().typed(), "ab");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session.test().typed(), "a");
    }

    #[test]
    fn test_control_chords_edit_input() {
        let mut app = app_with_prompt("one two three");
        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "one tw");

        app.handle_key(ctrl('w'));
        assert_eq!(app.session.test().typed(), "one ");

        app.handle_key(ctrl('u'));
        assert_eq!(app.session.test().typed(), "");
    }

    #[test]
    fn test_tab_toggles_pause() {
        let mut app = app_with_prompt("abc");
        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "a");
        assert!(app.session.timer().is_running());

        app.handle_key(key(KeyCode::Tab));
        assert!(app.session.timer().is_paused());
        app.handle_key(key(KeyCode::Tab));
        assert!(app.session.timer().is_running());
    }

    #[test]
    fn test_retry_after_completion() {
        let mut app = app_with_prompt("hi");
        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "hi");
        assert_eq!(
            app.session.test().state(),
            RoundState::Ended(EndReason::Completed)
        );

        // enter and r both mean try again once the round is over
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.session.test().state(), RoundState::Idle);

        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "hi");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.test().state(), RoundState::Idle);
    }

    #[test]
    fn test_r_types_while_running() {
        let mut app = app_with_prompt("run");
        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "r");
        assert_eq!(app.session.test().state(), RoundState::Running);
        assert_eq!(app.session.test().typed(), "r");
    }

    #[test]
    fn test_run_app_headless_session() {
        let mut app = app_with_prompt("ok");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let (tx, rx) = mpsc::channel();
        for ev in [
            key(KeyCode::Enter),
            key(KeyCode::Char('o')),
            key(KeyCode::Char('k')),
            key(KeyCode::Esc),
        ] {
            tx.send(AppEvent::Key(ev)).unwrap();
        }
        let scheduler = Scheduler::new(InputQueue::from_channel(rx), TickSchedule::from_millis(5));

        run_app(&mut terminal, &mut app, &scheduler).unwrap();

        assert_eq!(
            app.session.test().state(),
            RoundState::Ended(EndReason::Completed)
        );
        let summary = app.session.last_round().unwrap();
        assert_eq!(summary.reason, "completed");
        let json = serde_json::to_string(summary).unwrap();
        assert!(json.contains("\"reason\":\"completed\""));
    }

    #[test]
    fn test_round_times_out_while_typing_steadily() {
        let config = Config {
            round_secs: 1,
            tick_ms: 100,
            prompt: Some("b".repeat(200)),
            ..Default::default()
        };
        let mut app = App::new(&config).unwrap();
        app.handle_key(key(KeyCode::Enter));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        // a key every 40ms, faster than the tick interval, for 1.6s
        let (tx, rx) = mpsc::channel();
        let typist = thread::spawn(move || {
            for _ in 0..40 {
                if tx.send(AppEvent::Key(key(KeyCode::Char('a')))).is_err() {
                    return;
                }
                thread::sleep(Duration::from_millis(40));
            }
            let _ = tx.send(AppEvent::Key(key(KeyCode::Esc)));
        });
        let scheduler = Scheduler::new(
            InputQueue::from_channel(rx),
            TickSchedule::from_millis(config.tick_ms),
        );

        run_app(&mut terminal, &mut app, &scheduler).unwrap();
        typist.join().unwrap();

        assert_eq!(
            app.session.test().state(),
            RoundState::Ended(EndReason::Timeout)
        );
        let clock = app.session.readouts().timer.clock.as_ref().unwrap().get();
        assert_eq!(clock, "00:00");
        assert_eq!(app.session.last_round().unwrap().reason, "timeout");
    }

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("keysprint.log");

        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();

        // a directory cannot be opened for appending
        assert_matches!(open_log_file(dir.path()), Err(KeysprintError::Io(_)));
    }
}

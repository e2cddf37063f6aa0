mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;
use tugmath::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, MAX_LEVEL, MIN_LEVEL},
    controller::{Controller, Phase, Submission},
    problem::Operation,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker},
    session::{GameMode, Player},
    timers::{Scheduler, ThreadScheduler},
};

const MAX_ANSWER_LEN: usize = 6;

/// tug of war arithmetic practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answer arithmetic problems to pull the rope to your side. Play against a computer that keeps pulling on its own, or against a friend on the same keyboard."
)]
pub struct Cli {
    /// match type
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// operation preselected on the menu
    #[clap(short = 'o', long, value_enum)]
    operation: Option<Operation>,

    /// difficulty level
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u32).range(1..=3))]
    level: Option<u32>,

    /// read defaults from this config file instead of the user config dir
    #[clap(long)]
    config: Option<PathBuf>,

    /// write logs here (filter with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags win over whatever the config file says
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.game_mode = mode;
        }
        if let Some(operation) = self.operation {
            config.operation = operation;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        config.sanitized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    Playing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Presentation adapter: holds only what the player is typing and the last
/// answer feedback. Game rules stay in the controller.
pub struct App<S: Scheduler> {
    pub controller: Controller<S>,
    pub inputs: [String; 2],
    pub focus: Player,
    pub feedback: Option<Submission>,
}

impl<S: Scheduler> App<S> {
    pub fn new(mut controller: Controller<S>, config: &Config) -> Self {
        controller.select_mode(config.game_mode);
        controller.select_level(config.level);
        controller.select_operation(config.operation);
        Self {
            controller,
            inputs: [String::new(), String::new()],
            focus: Player::One,
            feedback: None,
        }
    }

    pub fn state(&self) -> AppState {
        match self.controller.phase() {
            Phase::Idle => AppState::Dashboard,
            Phase::Active => AppState::Playing,
            Phase::Ended(_) => AppState::Results,
        }
    }

    pub fn input(&self, player: Player) -> &str {
        &self.inputs[slot(player)]
    }

    fn clear_inputs(&mut self) {
        self.inputs.iter_mut().for_each(String::clear);
        self.focus = Player::One;
        self.feedback = None;
    }

    fn start(&mut self, operation: Operation, now: Instant) {
        let level = self.controller.state().level;
        self.clear_inputs();
        self.controller.start(operation, level, now);
    }

    fn shift_level(&mut self, up: bool) {
        let level = self.controller.state().level;
        let next = if up {
            (level + 1).min(MAX_LEVEL)
        } else {
            level.saturating_sub(1).max(MIN_LEVEL)
        };
        self.controller.select_level(next);
    }

    fn submit_focused(&mut self) {
        let player = self.focus;
        let raw = self.inputs[slot(player)].clone();
        if let Some(sub) = self.controller.submit(player, &raw) {
            self.inputs[slot(player)].clear();
            self.feedback = Some(sub);
        }
    }

    pub fn on_timer_event(&mut self, event: &GameEvent, now: Instant) {
        if let GameEvent::Timer(tick) = event {
            self.controller.on_timer(*tick, now);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        match self.state() {
            AppState::Dashboard => match key.code {
                KeyCode::Esc => return KeyOutcome::Quit,
                KeyCode::Tab => {
                    let mode = self.controller.state().game_mode.toggled();
                    self.controller.select_mode(mode);
                }
                KeyCode::Left | KeyCode::Char('-') => self.shift_level(false),
                KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => self.shift_level(true),
                KeyCode::Char(c @ '1'..='3') => {
                    self.controller.select_level(c as u32 - '0' as u32);
                }
                KeyCode::Char('a') => self.start(Operation::Addition, now),
                KeyCode::Char('s') => self.start(Operation::Subtraction, now),
                KeyCode::Char('m') => self.start(Operation::Multiplication, now),
                KeyCode::Char('d') => self.start(Operation::Division, now),
                KeyCode::Enter => {
                    let operation = self.controller.state().operation;
                    self.start(operation, now);
                }
                _ => {}
            },
            AppState::Playing => match key.code {
                KeyCode::Esc => {
                    self.controller.abort();
                    self.clear_inputs();
                }
                KeyCode::Tab => {
                    if self.controller.state().game_mode == GameMode::TwoPlayer {
                        self.focus = match self.focus {
                            Player::One => Player::Two,
                            Player::Two => Player::One,
                        };
                    }
                }
                KeyCode::Backspace => {
                    self.inputs[slot(self.focus)].pop();
                }
                KeyCode::Enter => self.submit_focused(),
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                    let input = &mut self.inputs[slot(self.focus)];
                    // a sign only makes sense in front
                    if c == '-' && !input.is_empty() {
                        return KeyOutcome::Continue;
                    }
                    if input.len() < MAX_ANSWER_LEN {
                        input.push(c);
                    }
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Esc => return KeyOutcome::Quit,
                KeyCode::Enter | KeyCode::Char('p') => {
                    self.controller.acknowledge();
                    self.clear_inputs();
                }
                _ => {}
            },
        }

        KeyOutcome::Continue
    }
}

fn slot(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

fn init_logging(path: Option<PathBuf>) -> io::Result<()> {
    let Some(path) = path.or_else(AppDirs::log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // a missing log file is not worth refusing to play over
    if let Err(err) = init_logging(cli.log_file.clone()) {
        eprintln!("logging disabled: {err}");
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = cli.apply(store.load_or_default());
    tracing::info!(?config, "starting");

    let events = CrosstermEventSource::new();
    let scheduler = ThreadScheduler::new(events.sender());
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms)),
    );
    let mut app = App::new(Controller::new(scheduler), &config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: Scheduler, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick | GameEvent::Resize => {}
            event @ GameEvent::Timer(_) => app.on_timer_event(&event, Instant::now()),
            GameEvent::Key(key) => {
                if app.handle_key(key, Instant::now()) == KeyOutcome::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

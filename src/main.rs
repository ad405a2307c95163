pub mod config;
pub mod export;
pub mod format;
pub mod meter;
pub mod money;
pub mod schedule;
mod ui;

use crate::{
    config::{parse_tuition_input, Config, ConfigStore, FileConfigStore, DEFAULT_TUITION_KRW},
    meter::{build_snapshot, Meter},
    schedule::{preset_calendar, preset_linear, preset_weekly, ScheduleSpec, SessionStatus},
};
use chrono::Utc;
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// terminal tuition burn-down meter
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Watch a fixed tuition fee melt away in real time as class hours elapse: live gauge, per-session cost table, and CSV export."
)]
pub struct Cli {
    /// tuition amount in KRW for this run (separators allowed; overrides the saved value)
    #[clap(short = 't', long)]
    tuition: Option<String>,

    /// built-in schedule preset
    #[clap(short = 'p', long, value_enum, default_value_t = Preset::Weekly)]
    preset: Preset,

    /// load the schedule from a JSON file instead of a preset
    #[clap(short = 'c', long, value_name = "FILE")]
    schedule: Option<PathBuf>,

    /// print a one-shot snapshot to stdout and exit
    #[clap(long)]
    summary: bool,

    /// write the session table as CSV to the given path and exit
    #[clap(long, value_name = "FILE")]
    export_sessions: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum Preset {
    Weekly,
    Calendar,
    Linear,
}

impl Preset {
    fn as_spec(&self) -> ScheduleSpec {
        match self {
            Preset::Weekly => preset_weekly(),
            Preset::Calendar => preset_calendar(),
            Preset::Linear => preset_linear(),
        }
    }
}

impl Cli {
    fn resolve_spec(&self) -> Result<ScheduleSpec, Box<dyn Error>> {
        match &self.schedule {
            Some(path) => {
                let bytes = fs::read(path)?;
                let spec: ScheduleSpec = serde_json::from_slice(&bytes)?;
                spec.validate()?;
                Ok(spec)
            }
            None => Ok(self.preset.as_spec()),
        }
    }

    /// CLI override beats the saved value; unparsable input burns nothing
    /// rather than erroring out.
    fn resolve_tuition(&self, store: &dyn ConfigStore) -> u64 {
        match &self.tuition {
            Some(raw) => parse_tuition_input(raw).unwrap_or(0),
            None => store.load().tuition_krw,
        }
    }

    fn source_label(&self) -> String {
        match &self.schedule {
            Some(path) => path.display().to_string(),
            None => self.preset.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Meter,
    Sessions,
    EditTuition,
}

#[derive(Debug, Default)]
pub struct SessionsState {
    pub scroll_offset: usize,
}

#[derive(Debug, Default)]
pub struct EditState {
    pub buffer: String,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub meter: Meter,
    pub state: AppState,
    pub sessions_state: SessionsState,
    pub edit: EditState,
    store: FileConfigStore,
}

impl App {
    pub fn from_parts(cli: Cli, spec: ScheduleSpec, tuition_krw: u64, store: FileConfigStore) -> Self {
        Self {
            meter: Meter::new(spec, tuition_krw),
            cli: Some(cli),
            state: AppState::Meter,
            sessions_state: SessionsState::default(),
            edit: EditState::default(),
            store,
        }
    }

    /// Commits the edit buffer: the meter updates immediately, and only a
    /// plausible amount is persisted (an empty or junk entry burns nothing
    /// and leaves the saved value alone).
    fn commit_tuition(&mut self) {
        let parsed = parse_tuition_input(&self.edit.buffer).unwrap_or(0);
        self.meter.set_tuition(parsed);
        if parsed > 0 {
            let _ = self.store.save(&Config {
                tuition_krw: parsed,
            });
        }
        self.edit.buffer.clear();
        self.state = AppState::Meter;
    }

    fn reset_tuition(&mut self) {
        let _ = self.store.reset();
        self.meter.set_tuition(DEFAULT_TUITION_KRW);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();

    let spec = match cli.resolve_spec() {
        Ok(spec) => spec,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, format!("failed to load schedule: {e}"))
                .exit();
        }
    };
    let tuition = cli.resolve_tuition(&store);

    if cli.summary {
        print_summary(&cli, &spec, tuition);
        return Ok(());
    }
    if let Some(path) = cli.export_sessions.clone() {
        return export_sessions(&path, &spec, tuition);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::from_parts(cli, spec, tuition, store);
    start_tui(&mut terminal, &mut app)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

fn print_summary(cli: &Cli, spec: &ScheduleSpec, tuition_krw: u64) {
    let now = Utc::now().with_timezone(&spec.offset());
    let snap = build_snapshot(spec, tuition_krw, now);

    println!("등록금이 살살 녹는다 ({})", cli.source_label());
    println!("{} 만큼 사용 중 • {}", snap.pct_text, snap.time_left_text);
    println!("지금까지 사용된 등록금: {}", snap.used_krw2);
    println!("남은 등록금: {}", snap.remain_krw2);
    println!("{}", snap.schedule_text);
    println!("{}", snap.rate_text);
    println!("{}", snap.end_hint);
}

fn export_sessions(path: &Path, spec: &ScheduleSpec, tuition_krw: u64) -> Result<(), Box<dyn Error>> {
    let now = Utc::now().with_timezone(&spec.offset());
    let snap = build_snapshot(spec, tuition_krw, now);
    let file = fs::File::create(path)?;
    export::write_sessions_csv(file, spec, now, snap.per_second)?;
    println!(
        "wrote {} sessions to {}",
        spec.sessions().len(),
        path.display()
    );
    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = get_app_events();

    terminal.draw(|f| ui(app, f))?;

    loop {
        match events.recv()? {
            AppEvent::Tick => {
                app.meter.on_tick();
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.state {
        AppState::Meter => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('s') => {
                app.sessions_state = SessionsState::default();
                app.state = AppState::Sessions;
            }
            KeyCode::Char('t') => {
                app.edit.buffer.clear();
                app.state = AppState::EditTuition;
            }
            KeyCode::Char('r') => {
                app.reset_tuition();
            }
            _ => {}
        },
        AppState::Sessions => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('b') | KeyCode::Backspace => {
                app.state = AppState::Meter;
            }
            KeyCode::Up => {
                app.sessions_state.scroll_offset =
                    app.sessions_state.scroll_offset.saturating_sub(1);
            }
            KeyCode::Down => {
                // Max scroll is clamped in the render function
                app.sessions_state.scroll_offset += 1;
            }
            KeyCode::PageUp => {
                app.sessions_state.scroll_offset =
                    app.sessions_state.scroll_offset.saturating_sub(10);
            }
            KeyCode::PageDown => {
                app.sessions_state.scroll_offset += 10;
            }
            KeyCode::Home => {
                app.sessions_state.scroll_offset = 0;
            }
            _ => {}
        },
        AppState::EditTuition => match key.code {
            KeyCode::Esc => {
                app.edit.buffer.clear();
                app.state = AppState::Meter;
            }
            KeyCode::Enter => {
                app.commit_tuition();
            }
            KeyCode::Backspace => {
                app.edit.buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == ',' => {
                app.edit.buffer.push(c);
            }
            _ => {}
        },
    }

    false
}

#[derive(Clone)]
enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

fn get_app_events() -> mpsc::Receiver<AppEvent> {
    let (tx, rx) = mpsc::channel();

    let tick_tx = tx.clone();
    thread::spawn(move || loop {
        if tick_tx.send(AppEvent::Tick).is_err() {
            break;
        }

        thread::sleep(Duration::from_millis(TICK_RATE_MS))
    });

    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
            Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };

        if let Some(evt) = evt {
            if tx.send(evt).is_err() {
                break;
            }
        }
    });

    rx
}

fn status_ko(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Past => "지남",
        SessionStatus::InProgress => "진행 중",
        SessionStatus::Upcoming => "예정",
    }
}

fn render_sessions(app: &mut App, f: &mut Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Modifier, Style},
        widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    };

    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Session table
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    let sessions = app.meter.spec.sessions();
    let now = app
        .meter
        .observed_at()
        .unwrap_or(app.meter.spec.start);
    let per_second = app.meter.snapshot().map_or(0.0, |s| s.per_second);

    let title = Paragraph::new(format!("수업 목록 ({}회)", sessions.len()))
        .block(Block::default().borders(Borders::ALL).title("Sessions"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    // Calculate scrolling bounds
    let table_height = chunks[1].height.saturating_sub(3) as usize; // Account for borders and header
    let total_rows = sessions.len();
    let max_scroll = total_rows.saturating_sub(table_height);

    // Clamp scroll offset
    if app.sessions_state.scroll_offset > max_scroll {
        app.sessions_state.scroll_offset = max_scroll;
    }

    let header = Row::new(vec![
        Cell::from("날짜"),
        Cell::from("요일"),
        Cell::from("시간"),
        Cell::from("수업시간"),
        Cell::from("수업료"),
        Cell::from("상태"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let visible_rows: Vec<Row> = sessions
        .iter()
        .skip(app.sessions_state.scroll_offset)
        .take(table_height)
        .map(|session| {
            use chrono::Datelike;

            let status = session.status(now);
            let status_style = match status {
                SessionStatus::Past => Style::default().fg(Color::DarkGray),
                SessionStatus::InProgress => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                SessionStatus::Upcoming => Style::default(),
            };
            let cost = session.duration_secs() as f64 * per_second;

            Row::new(vec![
                Cell::from(session.start.format("%Y-%m-%d").to_string()),
                Cell::from(format::weekday_ko(session.start.weekday())),
                Cell::from(format!(
                    "{}–{}",
                    session.start.format("%H:%M"),
                    session.end.format("%H:%M")
                )),
                Cell::from(format::format_duration_min(session.duration_secs() / 60)),
                Cell::from(format::format_krw0(cost)),
                Cell::from(status_ko(status)).style(status_style),
            ])
        })
        .collect();

    let scroll_info = if total_rows > table_height {
        format!(
            " ({}/{} rows)",
            app.sessions_state.scroll_offset + visible_rows.len().min(table_height),
            total_rows
        )
    } else {
        String::new()
    };

    let table = Table::new(
        visible_rows,
        &[
            Constraint::Length(12), // Date
            Constraint::Length(6),  // Weekday
            Constraint::Length(14), // Start-end
            Constraint::Length(14), // Duration
            Constraint::Length(14), // Cost
            Constraint::Length(10), // Status
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Schedule{}", scroll_info)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray));

    f.render_widget(table, chunks[1]);

    let instructions =
        Paragraph::new("↑/↓ PgUp/PgDn Home 스크롤 | (b)ack (esc) 종료")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

fn ui(app: &mut App, f: &mut Frame) {
    match app.state {
        AppState::Meter | AppState::EditTuition => {
            f.render_widget(&*app, f.area());
        }
        AppState::Sessions => {
            render_sessions(app, f);
        }
    }
}

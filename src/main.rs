use chrono::{Local, NaiveDate};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
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
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use cyclemon::config::{ConfigStore, FileConfigStore};
use cyclemon::dashboard::Dashboard;
use cyclemon::loader;
use cyclemon::runtime::{AppEvent, CrosstermEventSource, Runner};
use cyclemon::series::{CycleDataset, GapPolicy};
use cyclemon::ui::panel::HelpPanel;

const TICK_RATE_MS: u64 = 1000;

/// terminal dashboard for BESS daily cycle history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal dashboard showing a battery storage plant's charging and discharging cycles as a monthly stacked bar chart, with a per-day inspector for cycle counts, percentage shares, and energy throughput."
)]
pub struct Cli {
    /// daily cycles CSV to display
    #[clap(short = 'd', long)]
    data: Option<PathBuf>,

    /// run on generated demo data instead of a CSV
    #[clap(long, conflicts_with = "data")]
    demo: bool,

    /// seed for the demo generator, for a reproducible month
    #[clap(long, requires = "demo", conflicts_with = "data")]
    seed: Option<u64>,

    /// device name shown in the heading and the inspector
    #[clap(long)]
    device: Option<String>,

    /// month to open, as YYYY-MM (defaults to the current month)
    #[clap(short = 'm', long, value_parser = parse_month)]
    month: Option<NaiveDate>,

    /// top of the cycles axis
    #[clap(long)]
    max_cycles: Option<f64>,

    /// how to treat a day present in only one series
    #[clap(long, value_enum)]
    gap_policy: Option<GapPolicy>,
}

fn parse_month(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map_err(|_| format!("invalid month {s:?}, expected YYYY-MM"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Browse,
    Help,
}

#[derive(Debug)]
pub struct App {
    pub dashboard: Dashboard,
    pub state: AppState,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut cfg = store.load();
    if let Some(device) = &cli.device {
        cfg.device_name = device.clone();
    }
    if let Some(max_cycles) = cli.max_cycles {
        cfg.max_cycles = max_cycles;
    }
    if let Some(gap_policy) = cli.gap_policy {
        cfg.gap_policy = gap_policy;
    }

    let today = Local::now().date_naive();
    let month = cli.month.unwrap_or(today);

    let (charging, discharging) = if let Some(path) = &cli.data {
        loader::load_csv(path)?
    } else if cli.demo {
        loader::demo_month(month, cli.seed)
    } else {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "either --data <FILE> or --demo is required",
        )
        .exit();
    };

    // Validate and pair before touching the terminal so errors print cleanly
    let dataset = CycleDataset::pair(charging, discharging, cfg.gap_policy)?;
    let mut app = App {
        dashboard: Dashboard::new(dataset, &cfg, month, today),
        state: AppState::Browse,
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                // Ticks only matter for the date rolling over at midnight
                if app.dashboard.on_day_rollover(Local::now().date_naive()) {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.state {
                    AppState::Help => {
                        app.state = AppState::Browse;
                    }
                    AppState::Browse => match key.code {
                        KeyCode::Esc => {
                            // First Esc drops the selection, the next one quits
                            if !app.dashboard.clear_selection() {
                                break;
                            }
                        }
                        KeyCode::Char('q') => break,
                        KeyCode::Left | KeyCode::Char('h') => app.dashboard.select_prev_day(),
                        KeyCode::Right | KeyCode::Char('l') => app.dashboard.select_next_day(),
                        KeyCode::Char('p') | KeyCode::Char('[') => app.dashboard.prev_month(),
                        KeyCode::Char('n') | KeyCode::Char(']') => app.dashboard.next_month(),
                        KeyCode::Char('t') => app.dashboard.jump_to_today(),
                        KeyCode::Char('?') => app.state = AppState::Help,
                        _ => {}
                    },
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(&app.dashboard, f.area());
    if app.state == AppState::Help {
        f.render_widget(HelpPanel, f.area());
    }
}

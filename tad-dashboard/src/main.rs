mod driver;
mod export;
mod stream;
mod theme;
mod ui;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::Show,
    event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use driver::{Driver, DriverError, DEFAULT_MIN_RENDER_INTERVAL};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tad_core::{AgentName, AgentStatus, DashboardState, Event, ReportSection, DEFAULT_RING_CAPACITY};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tad")]
#[command(about = "Trading Agents dashboard: live multi-agent analysis TUI", long_about = None)]
struct Cli {
    /// Ticker symbol to analyze
    #[arg(long, default_value = "SPY")]
    ticker: String,
    /// Analysis date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Analyst stages to run
    #[arg(long, value_enum, value_delimiter = ',',
          default_values_t = vec![AnalystArg::Market, AnalystArg::Social, AnalystArg::News, AnalystArg::Fundamentals])]
    analysts: Vec<AnalystArg>,
    /// Research debate rounds
    #[arg(long, default_value_t = 2)]
    research_depth: u32,
    /// LLM provider name
    #[arg(long, default_value = "openai")]
    provider: String,
    /// Provider endpoint
    #[arg(long, default_value = "http://localhost:8000/v1")]
    backend_url: String,
    /// Directory final reports are exported to
    #[arg(long, default_value = "./trading_results")]
    results_dir: PathBuf,
    /// Delay between demo records, in milliseconds
    #[arg(long, default_value_t = 400)]
    record_delay_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AnalystArg {
    Market,
    Social,
    News,
    Fundamentals,
}

impl std::fmt::Display for AnalystArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnalystArg::Market => "market",
            AnalystArg::Social => "social",
            AnalystArg::News => "news",
            AnalystArg::Fundamentals => "fundamentals",
        };
        f.write_str(name)
    }
}

impl AnalystArg {
    fn section(self) -> ReportSection {
        match self {
            AnalystArg::Market => ReportSection::Market,
            AnalystArg::Social => ReportSection::Sentiment,
            AnalystArg::News => ReportSection::News,
            AnalystArg::Fundamentals => ReportSection::Fundamentals,
        }
    }

    fn agent(self) -> AgentName {
        match self {
            AnalystArg::Market => AgentName::MarketAnalyst,
            AnalystArg::Social => AgentName::SocialAnalyst,
            AnalystArg::News => AgentName::NewsAnalyst,
            AnalystArg::Fundamentals => AgentName::FundamentalsAnalyst,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tad: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let date = cli
        .date
        .clone()
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    let sections: Vec<ReportSection> = cli.analysts.iter().map(|arg| arg.section()).collect();

    let mut store = DashboardState::with_config(&selected_roster(&cli.analysts), DEFAULT_RING_CAPACITY);
    store.apply(Event::MessageLogged {
        category: "System".to_string(),
        content: format!(
            "Analyzing {} on {} via {} ({})",
            cli.ticker, date, cli.provider, cli.backend_url
        ),
    });
    if let Some(first) = cli.analysts.first() {
        store.apply(Event::AgentStatusUpdate {
            agent: first.agent(),
            status: AgentStatus::InProgress,
        });
    }

    let records = stream::scripted_demo(&cli.ticker, &date, &sections, cli.research_depth)
        .with_delay(Duration::from_millis(cli.record_delay_ms));

    let mut terminal = setup_terminal()?;
    terminal.clear()?;
    let renderer = ui::TerminalRenderer::new(terminal);
    let result = Driver::new(store, renderer, DEFAULT_MIN_RENDER_INTERVAL)
        .run(records, user_interrupted);
    restore_terminal()?;

    match result {
        Ok(report) => {
            if report.cancelled {
                println!("Analysis cancelled.");
                return Ok(ExitCode::SUCCESS);
            }
            if let Some(final_report) = report.snapshot.assembled_report() {
                println!("Complete Analysis Report: {} ({})\n", cli.ticker, date);
                println!("{final_report}");
            }
            if let Some(path) =
                export::export_final_report(&report.snapshot, &cli.results_dir, &cli.ticker, &date)?
            {
                println!("\nSaved report to {}", path.display());
            }
            if report.render_failures > 0 {
                eprintln!(
                    "tad: {} render call(s) failed during the run",
                    report.render_failures
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(DriverError::Stream(err)) => {
            eprintln!("tad: analysis stream failed: {err}");
            Ok(ExitCode::from(2))
        }
    }
}

/// Full roster minus the analyst stages the operator deselected.
fn selected_roster(analysts: &[AnalystArg]) -> Vec<AgentName> {
    let selected: Vec<AgentName> = analysts.iter().map(|arg| arg.agent()).collect();
    AgentName::ALL
        .into_iter()
        .filter(|agent| agent.team() != tad_core::Team::Analyst || selected.contains(agent))
        .collect()
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

/// Drains pending key events; true on q, Esc, or ctrl-c. Consulted by the
/// driver only at iteration boundaries.
fn user_interrupted() -> bool {
    let mut interrupted = false;
    while event::poll(Duration::ZERO).unwrap_or(false) {
        if let Ok(TermEvent::Key(key)) = event::read() {
            if !matches!(key.kind, KeyEventKind::Press) {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => interrupted = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    interrupted = true
                }
                _ => {}
            }
        }
    }
    interrupted
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_enabled = matches!(
        std::env::var("TAD_LOG_STDOUT").ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    );
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        // Logs would tear the alternate screen; drop them unless asked for.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}

use aldeias_tui::app::{App, Focus};
use aldeias_tui::binder::{Catalog, ViewBinder};
use aldeias_tui::config::AppConfig;
use aldeias_tui::data::{self, Dataset};
use aldeias_tui::filter::AggregateCount;
use aldeias_tui::ui;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when ./config.toml is absent)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Dataset CSV, overriding `input.dataset`
    #[arg(long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Browse,
    /// Print the derived views for a selection as JSON
    Export {
        /// Region name to select (repeatable)
        #[arg(long = "region", value_name = "REGION")]
        regions: Vec<String>,
        /// State code to select (repeatable)
        #[arg(long = "state", value_name = "UF")]
        states: Vec<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the per-state locality counts for a selection
    Counts {
        #[arg(long = "region", value_name = "REGION")]
        regions: Vec<String>,
        #[arg(long = "state", value_name = "UF")]
        states: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(Path::new("config.toml"))?,
    };
    if let Some(path) = &cli.data {
        config.input.dataset = path.clone();
    }

    let command = cli.command.unwrap_or(Commands::Browse);
    let log_to_file = matches!(command, Commands::Browse);
    init_tracing(cli.verbose, &config, log_to_file)?;

    let catalog = Arc::new(load_catalog(&config)?);

    match command {
        Commands::Browse => browse(catalog, &config),
        Commands::Export {
            regions,
            states,
            pretty,
        } => {
            let mut binder = ViewBinder::new(catalog, config.view.stale_states);
            binder.region_selection_changed(regions);
            let views = binder.state_selection_changed(states);
            let json = if pretty {
                serde_json::to_string_pretty(&views)?
            } else {
                serde_json::to_string(&views)?
            };
            println!("{}", json);
            Ok(())
        }
        Commands::Counts { regions, states } => {
            let mut binder = ViewBinder::new(catalog, config.view.stale_states);
            binder.region_selection_changed(regions);
            let views = binder.state_selection_changed(states);
            print_counts(&views.counts);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8, config: &AppConfig, log_to_file: bool) -> Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.log.level.as_deref().unwrap_or("info"))
        }),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if log_to_file {
        // The dashboard owns the terminal, so logs go to a file
        let file = File::create(&config.log.file)
            .with_context(|| format!("Failed to create log file: {:?}", config.log.file))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    let dataset = Dataset::load(&config.input.dataset, config.delimiter()?)
        .with_context(|| format!("Failed to load dataset {:?}", config.input.dataset))?;
    Ok(Catalog::new(dataset))
}

fn print_counts(counts: &[AggregateCount]) {
    let region_width = counts.iter().map(|c| c.region.chars().count()).max().unwrap_or(0).max(6);
    let state_width = counts.iter().map(|c| c.state_name.chars().count()).max().unwrap_or(0).max(6);

    println!(
        "{:<rw$}  {:<4}  {:<sw$}  {:<4}  {:>6}",
        "REGIAO",
        "SIG",
        "ESTADO",
        "UF",
        "ALDEIAS",
        rw = region_width,
        sw = state_width
    );
    for c in counts {
        println!(
            "{:<rw$}  {:<4}  {:<sw$}  {:<4}  {:>6}",
            c.region,
            c.region_code,
            c.state_name,
            c.state,
            c.count,
            rw = region_width,
            sw = state_width
        );
    }
    let total: u64 = counts.iter().map(|c| c.count).sum();
    println!("total: {}", total);
}

fn browse(catalog: Arc<Catalog>, config: &AppConfig) -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, catalog, config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for hover, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved => app.hover(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Left) => app.start_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, catalog: Arc<Catalog>, config: &AppConfig) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(catalog, config, size.width, size.height);

    if let Some(path) = &config.input.outline {
        match data::load_outline(path) {
            Ok(lines) => app.map_renderer.set_outline(lines),
            Err(e) => tracing::warn!("outline not loaded: {:#}", e),
        }
    }

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    KeyCode::Tab => app.focus_next(),
                    KeyCode::BackTab => app.focus_prev(),

                    KeyCode::Up | KeyCode::Char('k') => app.move_up(),
                    KeyCode::Down | KeyCode::Char('j') => app.move_down(),
                    KeyCode::Left | KeyCode::Char('h') if app.focus == Focus::Map => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') if app.focus == Focus::Map => app.pan(10, 0),

                    KeyCode::Char(' ') | KeyCode::Enter => app.toggle(),
                    KeyCode::Char('c') => app.clear_focused(),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                    KeyCode::Char('o') => app.map_renderer.toggle_outline(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

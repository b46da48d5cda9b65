mod app;
mod db;
mod editor;
mod export;
mod persist;
mod types;
mod ui;
mod validate;
mod worker;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use db::{Database, DatabaseError};
use export::{export, ExportFormat};
use persist::{PersistenceCoordinator, DEFAULT_AUTOSAVE_INTERVAL};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use types::DiagramUpdate;
use tracing_subscriber::EnvFilter;
use validate::{validate_schema, Summary};

#[derive(Parser)]
#[command(name = "erdly")]
#[command(about = "A keyboard-first TUI editor for entity-relationship diagrams")]
struct Cli {
    /// Diagram store file path (created if missing)
    #[arg(value_name = "DATABASE")]
    database: Option<String>,

    /// Diagram to open; defaults to the most recently updated one
    #[arg(long)]
    diagram: Option<String>,

    /// Seconds between auto-saves
    #[arg(long, default_value_t = DEFAULT_AUTOSAVE_INTERVAL.as_secs())]
    autosave_secs: u64,

    /// Name recorded on captured versions
    #[arg(long, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty diagram
    New {
        /// Diagram store file path
        #[arg(long, short)]
        db: String,

        #[arg(long, short)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    /// List diagrams, most recently updated first
    List {
        #[arg(long, short)]
        db: String,
    },
    /// Change a diagram's name or description
    Rename {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        diagram: String,

        #[arg(long, short)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a diagram and its versions
    Delete {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        diagram: String,
    },
    /// Check a diagram for schema problems
    Validate {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        diagram: String,
    },
    /// List the saved versions of a diagram
    Versions {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        diagram: String,
    },
    /// Print one version as JSON
    ShowVersion {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        version: String,
    },
    /// Delete one version
    DeleteVersion {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        version: String,
    },
    /// Turn public sharing of a diagram on or off
    Share {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        diagram: String,

        #[arg(long, conflicts_with = "disable", required_unless_present = "disable")]
        enable: bool,

        #[arg(long)]
        disable: bool,
    },
    /// Print a shared diagram as JSON, looked up by its public id
    Public {
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        public_id: String,
    },
    /// Export a diagram
    Export {
        /// Diagram store file path
        #[arg(long, short)]
        db: String,

        #[arg(long)]
        diagram: String,

        /// Output format
        #[arg(long, short, value_enum)]
        format: ExportFormatArg,

        /// Output file path
        #[arg(long, short)]
        out: String,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum ExportFormatArg {
    Csv,
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(fmt: ExportFormatArg) -> Self {
        match fmt {
            ExportFormatArg::Csv => ExportFormat::Csv,
            ExportFormatArg::Json => ExportFormat::Json,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(command) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .init();
            run_command(command)
        }
        None => {
            // The terminal belongs to the UI, so logs go to a file
            let log_file = std::fs::File::create("erdly.log")
                .context("Failed to create log file erdly.log")?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::sync::Mutex::new(log_file))
                .with_ansi(false)
                .init();

            let db_path = cli.database.context("Database path is required")?;
            run_tui(
                &db_path,
                cli.diagram,
                Duration::from_secs(cli.autosave_secs.max(1)),
                cli.user,
            )
        }
    }
}

fn open_diagram(database: &Database, id: &str) -> Result<types::DiagramRecord> {
    db::get_diagram(database.connection(), id)?
        .ok_or_else(|| DatabaseError::DiagramNotFound(id.to_string()).into())
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::New {
            db,
            name,
            description,
        } => {
            let database = Database::create(&db)?;
            let diagram = db::create_diagram(database.connection(), &name, &description)?;
            println!("{}", diagram.id);
        }
        Commands::List { db } => {
            let database = Database::new(&db, true)?;
            for diagram in db::list_diagrams(database.connection())? {
                println!(
                    "{}\t{}\t{}\t{} tables",
                    diagram.id,
                    diagram.name,
                    diagram.updated_at.format("%Y-%m-%d %H:%M:%S"),
                    diagram.nodes.len()
                );
            }
        }
        Commands::Rename {
            db,
            diagram,
            name,
            description,
        } => {
            let database = Database::new(&db, false)?;
            let update = DiagramUpdate {
                name,
                description,
                graph: None,
            };
            let updated = db::update_diagram(database.connection(), &diagram, update)?;
            println!("{}\t{}", updated.id, updated.name);
        }
        Commands::Delete { db, diagram } => {
            let database = Database::new(&db, false)?;
            if !db::delete_diagram(database.connection(), &diagram)? {
                return Err(DatabaseError::DiagramNotFound(diagram).into());
            }
            println!("Deleted: {}", diagram);
        }
        Commands::Validate { db, diagram } => {
            let database = Database::new(&db, true)?;
            let diagram = open_diagram(&database, &diagram)?;
            let diagnostics = validate_schema(&diagram.nodes, &diagram.edges);
            for diagnostic in &diagnostics {
                println!("{}: {}", diagnostic.severity, diagnostic.message);
            }
            let summary = Summary::of(&diagnostics);
            println!("{}", summary);
            if summary.errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Versions { db, diagram } => {
            let database = Database::new(&db, true)?;
            let diagram = open_diagram(&database, &diagram)?;
            for version in db::fetch_versions(database.connection(), &diagram.id)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    version.id,
                    version.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    version.name,
                    version.created_by
                );
            }
        }
        Commands::ShowVersion { db, version } => {
            let database = Database::new(&db, true)?;
            let found = db::get_version(database.connection(), &version)?
                .ok_or(DatabaseError::VersionNotFound(version))?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        Commands::DeleteVersion { db, version } => {
            let database = Database::new(&db, false)?;
            db::delete_version(database.connection(), &version)?;
            println!("Deleted version: {}", version);
        }
        Commands::Share {
            db,
            diagram,
            enable,
            disable,
        } => {
            let database = Database::new(&db, false)?;
            let is_public = enable && !disable;
            let shared = db::set_public_sharing(database.connection(), &diagram, is_public)?;
            match shared.public_id {
                Some(public_id) => println!("Shared as: {}", public_id),
                None => println!("Sharing disabled for: {}", shared.id),
            }
        }
        Commands::Public { db, public_id } => {
            let database = Database::new(&db, true)?;
            let diagram = db::get_public_diagram(database.connection(), &public_id)?
                .with_context(|| format!("No public diagram with id: {}", public_id))?;
            println!("{}", export::render_json(&diagram)?);
        }
        Commands::Export {
            db,
            diagram,
            format,
            out,
        } => {
            let database = Database::new(&db, true)?;
            let diagram = open_diagram(&database, &diagram)?;
            export(&diagram, format.into(), Path::new(&out))?;
            println!("Exported to: {}", out);
        }
    }
    Ok(())
}

fn run_tui(
    db_path: &str,
    diagram_id: Option<String>,
    autosave_interval: Duration,
    user: String,
) -> Result<()> {
    let database = Database::create(db_path)
        .with_context(|| format!("Failed to open diagram store: {}", db_path))?;

    // Create worker with store connection
    let worker = worker::Worker::new(database.into_connection());
    let persistence = PersistenceCoordinator::new(autosave_interval, user);
    let export_dir = std::env::current_dir().context("Failed to read working directory")?;

    let mut app = App::new(worker, persistence, export_dir);
    app.open_diagram(diagram_id);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if app.should_quit() {
            break;
        }

        app.process_worker_responses()?;
        app.tick(Instant::now());

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key_event(key)?;
                }
                Event::Resize(_, _) => {
                    // Terminal will automatically redraw on next draw() call
                }
                _ => {}
            }
        }
    }

    // Cleanup
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.shutdown()?;

    Ok(())
}

//! Binary entry point that glues the SQLite-backed domain model to the TUI:
//! bring up logging and the database, optionally seed demo data, construct
//! the repository and controllers by hand, and drive the Ratatui event loop
//! until the user exits.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skill_tracker::controllers::{DetailController, ListController};
use skill_tracker::prefs::Preferences;
use skill_tracker::seed;
use skill_tracker::{data_dir, default_db_path, run_app, App, SkillRepository, Store};

/// Log file name inside the application data directory. The terminal belongs
/// to the TUI, so diagnostics go to a file instead.
const LOG_FILE_NAME: &str = "skill-tracker.log";

fn main() -> Result<()> {
    let dir = data_dir()?;
    init_logging(&dir)?;

    let store = Arc::new(
        Store::open_at(&default_db_path()?).context("failed to open the skill database")?,
    );
    if std::env::args().any(|arg| arg == "--seed") {
        seed::populate_database(&store).context("failed to seed demo data")?;
    }

    let repository = Arc::new(SkillRepository::new(Arc::clone(&store)));
    let list_controller = ListController::new(Arc::clone(&repository));
    let detail_controller = DetailController::new(repository);
    let prefs = Preferences::load(&dir);

    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    runtime
        .block_on(list_controller.refresh())
        .context("failed to load the skill list")?;

    let mut app = App::new(
        runtime.handle().clone(),
        list_controller,
        detail_controller,
        prefs,
        dir,
    );
    run_app(&mut app)
}

fn init_logging(dir: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .context("failed to open log file")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("skill_tracker=info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
    Ok(())
}

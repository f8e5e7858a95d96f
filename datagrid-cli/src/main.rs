//! Demo driver for the data grid controller.
//!
//! Usage: `datagrid <scenario.json>`
//!
//! Loads the scenario into an in-memory store, replays its sort and edits,
//! optionally saves, and prints the resulting grid state as JSON. Logs go to
//! `datagrid.log`; set `DATAGRID_LOG` to change the level.

mod scenario;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use datagrid_lib::GridController;
use datagrid_lib::service::GridServices;
use datagrid_lib::service::InMemoryStore;
use serde_json::json;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::scenario::Scenario;

const LOG_FILE: &str = "datagrid.log";
const LOG_ENV: &str = "DATAGRID_LOG";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("usage: datagrid <scenario.json>")]
    Usage,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to initialize logger: {0}")]
    Logger(String),
}

fn init_logger() -> Result<(), CliError> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    let log_file = File::create(LOG_FILE).map_err(|e| CliError::Logger(e.to_string()))?;
    WriteLogger::init(level, Config::default(), log_file).map_err(|e| CliError::Logger(e.to_string()))
}

async fn run(path: PathBuf) -> Result<serde_json::Value, CliError> {
    let scenario = Scenario::load(&path)?;
    log::info!("Running scenario {} for {}", path.display(), scenario.object_name);

    let key_field = scenario.config.key_field.clone();
    let store = Arc::new(
        InMemoryStore::new(key_field, scenario.rows.clone()).with_validator(scenario.validator()),
    );
    let mut grid = GridController::new(scenario.config.clone(), GridServices::shared(store.clone()));

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    grid.subscribe(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(event.name());
        }
    });

    grid.initialize(&scenario.object_name, scenario.columns, scenario.rows);
    if let Some(sort) = scenario.sort {
        grid.handle_column_sort(&sort.field_name, sort.direction);
    }
    for batch in &scenario.edits {
        grid.handle_cell_change(batch);
    }
    let outcome = if scenario.save {
        grid.save(grid.draft_values().to_vec()).await
    } else {
        None
    };

    let events = events.lock().map(|e| e.clone()).unwrap_or_default();
    Ok(json!({
        "columns": grid.columns(),
        "rows": grid.rows(),
        "recordCount": grid.record_count(),
        "sort": grid.sort(),
        "drafts": grid.draft_values(),
        "saveErrors": grid.save_errors(),
        "saved": outcome.as_ref().map(|o| o.saved),
        "failed": outcome.as_ref().map(|o| o.failed),
        "events": events,
    }))
}

#[tokio::main]
async fn main() {
    if let Err(e) = init_logger() {
        eprintln!("Error: {}", e);
    }

    let result = match std::env::args_os().nth(1) {
        Some(path) => run(PathBuf::from(path)).await,
        None => Err(CliError::Usage),
    };

    match result.and_then(|state| serde_json::to_string_pretty(&state).map_err(CliError::from)) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

//! StudyBud store probe.
//!
//! # Responsibility
//! - Open the store described by `STUDYBUD_*` environment variables.
//! - Verify the live schema and print per-table row counts.
//!
//! Exit status is non-zero when configuration, open or verification fails.

use log::{error, info};
use std::process::ExitCode;
use studybud_core::db::{schema_version, table_counts};
use studybud_core::{
    core_version, default_log_level, init_logging, open_store, verify_schema, StoreConfig,
    StoreLocation,
};

const LOG_LEVEL_ENV: &str = "STUDYBUD_LOG_LEVEL";
const LOG_DIR_ENV: &str = "STUDYBUD_LOG_DIR";

fn main() -> ExitCode {
    if let Some(log_dir) = std::env::var_os(LOG_DIR_ENV) {
        let level =
            std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| default_log_level().to_string());
        if let Err(err) = init_logging(&level, &log_dir) {
            eprintln!("studybud: logging disabled: {err}");
        }
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_probe module=cli status=error error={message}");
            eprintln!("studybud: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    let location = match &config.location {
        StoreLocation::File(path) => path.display().to_string(),
        StoreLocation::Memory => ":memory:".to_string(),
    };

    let conn = open_store(&config).map_err(|err| format!("open `{location}`: {err}"))?;
    verify_schema(&conn).map_err(|err| format!("schema check failed: {err}"))?;
    let version = schema_version(&conn).map_err(|err| err.to_string())?;

    println!("studybud_core version={}", core_version());
    println!("store={location} schema_version={version}");
    for (table, rows) in table_counts(&conn).map_err(|err| err.to_string())? {
        println!("{table} rows={rows}");
    }

    info!("event=cli_probe module=cli status=ok schema_version={version}");
    Ok(())
}

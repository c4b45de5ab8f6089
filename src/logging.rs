// src/logging.rs

use crate::{
    constants::LOG_FILE_BASENAME,
    errors::GltchResult,
    models::ApiCallLog,
};
use flexi_logger::{detailed_format, FileSpec, Logger, LoggerHandle};
use std::path::Path;

/// Starts file logging. The terminal belongs to the UI, so nothing goes to stderr.
/// Keep the returned handle alive for the lifetime of the program.
pub fn init_logging(level: &str, directory: &Path) -> GltchResult<LoggerHandle> {
    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(directory)
                .basename(LOG_FILE_BASENAME)
                .suppress_timestamp(),
        )
        .append()
        .format(detailed_format)
        .start()?;
    Ok(handle)
}

/// Logs an API call to the `gltch::api` target.
pub fn log_api_call(log: &ApiCallLog) {
    let status = log
        .response_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unreachable".to_string());
    log::info!(
        target: "gltch::api",
        "[{}] {} {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.method,
        log.endpoint,
        status,
        log.response_time_ms
    );
}

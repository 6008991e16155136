use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use chrono::Utc;
use crate::provider::Provider;

/// Append one line per vendor exchange. Credentials and message text are
/// never written.
pub fn log_exchange(
    log_path: &Path,
    provider: Provider,
    outcome: &str,
    message_count: usize,
    elapsed: Duration,
) {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
    let log_entry = format!(
        "{} | {:8} | {:16} | {:4} messages | {:6} ms\n",
        timestamp, provider.as_str(), outcome, message_count, elapsed.as_millis()
    );

    match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(mut file) => {
            if let Err(err) = file.write_all(log_entry.as_bytes()) {
                tracing::warn!(path = %log_path.display(), error = %err, "failed to write request log");
            }
        }
        Err(err) => {
            tracing::warn!(path = %log_path.display(), error = %err, "failed to open request log");
        }
    }
}

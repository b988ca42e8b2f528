use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// One provider call attempt, success or failure. Advisory observability
/// data only; nothing reads this back at runtime.
#[derive(Debug, Serialize)]
pub struct RequestLogEntry {
    pub ts: String,
    pub model: String,
    pub variants: usize,
    pub duration_ms: u64,
    /// "ok" or the error kind label.
    pub outcome: String,
}

/// Writes request timing observations to a JSONL file from a background task,
/// rotating the file once when it outgrows the size cap.
#[derive(Clone)]
pub struct RequestLog {
    tx: mpsc::UnboundedSender<RequestLogEntry>,
}

impl RequestLog {
    pub fn new(log_path: PathBuf, max_size_mb: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::writer_task(rx, log_path, max_size_mb));
        Self { tx }
    }

    pub fn record(&self, model: &str, variants: usize, duration: Duration, outcome: &str) {
        let entry = RequestLogEntry {
            ts: Utc::now().to_rfc3339(),
            model: model.to_string(),
            variants,
            duration_ms: duration.as_millis() as u64,
            outcome: outcome.to_string(),
        };
        if let Err(e) = self.tx.send(entry) {
            tracing::warn!("Failed to queue request log entry: {e}");
        }
    }

    async fn writer_task(
        mut rx: mpsc::UnboundedReceiver<RequestLogEntry>,
        log_path: PathBuf,
        max_size_mb: u64,
    ) {
        use std::io::Write;

        if let Some(parent) = log_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!("Failed to create request log directory: {e}");
                return;
            }
        }

        while let Some(entry) = rx.recv().await {
            if let Ok(meta) = std::fs::metadata(&log_path) {
                if meta.len() > max_size_mb * 1024 * 1024 {
                    let rotated = log_path.with_extension("jsonl.1");
                    if let Err(e) = std::fs::rename(&log_path, &rotated) {
                        tracing::warn!("Failed to rotate request log: {e}");
                    }
                }
            }

            match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
            {
                Ok(mut file) => {
                    if let Ok(json) = serde_json::to_string(&entry) {
                        if let Err(e) = writeln!(file, "{json}") {
                            tracing::warn!("Failed to write request log entry: {e}");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to open request log file: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_to_flat_json() {
        let entry = RequestLogEntry {
            ts: "2026-01-01T00:00:00+00:00".into(),
            model: "qwen-qwq-32b".into(),
            variants: 3,
            duration_ms: 412,
            outcome: "ok".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"ts":"2026-01-01T00:00:00+00:00","model":"qwen-qwq-32b","variants":3,"duration_ms":412,"outcome":"ok"}"#
        );
    }

    #[tokio::test]
    async fn test_entries_reach_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let log = RequestLog::new(path.clone(), 1);

        log.record("qwen-qwq-32b", 1, Duration::from_millis(10), "ok");

        // Writer runs on a background task; poll briefly for the line.
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if contents.contains("\"outcome\":\"ok\"") {
                    return;
                }
            }
        }
        panic!("log entry never written");
    }
}

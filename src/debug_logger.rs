// Debug logging module for asynchronous tick logging
//
// Fire-and-forget async logging so the decision path never blocks on disk.
// Each tick's decision summary is written as one JSONL line.

use log::error;
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{AgentState, Coord, Direction};

/// One tick's decision summary
#[derive(Debug, Serialize)]
struct TickLogEntry {
    step: i32,
    state: String,
    chosen_key: String,
    head: Option<Coord>,
    score: i32,
    timestamp: String,
}

/// Shared tick logger state
/// Uses Arc<Mutex<Option<File>>> to allow concurrent async writes
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new tick logger, truncating an existing log file.
    /// Falls back to a disabled logger when the file cannot be created.
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Tick logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(File::from_std(file)))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create tick log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled tick logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    /// Logs one tick's decision asynchronously (fire-and-forget)
    pub fn log_tick(
        &self,
        step: i32,
        state: AgentState,
        direction: Direction,
        head: Option<Coord>,
        score: i32,
    ) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        let entry = TickLogEntry {
            step,
            state: state.as_str().to_string(),
            chosen_key: direction.as_key().to_string(),
            head,
            score,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: TickLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line.as_bytes()).await {
                        error!("Failed to write tick log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush tick log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize tick log entry: {}", e);
                }
            }
        }
    }
}

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const MAX_SESSION_FILES: usize = 10;

/// Session diagnostics sink writing timestamped lines to `<logs dir>/latest.log`.
///
/// Implements [`log::Log`], so once installed every `log::warn!` etc. in the
/// crate lands here. Callers never block on disk I/O: lines go through an mpsc
/// channel and a background task does the writing.
pub struct SessionLogger {
    tx: mpsc::UnboundedSender<String>,
    level: log::LevelFilter,
    writer: Option<JoinHandle<()>>,
}

impl SessionLogger {
    /// Create a new session logger in `logs_dir`.
    ///
    /// - Creates the directory if it doesn't exist
    /// - Rotates `latest.log` → `session-{timestamp}.log`
    /// - Cleans up old sessions (keeps max 10)
    /// - Spawns a background writer task
    pub async fn new(logs_dir: &Path, level: log::LevelFilter) -> Option<Self> {
        if tokio::fs::create_dir_all(logs_dir).await.is_err() {
            return None;
        }

        let latest = logs_dir.join("latest.log");

        if tokio::fs::try_exists(&latest).await.unwrap_or(false) {
            let rotated = logs_dir.join(format!("session-{}.log", unique_stamp()));
            let _ = tokio::fs::rename(&latest, &rotated).await;
        }

        cleanup_old_sessions(logs_dir).await;

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&latest)
            .await
            .ok()?;

        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(writer_task(file, rx));

        let header = format!("=== ReadQuest Session — {} ===\n\n", timestamp());
        let _ = tx.send(header);

        Some(Self {
            tx,
            level,
            writer: Some(writer),
        })
    }

    /// Send a line under `prefix`. Never blocks.
    pub fn log_line(&self, prefix: &str, line: &str) {
        let _ = self.tx.send(format_line(&timestamp(), prefix, line));
    }

    /// Route the `log` facade here for the rest of the process.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    /// Close the channel and wait for the footer to be written.
    pub async fn close(mut self) {
        let writer = self.writer.take();
        drop(self);
        if let Some(writer) = writer {
            let _ = writer.await;
        }
    }
}

impl log::Log for SessionLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let prefix = format!("{} {}", record.level(), record.target());
        self.log_line(&prefix, &record.args().to_string());
    }

    fn flush(&self) {}
}

fn format_line(ts: &str, prefix: &str, line: &str) -> String {
    format!("[{ts}] [{prefix}] {line}\n")
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Millisecond stamp so two sessions in the same second do not collide.
fn unique_stamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn writer_task(file: tokio::fs::File, mut rx: mpsc::UnboundedReceiver<String>) {
    use tokio::io::AsyncWriteExt;
    let mut writer = tokio::io::BufWriter::new(file);

    while let Some(line) = rx.recv().await {
        let _ = writer.write_all(line.as_bytes()).await;
        let _ = writer.flush().await;
    }

    let footer = format!("\n=== Session ended — {} ===\n", timestamp());
    let _ = writer.write_all(footer.as_bytes()).await;
    let _ = writer.flush().await;
}

/// Keep only the newest `session-*.log` files.
async fn cleanup_old_sessions(logs_dir: &Path) {
    let mut entries = match tokio::fs::read_dir(logs_dir).await {
        Ok(rd) => rd,
        Err(_) => return,
    };

    let mut session_files: Vec<PathBuf> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if name_str.starts_with("session-") && name_str.ends_with(".log") {
            session_files.push(entry.path());
        }
    }

    // Timestamps share a width for centuries, so name order is age order.
    session_files.sort();

    let excess = session_files.len().saturating_sub(MAX_SESSION_FILES);
    for oldest in session_files.drain(..excess) {
        let _ = tokio::fs::remove_file(oldest).await;
    }
}

//! ReadQuest: log pages read per book and turn them into XP, levels, streaks
//! and badges. Records are kept in a remote append-only log store.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod logs;
pub mod model;
pub mod state;
pub mod stats;
pub mod store;
pub mod sync;
pub mod util;

#[cfg(feature = "desktop")]
mod commands;

pub use dashboard::Dashboard;
pub use error::{Result, TrackerError, ValidationError};
pub use model::{Book, LogEntry};
pub use state::{AppState, ReadingOutcome};
pub use store::{HttpLogStore, LogBackend, LogRecord, LogStore, MemoryLogStore};
pub use sync::{SyncEvent, SyncQueue, SyncStatus};

#[cfg(feature = "desktop")]
pub fn run() {
    use tauri::Manager;

    let config = config::load_config();

    tauri::Builder::default()
        .setup(move |app| {
            if let Some(dir) = config.logs_dir() {
                let level = config.log_level_filter();
                if let Some(logger) =
                    tauri::async_runtime::block_on(logs::SessionLogger::new(&dir, level))
                {
                    let _ = logger.install();
                }
            }
            app.manage(commands::TrackerState::new(&config)?);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::load_library,
            commands::add_book,
            commands::select_book,
            commands::log_reading,
            commands::edit_log_entry,
            commands::delete_log_entry,
            commands::get_dashboard,
            commands::get_sync_status,
        ])
        .run(tauri::generate_context!())
        .expect("failed to run ReadQuest");
}

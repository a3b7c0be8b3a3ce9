//! IPC commands for the desktop frontend. Each command applies one user
//! action and returns a fresh [`Dashboard`] to render.

use tauri::ipc::Channel;
use tokio::sync::Mutex;

use crate::config::TrackerConfig;
use crate::dashboard::Dashboard;
use crate::error::{Result, TrackerError};
use crate::state::AppState;
use crate::store::LogBackend;
use crate::sync::{SyncEvent, SyncQueue, SyncStatus};
use crate::util::{parse_day, today};

/// Managed Tauri state: the library and the queue feeding the log store.
pub struct TrackerState {
    app: Mutex<AppState>,
    sync: SyncQueue<LogBackend>,
    default_total_pages: u32,
}

impl TrackerState {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        Ok(Self {
            app: Mutex::new(AppState::new()),
            sync: SyncQueue::new(LogBackend::from_config(config)?, config.request_timeout()),
            default_total_pages: config.default_total_pages,
        })
    }
}

fn parse_log_date(date: &str) -> Result<chrono::NaiveDate> {
    parse_day(date).ok_or_else(|| TrackerError::Custom(format!("Unrecognised date {date:?}")))
}

/// Rebuilds the library from the log store. On failure the current library is
/// kept and the error only logged.
#[tauri::command]
pub async fn load_library(state: tauri::State<'_, TrackerState>) -> Result<Dashboard> {
    let loaded = state.sync.load_all().await;
    let mut app = state.app.lock().await;
    match loaded {
        Ok(records) => *app = AppState::from_records(records, state.default_total_pages),
        Err(e) => log::warn!("Could not load the reading log: {e}"),
    }
    Ok(Dashboard::build(&app, today()))
}

#[tauri::command]
pub async fn add_book(
    title: String,
    total_pages: String,
    state: tauri::State<'_, TrackerState>,
) -> Result<Dashboard> {
    let mut app = state.app.lock().await;
    app.add_book(&title, &total_pages)?;
    Ok(Dashboard::build(&app, today()))
}

#[tauri::command]
pub async fn select_book(title: String, state: tauri::State<'_, TrackerState>) -> Result<Dashboard> {
    let mut app = state.app.lock().await;
    app.select_book(&title);
    Ok(Dashboard::build(&app, today()))
}

/// Logs reading for the selected book. The record is handed to the sync queue
/// and the outcome streamed over `on_event` once the store answers.
#[tauri::command]
pub async fn log_reading(
    page_mark: String,
    on_event: Channel<SyncEvent>,
    state: tauri::State<'_, TrackerState>,
) -> Result<Dashboard> {
    let (outcome, dashboard) = {
        let mut app = state.app.lock().await;
        let today = today();
        let outcome = app.log_reading(&page_mark, today)?;
        (outcome, Dashboard::build(&app, today))
    };

    if let Some(outcome) = outcome {
        let pending = state.sync.submit(outcome.record);
        tokio::spawn(async move {
            if let Ok(event) = pending.await {
                let _ = on_event.send(event);
            }
        });
    }
    Ok(dashboard)
}

#[tauri::command]
pub async fn edit_log_entry(
    date: String,
    pages: u32,
    state: tauri::State<'_, TrackerState>,
) -> Result<Dashboard> {
    let date = parse_log_date(&date)?;
    let mut app = state.app.lock().await;
    let today = today();
    app.edit_log_entry(date, pages, today)?;
    Ok(Dashboard::build(&app, today))
}

#[tauri::command]
pub async fn delete_log_entry(date: String, state: tauri::State<'_, TrackerState>) -> Result<Dashboard> {
    let date = parse_log_date(&date)?;
    let mut app = state.app.lock().await;
    let today = today();
    app.delete_log_entry(date, today)?;
    Ok(Dashboard::build(&app, today))
}

#[tauri::command]
pub async fn get_dashboard(state: tauri::State<'_, TrackerState>) -> Result<Dashboard> {
    let app = state.app.lock().await;
    Ok(Dashboard::build(&app, today()))
}

#[tauri::command]
pub async fn get_sync_status(state: tauri::State<'_, TrackerState>) -> Result<SyncStatus> {
    Ok(state.sync.status())
}

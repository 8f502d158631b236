//! UI layer for the dashboard: app shell and per-state screen rendering.

pub mod app;

pub use app::{DashboardApp, PersistedDashboardSettings, SETTINGS_STORAGE_KEY};

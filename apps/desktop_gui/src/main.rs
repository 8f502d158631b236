//! Ad Research Platform desktop app: advertiser search with a per-page
//! ads drill-down, backed by a worker thread that talks to the ad API.

mod backend_bridge;
mod controller;
mod ui;

use std::sync::Arc;

use crossbeam_channel::bounded;

use api_client::{AdLibraryClient, DEFAULT_API_BASE_URL};

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{DashboardApp, PersistedDashboardSettings, SETTINGS_STORAGE_KEY};

fn resolve_api_base_url() -> String {
    match std::env::var("AD_RESEARCH_API_URL") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_API_BASE_URL.to_string(),
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let base_url = resolve_api_base_url();
    tracing::info!(base_url = %base_url, "starting ad research dashboard");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(Arc::new(AdLibraryClient::new(base_url)), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Ad Research Platform")
            .with_inner_size([1180.0, 780.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Ad Research Platform",
        options,
        Box::new(|cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDashboardSettings>(&text).ok())
            });
            Ok(Box::new(DashboardApp::new(cmd_tx, ui_rx, persisted_settings)))
        }),
    )
}

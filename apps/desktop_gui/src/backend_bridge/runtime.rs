//! Runtime bridge between UI command queue and backend event intake.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use api_client::AdsApi;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Spawns the backend worker thread. Commands are processed strictly one at
/// a time; each completion event carries the request id of the command that
/// produced it.
pub fn launch(api: Arc<dyn AdsApi>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "Backend worker startup failure: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::SearchAdvertisers {
                        request_id,
                        query,
                        country,
                    } => {
                        tracing::info!(
                            request_id = request_id.0,
                            country = country.code(),
                            "backend: searching advertisers"
                        );
                        let result = api.search_advertisers(&query, country).await;
                        let _ = ui_tx.try_send(UiEvent::SearchFinished { request_id, result });
                    }
                    BackendCommand::FetchPageAds {
                        request_id,
                        page_id,
                        country,
                    } => {
                        tracing::info!(
                            request_id = request_id.0,
                            page_id = %page_id.0,
                            "backend: fetching page ads"
                        );
                        let result = api.fetch_page_ads(&page_id, country).await;
                        let _ = ui_tx.try_send(UiEvent::AdsFinished { request_id, result });
                    }
                }
            }
            tracing::info!("backend: command channel closed; worker exiting");
        });
    });
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;

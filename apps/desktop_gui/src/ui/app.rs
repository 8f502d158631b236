//! Dashboard app shell: drains worker events, feeds the controller, and
//! renders whichever screen the current view state calls for.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use shared::domain::{AdCreative, AdStats, Advertiser, CountryCode};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{DashboardController, ViewState};

pub const SETTINGS_STORAGE_KEY: &str = "ad_research_dashboard.settings";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedDashboardSettings {
    pub country: CountryCode,
}

pub struct DashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    controller: DashboardController,
    status: String,
}

impl DashboardApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<PersistedDashboardSettings>,
    ) -> Self {
        let settings = persisted_settings.unwrap_or_default();
        Self {
            cmd_tx,
            ui_rx,
            controller: DashboardController::new(settings.country),
            status: "Ready".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::SearchFinished { request_id, result } => {
                    self.controller.handle_search_finished(request_id, result);
                }
                UiEvent::AdsFinished { request_id, result } => {
                    self.controller.handle_ads_finished(request_id, result);
                }
            }
        }
    }

    fn submit_search_action(&mut self) {
        if let Some(cmd) = self.controller.submit_search() {
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        }
    }

    fn select_page_action(&mut self, advertiser: Advertiser) {
        if let Some(cmd) = self.controller.select_page(advertiser) {
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        }
    }

    fn retry_action(&mut self) {
        if let Some(cmd) = self.controller.retry() {
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        }
    }

    fn show_search_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let field_width = (ui.available_width() - 260.0).max(160.0);
            let edit_resp = ui.add_sized(
                [field_width, 26.0],
                egui::TextEdit::singleline(&mut self.controller.form.text)
                    .hint_text("Search advertisers..."),
            );
            if ui.button("Search").clicked() {
                self.submit_search_action();
            }
            egui::ComboBox::from_id_salt("country_selector")
                .selected_text(self.controller.form.country.display_name())
                .show_ui(ui, |ui| {
                    for country in CountryCode::ALL {
                        ui.selectable_value(
                            &mut self.controller.form.country,
                            country,
                            country.display_name(),
                        );
                    }
                });
            if edit_resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.submit_search_action();
            }
        });
        ui.add_space(8.0);
    }

    fn show_error_section(&mut self, ui: &mut egui::Ui, message: &str) {
        ui.add_space(48.0);
        ui.vertical_centered(|ui| {
            ui.colored_label(
                egui::Color32::from_rgb(220, 38, 38),
                format!("Error: {message}"),
            );
            ui.add_space(8.0);
            if ui.button("Retry").clicked() {
                self.retry_action();
            }
        });
    }

    fn show_search_results(&mut self, ui: &mut egui::Ui, advertisers: &[Advertiser]) {
        if advertisers.is_empty() {
            ui.add_space(48.0);
            ui.vertical_centered(|ui| {
                ui.label("No advertisers found for your search.");
            });
            return;
        }
        egui::ScrollArea::vertical()
            .id_salt("advertiser_results")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for advertiser in advertisers {
                    self.show_advertiser_card(ui, advertiser);
                    ui.add_space(8.0);
                }
            });
    }

    fn show_advertiser_card(&mut self, ui: &mut egui::Ui, advertiser: &Advertiser) {
        let response = egui::Frame::NONE
            .fill(ui.visuals().faint_bg_color)
            .corner_radius(10.0)
            .stroke(egui::Stroke::new(
                1.0,
                ui.visuals().widgets.noninteractive.bg_stroke.color,
            ))
            .inner_margin(egui::Margin::symmetric(12, 10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&advertiser.name).strong().size(16.0));
                    if advertiser.verified {
                        ui.label(
                            egui::RichText::new("✓").color(egui::Color32::from_rgb(59, 130, 246)),
                        );
                    }
                });
                if let Some(category) = &advertiser.category {
                    ui.weak(category);
                }
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    stat_tile(ui, &format_count(advertiser.facebook_likes), "FB Likes");
                    stat_tile(
                        ui,
                        &format_count(advertiser.instagram_followers),
                        "IG Followers",
                    );
                });
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);

        if response.clicked() {
            self.select_page_action(advertiser.clone());
        }
    }

    fn show_drilldown_header(&mut self, ui: &mut egui::Ui, advertiser_name: &str) {
        ui.horizontal(|ui| {
            if ui.button("⬅ Back to results").clicked() {
                self.controller.go_back();
            }
            ui.heading(format!("{advertiser_name} Ads"));
        });
        ui.add_space(8.0);
    }

    fn show_ads_view(
        &mut self,
        ui: &mut egui::Ui,
        advertiser: &Advertiser,
        creatives: &[AdCreative],
        stats: &AdStats,
    ) {
        self.show_drilldown_header(ui, &advertiser.name);

        egui::Frame::NONE
            .fill(ui.visuals().faint_bg_color)
            .corner_radius(10.0)
            .inner_margin(egui::Margin::symmetric(12, 10))
            .show(ui, |ui| {
                ui.columns(3, |columns| {
                    summary_stat(&mut columns[0], stats.total, "Total Ads");
                    summary_stat(&mut columns[1], stats.facebook_count, "Facebook Ads");
                    summary_stat(&mut columns[2], stats.instagram_count, "Instagram Ads");
                });
            });
        ui.add_space(8.0);

        egui::ScrollArea::vertical()
            .id_salt("page_ads_feed")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for creative in creatives {
                    show_creative_card(ui, creative);
                    ui.add_space(8.0);
                }
            });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_strip").show(ctx, |ui| {
            ui.small(self.status.as_str());
        });

        let view = self.controller.state().clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Ad Research Platform");
            ui.add_space(8.0);

            match &view {
                ViewState::Idle => {
                    self.show_search_bar(ui);
                }
                ViewState::Searching { .. } => {
                    self.show_search_bar(ui);
                    show_centered_progress(ui, "Searching advertisers...");
                }
                ViewState::SearchError { message, .. } => {
                    self.show_search_bar(ui);
                    self.show_error_section(ui, message);
                }
                ViewState::SearchResults { advertisers, .. } => {
                    self.show_search_bar(ui);
                    self.show_search_results(ui, advertisers);
                }
                ViewState::LoadingAds { advertiser, .. } => {
                    self.show_drilldown_header(ui, &advertiser.name);
                    show_centered_progress(ui, "Loading ads...");
                }
                ViewState::AdsError {
                    advertiser,
                    message,
                    ..
                } => {
                    self.show_drilldown_header(ui, &advertiser.name);
                    self.show_error_section(ui, message);
                }
                ViewState::AdsView {
                    advertiser,
                    creatives,
                    stats,
                    ..
                } => {
                    self.show_ads_view(ui, advertiser, creatives, stats);
                }
            }
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDashboardSettings {
            country: self.controller.form.country,
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

fn show_centered_progress(ui: &mut egui::Ui, message: &str) {
    ui.add_space(48.0);
    ui.vertical_centered(|ui| {
        ui.add(egui::Spinner::new().size(32.0));
        ui.add_space(8.0);
        ui.label(message);
    });
}

fn stat_tile(ui: &mut egui::Ui, value: &str, label: &str) {
    egui::Frame::NONE
        .fill(ui.visuals().extreme_bg_color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(value).strong());
                ui.small(label);
            });
        });
}

fn summary_stat(ui: &mut egui::Ui, value: usize, label: &str) {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(value.to_string()).strong().size(20.0));
        ui.small(label);
    });
}

fn show_creative_card(ui: &mut egui::Ui, creative: &AdCreative) {
    egui::Frame::NONE
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(10.0)
        .stroke(egui::Stroke::new(
            1.0,
            ui.visuals().widgets.noninteractive.bg_stroke.color,
        ))
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            if let Some(video) = creative.videos.first() {
                ui.horizontal(|ui| {
                    if let Some(sd_url) = &video.sd_url {
                        ui.hyperlink_to("▶ Video (SD)", sd_url);
                    }
                    if let Some(preview) = &video.preview_image_url {
                        ui.hyperlink_to("Preview image", preview);
                    }
                });
            }
            if let Some(image) = creative.images.first() {
                if let Some(url) = &image.url {
                    ui.hyperlink_to("🖼 Image", url);
                }
            }
            if let Some(title) = &creative.title {
                ui.label(egui::RichText::new(title).strong());
            }
            ui.weak(format!(
                "Started: {}",
                format_start_date(creative.start_epoch_seconds)
            ));
            if let Some(cta_text) = &creative.cta_text {
                if ui.button(cta_text).clicked() {
                    if let Some(link) = &creative.cta_link_url {
                        ui.ctx().open_url(egui::OpenUrl::new_tab(link));
                    }
                }
            }
        });
}

fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_start_date(epoch_seconds: i64) -> String {
    match chrono::DateTime::from_timestamp(epoch_seconds, 0) {
        Some(ts) => ts.format("%Y-%m-%d").to_string(),
        None => epoch_seconds.to_string(),
    }
}

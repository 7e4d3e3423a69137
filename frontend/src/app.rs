//! Main application structure.

use egui::{CentralPanel, Context, TopBottomPanel};

use crate::api::VersionClient;
use crate::state::{AppMessage, AppStateChannels, VersionState};

// Cross-platform task spawning
#[cfg(target_arch = "wasm32")]
fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// The main AHKFlow application.
pub struct AhkFlowApp {
    /// Client for the backend version endpoint
    client: VersionClient,
    /// Channels for results of async operations
    channels: AppStateChannels,
    /// Backend version as last fetched
    version: VersionState,
}

impl AhkFlowApp {
    /// Create the application and start fetching the backend version.
    pub fn new(cc: &eframe::CreationContext<'_>, client: VersionClient) -> Self {
        let mut app = Self {
            client,
            channels: AppStateChannels::new(),
            version: VersionState::Loading,
        };
        app.load_version(cc.egui_ctx.clone());
        app
    }

    /// Load version information from the backend.
    fn load_version(&mut self, ctx: Context) {
        tracing::info!("Loading version information from backend...");
        self.version = VersionState::Loading;

        let client = self.client.clone();
        let tx = self.channels.sender();

        spawn_task(async move {
            let version = client.fetch_version().await;
            let _ = tx.send(AppMessage::VersionLoaded(version));
            ctx.request_repaint();
        });
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.channels.rx.try_recv() {
            match msg {
                AppMessage::VersionLoaded(version) => {
                    self.version = VersionState::from(version);
                }
            }
        }
    }
}

impl eframe::App for AhkFlowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let refreshing = self.version == VersionState::Loading;
                if ui
                    .add_enabled(!refreshing, egui::Button::new("Refresh"))
                    .clicked()
                {
                    self.load_version(ctx.clone());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = self.version.label();
                    let response = match self.version {
                        VersionState::Unavailable => ui.weak(label),
                        _ => ui.label(label),
                    };
                    response.on_hover_text(self.client.version_url().as_str());
                });
            });
        });

        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.heading("AHKFlow");
            });
        });
    }
}

//! AHKFlow frontend application.
//!
//! Supports both WASM (for web browsers) and native modes.

#![warn(clippy::all, rust_2018_idioms)]

use ahkflow_frontend::{AhkFlowApp, ApiHttpClientOptions, VersionClient};

// ============================================================================
// WASM Entry Point
// ============================================================================

#[cfg(target_arch = "wasm32")]
fn main() {
    use wasm_bindgen::JsCast;

    // Initialize panic handler for better error messages in browser console
    console_error_panic_hook::set_once();

    // Initialize tracing for WASM
    tracing_wasm::set_as_global_default();

    let client = match ApiHttpClientOptions::from_env()
        .map_err(|e| e.to_string())
        .and_then(|options| VersionClient::new(&options).map_err(|e| e.to_string()))
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Invalid API client configuration: {}", e);
            return;
        }
    };

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async move {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");
        let canvas = document
            .get_element_by_id("ahkflow_app_canvas")
            .expect("Failed to find ahkflow_app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("ahkflow_app_canvas is not a canvas");

        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(AhkFlowApp::new(cc, client)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}

// ============================================================================
// Native Entry Point
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for native
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = ApiHttpClientOptions::from_env()?;
    tracing::info!(
        "Starting AHKFlow frontend in native mode (API: {})",
        options.base_address
    );
    let client = VersionClient::new(&options)?;

    // Async tasks spawned by the app run on this runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 360.0])
            .with_title("AHKFlow"),
        ..Default::default()
    };

    eframe::run_native(
        "AHKFlow",
        native_options,
        Box::new(move |cc| Ok(Box::new(AhkFlowApp::new(cc, client)))),
    )?;

    Ok(())
}

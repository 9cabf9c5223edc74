mod app;
mod app_dir;
mod image_worker;
mod input;
mod settings;
mod surface;
mod ui;

use std::path::PathBuf;

use eframe::egui;
use tracing::info;

use app::StampGridApp;
use settings::AppSettings;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting StampGrid");

    let settings = AppSettings::load();
    // An explicit catalog path on the command line wins over settings.
    let catalog_arg = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("StampGrid")
            .with_inner_size([settings.window_width, settings.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "StampGrid",
        options,
        Box::new(move |cc| {
            egui_material_icons::initialize(&cc.egui_ctx);
            Ok(Box::new(StampGridApp::new(
                &cc.egui_ctx,
                settings,
                catalog_arg,
            )?))
        }),
    )
}

// GUI entry point for gallery-framer
// Folder pickers, a copyright field and a progress panel around the batch processor

use eframe::egui;

mod app;
use app::GalleryFramerApp;

fn main() -> Result<(), eframe::Error> {
    gallery_framer::utils::init_logging(false);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 480.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gallery Framer",
        options,
        Box::new(|cc| Ok(Box::new(GalleryFramerApp::new(cc)))),
    )
}

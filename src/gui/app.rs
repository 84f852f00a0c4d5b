use eframe::egui;
use gallery_framer::image_processing::batch::BatchProgress;
use gallery_framer::image_processing::{DEFAULT_FONT, DEFAULT_JPEG_QUALITY};
use gallery_framer::utils::format_duration;
use gallery_framer::UiJobQueue;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

#[path = "app_processing.rs"]
mod app_processing;

pub struct GalleryFramerApp {
    // Input/Output paths
    input_path: String,
    output_path: String,

    // Framing settings
    copyright: String,
    scale: u32,
    font: String,
    quality: u8,
    report: bool,

    // Processing state
    is_processing: bool,
    batch_progress: Option<BatchProgress>,
    current_file: String,

    // Results
    results_message: String,
    failures: Vec<String>,
    error_message: String,

    // Listener jobs queued by the worker, run on this thread
    ui_queue: Option<UiJobQueue>,
    progress_receiver: Option<Receiver<ProgressMessage>>,
}

#[derive(Debug)]
pub(crate) enum ProgressMessage {
    Started { total: usize },
    Processed { file: String },
    Complete {
        success: usize,
        failed: usize,
        failures: Vec<String>,
        message: String,
    },
    Error(String),
}

/// Settings remembered between sessions
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GuiSettings {
    input_path: String,
    output_path: String,
    copyright: String,
    scale: u32,
    font: String,
    quality: u8,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            input_path: String::new(),
            output_path: String::new(),
            copyright: String::new(),
            scale: 50,
            font: DEFAULT_FONT.to_string(),
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gallery-framer").join("gui.json"))
}

impl GalleryFramerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Self::load_config();

        Self {
            input_path: settings.input_path,
            output_path: settings.output_path,
            copyright: settings.copyright,
            scale: settings.scale.min(100),
            font: settings.font,
            quality: settings.quality.clamp(1, 100),
            report: false,
            is_processing: false,
            batch_progress: None,
            current_file: String::new(),
            results_message: String::new(),
            failures: Vec::new(),
            error_message: String::new(),
            ui_queue: None,
            progress_receiver: None,
        }
    }

    fn load_config() -> GuiSettings {
        settings_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub(crate) fn save_config(&self) -> anyhow::Result<()> {
        let Some(path) = settings_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let settings = GuiSettings {
            input_path: self.input_path.clone(),
            output_path: self.output_path.clone(),
            copyright: self.copyright.clone(),
            scale: self.scale,
            font: self.font.clone(),
            quality: self.quality,
        };
        fs::write(&path, serde_json::to_string_pretty(&settings)?)?;
        Ok(())
    }

    fn render_file_selection(&mut self, ui: &mut egui::Ui) {
        ui.heading("Folders");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Source:");
            ui.text_edit_singleline(&mut self.input_path);
            if ui.button("Browse...").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.input_path = path.display().to_string();
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Destination:");
            ui.text_edit_singleline(&mut self.output_path);
            if ui.button("Browse...").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.output_path = path.display().to_string();
                }
            }
        });

        ui.add_space(10.0);
    }

    fn render_frame_settings(&mut self, ui: &mut egui::Ui) {
        ui.heading("Frame Settings");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Copyright:");
            ui.text_edit_singleline(&mut self.copyright);
        });
        ui.label("(Leave empty to write images without caption)");

        ui.horizontal(|ui| {
            ui.label("Scale (%):");
            ui.add(egui::Slider::new(&mut self.scale, 0..=100));
        });

        ui.horizontal(|ui| {
            ui.label("Font:");
            ui.text_edit_singleline(&mut self.font);
        });

        ui.horizontal(|ui| {
            ui.label("JPEG quality:");
            ui.add(egui::DragValue::new(&mut self.quality).speed(1).range(1..=100));
        });

        ui.checkbox(&mut self.report, "List failed files when done");

        ui.add_space(10.0);
    }

    fn render_process_button(&mut self, ui: &mut egui::Ui) {
        ui.separator();

        let button_text = if self.is_processing {
            "Processing..."
        } else {
            "Process Images"
        };

        let button = egui::Button::new(button_text).min_size(egui::vec2(200.0, 40.0));

        if ui.add_enabled(!self.is_processing, button).clicked() {
            self.start_processing(ui.ctx());
        }

        ui.add_space(10.0);
    }

    fn render_progress(&mut self, ui: &mut egui::Ui) {
        if self.is_processing || !self.results_message.is_empty() || !self.error_message.is_empty() {
            ui.heading("Progress");
            ui.separator();

            if self.is_processing {
                match &self.batch_progress {
                    Some(progress) => {
                        ui.label(format!(
                            "Processed: {}/{}",
                            progress.processed(),
                            progress.total_files
                        ));
                        ui.label(&self.current_file);
                        if let Some(eta) = progress.eta() {
                            ui.label(format!("Remaining: {}", format_duration(eta)));
                        }

                        let progress_bar = egui::ProgressBar::new(progress.progress() as f32)
                            .show_percentage()
                            .animate(true);
                        ui.add(progress_bar);
                    }
                    None => {
                        ui.label("Scanning source folder...");
                    }
                }
            }

            if !self.results_message.is_empty() {
                ui.label(&self.results_message);
            }

            if self.report {
                for failure in &self.failures {
                    ui.colored_label(egui::Color32::YELLOW, failure);
                }
            }

            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        }
    }
}

impl eframe::App for GalleryFramerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Listener callbacks queued by the worker run here, on the UI thread
        if let Some(queue) = &self.ui_queue {
            queue.run_pending();
        }
        self.check_progress();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Gallery Framer");
                ui.label("Resize, frame and caption photos for a web gallery");
                ui.add_space(20.0);

                self.render_file_selection(ui);
                self.render_frame_settings(ui);
                self.render_process_button(ui);
                self.render_progress(ui);
            });
        });

        if self.is_processing {
            ctx.request_repaint();
        }
    }
}

// Processing implementation for the GUI
// The batch runs on a worker thread; listener callbacks are marshalled back to
// the egui thread through a ChannelDispatcher and drained in `update`.

use super::{GalleryFramerApp, ProgressMessage};
use eframe::egui;
use gallery_framer::image_processing::batch::{list_source_images, BatchProgress};
use gallery_framer::utils::{display_name, same_directory};
use gallery_framer::{ui_channel, ImageProcessor, ProcessorConfig, ScalePercent};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::sync::Arc;

impl GalleryFramerApp {
    pub fn start_processing(&mut self, ctx: &egui::Context) {
        if self.input_path.is_empty() || self.output_path.is_empty() {
            self.error_message = "Please select source and destination folders".to_string();
            return;
        }

        let input_path = PathBuf::from(&self.input_path);
        let output_path = PathBuf::from(&self.output_path);
        if same_directory(&input_path, &output_path) {
            self.error_message =
                "Destination must differ from the source folder".to_string();
            return;
        }

        let scale = match ScalePercent::new(self.scale) {
            Ok(scale) => scale,
            Err(e) => {
                self.error_message = e.to_string();
                return;
            }
        };

        if let Err(e) = self.save_config() {
            tracing::warn!(error = %e, "Failed to save GUI settings");
        }

        // Clear previous state
        self.is_processing = true;
        self.batch_progress = None;
        self.current_file.clear();
        self.failures.clear();
        self.error_message.clear();
        self.results_message.clear();

        let (tx, rx) = channel();
        self.progress_receiver = Some(rx);

        let repaint_ctx = ctx.clone();
        let (dispatcher, queue) = ui_channel();
        let dispatcher = dispatcher.with_waker(move || repaint_ctx.request_repaint());
        self.ui_queue = Some(queue);

        let mut config = ProcessorConfig::new(&output_path, self.copyright.clone());
        config.font_name = self.font.clone();
        config.jpeg_quality = self.quality;

        std::thread::spawn(move || {
            let files = match list_source_images(&input_path) {
                Ok(files) => files,
                Err(e) => {
                    let _ = tx.send(ProgressMessage::Error(format!("{:#}", e)));
                    return;
                }
            };

            if let Err(e) = std::fs::create_dir_all(&output_path) {
                let _ = tx.send(ProgressMessage::Error(format!(
                    "Failed to create {}: {}",
                    output_path.display(),
                    e
                )));
                return;
            }

            let _ = tx.send(ProgressMessage::Started { total: files.len() });

            let processor = ImageProcessor::new(config).with_dispatcher(Arc::new(dispatcher));

            // Runs on the UI thread, so it only forwards to the app's own channel
            let listener_tx = tx.clone();
            processor.add_listener(move |source: &Path| {
                let _ = listener_tx.send(ProgressMessage::Processed {
                    file: display_name(source),
                });
            });

            let report = processor.process_files(&files, scale);

            let failures: Vec<String> = report
                .failures()
                .map(|(source, error)| format!("{}: {}", display_name(source), error))
                .collect();

            let message = if report.total() == 0 {
                "No .jpg images found in the source folder".to_string()
            } else if report.failed() == 0 {
                format!("✓ Processed {} images", report.successful())
            } else {
                format!(
                    "Processed {} images ({} succeeded, {} failed)",
                    report.total(),
                    report.successful(),
                    report.failed()
                )
            };

            let _ = tx.send(ProgressMessage::Complete {
                success: report.successful(),
                failed: report.failed(),
                failures,
                message,
            });
        });
    }

    /// Check for progress updates from the background thread
    pub fn check_progress(&mut self) {
        let mut messages = Vec::new();
        if let Some(ref receiver) = self.progress_receiver {
            while let Ok(msg) = receiver.try_recv() {
                messages.push(msg);
            }
        }

        let mut finished = false;
        for msg in messages {
            match msg {
                ProgressMessage::Started { total } => {
                    self.batch_progress = Some(BatchProgress::new(total));
                }
                ProgressMessage::Processed { file } => {
                    if let Some(progress) = &self.batch_progress {
                        progress.increment();
                    }
                    self.current_file = file;
                }
                ProgressMessage::Complete {
                    success,
                    failed,
                    failures,
                    message,
                } => {
                    tracing::info!(success, failed, "GUI batch finished");
                    self.is_processing = false;
                    self.results_message = message;
                    self.failures = failures;
                    finished = true;
                }
                ProgressMessage::Error(err) => {
                    self.is_processing = false;
                    self.error_message = err;
                    finished = true;
                }
            }
        }

        if finished {
            self.progress_receiver = None;
            self.ui_queue = None;
        }
    }
}

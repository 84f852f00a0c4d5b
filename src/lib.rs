// Library exports for reuse by the CLI, the GUI and other applications
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use error::{ConvertError, DispatchError, InvalidScale};
pub use image_processing::batch::{BatchReport, FileOutcome};
pub use image_processing::frame::{ScalePercent, FRAME_WIDTH};
pub use image_processing::notify::{
    ui_channel, ChannelDispatcher, DirectDispatcher, ImageProcessorListener, ListenerId,
    UiDispatcher, UiJobQueue,
};
pub use image_processing::{ImageProcessor, ProcessorConfig};
pub use json_output::JsonMessage;

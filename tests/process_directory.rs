use gallery_framer::{ConvertError, ImageProcessor, ProcessorConfig, ScalePercent};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 128]));
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

fn recording_listener(processor: &ImageProcessor) -> Arc<Mutex<Vec<PathBuf>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    processor.add_listener(move |path: &Path| sink.lock().unwrap().push(path.to_path_buf()));
    seen
}

#[test]
fn corrupted_file_is_skipped_and_batch_continues() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("a.jpg"), 400, 300);
    fs::write(src.path().join("b.JPG"), b"definitely not a jpeg").unwrap();
    fs::write(src.path().join("c.png"), b"ignored").unwrap();

    let processor = ImageProcessor::new(ProcessorConfig::new(dst.path(), "(c) Test"));
    let seen = recording_listener(&processor);

    let report = processor
        .process_directory(src.path(), ScalePercent::new(50).unwrap())
        .unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.successful(), 1);
    assert_eq!(report.failed(), 1);

    let (failed_source, error) = report.failures().next().unwrap();
    assert_eq!(failed_source.file_name().unwrap(), "b.JPG");
    assert!(matches!(error, ConvertError::Decode { .. }));

    let written: Vec<_> = fs::read_dir(dst.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written, vec!["a.jpg"]);

    let output = image::open(dst.path().join("a.jpg")).unwrap();
    assert_eq!((output.width(), output.height()), (240, 190));

    assert_eq!(*seen.lock().unwrap(), vec![src.path().join("a.jpg")]);
}

#[test]
fn file_named_only_jpg_is_processed() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join(".jpg"), 30, 20);
    write_jpeg(&src.path().join(".JPG.bak"), 30, 20);

    let processor = ImageProcessor::new(ProcessorConfig::new(dst.path(), ""));
    let seen = recording_listener(&processor);

    let report = processor.process_directory(src.path(), ScalePercent::FULL).unwrap();
    assert_eq!(report.total(), 1);
    assert_eq!(report.successful(), 1);

    let output = image::open(dst.path().join(".jpg")).unwrap();
    assert_eq!((output.width(), output.height()), (70, 60));
    assert_eq!(*seen.lock().unwrap(), vec![src.path().join(".jpg")]);
}

#[test]
fn missing_directory_is_an_error() {
    let dst = tempfile::tempdir().unwrap();
    let processor = ImageProcessor::new(ProcessorConfig::new(dst.path(), ""));

    let result = processor.process_directory(&dst.path().join("nope"), ScalePercent::FULL);
    assert!(result.is_err());
}

#[test]
fn empty_directory_produces_empty_report() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let processor = ImageProcessor::new(ProcessorConfig::new(dst.path(), ""));
    let seen = recording_listener(&processor);

    let report = processor.process_directory(src.path(), ScalePercent::FULL).unwrap();
    assert_eq!(report.total(), 0);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn canvas_is_scaled_long_side_plus_frame() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_jpeg(&src.path().join("landscape.jpg"), 301, 200);
    write_jpeg(&src.path().join("portrait.jpg"), 120, 260);
    write_jpeg(&src.path().join("square.jpg"), 99, 99);

    let processor = ImageProcessor::new(ProcessorConfig::new(dst.path(), ""));
    let report = processor
        .process_directory(src.path(), ScalePercent::new(33).unwrap())
        .unwrap();
    assert_eq!(report.failed(), 0);

    let size = |name: &str| {
        let img = image::open(dst.path().join(name)).unwrap();
        (img.width(), img.height())
    };

    // 301 * 0.33 = 99.33 -> 99; 200/301 * 99 = 65.78 -> 66
    assert_eq!(size("landscape.jpg"), (99 + 40, 66 + 40));
    // 260 * 0.33 = 85.8 -> 86; 120/260 * 86 = 39.69 -> 40
    assert_eq!(size("portrait.jpg"), (40 + 40, 86 + 40));
    // 99 * 0.33 = 32.67 -> 33
    assert_eq!(size("square.jpg"), (33 + 40, 33 + 40));
}

#[test]
fn listener_can_unsubscribe_during_batch() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    for name in ["1.jpg", "2.jpg", "3.jpg"] {
        write_jpeg(&src.path().join(name), 40, 30);
    }

    let processor = Arc::new(ImageProcessor::new(ProcessorConfig::new(dst.path(), "")));
    let steady = recording_listener(&processor);

    let once_seen = Arc::new(Mutex::new(Vec::new()));
    let id_cell = Arc::new(OnceLock::new());
    {
        let weak: Weak<ImageProcessor> = Arc::downgrade(&processor);
        let sink = Arc::clone(&once_seen);
        let id_cell_inner = Arc::clone(&id_cell);
        let id = processor.add_listener(move |path: &Path| {
            sink.lock().unwrap().push(path.to_path_buf());
            if let (Some(processor), Some(id)) = (weak.upgrade(), id_cell_inner.get()) {
                processor.remove_listener(*id);
            }
        });
        id_cell.set(id).unwrap();
    }

    let report = processor.process_directory(src.path(), ScalePercent::FULL).unwrap();
    assert_eq!(report.successful(), 3);

    assert_eq!(*once_seen.lock().unwrap(), vec![src.path().join("1.jpg")]);
    assert_eq!(steady.lock().unwrap().len(), 3);
}

#[test]
fn full_scale_keeps_the_picture_untouched() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    // PNG bytes keep the source lossless; the listing only checks the extension
    let source = src.path().join("flat.jpg");
    RgbImage::from_pixel(64, 48, Rgb([200, 40, 40]))
        .save_with_format(&source, image::ImageFormat::Png)
        .unwrap();

    let mut config = ProcessorConfig::new(dst.path(), "");
    config.jpeg_quality = 100;
    let processor = ImageProcessor::new(config);
    processor.process_directory(src.path(), ScalePercent::FULL).unwrap();

    let output = image::open(dst.path().join("flat.jpg")).unwrap().to_rgb8();
    assert_eq!(output.dimensions(), (104, 88));

    let center = output.get_pixel(20 + 32, 20 + 24);
    assert!(center.0[0] > 180 && center.0[1] < 70 && center.0[2] < 70);
    // frame stays white away from the outer edge
    let frame = output.get_pixel(10, 10);
    assert!(frame.0.iter().all(|&c| c > 230));
}

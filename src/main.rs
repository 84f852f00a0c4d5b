use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use gallery_framer::cli::Args;
use gallery_framer::image_processing::batch::{list_source_images, BatchProgress};
use gallery_framer::report::print_report;
use gallery_framer::utils::{
    create_progress_bar, display_name, error_println, format_duration, init_logging,
    validate_inputs, verbose_println, warn_println,
};
use gallery_framer::{BatchReport, ImageProcessor, JsonMessage};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse_with_config()?;
    init_logging(args.verbose);

    let json_mode = args.json_progress;

    if !json_mode {
        println!("{}", style("Gallery Framer - Image Processor").bold().blue());
        println!("{}", style("Web gallery frames and copyright captions").dim());
        println!();
    }

    validate_inputs(&args)?;
    let scale = args.scale_percent()?;
    let input_dir = args.input_dir()?;
    let output_dir = args.output_dir()?;

    if args.verbose && !json_mode {
        println!("{}", style("Configuration:").bold());
        println!("  Input: {}", input_dir.display());
        println!("  Output: {}", output_dir.display());
        println!("  Scale: {}", scale);
        println!("  Copyright: {:?}", args.copyright);
        println!("  Font: {}", args.font);
        println!("  JPEG quality: {}", args.quality);
        println!();
    }

    let image_files = list_source_images(input_dir)?;

    if image_files.is_empty() {
        if json_mode {
            JsonMessage::summary(0, 0, 0, start_time.elapsed().as_secs_f64());
        } else {
            warn_println(&format!("No .jpg images found in {}", input_dir.display()));
        }
        return Ok(());
    }

    if args.dry_run {
        print_dry_run(&image_files, output_dir, json_mode);
        return Ok(());
    }

    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let processor = ImageProcessor::new(args.processor_config()?);
    if !args.copyright.is_empty() && !processor.has_caption_font() && !json_mode {
        warn_println(&format!(
            "Font '{}' not found, images will be written without caption",
            args.font
        ));
    }

    let total = image_files.len();
    verbose_println(
        args.verbose && !json_mode,
        &format!("Found {} images to process", total),
    );

    let progress_bar = if json_mode {
        JsonMessage::started(total, output_dir);

        let progress = Arc::new(BatchProgress::new(total));
        let destination = output_dir.to_path_buf();
        processor.add_listener(move |source: &Path| {
            let current = progress.increment();
            JsonMessage::progress(current, total, source, progress.eta());
            if let Some(name) = source.file_name() {
                JsonMessage::file_completed(source, &destination.join(name));
            }
        });
        None
    } else {
        let pb = create_progress_bar(total as u64);
        let listener_pb = pb.clone();
        processor.add_listener(move |source: &Path| {
            listener_pb.set_message(display_name(source));
            listener_pb.inc(1);
        });
        Some(pb)
    };

    let report = processor.process_files(&image_files, scale);

    if let Some(pb) = progress_bar {
        pb.set_position(total as u64);
        pb.finish_with_message("Done");
    }

    if json_mode {
        for (source, error) in report.failures() {
            JsonMessage::file_failed(source, error.to_string());
        }
        JsonMessage::summary(
            report.total(),
            report.successful(),
            report.failed(),
            start_time.elapsed().as_secs_f64(),
        );
        return Ok(());
    }

    print_summary(&report);

    if args.report {
        print_report(&report);
    }

    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total time: {}",
        style(format_duration(start_time.elapsed())).bold()
    );
    println!(
        "  Average per image: {}",
        style(format_duration(report.average_duration())).dim()
    );

    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("{}", style("Results Summary:").bold().green());
    println!("  Total images: {}", report.total());
    println!("  Written: {}", style(report.successful()).bold().green());
    if report.failed() > 0 {
        println!("  Failed: {}", style(report.failed()).bold().red());
        for (source, error) in report.failures() {
            error_println(&format!("{}: {}", display_name(source), error));
        }
    }
    println!();
}

fn print_dry_run(image_files: &[std::path::PathBuf], output_dir: &Path, json_mode: bool) {
    if json_mode {
        JsonMessage::started(image_files.len(), output_dir);
        JsonMessage::summary(image_files.len(), 0, 0, 0.0);
        return;
    }

    println!("{}", style("Dry Run Results Summary:").bold().cyan());
    println!("  Images found: {}", image_files.len());
    println!();
    println!(
        "{}",
        style("Output files (would be created):").bold().cyan()
    );
    for source in image_files {
        if let Some(name) = source.file_name() {
            println!(
                "  {} -> {}",
                style(display_name(source)).bold(),
                style(output_dir.join(name).display()).cyan()
            );
        }
    }
}

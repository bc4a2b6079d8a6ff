use anyhow::Result;
use clap::Parser;
use console::style;
use std::time::Instant;

mod cli;
mod fs_access;
mod image_processing;
mod utils;

use cli::{Args, ModeArg};
use fs_access::{FileSystem, OsFileSystem};
use image_processing::{CropMode, Orientation, ProcessingConfig, ProcessingEngine};
use utils::{create_progress_bar, format_duration, validate_inputs};

impl From<ModeArg> for CropMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::CenterOnly => CropMode::CenterOnly,
            ModeArg::Edges => CropMode::Edges,
            ModeArg::All => CropMode::All,
        }
    }
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();

    // Print banner
    println!(
        "{}",
        style("Trainset Processor - Square Crop Generator")
            .bold()
            .blue()
    );
    println!(
        "{}",
        style("512x512 training samples from raw photos").dim()
    );
    println!();

    let fs = OsFileSystem;
    let root = match &args.input_dir {
        Some(dir) => dir.clone(),
        None => fs.current_dir()?,
    };

    // Validate inputs before any work starts
    validate_inputs(&args, &root)?;

    let config = ProcessingConfig {
        mode: args.mode.into(),
        parallel_jobs: args.effective_workers(),
        exif_rotate: args.exif_rotate,
        verbose: args.verbose,
    };

    if config.verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Batch root: {}", root.display());
        println!("  Crop mode: {:?}", config.mode);
        println!("  Parallel workers: {}", config.parallel_jobs);
        println!(
            "  EXIF rotation: {}",
            if config.exif_rotate {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!();
    }

    // Outputs land one level above raw/; create idempotently before any write
    let output_dir = image_processing::output_dir(&root);
    fs.create_dir_all(&output_dir)?;

    let engine = ProcessingEngine::new(config, fs)?;

    // Discover all images
    let image_files = engine.discover_images(&root)?;
    if image_files.is_empty() {
        println!(
            "{}",
            style("No images found in the raw directory").red()
        );
        return Ok(());
    }
    println!(
        "{} {} images in {}",
        style("Found").bold().green(),
        image_files.len(),
        root.join(image_processing::RAW_SUBDIR).display()
    );

    // Process the batch under a single progress bar
    let main_progress = create_progress_bar(image_files.len() as u64);
    main_progress.set_message("Processing images");

    let results = engine.process_batch(&image_files, &output_dir, |_count| {
        main_progress.inc(1);
    });

    main_progress.finish_with_message("Processing complete");
    println!();

    // Print results summary
    let successful = results.iter().filter(|r| r.is_ok()).count();
    let failed = results.len() - successful;

    let mut vertical_count = 0;
    let mut horizontal_count = 0;
    let mut samples_written = 0;
    for result in results.iter().flatten() {
        match result.orientation {
            Orientation::Vertical => vertical_count += 1,
            Orientation::Horizontal => horizontal_count += 1,
        }
        samples_written += result.output_paths.len();
    }

    println!("{}", style("Results Summary:").bold().green());
    println!(
        "  Successfully processed: {}",
        style(successful).bold().green()
    );
    if failed > 0 {
        println!("  Failed: {}", style(failed).bold().red());
    }
    println!(
        "  Square samples written: {}",
        style(samples_written).bold().cyan()
    );

    if vertical_count > 0 || horizontal_count > 0 {
        println!();
        println!("{}", style("Image Types:").bold().blue());
        if horizontal_count > 0 {
            println!(
                "  Horizontal images: {}",
                style(horizontal_count).bold().cyan()
            );
        }
        if vertical_count > 0 {
            println!(
                "  Vertical images: {}",
                style(vertical_count).bold().magenta()
            );
        }
    }

    let total_time = start_time.elapsed();
    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total processing time: {}",
        style(format_duration(total_time)).bold()
    );
    println!(
        "  Average time per image: {}",
        style(format_duration(total_time / image_files.len() as u32)).dim()
    );

    println!();
    println!("{}", style("Output files:").bold().green());
    println!("  All files: {}", output_dir.display());

    // Per-file failures are reported here and do not affect the exit code
    if failed > 0 {
        println!();
        println!("{}", style("Errors encountered:").bold().red());
        let mut error_count = 0;
        for (image_path, result) in image_files.iter().zip(&results) {
            if let Err(e) = result {
                error_count += 1;
                let filename = image_path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("unknown");
                println!(
                    "  {}: {} - {:#}",
                    style(format!("#{}", error_count)).dim(),
                    style(filename).bold().red(),
                    e
                );
            }
        }

        println!();
        println!(
            "{}",
            style(format!(
                "⚠ {} files failed and were skipped; the rest of the batch completed",
                failed
            ))
            .bold()
            .yellow()
        );
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tilematrix::config::{Settings, SUPPORTED_IMAGE_FORMATS};
use tilematrix::matrix::MatrixOptions;
use tilematrix::utils::arg_utils::{Args, Mode, determine_mode};
use tilematrix::utils::file_utils::{is_image_file, list_images, process_batch, process_file, BatchOutcome, ProcessingResult};
use tilematrix::utils::time_utils::{file_timestamp, format_duration};


/// Convert images into ceramic tile color matrices with paint mixing instructions.
fn main() -> Result<()>
{
	// Parse command line arguments.
	let mut args: Args = Args::parse();

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tilematrix=warn".into()))
		.with(fmt::layer().without_time())
		.init();

	// Merge config file and flags, then validate in one place.
	let mut settings: Settings = args.resolve_settings()?;
	args.validate(&settings)?;

	// Determine the mode of operation.
	let mode: Mode = determine_mode(&args, &settings, is_image_file)?;

	// Discover images to process.
	let mut images: Vec<PathBuf> = match mode.clone()
	{
		Mode::Directory(dir) =>
		{
			if !dir.exists()
			{
				fs::create_dir_all(&dir).with_context(|| format!("Failed to create input directory '{}'", dir.display()))?;
				println!("Created input directory: {}", dir.display());
				println!("Please place image files in the '{}' directory and run again.", dir.display());
				return Ok(());
			}

			println!("Scanning directory '{}' for images...", dir.display());
			let found: Vec<PathBuf> = list_images(&dir)?;
			if found.is_empty()
			{
				println!("No image files found in the '{}' directory.", dir.display());
				println!("Supported formats: {}", SUPPORTED_IMAGE_FORMATS.join(", ").to_uppercase());
				return Ok(());
			}

			println!("Found {} image file(s):", found.len());
			for (i, file) in found.iter().enumerate()
			{
				println!("  {}. {}", i + 1, display_name(file));
			}

			// Without --all only the first image is converted.
			if !args.all
			{
				found.into_iter().take(1).collect()
			}
			else
			{
				found
			}
		},
		Mode::Files(files) =>
		{
			println!("Processing {} specified image file(s)...", files.len());
			files
		},
	};
	println!();

	// Ask for dimensions not given on the command line.
	if args.needs_prompt()
	{
		let stdin = io::stdin();
		let mut input = stdin.lock();
		if !args.prompt_missing(&mut settings, &mut input, &mut io::stdout())?
		{
			println!("\n\nOperation cancelled by user.");
			return Ok(());
		}
		args.validate(&settings)?;
		println!();
	}

	let options: MatrixOptions = args.matrix_options(&settings)?;
	let preview_scale: Option<u32> = if settings.preview { Some(settings.preview_scale) } else { None };

	print_settings(&args, &options, &settings, &mode);

	let started: Instant = Instant::now();
	fs::create_dir_all(&settings.output_dir)
		.with_context(|| format!("Failed to create output directory '{}'", settings.output_dir.display()))?;

	// Process a single image with the detailed report.
	if images.len() == 1
	{
		let file: PathBuf = images.remove(0);
		println!("Processing: {}", display_name(&file));

		let result: ProcessingResult = process_file(&file, &settings.output_dir, &options, preview_scale, &file_timestamp())
			.with_context(|| format!("Error processing {}", file.display()))?;

		print_report(&result, &options);
		println!("\nProcessing completed successfully in {}!", format_duration(started.elapsed()));
		return Ok(());
	}

	// Batch mode: process in parallel.
	println!("Processing files...");

	let BatchOutcome { results, errors } = process_batch(images, &settings.output_dir, &options, preview_scale, |current, total, file, outcome|
	{
		match outcome
		{
			Ok(result) => println!("[{}/{}] Done: {} | {} x {} tiles, {} colors", current, total, display_name(file), result.matrix.info.matrix_rows, result.matrix.info.matrix_columns, result.matrix.info.unique_colors),
			Err(err) => eprintln!("[{}/{}] Error processing {}: {}", current, total, file.display(), err),
		}
	});

	// Print summary.
	println!("\n========================================");
	println!("MATRIX SUMMARY");
	println!("========================================");
	println!("Total images processed successfully: {}", results.len());

	if !errors.is_empty()
	{
		println!("Images with errors: {}", errors.len());
		println!("\nErrors:");
		for (file, error) in &errors
		{
			println!("  {}: {}", file, error);
		}
	}

	if !results.is_empty()
	{
		let total_tiles: usize = results.iter().map(|r| r.matrix.info.total_tiles).sum();
		println!("Total tiles: {}", total_tiles);
		println!("Output directory: {}", settings.output_dir.display());
	}

	println!("Elapsed: {}", format_duration(started.elapsed()));
	println!("========================================");

	Ok(())
}

/// Print the processing settings with logical grouping.
fn print_settings(args: &Args, options: &MatrixOptions, settings: &Settings, mode: &Mode)
{
	println!("Settings:");
	println!("----------------------------------------");

	// 1. Input/Output Parameters.
	println!("INPUT/OUTPUT:");
	match mode
	{
		Mode::Directory(dir) =>
		{
			println!("  - Input directory: {}", dir.display());
			println!("  - Mode: Directory Mode ({})", if args.all { "all images" } else { "first image" });
		},
		Mode::Files(files) => println!("  - Mode: Specific Files Mode ({} files)", files.len()),
	}
	println!("  - Output directory: {}", settings.output_dir.display());
	if let Some(config) = &args.config
	{
		println!("  - Config file: {}", config.display());
	}

	// 2. Mosaic Parameters.
	println!("\nMOSAIC:");
	println!("  - Requested dimensions: {}cm x {}cm", options.width_cm, options.height_cm);
	println!("  - Tile size: {:.2}cm x {:.2}cm", settings.tile_size_cm, settings.tile_size_cm);
	println!("  - Palette size: {} colors", settings.palette_size);

	// 3. Output Parameters.
	println!("\nOUTPUT:");
	if settings.preview
	{
		println!("  - Preview: Yes ({} px per tile)", settings.preview_scale);
	}
	else
	{
		println!("  - Preview: Off");
	}
	println!("----------------------------------------");
	println!();
}

/// Print the detailed report for a single processed image.
fn print_report(result: &ProcessingResult, options: &MatrixOptions)
{
	let (width_px, height_px): (u32, u32) = result.matrix.source_size;
	let aspect: f64 = width_px as f64 / height_px as f64;
	let info = &result.matrix.info;

	println!("Original image: {}x{} (aspect ratio: {:.2})", width_px, height_px, aspect);
	println!("Requested dimensions: {}cm x {}cm", options.width_cm, options.height_cm);

	println!("\n=== Processing Complete ===");
	println!("Matrix dimensions: {} rows x {} columns", info.matrix_rows, info.matrix_columns);
	println!("Total tiles: {}", info.total_tiles);
	println!("Tile size: {:.2}cm x {:.2}cm", info.tile_size_cm, info.tile_size_cm);
	println!("Output dimensions: {:.2}cm x {:.2}cm", info.output_width_cm, info.output_height_cm);
	println!("Unique colors: {}", info.unique_colors);

	if result.matrix.dimensions.was_adjusted()
	{
		println!("Note: Dimensions adjusted to preserve aspect ratio (maintained at {:.2})", aspect);
	}

	println!("\nMatrix saved to: {}", result.outputs.text.display());
	println!("Matrix saved to: {}", result.outputs.json.display());
	if result.wrote_preview
	{
		println!("Preview image saved to: {}", result.outputs.preview.display());
	}
}

/// File name for console listings.
fn display_name(path: &std::path::Path) -> String
{
	path.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string())
}

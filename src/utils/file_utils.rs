use image::DynamicImage;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::SUPPORTED_IMAGE_FORMATS;
use crate::error::{MatrixError, Result};
use crate::matrix::{self, MatrixOptions, MatrixResult};
use crate::output;
use crate::utils::time_utils::file_timestamp;

/// Files written for one processed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths
{
	pub text: PathBuf,
	pub json: PathBuf,
	pub preview: PathBuf,
}

/// Outcome of processing one image file.
#[derive(Debug, Clone)]
pub struct ProcessingResult
{
	pub source_path: PathBuf,
	pub matrix: MatrixResult,
	pub outputs: OutputPaths,
	pub wrote_preview: bool,
}

/// Results of a batch run, with failures as `(file, message)` pairs.
#[derive(Debug)]
pub struct BatchOutcome
{
	pub results: Vec<ProcessingResult>,
	pub errors: Vec<(String, String)>,
}

/// Checks if a file is a supported image by its extension.
pub fn is_image_file(path: &Path) -> bool
{
	path.extension()
		.map(|ext| SUPPORTED_IMAGE_FORMATS.contains(&ext.to_string_lossy().to_lowercase().as_str()))
		.unwrap_or(false)
}

/// List the supported images directly inside `dir`, sorted by path.
///
/// Subdirectories are not searched. A missing directory yields an empty list.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>>
{
	if !dir.is_dir()
	{
		return Ok(Vec::new());
	}

	let mut images: Vec<PathBuf> = Vec::new();
	for entry in fs::read_dir(dir)?
	{
		let path: PathBuf = entry?.path();
		if path.is_file() && is_image_file(&path)
		{
			images.push(path);
		}
	}

	images.sort();
	Ok(images)
}

/// Decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage>
{
	image::open(path).map_err(|source| MatrixError::Decode { path: path.to_path_buf(), source })
}

/// Build the timestamped output file names for an image stem.
pub fn output_paths(output_dir: &Path, stem: &str, timestamp: &str) -> OutputPaths
{
	OutputPaths
	{
		text: output_dir.join(format!("{}-{}_matrix.txt", stem, timestamp)),
		json: output_dir.join(format!("{}-{}_matrix.json", stem, timestamp)),
		preview: output_dir.join(format!("{}-{}.png", stem, timestamp)),
	}
}

/// Run the matrix pipeline on one image file and write all outputs.
///
/// `preview_scale` of `None` skips the PNG preview.
pub fn process_file(source_path: &Path, output_dir: &Path, options: &MatrixOptions, preview_scale: Option<u32>, timestamp: &str) -> Result<ProcessingResult>
{
	let image: DynamicImage = load_image(source_path)?;
	let result: MatrixResult = matrix::generate_matrix(&image, options)?;

	let stem: String = source_path.file_stem()
		.map(|s| s.to_string_lossy().into_owned())
		.unwrap_or_else(|| "image".to_string());
	let outputs: OutputPaths = output_paths(output_dir, &stem, timestamp);

	output::write_text(&result.grid, &result.inventory, &outputs.text)?;
	output::write_json(&result.grid, &outputs.json)?;
	if let Some(scale) = preview_scale
	{
		output::write_preview(&result.grid, &outputs.preview, scale)?;
	}

	Ok(ProcessingResult
	{
		source_path: source_path.to_path_buf(),
		matrix: result,
		outputs,
		wrote_preview: preview_scale.is_some(),
	})
}

/// Process `files` in parallel, continuing past failed images.
///
/// `on_done` is called once per file with its 1-based completion count and the total.
pub fn process_batch<F>(files: Vec<PathBuf>, output_dir: &Path, options: &MatrixOptions, preview_scale: Option<u32>, on_done: F) -> BatchOutcome
where
	F: Fn(usize, usize, &Path, &Result<ProcessingResult>) + Sync,
{
	let total_files: usize = files.len();
	let processed: Mutex<usize> = Mutex::new(0);
	let errors: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());

	let results: Vec<ProcessingResult> = files.into_par_iter().filter_map(|file|
	{
		let outcome: Result<ProcessingResult> = process_file(&file, output_dir, options, preview_scale, &file_timestamp());

		// Update the progress counter.
		let mut count = processed.lock().expect("Processed counter mutex poisoned");
		*count += 1;
		let current: usize = *count;
		drop(count);

		on_done(current, total_files, &file, &outcome);

		match outcome
		{
			Ok(result) => Some(result),
			Err(err) =>
			{
				errors.lock().expect("Errors mutex poisoned").push((file.display().to_string(), err.to_string()));
				None
			}
		}
	}).collect();

	BatchOutcome
	{
		results,
		errors: errors.into_inner().expect("Errors mutex poisoned"),
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use image::RgbImage;

	#[test]
	fn test_is_image_file()
	{
		assert!(is_image_file(Path::new("photo.JPG")));
		assert!(is_image_file(Path::new("dir/a.webp")));
		assert!(!is_image_file(Path::new("notes.txt")));
		assert!(!is_image_file(Path::new("png")));
	}

	#[test]
	fn test_list_images_filters_and_sorts()
	{
		let dir = tempfile::tempdir().unwrap();
		for name in ["b.png", "a.jpeg", "c.txt", "d.Bmp"]
		{
			fs::write(dir.path().join(name), b"").unwrap();
		}
		fs::create_dir(dir.path().join("nested.png")).unwrap();

		let names: Vec<String> = list_images(dir.path()).unwrap().iter()
			.map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
			.collect();
		assert_eq!(names, vec!["a.jpeg", "b.png", "d.Bmp"]);
	}

	#[test]
	fn test_list_images_missing_dir_is_empty()
	{
		let dir = tempfile::tempdir().unwrap();
		assert!(list_images(&dir.path().join("absent")).unwrap().is_empty());
	}

	#[test]
	fn test_output_paths()
	{
		let paths: OutputPaths = output_paths(Path::new("output"), "cat", "20260206_201530");
		assert_eq!(paths.text, PathBuf::from("output/cat-20260206_201530_matrix.txt"));
		assert_eq!(paths.json, PathBuf::from("output/cat-20260206_201530_matrix.json"));
		assert_eq!(paths.preview, PathBuf::from("output/cat-20260206_201530.png"));
	}

	#[test]
	fn test_load_image_reports_path()
	{
		let dir = tempfile::tempdir().unwrap();
		let path: PathBuf = dir.path().join("broken.png");
		fs::write(&path, b"not a png").unwrap();

		match load_image(&path)
		{
			Err(MatrixError::Decode { path: failed, .. }) => assert_eq!(failed, path),
			other => panic!("expected decode error, got {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn test_process_file_writes_outputs()
	{
		let dir = tempfile::tempdir().unwrap();
		let source: PathBuf = dir.path().join("tile.png");
		RgbImage::from_pixel(20, 10, image::Rgb([200, 30, 30])).save(&source).unwrap();

		let options: MatrixOptions = MatrixOptions { width_cm: 20.0, height_cm: 10.0, tile_size_cm: 2.0, palette_size: 4 };
		let output_dir: PathBuf = dir.path().join("out");
		let processed: ProcessingResult = process_file(&source, &output_dir, &options, None, "20260101_000000").unwrap();

		assert!(processed.outputs.text.is_file());
		assert!(processed.outputs.json.is_file());
		assert!(!processed.outputs.preview.exists());
		assert!(!processed.wrote_preview);
		assert_eq!((processed.matrix.grid.rows(), processed.matrix.grid.cols()), (5, 10));
	}

	#[test]
	fn test_process_batch_collects_errors_and_counts_progress()
	{
		let dir = tempfile::tempdir().unwrap();
		let first: PathBuf = dir.path().join("first.png");
		let second: PathBuf = dir.path().join("second.png");
		let broken: PathBuf = dir.path().join("broken.png");
		RgbImage::from_pixel(20, 10, image::Rgb([200, 30, 30])).save(&first).unwrap();
		RgbImage::from_pixel(20, 10, image::Rgb([30, 30, 200])).save(&second).unwrap();
		fs::write(&broken, b"not a png").unwrap();

		let options: MatrixOptions = MatrixOptions { width_cm: 20.0, height_cm: 10.0, tile_size_cm: 2.0, palette_size: 4 };
		let seen: Mutex<Vec<(usize, usize)>> = Mutex::new(Vec::new());
		let outcome: BatchOutcome = process_batch(vec![first.clone(), broken.clone(), second.clone()], &dir.path().join("out"), &options, None, |current, total, _, _|
		{
			seen.lock().unwrap().push((current, total));
		});

		let sources: Vec<PathBuf> = outcome.results.iter().map(|r| r.source_path.clone()).collect();
		assert_eq!(sources, vec![first, second]);
		assert_eq!(outcome.errors.len(), 1);
		assert_eq!(outcome.errors[0].0, broken.display().to_string());

		let mut seen: Vec<(usize, usize)> = seen.into_inner().unwrap();
		seen.sort();
		assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
	}
}

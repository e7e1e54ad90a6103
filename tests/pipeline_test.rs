use image::{DynamicImage, GenericImageView, RgbImage};
use std::fs;
use std::path::PathBuf;

use tilematrix::matrix::{generate_matrix, MatrixOptions, MatrixResult};
use tilematrix::output;
use tilematrix::utils::file_utils::{list_images, process_file, ProcessingResult};

/// Left half red, right half blue.
fn two_tone_image(width: u32, height: u32) -> RgbImage
{
	RgbImage::from_fn(width, height, |x, _| if x < width / 2 { image::Rgb([220, 20, 20]) } else { image::Rgb([20, 20, 220]) })
}

#[test]
fn test_directory_to_outputs()
{
	let dir = tempfile::tempdir().unwrap();
	let input: PathBuf = dir.path().join("input");
	let output_dir: PathBuf = dir.path().join("output");
	fs::create_dir(&input).unwrap();

	two_tone_image(60, 30).save(input.join("mural.png")).unwrap();
	fs::write(input.join("readme.txt"), "not an image").unwrap();

	let images: Vec<PathBuf> = list_images(&input).unwrap();
	assert_eq!(images, vec![input.join("mural.png")]);

	let options: MatrixOptions = MatrixOptions { width_cm: 60.0, height_cm: 40.0, tile_size_cm: 2.0, palette_size: 8 };
	let processed: ProcessingResult = process_file(&images[0], &output_dir, &options, Some(3), "20260206_201530").unwrap();

	// 2:1 source into 60x40 cm resolves to 60x30 cm.
	assert_eq!((processed.matrix.grid.rows(), processed.matrix.grid.cols()), (15, 30));
	assert!(processed.matrix.dimensions.was_adjusted());

	assert_eq!(processed.outputs.text, output_dir.join("mural-20260206_201530_matrix.txt"));
	let text: String = fs::read_to_string(&processed.outputs.text).unwrap();
	assert!(text.starts_with("# RGB Color Matrix with Paint Mixing Instructions\n# Matrix dimensions: 15 rows x 30 columns\n"));
	assert!(text.contains("# BASE COLORS TO PURCHASE:"));
	assert_eq!(text.lines().filter(|line| line.starts_with("# Row ")).count(), 15);

	let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&processed.outputs.json).unwrap()).unwrap();
	assert_eq!(json["dimensions"]["rows"], 15);
	assert_eq!(json["dimensions"]["columns"], 30);
	assert_eq!(json["matrix"].as_array().unwrap().len(), 15);
	assert_eq!(json["matrix"][0].as_array().unwrap().len(), 30);

	let preview: DynamicImage = image::open(&processed.outputs.preview).unwrap();
	assert_eq!(preview.dimensions(), (90, 45));
}

#[test]
fn test_quantized_grid_uses_palette_and_inventory_totals()
{
	let image: DynamicImage = DynamicImage::ImageRgb8(two_tone_image(40, 40));
	let options: MatrixOptions = MatrixOptions { width_cm: 40.0, height_cm: 40.0, tile_size_cm: 2.0, palette_size: 4 };
	let result: MatrixResult = generate_matrix(&image, &options).unwrap();

	assert_eq!(result.palette.len(), 4);
	assert!(result.grid.cells().iter().all(|c| result.palette.contains(c)));
	assert_eq!(result.inventory.iter().map(|e| e.count).sum::<usize>(), 400);
	assert!(result.inventory.windows(2).all(|w| w[0].count >= w[1].count));

	let text: String = output::render_text(&result.grid, &result.inventory);
	for entry in &result.inventory
	{
		assert!(text.contains(&format!("x{}", entry.count)));
	}
}

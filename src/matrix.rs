use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use tracing::{debug, info};

use crate::dimensions::{self, Dimensions};
use crate::error::{MatrixError, Result};
use crate::inventory::{self, InventoryEntry};
use crate::median::{self, Palette};
use crate::sampler::{self, ColorGrid};

/// Requested output size and quantization settings for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixOptions
{
	pub width_cm: f64,
	pub height_cm: f64,
	pub tile_size_cm: f64,
	pub palette_size: usize,
}

impl MatrixOptions
{
	/// Check parameter values before any image work is done.
	pub fn validate(&self) -> Result<()>
	{
		for (name, value) in [("width", self.width_cm), ("height", self.height_cm), ("tile size", self.tile_size_cm)]
		{
			if !value.is_finite() || value <= 0.0
			{
				return Err(MatrixError::InvalidDimension(format!("{} must be a positive number, got {}", name, value)));
			}
		}

		if self.palette_size == 0
		{
			return Err(MatrixError::InvalidArgument("palette size must be at least 1".to_string()));
		}

		Ok(())
	}
}

/// Summary of a generated matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixInfo
{
	pub matrix_rows: usize,
	pub matrix_columns: usize,
	pub total_tiles: usize,
	pub tile_size_cm: f64,
	pub output_width_cm: f64,
	pub output_height_cm: f64,
	pub unique_colors: usize,
}

/// Everything produced for one image.
#[derive(Debug, Clone)]
pub struct MatrixResult
{
	pub grid: ColorGrid,
	pub palette: Palette,
	pub dimensions: Dimensions,
	pub inventory: Vec<InventoryEntry>,
	pub info: MatrixInfo,
	pub source_size: (u32, u32),
}

/// Run the full pipeline on a decoded image.
///
/// Resolves aspect-preserving output dimensions, samples one color per tile,
/// quantizes the grid and counts the resulting paint colors.
pub fn generate_matrix(image: &DynamicImage, options: &MatrixOptions) -> Result<MatrixResult>
{
	options.validate()?;

	let (width_px, height_px): (u32, u32) = image.dimensions();
	let aspect: f64 = dimensions::aspect_ratio(width_px, height_px)?;

	let dims: Dimensions = dimensions::resolve_dimensions(aspect, options.width_cm, options.height_cm)?;
	let (rows, cols): (u32, u32) = dimensions::grid_shape(dims.width, dims.height, options.tile_size_cm)?;

	let sampled: ColorGrid = sampler::sample_grid(image, rows, cols)?;
	let (palette, grid): (Palette, ColorGrid) = median::quantize(sampled, options.palette_size)?;
	let inventory: Vec<InventoryEntry> = inventory::inventory(&grid);

	debug!(rows, cols, palette = palette.len(), unique = inventory.len(), "generated matrix");

	let info: MatrixInfo = MatrixInfo
	{
		matrix_rows: grid.rows(),
		matrix_columns: grid.cols(),
		total_tiles: grid.len(),
		tile_size_cm: options.tile_size_cm,
		output_width_cm: grid.cols() as f64 * options.tile_size_cm,
		output_height_cm: grid.rows() as f64 * options.tile_size_cm,
		unique_colors: inventory.len(),
	};

	info!(rows = info.matrix_rows, columns = info.matrix_columns, colors = info.unique_colors, "matrix ready");

	Ok(MatrixResult
	{
		grid,
		palette,
		dimensions: dims,
		inventory,
		info,
		source_size: (width_px, height_px),
	})
}

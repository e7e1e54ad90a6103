use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::color::Color;
use crate::error::{MatrixError, Result};

/// Row-major matrix of tile colors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorGrid
{
	rows: usize,
	cols: usize,
	cells: Vec<Color>,
}

impl ColorGrid
{
	/// Create a grid from row-major cells. `cells.len()` must equal `rows * cols`.
	pub fn new(rows: usize, cols: usize, cells: Vec<Color>) -> Result<Self>
	{
		if rows.checked_mul(cols) != Some(cells.len())
		{
			return Err(MatrixError::InvalidDimension(format!("{} cells do not form a {}x{} grid", cells.len(), rows, cols)));
		}
		Ok(Self { rows, cols, cells })
	}

	/// Create a grid from nested rows; every row must have the same length.
	pub fn from_rows(rows: Vec<Vec<Color>>) -> Result<Self>
	{
		let row_count: usize = rows.len();
		let col_count: usize = rows.first().map(Vec::len).unwrap_or(0);

		let mut cells: Vec<Color> = Vec::with_capacity(row_count * col_count);
		for (i, row) in rows.into_iter().enumerate()
		{
			if row.len() != col_count
			{
				return Err(MatrixError::InvalidDimension(format!("row {} has {} cells, expected {}", i + 1, row.len(), col_count)));
			}
			cells.extend(row);
		}

		Self::new(row_count, col_count, cells)
	}

	pub fn rows(&self) -> usize
	{
		self.rows
	}

	pub fn cols(&self) -> usize
	{
		self.cols
	}

	pub fn len(&self) -> usize
	{
		self.cells.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.cells.is_empty()
	}

	pub fn cells(&self) -> &[Color]
	{
		&self.cells
	}

	pub fn get(&self, row: usize, col: usize) -> Option<Color>
	{
		if row < self.rows && col < self.cols
		{
			Some(self.cells[row * self.cols + col])
		}
		else
		{
			None
		}
	}

	/// Iterate the grid one row slice at a time.
	pub fn iter_rows(&self) -> impl Iterator<Item = &[Color]>
	{
		// chunks() panics on a zero width, and a zero width grid has no cells anyway.
		self.cells.chunks(self.cols.max(1))
	}

	pub(crate) fn into_parts(self) -> (usize, usize, Vec<Color>)
	{
		(self.rows, self.cols, self.cells)
	}

	/// Render the grid as an RGB image with one pixel per tile.
	pub fn to_image(&self) -> RgbImage
	{
		let mut image: RgbImage = RgbImage::new(self.cols as u32, self.rows as u32);
		for (i, color) in self.cells.iter().enumerate()
		{
			let x: u32 = (i % self.cols) as u32;
			let y: u32 = (i / self.cols) as u32;
			image.put_pixel(x, y, image::Rgb(color.to_array()));
		}
		image
	}
}

/// Resample an image onto a `rows` x `cols` tile grid.
///
/// The image is flattened to 8-bit RGB first (alpha is dropped), then resized
/// with a Lanczos3 filter so that each output pixel becomes one tile.
pub fn sample_grid(image: &DynamicImage, rows: u32, cols: u32) -> Result<ColorGrid>
{
	if rows == 0 || cols == 0
	{
		return Err(MatrixError::InvalidDimension(format!("cannot sample a {}x{} grid", rows, cols)));
	}

	let rgb: RgbImage = image.to_rgb8();
	let resized: RgbImage = imageops::resize(&rgb, cols, rows, FilterType::Lanczos3);

	debug!(source_width = rgb.width(), source_height = rgb.height(), rows, cols, "sampled tile grid");

	let cells: Vec<Color> = resized.pixels().map(|&image::Rgb(rgb)| Color::from(rgb)).collect();

	ColorGrid::new(rows as usize, cols as usize, cells)
}

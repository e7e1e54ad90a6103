use tracing::debug;

use crate::error::{MatrixError, Result};

/// Upper bound on tiles per mosaic; 4000 x 4000 tiles is 80 m square at 2 cm.
pub const MAX_TILES: u64 = 16_000_000;

/// Output size in physical units, with the absolute deviation from the request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions
{
	pub width: f64,
	pub height: f64,
	pub width_delta: f64,
	pub height_delta: f64,
}

impl Dimensions
{
	/// True when the resolved size differs noticeably from the request.
	pub fn was_adjusted(&self) -> bool
	{
		self.width_delta > 0.01 || self.height_delta > 0.01
	}
}

fn require_positive(name: &str, value: f64) -> Result<()>
{
	if !value.is_finite() || value <= 0.0
	{
		return Err(MatrixError::InvalidDimension(format!("{} must be a positive number, got {}", name, value)));
	}
	Ok(())
}

/// Aspect ratio (width / height) of a pixel image.
pub fn aspect_ratio(width_px: u32, height_px: u32) -> Result<f64>
{
	if width_px == 0 || height_px == 0
	{
		return Err(MatrixError::InvalidDimension(format!("image has no pixels ({}x{})", width_px, height_px)));
	}
	Ok(width_px as f64 / height_px as f64)
}

/// Pick the aspect-preserving size closest to the requested one.
///
/// Fitting to the requested width and fitting to the requested height are
/// both scored by the summed absolute deviation from the request; the lower
/// score wins and ties keep the width fit.
pub fn resolve_dimensions(aspect: f64, width_req: f64, height_req: f64) -> Result<Dimensions>
{
	require_positive("width", width_req)?;
	require_positive("height", height_req)?;
	require_positive("aspect ratio", aspect)?;

	let fit_width: (f64, f64) = (width_req, width_req / aspect);
	let fit_height: (f64, f64) = (height_req * aspect, height_req);

	let score = |(w, h): (f64, f64)| -> f64 { (w - width_req).abs() + (h - height_req).abs() };

	let (width, height): (f64, f64) = if score(fit_height) < score(fit_width)
	{
		fit_height
	}
	else
	{
		fit_width
	};

	debug!(aspect, width_req, height_req, width, height, "resolved output dimensions");

	Ok(Dimensions
	{
		width,
		height,
		width_delta: (width - width_req).abs(),
		height_delta: (height - height_req).abs(),
	})
}

/// Number of (rows, columns) of whole tiles that fit in the output size.
pub fn grid_shape(width: f64, height: f64, tile_size: f64) -> Result<(u32, u32)>
{
	require_positive("tile size", tile_size)?;
	require_positive("width", width)?;
	require_positive("height", height)?;

	let cols: f64 = (width / tile_size).floor();
	let rows: f64 = (height / tile_size).floor();

	if cols < 1.0 || rows < 1.0
	{
		return Err(MatrixError::InvalidDimension(format!(
			"tile size {} leaves no tiles in {}x{} ({} rows x {} columns)",
			tile_size, width, height, rows, cols
		)));
	}

	// Both counts are at least 1, so each is bounded by the product.
	if rows * cols > MAX_TILES as f64
	{
		return Err(MatrixError::InvalidDimension(format!(
			"{} rows x {} columns exceeds the limit of {} tiles",
			rows, cols, MAX_TILES
		)));
	}

	Ok((rows as u32, cols as u32))
}

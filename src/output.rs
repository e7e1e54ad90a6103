use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbImage};
use oxipng::{optimize_from_memory, Options as OxiOptions};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::color::{self, Color, ColorRecord};
use crate::error::{MatrixError, Result};
use crate::inventory::InventoryEntry;
use crate::mixer::{self, BaseColor, MixRecipe};
use crate::naming;
use crate::sampler::ColorGrid;

/// One serialized grid cell.
#[derive(Debug, Serialize)]
struct CellRecord
{
	#[serde(flatten)]
	record: ColorRecord,
	name: &'static str,
}

#[derive(Debug, Serialize)]
struct GridDimensions
{
	rows: usize,
	columns: usize,
}

#[derive(Debug, Serialize)]
struct MatrixDocument
{
	dimensions: GridDimensions,
	matrix: Vec<Vec<CellRecord>>,
}

/// Format one cell as `R,G,B[C:c%,M:m%,Y:y%,K:k%] #HEX {Mix: ...}`.
fn format_cell(color: Color) -> String
{
	let record: ColorRecord = color::color_record(color);
	let recipe: MixRecipe = mixer::mix_recipe(&record.cmyk);

	let mix: String = if recipe.is_fallback()
	{
		recipe.instruction()
	}
	else
	{
		format!("Mix: {}", recipe.instruction())
	};

	format!(
		"{},{},{}[C:{:.1}%,M:{:.1}%,Y:{:.1}%,K:{:.1}%] {} {{{}}}",
		color.r, color.g, color.b,
		record.cmyk.c, record.cmyk.m, record.cmyk.y, record.cmyk.k,
		record.hex,
		mix
	)
}

/// Text matrix view of a grid and its inventory.
struct TextMatrix<'a>
{
	grid: &'a ColorGrid,
	inventory: &'a [InventoryEntry],
}

impl fmt::Display for TextMatrix<'_>
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		let grid: &ColorGrid = self.grid;

		writeln!(f, "# RGB Color Matrix with Paint Mixing Instructions")?;
		writeln!(f, "# Matrix dimensions: {} rows x {} columns", grid.rows(), grid.cols())?;
		writeln!(f, "# Format: R,G,B[CMYK] #HEX {{mix_instruction}}")?;
		writeln!(f)?;

		writeln!(f, "# BASE COLORS TO PURCHASE:")?;
		for base in mixer::base_colors()
		{
			let BaseColor { name, rgb, hex, cmyk } = base;
			writeln!(
				f,
				"# - {}: RGB[{}, {}, {}] {} CMYK({:.1}%,{:.1}%,{:.1}%,{:.1}%)",
				name.name().to_uppercase(), rgb[0], rgb[1], rgb[2], hex, cmyk.c, cmyk.m, cmyk.y, cmyk.k
			)?;
		}
		writeln!(f)?;

		// Quantized grids hold few distinct colors, so format each one once.
		let mut cell_cache: HashMap<Color, String> = HashMap::new();
		for (i, row) in grid.iter_rows().enumerate()
		{
			writeln!(f, "# Row {}", i + 1)?;
			for (j, &color) in row.iter().enumerate()
			{
				if j > 0
				{
					f.write_str(" ")?;
				}
				f.write_str(cell_cache.entry(color).or_insert_with(|| format_cell(color)))?;
			}
			writeln!(f)?;
		}

		if !self.inventory.is_empty()
		{
			writeln!(f)?;
			writeln!(f, "# PAINT INVENTORY ({} colors):", self.inventory.len())?;
			for entry in self.inventory
			{
				let [r, g, b]: [u8; 3] = entry.color.to_array();
				writeln!(f, "# {} RGB[{}, {}, {}] x{}", color::to_hex(entry.color), r, g, b, entry.count)?;
			}
		}

		Ok(())
	}
}

/// Render the text matrix with purchase list, mixing instructions and inventory.
pub fn render_text(grid: &ColorGrid, inventory: &[InventoryEntry]) -> String
{
	TextMatrix { grid, inventory }.to_string()
}

/// Render the grid as pretty-printed JSON.
pub fn render_json(grid: &ColorGrid) -> Result<String>
{
	let matrix: Vec<Vec<CellRecord>> = grid.iter_rows()
		.map(|row| row.iter()
			.map(|&color| CellRecord { record: color::color_record(color), name: naming::color_name(color) })
			.collect())
		.collect();

	let document: MatrixDocument = MatrixDocument
	{
		dimensions: GridDimensions { rows: grid.rows(), columns: grid.cols() },
		matrix,
	};

	Ok(serde_json::to_string_pretty(&document)?)
}

fn ensure_parent(path: &Path) -> Result<()>
{
	if let Some(parent) = path.parent()
	{
		if !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)?;
		}
	}
	Ok(())
}

/// Save the text matrix to `path`, creating parent directories as needed.
pub fn write_text(grid: &ColorGrid, inventory: &[InventoryEntry], path: &Path) -> Result<()>
{
	ensure_parent(path)?;
	fs::write(path, render_text(grid, inventory))?;
	debug!(path = %path.display(), "wrote text matrix");
	Ok(())
}

/// Save the JSON matrix to `path`, creating parent directories as needed.
pub fn write_json(grid: &ColorGrid, path: &Path) -> Result<()>
{
	ensure_parent(path)?;
	fs::write(path, render_json(grid)?)?;
	debug!(path = %path.display(), "wrote JSON matrix");
	Ok(())
}

/// Encode an upscaled preview of the grid as an optimized PNG.
pub fn encode_preview(grid: &ColorGrid, scale_factor: u32) -> Result<Vec<u8>>
{
	if grid.is_empty()
	{
		return Err(MatrixError::InvalidDimension("cannot render a preview of an empty grid".to_string()));
	}
	if scale_factor == 0
	{
		return Err(MatrixError::InvalidArgument("preview scale must be at least 1".to_string()));
	}

	let tiles: RgbImage = grid.to_image();
	let preview: RgbImage = if scale_factor > 1
	{
		imageops::resize(&tiles, tiles.width() * scale_factor, tiles.height() * scale_factor, FilterType::Nearest)
	}
	else
	{
		tiles
	};

	// Encode the image to PNG.
	let mut buffer: Vec<u8> = Vec::new();
	{
		let mut cursor = Cursor::new(&mut buffer);
		DynamicImage::ImageRgb8(preview).write_to(&mut cursor, ImageFormat::Png)
			.map_err(|e| MatrixError::Encode(format!("Failed to encode preview image: {}", e)))?;
	}

	// Lossless optimization only; previews must keep exact tile colors.
	let mut options: OxiOptions = OxiOptions::default();
	options.strip = oxipng::StripChunks::Safe;
	options.interlace = None;
	options.bit_depth_reduction = true;
	options.color_type_reduction = true;
	options.palette_reduction = true;

	optimize_from_memory(&buffer, &options)
		.map_err(|e| MatrixError::Encode(format!("Failed to optimize preview PNG: {}", e)))
}

/// Save a PNG preview of the grid, each tile drawn as a `scale_factor` square.
pub fn write_preview(grid: &ColorGrid, path: &Path, scale_factor: u32) -> Result<()>
{
	let data: Vec<u8> = encode_preview(grid, scale_factor)?;
	ensure_parent(path)?;
	fs::write(path, &data)?;
	debug!(path = %path.display(), bytes = data.len(), "wrote preview");
	Ok(())
}

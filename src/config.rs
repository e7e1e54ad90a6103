use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MatrixError, Result};

/// Standard ceramic tile size in centimeters.
pub const TILE_SIZE_CM: f64 = 2.0;

/// Default number of palette colors after quantization.
pub const DEFAULT_PALETTE_SIZE: usize = 32;

/// Default upscale factor of the PNG preview.
pub const DEFAULT_PREVIEW_SCALE: u32 = 10;

/// Lowercase extensions recognized as input images.
pub const SUPPORTED_IMAGE_FORMATS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Defaults that can be stored in a TOML settings file.
///
/// Every field is optional in the file; missing ones keep the built-in defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings
{
	pub tile_size_cm: f64,
	pub palette_size: usize,
	pub preview_scale: u32,
	pub input_dir: PathBuf,
	pub output_dir: PathBuf,
	pub preview: bool,
}

impl Default for Settings
{
	fn default() -> Self
	{
		Self
		{
			tile_size_cm: TILE_SIZE_CM,
			palette_size: DEFAULT_PALETTE_SIZE,
			preview_scale: DEFAULT_PREVIEW_SCALE,
			input_dir: PathBuf::from("input"),
			output_dir: PathBuf::from("output"),
			preview: true,
		}
	}
}

impl Settings
{
	/// Parse settings from TOML text.
	pub fn from_toml(text: &str) -> Result<Self>
	{
		toml::from_str(text).map_err(|e| MatrixError::InvalidArgument(format!("invalid settings: {}", e)))
	}

	/// Load settings from a TOML file.
	pub fn load(path: &Path) -> Result<Self>
	{
		let text: String = fs::read_to_string(path)?;
		Self::from_toml(&text)
	}
}

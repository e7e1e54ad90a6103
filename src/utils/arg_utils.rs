use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::matrix::MatrixOptions;

/// Convert images into ceramic tile color matrices with paint mixing instructions.
#[derive(Debug, Parser)]
#[command(version, author, about)]
pub struct Args
{
	// 1. Input/Output Parameters.
	/// Image files to process. If not provided, images in the input directory are used.
	pub files: Vec<PathBuf>,

	/// Directory to scan for images when no files are given [default: input].
	#[arg(short, long, value_name = "DIR")]
	pub input: Option<PathBuf>,

	/// Directory receiving the matrix and preview files [default: output].
	#[arg(short, long, value_name = "DIR")]
	pub output: Option<PathBuf>,

	/// TOML file with default settings.
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	// 2. Mosaic Dimensions.
	/// Requested mosaic width in centimeters. Asked for interactively when omitted.
	#[arg(short = 'W', long, value_name = "CM")]
	pub width: Option<f64>,

	/// Requested mosaic height in centimeters. Asked for interactively when omitted.
	#[arg(short = 'H', long, value_name = "CM")]
	pub height: Option<f64>,

	/// Edge length of one square tile in centimeters [default: 2.0].
	#[arg(short, long, value_name = "CM")]
	pub tile_size: Option<f64>,

	// 3. Color Parameters.
	/// Maximum number of distinct tile colors [default: 32].
	#[arg(short = 'k', long, value_name = "K")]
	pub colors: Option<usize>,

	// 4. Output Parameters.
	/// Pixels per tile in the PNG preview, 1-100 [default: 10].
	#[arg(short, long, value_name = "N")]
	pub scale: Option<u32>,

	/// Skip the PNG preview.
	#[arg(long)]
	pub no_preview: bool,

	/// Process every image found instead of only the first.
	#[arg(short, long)]
	pub all: bool,
}

impl Args
{
	/// Merge the optional config file and command line values; flags win.
	pub fn resolve_settings(&self) -> Result<Settings>
	{
		let mut settings: Settings = match &self.config
		{
			Some(path) => Settings::load(path).with_context(|| format!("Failed to load config '{}'", path.display()))?,
			None => Settings::default(),
		};

		if let Some(tile_size) = self.tile_size
		{
			settings.tile_size_cm = tile_size;
		}
		if let Some(colors) = self.colors
		{
			settings.palette_size = colors;
		}
		if let Some(scale) = self.scale
		{
			settings.preview_scale = scale;
		}
		if let Some(input) = &self.input
		{
			settings.input_dir = input.clone();
		}
		if let Some(output) = &self.output
		{
			settings.output_dir = output.clone();
		}
		if self.no_preview
		{
			settings.preview = false;
		}

		Ok(settings)
	}

	/// True when width or height still has to be asked for.
	pub fn needs_prompt(&self) -> bool
	{
		self.width.is_none() || self.height.is_none()
	}

	/// Ask for missing dimensions on `input`, writing prompts to `output`.
	///
	/// The tile size is asked for too unless it was given with `--tile-size`;
	/// an empty answer keeps the current setting. Returns `Ok(false)` when the
	/// input ends before every answer was read.
	pub fn prompt_missing<R: BufRead, W: Write>(&mut self, settings: &mut Settings, input: &mut R, output: &mut W) -> Result<bool>
	{
		if !self.needs_prompt()
		{
			return Ok(true);
		}

		if self.width.is_none()
		{
			let Some(answer) = prompt_line(input, output, "Enter output width in centimeters: ")? else { return Ok(false) };
			self.width = Some(parse_dimension(&answer)?);
		}

		if self.height.is_none()
		{
			let Some(answer) = prompt_line(input, output, "Enter output height in centimeters: ")? else { return Ok(false) };
			self.height = Some(parse_dimension(&answer)?);
		}

		if self.tile_size.is_none()
		{
			let question: String = format!("Enter tile size in centimeters (default: {}cm): ", settings.tile_size_cm);
			let Some(answer) = prompt_line(input, output, &question)? else { return Ok(false) };
			settings.tile_size_cm = parse_tile_size(&answer, settings.tile_size_cm)?;
		}

		Ok(true)
	}

	/// Validate parameter values and relationships.
	/// Returns Ok(()) if all parameters are valid, otherwise returns an error.
	/// Dimensions not given yet are checked once they are known.
	pub fn validate(&self, settings: &Settings) -> Result<()>
	{
		// Validate dimensions.
		for value in [self.width, self.height].into_iter().flatten()
		{
			if !value.is_finite() || value <= 0.0
			{
				return Err(anyhow!("Dimensions must be positive numbers"));
			}
		}

		// Validate tile size.
		if !settings.tile_size_cm.is_finite() || settings.tile_size_cm <= 0.0
		{
			return Err(anyhow!("Tile size must be a positive number"));
		}
		for value in [self.width, self.height].into_iter().flatten()
		{
			if settings.tile_size_cm > value
			{
				return Err(anyhow!("Tile size ({}cm) must not exceed the requested dimensions", settings.tile_size_cm));
			}
		}

		// Validate palette size.
		if settings.palette_size == 0
		{
			return Err(anyhow!("Palette size must be at least 1"));
		}

		// Validate preview scale.
		if settings.preview_scale == 0 || settings.preview_scale > 100
		{
			return Err(anyhow!("Preview scale must be between 1 and 100"));
		}

		// All validations passed.
		Ok(())
	}

	/// Pipeline options for the requested mosaic.
	pub fn matrix_options(&self, settings: &Settings) -> Result<MatrixOptions>
	{
		let (Some(width_cm), Some(height_cm)) = (self.width, self.height)
		else
		{
			return Err(anyhow!("Width and height are required"));
		};

		Ok(MatrixOptions
		{
			width_cm,
			height_cm,
			tile_size_cm: settings.tile_size_cm,
			palette_size: settings.palette_size,
		})
	}
}

/// Parse a typed dimension in centimeters.
pub fn parse_dimension(answer: &str) -> Result<f64>
{
	let value: f64 = answer.trim().parse::<f64>().map_err(|_| anyhow!("Please enter valid numbers"))?;
	if !value.is_finite() || value <= 0.0
	{
		return Err(anyhow!("Dimensions must be positive numbers"));
	}
	Ok(value)
}

/// Parse a typed tile size; an empty answer keeps `default`.
pub fn parse_tile_size(answer: &str, default: f64) -> Result<f64>
{
	let answer: &str = answer.trim();
	if answer.is_empty()
	{
		return Ok(default);
	}

	let value: f64 = answer.parse::<f64>().map_err(|_| anyhow!("Please enter valid numbers"))?;
	if !value.is_finite() || value <= 0.0
	{
		return Err(anyhow!("Tile size must be a positive number"));
	}
	Ok(value)
}

/// Write `question` and read one answer line; `None` at end of input.
fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<Option<String>>
{
	write!(output, "{}", question)?;
	output.flush().ok();

	let mut response: String = String::new();
	if input.read_line(&mut response)? == 0
	{
		return Ok(None);
	}
	Ok(Some(response.trim().to_string()))
}

/// Enumeration representing the mode of operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode
{
	Directory(PathBuf),
	Files(Vec<PathBuf>),
}

/// Determines the mode of operation based on the provided arguments.
pub fn determine_mode(args: &Args, settings: &Settings, is_image_file: fn(&Path) -> bool) -> Result<Mode>
{
	// If specific files are provided, they take precedence.
	if !args.files.is_empty()
	{
		// Validate each file.
		for path in &args.files
		{
			if !path.is_file() || !is_image_file(path)
			{
				return Err(anyhow!("Input '{}' is not a supported image file.", path.display()));
			}
		}

		Ok(Mode::Files(args.files.clone()))
	}
	else // If no files are specified, scan the input directory.
	{
		Ok(Mode::Directory(settings.input_dir.clone()))
	}
}

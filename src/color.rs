use serde::Serialize;

use crate::error::{MatrixError, Result};

/// RGB color representation.
///
/// Ordering compares red, then green, then blue, matching the ascending
/// RGB tuple order used for inventory tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Color
{
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Color
{
	pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

	pub const fn new(r: u8, g: u8, b: u8) -> Self
	{
		Self { r, g, b }
	}

	/// Build a color from wider integers, clamping each channel to [0, 255].
	pub fn clamped(r: i32, g: i32, b: i32) -> Self
	{
		Self
		{
			r: r.clamp(0, 255) as u8,
			g: g.clamp(0, 255) as u8,
			b: b.clamp(0, 255) as u8,
		}
	}

	pub fn to_array(self) -> [u8; 3]
	{
		[self.r, self.g, self.b]
	}

	/// Channel value by index (0 = red, 1 = green, 2 = blue).
	pub fn channel(self, index: usize) -> u8
	{
		match index
		{
			0 => self.r,
			1 => self.g,
			_ => self.b,
		}
	}

	/// Normalized channels in [0, 1].
	fn normalized(self) -> (f64, f64, f64)
	{
		(self.r as f64 / 255.0, self.g as f64 / 255.0, self.b as f64 / 255.0)
	}
}

impl From<[u8; 3]> for Color
{
	fn from(rgb: [u8; 3]) -> Self
	{
		Self::new(rgb[0], rgb[1], rgb[2])
	}
}

/// Serialized as an `[r, g, b]` array.
impl Serialize for Color
{
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	{
		self.to_array().serialize(serializer)
	}
}

/// CMYK percentages (0-100), rounded to 1 decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cmyk
{
	pub c: f64,
	pub m: f64,
	pub y: f64,
	pub k: f64,
}

impl Cmyk
{
	pub const fn new(c: f64, m: f64, y: f64, k: f64) -> Self
	{
		Self { c, m, y, k }
	}
}

/// HSL with hue in degrees [0, 360) and saturation/lightness percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl
{
	pub h: f64,
	pub s: f64,
	pub l: f64,
}

/// RGB channels as percentages of full intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RgbPercent
{
	pub r: f64,
	pub g: f64,
	pub b: f64,
}

/// Every industry-standard representation of one color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRecord
{
	pub rgb: [u8; 3],
	pub hex: String,
	pub cmyk: Cmyk,
	pub hsl: Hsl,
	pub rgb_pct: RgbPercent,
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64
{
	(value * 10.0).round() / 10.0
}

/// Convert to a `#RRGGBB` uppercase hex code.
pub fn to_hex(color: Color) -> String
{
	format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parse a `#RRGGBB` or `RRGGBB` hex code (case-insensitive).
pub fn from_hex(hex: &str) -> Result<Color>
{
	let digits: &str = hex.strip_prefix('#').unwrap_or(hex);
	if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit())
	{
		return Err(MatrixError::InvalidArgument(format!("'{}' is not a #RRGGBB hex color", hex)));
	}

	let channel = |range: std::ops::Range<usize>| -> Result<u8>
	{
		u8::from_str_radix(&digits[range], 16)
			.map_err(|e| MatrixError::InvalidArgument(format!("'{}': {}", hex, e)))
	};

	Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Convert to CMYK percentages.
pub fn to_cmyk(color: Color) -> Cmyk
{
	let (r, g, b): (f64, f64, f64) = color.normalized();

	let k: f64 = 1.0 - r.max(g).max(b);
	if k >= 1.0
	{
		// Pure black.
		return Cmyk::new(0.0, 0.0, 0.0, 100.0);
	}

	let ink = |channel: f64| -> f64 { ((1.0 - channel - k) / (1.0 - k)).clamp(0.0, 1.0) };

	Cmyk
	{
		c: round1(ink(r) * 100.0),
		m: round1(ink(g) * 100.0),
		y: round1(ink(b) * 100.0),
		k: round1(k * 100.0),
	}
}

/// Convert to HSL.
pub fn to_hsl(color: Color) -> Hsl
{
	let (r, g, b): (f64, f64, f64) = color.normalized();

	let max: f64 = r.max(g).max(b);
	let min: f64 = r.min(g).min(b);
	let delta: f64 = max - min;

	let l: f64 = (max + min) / 2.0;

	// Achromatic colors have neither hue nor saturation.
	if delta == 0.0
	{
		return Hsl { h: 0.0, s: 0.0, l: round1(l * 100.0) };
	}

	let s: f64 = delta / (1.0 - (2.0 * l - 1.0).abs());

	let mut h: f64 = if max == r
	{
		60.0 * ((g - b) / delta).rem_euclid(6.0)
	}
	else if max == g
	{
		60.0 * ((b - r) / delta + 2.0)
	}
	else
	{
		60.0 * ((r - g) / delta + 4.0)
	};

	h = round1(h.rem_euclid(360.0));
	if h >= 360.0
	{
		h = 0.0;
	}

	Hsl { h, s: round1(s * 100.0), l: round1(l * 100.0) }
}

/// Build the full color record consumed by the writers and the mixer.
pub fn color_record(color: Color) -> ColorRecord
{
	let (r, g, b): (f64, f64, f64) = color.normalized();

	ColorRecord
	{
		rgb: color.to_array(),
		hex: to_hex(color),
		cmyk: to_cmyk(color),
		hsl: to_hsl(color),
		rgb_pct: RgbPercent
		{
			r: round1(r * 100.0),
			g: round1(g * 100.0),
			b: round1(b * 100.0),
		},
	}
}

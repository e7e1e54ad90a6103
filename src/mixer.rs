use serde::Serialize;
use std::fmt;

use crate::color::{self, round1, Cmyk, Color};

/// One of the five purchasable base paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BasePrimitive
{
	Cyan,
	Magenta,
	Yellow,
	Black,
	White,
}

impl BasePrimitive
{
	pub fn name(self) -> &'static str
	{
		match self
		{
			BasePrimitive::Cyan => "cyan",
			BasePrimitive::Magenta => "magenta",
			BasePrimitive::Yellow => "yellow",
			BasePrimitive::Black => "black",
			BasePrimitive::White => "white",
		}
	}

	/// Canonical CMYK value of the paint.
	pub fn cmyk(self) -> Cmyk
	{
		match self
		{
			BasePrimitive::Cyan => Cmyk::new(100.0, 0.0, 0.0, 0.0),
			BasePrimitive::Magenta => Cmyk::new(0.0, 100.0, 0.0, 0.0),
			BasePrimitive::Yellow => Cmyk::new(0.0, 0.0, 100.0, 0.0),
			BasePrimitive::Black => Cmyk::new(0.0, 0.0, 0.0, 100.0),
			BasePrimitive::White => Cmyk::new(0.0, 0.0, 0.0, 0.0),
		}
	}

	pub fn rgb(self) -> Color
	{
		cmyk_to_rgb(&self.cmyk())
	}
}

impl fmt::Display for BasePrimitive
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.write_str(self.name())
	}
}

/// Purchase order of the base paints.
pub static BASE_PRIMITIVES: [BasePrimitive; 5] =
[
	BasePrimitive::Cyan,
	BasePrimitive::Magenta,
	BasePrimitive::Yellow,
	BasePrimitive::Black,
	BasePrimitive::White,
];

/// A base paint to purchase, with its reference values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseColor
{
	pub name: BasePrimitive,
	pub rgb: [u8; 3],
	pub hex: String,
	pub cmyk: Cmyk,
}

/// One component of a mix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixComponent
{
	pub color: BasePrimitive,
	pub percentage: f64,
}

/// Mixing percentages of base paints approximating one color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixRecipe
{
	entries: Vec<MixComponent>,
	#[serde(skip)]
	fallback: bool,
}

impl MixRecipe
{
	fn white_fallback() -> Self
	{
		Self
		{
			entries: vec![MixComponent { color: BasePrimitive::White, percentage: 100.0 }],
			fallback: true,
		}
	}

	pub fn entries(&self) -> &[MixComponent]
	{
		&self.entries
	}

	/// True when no component applied and the recipe fell back to plain white.
	pub fn is_fallback(&self) -> bool
	{
		self.fallback
	}

	pub fn total(&self) -> f64
	{
		self.entries.iter().map(|e| e.percentage).sum()
	}

	/// Human-readable form, e.g. `"60.0% cyan, 40.0% white"`.
	pub fn instruction(&self) -> String
	{
		if self.fallback
		{
			return "Use white (100%)".to_string();
		}

		self.entries.iter()
			.map(|e| format!("{:.1}% {}", e.percentage, e.color))
			.collect::<Vec<String>>()
			.join(", ")
	}
}

/// Convert CMYK percentages back to RGB.
pub fn cmyk_to_rgb(cmyk: &Cmyk) -> Color
{
	let k: f64 = cmyk.k / 100.0;
	let channel = |ink: f64| -> i32 { (255.0 * (1.0 - (ink / 100.0 + k).min(1.0))) as i32 };

	Color::clamped(channel(cmyk.c), channel(cmyk.m), channel(cmyk.y))
}

/// The fixed set of base paints every mosaic is mixed from.
pub fn base_colors() -> Vec<BaseColor>
{
	BASE_PRIMITIVES.iter()
		.map(|&primitive|
		{
			let rgb: Color = primitive.rgb();
			BaseColor
			{
				name: primitive,
				rgb: rgb.to_array(),
				hex: color::to_hex(rgb),
				cmyk: primitive.cmyk(),
			}
		})
		.collect()
}

/// Approximate a CMYK color as percentages of the base paints.
///
/// Each non-zero ink becomes a component. Light colors (every ink below 10%)
/// are based on white; darker ones get white only for a remainder above 5%.
/// Percentages are then normalized to sum to 100, rounded to one decimal.
pub fn mix_recipe(cmyk: &Cmyk) -> MixRecipe
{
	let inks: [(BasePrimitive, f64); 4] =
	[
		(BasePrimitive::Cyan, cmyk.c),
		(BasePrimitive::Magenta, cmyk.m),
		(BasePrimitive::Yellow, cmyk.y),
		(BasePrimitive::Black, cmyk.k),
	];

	let mut entries: Vec<MixComponent> = inks.iter()
		.filter(|(_, pct)| *pct > 0.0)
		.map(|&(color, pct)| MixComponent { color, percentage: round1(pct) })
		.collect();

	let strongest: f64 = inks.iter().map(|(_, pct)| *pct).fold(0.0, f64::max);
	let total_ink: f64 = inks.iter().map(|(_, pct)| *pct).sum();

	if inks.iter().all(|(_, pct)| *pct < 10.0)
	{
		entries.push(MixComponent { color: BasePrimitive::White, percentage: round1(100.0 - strongest) });
	}
	else if total_ink < 100.0 && 100.0 - total_ink > 5.0
	{
		entries.push(MixComponent { color: BasePrimitive::White, percentage: round1(100.0 - total_ink) });
	}

	let total: f64 = entries.iter().map(|e| e.percentage).sum();
	if entries.is_empty() || total <= 0.0
	{
		return MixRecipe::white_fallback();
	}

	let scale: f64 = 100.0 / total;
	for entry in &mut entries
	{
		entry.percentage = round1(entry.percentage * scale);
	}

	MixRecipe { entries, fallback: false }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::color::to_cmyk;

	fn names(recipe: &MixRecipe) -> Vec<&'static str>
	{
		recipe.entries().iter().map(|e| e.color.name()).collect()
	}

	#[test]
	fn test_base_colors()
	{
		let bases: Vec<BaseColor> = base_colors();
		assert_eq!(bases.len(), 5);
		assert_eq!(bases[0].rgb, [0, 255, 255]);
		assert_eq!(bases[0].hex, "#00FFFF");
		assert_eq!(bases[1].rgb, [255, 0, 255]);
		assert_eq!(bases[2].rgb, [255, 255, 0]);
		assert_eq!(bases[3].rgb, [0, 0, 0]);
		assert_eq!(bases[4].rgb, [255, 255, 255]);
	}

	#[test]
	fn test_all_zero_is_white()
	{
		let recipe: MixRecipe = mix_recipe(&Cmyk::new(0.0, 0.0, 0.0, 0.0));
		assert_eq!(names(&recipe), vec!["white"]);
		assert_eq!(recipe.entries()[0].percentage, 100.0);
		assert_eq!(recipe.instruction(), "100.0% white");
	}

	#[test]
	fn test_red_mix()
	{
		let recipe: MixRecipe = mix_recipe(&to_cmyk(Color::new(255, 0, 0)));
		assert_eq!(names(&recipe), vec!["magenta", "yellow"]);
		assert_eq!(recipe.instruction(), "50.0% magenta, 50.0% yellow");
	}

	#[test]
	fn test_light_color_uses_white_base()
	{
		let recipe: MixRecipe = mix_recipe(&Cmyk::new(5.0, 0.0, 2.0, 3.0));
		assert_eq!(names(&recipe), vec!["cyan", "yellow", "black", "white"]);
		// Raw: 5 + 2 + 3 + 95 = 105, each entry scaled by 100 / 105 and rounded on its own.
		let percentages: Vec<f64> = recipe.entries().iter().map(|e| e.percentage).collect();
		assert_eq!(percentages, vec![4.8, 1.9, 2.9, 90.5]);
		assert_eq!(recipe.entries()[3].percentage, round1(95.0 * 100.0 / 105.0));
		assert!((recipe.total() - 100.0).abs() <= 0.1 + 1e-9);
	}

	#[test]
	fn test_small_remainder_skips_white()
	{
		// 97% ink leaves only 3% for white.
		let recipe: MixRecipe = mix_recipe(&Cmyk::new(50.0, 47.0, 0.0, 0.0));
		assert_eq!(names(&recipe), vec!["cyan", "magenta"]);
	}

	#[test]
	fn test_dark_color_gets_white_remainder()
	{
		let recipe: MixRecipe = mix_recipe(&Cmyk::new(40.0, 0.0, 0.0, 20.0));
		assert_eq!(names(&recipe), vec!["cyan", "black", "white"]);
		assert_eq!(recipe.entries()[2].percentage, 40.0);
	}

	#[test]
	fn test_recipes_sum_to_hundred()
	{
		for r in (0..=255u16).step_by(51)
		{
			for g in (0..=255u16).step_by(51)
			{
				for b in (0..=255u16).step_by(51)
				{
					let recipe: MixRecipe = mix_recipe(&to_cmyk(Color::new(r as u8, g as u8, b as u8)));
					assert!(!recipe.entries().is_empty());
					assert!((recipe.total() - 100.0).abs() <= 0.1 + 1e-9, "{:?} sums to {}", (r, g, b), recipe.total());
					assert!(recipe.entries().iter().all(|e| e.percentage >= 0.0));
				}
			}
		}
	}

	#[test]
	fn test_fallback_instruction()
	{
		assert_eq!(MixRecipe::white_fallback().instruction(), "Use white (100%)");
		assert!(MixRecipe::white_fallback().is_fallback());
	}
}

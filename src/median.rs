use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

use crate::color::Color;
use crate::error::{MatrixError, Result};
use crate::sampler::ColorGrid;

/// Luma weights (0.299, 0.587, 0.114) scaled to integers.
const LUMA_WEIGHTS: [u64; 3] = [299, 587, 114];

/// Ordered set of representative colors produced by median cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette
{
	colors: Vec<Color>,
}

impl Palette
{
	pub fn colors(&self) -> &[Color]
	{
		&self.colors
	}

	pub fn len(&self) -> usize
	{
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.colors.is_empty()
	}

	pub fn contains(&self, color: &Color) -> bool
	{
		self.colors.contains(color)
	}

	/// Find the closest palette color. The first entry wins on ties.
	pub fn nearest(&self, color: &Color) -> Color
	{
		let mut best_color: Color = self.colors.first().copied().unwrap_or(Color::BLACK);
		let mut best_distance: u64 = u64::MAX;

		for &palette_color in &self.colors
		{
			let distance: u64 = color_distance(color, &palette_color);
			if distance < best_distance
			{
				best_distance = distance;
				best_color = palette_color;

				if distance == 0
				{
					break;
				}
			}
		}

		best_color
	}
}

/// A box in RGB color space: a range of indices into the shared sample buffer.
#[derive(Debug, Clone)]
struct ColorBox
{
	range: Range<usize>,
	min: [u8; 3],
	max: [u8; 3],
}

impl ColorBox
{
	/// Create a new color box covering `samples[range]`.
	fn new(range: Range<usize>, samples: &[Color]) -> Self
	{
		let mut min: [u8; 3] = [255; 3];
		let mut max: [u8; 3] = [0; 3];

		for color in &samples[range.clone()]
		{
			for channel in 0..3
			{
				min[channel] = min[channel].min(color.channel(channel));
				max[channel] = max[channel].max(color.channel(channel));
			}
		}

		Self { range, min, max }
	}

	fn len(&self) -> usize
	{
		self.range.len()
	}

	/// Get the range (max - min) for each channel.
	fn get_ranges(&self) -> [u8; 3]
	{
		[
			self.max[0].saturating_sub(self.min[0]),
			self.max[1].saturating_sub(self.min[1]),
			self.max[2].saturating_sub(self.min[2]),
		]
	}

	/// The largest single-channel range.
	fn score(&self) -> u8
	{
		let ranges: [u8; 3] = self.get_ranges();
		ranges[0].max(ranges[1]).max(ranges[2])
	}

	/// Find the channel with the largest range (red, then green, then blue on ties).
	fn find_widest_channel(&self) -> usize
	{
		let [r_range, g_range, b_range]: [u8; 3] = self.get_ranges();

		if r_range >= g_range && r_range >= b_range
		{
			0 // Red.
		}
		else if g_range >= b_range
		{
			1 // Green.
		}
		else
		{
			2 // Blue.
		}
	}

	fn is_splittable(&self) -> bool
	{
		self.len() > 1 && self.score() > 0
	}

	/// Sort this box along its widest channel and split it at the median.
	/// Returns the upper half; `self` shrinks to the lower half.
	fn split(&mut self, samples: &mut [Color]) -> ColorBox
	{
		let channel: usize = self.find_widest_channel();

		// Stable, so equal keys keep their previous relative order.
		samples[self.range.clone()].sort_by_key(|c| c.channel(channel));

		let mid: usize = self.range.start + self.len() / 2;
		let upper: ColorBox = ColorBox::new(mid..self.range.end, samples);
		*self = ColorBox::new(self.range.start..mid, samples);

		upper
	}

	/// Mean color of the box, rounded to the nearest integer.
	fn get_average_color(&self, samples: &[Color]) -> Color
	{
		let points: &[Color] = &samples[self.range.clone()];
		if points.is_empty()
		{
			return Color::BLACK;
		}

		let mut sums: [u64; 3] = [0; 3];
		for color in points
		{
			for channel in 0..3
			{
				sums[channel] += color.channel(channel) as u64;
			}
		}

		let count: u64 = points.len() as u64;
		let mean = |sum: u64| -> i32 { ((2 * sum + count) / (2 * count)) as i32 };

		Color::clamped(mean(sums[0]), mean(sums[1]), mean(sums[2]))
	}
}

/// Build a palette of at most `max_colors` entries with median cut.
///
/// Boxes are scored by their largest channel range before anything is split,
/// so the box chosen each round does not depend on split order. When fewer
/// boxes than `max_colors` can be formed the palette is padded with black.
pub fn build_palette(samples: &[Color], max_colors: usize) -> Result<Palette>
{
	if max_colors == 0
	{
		return Err(MatrixError::InvalidArgument("palette size must be at least 1".to_string()));
	}

	// Degenerate input: nothing to cut.
	if samples.is_empty()
	{
		return Ok(Palette { colors: vec![Color::BLACK] });
	}

	let mut samples: Vec<Color> = samples.to_vec();
	let mut boxes: Vec<ColorBox> = vec![ColorBox::new(0..samples.len(), &samples)];

	while boxes.len() < max_colors
	{
		// Find the box with the largest range; the first one wins ties.
		let mut largest_idx: usize = 0;
		let mut largest_score: u8 = boxes[0].score();

		for (i, box_) in boxes.iter().enumerate().skip(1)
		{
			let score: u8 = box_.score();
			if score > largest_score
			{
				largest_score = score;
				largest_idx = i;
			}
		}

		if !boxes[largest_idx].is_splittable()
		{
			break;
		}

		let upper: ColorBox = boxes[largest_idx].split(&mut samples);
		boxes.push(upper);
	}

	let mut colors: Vec<Color> = boxes.iter().map(|b| b.get_average_color(&samples)).collect();
	let real_colors: usize = colors.len();
	colors.resize(max_colors, Color::BLACK);

	debug!(samples = samples.len(), boxes = real_colors, palette = colors.len(), "built median cut palette");

	Ok(Palette { colors })
}

/// Quantize a grid to at most `max_colors` colors.
///
/// Returns the palette and the grid with every cell replaced by its nearest
/// palette color. An empty grid yields a single black palette entry.
pub fn quantize(grid: ColorGrid, max_colors: usize) -> Result<(Palette, ColorGrid)>
{
	let palette: Palette = build_palette(grid.cells(), max_colors)?;
	if grid.is_empty()
	{
		return Ok((palette, grid));
	}

	let (rows, cols, cells): (usize, usize, Vec<Color>) = grid.into_parts();

	// Remap rows in parallel with a per-row cache; output order is preserved.
	let mapped_rows: Vec<Vec<Color>> = cells.par_chunks(cols).map(|row|
	{
		let mut color_cache: HashMap<Color, Color> = HashMap::new();
		row.iter()
			.map(|color| *color_cache.entry(*color).or_insert_with(|| palette.nearest(color)))
			.collect()
	}).collect();

	let remapped: ColorGrid = ColorGrid::new(rows, cols, mapped_rows.concat())?;
	Ok((palette, remapped))
}

/// Luma-weighted squared distance, scaled by 1000.
fn color_distance(c1: &Color, c2: &Color) -> u64
{
	(0..3)
		.map(|channel|
		{
			let d: u64 = c1.channel(channel).abs_diff(c2.channel(channel)) as u64;
			LUMA_WEIGHTS[channel] * d * d
		})
		.sum()
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn grid_of(cells: Vec<Color>, rows: usize, cols: usize) -> ColorGrid
	{
		ColorGrid::new(rows, cols, cells).unwrap()
	}

	/// Small deterministic pseudo-random generator for test grids.
	fn noise_grid(rows: usize, cols: usize, seed: u32) -> ColorGrid
	{
		let mut state: u32 = seed;
		let mut next = || -> u8
		{
			state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
			(state >> 24) as u8
		};
		let cells: Vec<Color> = (0..rows * cols).map(|_| Color::new(next(), next(), next())).collect();
		grid_of(cells, rows, cols)
	}

	#[test]
	fn test_uniform_grid_collapses_to_one_color()
	{
		let color: Color = Color::new(255, 128, 64);
		let (palette, grid) = quantize(grid_of(vec![color; 100], 10, 10), 8).unwrap();

		assert_eq!(palette.len(), 8);
		assert_eq!(palette.colors()[0], color);
		assert!(palette.colors()[1..].iter().all(|&c| c == Color::BLACK));
		assert!(grid.cells().iter().all(|&c| c == color));
	}

	#[test]
	fn test_palette_bound_and_membership()
	{
		for (k, seed) in [(1, 7), (2, 11), (5, 13), (16, 17), (64, 19)]
		{
			let (palette, grid) = quantize(noise_grid(12, 9, seed), k).unwrap();
			assert!(palette.len() <= k);
			assert_eq!((grid.rows(), grid.cols()), (12, 9));
			assert!(grid.cells().iter().all(|c| palette.contains(c)), "k = {}", k);
		}
	}

	#[test]
	fn test_two_colors_split_cleanly()
	{
		let red: Color = Color::new(250, 0, 0);
		let blue: Color = Color::new(0, 0, 250);
		let cells: Vec<Color> = vec![red, blue, red, blue, red, blue];
		let (palette, grid) = quantize(grid_of(cells.clone(), 2, 3), 2).unwrap();

		assert!(palette.contains(&red));
		assert!(palette.contains(&blue));
		assert_eq!(grid.cells(), cells.as_slice());
	}

	#[test]
	fn test_splits_widest_box_at_median()
	{
		// Red ramp 0..=180 and a flat blue cluster: blue splits off first,
		// then the ramp is halved at its median.
		let mut samples: Vec<Color> = (0..10).map(|i| Color::new(i * 20, 0, 0)).collect();
		samples.extend(vec![Color::new(0, 0, 250); 10]);

		let palette: Palette = build_palette(&samples, 3).unwrap();
		assert_eq!(palette.colors(), &[Color::new(40, 0, 0), Color::new(0, 0, 250), Color::new(140, 0, 0)]);
	}

	#[test]
	fn test_picks_highest_scoring_box_not_first()
	{
		// After the blue split, the narrow red box is first in line but the
		// green ramp inside the blue box has the larger range.
		let mut samples: Vec<Color> = (0..10).map(|i| Color::new(i * 2, 0, 0)).collect();
		samples.extend((0..10).map(|i| Color::new(0, i * 20, 250)));

		let palette: Palette = build_palette(&samples, 3).unwrap();
		assert_eq!(palette.colors(), &[Color::new(9, 0, 0), Color::new(0, 40, 250), Color::new(0, 140, 250)]);
	}

	#[test]
	fn test_split_uses_widest_channel()
	{
		// Green spans 200, red only 30; sorting on red would reverse the halves.
		let samples: [Color; 4] = [Color::new(0, 200, 0), Color::new(30, 0, 0), Color::new(10, 100, 0), Color::new(20, 50, 0)];

		let palette: Palette = build_palette(&samples, 2).unwrap();
		assert_eq!(palette.colors(), &[Color::new(25, 25, 0), Color::new(5, 150, 0)]);
	}

	#[test]
	fn test_mean_is_rounded()
	{
		// Mean of 10 and 11 is 10.5, rounded up.
		let palette: Palette = build_palette(&[Color::new(10, 10, 10), Color::new(11, 11, 11)], 1).unwrap();
		assert_eq!(palette.colors(), &[Color::new(11, 11, 11)]);
	}

	#[test]
	fn test_deterministic_output()
	{
		let first = quantize(noise_grid(20, 20, 42), 12).unwrap();
		let second = quantize(noise_grid(20, 20, 42), 12).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn test_empty_grid_returns_black()
	{
		let (palette, grid) = quantize(ColorGrid::default(), 4).unwrap();
		assert_eq!(palette.colors(), &[Color::BLACK]);
		assert!(grid.is_empty());
	}

	#[test]
	fn test_zero_palette_size_is_rejected()
	{
		let result = quantize(grid_of(vec![Color::BLACK], 1, 1), 0);
		assert!(matches!(result, Err(MatrixError::InvalidArgument(_))));
	}

	#[test]
	fn test_nearest_uses_luma_weights()
	{
		// Same Euclidean distance, but green differences weigh more than blue ones.
		let palette: Palette = Palette { colors: vec![Color::new(100, 110, 100), Color::new(100, 100, 110)] };
		assert_eq!(palette.nearest(&Color::new(100, 100, 100)), Color::new(100, 100, 110));
	}

	#[test]
	fn test_nearest_prefers_first_on_ties()
	{
		let palette: Palette = Palette { colors: vec![Color::new(0, 0, 10), Color::new(0, 0, 30)] };
		assert_eq!(palette.nearest(&Color::new(0, 0, 20)), Color::new(0, 0, 10));
	}
}

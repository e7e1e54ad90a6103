use serde::Serialize;
use std::collections::HashMap;

use crate::color::Color;
use crate::sampler::ColorGrid;

/// How many tiles of one color the mosaic needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryEntry
{
	pub color: Color,
	pub count: usize,
}

/// Count tiles per color, most used first; equal counts sort by ascending RGB.
pub fn inventory(grid: &ColorGrid) -> Vec<InventoryEntry>
{
	let mut color_counts: HashMap<Color, usize> = HashMap::new();
	for &color in grid.cells()
	{
		*color_counts.entry(color).or_insert(0) += 1;
	}

	let mut entries: Vec<InventoryEntry> = color_counts.into_iter()
		.map(|(color, count)| InventoryEntry { color, count })
		.collect();

	entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.color.cmp(&b.color)));
	entries
}

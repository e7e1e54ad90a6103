use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tilematrix::color::Color;
use tilematrix::median;
use tilematrix::sampler::ColorGrid;

/// Deterministic gradient grid with some channel noise.
fn gradient_grid(rows: usize, cols: usize) -> ColorGrid
{
	let mut state: u32 = 7;
	let cells: Vec<Color> = (0..rows * cols).map(|i|
	{
		state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		let x: usize = i % cols;
		let y: usize = i / cols;
		Color::new((x * 255 / cols) as u8, (y * 255 / rows) as u8, (state >> 24) as u8)
	}).collect();

	ColorGrid::new(rows, cols, cells).unwrap()
}

fn criterion_benchmark(c: &mut Criterion)
{
	let grid: ColorGrid = gradient_grid(100, 150);

	c.bench_function("build_palette 100x150 k=32", |b|
	{
		b.iter(|| median::build_palette(black_box(grid.cells()), 32))
	});

	c.bench_function("quantize 100x150 k=32", |b|
	{
		b.iter(|| median::quantize(black_box(grid.clone()), 32))
	});
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

//! Convert images into ceramic tile color matrices with paint mixing instructions.
//!
//! An image is resampled onto a grid of square tiles sized to the requested
//! mosaic, reduced to a small palette with median cut, and described per tile
//! with hex, CMYK and HSL values plus a recipe of five base paints.

pub mod color;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod inventory;
pub mod matrix;
pub mod median;
pub mod mixer;
pub mod naming;
pub mod output;
pub mod sampler;
pub mod utils
{
	pub mod arg_utils;
	pub mod file_utils;
	pub mod time_utils;
}

pub use color::{Cmyk, Color, ColorRecord, Hsl, RgbPercent};
pub use dimensions::{resolve_dimensions, Dimensions};
pub use error::{MatrixError, Result};
pub use inventory::{inventory, InventoryEntry};
pub use matrix::{generate_matrix, MatrixInfo, MatrixOptions, MatrixResult};
pub use median::{build_palette, quantize, Palette};
pub use mixer::{mix_recipe, BaseColor, BasePrimitive, MixRecipe};
pub use sampler::{sample_grid, ColorGrid};

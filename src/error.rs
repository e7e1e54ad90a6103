use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the tile matrix pipeline.
#[derive(Debug, Error)]
pub enum MatrixError
{
	/// Non-positive requested size, or a tile size producing zero rows/columns.
	#[error("Invalid dimension: {0}")]
	InvalidDimension(String),

	/// Out of range parameter, such as a palette size of zero.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The source image could not be read or decoded.
	#[error("Failed to decode image {}: {source}", .path.display())]
	Decode
	{
		path: PathBuf,
		#[source]
		source: image::ImageError,
	},

	#[error("Failed to encode preview: {0}")]
	Encode(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatrixError>;

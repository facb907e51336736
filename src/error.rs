//! Error types for colour cube generation and export.

use thiserror::Error;

use crate::volume::{Dimensions, Position};

#[derive(Error, Debug)]
pub enum CubeError {
    /// Axes must be positive, x and y must fit an image row and column,
    /// and the whole volume must be addressable.
    #[error("invalid dimensions {x}x{y}x{z}")]
    InvalidDimensions { x: i64, y: i64, z: i64 },

    #[error("position {pos:?} is outside a {dims} volume")]
    IndexOutOfBounds { pos: Position, dims: Dimensions },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CubeError>;

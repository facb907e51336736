// Grow a volume of colour by stochastic diffusion from a few seed voxels,
// then write it out as a stack of image slices.

pub mod error;
pub mod growth;
pub mod slices;
pub mod volume;

pub use error::{CubeError, Result};
pub use growth::{GrowthEngine, GrowthParams, GrowthStats, Progress, Randomness, RngSource, StepOutcome};
pub use volume::{Dimensions, Position, VolumeGrid, VoxelColour};

// Dense 3D lattice of optional colours with bounds checks and
// 26-connected neighbourhoods.
//
// Storage is column major so x varies fastest, the flat index of a
// voxel being x + y * X + z * X * Y.

use std::fmt;
use std::mem;

use ndarray::{Array3, ArrayView2, Axis, ShapeBuilder};

use crate::error::{CubeError, Result};

/// Axis lengths of a volume, fixed for the lifetime of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Integer voxel coordinate. Signed so that neighbour offsets can step
/// outside the volume before being filtered by `in_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// Three colour channels. Nominally 0..=255 but the growth process does
/// not clamp the upper end, so channels are stored wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VoxelColour {
    pub channels: [u32; 3],
}

pub struct VolumeGrid {
    dims: Dimensions,
    cells: Array3<Option<VoxelColour>>,
}

impl Dimensions {
    /// Rejects zero or negative axes, x or y too wide for an image, and
    /// volumes whose storage size overflows, all before anything is
    /// allocated.
    pub fn new(x: i64, y: i64, z: i64) -> Result<Dimensions> {
        let invalid = CubeError::InvalidDimensions { x, y, z };
        if x <= 0 || y <= 0 || z <= 0 || x > i64::from(u32::MAX) || y > i64::from(u32::MAX) {
            return Err(invalid);
        }
        let (ux, uy, uz) = match (usize::try_from(x), usize::try_from(y), usize::try_from(z)) {
            (Ok(ux), Ok(uy), Ok(uz)) => (ux, uy, uz),
            _ => return Err(invalid),
        };
        let bytes = ux
            .checked_mul(uy)
            .and_then(|n| n.checked_mul(uz))
            .and_then(|n| n.checked_mul(mem::size_of::<Option<VoxelColour>>()));
        match bytes {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(Dimensions {
                x: ux,
                y: uy,
                z: uz,
            }),
            _ => Err(invalid),
        }
    }

    pub fn cell_count(self: &Self) -> usize {
        self.x * self.y * self.z
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

impl Position {
    pub const fn new(x: i64, y: i64, z: i64) -> Position {
        Position { x, y, z }
    }

    fn offset(self: &Self, dx: i64, dy: i64, dz: i64) -> Position {
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl VoxelColour {
    pub const fn new(r: u32, g: u32, b: u32) -> VoxelColour {
        VoxelColour { channels: [r, g, b] }
    }

    /// Per channel arithmetic mean of `colours` plus that channel's jitter,
    /// floored at zero and truncated. No upper clamp is applied.
    pub fn mean_with_jitter(colours: &[VoxelColour], jitter: [i32; 3]) -> VoxelColour {
        debug_assert!(!colours.is_empty(), "averaging set always holds the source cell");
        let count = colours.len() as f64;
        let mut channels = [0u32; 3];
        for (channel, out) in channels.iter_mut().enumerate() {
            let sum: f64 = colours.iter().map(|c| f64::from(c.channels[channel])).sum();
            let value = sum / count + f64::from(jitter[channel]);
            *out = value.max(0.0) as u32;
        }
        VoxelColour { channels }
    }

    /// Displayable form, saturating channels that drifted past 255.
    pub fn saturated(self: &Self) -> (u8, u8, u8) {
        let [r, g, b] = self.channels.map(|c| c.min(u32::from(u8::MAX)) as u8);
        (r, g, b)
    }
}

impl VolumeGrid {
    /// A fully empty grid.
    pub fn new(dims: Dimensions) -> VolumeGrid {
        VolumeGrid {
            dims,
            cells: Array3::from_elem((dims.x, dims.y, dims.z).f(), None),
        }
    }

    pub fn dims(self: &Self) -> Dimensions {
        self.dims
    }

    pub fn in_range(self: &Self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u64) < self.dims.x as u64
            && (pos.y as u64) < self.dims.y as u64
            && (pos.z as u64) < self.dims.z as u64
    }

    fn index(self: &Self, pos: Position) -> Result<(usize, usize, usize)> {
        if self.in_range(pos) {
            Ok((pos.x as usize, pos.y as usize, pos.z as usize))
        } else {
            Err(CubeError::IndexOutOfBounds {
                pos,
                dims: self.dims,
            })
        }
    }

    pub fn try_get(self: &Self, pos: Position) -> Result<Option<VoxelColour>> {
        let ix = self.index(pos)?;
        Ok(self.cells[ix])
    }

    pub fn try_set(self: &mut Self, pos: Position, colour: VoxelColour) -> Result<()> {
        let ix = self.index(pos)?;
        self.cells[ix] = Some(colour);
        Ok(())
    }

    /// Stored colour at `pos`.
    ///
    /// Panics if `pos` is out of range; callers go through `neighbours` or
    /// `in_range` first.
    pub fn get(self: &Self, pos: Position) -> Option<VoxelColour> {
        match self.try_get(pos) {
            Ok(colour) => colour,
            Err(err) => panic!("{}", err),
        }
    }

    /// Overwrites whatever is at `pos`. Panics if `pos` is out of range.
    pub fn set(self: &mut Self, pos: Position, colour: VoxelColour) {
        if let Err(err) = self.try_set(pos, colour) {
            panic!("{}", err);
        }
    }

    /// In range positions differing from `pos` by -1, 0 or 1 on every axis,
    /// `pos` itself excluded. Ordered x offset outermost, then y, then z.
    pub fn neighbours(self: &Self, pos: Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(26);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let n = pos.offset(dx, dy, dz);
                    if self.in_range(n) {
                        out.push(n);
                    }
                }
            }
        }
        out
    }

    pub fn coloured_count(self: &Self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn empty_count(self: &Self) -> usize {
        self.dims.cell_count() - self.coloured_count()
    }

    /// Displayable colour at `(x, y, z)`, or `None` for an empty voxel.
    pub fn rgb(self: &Self, x: usize, y: usize, z: usize) -> Option<(u8, u8, u8)> {
        self.cells
            .get((x, y, z))
            .copied()
            .flatten()
            .map(|c| c.saturated())
    }

    /// The `z`th xy plane, indexed `[x, y]`. Panics if `z` is out of range.
    pub fn z_slice(self: &Self, z: usize) -> ArrayView2<'_, Option<VoxelColour>> {
        self.cells.index_axis(Axis(2), z)
    }
}

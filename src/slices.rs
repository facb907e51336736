// Export a finished volume as one image per z plane.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use log::debug;

use crate::error::Result;
use crate::volume::VolumeGrid;

/// Colour written for voxels the fill never reached.
pub const EMPTY_PIXEL: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceFormat {
    Png,
    Jpeg,
}

impl SliceFormat {
    pub fn extension(self: &Self) -> &'static str {
        match self {
            SliceFormat::Png => "png",
            SliceFormat::Jpeg => "jpg",
        }
    }

    fn image_format(self: &Self) -> ImageFormat {
        match self {
            SliceFormat::Png => ImageFormat::Png,
            SliceFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SliceOptions {
    pub out_dir: PathBuf,
    pub prefix: String,
    pub format: SliceFormat,
}

impl Default for SliceOptions {
    fn default() -> Self {
        SliceOptions {
            out_dir: PathBuf::from("."),
            prefix: String::from("slice"),
            format: SliceFormat::Jpeg,
        }
    }
}

impl SliceOptions {
    /// `{prefix}{z:05}.{ext}` inside the output directory.
    pub fn path_for(self: &Self, z: usize) -> PathBuf {
        self.out_dir
            .join(format!("{}{:05}.{}", self.prefix, z, self.format.extension()))
    }
}

/// X by Y image of plane `z`, pixel (x, y) taking voxel (x, y, z).
pub fn slice_image(grid: &VolumeGrid, z: usize) -> RgbImage {
    let dims = grid.dims();
    let mut img = RgbImage::new(dims.x as u32, dims.y as u32);
    for ((x, y), cell) in grid.z_slice(z).indexed_iter() {
        let pixel = match cell {
            Some(colour) => {
                let (r, g, b) = colour.saturated();
                Rgb([r, g, b])
            }
            None => EMPTY_PIXEL,
        };
        img.put_pixel(x as u32, y as u32, pixel);
    }
    img
}

/// Writes every z plane, returning the paths in z order.
pub fn export(grid: &VolumeGrid, options: &SliceOptions) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&options.out_dir)?;
    let mut paths = Vec::with_capacity(grid.dims().z);
    for z in 0..grid.dims().z {
        let path = options.path_for(z);
        save_slice(&slice_image(grid, z), &path, options.format)?;
        paths.push(path);
    }
    debug!("wrote {} slices to {}", paths.len(), options.out_dir.display());
    Ok(paths)
}

fn save_slice(img: &RgbImage, path: &Path, format: SliceFormat) -> Result<()> {
    img.save_with_format(path, format.image_format())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{Dimensions, Position, VoxelColour};

    fn sample_grid() -> VolumeGrid {
        let mut grid = VolumeGrid::new(Dimensions::new(3, 2, 2).unwrap());
        grid.set(Position::new(2, 1, 0), VoxelColour::new(10, 20, 30));
        grid.set(Position::new(0, 0, 1), VoxelColour::new(400, 0, 5));
        grid
    }

    #[test]
    fn slice_maps_voxels_to_pixels() {
        let grid = sample_grid();
        let img = slice_image(&grid, 0);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(*img.get_pixel(2, 1), Rgb([10, 20, 30]));
        assert_eq!(*img.get_pixel(0, 0), EMPTY_PIXEL);

        let img = slice_image(&grid, 1);
        assert_eq!(*img.get_pixel(0, 0), Rgb([255, 0, 5]));
        assert_eq!(*img.get_pixel(2, 1), EMPTY_PIXEL);
    }

    #[test]
    fn slice_names_are_zero_padded() {
        let options = SliceOptions {
            out_dir: PathBuf::from("out"),
            prefix: String::from("cube"),
            format: SliceFormat::Png,
        };
        assert_eq!(options.path_for(7), Path::new("out").join("cube00007.png"));
        assert_eq!(SliceOptions::default().path_for(123), Path::new(".").join("slice00123.jpg"));
    }

    #[test]
    fn export_writes_one_file_per_plane() {
        let dir = tempfile::tempdir().unwrap();
        let options = SliceOptions {
            out_dir: dir.path().join("frames"),
            prefix: String::from("test"),
            format: SliceFormat::Png,
        };
        let paths = export(&sample_grid(), &options).unwrap();
        assert_eq!(paths, vec![options.path_for(0), options.path_for(1)]);

        let back = image::open(&paths[0]).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(*back.get_pixel(2, 1), Rgb([10, 20, 30]));
        assert_eq!(*back.get_pixel(1, 1), EMPTY_PIXEL);
    }

    #[test]
    fn export_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let options = SliceOptions {
            out_dir: dir.path().to_path_buf(),
            ..SliceOptions::default()
        };
        let paths = export(&sample_grid(), &options).unwrap();
        assert_eq!(paths.len(), 2);
        for path in paths {
            assert!(path.exists());
            assert_eq!(path.extension().unwrap(), "jpg");
        }
    }
}

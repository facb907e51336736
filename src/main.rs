use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use colour_cube::growth::{DEFAULT_PROGRESS_INTERVAL, DEFAULT_SEED_COUNT};
use colour_cube::slices::{self, SliceFormat, SliceOptions};
use colour_cube::{Dimensions, GrowthEngine, GrowthParams, RngSource, VolumeGrid};

/// Grow a cube of smoothly varying colour and write it out as image slices
#[derive(Parser)]
#[command(name = "colour_cube", long_about = None)]
struct Cli {
    /// Volume size along x, y and z
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"],
          default_values_t = vec![150, 150, 150], allow_negative_numbers = true)]
    size: Vec<i64>,

    /// Number of random seed voxels
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    seeds: usize,

    /// Random seed; a fresh one is drawn when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the slices are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// File name prefix, followed by the zero padded z index
    #[arg(long, default_value = "slice")]
    prefix: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Jpeg)]
    format: FormatArg,

    /// Retired voxels between progress updates, 0 for none
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: usize,

    /// Log progress lines instead of drawing a progress bar
    #[arg(long)]
    no_bar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for SliceFormat {
    fn from(arg: FormatArg) -> SliceFormat {
        match arg {
            FormatArg::Png => SliceFormat::Png,
            FormatArg::Jpeg => SliceFormat::Jpeg,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let dims = Dimensions::new(cli.size[0], cli.size[1], cli.size[2])?;
    let params = GrowthParams {
        seed_count: cli.seeds,
        progress_interval: cli.progress_interval,
    };
    let rng = match cli.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };

    info!("growing a {} volume from {} seeds", dims, params.seed_count);
    let mut engine = GrowthEngine::new(VolumeGrid::new(dims), params, rng);
    if cli.no_bar {
        engine.run();
    } else {
        let total = dims.cell_count() as u64;
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} voxels retired ({elapsed})")?,
        );
        engine.run_with_progress(|p| bar.set_position((p.completed as u64).min(total)));
        bar.finish_and_clear();
    }
    let grid = engine.into_grid();

    let options = SliceOptions {
        out_dir: cli.out_dir,
        prefix: cli.prefix,
        format: cli.format.into(),
    };
    let paths = slices::export(&grid, &options)
        .with_context(|| format!("writing slices to {}", options.out_dir.display()))?;
    info!("wrote {} slices to {}", paths.len(), options.out_dir.display());
    Ok(())
}

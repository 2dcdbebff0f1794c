//! Batch foveation driver.
//!
//! Foveates every decodable image in a directory, optionally after an
//! ImageNet-style resize and centre crop.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use foveate_kit::{
    CropPlan, DEFAULT_BLUR_STRENGTH, DEFAULT_FOVEA_SIZE, DEFAULT_LEVELS, DEFAULT_SHARPNESS,
    DEFAULT_SIGMA, FixationPoint, FoveationConfig, Foveator, IMAGENET_CROP, IMAGENET_CROP_RATIO,
    fixation_grid, mark_fixations, proportional_fixation, resize_and_center_crop,
};
use image::{ImageFormat, Rgb, RgbImage};
use log::{error, info, warn};
use rayon::prelude::*;

/// Points per axis of the `--grid` sweep.
const GRID_STEPS: usize = 5;

/// Radius of the `--mark` dot.
const MARK_RADIUS: i32 = 5;

const MARK_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

#[derive(Parser, Debug)]
#[command(name = "foveate")]
#[command(about = "Render images as seen from one or more fixation points")]
struct Cli {
    /// Directory of input images
    input: PathBuf,

    /// Directory for rendered images, created if missing
    #[arg(long, default_value = "foveated")]
    output: PathBuf,

    /// Side length of the centre crop
    #[arg(long, default_value_t = IMAGENET_CROP)]
    crop: u32,

    /// Fraction of the resized side kept by the crop
    #[arg(long, default_value_t = IMAGENET_CROP_RATIO)]
    crop_ratio: f32,

    /// Keep the input size instead of resizing and cropping
    #[arg(long)]
    no_crop: bool,

    /// Fixation as image fractions `fx,fy`; repeat for several fixations
    #[arg(long = "fixation")]
    fixations: Vec<Fraction>,

    /// Render one output per point of a 5x5 fixation grid
    #[arg(long, conflicts_with = "fixations")]
    grid: bool,

    /// Gaussian kernel sigma, also the acuity scale
    #[arg(long, default_value_t = DEFAULT_SIGMA)]
    sigma: f32,

    /// Number of pyramid levels
    #[arg(long, default_value_t = DEFAULT_LEVELS)]
    levels: usize,

    /// Steepness of transitions between levels
    #[arg(long, default_value_t = DEFAULT_SHARPNESS)]
    sharpness: f32,

    /// Fovea radius in pixels
    #[arg(long, default_value_t = DEFAULT_FOVEA_SIZE)]
    fovea_size: f32,

    /// Divisor applied to pixel distances
    #[arg(long, default_value_t = DEFAULT_BLUR_STRENGTH)]
    blur_strength: f32,

    /// Reject fixations that fall outside the image
    #[arg(long)]
    strict: bool,

    /// Draw a red dot on each fixation of the rendered image
    #[arg(long)]
    mark: bool,
}

impl Cli {
    fn config(&self) -> FoveationConfig {
        FoveationConfig::default()
            .with_sigma(self.sigma)
            .with_levels(self.levels)
            .with_sharpness(self.sharpness)
            .with_fovea_size(self.fovea_size)
            .with_blur_strength(self.blur_strength)
            .with_strict_bounds(self.strict)
    }

    fn crop_plan(&self) -> Result<Option<CropPlan>> {
        if self.no_crop {
            return Ok(None);
        }
        Ok(Some(CropPlan::from_crop_ratio(self.crop, self.crop_ratio)?))
    }

    fn fractions(&self) -> Vec<Fraction> {
        if self.fixations.is_empty() {
            vec![Fraction { x: 0.5, y: 0.5 }]
        } else {
            self.fixations.clone()
        }
    }
}

/// Fixation given as fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fraction {
    x: f32,
    y: f32,
}

impl FromStr for Fraction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `fx,fy`, got `{s}`"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|e| format!("invalid fraction `{v}`: {e}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

struct Job<'a> {
    foveator: &'a Foveator,
    plan: Option<CropPlan>,
    fractions: &'a [Fraction],
    grid: bool,
    mark: bool,
    output: &'a Path,
}

impl Job<'_> {
    fn render(&self, image: &RgbImage, fixations: &[FixationPoint]) -> Result<RgbImage> {
        let mut rendered = self.foveator.foveate(image, fixations)?;
        if self.mark {
            mark_fixations(&mut rendered, fixations, MARK_RADIUS, MARK_COLOR);
        }
        Ok(rendered)
    }

    /// Render one input file; returns the number of images written.
    fn run(&self, path: &Path) -> Result<usize> {
        let image = image::open(path)
            .with_context(|| format!("failed to decode {}", path.display()))?
            .to_rgb8();
        let image = match &self.plan {
            Some(plan) => resize_and_center_crop(&image, plan)?,
            None => image,
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("no file stem in {}", path.display()))?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("png");

        if self.grid {
            let directory = self.output.join(stem);
            fs::create_dir_all(&directory)
                .with_context(|| format!("failed to create {}", directory.display()))?;

            let grid = fixation_grid(image.dimensions(), GRID_STEPS);
            for point in &grid {
                let rendered = self.render(&image, &[point.point])?;
                let target = directory.join(format!(
                    "{stem}_{}_{}_RT.{extension}",
                    point.column, point.row
                ));
                save(&rendered, &target)?;
            }
            Ok(grid.len())
        } else {
            let fixations = self
                .fractions
                .iter()
                .map(|f| proportional_fixation(image.dimensions(), f.x, f.y))
                .collect::<Result<Vec<FixationPoint>, _>>()?;
            let rendered = self.render(&image, &fixations)?;
            save(&rendered, &self.output.join(format!("{stem}_RT.{extension}")))?;
            Ok(1)
        }
    }
}

fn save(image: &RgbImage, target: &Path) -> Result<()> {
    image
        .save(target)
        .with_context(|| format!("failed to write {}", target.display()))
}

fn collect_inputs(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(directory)
        .with_context(|| format!("failed to read {}", directory.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && ImageFormat::from_path(path).is_ok())
        .collect();
    inputs.sort();
    Ok(inputs)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let foveator = Foveator::new(cli.config()).context("invalid foveation parameters")?;
    let plan = cli.crop_plan()?;
    let fractions = cli.fractions();

    let inputs = collect_inputs(&cli.input)?;
    if inputs.is_empty() {
        warn!("no images found in {}", cli.input.display());
        return Ok(());
    }
    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;

    let job = Job {
        foveator: &foveator,
        plan,
        fractions: &fractions,
        grid: cli.grid,
        mark: cli.mark,
        output: &cli.output,
    };

    let failures = inputs
        .par_iter()
        .filter(|path| {
            let start = Instant::now();
            match job.run(path) {
                Ok(written) => {
                    info!(
                        "done with {} ({written} output(s)) in {:.3}s",
                        path.display(),
                        start.elapsed().as_secs_f64()
                    );
                    false
                }
                Err(e) => {
                    error!("{}: {e:#}", path.display());
                    true
                }
            }
        })
        .count();

    if failures > 0 {
        bail!("{failures} of {} image(s) failed", inputs.len());
    }
    Ok(())
}

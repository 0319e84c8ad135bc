use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ageshift::BoundingBox;
use ageshift::types::OutputFormat;

#[derive(Parser)]
#[command(name = "ageshift", version, about = "Tiled face aging diagnostics")]
pub struct CliArgs {
    /// Enable logging (RUST_LOG overrides the default debug level)
    #[arg(long, default_value_t = false, global = true)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the crop rectangle and tile layout for a face box as JSON
    Plan(PlanArgs),
    /// Run the full pipeline with the identity transform to inspect blending
    Preview(PreviewArgs),
}

/// Parameters shared by all subcommands; flags override the config file.
#[derive(Args)]
pub struct ParamArgs {
    /// JSON file with aging parameters
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Approximate current age
    #[arg(long)]
    pub source_age: Option<f32>,

    /// Desired age
    #[arg(long)]
    pub target_age: Option<f32>,

    /// Working canvas size in pixels
    #[arg(long)]
    pub input_size: Option<usize>,

    /// Tile size in pixels
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Tile stride in pixels
    #[arg(long)]
    pub stride: Option<usize>,

    /// Transform tiles sequentially
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Image height in pixels
    #[arg(long)]
    pub height: usize,

    /// Image width in pixels
    #[arg(long)]
    pub width: usize,

    /// Face box as top,right,bottom,left
    #[arg(long)]
    pub face_box: BoundingBox,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Input image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format; defaults to the output file extension
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Face box as top,right,bottom,left
    #[arg(long)]
    pub face_box: BoundingBox,

    /// Grayscale full-canvas mask image (built-in mask if omitted)
    #[arg(long, requires = "tile_mask")]
    pub full_mask: Option<PathBuf>,

    /// Grayscale tile mask image (built-in mask if omitted)
    #[arg(long, requires = "full_mask")]
    pub tile_mask: Option<PathBuf>,

    #[command(flatten)]
    pub params: ParamArgs,
}

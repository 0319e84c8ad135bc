use tracing::info;
use tracing_subscriber::EnvFilter;

use ageshift::core::processing::pipeline::{age_face, plan_request};
use ageshift::io::{load_image, save_image};
use ageshift::types::OutputFormat;
use ageshift::{AgingParams, BlendMasks, IdentityTransform};

use super::args::{CliArgs, Command, ParamArgs, PlanArgs, PreviewArgs};
use super::errors::AppError;

fn resolve_params(args: &ParamArgs) -> Result<AgingParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Loading parameters from {:?}", path);
            AgingParams::from_json_file(path)?
        }
        None => AgingParams::default(),
    };
    if let Some(v) = args.source_age {
        params.source_age = v;
    }
    if let Some(v) = args.target_age {
        params.target_age = v;
    }
    if let Some(v) = args.input_size {
        params.input_size = v;
    }
    if let Some(v) = args.window_size {
        params.window_size = v;
    }
    if let Some(v) = args.stride {
        params.stride = v;
    }
    if args.sequential {
        params.parallel = false;
    }
    params.validate()?;
    Ok(params)
}

fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let params = resolve_params(&args.params)?;
    let plan = plan_request(args.height, args.width, &args.face_box, &params)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let params = resolve_params(&args.params)?;
    let format = match args.format {
        Some(f) => f,
        None => OutputFormat::from_path(&args.output).ok_or_else(|| {
            AppError::UnknownOutputFormat {
                path: args.output.display().to_string(),
            }
        })?,
    };

    let masks = match (&args.full_mask, &args.tile_mask) {
        (Some(full), Some(tile)) => BlendMasks::load(full, tile)?,
        _ => BlendMasks::synthetic(params.input_size, params.window_size),
    }
    .fit(params.input_size, params.window_size)?;
    let masks = masks.install_global()?;

    let image = load_image(&args.input)?;
    let aged = age_face(
        image.view(),
        &args.face_box,
        &IdentityTransform,
        masks,
        &params,
    )?;
    save_image(aged.view(), &args.output, format)?;
    info!("Preview written: {:?} -> {:?}", args.input, args.output);
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        Command::Plan(plan) => run_plan(plan)?,
        Command::Preview(preview) => run_preview(preview)?,
    }
    Ok(())
}

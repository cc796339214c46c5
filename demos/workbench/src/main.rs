use std::path::PathBuf;

use argh::FromArgs;
use imlab::{
    io::functional::{read_image_rgb8, write_image_rgb8},
    params::{
        ContrastMode, EdgeParams, HarrisParams, HoughParams, Segmentation, WorkbenchParams,
    },
    workbench,
};

/// Applies a contrast enhancement and a segmentation to an image
#[derive(FromArgs)]
struct Args {
    /// path to the input image
    #[argh(positional)]
    input: PathBuf,

    /// path to the output image
    #[argh(positional)]
    output: PathBuf,

    /// json file with the workbench parameters, overridden by the other flags
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// contrast: original, linear, gray-eq, rgb-eq or hsv-eq
    #[argh(option, from_str_fn(parse_contrast))]
    contrast: Option<ContrastMode>,

    /// segmentation: none, edges, lines or points, with default parameters
    #[argh(option, from_str_fn(parse_segmentation))]
    segmentation: Option<Segmentation>,
}

fn parse_contrast(value: &str) -> Result<ContrastMode, String> {
    match value {
        "original" => Ok(ContrastMode::Original),
        "linear" => Ok(ContrastMode::LinearStretch),
        "gray-eq" => Ok(ContrastMode::EqualizeGray),
        "rgb-eq" => Ok(ContrastMode::EqualizeRgb),
        "hsv-eq" => Ok(ContrastMode::EqualizeHsv),
        _ => Err(format!("unsupported contrast mode {value}")),
    }
}

fn parse_segmentation(value: &str) -> Result<Segmentation, String> {
    match value {
        "none" => Ok(Segmentation::None),
        "edges" => Ok(Segmentation::Edges(EdgeParams::default())),
        "lines" => Ok(Segmentation::Lines(HoughParams::default())),
        "points" => Ok(Segmentation::Points(HarrisParams::default())),
        _ => Err(format!("unsupported segmentation {value}")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut params: WorkbenchParams = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => WorkbenchParams::default(),
    };
    if let Some(contrast) = args.contrast {
        params.contrast = contrast;
    }
    if let Some(segmentation) = args.segmentation {
        params.segmentation = segmentation;
    }

    let image = read_image_rgb8(&args.input)?;
    log::info!(
        "read {} ({}x{})",
        args.input.display(),
        image.width(),
        image.height()
    );

    let result = workbench::apply(&image, &params)?;
    write_image_rgb8(&args.output, &result)?;

    println!("wrote {}", args.output.display());

    Ok(())
}

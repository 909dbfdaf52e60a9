// ============================================================================
// paintcore CLI — headless frame rendering via command-line arguments
// ============================================================================
//
// Usage examples:
//   paintcore --input photo.png --output out.png
//   paintcore -i sprite.png -o big.png --zoom 8 --grid
//   paintcore -i "shots/*.png" --output-dir rendered/ --format jpeg -q 85
//
// Each input becomes a single-layer document that is pushed through the
// real compositing pipeline (checkerboard backdrop, scaling, optional
// pixel grid) and encoded to the output format.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use image::RgbaImage;

use crate::compositor::{Compositor, FrameContext, RenderOptions};
use crate::layer::{Layer, LayerStack};
use crate::livepreview::LivePreview;
use crate::tool::ActiveTool;
use crate::workspace::{Invalidation, Workspace};
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// paintcore headless renderer.
///
/// Composite image files through the canvas pipeline without a GUI.
#[derive(Parser, Debug)]
#[command(
    name = "paintcore",
    about = "paintcore headless canvas renderer",
    long_about = "Render image files through the compositing pipeline — checkerboard\n\
                  transparency backdrop, nearest-neighbor zoom, optional pixel grid —\n\
                  and write the result as PNG or JPEG.\n\n\
                  Example:\n  \
                  paintcore --input sprite.png --zoom 4 --grid --output sprite_4x.png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Zoom factor applied to the canvas (clamped to the supported range).
    #[arg(short, long, default_value_t = 1.0, value_name = "FACTOR")]
    pub zoom: f64,

    /// Draw the pixel grid overlay (takes effect at 2x zoom or closer).
    #[arg(long)]
    pub grid: bool,

    /// Skip the checkerboard backdrop and keep transparency in the output.
    #[arg(long)]
    pub no_checkerboard: bool,

    /// Output format: png or jpeg.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let save_format = parse_format(args.format.as_deref(), args.output.as_deref());

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let output_path = match build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) {
            Some(p) => p,
            None => {
                eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
                any_failure = true;
                continue;
            }
        };

        match run_one(input_path, &output_path, &args, save_format) {
            Ok(()) => {
                log_info!("rendered {} -> {}", input_path.display(), output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file rendering pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    args: &CliArgs,
    format: SaveFormat,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let surface = image::open(input)
        .map_err(|e| format!("load failed: {}", e))?
        .to_rgba8();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string());

    // -- Step 2: Composite through the canvas pipeline -------------------
    let layers = LayerStack::with_base_layer(Layer::from_surface(stem, surface));
    let mut workspace = Workspace::new(layers.current_layer().size());
    workspace.set_scale(args.zoom);

    let canvas = workspace.canvas_size();
    if canvas.is_empty() {
        return Err("canvas size is zero at the requested zoom".to_string());
    }

    let mut target = RgbaImage::new(canvas.width, canvas.height);
    let mut compositor = Compositor::new();
    let ctx = FrameContext {
        viewport: workspace.snapshot(),
        layers: &layers,
        live_preview: &LivePreview::new(),
        tool: &ActiveTool::default(),
        options: RenderOptions {
            show_grid: args.grid,
            checkerboard: !args.no_checkerboard,
        },
    };

    compositor
        .render_frame(&ctx, Invalidation::EntireSurface, &mut target)
        .ok_or_else(|| "nothing to render (empty canvas)".to_string())?;

    // -- Step 3: Save ----------------------------------------------------
    encode_and_write(&target, output, format, args.quality)
        .map_err(|e| format!("save failed: {}", e))?;

    Ok(())
}

fn encode_and_write(
    img: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), image::ImageError> {
    match format {
        SaveFormat::Png => img.save_with_format(path, image::ImageFormat::Png),
        SaveFormat::Jpeg => {
            // JPEG carries no alpha — flatten onto the RGB channels.
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let file = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
            let mut enc =
                image::codecs::jpeg::JpegEncoder::new_with_quality(file, quality.clamp(1, 100));
            enc.encode_image(&rgb)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path — use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        // Treat as glob pattern
        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose the [`SaveFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> SaveFormat {
    if let Some(f) = format_arg {
        return match f.to_lowercase().as_str() {
            "jpeg" | "jpg" => SaveFormat::Jpeg,
            _              => SaveFormat::Png,
        };
    }

    if let Some(out) = output {
        return match out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "jpg" | "jpeg" => SaveFormat::Jpeg,
            _              => SaveFormat::Png,
        };
    }

    SaveFormat::Png
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input:      &Path,
    output:     Option<&Path>,
    output_dir: Option<&Path>,
    format:     SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext  = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    // Write next to the input file
    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    // Avoid silent overwrite of the input
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

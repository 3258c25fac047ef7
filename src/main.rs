use clap::Parser;
use img2skel::{ThresholdMethod, TracingConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "img2skel", about = "Binary image to skeleton polylines")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Largest chunk side traced without further splitting
    #[arg(long, default_value = "10")]
    chunk_size: usize,

    /// Recursion depth budget
    #[arg(long, default_value = "999")]
    max_depth: usize,

    /// Fixed brightness threshold (0-255). Overrides Otsu auto-detection.
    #[arg(long)]
    threshold: Option<u8>,

    /// Invert the image before tracing
    #[arg(long)]
    invert: bool,

    /// Skip thinning (input is already a one-pixel skeleton)
    #[arg(long)]
    no_thin: bool,

    /// Trace on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Also write a PNG with the skeleton drawn over the thresholded image
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Outline the sub-chunks the tracer visited in the overlay
    #[arg(long, requires = "overlay")]
    chunks: bool,

    /// Overlay pixels per source pixel
    #[arg(long, default_value = "4")]
    overlay_scale: u32,

    /// Print the polylines as text to stdout
    #[arg(long)]
    text: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = TracingConfig {
        threshold: match cli.threshold {
            Some(t) => ThresholdMethod::Fixed(t),
            None => ThresholdMethod::Otsu,
        },
        invert: cli.invert,
        thin: !cli.no_thin,
        chunk_size: cli.chunk_size,
        max_depth: cli.max_depth,
        parallel: !cli.sequential,
        record_chunks: cli.chunks,
    };

    // Header
    eprintln!();
    eprintln!("  img2skel \u{00b7} {}", cli.input.display());
    eprintln!();

    // Pipeline (lib prints step-by-step progress to stderr)
    let result = img2skel::trace_image(&cli.input, &config)?;
    img2skel::output::svg::write_svg(&cli.output, &result.polylines, result.width, result.height)?;

    if cli.text {
        print!("{}", result.polylines.to_text());
    }

    // Footer
    eprintln!();
    eprintln!("  \u{2713} {}", cli.output.display());

    if let Some(overlay_path) = &cli.overlay {
        img2skel::render::write_overlay(
            &result.bitmap,
            &result.polylines,
            &result.chunks,
            cli.overlay_scale,
            overlay_path,
        )?;
        eprintln!("  \u{2713} {}", overlay_path.display());
    }

    Ok(())
}

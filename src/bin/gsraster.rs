//! CLI binary for gs-raster.
//!
//! A thin shim over the library crate that maps CLI flags onto a
//! `RenderRequest`, then prints or runs the resulting Ghostscript command.

use anyhow::{Context, Result};
use clap::Parser;
use gs_raster::{
    AntiAliasing, Device, NoSniffer, RenderOptions, RenderRequest, Resolution,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PNG next to the input, 72 dpi (defaults)
  gsraster document.pdf

  # One JPEG per page, 150 dpi, smooth text and graphics
  gsraster -d jpeg --quality 90 -r 150 --text-aa 4 --graphics-aa 4 \
           -o 'page-%03d' document.pdf

  # Anisotropic resolution on A4 paper
  gsraster -r 300x600 --paper a4 scan.ps

  # Show the Ghostscript command without running it
  gsraster --print-command figure.eps

  # Load options from a JSON file; flags still override it
  gsraster --options render.json -r 200 document.pdf

OPTIONS FILE (JSON, every field optional):
  {
    "output_file": "page-%d",
    "resolution": { "horizontal": 96, "vertical": 150 },
    "papersize": "a4",
    "text_antialiasing": 4,
    "graphics_antialiasing": 2,
    "use_cie": false,
    "device": { "type": "jpeg", "quality": 85 }
  }

DEVICES:
  png          24-bit colour PNG (png16m)
  jpeg, jpg    colour JPEG, --quality 0-100 (default 75)

ENVIRONMENT VARIABLES:
  GHOSTSCRIPT_PATH   Path to the gs executable; skips the PATH search
  RUST_LOG           Override the log filter (e.g. gs_raster=debug)
"#;

/// Rasterise PDF, PostScript and EPS files with Ghostscript.
#[derive(Parser, Debug)]
#[command(
    name = "gsraster",
    version,
    about = "Rasterise PDF, PostScript and EPS files with Ghostscript",
    long_about = "Build a Ghostscript command line from typed options and run it. \
The input must be a PDF, PostScript or EPS file; output images are written next to \
the input unless --output is absolute.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF, PostScript or EPS file to rasterise.
    input: PathBuf,

    /// Output name without extension; may contain a page placeholder like %d.
    #[arg(short, long, env = "GSRASTER_OUTPUT")]
    output: Option<String>,

    /// Output device: png, jpeg.
    #[arg(short, long, env = "GSRASTER_DEVICE")]
    device: Option<String>,

    /// JPEG quality (0–100, clamped). Ignored for other devices.
    #[arg(long, env = "GSRASTER_QUALITY")]
    quality: Option<u32>,

    /// Resolution in dpi: 96 or 96x150.
    #[arg(short, long, env = "GSRASTER_RESOLUTION")]
    resolution: Option<Resolution>,

    /// Ghostscript paper size name (letter, a4, legal, …).
    #[arg(long, env = "GSRASTER_PAPER")]
    paper: Option<String>,

    /// Text antialiasing bits: 0, 1, 2 or 4.
    #[arg(long, env = "GSRASTER_TEXT_AA", value_parser = parse_antialiasing)]
    text_aa: Option<AntiAliasing>,

    /// Graphics antialiasing bits: 0, 1, 2 or 4.
    #[arg(long, env = "GSRASTER_GRAPHICS_AA", value_parser = parse_antialiasing)]
    graphics_aa: Option<AntiAliasing>,

    /// Use the CIE colour map for CMYK/RGB conversion.
    #[arg(long, env = "GSRASTER_CIE")]
    cie: bool,

    /// Path to the gs executable (default: GHOSTSCRIPT_PATH, then PATH).
    #[arg(long = "gs", env = "GSRASTER_GS")]
    gs: Option<PathBuf>,

    /// JSON file with RenderOptions; command-line flags take precedence.
    #[arg(long, env = "GSRASTER_OPTIONS")]
    options: Option<PathBuf>,

    /// Skip MIME-type detection of the input file.
    #[arg(long)]
    no_sniff: bool,

    /// Print the Ghostscript command line and exit without running it.
    #[arg(long)]
    print_command: bool,

    /// Print the command as JSON (program, argv, render string) and exit.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GSRASTER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GSRASTER_QUIET")]
    quiet: bool,
}

fn parse_antialiasing(s: &str) -> Result<AntiAliasing, String> {
    let raw: i32 = s
        .trim()
        .parse()
        .map_err(|e| format!("'{s}' is not a number: {e}"))?;
    AntiAliasing::try_from(raw).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct CommandJson<'a> {
    program: Option<&'a std::path::Path>,
    argv: Vec<String>,
    render_string: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build request ────────────────────────────────────────────────────
    let request = build_request(&cli).await?;
    let command = request
        .command()
        .context("No input file set; nothing to render")?;

    // ── Dry-run modes ────────────────────────────────────────────────────
    if cli.json {
        let out = CommandJson {
            program: command.program(),
            argv: command.argv(),
            render_string: command.to_string(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialise command")?
        );
        return Ok(());
    }
    if cli.print_command {
        println!("{command}");
        return Ok(());
    }

    // ── Render ───────────────────────────────────────────────────────────
    let target = format!(
        "{}.{}",
        request.output_file().display(),
        request.device().file_ending()
    );
    if !cli.quiet {
        eprintln!("{} {}", dim("$"), dim(&command.to_string()));
    }

    match request.render_async().await {
        Ok(_) => {
            if !cli.quiet {
                eprintln!("{} rendered  →  {}", green("✔"), bold(&target));
            }
            Ok(())
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("{} {}", red("✘"), red("render failed"));
            }
            Err(e).context(format!("Failed to render '{}'", cli.input.display()))
        }
    }
}

/// Map CLI args to a `RenderRequest`.
async fn build_request(cli: &Cli) -> Result<RenderRequest> {
    let options = match cli.options {
        Some(ref path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read options from {:?}", path))?;
            serde_json::from_str::<RenderOptions>(&text)
                .with_context(|| format!("Invalid options file {:?}", path))?
        }
        None => RenderOptions::default(),
    };

    let request = match cli.gs {
        Some(ref gs) => RenderRequest::with_tool(gs),
        None => RenderRequest::new(),
    };
    let mut request = request.with_options(options);
    if cli.no_sniff {
        request = request.with_sniffer(Arc::new(NoSniffer));
    }

    if let Some(ref name) = cli.device {
        request
            .set_device_by_name(name)
            .context("Invalid --device")?;
    }
    if let Some(q) = cli.quality {
        match request.device_mut() {
            Device::Jpeg(jpeg) => {
                jpeg.set_quality(q);
            }
            other => tracing::warn!("--quality has no effect on the {} device", other),
        }
    }
    if let Some(ref output) = cli.output {
        request.set_output_file(output.as_str());
    }
    if let Some(res) = cli.resolution {
        request.set_resolution(res.horizontal, res.vertical);
    }
    if let Some(ref paper) = cli.paper {
        request.set_papersize(paper.as_str());
    }
    if let Some(level) = cli.text_aa {
        request.set_text_antialiasing(level);
    }
    if let Some(level) = cli.graphics_aa {
        request.set_graphics_antialiasing(level);
    }
    if cli.cie {
        request.set_use_cie(true);
    }

    request
        .set_input_file(&cli.input)
        .context("Unsupported input file")?;

    Ok(request)
}

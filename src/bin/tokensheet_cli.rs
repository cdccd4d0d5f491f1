//! CLI tool for tokensheet - renders a project file to PDF, PNG or JPEG
//!
//! Usage:
//!   tokensheet_cli <project.json>                       # Write <project>.pdf
//!   tokensheet_cli <project.json> -o sheet.png          # Format from extension
//!   tokensheet_cli <project.json> -o sheet.jpg --quality 85
//!   tokensheet_cli <project.json> --grid                # Print grid JSON to stdout
//!
//! Set `RUST_LOG=debug` for layout and load details.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tokensheet::export::{export_image, export_pdf, RasterFormat, DEFAULT_JPEG_QUALITY};
use tokensheet::frames::FrameCatalog;
use tokensheet::project::Project;

const USAGE: &str =
    "Usage: tokensheet_cli <project.json> [-o out.pdf|out.png|out.jpg] [--quality N] [--grid]";

struct Args {
    project: PathBuf,
    output: Option<PathBuf>,
    quality: u8,
    grid: bool,
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn parse_args() -> Args {
    let mut args = env::args().skip(1);
    let mut project = None;
    let mut output = None;
    let mut quality = DEFAULT_JPEG_QUALITY;
    let mut grid = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = Some(PathBuf::from(
                    args.next().unwrap_or_else(|| fail("-o needs a file name")),
                ));
            }
            "--quality" => {
                quality = args
                    .next()
                    .and_then(|q| q.parse::<u8>().ok())
                    .filter(|q| (1..=100).contains(q))
                    .unwrap_or_else(|| fail("--quality needs a number from 1 to 100"));
            }
            "--grid" => grid = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if project.is_none() && !arg.starts_with('-') => project = Some(PathBuf::from(arg)),
            _ => fail(&format!("Unexpected argument: {arg}\n{USAGE}")),
        }
    }

    Args {
        project: project.unwrap_or_else(|| fail(USAGE)),
        output,
        quality,
        grid,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();

    let project = match Project::load(&args.project) {
        Ok(p) => p,
        Err(e) => fail(&format!("Error reading {}: {}", args.project.display(), e)),
    };
    let base_dir = args.project.parent().unwrap_or(Path::new("."));
    let sheet = match project.build_sheet(base_dir) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error building sheet: {}", e)),
    };

    if args.grid {
        let json = serde_json::to_string_pretty(sheet.geometry()).unwrap();
        io::stdout().write_all(json.as_bytes()).unwrap();
        println!();
        return;
    }

    let output = args
        .output
        .unwrap_or_else(|| args.project.with_extension("pdf"));
    let frames = FrameCatalog::builtin();
    let is_pdf = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let bytes = if is_pdf {
        export_pdf(&sheet, &frames)
    } else {
        let format = RasterFormat::from_path(&output, args.quality).unwrap_or_else(|| {
            fail(&format!(
                "Unsupported output type: {} (use .pdf, .png or .jpg)",
                output.display()
            ))
        });
        export_image(&sheet, &frames, format)
    };

    match bytes {
        Ok(bytes) => {
            if let Err(e) = fs::write(&output, &bytes) {
                fail(&format!("Error writing {}: {}", output.display(), e));
            }
            eprintln!("Written: {}", output.display());
        }
        Err(e) => fail(&format!("Export failed: {}", e)),
    }
}

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use peakchart::{ChartOptions, ChartRequest};
use tracing::{info, warn};
use walkdir::WalkDir;

const OUTPUT_SUFFIX: &str = "dataset.json";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "peakchart-importer",
    author,
    version,
    about = "Turn chart request files into renderer-ready comparison datasets",
    long_about = None
)]
pub struct Cli {
    /// A chart request JSON file, or a directory walked for `*.json` requests
    #[arg(long, value_name = "FILE|DIR")]
    pub input: PathBuf,

    /// Output file for a single request, or output directory for a directory input
    #[arg(long, value_name = "FILE|DIR")]
    pub output: PathBuf,

    /// Chart options used by requests that carry none (defaults to the configured options file)
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,
}

pub fn run(cli: Cli) -> Result<()> {
    let defaults = load_defaults(cli.options.as_deref())?;

    let metadata = fs::metadata(&cli.input)
        .with_context(|| format!("failed to read metadata for '{}'", cli.input.display()))?;

    let mut dropped = 0usize;
    let written = if metadata.is_dir() {
        fs::create_dir_all(&cli.output).with_context(|| {
            format!("failed to create output directory '{}'", cli.output.display())
        })?;

        let requests = collect_requests(&cli.input)?;
        for path in &requests {
            let target = output_path(&cli.input, &cli.output, path)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            dropped += convert(path, &target, &defaults)?;
        }
        requests.len()
    } else {
        if let Some(parent) = cli.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "failed to create output parent directory '{}'",
                        parent.display()
                    )
                })?;
            }
        }
        dropped += convert(&cli.input, &cli.output, &defaults)?;
        1
    };

    info!(
        target: "peakchart::importer",
        input = %cli.input.display(),
        output = %cli.output.display(),
        requests = written,
        dropped,
        "importer completed"
    );

    Ok(())
}

fn load_defaults(path: Option<&Path>) -> Result<ChartOptions> {
    match path {
        Some(path) => ChartOptions::load_from_path(path)
            .with_context(|| format!("failed to load chart options from '{}'", path.display())),
        None => ChartOptions::load().context("failed to load configured chart options"),
    }
}

fn collect_requests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut requests = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry
            .with_context(|| format!("failed to walk input directory '{}'", dir.display()))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if is_request(&path) {
            requests.push(path);
        }
    }
    requests.sort();
    Ok(requests)
}

/// Maps `input_root/sub/run.json` to `output_root/sub/run.dataset.json`.
fn output_path(input_root: &Path, output_root: &Path, request: &Path) -> Result<PathBuf> {
    let relative = request.strip_prefix(input_root).with_context(|| {
        format!("failed to strip input prefix from '{}'", request.display())
    })?;
    let stem = relative
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("request '{}' has an invalid name", request.display()))?;

    let mut target = output_root.to_path_buf();
    if let Some(dir) = relative.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        target.push(dir);
    }
    target.push(format!("{stem}.{OUTPUT_SUFFIX}"));
    Ok(target)
}

/// Writes the dataset for one request and returns its dropped record count.
fn convert(input: &Path, output: &Path, defaults: &ChartOptions) -> Result<usize> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read request '{}'", input.display()))?;
    let request: ChartRequest = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse request '{}'", input.display()))?;

    let dataset = request.build(defaults);
    if dataset.dropped_records > 0 {
        warn!(
            target: "peakchart::importer",
            request = %input.display(),
            dropped = dataset.dropped_records,
            "request contained records that could not be placed"
        );
    }

    let json = serde_json::to_vec_pretty(&dataset)?;
    fs::write(output, json)
        .with_context(|| format!("failed to write dataset to '{}'", output.display()))?;

    Ok(dataset.dropped_records)
}

/// Inputs are `*.json` files that are not themselves previous outputs.
fn is_request(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let is_output = path
        .file_name()
        .and_then(OsStr::to_str)
        .map(|name| name.ends_with(OUTPUT_SUFFIX))
        .unwrap_or(false);
    is_json && !is_output
}

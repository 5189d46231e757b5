//! `pngtrim trim`

use anyhow::{bail, Context};
use owo_colors::OwoColorize;
use pngtrim_cli::output::{format_count, format_duration, format_resize, format_size, Status};
use pngtrim_cli::progress;
use pngtrim_core::config::Config;
use pngtrim_image::{detect_format, probe_dimensions, trim_all, TrimOptions};
use pngtrim_core::naming::{disambiguate, NamingPolicy};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Arguments for `pngtrim trim`.
pub struct TrimArgs {
    pub paths: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub json: bool,
}

/// One line of the `--json` report.
#[derive(Debug, Serialize)]
struct FileReport {
    source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(config_path: Option<&Path>, args: &TrimArgs) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let marker = &config.schema.naming.marker;

    let (sources, inputs): (Vec<PathBuf>, Vec<Vec<u8>>) =
        collect_sources(&args.paths, marker)?.into_iter().unzip();
    if sources.is_empty() {
        bail!("No images found in the given paths");
    }

    let outputs = output_paths(&sources, args.out.as_deref(), marker);
    if let Some(out) = &args.out {
        fs::create_dir_all(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
    }

    let options = TrimOptions {
        empty_image: config.schema.processing.empty_image,
    };
    let pb = if args.json {
        progress::hidden()
    } else {
        progress::file_progress(sources.len() as u64)
    };

    let started = Instant::now();
    let results = trim_all(&inputs, &options, || pb.inc(1));

    let mut reports = Vec::with_capacity(sources.len());
    for (((source, input), output), result) in
        sources.into_iter().zip(&inputs).zip(outputs).zip(results)
    {
        let before = dims(input);
        let report = match result {
            Ok(trimmed) => match fs::write(&output, &trimmed) {
                Ok(()) => FileReport {
                    after: dims(&trimmed),
                    size_bytes: Some(trimmed.len()),
                    output: Some(output),
                    before,
                    source,
                    error: None,
                },
                Err(e) => failed(source, before, format!("write {}: {}", output.display(), e)),
            },
            Err(e) => failed(source, before, e.to_string()),
        };
        reports.push(report);
    }

    let failures = reports.iter().filter(|r| r.error.is_some()).count();
    let total = reports.len();
    if failures == 0 {
        progress::finish_success(&pb, "done");
    } else {
        progress::finish_error(&pb, &format!("{} failed", failures));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_reports(&reports);
        Status::info(&format!(
            "Trimmed {} in {}",
            format_count(total - failures, "image", "images"),
            format_duration(started.elapsed())
        ));
    }

    if failures > 0 {
        bail!("{} of {} images failed", failures, total);
    }
    Ok(())
}

fn failed(source: PathBuf, before: Option<(u32, u32)>, error: String) -> FileReport {
    FileReport {
        source,
        output: None,
        before,
        after: None,
        size_bytes: None,
        error: Some(error),
    }
}

fn dims(data: &[u8]) -> Option<(u32, u32)> {
    probe_dimensions(data).map(|info| (info.width, info.height))
}

fn print_reports(reports: &[FileReport]) {
    for report in reports {
        match (&report.output, &report.error) {
            (Some(output), None) => Status::success(&format!(
                "{} → {} {} {}",
                report.source.display(),
                output.display(),
                format_resize(report.before, report.after).dimmed(),
                format_size(report.size_bytes.unwrap_or_default() as u64).dimmed()
            )),
            (_, Some(error)) => {
                Status::error(&format!("{}: {}", report.source.display(), error))
            }
            (None, None) => {}
        }
    }
}

/// Read every image named on the command line.
///
/// Explicit files are always taken, so a bad one is reported. Directories are
/// walked in name order and only recognizable images are taken, skipping
/// earlier outputs that already carry `marker`.
fn collect_sources(paths: &[PathBuf], marker: &str) -> anyhow::Result<Vec<(PathBuf, Vec<u8>)>> {
    let mut sources = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        Status::warning(&format!("Skipping unreadable entry: {}", e));
                        continue;
                    }
                };
                if !entry.file_type().is_file() || is_previous_output(entry.path(), marker) {
                    continue;
                }
                let data = fs::read(entry.path())
                    .with_context(|| format!("Failed to read {}", entry.path().display()))?;
                if detect_format(&data).is_ok() {
                    sources.push((entry.into_path(), data));
                }
            }
        } else {
            let data =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            sources.push((path.clone(), data));
        }
    }

    Ok(sources)
}

fn is_previous_output(path: &Path, marker: &str) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(marker))
}

/// Output path for each source, renamed with `marker`.
///
/// With `out`, everything lands in one directory, so colliding names are
/// made unique.
fn output_paths(sources: &[PathBuf], out: Option<&Path>, marker: &str) -> Vec<PathBuf> {
    let naming = NamingPolicy::Suffix(marker.to_string());
    let mut names: Vec<String> = sources
        .iter()
        .map(|source| {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            naming.apply(&name)
        })
        .collect();

    match out {
        Some(dir) => {
            disambiguate(&mut names);
            names.into_iter().map(|name| dir.join(name)).collect()
        }
        None => sources
            .iter()
            .zip(names)
            .map(|(source, name)| source.with_file_name(name))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths_next_to_source() {
        let sources = vec![PathBuf::from("a/icon.png"), PathBuf::from("b/logo")];
        let outputs = output_paths(&sources, None, "-processed");
        assert_eq!(
            outputs,
            [PathBuf::from("a/icon-processed.png"), PathBuf::from("b/logo-processed")]
        );
    }

    #[test]
    fn test_output_paths_into_one_dir_are_unique() {
        let sources = vec![PathBuf::from("a/icon.png"), PathBuf::from("b/icon.png")];
        let outputs = output_paths(&sources, Some(Path::new("out")), "-processed");
        assert_eq!(
            outputs,
            [
                PathBuf::from("out/icon-processed.png"),
                PathBuf::from("out/icon-processed-2.png")
            ]
        );
    }

    #[test]
    fn test_previous_outputs_are_recognized() {
        assert!(is_previous_output(Path::new("x/icon-processed.png"), "-processed"));
        assert!(!is_previous_output(Path::new("x/icon.png"), "-processed"));
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Screen capture output files.
//!
//! Captured screens are appended to the workflow's output file either raw
//! (API mode) or wrapped in minimal HTML for viewing in a browser.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors writing capture output.
#[derive(Debug, Error)]
#[error("capture output {path}: {source}")]
pub struct CaptureError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

fn wrap(path: &Path) -> impl Fn(std::io::Error) -> CaptureError + '_ {
    move |source| CaptureError {
        path: path.to_path_buf(),
        source,
    }
}

/// Prepare the output file for a workflow.
///
/// API mode truncates to an empty file; otherwise an HTML preamble is
/// appended so successive grabs accumulate into one viewable document.
pub fn initialize_output(path: &Path, api_mode: bool) -> Result<(), CaptureError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(wrap(path))?;
        }
    }
    if api_mode {
        std::fs::write(path, b"").map_err(wrap(path))?;
        return Ok(());
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap(path))?;
    file.write_all(b"<!DOCTYPE html>\n<html>\n<body>\n")
        .map_err(wrap(path))?;
    Ok(())
}

/// Append one captured screen to the output file.
pub fn append_screen(path: &Path, api_mode: bool, lines: &[String]) -> Result<(), CaptureError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap(path))?;

    let mut body = String::new();
    if !api_mode {
        body.push_str("<pre>\n");
    }
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    if !api_mode {
        body.push_str("</pre>\n");
    }
    file.write_all(body.as_bytes()).map_err(wrap(path))?;
    Ok(())
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;

// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Saving and loading parameter files, exporting figures.
//!
//! Every entry point taking an `Option<&Path>` treats `None` as a cancelled
//! file dialog and does nothing.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::params::ParameterSnapshot;
use crate::results::SimulationResult;

pub const EXPORT_DPI: u32 = 300;

/// A drawable figure that can be written to an image file.
pub trait Figure {
    fn save(&self, path: &Path, dpi: u32, tight_bbox: bool) -> std::io::Result<()>;
}

/// Writes `snapshot` as a JSON object indented by two spaces.
pub fn save_parameters(snapshot: &ParameterSnapshot, path: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(path) = path else {
        return Ok(None);
    };
    write_json(path, snapshot)?;
    info!("saved parameters to {}", path.display());
    Ok(Some(path.to_path_buf()))
}

pub fn load_parameters(path: &Path) -> Result<ParameterSnapshot> {
    let file = File::open(path).map_err(|err| persistence(ErrorCode::Io, path, err))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::new(ErrorKind::Input, ErrorCode::Json, Some(err.to_string())))?;
    ParameterSnapshot::from_json(&value)
}

pub fn save_plot(figure: &dyn Figure, path: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(path) = path else {
        return Ok(None);
    };
    figure
        .save(path, EXPORT_DPI, true)
        .map_err(|err| persistence(ErrorCode::Export, path, err))?;
    info!("exported figure to {}", path.display());
    Ok(Some(path.to_path_buf()))
}

pub fn save_result(result: &SimulationResult, path: &Path) -> Result<()> {
    write_json(path, result)
}

/// Reads a result written by [`save_result`], checking that every series
/// matches the time axis.
pub fn load_result(path: &Path) -> Result<SimulationResult> {
    let file = File::open(path).map_err(|err| persistence(ErrorCode::Io, path, err))?;
    let result: SimulationResult = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::new(ErrorKind::Input, ErrorCode::Json, Some(err.to_string())))?;
    result.validate()?;
    Ok(result)
}

// The writer is dropped, closing the file, on every return path.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|err| persistence(ErrorCode::Io, path, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|err| persistence(ErrorCode::Json, path, err))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|err| persistence(ErrorCode::Io, path, err))?;
    Ok(())
}

fn persistence(code: ErrorCode, path: &Path, err: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorKind::Persistence,
        code,
        Some(format!("{}: {}", path.display(), err)),
    )
}

// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Chooses what to draw for a single result and drives a [`Canvas`].

use std::fmt;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::protocol::{Protocol, resolve};
use crate::results::{Field, SimulationResult};

pub const TIME_LABEL: &str = "Time (days)";
pub const GRID_ALPHA: f64 = 0.6;
const LINE_WIDTH: f64 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub style: LineStyle,
    pub width: f64,
    pub alpha: f64,
}

impl Line {
    pub fn new(label: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Line {
            label: label.into(),
            x,
            y,
            style: LineStyle::Solid,
            width: LINE_WIDTH,
            alpha: 1.0,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.style = LineStyle::Dashed;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// One set of axes, as provided by the plotting toolkit.
pub trait Canvas {
    fn clear(&mut self);
    fn set_title(&mut self, title: &str);
    fn plot(&mut self, line: &Line);
    /// Legend-only entry with no data behind it.
    fn note(&mut self, text: &str);
    fn set_xlabel(&mut self, label: &str);
    fn set_ylabel(&mut self, label: &str);
    fn legend(&mut self);
    fn grid(&mut self, style: LineStyle, alpha: f64);
    fn tight_layout(&mut self);
    /// Request a redraw of the owning widget.
    fn draw(&mut self);
}

/// Axis labelling, legend, grid, layout and redraw. Every render path ends
/// with exactly one call to this.
pub fn finish(canvas: &mut dyn Canvas, x_label: &str, y_label: &str) {
    canvas.set_xlabel(x_label);
    canvas.set_ylabel(y_label);
    canvas.legend();
    canvas.grid(LineStyle::Dashed, GRID_ALPHA);
    canvas.tight_layout();
    canvas.draw();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlotKind {
    Stretch,
    Stress,
    Mass,
    Unrecognized(String),
}

impl PlotKind {
    /// Accepts both the short tokens and the labels of the chart-type
    /// selector.
    pub fn parse(token: &str) -> PlotKind {
        match token {
            "stretch" | "Tissue stretch" => PlotKind::Stretch,
            "stress" | "Component stress" => PlotKind::Stress,
            "mass" | "Volume fractions" => PlotKind::Mass,
            other => PlotKind::Unrecognized(other.to_owned()),
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            PlotKind::Stretch => "Stretch",
            PlotKind::Stress => "Stress (kPa)",
            PlotKind::Mass => "Volume fraction",
            PlotKind::Unrecognized(_) => "Value",
        }
    }

    fn heading(&self) -> &str {
        match self {
            PlotKind::Stretch => "Tissue stretch",
            PlotKind::Stress => "Component stress",
            PlotKind::Mass => "Volume fractions",
            PlotKind::Unrecognized(token) => token,
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.heading())
    }
}

/// Everything needed to draw one result.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotSpec {
    pub kind: PlotKind,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub lines: Vec<Line>,
    pub note: Option<String>,
}

impl PlotSpec {
    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.clear();
        canvas.set_title(&self.title);
        for line in &self.lines {
            canvas.plot(line);
        }
        if let Some(note) = &self.note {
            canvas.note(note);
        }
        finish(canvas, self.x_label, self.y_label);
    }
}

/// Picks the series and decoration for `plot_type`.
///
/// The primary series of each plot type is required; overlays are drawn only
/// when the protocol lists them and the result carries them.
pub fn select(plot_type: &str, result: &SimulationResult, protocol: Protocol) -> Result<PlotSpec> {
    let kind = PlotKind::parse(plot_type);
    let t = &result.time;
    let mut lines = Vec::new();
    let mut note = None;

    match kind {
        PlotKind::Stretch => {
            lines.push(Line::new(
                "Tissue stretch",
                t.clone(),
                primary(result, Field::Stretch)?,
            ));
            if protocol.is_dynamic() {
                if let Some(target) = overlay(result, protocol, Field::TargetStretch) {
                    lines.push(Line::new("Target stretch", t.clone(), target).dashed());
                }
            }
        }
        PlotKind::Stress => {
            let total = primary(result, Field::StressTotal)?;
            for (field, label) in [
                (Field::StressCollagen, "Collagen"),
                (Field::StressElastin, "Elastin"),
                (Field::StressMatrix, "Matrix"),
            ] {
                if let Some(values) = result.series(field) {
                    lines.push(Line::new(label, t.clone(), values.to_vec()));
                }
            }
            lines.push(Line::new("Total stress", t.clone(), total));
            if let Some(reference) = overlay(result, protocol, Field::HomeostaticStress) {
                lines.push(Line::new("Homeostatic stress", t.clone(), reference).dashed());
            }
        }
        PlotKind::Mass => {
            lines.push(Line::new(
                "Collagen",
                t.clone(),
                primary(result, Field::FractionCollagen)?,
            ));
            if let Some(values) = result.series(Field::FractionElastin) {
                lines.push(Line::new("Elastin", t.clone(), values.to_vec()));
            }
            let matrix = overlay(result, protocol, Field::FractionMatrix)
                .or_else(|| result.series(Field::FractionMatrix).map(|v| v.to_vec()));
            if let Some(values) = matrix {
                lines.push(Line::new("Matrix", t.clone(), values));
            }
        }
        PlotKind::Unrecognized(ref token) => {
            note = Some(format!("no recognized plot type: {token}"));
        }
    }

    Ok(PlotSpec {
        title: format!("{}\n{}", kind, resolve(protocol.key())),
        x_label: TIME_LABEL,
        y_label: kind.y_label(),
        lines,
        note,
        kind,
    })
}

fn primary(result: &SimulationResult, field: Field) -> Result<Vec<f64>> {
    result.series(field).map(|v| v.to_vec()).ok_or_else(|| {
        Error::new(
            ErrorKind::Plot,
            ErrorCode::MissingSeries,
            Some(field.key().to_owned()),
        )
    })
}

/// A protocol-specific reference line: the trajectory of that name, or the
/// reference value replicated over the time axis.
fn overlay(result: &SimulationResult, protocol: Protocol, field: Field) -> Option<Vec<f64>> {
    if !protocol.supports_overlay(field) {
        return None;
    }
    result.replicated(field)
}

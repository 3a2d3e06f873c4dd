// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::io::{self, Write};

use crate::plot::{Canvas, Line, LineStyle};

/// A canvas that writes what would be drawn as tab-separated text, one row
/// per sample with the series label in the first column.
pub struct TsvCanvas<W: Write> {
    out: W,
    title: String,
    x_label: String,
    y_label: String,
    lines: Vec<Line>,
    notes: Vec<String>,
    error: Option<io::Error>,
}

impl<W: Write> TsvCanvas<W> {
    pub fn new(out: W) -> Self {
        TsvCanvas {
            out,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            lines: Vec::new(),
            notes: Vec::new(),
            error: None,
        }
    }

    /// Returns the writer, or the first write error hit while drawing.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn write_all(&mut self) -> io::Result<()> {
        for line in self.title.lines() {
            writeln!(self.out, "# {line}")?;
        }
        for note in &self.notes {
            writeln!(self.out, "# note: {note}")?;
        }
        writeln!(self.out, "series\t{}\t{}", self.x_label, self.y_label)?;
        for line in &self.lines {
            let label = match line.style {
                LineStyle::Solid => line.label.clone(),
                LineStyle::Dashed => format!("{} (reference)", line.label),
            };
            for (x, y) in line.x.iter().zip(line.y.iter()) {
                writeln!(self.out, "{label}\t{x}\t{y}")?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Canvas for TsvCanvas<W> {
    fn clear(&mut self) {
        self.title.clear();
        self.lines.clear();
        self.notes.clear();
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn plot(&mut self, line: &Line) {
        self.lines.push(line.clone());
    }

    fn note(&mut self, text: &str) {
        self.notes.push(text.to_owned());
    }

    fn set_xlabel(&mut self, label: &str) {
        self.x_label = label.to_owned();
    }

    fn set_ylabel(&mut self, label: &str) {
        self.y_label = label.to_owned();
    }

    fn legend(&mut self) {}

    fn grid(&mut self, _style: LineStyle, _alpha: f64) {}

    fn tight_layout(&mut self) {}

    fn draw(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_all() {
            self.error = Some(err);
        }
    }
}

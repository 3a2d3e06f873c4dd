// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use crate::cache::ComparisonCache;
use crate::plot::{Canvas, Line, TIME_LABEL, finish};
use crate::protocol::{Protocol, resolve};
use crate::results::Field;

pub const TITLE: &str = "Comparison of stress by protocols";
pub const Y_LABEL: &str = "Total stress (kPa)";
pub const ALPHA: f64 = 0.8;

/// Checkbox state on the comparison tab. `None` means there is no checkbox
/// for that protocol, which counts as unchecked.
pub trait CheckboxStates {
    fn is_checked(&self, protocol: Protocol) -> Option<bool>;
}

impl CheckboxStates for BTreeMap<Protocol, bool> {
    fn is_checked(&self, protocol: Protocol) -> Option<bool> {
        self.get(&protocol).copied()
    }
}

/// Protocols picked for comparison, always in the fixed protocol order.
pub fn selected_protocols(checkboxes: &dyn CheckboxStates) -> Vec<Protocol> {
    Protocol::ALL
        .iter()
        .copied()
        .filter(|p| checkboxes.is_checked(*p).unwrap_or(false))
        .collect()
}

/// Draws total stress for each selected protocol that has a cached result.
/// Uncached protocols are skipped; the cache is only read. Returns the
/// protocols actually drawn.
pub fn render(
    selected: &[Protocol],
    cache: &ComparisonCache,
    canvas: &mut dyn Canvas,
) -> Vec<Protocol> {
    canvas.clear();
    canvas.set_title(TITLE);

    let mut drawn = Vec::new();
    for (protocol, result) in cache.iter() {
        if !selected.contains(&protocol) {
            continue;
        }
        let Some(stress) = result.series(Field::StressTotal) else {
            continue;
        };
        let line = Line::new(resolve(protocol.key()), result.time.clone(), stress.to_vec())
            .with_alpha(ALPHA);
        canvas.plot(&line);
        drawn.push(protocol);
    }

    finish(canvas, TIME_LABEL, Y_LABEL);
    drawn
}

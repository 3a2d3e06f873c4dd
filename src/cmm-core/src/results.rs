// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{Error, ErrorCode, ErrorKind, Result};

/// Named trajectories and reference values a model run may produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "lambda")]
    Stretch,
    #[serde(rename = "lambda_target")]
    TargetStretch,
    #[serde(rename = "sigma_c")]
    StressCollagen,
    #[serde(rename = "sigma_e")]
    StressElastin,
    #[serde(rename = "sigma_g")]
    StressMatrix,
    #[serde(rename = "sigma_total")]
    StressTotal,
    #[serde(rename = "sigma0_c")]
    HomeostaticStress,
    #[serde(rename = "J_c")]
    FractionCollagen,
    #[serde(rename = "J_e")]
    FractionElastin,
    #[serde(rename = "J_g")]
    FractionMatrix,
    #[serde(rename = "J_total")]
    FractionTotal,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Stretch => "lambda",
            Field::TargetStretch => "lambda_target",
            Field::StressCollagen => "sigma_c",
            Field::StressElastin => "sigma_e",
            Field::StressMatrix => "sigma_g",
            Field::StressTotal => "sigma_total",
            Field::HomeostaticStress => "sigma0_c",
            Field::FractionCollagen => "J_c",
            Field::FractionElastin => "J_e",
            Field::FractionMatrix => "J_g",
            Field::FractionTotal => "J_total",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Output of one model run.
///
/// Every series has one sample per entry of `time`. References are scalar
/// values (homeostatic stress, matrix fraction) that plots replicate across
/// the time axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    #[serde(default)]
    series: BTreeMap<Field, Vec<f64>>,
    #[serde(default)]
    references: BTreeMap<Field, f64>,
}

impl SimulationResult {
    pub fn new(time: Vec<f64>) -> Self {
        SimulationResult {
            time,
            series: BTreeMap::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn with_series(mut self, field: Field, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.time.len() {
            return Err(mismatched(field, values.len(), self.time.len()));
        }
        self.series.insert(field, values);
        Ok(self)
    }

    pub fn with_reference(mut self, field: Field, value: f64) -> Self {
        self.references.insert(field, value);
        self
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn series(&self, field: Field) -> Option<&[f64]> {
        self.series.get(&field).map(|v| v.as_slice())
    }

    pub fn reference(&self, field: Field) -> Option<f64> {
        self.references.get(&field).copied()
    }

    /// Whether `field` is available either as a trajectory or as a reference.
    pub fn supports(&self, field: Field) -> bool {
        self.series.contains_key(&field) || self.references.contains_key(&field)
    }

    /// Last sample of a trajectory, used for run summaries.
    pub fn last(&self, field: Field) -> Option<f64> {
        self.series(field).and_then(|v| v.last().copied())
    }

    /// The field as a full-length trajectory: the series itself, or the
    /// reference value repeated once per time sample.
    pub fn replicated(&self, field: Field) -> Option<Vec<f64>> {
        if let Some(values) = self.series(field) {
            return Some(values.to_vec());
        }
        self.reference(field).map(|value| vec![value; self.time.len()])
    }

    /// Checks the length invariant; results read from disk or handed back by
    /// a model go through here before they are cached.
    pub fn validate(&self) -> Result<()> {
        for (field, values) in &self.series {
            if values.len() != self.time.len() {
                return Err(mismatched(*field, values.len(), self.time.len()));
            }
        }
        Ok(())
    }
}

fn mismatched(field: Field, got: usize, expected: usize) -> Error {
    Error::new(
        ErrorKind::Simulation,
        ErrorCode::MismatchedLength,
        Some(format!("series '{field}' has {got} samples, time has {expected}")),
    )
}

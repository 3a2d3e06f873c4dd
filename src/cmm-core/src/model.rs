// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The contract with the numerical model.
//!
//! A model is built from a parameter snapshot and then run once per
//! protocol. The model's internals are not this crate's concern; the session
//! only relies on the two calls below.

use std::fmt;

use crate::params::ParameterSnapshot;
use crate::protocol::Protocol;
use crate::results::SimulationResult;

/// Failure reported by a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// Ordinary failure (bad parameters, no convergence, singular system).
    /// The user is told and may retry.
    Failed(String),
    /// The run was cancelled. Callers see this unchanged; it is never
    /// shown as an error message.
    Interrupted,
}

impl ModelError {
    pub fn failed(message: impl Into<String>) -> Self {
        ModelError::Failed(message.into())
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::Failed(message) => write!(f, "{message}"),
            ModelError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for ModelError {}

pub trait MixtureModel {
    fn run(
        &mut self,
        protocol: Protocol,
        use_feedback: bool,
    ) -> Result<SimulationResult, ModelError>;
}

/// Builds a fresh model for each run.
pub trait ModelFactory {
    fn build(&self, snapshot: &ParameterSnapshot) -> Result<Box<dyn MixtureModel>, ModelError>;
}

impl<F> ModelFactory for F
where
    F: Fn(&ParameterSnapshot) -> Result<Box<dyn MixtureModel>, ModelError>,
{
    fn build(&self, snapshot: &ParameterSnapshot) -> Result<Box<dyn MixtureModel>, ModelError> {
        self(snapshot)
    }
}

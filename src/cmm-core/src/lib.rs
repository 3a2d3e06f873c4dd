// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Run orchestration and result comparison for constrained mixture model
//! (CMM) simulations of soft-tissue growth and remodeling.
//!
//! The crate sits between a parameter form and an opaque numerical model:
//! it turns form values into a [`ParameterSnapshot`], runs the model through
//! a [`Session`], keeps the last result per [`Protocol`], and decides which
//! series to put on which axes. Widgets, plotting toolkits and the model
//! itself are reached through the traits in [`params`], [`plot`],
//! [`comparison`], [`persistence`] and [`model`].

#![forbid(unsafe_code)]

pub mod cache;
pub mod common;
pub mod comparison;
pub mod model;
pub mod params;
pub mod persistence;
pub mod plot;
pub mod protocol;
mod results;
pub mod schema;
pub mod session;
mod tsv;

pub use self::cache::{ComparisonCache, FeedbackCache, ResultCache};
pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::model::{MixtureModel, ModelError, ModelFactory};
pub use self::params::{
    FieldValues, ParameterInputs, ParameterSnapshot, apply_defaults_to_fields,
    collect_current_parameters,
};
pub use self::plot::{Canvas, Line, LineStyle, PlotKind, PlotSpec};
pub use self::protocol::{Protocol, resolve};
pub use self::results::{Field, SimulationResult};
pub use self::session::{Message, MessageLevel, RunOutcome, Session, Tab, UiEvent};
pub use self::tsv::TsvCanvas;

// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Parameter snapshots and the bridge to the input controls that edit them.

use std::collections::BTreeMap;

use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::protocol::Protocol;
use crate::schema::{self, PROTOCOL_TYPE, ParameterField};

pub const PROTOCOL: &str = "protocol";
pub const SIM_TIME_HOURS: &str = "sim_time_hours";

const FEEDBACK_GAIN: &str = "K_cplus";
const T_END: &str = "t_end";
const HOURS_PER_DAY: f64 = 24.0;

/// Current-value access to the bound input controls, keyed by schema field
/// name. `value` returns `None` when the control is missing or unreadable.
pub trait ParameterInputs {
    fn value(&self, name: &str) -> Option<f64>;
    fn set_value(&mut self, name: &str, value: f64);
}

/// Plain in-memory stand-in for a form full of spin controls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldValues {
    values: BTreeMap<String, f64>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }
}

impl ParameterInputs for FieldValues {
    fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    fn set_value(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_owned(), value);
    }
}

/// Writes every declared default into its control. Called once, when the
/// form is built.
pub fn apply_defaults_to_fields(inputs: &mut dyn ParameterInputs) {
    for field in schema::fields() {
        inputs.set_value(field.name, field.default);
    }
}

/// Reads every schema field from `inputs` into a fresh snapshot. Nothing
/// partial is ever returned: the first unreadable control aborts the read.
pub fn collect_current_parameters(inputs: &dyn ParameterInputs) -> Result<ParameterSnapshot> {
    let index = read_field(inputs, PROTOCOL_TYPE)?;
    let protocol = if index.fract() == 0.0 && index >= 0.0 {
        Protocol::from_index(index as usize)
    } else {
        None
    };
    let protocol = protocol.ok_or_else(|| {
        Error::new(
            ErrorKind::ParameterRead,
            ErrorCode::BadProtocolIndex,
            Some(format!("{PROTOCOL_TYPE} = {index}")),
        )
    })?;

    let mut values = BTreeMap::new();
    for field in schema::numeric_fields() {
        values.insert(field.name, read_field(inputs, field.name)?);
    }

    ParameterSnapshot::build(protocol, values)
}

fn read_field(inputs: &dyn ParameterInputs, name: &str) -> Result<f64> {
    match inputs.value(name) {
        Some(value) if value.is_finite() => Ok(value),
        Some(value) => Err(Error::new(
            ErrorKind::ParameterRead,
            ErrorCode::NotANumber,
            Some(format!("{name} = {value}")),
        )),
        None => Err(Error::new(
            ErrorKind::ParameterRead,
            ErrorCode::UnreadableField,
            Some(name.to_owned()),
        )),
    }
}

/// The complete, fixed-shape set of inputs for one run.
///
/// Holds the protocol, every numeric schema field except the protocol
/// selector, and the derived `sim_time_hours`. Snapshots are never edited in
/// place; the `with_*` methods return a rebuilt copy.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSnapshot {
    protocol: Protocol,
    values: BTreeMap<&'static str, f64>,
    sim_time_hours: f64,
}

impl ParameterSnapshot {
    pub fn defaults() -> Self {
        let values = schema::numeric_fields()
            .map(|f| (f.name, f.default))
            .collect();
        ParameterSnapshot {
            protocol: Protocol::ALL[0],
            sim_time_hours: derive_sim_time_hours(&values),
            values,
        }
    }

    /// Builds a snapshot from values of unknown provenance. Every numeric
    /// field must be present; out-of-range values are clamped, non-finite
    /// ones rejected, unrecognised names ignored.
    pub fn from_values<'a, I>(protocol: Protocol, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut known = BTreeMap::new();
        for (name, value) in values {
            match schema::field(name) {
                Some(field) if field.name != PROTOCOL_TYPE => {
                    known.insert(field.name, value);
                }
                _ => warn!("ignoring unknown parameter '{name}'"),
            }
        }

        for field in schema::numeric_fields() {
            if !known.contains_key(field.name) {
                return Err(Error::new(
                    ErrorKind::Input,
                    ErrorCode::MissingField,
                    Some(field.name.to_owned()),
                ));
            }
        }

        Self::build(protocol, known)
    }

    /// Parses the flat JSON object written by `save_parameters`.
    /// `sim_time_hours` is recomputed rather than read back.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::new(
                ErrorKind::Input,
                ErrorCode::Json,
                Some("expected a JSON object".to_owned()),
            )
        })?;

        let protocol = match object.get(PROTOCOL) {
            Some(Value::String(key)) => key.parse::<Protocol>()?,
            Some(other) => {
                return Err(Error::new(
                    ErrorKind::Input,
                    ErrorCode::UnknownProtocol,
                    Some(other.to_string()),
                ));
            }
            None => {
                return Err(Error::new(
                    ErrorKind::Input,
                    ErrorCode::MissingField,
                    Some(PROTOCOL.to_owned()),
                ));
            }
        };

        let mut values = Vec::with_capacity(object.len());
        for (name, value) in object {
            if name == PROTOCOL || name == SIM_TIME_HOURS {
                continue;
            }
            match value.as_f64() {
                Some(number) => values.push((name.as_str(), number)),
                None if schema::field(name).is_some() => {
                    return Err(Error::new(
                        ErrorKind::Input,
                        ErrorCode::NotANumber,
                        Some(format!("{name} = {value}")),
                    ));
                }
                None => warn!("ignoring unknown parameter '{name}'"),
            }
        }

        Self::from_values(protocol, values)
    }

    fn build(protocol: Protocol, mut values: BTreeMap<&'static str, f64>) -> Result<Self> {
        for (name, value) in values.iter_mut() {
            let field = schema::field(name).ok_or_else(|| {
                Error::new(
                    ErrorKind::Input,
                    ErrorCode::UnknownField,
                    Some((*name).to_owned()),
                )
            })?;
            *value = checked(field, *value)?;
        }
        Ok(ParameterSnapshot {
            protocol,
            sim_time_hours: derive_sim_time_hours(&values),
            values,
        })
    }

    pub fn with_protocol(&self, protocol: Protocol) -> Self {
        ParameterSnapshot {
            protocol,
            ..self.clone()
        }
    }

    /// Copy with one numeric field replaced (clamped like any other
    /// non-widget value).
    pub fn with_value(&self, name: &str, value: f64) -> Result<Self> {
        let field = schema::field(name)
            .filter(|f| f.name != PROTOCOL_TYPE)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::Input,
                    ErrorCode::UnknownField,
                    Some(name.to_owned()),
                )
            })?;
        let mut values = self.values.clone();
        values.insert(field.name, value);
        Self::build(self.protocol, values)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            SIM_TIME_HOURS => Some(self.sim_time_hours),
            _ => self.values.get(name).copied(),
        }
    }

    pub fn sim_time_hours(&self) -> f64 {
        self.sim_time_hours
    }

    /// Feedback mode is on iff the simulated duration is positive.
    pub fn use_feedback(&self) -> bool {
        self.sim_time_hours > 0.0
    }

    pub fn n_points(&self) -> usize {
        self.values.get("n_points").copied().unwrap_or_default() as usize
    }

    /// Snapshot keys in save order: protocol, the numeric schema fields,
    /// then the derived control value.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(PROTOCOL)
            .chain(schema::numeric_fields().map(|f| f.name))
            .chain(std::iter::once(SIM_TIME_HOURS))
    }

    pub fn len(&self) -> usize {
        self.values.len() + 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Writes the snapshot back into input controls, e.g. after loading a
    /// saved file.
    pub fn apply_to_fields(&self, inputs: &mut dyn ParameterInputs) {
        inputs.set_value(PROTOCOL_TYPE, self.protocol.index() as f64);
        for (name, value) in &self.values {
            inputs.set_value(name, *value);
        }
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Serialize for ParameterSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        map.serialize_entry(PROTOCOL, &self.protocol)?;
        for field in schema::numeric_fields() {
            let value = self.values[field.name];
            if field.is_integer() {
                map.serialize_entry(field.name, &(value as i64))?;
            } else {
                map.serialize_entry(field.name, &value)?;
            }
        }
        map.serialize_entry(SIM_TIME_HOURS, &self.sim_time_hours)?;
        map.end()
    }
}

fn checked(field: &ParameterField, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::new(
            ErrorKind::Input,
            ErrorCode::NotANumber,
            Some(format!("{} = {}", field.name, value)),
        ));
    }
    let clamped = field.clamp(value);
    if clamped != value {
        warn!(
            "{} = {} outside [{}, {}], using {}",
            field.name, value, field.min, field.max, clamped
        );
    }
    Ok(clamped)
}

fn derive_sim_time_hours(values: &BTreeMap<&'static str, f64>) -> f64 {
    let gain = values.get(FEEDBACK_GAIN).copied().unwrap_or_default();
    if gain > 0.0 {
        values.get(T_END).copied().unwrap_or_default() * HOURS_PER_DAY
    } else {
        0.0
    }
}

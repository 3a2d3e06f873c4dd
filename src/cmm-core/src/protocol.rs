// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{Error, ErrorCode, ErrorKind};
use crate::results::Field;

/// A loading regime; the unit of caching and comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Constant,
    Linear,
    Cyclic,
}

impl Protocol {
    /// Fixed order used by the protocol selector and by comparison plots.
    pub const ALL: [Protocol; 3] = [Protocol::Constant, Protocol::Linear, Protocol::Cyclic];

    pub fn key(self) -> &'static str {
        match self {
            Protocol::Constant => "constant",
            Protocol::Linear => "linear",
            Protocol::Cyclic => "cyclic",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Protocol::Constant => 0,
            Protocol::Linear => 1,
            Protocol::Cyclic => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Protocol> {
        Protocol::ALL.get(index).copied()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Protocol::Constant => "Constant load (0)",
            Protocol::Linear => "Linear load (1)",
            Protocol::Cyclic => "Cyclic load (2)",
        }
    }

    /// Stretch changes over time under this protocol.
    pub fn is_dynamic(self) -> bool {
        !matches!(self, Protocol::Constant)
    }

    /// Reference fields a plot may overlay for this protocol. An overlay is
    /// drawn only when the field is listed here and the result carries it.
    pub fn overlay_fields(self) -> &'static [Field] {
        match self {
            Protocol::Constant => &[Field::HomeostaticStress, Field::FractionMatrix],
            Protocol::Linear | Protocol::Cyclic => &[
                Field::TargetStretch,
                Field::HomeostaticStress,
                Field::FractionMatrix,
            ],
        }
    }

    pub fn supports_overlay(self, field: Field) -> bool {
        self.overlay_fields().contains(&field)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .iter()
            .copied()
            .find(|p| p.key() == s)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::Input,
                    ErrorCode::UnknownProtocol,
                    Some(s.to_owned()),
                )
            })
    }
}

/// Human readable name for a protocol key, or the key itself when unknown.
pub fn resolve(key: &str) -> String {
    match key.parse::<Protocol>() {
        Ok(protocol) => protocol.display_name().to_owned(),
        Err(_) => key.to_owned(),
    }
}

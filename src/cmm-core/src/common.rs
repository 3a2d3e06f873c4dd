// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    Generic,
    UnreadableField,
    UnknownField,
    MissingField,
    NotANumber,
    BadProtocolIndex,
    UnknownProtocol,
    ModelFailed,
    Cancelled,
    MissingSeries,
    MismatchedLength,
    Io,
    Json,
    Export,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            Generic => "generic",
            UnreadableField => "unreadable_field",
            UnknownField => "unknown_field",
            MissingField => "missing_field",
            NotANumber => "not_a_number",
            BadProtocolIndex => "bad_protocol_index",
            UnknownProtocol => "unknown_protocol",
            ModelFailed => "model_failed",
            Cancelled => "cancelled",
            MissingSeries => "missing_series",
            MismatchedLength => "mismatched_length",
            Io => "io",
            Json => "json",
            Export => "export",
        };

        write!(f, "{name}")
    }
}

/// Which stage of a user action produced an error.
///
/// Only `Simulation` and `Persistence` errors are shown to the user; the
/// session turns them into critical messages. `ParameterRead` aborts a run
/// before anything is built, and `Interrupted` is passed through to the
/// caller untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ParameterRead,
    Input,
    Simulation,
    Interrupted,
    Persistence,
    Plot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }

    pub fn is_user_visible(&self) -> bool {
        matches!(self.kind, ErrorKind::Simulation | ErrorKind::Persistence)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::ParameterRead => "ParameterReadError",
            ErrorKind::Input => "InputError",
            ErrorKind::Simulation => "SimulationError",
            ErrorKind::Interrupted => "Interrupted",
            ErrorKind::Persistence => "PersistenceError",
            ErrorKind::Plot => "PlotError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

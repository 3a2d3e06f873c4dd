// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Declarative description of every input the run form exposes.
//!
//! The table is the single source of truth for field names, defaults and
//! ranges: the UI builds its spin controls from it, the parameter store reads
//! values back by name, and snapshots loaded from disk are clamped against it.

/// Field holding the protocol selector as an index into [`crate::Protocol::ALL`].
pub const PROTOCOL_TYPE: &str = "protocol_type";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Protocol,
    Mechanical,
    Initial,
    Remodeling,
    Feedback,
    Simulation,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Protocol,
        Section::Mechanical,
        Section::Initial,
        Section::Remodeling,
        Section::Feedback,
        Section::Simulation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Protocol => "Loading protocol",
            Section::Mechanical => "Mechanical properties",
            Section::Initial => "Initial parameters",
            Section::Remodeling => "Tissue remodeling",
            Section::Feedback => "Mechanical feedback",
            Section::Simulation => "Simulation parameters",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterField {
    pub name: &'static str,
    pub section: Section,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub precision: u8,
    pub tooltip: &'static str,
}

impl ParameterField {
    /// Values come back from spin controls with `precision` decimals; a
    /// precision of zero marks an integer-valued field.
    pub fn is_integer(&self) -> bool {
        self.precision == 0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        if self.is_integer() {
            value.round()
        } else {
            value
        }
    }

    /// Form label derived from the field name, `k_cplus` -> `K Cplus`.
    pub fn label(&self) -> String {
        self.name
            .split('_')
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

macro_rules! field {
    ($section:ident, $name:expr, $default:expr, $min:expr, $max:expr, $step:expr, $precision:expr, $tooltip:expr) => {
        ParameterField {
            name: $name,
            section: Section::$section,
            default: $default,
            min: $min,
            max: $max,
            step: $step,
            precision: $precision,
            tooltip: $tooltip,
        }
    };
}

static FIELDS: [ParameterField; 22] = [
    field!(Protocol, PROTOCOL_TYPE, 0.0, 0.0, 2.0, 1.0, 0, "Protocol type: 0=constant, 1=linear, 2=cyclic"),
    field!(Protocol, "a", 0.1, 0.01, 1.0, 0.01, 3, "Stretch growth rate parameter"),
    field!(Protocol, "lambda_roof", 1.1, 1.0, 2.0, 0.01, 2, "Base tissue stretch"),
    field!(Mechanical, "c_c", 1.0, 0.1, 100.0, 0.1, 2, "Collagen stiffness [kPa]"),
    field!(Mechanical, "c_e", 50.0, 1.0, 200.0, 1.0, 1, "Elastin stiffness [kPa]"),
    field!(Mechanical, "c_g", 10.0, 1.0, 50.0, 1.0, 1, "Matrix stiffness [kPa]"),
    field!(Initial, "fi0_c", 0.75, 0.01, 1.0, 0.01, 2, "Initial collagen content"),
    field!(Initial, "fi0_e", 0.05, 0.01, 1.0, 0.01, 2, "Initial elastin content"),
    field!(Initial, "fi0_g", 0.20, 0.01, 1.0, 0.01, 2, "Initial matrix content"),
    field!(Initial, "lambda0_c", 1.05, 1.0, 2.0, 0.01, 2, "Initial collagen stretch"),
    field!(Initial, "lambda0_e", 1.10, 1.0, 2.0, 0.01, 2, "Initial elastin stretch"),
    field!(Remodeling, "k_cplus", 1.0, 0.0, 10.0, 0.1, 2, "Collagen synthesis rate [1/day]"),
    field!(Remodeling, "k_cminus", 1.0, 0.0, 10.0, 0.1, 2, "Collagen degradation rate [1/day]"),
    field!(Remodeling, "k_eplus", 1.0, 0.0, 10.0, 0.1, 2, "Elastin synthesis rate [1/day]"),
    field!(Remodeling, "k_eminus", 1.0, 0.0, 10.0, 0.1, 2, "Elastin degradation rate [1/day]"),
    field!(Remodeling, "alpha_c", 0.01, 0.0, 0.1, 0.001, 4, "Collagen nonlinearity coefficient"),
    field!(Remodeling, "gamma", 1.0, 0.1, 5.0, 0.1, 1, "Anisotropy parameter"),
    field!(Feedback, "K_cplus", 0.04, 0.0, 0.5, 0.01, 3, "Feedback coefficient"),
    field!(Feedback, "sigma0_c", 1.0, 0.1, 10.0, 0.1, 2, "Homeostatic stress [kPa]"),
    field!(Simulation, "t_end", 10.0, 1.0, 100.0, 1.0, 1, "Simulation time [days]"),
    field!(Simulation, "n_points", 1000.0, 100.0, 10000.0, 100.0, 0, "Number of sampling points"),
    field!(Simulation, "epsilon", 1e-4, 1e-6, 1e-2, 1e-4, 6, "Convergence tolerance"),
];

pub fn fields() -> &'static [ParameterField] {
    &FIELDS
}

pub fn field(name: &str) -> Option<&'static ParameterField> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Every field except the protocol selector, in declaration order.
pub fn numeric_fields() -> impl Iterator<Item = &'static ParameterField> {
    FIELDS.iter().filter(|f| f.name != PROTOCOL_TYPE)
}

pub fn section_fields(section: Section) -> impl Iterator<Item = &'static ParameterField> {
    FIELDS.iter().filter(move |f| f.section == section)
}

// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

use cmm_core::schema::{self, Section};
use cmm_core::{
    ComparisonCache, ParameterSnapshot, Protocol, TsvCanvas, comparison, persistence, plot,
    resolve,
};

#[derive(Parser, Debug)]
#[command(name = "cmm")]
#[command(version)]
#[command(about = "Inspect CMM parameter files and render saved simulation results")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parameter table grouped by section
    Schema,
    /// List the loading protocols
    Protocols,
    /// Write the default parameter set
    Defaults {
        /// Path to write the parameter file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Load a parameter file and print it normalized
    Check {
        /// Parameter file to read
        params: PathBuf,
        /// Override a value, e.g. `--set t_end=20` or `--set protocol=cyclic`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,
    },
    /// Render one saved result as TSV
    Plot {
        /// Result file written by a previous run
        result: PathBuf,
        #[arg(long, value_enum, default_value_t = Kind::Stress)]
        kind: Kind,
        /// Protocol the result was computed for
        #[arg(long, value_parser = parse_protocol)]
        protocol: Protocol,
    },
    /// Render total stress of several saved results as TSV
    Compare {
        /// A cached result, as PROTOCOL=FILE; may be repeated
        #[arg(long = "result", value_name = "PROTOCOL=FILE", required = true)]
        results: Vec<String>,
        /// Leave a protocol unchecked; may be repeated
        #[arg(long, value_parser = parse_protocol)]
        exclude: Vec<Protocol>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Stretch,
    Stress,
    Mass,
}

impl Kind {
    fn token(self) -> &'static str {
        match self {
            Kind::Stretch => "stretch",
            Kind::Stress => "stress",
            Kind::Mass => "mass",
        }
    }
}

fn parse_protocol(s: &str) -> std::result::Result<Protocol, String> {
    s.parse::<Protocol>().map_err(|err| err.to_string())
}

fn split_pair(s: &str) -> Result<(&str, &str)> {
    s.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{s}'"))
}

fn print_schema(out: &mut dyn Write) -> Result<()> {
    for section in Section::ALL {
        writeln!(out, "[{}]", section.title())?;
        for field in schema::section_fields(section) {
            let prec = field.precision as usize;
            writeln!(
                out,
                "  {:<12} {:>10.prec$}  [{}, {}]  {}",
                field.name, field.default, field.min, field.max, field.tooltip
            )?;
        }
    }
    Ok(())
}

fn print_protocols(out: &mut dyn Write) -> Result<()> {
    for protocol in Protocol::ALL {
        writeln!(out, "{}\t{}", protocol.key(), resolve(protocol.key()))?;
    }
    Ok(())
}

fn check(path: &Path, overrides: &[String], out: &mut dyn Write) -> Result<()> {
    let mut snapshot = persistence::load_parameters(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;

    for pair in overrides {
        let (name, value) = split_pair(pair)?;
        snapshot = if name == "protocol" {
            snapshot.with_protocol(value.parse::<Protocol>()?)
        } else {
            let value: f64 = value
                .parse()
                .with_context(|| format!("value for '{name}' is not a number"))?;
            snapshot.with_value(name, value)?
        };
        debug!("override {name} = {value}");
    }

    serde_json::to_writer_pretty(&mut *out, &snapshot)?;
    writeln!(out)?;
    writeln!(
        out,
        "feedback: {}",
        if snapshot.use_feedback() { "on" } else { "off" }
    )?;
    Ok(())
}

fn render_plot(path: &Path, kind: Kind, protocol: Protocol, out: &mut dyn Write) -> Result<()> {
    let result = persistence::load_result(path)
        .with_context(|| format!("reading result from {}", path.display()))?;
    let spec = plot::select(kind.token(), &result, protocol)?;
    let mut canvas = TsvCanvas::new(out);
    spec.render(&mut canvas);
    canvas.finish()?;
    Ok(())
}

fn render_comparison(results: &[String], exclude: &[Protocol], out: &mut dyn Write) -> Result<()> {
    let mut cache = ComparisonCache::new("comparison");
    let mut checkboxes = BTreeMap::new();
    for pair in results {
        let (key, file) = split_pair(pair)?;
        let protocol = key.parse::<Protocol>()?;
        let result = persistence::load_result(Path::new(file))
            .with_context(|| format!("reading result from {file}"))?;
        cache.store(protocol, result.into());
        checkboxes.insert(protocol, !exclude.contains(&protocol));
    }

    let selected = comparison::selected_protocols(&checkboxes);
    let mut canvas = TsvCanvas::new(out);
    let drawn = comparison::render(&selected, &cache, &mut canvas);
    canvas.finish()?;
    info!("compared {} protocol(s)", drawn.len());
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Schema => print_schema(&mut out),
        Command::Protocols => print_protocols(&mut out),
        Command::Defaults { output } => {
            persistence::save_parameters(&ParameterSnapshot::defaults(), Some(&output))
                .with_context(|| format!("writing {}", output.display()))?;
            Ok(())
        }
        Command::Check { params, overrides } => check(&params, &overrides, &mut out),
        Command::Plot {
            result,
            kind,
            protocol,
        } => render_plot(&result, kind, protocol, &mut out),
        Command::Compare { results, exclude } => render_comparison(&results, &exclude, &mut out),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    run(Args::parse())
}

// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Per-window application state: the current model, the last result, the
//! two result caches, and the queue of events the UI should act on.
//!
//! Everything runs on the caller's thread. A run blocks until the model
//! returns; there is no cancellation beyond what the model itself reports.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use crate::cache::{ComparisonCache, FeedbackCache};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::comparison::{self, CheckboxStates};
use crate::model::{MixtureModel, ModelError, ModelFactory};
use crate::params::{ParameterInputs, ParameterSnapshot, collect_current_parameters};
use crate::persistence::{self, Figure};
use crate::plot::{self, Canvas};
use crate::protocol::{Protocol, resolve};
use crate::results::{Field, SimulationResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tab {
    Control,
    Visualization,
    Comparison,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Information,
    Warning,
    Critical,
}

/// Body and title for a modal message box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub title: String,
    pub body: String,
}

impl Message {
    fn new(level: MessageLevel, title: &str, body: String) -> Self {
        Message {
            level,
            title: title.to_owned(),
            body,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    StatusChanged(String),
    PlotNeedsRedraw,
    ShowTab(Tab),
    Message(Message),
}

/// What happened to a run that got as far as the model.
#[derive(Clone, Debug)]
pub enum RunOutcome {
    Completed(Rc<SimulationResult>),
    /// The model failed; the user has been told and the caches are as they
    /// were.
    Failed(Error),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

pub struct Session<F: ModelFactory> {
    factory: F,
    model: Option<Box<dyn MixtureModel>>,
    last: Option<(Protocol, Rc<SimulationResult>)>,
    feedback: Option<FeedbackCache>,
    comparison: ComparisonCache,
    events: Vec<UiEvent>,
}

impl<F: ModelFactory> Session<F> {
    pub fn new(factory: F) -> Self {
        Session {
            factory,
            model: None,
            last: None,
            feedback: None,
            comparison: ComparisonCache::new("comparison"),
            events: Vec::new(),
        }
    }

    /// Reads the form and runs it. An unreadable field aborts before the
    /// model is touched and is returned to the caller, not shown.
    pub fn run_from_inputs(&mut self, inputs: &dyn ParameterInputs) -> Result<RunOutcome> {
        let snapshot = collect_current_parameters(inputs)?;
        self.run_simulation(&snapshot)
    }

    /// Builds a model from `snapshot`, runs it for the snapshot's protocol
    /// and records the result.
    ///
    /// Model failures are reported as a critical message and come back as
    /// [`RunOutcome::Failed`]; no cache is written in that case. A cancelled
    /// run is returned as an `Interrupted` error and reported to no one.
    pub fn run_simulation(&mut self, snapshot: &ParameterSnapshot) -> Result<RunOutcome> {
        let protocol = snapshot.protocol();
        let use_feedback = snapshot.use_feedback();
        info!("running protocol {protocol} (feedback: {use_feedback})");

        if self.feedback.is_none() {
            self.feedback = Some(FeedbackCache::new("feedback"));
        }

        let result = match self.invoke(snapshot, protocol, use_feedback) {
            Ok(result) => Rc::new(result),
            Err(err) if err.kind == ErrorKind::Interrupted => return Err(err),
            Err(err) => {
                warn!("simulation failed: {err}");
                let body = format!(
                    "Calculation failed:\n{}",
                    err.get_details().unwrap_or_else(|| err.to_string())
                );
                self.events
                    .push(UiEvent::StatusChanged("Simulation failed".to_owned()));
                self.events.push(UiEvent::Message(Message::new(
                    MessageLevel::Critical,
                    "Simulation error",
                    body,
                )));
                return Ok(RunOutcome::Failed(err));
            }
        };

        if let Some(feedback) = self.feedback.as_mut() {
            feedback.store(protocol, Rc::clone(&result));
        }
        self.comparison.store(protocol, Rc::clone(&result));
        self.last = Some((protocol, Rc::clone(&result)));

        self.events.push(UiEvent::StatusChanged(format!(
            "Simulation completed: {}",
            resolve(protocol.key())
        )));
        self.events.push(UiEvent::PlotNeedsRedraw);
        self.events.push(UiEvent::ShowTab(Tab::Visualization));
        self.events.push(UiEvent::Message(Message::new(
            MessageLevel::Information,
            "Simulation completed",
            summary(protocol, use_feedback, &result),
        )));

        Ok(RunOutcome::Completed(result))
    }

    /// Runs every protocol in the fixed order from one parameter set, each
    /// through [`Session::run_simulation`]. A failed protocol is reported
    /// and skipped; an interruption stops the sweep and is returned.
    pub fn run_all(&mut self, snapshot: &ParameterSnapshot) -> Result<Vec<(Protocol, RunOutcome)>> {
        let mut outcomes = Vec::with_capacity(Protocol::ALL.len());
        for protocol in Protocol::ALL {
            let outcome = self.run_simulation(&snapshot.with_protocol(protocol))?;
            outcomes.push((protocol, outcome));
        }
        let completed = outcomes.iter().filter(|(_, o)| o.is_completed()).count();
        info!("ran all protocols: {completed} of {} completed", outcomes.len());
        Ok(outcomes)
    }

    fn invoke(
        &mut self,
        snapshot: &ParameterSnapshot,
        protocol: Protocol,
        use_feedback: bool,
    ) -> Result<SimulationResult> {
        let model = self.factory.build(snapshot).map_err(model_error)?;
        let model = self.model.insert(model);
        let result = model.run(protocol, use_feedback).map_err(model_error)?;
        result.validate()?;
        Ok(result)
    }

    /// Redraws the single-result view. Does nothing until a run has
    /// completed. A result missing the plot's primary series leaves the
    /// canvas blank.
    pub fn update_plot(&self, plot_type: &str, canvas: &mut dyn Canvas) -> Result<bool> {
        let Some((protocol, result)) = &self.last else {
            return Ok(false);
        };
        let spec = match plot::select(plot_type, result, *protocol) {
            Ok(spec) => spec,
            Err(err) => {
                canvas.clear();
                canvas.draw();
                return Err(err);
            }
        };
        spec.render(canvas);
        Ok(true)
    }

    /// Redraws the comparison view from cached results only.
    pub fn update_comparison(
        &self,
        checkboxes: &dyn CheckboxStates,
        canvas: &mut dyn Canvas,
    ) -> Vec<Protocol> {
        let selected = comparison::selected_protocols(checkboxes);
        comparison::render(&selected, &self.comparison, canvas)
    }

    /// Saves `snapshot` to `path` and reports the outcome. A `None` path
    /// (cancelled dialog) is silently ignored.
    pub fn save_parameters(
        &mut self,
        snapshot: &ParameterSnapshot,
        path: Option<&Path>,
    ) -> Option<PathBuf> {
        let saved = persistence::save_parameters(snapshot, path);
        self.report_save(saved, "Parameters")
    }

    /// Exports the figure of the frontmost tab: the visualization figure when
    /// that tab is active, the comparison figure otherwise.
    pub fn save_plot(
        &mut self,
        active_tab: Tab,
        visualization: &dyn Figure,
        comparison: &dyn Figure,
        path: Option<&Path>,
    ) -> Option<PathBuf> {
        if self.last.is_none() {
            self.events.push(UiEvent::Message(Message::new(
                MessageLevel::Warning,
                "No data",
                "Run a simulation first".to_owned(),
            )));
            return None;
        }
        let figure = match active_tab {
            Tab::Visualization => visualization,
            Tab::Control | Tab::Comparison => comparison,
        };
        let saved = persistence::save_plot(figure, path);
        self.report_save(saved, "Chart")
    }

    fn report_save(&mut self, saved: Result<Option<PathBuf>>, what: &str) -> Option<PathBuf> {
        match saved {
            Ok(Some(path)) => {
                self.events.push(UiEvent::Message(Message::new(
                    MessageLevel::Information,
                    "Saving complete",
                    format!(
                        "{what} successfully saved to the file:\n{}",
                        path.display()
                    ),
                )));
                Some(path)
            }
            Ok(None) => None,
            Err(err) => {
                warn!("save failed: {err}");
                self.events.push(UiEvent::Message(Message::new(
                    MessageLevel::Critical,
                    "Saving failed",
                    format!(
                        "Could not save:\n{}",
                        err.get_details().unwrap_or_else(|| err.to_string())
                    ),
                )));
                None
            }
        }
    }

    pub fn last_result(&self) -> Option<&Rc<SimulationResult>> {
        self.last.as_ref().map(|(_, result)| result)
    }

    pub fn last_protocol(&self) -> Option<Protocol> {
        self.last.as_ref().map(|(protocol, _)| *protocol)
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn comparison_cache(&self) -> &ComparisonCache {
        &self.comparison
    }

    pub fn feedback_cache(&self) -> Option<&FeedbackCache> {
        self.feedback.as_ref()
    }

    /// Drains the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }
}

fn model_error(err: ModelError) -> Error {
    match err {
        ModelError::Failed(message) => {
            Error::new(ErrorKind::Simulation, ErrorCode::ModelFailed, Some(message))
        }
        ModelError::Interrupted => Error::new(ErrorKind::Interrupted, ErrorCode::Cancelled, None),
    }
}

/// Message body for a completed run.
pub fn summary(protocol: Protocol, use_feedback: bool, result: &SimulationResult) -> String {
    let mut body = format!(
        "Calculation completed successfully!\nProtocol: {}\nMechanical feedback: {}",
        resolve(protocol.key()),
        if use_feedback { "Yes" } else { "No" }
    );
    if let Some(stress) = result.last(Field::StressTotal) {
        body.push_str(&format!("\nFinal stress: {stress:.2} kPa"));
    }
    if let Some(stretch) = result.last(Field::Stretch) {
        body.push_str(&format!("\nFinal stretch: {stretch:.3}"));
    }
    body
}

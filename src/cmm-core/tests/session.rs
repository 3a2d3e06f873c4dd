// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! End-to-end behaviour of a session driven by a stand-in model.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use cmm_core::{
    Canvas, ErrorKind, Field, FieldValues, Line, LineStyle, MessageLevel, MixtureModel,
    ModelError, ModelFactory, ParameterSnapshot, Protocol, RunOutcome, Session, SimulationResult,
    Tab, UiEvent, apply_defaults_to_fields, persistence::Figure,
};
use float_cmp::approx_eq;

#[derive(Clone, Default)]
enum Behaviour {
    #[default]
    Succeed,
    FailBuild(String),
    FailRun(String),
    FailRunFor(Protocol, String),
    Interrupt,
    InterruptAt(Protocol),
}

/// Produces a deterministic result from the snapshot and logs each call.
#[derive(Clone, Default)]
struct StandIn {
    behaviour: Rc<RefCell<Behaviour>>,
    runs: Rc<RefCell<Vec<(Protocol, bool)>>>,
    builds: Rc<Cell<usize>>,
}

struct StandInModel {
    lambda_roof: f64,
    n: usize,
    behaviour: Behaviour,
    runs: Rc<RefCell<Vec<(Protocol, bool)>>>,
}

impl MixtureModel for StandInModel {
    fn run(
        &mut self,
        protocol: Protocol,
        use_feedback: bool,
    ) -> Result<SimulationResult, ModelError> {
        self.runs.borrow_mut().push((protocol, use_feedback));
        match &self.behaviour {
            Behaviour::FailRun(message) => return Err(ModelError::failed(message.clone())),
            Behaviour::FailRunFor(failing, message) if *failing == protocol => {
                return Err(ModelError::failed(message.clone()));
            }
            Behaviour::Interrupt => return Err(ModelError::Interrupted),
            Behaviour::InterruptAt(at) if *at == protocol => return Err(ModelError::Interrupted),
            _ => {}
        }
        let time: Vec<f64> = (0..self.n).map(|i| i as f64).collect();
        let scale = 1.0 + protocol.index() as f64;
        let stretch: Vec<f64> = time.iter().map(|t| self.lambda_roof + 0.01 * t).collect();
        let stress: Vec<f64> = time.iter().map(|t| scale * (1.0 + t)).collect();
        Ok(SimulationResult::new(time)
            .with_series(Field::Stretch, stretch)
            .unwrap()
            .with_series(Field::StressTotal, stress)
            .unwrap()
            .with_reference(Field::HomeostaticStress, 1.0))
    }
}

impl ModelFactory for StandIn {
    fn build(&self, snapshot: &ParameterSnapshot) -> Result<Box<dyn MixtureModel>, ModelError> {
        self.builds.set(self.builds.get() + 1);
        let behaviour = self.behaviour.borrow().clone();
        if let Behaviour::FailBuild(message) = &behaviour {
            return Err(ModelError::failed(message.clone()));
        }
        Ok(Box::new(StandInModel {
            lambda_roof: snapshot.get("lambda_roof").unwrap(),
            n: 4,
            behaviour,
            runs: Rc::clone(&self.runs),
        }))
    }
}

fn snapshot(protocol: Protocol) -> ParameterSnapshot {
    ParameterSnapshot::defaults().with_protocol(protocol)
}

fn messages(events: &[UiEvent]) -> Vec<(MessageLevel, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Message(m) => Some((m.level, m.body.clone())),
            _ => None,
        })
        .collect()
}

#[derive(Default)]
struct Counting {
    plots: Vec<String>,
    draws: usize,
    legends: usize,
}

impl Canvas for Counting {
    fn clear(&mut self) {
        self.plots.clear();
    }
    fn set_title(&mut self, _: &str) {}
    fn plot(&mut self, line: &Line) {
        self.plots.push(line.label.clone());
    }
    fn note(&mut self, _: &str) {}
    fn set_xlabel(&mut self, _: &str) {}
    fn set_ylabel(&mut self, _: &str) {}
    fn legend(&mut self) {
        self.legends += 1;
    }
    fn grid(&mut self, _: LineStyle, _: f64) {}
    fn tight_layout(&mut self) {}
    fn draw(&mut self) {
        self.draws += 1;
    }
}

#[test]
fn feedback_run_populates_both_caches_with_same_result() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    let snap = snapshot(Protocol::Linear);
    assert!(snap.sim_time_hours() > 0.0);

    let outcome = session.run_simulation(&snap).unwrap();
    let RunOutcome::Completed(result) = outcome else {
        panic!("run should complete");
    };

    assert_eq!(vec![(Protocol::Linear, true)], *model.runs.borrow());
    let feedback = session.feedback_cache().unwrap();
    assert!(Rc::ptr_eq(&result, feedback.get(Protocol::Linear).unwrap()));
    assert!(Rc::ptr_eq(
        &result,
        session.comparison_cache().get(Protocol::Linear).unwrap()
    ));
    assert!(Rc::ptr_eq(&result, session.last_result().unwrap()));
    assert!(session.has_model());

    let events = session.take_events();
    assert!(events.contains(&UiEvent::PlotNeedsRedraw));
    assert!(events.contains(&UiEvent::ShowTab(Tab::Visualization)));
    let messages = messages(&events);
    assert_eq!(1, messages.len());
    assert_eq!(MessageLevel::Information, messages[0].0);
    assert!(messages[0].1.contains("Mechanical feedback: Yes"));
    assert!(messages[0].1.contains("Final stress: 8.00 kPa"));
    assert!(messages[0].1.contains("Final stretch: 1.130"));
    assert!(session.take_events().is_empty());
}

#[test]
fn zero_duration_disables_feedback_but_still_caches() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    let snap = snapshot(Protocol::Constant)
        .with_value("K_cplus", 0.0)
        .unwrap();
    assert_eq!(0.0, snap.sim_time_hours());

    assert!(session.run_simulation(&snap).unwrap().is_completed());
    assert_eq!(vec![(Protocol::Constant, false)], *model.runs.borrow());
    assert!(session.feedback_cache().unwrap().contains(Protocol::Constant));
    assert!(session.comparison_cache().contains(Protocol::Constant));
}

#[test]
fn running_one_protocol_leaves_others_alone() {
    let mut session = Session::new(StandIn::default());
    session.run_simulation(&snapshot(Protocol::Constant)).unwrap();
    let constant = Rc::clone(session.comparison_cache().get(Protocol::Constant).unwrap());

    session.run_simulation(&snapshot(Protocol::Cyclic)).unwrap();
    assert!(Rc::ptr_eq(
        &constant,
        session.comparison_cache().get(Protocol::Constant).unwrap()
    ));
    assert_eq!(2, session.comparison_cache().len());
    assert_eq!(Some(Protocol::Cyclic), session.last_protocol());
}

#[test]
fn rerunning_overwrites_with_equal_value() {
    let mut session = Session::new(StandIn::default());
    let snap = snapshot(Protocol::Linear);
    session.run_simulation(&snap).unwrap();
    let first = (**session.comparison_cache().get(Protocol::Linear).unwrap()).clone();

    session.run_simulation(&snap).unwrap();
    assert_eq!(1, session.comparison_cache().len());
    assert_eq!(
        &first,
        session.comparison_cache().get(Protocol::Linear).unwrap().as_ref()
    );
}

#[test]
fn model_failure_is_reported_and_leaves_caches_untouched() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    session.run_simulation(&snapshot(Protocol::Linear)).unwrap();
    session.take_events();
    let comparison_before = session.comparison_cache().clone();
    let feedback_before = session.feedback_cache().cloned();

    *model.behaviour.borrow_mut() = Behaviour::FailRun("singular matrix".to_owned());
    let outcome = session.run_simulation(&snapshot(Protocol::Cyclic)).unwrap();
    let RunOutcome::Failed(err) = outcome else {
        panic!("run should fail");
    };
    assert_eq!(ErrorKind::Simulation, err.kind);

    assert_eq!(&comparison_before, session.comparison_cache());
    assert_eq!(feedback_before.as_ref(), session.feedback_cache());
    assert_eq!(Some(Protocol::Linear), session.last_protocol());

    let messages = messages(&session.take_events());
    assert_eq!(1, messages.len());
    assert_eq!(MessageLevel::Critical, messages[0].0);
    assert!(messages[0].1.contains("singular matrix"));

    // the user can retry straight away
    *model.behaviour.borrow_mut() = Behaviour::Succeed;
    assert!(session.run_simulation(&snapshot(Protocol::Cyclic)).unwrap().is_completed());
    assert!(session.comparison_cache().contains(Protocol::Cyclic));
}

#[test]
fn build_failure_never_runs_the_model() {
    let model = StandIn::default();
    *model.behaviour.borrow_mut() = Behaviour::FailBuild("bad parameters".to_owned());
    let mut session = Session::new(model.clone());

    let outcome = session.run_simulation(&snapshot(Protocol::Constant)).unwrap();
    assert!(!outcome.is_completed());
    assert!(model.runs.borrow().is_empty());
    assert!(!session.has_model());
    assert!(session.comparison_cache().is_empty());
    assert!(session.feedback_cache().unwrap().is_empty());
}

#[test]
fn interruption_propagates_without_a_message() {
    let model = StandIn::default();
    *model.behaviour.borrow_mut() = Behaviour::Interrupt;
    let mut session = Session::new(model.clone());

    let err = session.run_simulation(&snapshot(Protocol::Linear)).unwrap_err();
    assert_eq!(ErrorKind::Interrupted, err.kind);
    assert!(messages(&session.take_events()).is_empty());
    assert!(session.comparison_cache().is_empty());
}

#[test]
fn unreadable_form_aborts_before_building() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    let mut inputs = FieldValues::new();
    apply_defaults_to_fields(&mut inputs);
    inputs.remove("epsilon");

    let err = session.run_from_inputs(&inputs).unwrap_err();
    assert_eq!(ErrorKind::ParameterRead, err.kind);
    assert_eq!(0, model.builds.get());
    assert!(session.take_events().is_empty());
    assert!(session.feedback_cache().is_none());
}

#[test]
fn run_from_inputs_uses_form_values() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    let mut inputs = FieldValues::new();
    apply_defaults_to_fields(&mut inputs);
    cmm_core::ParameterInputs::set_value(&mut inputs, "protocol_type", 2.0);
    cmm_core::ParameterInputs::set_value(&mut inputs, "lambda_roof", 1.5);

    session.run_from_inputs(&inputs).unwrap();
    let result = session.last_result().unwrap();
    assert!(approx_eq!(
        f64,
        1.5,
        result.series(Field::Stretch).unwrap()[0],
        ulps = 2
    ));
    assert_eq!(vec![(Protocol::Cyclic, true)], *model.runs.borrow());
}

#[test]
fn plot_is_a_no_op_before_first_run() {
    let session = Session::new(StandIn::default());
    let mut canvas = Counting::default();
    assert!(!session.update_plot("stress", &mut canvas).unwrap());
    assert_eq!(0, canvas.draws);
}

#[test]
fn plot_uses_last_run_protocol() {
    let mut session = Session::new(StandIn::default());
    session.run_simulation(&snapshot(Protocol::Cyclic)).unwrap();
    let mut canvas = Counting::default();
    assert!(session.update_plot("stress", &mut canvas).unwrap());
    assert_eq!(vec!["Total stress", "Homeostatic stress"], canvas.plots);
    assert_eq!(1, canvas.draws);

    let err = session.update_plot("mass", &mut canvas).unwrap_err();
    assert_eq!(ErrorKind::Plot, err.kind);
    // the stale stress plot is not left behind the error
    assert!(canvas.plots.is_empty());
    assert_eq!(2, canvas.draws);
}

#[test]
fn comparison_reads_cache_only() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    session.run_simulation(&snapshot(Protocol::Cyclic)).unwrap();
    session.run_simulation(&snapshot(Protocol::Constant)).unwrap();
    let cache_before = session.comparison_cache().clone();
    let runs_before = model.runs.borrow().len();

    let mut boxes = BTreeMap::new();
    boxes.insert(Protocol::Cyclic, true);
    boxes.insert(Protocol::Linear, true);
    boxes.insert(Protocol::Constant, true);

    let mut canvas = Counting::default();
    let drawn = session.update_comparison(&boxes, &mut canvas);
    assert_eq!(vec![Protocol::Constant, Protocol::Cyclic], drawn);
    assert_eq!(vec!["Constant load (0)", "Cyclic load (2)"], canvas.plots);
    assert_eq!(1, canvas.draws);
    assert_eq!(1, canvas.legends);
    assert_eq!(&cache_before, session.comparison_cache());
    assert_eq!(runs_before, model.runs.borrow().len());
}

#[test]
fn comparison_with_empty_cache_finishes_once() {
    let session = Session::new(StandIn::default());
    let mut boxes = BTreeMap::new();
    boxes.insert(Protocol::Linear, true);
    let mut canvas = Counting::default();
    assert!(session.update_comparison(&boxes, &mut canvas).is_empty());
    assert!(canvas.plots.is_empty());
    assert_eq!(1, canvas.draws);
    assert_eq!(1, canvas.legends);
}

#[test]
fn feedback_cache_persists_across_feedback_toggles() {
    let mut session = Session::new(StandIn::default());
    session.run_simulation(&snapshot(Protocol::Linear)).unwrap();
    let off = snapshot(Protocol::Constant).with_value("K_cplus", 0.0).unwrap();
    session.run_simulation(&off).unwrap();
    session.run_simulation(&snapshot(Protocol::Cyclic)).unwrap();

    let feedback = session.feedback_cache().unwrap();
    assert_eq!(3, feedback.len());
    assert!(feedback.contains(Protocol::Linear));
}

struct FileFigure(&'static str);

impl Figure for FileFigure {
    fn save(&self, path: &Path, _dpi: u32, _tight: bool) -> std::io::Result<()> {
        std::fs::write(path, self.0)
    }
}

#[test]
fn save_plot_requires_a_result_and_follows_active_tab() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.png");
    let main = FileFigure("main");
    let compare = FileFigure("compare");
    let mut session = Session::new(StandIn::default());

    assert_eq!(
        None,
        session.save_plot(Tab::Visualization, &main, &compare, Some(&path))
    );
    let events = messages(&session.take_events());
    assert_eq!(MessageLevel::Warning, events[0].0);
    assert!(!path.exists());

    session.run_simulation(&snapshot(Protocol::Linear)).unwrap();
    session.take_events();

    session.save_plot(Tab::Comparison, &main, &compare, Some(&path));
    assert_eq!("compare", std::fs::read_to_string(&path).unwrap());
    session.save_plot(Tab::Visualization, &main, &compare, Some(&path));
    assert_eq!("main", std::fs::read_to_string(&path).unwrap());

    let events = messages(&session.take_events());
    assert_eq!(2, events.len());
    assert!(events[1].1.contains(&path.display().to_string()));

    assert_eq!(None, session.save_plot(Tab::Visualization, &main, &compare, None));
    assert!(session.take_events().is_empty());
}

#[test]
fn save_parameters_reports_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(StandIn::default());
    let snap = snapshot(Protocol::Cyclic);

    assert_eq!(None, session.save_parameters(&snap, None));
    assert!(session.take_events().is_empty());

    let path = dir.path().join("params.json");
    assert_eq!(Some(path.clone()), session.save_parameters(&snap, Some(&path)));
    let events = messages(&session.take_events());
    assert_eq!(MessageLevel::Information, events[0].0);
    assert!(events[0].1.contains("params.json"));

    let bad = dir.path().join("no-such-dir").join("params.json");
    assert_eq!(None, session.save_parameters(&snap, Some(&bad)));
    let events = messages(&session.take_events());
    assert_eq!(MessageLevel::Critical, events[0].0);
}

#[test]
fn run_all_fills_every_protocol_in_order() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    let snap = snapshot(Protocol::Cyclic);

    let outcomes = session.run_all(&snap).unwrap();
    let order: Vec<Protocol> = outcomes.iter().map(|(p, _)| *p).collect();
    assert_eq!(Protocol::ALL.to_vec(), order);
    assert!(outcomes.iter().all(|(_, o)| o.is_completed()));

    let runs: Vec<Protocol> = model.runs.borrow().iter().map(|(p, _)| *p).collect();
    assert_eq!(Protocol::ALL.to_vec(), runs);
    assert_eq!(3, session.comparison_cache().len());
    assert_eq!(3, session.feedback_cache().unwrap().len());
    assert_eq!(Some(Protocol::Cyclic), session.last_protocol());
}

#[test]
fn run_all_skips_a_failing_protocol() {
    let model = StandIn::default();
    let mut session = Session::new(model.clone());
    session.run_simulation(&snapshot(Protocol::Linear)).unwrap();
    let linear = Rc::clone(session.comparison_cache().get(Protocol::Linear).unwrap());
    session.take_events();

    *model.behaviour.borrow_mut() =
        Behaviour::FailRunFor(Protocol::Linear, "singular matrix".to_owned());
    let outcomes = session.run_all(&snapshot(Protocol::Constant)).unwrap();
    assert!(outcomes[0].1.is_completed());
    assert!(!outcomes[1].1.is_completed());
    assert!(outcomes[2].1.is_completed());

    assert!(session.comparison_cache().contains(Protocol::Constant));
    assert!(session.comparison_cache().contains(Protocol::Cyclic));
    assert!(Rc::ptr_eq(
        &linear,
        session.comparison_cache().get(Protocol::Linear).unwrap()
    ));

    let messages = messages(&session.take_events());
    let critical: Vec<_> = messages
        .iter()
        .filter(|(level, _)| *level == MessageLevel::Critical)
        .collect();
    assert_eq!(1, critical.len());
    assert!(critical[0].1.contains("singular matrix"));
}

#[test]
fn run_all_stops_at_interruption() {
    let model = StandIn::default();
    *model.behaviour.borrow_mut() = Behaviour::InterruptAt(Protocol::Linear);
    let mut session = Session::new(model.clone());

    let err = session.run_all(&snapshot(Protocol::Constant)).unwrap_err();
    assert_eq!(ErrorKind::Interrupted, err.kind);
    assert_eq!(2, model.runs.borrow().len());
    assert!(session.comparison_cache().contains(Protocol::Constant));
    assert!(!session.comparison_cache().contains(Protocol::Linear));
    assert!(!session.comparison_cache().contains(Protocol::Cyclic));
}

// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;

use crate::protocol::Protocol;
use crate::results::SimulationResult;

/// Last result per protocol. Entries are overwritten on every store and
/// never pruned; storing one protocol never touches another.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultCache {
    name: &'static str,
    entries: BTreeMap<Protocol, Rc<SimulationResult>>,
}

/// Results read by the comparison view.
pub type ComparisonCache = ResultCache;
/// Results recorded while feedback mode decisions are tracked.
pub type FeedbackCache = ResultCache;

impl ResultCache {
    pub fn new(name: &'static str) -> Self {
        ResultCache {
            name,
            entries: BTreeMap::new(),
        }
    }

    pub fn store(&mut self, protocol: Protocol, result: Rc<SimulationResult>) {
        let replaced = self.entries.insert(protocol, result).is_some();
        debug!(
            "{} cache: stored {} ({})",
            self.name,
            protocol,
            if replaced { "overwrite" } else { "new" }
        );
    }

    pub fn get(&self, protocol: Protocol) -> Option<&Rc<SimulationResult>> {
        self.entries.get(&protocol)
    }

    pub fn contains(&self, protocol: Protocol) -> bool {
        self.entries.contains_key(&protocol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached entries in the fixed protocol order.
    pub fn iter(&self) -> impl Iterator<Item = (Protocol, &Rc<SimulationResult>)> {
        self.entries.iter().map(|(p, r)| (*p, r))
    }
}

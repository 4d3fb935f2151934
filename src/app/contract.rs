// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::CompositionError;
use crate::pipeline::{Pipeline, SlotKind, SlotMapping};

/// External surface of an app pipeline. Every map goes from the name a caller
/// uses to the slot name inside the wrapped pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppContract {
    pub inputs: SlotMapping,
    pub parameters: SlotMapping,
    pub artifacts: SlotMapping,
    pub outputs: SlotMapping,
}

impl AppContract {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
            && self.parameters.is_empty()
            && self.artifacts.is_empty()
            && self.outputs.is_empty()
    }

    /// Check every internal name against `pipeline`.
    ///
    /// Inputs and artifacts must be free inputs, parameters must be parameter
    /// slots, and outputs may be any produced dataset. A slot reachable from
    /// two external names (or listed both as an input and an artifact) is a
    /// conflict.
    pub(crate) fn validate(&self, app: &str, pipeline: &Pipeline) -> Result<(), CompositionError> {
        let free_inputs = pipeline.free_inputs();
        let parameters = pipeline.parameters();
        let outputs = pipeline.all_outputs();

        let context = format!("app pipeline '{}'", app);
        let checks = [
            (SlotKind::Input, &self.inputs, &free_inputs),
            (SlotKind::Artifact, &self.artifacts, &free_inputs),
            (SlotKind::Parameter, &self.parameters, &parameters),
            (SlotKind::Output, &self.outputs, &outputs),
        ];
        for (kind, mapping, available) in checks {
            if let Some(slot) = mapping.values().find(|v| !available.contains(*v)) {
                return Err(CompositionError::UnresolvedSlot {
                    kind,
                    slot: slot.to_string(),
                    context,
                });
            }
        }

        let conflict = |slot: &str| CompositionError::ConflictingContract {
            app: app.to_string(),
            slot: slot.to_string(),
        };

        let mut sourced: BTreeMap<&str, SlotKind> = BTreeMap::new();
        for (kind, mapping) in [
            (SlotKind::Input, &self.inputs),
            (SlotKind::Artifact, &self.artifacts),
        ] {
            for slot in mapping.values() {
                if sourced.insert(slot, kind).is_some() {
                    return Err(conflict(slot));
                }
            }
        }
        for mapping in [&self.parameters, &self.outputs] {
            let mut seen = BTreeSet::new();
            if let Some(slot) = mapping.values().find(|v| !seen.insert(*v)) {
                return Err(conflict(slot));
            }
        }

        Ok(())
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Security label convergence step, run last in every create action.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::label_policy::{self, LabelDecision};
use crate::domain::resource::{CurrentState, DesiredObject};
use crate::domain::security_label::SecurityContextResolver;

pub struct LabelConverger {
    resolver: Arc<dyn SecurityContextResolver>,
}

impl LabelConverger {
    pub fn new(resolver: Arc<dyn SecurityContextResolver>) -> Self {
        Self { resolver }
    }

    /// Live label for the snapshot; `None` without touching the host when
    /// MAC is unsupported.
    pub fn inspect(&self, current: &CurrentState) -> Option<String> {
        if !self.resolver.is_supported() {
            return None;
        }
        self.resolver.get_label(current.path.as_path())
    }

    /// Rewrite the label when it matches neither the declared nor the default
    /// label. Returns whether a label was written.
    ///
    /// `created` means the object did not exist when `current` was captured,
    /// so its live label is re-read instead of taken from the snapshot.
    pub fn converge(
        &self,
        desired: &dyn DesiredObject,
        current: &CurrentState,
        created: bool,
    ) -> bool {
        if !self.resolver.is_supported() {
            return false;
        }

        let path = desired.path();
        let live = if created {
            self.resolver.get_label(path.as_path())
        } else {
            current.security_label.clone()
        };

        let decision = label_policy::decide(live.as_deref(), desired.security_label(), || {
            self.resolver
                .get_default_label(path.as_path(), desired.label_lookup_mode())
        });

        match decision {
            LabelDecision::Converged => {
                debug!(path = %path, label = ?live, "Security label already converged");
                false
            }
            LabelDecision::NoTarget => {
                debug!(
                    path = %path,
                    label = ?live,
                    "No declared or default security label; leaving label alone"
                );
                false
            }
            LabelDecision::Apply(label) => {
                if self.resolver.set_label(path.as_path(), &label) {
                    info!(path = %path, from = ?live, to = %label, "Set security label");
                    true
                } else {
                    false
                }
            }
        }
    }
}

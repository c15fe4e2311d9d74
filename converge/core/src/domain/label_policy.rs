// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Label Convergence Policy
//!
//! Decides whether an object's live label needs rewriting. A label is already
//! correct when it equals the declared label *or* the policy default for the
//! path, so an undeclared label never flaps against the default.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure decision function, no host access

/// Outcome of evaluating the label policy for one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelDecision {
    /// Current label matches the declared label or the default.
    Converged,
    /// Label must be rewritten to this value.
    Apply(String),
    /// Label differs but neither a declared nor a default label exists.
    NoTarget,
}

/// Evaluate the policy.
///
/// `default` is only consulted when `current` differs from `desired`, so
/// callers may compute it lazily.
pub fn decide<F>(current: Option<&str>, desired: Option<&str>, default: F) -> LabelDecision
where
    F: FnOnce() -> Option<String>,
{
    if current == desired {
        return LabelDecision::Converged;
    }

    let default = default();
    if current == default.as_deref() {
        return LabelDecision::Converged;
    }

    match desired {
        Some(label) => LabelDecision::Apply(label.to_string()),
        None => match default {
            Some(label) => LabelDecision::Apply(label),
            None => LabelDecision::NoTarget,
        },
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequential composition of filter rules.

use std::borrow::Cow;

use crate::rule::FilterRule;

/// An ordered rule sequence composed into one transform.
///
/// Rules run in order, each consuming the previous output. As soon as the
/// text becomes empty the remaining rules are skipped for that input. An
/// empty sequence is the identity transform.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    rules: Vec<FilterRule>,
}

impl FilterPipeline {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// The pipeline with no rules.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Run `input` through every rule. Unchanged input is returned borrowed.
    pub fn apply<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        let mut current = Cow::Borrowed(input);

        for rule in &self.rules {
            if current.is_empty() {
                break;
            }

            let replaced = match rule.apply(&current) {
                // Same-length borrow of the input is the input itself.
                Cow::Borrowed(out) if out.len() == current.len() => None,
                out => Some(out.into_owned()),
            };
            if let Some(out) = replaced {
                current = Cow::Owned(out);
            }
        }

        current
    }
}

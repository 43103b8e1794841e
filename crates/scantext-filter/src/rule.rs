// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filter rules: a scope tag plus one byte-to-byte transform.

use std::borrow::Cow;
use std::fmt;

use regex::bytes::Regex;

use crate::pipeline::FilterPipeline;
use crate::text;

/// Granularity a rule is applied at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Applied to every output line, after trailing whitespace is trimmed.
    Line,
    /// Applied once to the whole assembled document.
    Document,
}

impl Scope {
    /// Parse the scope keyword of a rule line.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "line" => Some(Self::Line),
            "text" | "doc" | "document" => Some(Self::Document),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => f.write_str("line"),
            Self::Document => f.write_str("text"),
        }
    }
}

/// What a rule does to its input.
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Replace the first (or every, when `global`) match of `regex`.
    Substitute {
        regex: Regex,
        replacement: Vec<u8>,
        global: bool,
    },
    /// Empty the input when `regex` matches.
    Delete(Regex),
    /// Empty the input unless `regex` matches.
    Keep(Regex),
    /// Strip leading and trailing whitespace.
    Trim,
    /// Collapse runs of spaces and tabs.
    Squeeze,
}

/// Where a rule was defined, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOrigin {
    pub source: String,
    pub line: usize,
}

/// One compiled filter rule.
#[derive(Debug, Clone)]
pub struct FilterRule {
    pub scope: Scope,
    pub action: RuleAction,
    pub origin: RuleOrigin,
}

impl FilterRule {
    pub fn new(scope: Scope, action: RuleAction, origin: RuleOrigin) -> Self {
        Self {
            scope,
            action,
            origin,
        }
    }

    /// Transform `input`. Borrowed output is always a sub-slice of `input`.
    pub fn apply<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        match &self.action {
            RuleAction::Substitute {
                regex,
                replacement,
                global,
            } => {
                if *global {
                    regex.replace_all(input, replacement.as_slice())
                } else {
                    regex.replace(input, replacement.as_slice())
                }
            }
            RuleAction::Delete(regex) => {
                if regex.is_match(input) {
                    Cow::Borrowed(&input[..0])
                } else {
                    Cow::Borrowed(input)
                }
            }
            RuleAction::Keep(regex) => {
                if regex.is_match(input) {
                    Cow::Borrowed(input)
                } else {
                    Cow::Borrowed(&input[..0])
                }
            }
            RuleAction::Trim => Cow::Borrowed(text::trim(input)),
            RuleAction::Squeeze => Cow::Owned(text::squeeze_blanks(input)),
        }
    }
}

/// Compiled rules split by scope, each in definition order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub line: Vec<FilterRule>,
    pub document: Vec<FilterRule>,
}

impl RuleSet {
    /// Append a rule to the sequence matching its scope.
    pub fn push(&mut self, rule: FilterRule) {
        match rule.scope {
            Scope::Line => self.line.push(rule),
            Scope::Document => self.document.push(rule),
        }
    }

    /// Compose both sequences: `(line pipeline, document pipeline)`.
    pub fn into_pipelines(self) -> (FilterPipeline, FilterPipeline) {
        (
            FilterPipeline::new(self.line),
            FilterPipeline::new(self.document),
        )
    }
}

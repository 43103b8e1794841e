// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scantext-filter — Rule-based post-processing of recognised text.
//
// Filter files are compiled into two ordered rule sequences (line scope and
// document scope). Each sequence is composed into a `FilterPipeline` that
// applies its rules in order and stops as soon as the text becomes empty.

pub mod compiler;
pub mod pipeline;
pub mod rule;
pub mod text;

pub use compiler::{RuleCompiler, compile_files};
pub use pipeline::FilterPipeline;
pub use rule::{FilterRule, RuleAction, RuleSet, Scope};

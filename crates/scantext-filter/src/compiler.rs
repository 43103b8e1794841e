// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rule compiler — turns filter files into an ordered `RuleSet`.
//
// Grammar, one rule per line (blank lines and `#` comments are skipped):
//
//   <scope> <command>
//
//   scope    line | text | doc | document
//   command  s/REGEX/REPLACEMENT/[gi]   substitute (first match, or all with g)
//            d/REGEX/[i]                empty the input when REGEX matches
//            k/REGEX/[i]                empty the input unless REGEX matches
//            trim                       strip surrounding whitespace
//            squeeze                    collapse runs of blanks
//
// Any punctuation character may replace `/` as the delimiter; `\<delim>`
// inside a field stands for a literal delimiter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::bytes::RegexBuilder;
use tracing::{debug, info, instrument};

use scantext_core::error::{Result, ScantextError};

use crate::rule::{FilterRule, RuleAction, RuleOrigin, RuleSet, Scope};

/// Accumulates rules from any number of sources, preserving order.
#[derive(Debug, Default)]
pub struct RuleCompiler {
    rules: RuleSet,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every rule in `reader`, attributing errors to `source_name`.
    pub fn add_source<R: BufRead>(&mut self, reader: R, source_name: &str) -> Result<()> {
        for (number, line) in reader.lines().enumerate() {
            let number = number + 1;
            let line = line.map_err(|e| ScantextError::rule_line(source_name, number, e.to_string()))?;

            let spec = line.trim();
            if spec.is_empty() || spec.starts_with('#') {
                continue;
            }

            let (scope, action) = parse_rule(spec)
                .map_err(|message| ScantextError::rule_line(source_name, number, message))?;
            debug!(source = source_name, line = number, %scope, "rule compiled");

            self.rules.push(FilterRule::new(
                scope,
                action,
                RuleOrigin {
                    source: source_name.to_owned(),
                    line: number,
                },
            ));
        }
        Ok(())
    }

    /// Open and compile one filter file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| ScantextError::rule_source(&name, e.to_string()))?;
        self.add_source(BufReader::new(file), &name)
    }

    /// The rules compiled so far.
    pub fn finish(self) -> RuleSet {
        self.rules
    }
}

/// Compile filter files in the order given.
pub fn compile_files<I, P>(paths: I) -> Result<RuleSet>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut compiler = RuleCompiler::new();
    for path in paths {
        compiler.add_file(path)?;
    }
    let rules = compiler.finish();
    info!(
        line_rules = rules.line.len(),
        text_rules = rules.document.len(),
        "filter rules compiled"
    );
    Ok(rules)
}

/// Parse one non-comment rule line.
fn parse_rule(spec: &str) -> std::result::Result<(Scope, RuleAction), String> {
    let (keyword, command) = match spec.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (spec, ""),
    };

    let scope = Scope::from_keyword(keyword)
        .ok_or_else(|| format!("unknown scope `{keyword}` (expected line or text)"))?;

    if command.is_empty() {
        return Err(format!("missing command after `{keyword}`"));
    }

    let action = match command {
        "trim" => RuleAction::Trim,
        "squeeze" => RuleAction::Squeeze,
        _ => parse_regex_command(command)?,
    };
    Ok((scope, action))
}

fn parse_regex_command(command: &str) -> std::result::Result<RuleAction, String> {
    let mut chars = command.chars();
    let name = chars.next().unwrap_or_default();
    let delimiter = chars
        .next()
        .ok_or_else(|| format!("unknown command `{command}`"))?;

    let fields = match name {
        's' => 2,
        'd' | 'k' => 1,
        _ => return Err(format!("unknown command `{command}`")),
    };
    if delimiter.is_alphanumeric() || delimiter.is_whitespace() || delimiter == '\\' {
        return Err(format!("invalid delimiter `{delimiter}` in `{name}` command"));
    }

    let (parts, flags) = split_fields(chars.as_str(), delimiter, fields)
        .ok_or_else(|| format!("unterminated `{name}` command"))?;

    let mut global = false;
    let mut case_insensitive = false;
    for flag in flags.trim().chars() {
        match flag {
            'g' if name == 's' => global = true,
            'i' => case_insensitive = true,
            other => return Err(format!("unknown flag `{other}` for `{name}` command")),
        }
    }

    let pattern = &parts[0];
    if pattern.is_empty() {
        return Err(format!("empty pattern in `{name}` command"));
    }
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| format!("invalid regular expression: {e}"))?;

    Ok(match name {
        's' => RuleAction::Substitute {
            regex,
            replacement: parts[1].clone().into_bytes(),
            global,
        },
        'd' => RuleAction::Delete(regex),
        _ => RuleAction::Keep(regex),
    })
}

/// Split `body` into `count` delimiter-terminated fields plus the remainder.
///
/// Field 0 is a pattern and the rest are replacements; `\<delimiter>` is
/// rewritten so it stays a literal character in either.
fn split_fields(body: &str, delimiter: char, count: usize) -> Option<(Vec<String>, &str)> {
    let mut fields = Vec::with_capacity(count);
    let mut current = String::new();
    let mut chars = body.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((_, next)) if next == delimiter => {
                    current.push_str(&literal_delimiter(delimiter, fields.len()));
                }
                Some((_, next)) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            }
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
            if fields.len() == count {
                let rest = &body[pos + c.len_utf8()..];
                return Some((fields, rest));
            }
        } else {
            current.push(c);
        }
    }
    None
}

fn literal_delimiter(delimiter: char, field: usize) -> String {
    match (field, delimiter) {
        (0, _) => regex::escape(&delimiter.to_string()),
        (_, '$') => "$$".to_string(),
        _ => delimiter.to_string(),
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Whitespace helpers over raw OCR bytes.
//
// OCR output is usually UTF-8 but nothing guarantees it, so every helper
// works on byte slices: valid UTF-8 is trimmed with Unicode whitespace
// rules, anything else with ASCII rules.

/// Strip trailing whitespace.
pub fn trim_end(bytes: &[u8]) -> &[u8] {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim_end().as_bytes(),
        Err(_) => bytes.trim_ascii_end(),
    }
}

/// Strip leading and trailing whitespace.
pub fn trim(bytes: &[u8]) -> &[u8] {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim().as_bytes(),
        Err(_) => bytes.trim_ascii(),
    }
}

/// Collapse every run of spaces and tabs into a single space.
///
/// Newlines are left alone so the helper is safe on whole documents.
pub fn squeeze_blanks(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut in_run = false;
    for &b in bytes {
        if b == b' ' || b == b'\t' {
            if !in_run {
                out.push(b' ');
            }
            in_run = true;
        } else {
            out.push(b);
            in_run = false;
        }
    }
    out
}

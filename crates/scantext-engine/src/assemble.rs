// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output assembler — per-line filtering of released pages into one buffer.

use scantext_filter::FilterPipeline;
use scantext_filter::text::trim_end;

/// Accumulates the filtered lines of every page, in the order pages are
/// pushed.
#[derive(Debug)]
pub struct DocumentAssembler<'p> {
    line_filter: &'p FilterPipeline,
    buffer: Vec<u8>,
    pages: usize,
    lines: usize,
}

impl<'p> DocumentAssembler<'p> {
    pub fn new(line_filter: &'p FilterPipeline) -> Self {
        Self {
            line_filter,
            buffer: Vec::new(),
            pages: 0,
            lines: 0,
        }
    }

    /// Append one page's recognised text.
    ///
    /// Each line is right-trimmed and passed through the line filter; lines
    /// that come out empty are dropped, the rest are written with a single
    /// trailing newline.
    pub fn push_page(&mut self, raw_text: &[u8]) {
        for line in raw_text.split(|&b| b == b'\n') {
            let line = trim_end(line);
            if line.is_empty() {
                continue;
            }
            let filtered = self.line_filter.apply(line);
            if filtered.is_empty() {
                continue;
            }
            self.buffer.extend_from_slice(&filtered);
            self.buffer.push(b'\n');
            self.lines += 1;
        }
        self.pages += 1;
    }

    /// Pages pushed so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Lines that survived the line filter so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Run the document filter over the whole buffer.
    pub fn finish(self, document_filter: &FilterPipeline) -> Vec<u8> {
        let DocumentAssembler { buffer, .. } = self;
        match document_filter.apply(&buffer) {
            std::borrow::Cow::Borrowed(_) => buffer,
            std::borrow::Cow::Owned(out) => out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scantext_filter::RuleCompiler;

    fn pipelines(rules: &str) -> (FilterPipeline, FilterPipeline) {
        let mut compiler = RuleCompiler::new();
        compiler.add_source(rules.as_bytes(), "test").unwrap();
        compiler.finish().into_pipelines()
    }

    #[test]
    fn no_rules_joins_trimmed_non_empty_lines() {
        let (line, doc) = pipelines("");
        let mut assembler = DocumentAssembler::new(&line);
        assembler.push_page(b"Hello  \r\n\n   \nworld\t");
        assembler.push_page(b"second page\n");

        assert_eq!(assembler.pages(), 2);
        assert_eq!(assembler.lines(), 3);
        assert_eq!(assembler.finish(&doc), b"Hello\nworld\nsecond page\n");
    }

    #[test]
    fn leading_whitespace_is_kept() {
        let (line, doc) = pipelines("");
        let mut assembler = DocumentAssembler::new(&line);
        assembler.push_page(b"    indented  ");
        assert_eq!(assembler.finish(&doc), b"    indented\n");
    }

    #[test]
    fn line_rules_run_per_line_and_drop_emptied_lines() {
        let (line, doc) = pipelines("line d/^Page [0-9]+$/\nline s/colour/color/g\n");
        let mut assembler = DocumentAssembler::new(&line);
        assembler.push_page(b"Page 1\nThe colour of colour\n");
        assembler.push_page(b"Page 2\nend\n");

        assert_eq!(assembler.lines(), 2);
        assert_eq!(assembler.finish(&doc), b"The color of color\nend\n");
    }

    #[test]
    fn document_rules_see_the_whole_buffer_once() {
        let (line, doc) = pipelines("text s/-\\n//g\n");
        let mut assembler = DocumentAssembler::new(&line);
        assembler.push_page(b"hyphen-\nated word\n");
        assert_eq!(assembler.finish(&doc), b"hyphenated word\n");
    }

    #[test]
    fn invalid_utf8_lines_are_trimmed_bytewise() {
        let (line, doc) = pipelines("");
        let mut assembler = DocumentAssembler::new(&line);
        assembler.push_page(b"\xffabc \t\n");
        assert_eq!(assembler.finish(&doc), b"\xffabc\n");
    }

    #[test]
    fn empty_document_stays_empty() {
        let (line, doc) = pipelines("text s/^$/never/\n");
        let assembler = DocumentAssembler::new(&line);
        assert!(assembler.finish(&doc).is_empty());
    }
}

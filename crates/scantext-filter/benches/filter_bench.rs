// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scantext-filter crate: a realistic line
// pipeline run over a synthetic OCR page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scantext_filter::RuleCompiler;

const RULES: &str = r"
# drop running headers and page numbers
line d/^\s*-?\s*\d+\s*-?$/
line d/^CHAPTER [IVX]+$/
# common OCR confusions
line s/\bl\b/I/g
line s/ﬁ/fi/g
line squeeze
text s/-\n(\w)/$1/g
";

fn synthetic_page() -> Vec<Vec<u8>> {
    (0..60)
        .map(|i| match i % 20 {
            0 => b"CHAPTER IV".to_vec(),
            19 => format!("- {i} -").into_bytes(),
            _ => format!("line {i}: the quick brown fox   l jumps over the ﬁeld").into_bytes(),
        })
        .collect()
}

fn bench_line_pipeline(c: &mut Criterion) {
    let mut compiler = RuleCompiler::new();
    compiler
        .add_source(RULES.as_bytes(), "bench")
        .expect("bench rules compile");
    let (line, _text) = compiler.finish().into_pipelines();
    let page = synthetic_page();

    c.bench_function("line_pipeline (60 lines, 5 rules)", |b| {
        b.iter(|| {
            for l in &page {
                black_box(line.apply(black_box(l)));
            }
        });
    });
}

criterion_group!(benches, bench_line_pipeline);
criterion_main!(benches);

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reorder buffer — restores page order from unordered worker completions.
//
// Results are pushed as they arrive and released strictly in index order
// starting at 0. Memory use is proportional to the largest out-of-order gap
// seen, and each push/pop costs O(log n).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::error;

use scantext_core::error::{Result, ScantextError};
use scantext_core::types::{PageIndex, PageResult};

/// Heap entry ordered by page index only.
#[derive(Debug)]
struct Pending(PageResult);

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.0.index == other.0.index
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.index.cmp(&other.0.index)
    }
}

/// Min-heap of early results plus the index expected next.
#[derive(Debug, Default)]
pub struct ReorderBuffer {
    heap: BinaryHeap<Reverse<Pending>>,
    next_expected: PageIndex,
}

impl ReorderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next result to be released.
    pub fn next_expected(&self) -> PageIndex {
        self.next_expected
    }

    /// Number of results held back waiting for an earlier page.
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Indices held back, in ascending order.
    pub fn pending_indices(&self) -> Vec<PageIndex> {
        let mut indices: Vec<_> = self.heap.iter().map(|Reverse(p)| p.0.index).collect();
        indices.sort_unstable();
        indices
    }

    /// Accept one result from the stream.
    ///
    /// A result for a page that was already released is a duplicate and
    /// breaks the exactly-once contract of the producers.
    pub fn push(&mut self, result: PageResult) -> Result<()> {
        if result.index < self.next_expected {
            return Err(self.violation(format!(
                "page index {} produced after it was already emitted",
                result.index
            )));
        }
        self.heap.push(Reverse(Pending(result)));
        Ok(())
    }

    /// Release the next in-order result, if it has arrived.
    pub fn pop_ready(&mut self) -> Result<Option<PageResult>> {
        let Some(Reverse(top)) = self.heap.peek() else {
            return Ok(None);
        };
        let index = top.0.index;

        if index < self.next_expected {
            return Err(self.violation(format!("page index {index} produced twice")));
        }
        if index != self.next_expected {
            return Ok(None);
        }

        let Some(Reverse(Pending(result))) = self.heap.pop() else {
            return Ok(None);
        };
        self.next_expected += 1;
        Ok(Some(result))
    }

    /// Push `result` and collect everything that became releasable.
    pub fn accept(&mut self, result: PageResult) -> Result<Vec<PageResult>> {
        self.push(result)?;
        let mut ready = Vec::new();
        while let Some(result) = self.pop_ready()? {
            ready.push(result);
        }
        Ok(ready)
    }

    /// Close the buffer once the result stream has ended.
    ///
    /// Anything still buffered means some index was never produced: the
    /// output would silently miss pages, so this is an internal error.
    pub fn finish(self) -> Result<()> {
        if self.heap.is_empty() {
            return Ok(());
        }
        let pending = self.pending_indices();
        Err(self.violation(format!(
            "reorder buffer still holds {} result(s) {:?}; page index {} was never produced",
            pending.len(),
            pending,
            self.next_expected
        )))
    }

    fn violation(&self, message: String) -> ScantextError {
        error!(next_expected = self.next_expected, pending = self.heap.len(), "{message}");
        ScantextError::Internal(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: PageIndex) -> PageResult {
        PageResult::success(index, format!("page {index}"))
    }

    fn feed(buffer: &mut ReorderBuffer, arrivals: &[PageIndex]) -> Vec<PageIndex> {
        let mut emitted = Vec::new();
        for &index in arrivals {
            for result in buffer.accept(page(index)).unwrap() {
                emitted.push(result.index);
            }
        }
        emitted
    }

    #[test]
    fn out_of_order_arrivals_are_emitted_in_order() {
        let mut buffer = ReorderBuffer::new();

        assert!(buffer.accept(page(2)).unwrap().is_empty());
        assert_eq!(buffer.pending(), 1);

        let first: Vec<_> = buffer.accept(page(0)).unwrap().iter().map(|r| r.index).collect();
        assert_eq!(first, vec![0]);

        let rest: Vec<_> = buffer.accept(page(1)).unwrap().iter().map(|r| r.index).collect();
        assert_eq!(rest, vec![1, 2]);

        assert!(buffer.is_empty());
        assert_eq!(buffer.next_expected(), 3);
        buffer.finish().unwrap();
    }

    #[test]
    fn every_permutation_of_four_emits_in_order() {
        let mut indices = [0, 1, 2, 3];
        // Heap's algorithm, iterative.
        let mut c = [0usize; 4];
        let mut permutations = vec![indices];
        let mut i = 0;
        while i < 4 {
            if c[i] < i {
                if i % 2 == 0 {
                    indices.swap(0, i);
                } else {
                    indices.swap(c[i], i);
                }
                permutations.push(indices);
                c[i] += 1;
                i = 0;
            } else {
                c[i] = 0;
                i += 1;
            }
        }
        assert_eq!(permutations.len(), 24);

        for arrivals in permutations {
            let mut buffer = ReorderBuffer::new();
            assert_eq!(feed(&mut buffer, &arrivals), vec![0, 1, 2, 3], "{arrivals:?}");
            buffer.finish().unwrap();
        }
    }

    #[test]
    fn gap_is_an_internal_error() {
        let mut buffer = ReorderBuffer::new();
        assert_eq!(feed(&mut buffer, &[0, 1, 3]), vec![0, 1]);
        assert_eq!(buffer.pending_indices(), vec![3]);

        let err = buffer.finish().unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("page index 2 was never produced"), "{err}");
    }

    #[test]
    fn late_duplicate_is_rejected() {
        let mut buffer = ReorderBuffer::new();
        feed(&mut buffer, &[0, 1]);
        assert!(buffer.push(page(0)).unwrap_err().is_internal());
    }

    #[test]
    fn buffered_duplicate_is_rejected() {
        let mut buffer = ReorderBuffer::new();
        buffer.push(page(1)).unwrap();
        buffer.push(page(1)).unwrap();
        let err = buffer.accept(page(0)).unwrap_err();
        assert!(err.to_string().contains("produced twice"), "{err}");
    }

    #[test]
    fn errors_are_released_like_any_result() {
        let mut buffer = ReorderBuffer::new();
        buffer
            .push(PageResult::failure(
                1,
                ScantextError::Ocr {
                    page: 2,
                    message: "boom".into(),
                },
            ))
            .unwrap();
        let ready = buffer.accept(page(0)).unwrap();
        assert_eq!(ready.len(), 2);
        assert!(ready[1].is_error());
    }
}

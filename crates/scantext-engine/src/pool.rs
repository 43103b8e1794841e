// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker pool — recognises page images on a fixed number of OS threads.
//
// All jobs are queued up front on an unbounded channel, so enqueueing never
// blocks. Each worker owns a clone of the result sender; the result stream
// disconnects only after the last worker has exited, which is how the
// consumer tells "more results pending" from "extraction complete".

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, info, warn};

use scantext_core::error::{Result, ScantextError};
use scantext_core::types::{PageJob, PageResult};
use scantext_document::ocr::OcrEngine;

/// Settings shared by every worker.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Requested worker count; clamped to `1..=jobs`.
    pub workers: usize,
    /// Language code handed to the OCR engine.
    pub language: String,
    /// Page number of index 0, used in error messages.
    pub first_page: u32,
}

/// A running set of OCR workers.
pub struct WorkerPool {
    results: Receiver<PageResult>,
    handles: Vec<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Queue `jobs` and start the workers.
    pub fn start(
        jobs: Vec<PageJob>,
        engine: Arc<dyn OcrEngine>,
        settings: &PoolSettings,
    ) -> Result<Self> {
        let workers = settings.workers.clamp(1, jobs.len().max(1));
        let total = jobs.len();

        let (job_tx, job_rx) = unbounded::<PageJob>();
        for job in jobs {
            // The receiver is alive in this scope, so this cannot fail.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let (result_tx, results) = unbounded::<PageResult>();
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let worker = Worker {
                id,
                jobs: job_rx.clone(),
                results: result_tx.clone(),
                engine: Arc::clone(&engine),
                language: settings.language.clone(),
                first_page: settings.first_page,
                cancelled: Arc::clone(&cancelled),
            };
            let spawned = std::thread::Builder::new()
                .name(format!("ocr-worker-{id}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    cancelled.store(true, Ordering::Release);
                    return Err(ScantextError::Internal(format!(
                        "failed to spawn OCR worker {id}: {e}"
                    )));
                }
            }
        }

        info!(workers, jobs = total, engine = engine.name(), "OCR workers started");
        Ok(Self {
            results,
            handles,
            cancelled,
        })
    }

    /// The result stream. Iteration ends once every worker has finished.
    pub fn results(&self) -> &Receiver<PageResult> {
        &self.results
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Stop handing out jobs. Workers finish the page in hand and exit.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Wait for every worker to exit.
    ///
    /// A worker that panicked lost the page it was working on; that shows
    /// up as a gap in the reorder buffer and is reported there.
    pub fn join(mut self) {
        self.join_workers();
    }

    fn join_workers(&mut self) {
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("ocr-worker").to_owned();
            if handle.join().is_err() {
                warn!(worker = %name, "OCR worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.cancel();
            self.join_workers();
        }
    }
}

struct Worker {
    id: usize,
    jobs: Receiver<PageJob>,
    results: Sender<PageResult>,
    engine: Arc<dyn OcrEngine>,
    language: String,
    first_page: u32,
    cancelled: Arc<AtomicBool>,
}

impl Worker {
    fn run(self) {
        let mut done = 0usize;
        while !self.cancelled.load(Ordering::Acquire) {
            let Ok(job) = self.jobs.recv() else {
                break;
            };
            let result = self.recognize(job);
            done += 1;
            if self.results.send(result).is_err() {
                // Consumer is gone; nothing will read further results.
                break;
            }
        }
        debug!(worker = self.id, pages = done, "OCR worker finished");
    }

    fn recognize(&self, job: PageJob) -> PageResult {
        let page = page_number(self.first_page, job.index);
        debug!(worker = self.id, page, image = %job.image_path.display(), "recognising page");

        match self.engine.recognize(&job.image_path, &self.language) {
            Ok(text) => PageResult::success(job.index, text),
            Err(failure) => PageResult::failure(
                job.index,
                ScantextError::Ocr {
                    page,
                    message: failure.diagnostic,
                },
            ),
        }
    }
}

/// Document page number of job `index`; saturates instead of wrapping.
fn page_number(first_page: u32, index: usize) -> u32 {
    first_page.saturating_add(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;

    use scantext_document::ocr::OcrFailure;

    /// Engine returning canned text per image, after a per-image delay.
    #[derive(Default)]
    pub(crate) struct FakeEngine {
        pages: HashMap<PathBuf, (Duration, std::result::Result<String, String>)>,
        pub(crate) calls: Mutex<Vec<PathBuf>>,
    }

    impl FakeEngine {
        pub(crate) fn page(mut self, image: &str, delay_ms: u64, text: &str) -> Self {
            self.pages.insert(
                PathBuf::from(image),
                (Duration::from_millis(delay_ms), Ok(text.to_owned())),
            );
            self
        }

        pub(crate) fn failing(mut self, image: &str, delay_ms: u64, diagnostic: &str) -> Self {
            self.pages.insert(
                PathBuf::from(image),
                (Duration::from_millis(delay_ms), Err(diagnostic.to_owned())),
            );
            self
        }
    }

    impl OcrEngine for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, image: &Path, _language: &str) -> std::result::Result<Vec<u8>, OcrFailure> {
            self.calls.lock().expect("calls lock poisoned").push(image.to_path_buf());
            let (delay, outcome) = self
                .pages
                .get(image)
                .cloned()
                .unwrap_or((Duration::ZERO, Err(format!("unknown image {}", image.display()))));
            std::thread::sleep(delay);
            outcome.map(String::into_bytes).map_err(OcrFailure::new)
        }
    }

    fn settings(workers: usize) -> PoolSettings {
        PoolSettings {
            workers,
            language: "eng".into(),
            first_page: 1,
        }
    }

    #[test]
    fn every_job_produces_exactly_one_result() {
        let engine = FakeEngine::default()
            .page("a", 30, "A")
            .page("b", 0, "B")
            .page("c", 10, "C")
            .page("d", 0, "D");
        let jobs = PageJob::enumerate(["a", "b", "c", "d"]);

        let pool = WorkerPool::start(jobs, Arc::new(engine), &settings(4)).unwrap();
        let mut indices: Vec<_> = pool.results().iter().map(|r| r.index).collect();
        pool.join();

        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn failures_carry_page_numbers_and_do_not_stop_other_workers() {
        let engine = FakeEngine::default()
            .page("a", 0, "A")
            .failing("b", 0, "Error opening data file\nmore detail")
            .page("c", 0, "C");
        let jobs = PageJob::enumerate(["a", "b", "c"]);
        let settings = PoolSettings {
            first_page: 10,
            ..settings(2)
        };

        let pool = WorkerPool::start(jobs, Arc::new(engine), &settings).unwrap();
        let mut results: Vec<_> = pool.results().iter().collect();
        pool.join();
        results.sort_by_key(|r| r.index);

        assert_eq!(results.len(), 3);
        match &results[1].outcome {
            Err(ScantextError::Ocr { page, message }) => {
                assert_eq!(*page, 11);
                assert_eq!(message, "Error opening data file");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(results[2].outcome.is_ok());
    }

    #[test]
    fn page_numbers_saturate_at_the_top_of_the_range() {
        assert_eq!(page_number(10, 2), 12);
        assert_eq!(page_number(u32::MAX - 1, 5), u32::MAX);
        assert_eq!(page_number(1, usize::MAX), u32::MAX);
    }

    #[test]
    fn worker_count_is_clamped_to_job_count() {
        let engine = FakeEngine::default().page("a", 0, "A");
        let pool = WorkerPool::start(PageJob::enumerate(["a"]), Arc::new(engine), &settings(16)).unwrap();
        assert_eq!(pool.worker_count(), 1);
        assert_eq!(pool.results().iter().count(), 1);
    }

    #[test]
    fn empty_job_list_closes_immediately() {
        let pool = WorkerPool::start(Vec::new(), Arc::new(FakeEngine::default()), &settings(4)).unwrap();
        assert_eq!(pool.results().iter().count(), 0);
    }

    #[test]
    fn cancelled_pool_stops_taking_jobs() {
        let engine = Arc::new(
            FakeEngine::default()
                .page("a", 50, "A")
                .page("b", 50, "B")
                .page("c", 50, "C")
                .page("d", 50, "D"),
        );
        let jobs = PageJob::enumerate(["a", "b", "c", "d"]);
        let pool = WorkerPool::start(jobs, engine.clone(), &settings(1)).unwrap();

        let first = pool.results().recv().unwrap();
        assert_eq!(first.index, 0);
        pool.cancel();
        drop(pool);

        // The single worker may have picked up one more page before seeing
        // the flag, but never the whole queue.
        let calls = engine.calls.lock().unwrap().len();
        assert!(calls <= 2, "worker kept going after cancel: {calls} calls");
    }
}

/// The discovery loop run on the background thread.
///
/// Directories are popped from the frontier and listed one level deep.
/// Their matching files are split into chunks of `batch_size`; each chunk
/// is filtered and enriched (on the rayon pool) and handed to the sink as
/// one batch. Every chunk boundary is a checkpoint where a suspension is
/// honoured and a cancellation stops the walk.
use super::control::WorkerControl;
use super::frontier::{PendingDir, SearchFrontier};
use super::sink::{BatchSink, DiscoverySummary};
use super::walker::list_directory;
use crate::config::DiscoveryConfig;
use crate::filter::{CandidateFilter, ExclusionRules};
use crate::metadata::extract_item;
use crate::model::DiscoveredItem;
use rayon::prelude::*;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

enum Outcome {
    Completed,
    Cancelled,
}

struct Worker<S> {
    config: DiscoveryConfig,
    filter: CandidateFilter,
    control: WorkerControl,
    sink: S,
    summary: DiscoverySummary,
}

/// Run one session to completion or cancellation. Exactly one of
/// `on_completed` / `on_cancelled` is called before returning.
pub(crate) fn run<S: BatchSink>(
    roots: Vec<PathBuf>,
    config: DiscoveryConfig,
    control: WorkerControl,
    sink: S,
) {
    let start = Instant::now();
    let filter = CandidateFilter::new(ExclusionRules::default(), config.extension);
    let mut frontier = SearchFrontier::seeded(roots);
    info!("Starting discovery over {} roots", frontier.len());

    let mut worker = Worker {
        config,
        filter,
        control,
        sink,
        summary: DiscoverySummary::default(),
    };

    let outcome = worker.walk(&mut frontier);
    debug!("Visited {} unique directories", frontier.visited_count());

    match outcome {
        Outcome::Completed => {
            worker.summary.elapsed = start.elapsed();
            info!(
                "Discovery complete: {} candidates from {} directories ({} skipped) in {:.2?}",
                worker.summary.candidates_accepted,
                worker.summary.directories_walked,
                worker.summary.directories_skipped,
                worker.summary.elapsed,
            );
            let summary = std::mem::take(&mut worker.summary);
            worker.sink.on_completed(summary);
        }
        Outcome::Cancelled => {
            info!(
                "Discovery cancelled after {} batches",
                worker.summary.batches_dispatched
            );
            worker.sink.on_cancelled();
        }
    }
}

impl<S: BatchSink> Worker<S> {
    fn walk(&mut self, frontier: &mut SearchFrontier) -> Outcome {
        while let Some(PendingDir { dir, root }) = frontier.pop() {
            if !self.control.checkpoint() {
                return Outcome::Cancelled;
            }

            let Some(listing) = list_directory(&dir, self.config.extension) else {
                self.summary.directories_skipped += 1;
                continue;
            };
            self.summary.directories_walked += 1;

            for chunk in listing.files.chunks(self.config.batch_size.max(1)) {
                if !self.control.checkpoint() {
                    return Outcome::Cancelled;
                }

                let items: Vec<DiscoveredItem> = chunk
                    .par_iter()
                    .filter(|path| self.filter.is_candidate_under(&root, path))
                    .map(PathBuf::as_path)
                    .map(extract_item)
                    .collect();

                // A cancel during enrichment discards the batch.
                if self.control.is_cancelled() {
                    return Outcome::Cancelled;
                }

                self.summary.files_considered += chunk.len() as u64;
                self.summary.candidates_accepted += items.len() as u64;
                self.summary.batches_dispatched += 1;
                if !items.is_empty() {
                    debug!(dir = %dir.display(), count = items.len(), "Dispatching batch");
                }
                self.sink.on_batch_ready(items);
                thread::sleep(self.config.idle_yield);
            }

            for subdir in listing.subdirs {
                frontier.push(subdir, root.clone());
            }
        }

        if self.control.complete() {
            Outcome::Completed
        } else {
            Outcome::Cancelled
        }
    }
}

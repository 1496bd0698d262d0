//! Keeps the owning form and the palette in step with the live data.
//!
//! Two independent pipelines live here. [`SnapshotPublisher`] listens to the
//! canvas and republishes the full snapshot after every event.
//! [`PaletteRefresher`] watches catalog revisions and rebuilds palette
//! sections after a per-section debounce. Time is always passed in, so both
//! behave deterministically under test.

mod debounce;

pub use debounce::Debouncer;

use crate::canvas::{Canvas, GraphEvent, GraphListener};
use crate::catalog::{Catalog, Palette, PaletteSection};
use crate::config::DebounceConfig;
use crate::graph::GraphSnapshot;
use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, trace};

/// Receives the full graph snapshot after every change.
pub trait SnapshotSink {
    fn publish(&mut self, snapshot: GraphSnapshot);
}

impl<T: SnapshotSink> SnapshotSink for Rc<RefCell<T>> {
    fn publish(&mut self, snapshot: GraphSnapshot) {
        self.borrow_mut().publish(snapshot);
    }
}

/// Canvas listener that forwards a fresh snapshot to its sink on every event.
pub struct SnapshotPublisher<S> {
    sink: S,
    published: u64,
}

impl<S: SnapshotSink> SnapshotPublisher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, published: 0 }
    }

    /// Number of snapshots published so far.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl<S: SnapshotSink> GraphListener for SnapshotPublisher<S> {
    fn on_event(&mut self, event: &GraphEvent, canvas: &Canvas) {
        trace!(?event, "Publishing snapshot");
        self.sink.publish(canvas.snapshot());
        self.published += 1;
    }
}

/// Rebuilds palette sections when their catalog section changes.
pub struct PaletteRefresher {
    seen: AHashMap<PaletteSection, u64>,
    debouncers: AHashMap<PaletteSection, Debouncer>,
}

impl PaletteRefresher {
    pub fn new(config: &DebounceConfig) -> Self {
        let debouncers = PaletteSection::CATALOG_BACKED
            .into_iter()
            .map(|s| (s, Debouncer::new(config.delay(s))))
            .collect();
        Self {
            seen: AHashMap::new(),
            debouncers,
        }
    }

    /// Records the catalog's current revisions without scheduling anything.
    /// Used right after the palette was initialized from the same catalog.
    pub fn baseline(&mut self, catalog: &Catalog) {
        for section in PaletteSection::CATALOG_BACKED {
            self.seen.insert(section, catalog.revision(section));
        }
    }

    /// Schedules a refresh for every section whose revision moved since the last call.
    pub fn observe(&mut self, catalog: &Catalog, now: Instant) {
        for section in PaletteSection::CATALOG_BACKED {
            let revision = catalog.revision(section);
            let seen = self.seen.entry(section).or_insert(0);
            if *seen == revision {
                continue;
            }
            *seen = revision;
            if let Some(debouncer) = self.debouncers.get_mut(&section) {
                debouncer.schedule(now);
                debug!(%section, revision, "Palette refresh scheduled");
            }
        }
    }

    /// Refreshes every section whose debounce has elapsed.
    ///
    /// Returns the sections that were actually rebuilt; due sections that were
    /// never initialized are skipped.
    pub fn poll(
        &mut self,
        now: Instant,
        catalog: &Catalog,
        palette: &mut Palette,
    ) -> Vec<PaletteSection> {
        PaletteSection::CATALOG_BACKED
            .into_iter()
            .filter(|section| {
                self.debouncers
                    .get_mut(section)
                    .is_some_and(|d| d.take_due(now))
            })
            .filter(|section| palette.refresh(*section, catalog))
            .collect()
    }

    pub fn is_pending(&self, section: PaletteSection) -> bool {
        self.debouncers.get(&section).is_some_and(Debouncer::is_pending)
    }

    /// The earliest pending deadline, for callers that sleep until the next poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncers.values().filter_map(Debouncer::deadline).min()
    }
}

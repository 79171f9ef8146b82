//! Page lifecycle around the patcher.
//!
//! A session is created once per page load. It sweeps as soon as the
//! document is queryable, then keeps the page patched either from mutation
//! records or, on hosts without mutation observation, by re-sweeping on a
//! timer. The `load` event triggers one more sweep for late images.

use std::time::Duration;

use tracing::{debug, warn};

use super::document::Document;
use super::dom::{Dom, MutationRecord, ObserveOptions, ReadyState};
use super::{AssetResolver, FlagPatcher};

/// Upper bound on record delivery rounds in [`PatchSession::drain`].
pub const MAX_DELIVERY_ROUNDS: usize = 16;

/// Default re-sweep interval for the polling fallback.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    DomContentLoaded,
    Load,
}

/// How the session learns about page changes after the first sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ObservationMode {
    /// Native mutation observation.
    #[default]
    Mutations,
    /// Periodic full re-sweep. Changes are picked up within `interval`,
    /// at the cost of one full sweep per tick.
    Polling { interval: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Deferred,
    Running,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub sweeps: usize,
    pub mutation_batches: usize,
    pub patched: usize,
}

pub struct PatchSession<R> {
    patcher: FlagPatcher<R>,
    mode: ObservationMode,
    phase: Phase,
    stats: SessionStats,
}

impl<R: AssetResolver> PatchSession<R> {
    pub fn new(patcher: FlagPatcher<R>) -> Self {
        Self::with_mode(patcher, ObservationMode::default())
    }

    pub fn with_mode(patcher: FlagPatcher<R>, mode: ObservationMode) -> Self {
        Self {
            patcher,
            mode,
            phase: Phase::Idle,
            stats: SessionStats::default(),
        }
    }

    pub fn patcher(&self) -> &FlagPatcher<R> {
        &self.patcher
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_deferred(&self) -> bool {
        self.phase == Phase::Deferred
    }

    /// Entry point at script injection. Defers while the document is loading.
    pub fn start<D: Dom>(&mut self, dom: &mut D, ready: ReadyState) {
        if ready.is_queryable() {
            self.init(dom);
        } else {
            debug!("document still loading, deferring until DOMContentLoaded");
            self.phase = Phase::Deferred;
        }
    }

    /// Sweep once, then begin observing. Runs at most once.
    pub fn init<D: Dom>(&mut self, dom: &mut D) {
        if self.phase == Phase::Running {
            return;
        }
        self.sweep(dom);
        if self.mode == ObservationMode::Mutations {
            dom.observe(&ObserveOptions::image_sources());
        }
        self.phase = Phase::Running;
        debug!(mode = ?self.mode, "flag patcher running");
    }

    pub fn on_event<D: Dom>(&mut self, dom: &mut D, event: PageEvent) {
        match event {
            PageEvent::DomContentLoaded => {
                if self.phase != Phase::Running {
                    self.init(dom);
                }
            }
            PageEvent::Load => {
                if self.phase == Phase::Running {
                    self.sweep(dom);
                } else {
                    self.init(dom);
                }
            }
        }
    }

    /// Handle one observer callback. Returns how many images were rewritten.
    pub fn on_mutations<D: Dom>(&mut self, dom: &mut D, records: &[MutationRecord<D::Node>]) -> usize {
        if self.phase != Phase::Running || self.mode != ObservationMode::Mutations {
            return 0;
        }
        self.stats.mutation_batches += 1;
        let patched = self.patcher.handle_mutations(dom, records);
        self.stats.patched += patched;
        patched
    }

    /// Timer callback for the polling fallback.
    pub fn on_tick<D: Dom>(&mut self, dom: &mut D) -> usize {
        match self.mode {
            ObservationMode::Polling { .. } if self.phase == Phase::Running => self.sweep(dom),
            _ => 0,
        }
    }

    /// Deliver queued records of an in-memory document until it is quiet.
    /// Returns the number of delivery rounds that carried records.
    pub fn drain(&mut self, doc: &mut Document) -> usize {
        let mut rounds = 0;
        loop {
            let records = doc.take_records();
            if records.is_empty() {
                return rounds;
            }
            if rounds == MAX_DELIVERY_ROUNDS {
                warn!(pending = records.len(), "mutation delivery did not settle");
                return rounds;
            }
            rounds += 1;
            self.on_mutations(doc, &records);
        }
    }

    fn sweep<D: Dom>(&mut self, dom: &mut D) -> usize {
        self.stats.sweeps += 1;
        let patched = self.patcher.sweep(dom);
        self.stats.patched += patched;
        patched
    }
}

//! Holder for the current snapshot with atomic regeneration.
//!
//! A regeneration builds a complete new [`StationSnapshot`] without holding
//! any lock, then swaps the shared `Arc` in one write. Readers that cloned
//! the previous `Arc` keep reading the old, complete dataset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rand::Rng;
use tracing::info;

use crate::config::StationConfig;
use crate::error::StationError;

use super::snapshot::{StationSnapshot, resolve_seed};

#[derive(Debug)]
pub struct StationStore {
    config: StationConfig,
    current: RwLock<Arc<StationSnapshot>>,
    next_generation: AtomicU64,
}

impl StationStore {
    /// Generates the first snapshot (generation 1) from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidConfig`] if validation fails.
    pub fn new(config: StationConfig) -> Result<Self, StationError> {
        let snapshot = StationSnapshot::generate(&config, resolve_seed(&config), 1)?;
        Ok(Self {
            config,
            current: RwLock::new(Arc::new(snapshot)),
            next_generation: AtomicU64::new(2),
        })
    }

    /// Current snapshot. Cheap: clones the `Arc` only.
    pub fn snapshot(&self) -> Arc<StationSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Builds a new snapshot and makes it current.
    ///
    /// `seed = None` draws a fresh seed. When two regenerations race, the one
    /// with the higher generation number ends up current.
    ///
    /// # Errors
    ///
    /// Propagates generation errors; the current snapshot is left untouched.
    pub fn regenerate(&self, seed: Option<u64>) -> Result<Arc<StationSnapshot>, StationError> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let fresh = Arc::new(StationSnapshot::generate(&self.config, seed, generation)?);

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if fresh.generation() > current.generation() {
            *current = Arc::clone(&fresh);
        }
        drop(current);

        info!(generation, seed, "snapshot regenerated");
        Ok(fresh)
    }
}

//! Per-statement digest memoization.
//!
//! A [`DigestCache`] normalizes each finished tree at most once, keyed by
//! tree identity. It lives in the statement context, not in global state.

#[cfg(test)]
mod tests;

use crate::{
    config::Config,
    normalize::{NormalizeError, NormalizedPlan, normalize_plan},
    plan::{PlanTree, TreeId},
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, OnceLock, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::{debug, instrument};

type Slot = Arc<OnceLock<Result<Arc<NormalizedPlan>, NormalizeError>>>;

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

///
/// DigestCache
///
/// Compute-once map from [`TreeId`] to its normalization result. The map
/// lock only guards slot lookup; normalization runs under the tree's own
/// `OnceLock`, so concurrent callers on one tree wait for a single
/// computation and callers on other trees never wait.
///

#[derive(Debug)]
pub struct DigestCache {
    config: Config,
    slots: Mutex<HashMap<TreeId, Slot>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl DigestCache {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Normalized form of `tree`, computing it on first request.
    ///
    /// Failures are memoized: every caller sees the same error.
    #[instrument(
        name = "plandigest::cache::get_or_normalize",
        level = "trace",
        skip(self, tree),
        fields(tree = tree.id().get())
    )]
    pub fn get_or_normalize(&self, tree: &PlanTree) -> Result<Arc<NormalizedPlan>, NormalizeError> {
        let slot = self.slot(tree.id());

        let mut computed = false;
        let result = slot.get_or_init(|| {
            computed = true;
            normalize_plan(tree, &self.config).map(Arc::new)
        });

        // Stats are advisory; relaxed ordering suffices.
        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("digest cache miss");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("digest cache hit");
        }

        result.clone()
    }

    /// Drop the entry for `tree`. Returns whether one existed.
    pub fn evict(&self, tree: &PlanTree) -> bool {
        self.lock().remove(&tree.id()).is_some()
    }

    /// Drop every entry; counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.lock().len(),
        }
    }

    fn slot(&self, id: TreeId) -> Slot {
        Arc::clone(self.lock().entry(id).or_default())
    }

    // A panic elsewhere cannot leave the map half-updated, so a poisoned
    // lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TreeId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DigestCache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

///
/// StatementContext
///
/// One statement's finished plan together with its digest cache.
///

#[derive(Debug)]
pub struct StatementContext {
    plan: Arc<PlanTree>,
    digests: DigestCache,
}

impl StatementContext {
    #[must_use]
    pub fn new(plan: PlanTree, config: Config) -> Self {
        Self {
            plan: Arc::new(plan),
            digests: DigestCache::new(config),
        }
    }

    #[must_use]
    pub fn plan(&self) -> &Arc<PlanTree> {
        &self.plan
    }

    #[must_use]
    pub const fn digests(&self) -> &DigestCache {
        &self.digests
    }

    /// Digest of this statement's plan, computed once.
    pub fn digest(&self) -> Result<Arc<NormalizedPlan>, NormalizeError> {
        self.digests.get_or_normalize(&self.plan)
    }
}

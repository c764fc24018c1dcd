use super::{CompiledPattern, MatchFlags, PatternCompiler, PatternResult};
use hashbrown::HashMap as FastHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_PATTERN_CACHE_LIMIT: usize = 10_000;

type PatternBucket = FastHashMap<Box<str>, Arc<CompiledPattern>>;

#[derive(Debug, Default)]
struct CacheInner {
    buckets: FastHashMap<MatchFlags, PatternBucket>,
    count: usize,
}

/// Memoizes compiled patterns per `(flags, pattern)`.
///
/// Once `limit` entries are retained, unseen keys are compiled on every use
/// and never stored. Nothing is evicted.
pub struct PatternCache {
    compiler: Arc<dyn PatternCompiler>,
    limit: usize,
    inner: RwLock<CacheInner>,
    stats: CacheStats,
}

impl PatternCache {
    pub fn new(compiler: Arc<dyn PatternCompiler>, limit: usize) -> Self {
        Self {
            compiler,
            limit,
            inner: RwLock::new(CacheInner::default()),
            stats: CacheStats::default(),
        }
    }

    pub fn compile(&self, pattern: &str, flags: MatchFlags) -> PatternResult<Arc<CompiledPattern>> {
        if let Some(hit) = self
            .inner
            .read()
            .buckets
            .get(&flags)
            .and_then(|bucket| bucket.get(pattern))
        {
            self.stats.record_hit();
            tracing::trace!(pattern, flags = flags.bits(), "pattern cache hit");
            return Ok(Arc::clone(hit));
        }

        self.stats.record_miss();
        let compiled = Arc::new(self.compiler.compile(pattern, flags)?);

        let mut guard = self.inner.write();
        let CacheInner { buckets, count } = &mut *guard;
        if let Some(existing) = buckets.get(&flags).and_then(|bucket| bucket.get(pattern)) {
            return Ok(Arc::clone(existing));
        }

        if *count < self.limit {
            buckets
                .entry(flags)
                .or_default()
                .insert(pattern.into(), Arc::clone(&compiled));
            *count += 1;
        } else {
            tracing::trace!(pattern, limit = self.limit, "pattern cache full; not retaining");
        }

        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.inner.read().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// `(hits, misses)` since construction.
    pub fn metrics(&self) -> (u64, u64) {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("limit", &self.limit)
            .field("len", &self.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

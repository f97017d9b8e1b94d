//! Time-bounded response cache.
//!
//! # Design
//! [`TtlCache`] is a bounded LRU map whose entries also expire after a fixed
//! time-to-live. Expired entries are dropped when read, and swept before an
//! insert would evict a live entry, so stale slots go first and the least
//! recently used live entry goes next.
//!
//! [`ResponseCache`] layers the client's keying on top: every [`CacheKey`]
//! names the operation it belongs to, and lookups go through a [`TypedKey`]
//! that ties the namespace to its response type. Asking for a
//! `RoutineResponse` under a workout key does not compile.
//!
//! The cache is owned by one client. It is not shared across instances.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::request::Pagination;
use crate::response::{
    ApiResponse, ExerciseTemplateResponse, ExerciseTemplatesResponse, RoutineResponse,
    RoutinesResponse, WorkoutCountResponse, WorkoutResponse, WorkoutsResponse,
};

#[derive(Debug, Clone)]
struct Expiring<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> Expiring<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Bounded LRU map with per-entry expiry. A capacity of zero disables storage.
pub struct TtlCache<K: Hash + Eq, V> {
    entries: Option<LruCache<K, Expiring<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: NonZeroUsize::new(max_entries).map(LruCache::new),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.cap().get())
    }

    /// Live value for `key`, refreshing its recency. Expired entries are removed.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let entries = self.entries.as_mut()?;
        if entries.peek(key)?.is_expired(Instant::now()) {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        let ttl = self.ttl;
        let Some(entries) = self.entries.as_mut() else {
            return;
        };
        let now = Instant::now();
        if entries.len() == entries.cap().get() && !entries.contains(&key) {
            Self::sweep(entries, now);
        }
        entries.push(
            key,
            Expiring {
                value,
                expires_at: now.checked_add(ttl),
            },
        );
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.as_mut()?.pop(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        match self.entries.as_mut() {
            Some(entries) => Self::sweep(entries, Instant::now()),
            None => 0,
        }
    }

    /// Number of stored entries, expired ones included until they are swept.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(entries: &mut LruCache<K, Expiring<V>>, now: Instant) -> usize {
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }
}

impl<K: Hash + Eq, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.entries.as_ref().map_or(0, LruCache::len))
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Identity of a cacheable read operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    WorkoutCount,
    Workouts(Pagination),
    Workout(String),
    Routines(Pagination),
    Routine(String),
    ExerciseTemplates(Pagination),
    ExerciseTemplate(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::WorkoutCount => f.write_str("WorkoutCountResponse"),
            CacheKey::Workouts(p) => write!(f, "WorkoutsResponse:{p}"),
            CacheKey::Routines(p) => write!(f, "RoutinesResponse:{p}"),
            CacheKey::ExerciseTemplates(p) => write!(f, "ExerciseTemplatesResponse:{p}"),
            CacheKey::Workout(id) | CacheKey::Routine(id) | CacheKey::ExerciseTemplate(id) => {
                f.write_str(id)
            }
        }
    }
}

/// A [`CacheKey`] bound to the response type stored under it.
///
/// Only [`Cacheable::cache_key`] builds one, so the key namespace and the
/// response type always agree:
///
/// ```compile_fail
/// use hevy_core::{CacheConfig, Cacheable, ResponseCache, WorkoutCountResponse, WorkoutResponse};
///
/// let mut cache = ResponseCache::new(&CacheConfig::default());
/// let _: Option<std::sync::Arc<WorkoutResponse>> =
///     cache.get(&WorkoutCountResponse::cache_key(&()));
/// ```
pub struct TypedKey<R> {
    key: CacheKey,
    response: PhantomData<fn() -> R>,
}

impl<R> TypedKey<R> {
    fn new(key: CacheKey) -> Self {
        Self {
            key,
            response: PhantomData,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn into_key(self) -> CacheKey {
        self.key
    }
}

impl<R> Clone for TypedKey<R> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<R> fmt::Debug for TypedKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedKey").field(&self.key).finish()
    }
}

impl<R> fmt::Display for TypedKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

/// A stored read response, one variant per key namespace.
#[doc(hidden)]
#[derive(Debug, Clone)]
pub enum CachedResponse {
    WorkoutCount(Arc<WorkoutCountResponse>),
    Workouts(Arc<WorkoutsResponse>),
    Workout(Arc<WorkoutResponse>),
    Routines(Arc<RoutinesResponse>),
    Routine(Arc<RoutineResponse>),
    ExerciseTemplates(Arc<ExerciseTemplatesResponse>),
    ExerciseTemplate(Arc<ExerciseTemplateResponse>),
}

mod sealed {
    pub trait Sealed {}
}

/// Response types that can live in a [`ResponseCache`].
///
/// Sealed: each implementation owns one [`CacheKey`] namespace and one
/// stored variant.
pub trait Cacheable: ApiResponse + Sized + sealed::Sealed {
    /// What identifies one response of this type: `()`, a page or an id.
    type Params: ?Sized;

    fn cache_key(params: &Self::Params) -> TypedKey<Self>;

    #[doc(hidden)]
    fn into_cached(response: Arc<Self>) -> CachedResponse;

    #[doc(hidden)]
    fn from_cached(cached: CachedResponse) -> Option<Arc<Self>>;
}

macro_rules! cacheable {
    ($response:ty, $params:ty, $variant:ident, |$p:ident| $key:expr) => {
        impl sealed::Sealed for $response {}

        impl Cacheable for $response {
            type Params = $params;

            fn cache_key($p: &$params) -> TypedKey<Self> {
                TypedKey::new($key)
            }

            fn into_cached(response: Arc<Self>) -> CachedResponse {
                CachedResponse::$variant(response)
            }

            fn from_cached(cached: CachedResponse) -> Option<Arc<Self>> {
                match cached {
                    CachedResponse::$variant(response) => Some(response),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(WorkoutCountResponse, (), WorkoutCount, |_unit| CacheKey::WorkoutCount);
cacheable!(WorkoutsResponse, Pagination, Workouts, |p| CacheKey::Workouts(*p));
cacheable!(WorkoutResponse, str, Workout, |id| CacheKey::Workout(id.to_string()));
cacheable!(RoutinesResponse, Pagination, Routines, |p| CacheKey::Routines(*p));
cacheable!(RoutineResponse, str, Routine, |id| CacheKey::Routine(id.to_string()));
cacheable!(ExerciseTemplatesResponse, Pagination, ExerciseTemplates, |p| {
    CacheKey::ExerciseTemplates(*p)
});
cacheable!(ExerciseTemplateResponse, str, ExerciseTemplate, |id| {
    CacheKey::ExerciseTemplate(id.to_string())
});

/// Successful read responses keyed by operation.
#[derive(Debug)]
pub struct ResponseCache {
    store: TtlCache<CacheKey, CachedResponse>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: TtlCache::new(config.max_entries, config.ttl),
        }
    }

    pub fn get<R: Cacheable>(&mut self, key: &TypedKey<R>) -> Option<Arc<R>> {
        // A typed key only ever names entries stored as `R`.
        self.store.get(key.key()).and_then(R::from_cached)
    }

    /// Store `response` under `key` when it is a 2xx response. Returns whether
    /// it was stored.
    pub fn insert<R: Cacheable>(&mut self, key: TypedKey<R>, response: Arc<R>) -> bool {
        if !response.is_success() {
            return false;
        }
        self.store.insert(key.into_key(), R::into_cached(response));
        true
    }

    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.store.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.store.ttl()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }
}

//! Background worker queue for dimension resolution.
//!
//! - Bounded worker pool (1-4 threads) calling a `DimensionResolver`
//! - Pending set keyed by `MediaKey` so an item is never resolved twice at once
//! - LRU of resolved sizes; cache hits are answered without a worker
//! - Results are drained on the UI thread, never applied from a worker

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use flume::{Receiver, Sender};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, trace, warn};

use super::DimensionResolver;
use crate::error::ResolveResult;
use crate::layout::Size;
use crate::models::{MediaItem, MediaKey};

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 2;

/// Maximum number of worker threads.
const MAX_WORKERS: usize = 4;

/// Maximum number of queued requests.
const MAX_QUEUE_SIZE: usize = 256;

/// Resolved sizes kept in memory.
const CACHE_CAPACITY: usize = 4096;

/// How long an idle worker waits before re-checking for shutdown.
const WORKER_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
struct ResolveRequest {
    index: usize,
    item: MediaItem,
}

/// Result for one item, addressed by index and guarded by key.
#[derive(Debug)]
pub struct Resolved {
    pub index: usize,
    pub key: MediaKey,
    pub result: ResolveResult<Size>,
}

type SizeCache = Arc<Mutex<LruCache<MediaKey, Size>>>;

pub struct ResolveQueue {
    request_tx: Sender<ResolveRequest>,
    result_tx: Sender<Resolved>,
    result_rx: Receiver<Resolved>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    active_workers: Arc<AtomicUsize>,
    pending: Arc<RwLock<HashSet<MediaKey>>>,
    cache: SizeCache,
}

impl ResolveQueue {
    pub fn new(resolver: Arc<dyn DimensionResolver>, workers: usize) -> Result<Self> {
        let num_workers = workers.clamp(1, MAX_WORKERS);

        let (request_tx, request_rx) = flume::bounded(MAX_QUEUE_SIZE);
        let (result_tx, result_rx) = flume::unbounded();

        let shutdown = Arc::new(AtomicBool::new(false));
        let active_workers = Arc::new(AtomicUsize::new(0));
        let pending = Arc::new(RwLock::new(HashSet::new()));
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        let cache: SizeCache = Arc::new(Mutex::new(LruCache::new(capacity)));

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let ctx = WorkerContext {
                worker_id,
                rx: request_rx.clone(),
                tx: result_tx.clone(),
                shutdown: Arc::clone(&shutdown),
                active: Arc::clone(&active_workers),
                pending: Arc::clone(&pending),
                cache: Arc::clone(&cache),
                resolver: Arc::clone(&resolver),
            };
            let handle = thread::Builder::new()
                .name(format!("resolve-worker-{}", worker_id))
                .spawn(move || worker_loop(ctx))
                .context("Failed to spawn resolve worker")?;
            handles.push(handle);
        }

        debug!(num_workers, "Started resolve worker queue");

        Ok(Self {
            request_tx,
            result_tx,
            result_rx,
            workers: handles,
            shutdown,
            active_workers,
            pending,
            cache,
        })
    }

    /// Ask for an item's dimensions.
    ///
    /// Returns false if the item already has them, is already pending, or
    /// the queue is full.
    pub fn request(&self, index: usize, item: &MediaItem) -> bool {
        if item.has_dimensions() {
            return false;
        }
        if self.pending.read().contains(&item.key) {
            trace!(?item.source, "Resolve already pending");
            return false;
        }

        let cached = self.cache.lock().get(&item.key).copied();
        if let Some(size) = cached {
            trace!(?item.source, "Dimensions cached");
            let _ = self.result_tx.send(Resolved {
                index,
                key: item.key,
                result: Ok(size),
            });
            return true;
        }

        self.pending.write().insert(item.key);
        let req = ResolveRequest {
            index,
            item: item.clone(),
        };
        match self.request_tx.try_send(req) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(req)) => {
                warn!("Resolve queue full, dropping request");
                self.pending.write().remove(&req.item.key);
                false
            }
            Err(flume::TrySendError::Disconnected(req)) => {
                error!("Resolve queue disconnected");
                self.pending.write().remove(&req.item.key);
                false
            }
        }
    }

    /// Request every item in `indices` that still lacks dimensions.
    pub fn request_window(&self, items: &[MediaItem], indices: impl IntoIterator<Item = usize>) -> usize {
        indices
            .into_iter()
            .filter_map(|i| items.get(i).map(|item| (i, item)))
            .filter(|(i, item)| self.request(*i, item))
            .count()
    }

    /// Poll for completed results (non-blocking).
    pub fn drain(&self) -> Vec<Resolved> {
        self.result_rx.try_iter().collect()
    }

    /// Block up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Resolved> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    pub fn cached(&self, key: &MediaKey) -> Option<Size> {
        self.cache.lock().peek(key).copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.read().len()
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.read().is_empty() || self.active_workers.load(Ordering::Relaxed) > 0
    }

    pub fn shutdown(&mut self) {
        debug!("Shutting down resolve queue");
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for ResolveQueue {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Relaxed) {
            self.shutdown();
        }
    }
}

struct WorkerContext {
    worker_id: usize,
    rx: Receiver<ResolveRequest>,
    tx: Sender<Resolved>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    pending: Arc<RwLock<HashSet<MediaKey>>>,
    cache: SizeCache,
    resolver: Arc<dyn DimensionResolver>,
}

fn worker_loop(ctx: WorkerContext) {
    debug!(worker_id = ctx.worker_id, "Resolve worker started");

    while !ctx.shutdown.load(Ordering::Relaxed) {
        match ctx.rx.recv_timeout(WORKER_POLL) {
            Ok(req) => {
                ctx.active.fetch_add(1, Ordering::Relaxed);

                let result = ctx.resolver.resolve(&req.item);
                match &result {
                    Ok(size) => {
                        ctx.cache.lock().put(req.item.key, *size);
                    }
                    Err(e) => {
                        debug!(worker_id = ctx.worker_id, error = %e, "Dimension resolution failed");
                    }
                }
                ctx.pending.write().remove(&req.item.key);

                let resolved = Resolved {
                    index: req.index,
                    key: req.item.key,
                    result,
                };
                if let Err(e) = ctx.tx.send(resolved) {
                    warn!(worker_id = ctx.worker_id, error = ?e, "Failed to send resolve result");
                }

                ctx.active.fetch_sub(1, Ordering::Relaxed);
            }
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(worker_id = ctx.worker_id, "Resolve worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::models::MediaKind;
    use crate::resolve::FileResolver;
    use std::path::PathBuf;

    const WAIT: Duration = Duration::from_secs(5);

    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl DimensionResolver for CountingResolver {
        fn resolve(&self, item: &MediaItem) -> ResolveResult<Size> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if item.is_video() {
                return Err(ResolveError::Unsupported {
                    path: item.source.clone(),
                    kind: item.kind,
                });
            }
            Ok(Size::new(640.0, 480.0))
        }
    }

    fn item(name: &str) -> MediaItem {
        MediaItem::from_path(PathBuf::from(name)).unwrap()
    }

    #[test]
    fn test_resolves_and_caches() {
        let resolver = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let queue = ResolveQueue::new(resolver.clone(), 1).unwrap();
        let a = item("/m/a.jpg");

        assert!(queue.request(0, &a));
        let resolved = queue.recv_timeout(WAIT).unwrap();
        assert_eq!(resolved.index, 0);
        assert_eq!(resolved.key, a.key);
        assert_eq!(resolved.result.unwrap(), Size::new(640.0, 480.0));
        assert_eq!(queue.cached(&a.key), Some(Size::new(640.0, 480.0)));

        // Second request is answered from the cache.
        assert!(queue.request(5, &a));
        let resolved = queue.recv_timeout(WAIT).unwrap();
        assert_eq!(resolved.index, 5);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_reported_not_cached() {
        let resolver = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let queue = ResolveQueue::new(resolver, 2).unwrap();
        let clip = item("/m/clip.mov");
        assert_eq!(clip.kind, MediaKind::Video);

        assert!(queue.request(1, &clip));
        let resolved = queue.recv_timeout(WAIT).unwrap();
        assert!(resolved.result.is_err());
        assert_eq!(queue.cached(&clip.key), None);
    }

    #[test]
    fn test_known_dimensions_are_skipped() {
        let queue = ResolveQueue::new(Arc::new(FileResolver), 1).unwrap();
        let known = item("/m/known.png").with_dimensions(10, 10);
        assert!(!queue.request(0, &known));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_request_window_on_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = Vec::new();
        for (i, (w, h)) in [(20u32, 10u32), (8, 16), (5, 5)].iter().enumerate() {
            let path = dir.path().join(format!("{i}.png"));
            image::RgbImage::new(*w, *h).save(&path).unwrap();
            items.push(MediaItem::from_path(path).unwrap());
        }

        let mut queue = ResolveQueue::new(Arc::new(FileResolver), 2).unwrap();
        assert_eq!(queue.request_window(&items, 0..5), 3);

        let mut got = Vec::new();
        while got.len() < 3 {
            got.push(queue.recv_timeout(WAIT).unwrap());
        }
        got.sort_by_key(|r| r.index);
        assert_eq!(got[0].result.as_ref().unwrap(), &Size::new(20.0, 10.0));
        assert_eq!(got[1].result.as_ref().unwrap(), &Size::new(8.0, 16.0));
        assert_eq!(got[2].result.as_ref().unwrap(), &Size::new(5.0, 5.0));

        queue.shutdown();
        assert!(!queue.is_busy());
    }
}

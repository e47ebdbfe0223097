//! Bounded in-memory frame cache.
//!
//! [`FrameCache`] keeps at most `capacity` decoded frames resident, keyed by
//! frame index. Misses are decoded through a [`FrameDecoder`] into the
//! cache's private [`ScratchDirectory`] and loaded from there.
//!
//! # Eviction
//!
//! When an insert would exceed the capacity, the entry with the **smallest
//! frame index** is evicted. This favors forward playback: frames behind the
//! cursor go first. It is not an LRU policy, and backward scrubbing misses
//! more often than it would under one.

use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::DynamicImage;

use crate::{
    decoder::FrameDecoder,
    error::FramepickError,
    scratch::{SESSION_PREFIX, ScratchDirectory},
};

/// Number of frames kept resident when no capacity is configured.
pub const DEFAULT_CACHE_SIZE: usize = 50;

/// A decoded frame owned by the cache.
#[derive(Debug, Clone)]
pub struct CachedFrame {
    image: Arc<DynamicImage>,
    path: PathBuf,
}

impl CachedFrame {
    /// The decoded image.
    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }

    /// The intermediate file the image was decoded into.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Hit, miss, and eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Lookups answered from memory.
    pub hits: u64,
    /// Lookups that went to the decoder.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
    /// Misses for which the decoder produced no image.
    pub failures: u64,
}

/// Bounded frame-index → image map backed by a scratch directory.
pub struct FrameCache {
    capacity: usize,
    entries: BTreeMap<u64, CachedFrame>,
    scratch: ScratchDirectory,
    statistics: CacheStatistics,
}

impl Debug for FrameCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameCache")
            .field("capacity", &self.capacity)
            .field("cached", &self.entries.keys().collect::<Vec<_>>())
            .field("scratch", &self.scratch.path())
            .field("statistics", &self.statistics)
            .finish()
    }
}

impl FrameCache {
    /// Create an empty cache with a fresh scratch directory.
    ///
    /// `capacity` is clamped to a minimum of 1.
    pub fn new(capacity: usize) -> io::Result<Self> {
        Ok(Self {
            capacity: capacity.max(1),
            entries: BTreeMap::new(),
            scratch: ScratchDirectory::new(SESSION_PREFIX)?,
            statistics: CacheStatistics::default(),
        })
    }

    /// Maximum number of resident frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no frames are resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `frame_index` is resident.
    pub fn contains(&self, frame_index: u64) -> bool {
        self.entries.contains_key(&frame_index)
    }

    /// Resident frame indices in ascending order.
    pub fn cached_indices(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }

    /// The scratch directory holding decoded files.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Counters accumulated since the cache was created.
    pub fn statistics(&self) -> CacheStatistics {
        self.statistics
    }

    /// Look up a resident frame without decoding.
    pub fn peek(&self, frame_index: u64) -> Option<&CachedFrame> {
        self.entries.get(&frame_index)
    }

    /// Return the image for `frame_index`, decoding it on a miss.
    ///
    /// Returns `None` when decoding fails; the failure is logged and the
    /// cache is left unchanged.
    pub fn get<D: FrameDecoder + ?Sized>(
        &mut self,
        decoder: &D,
        video: &Path,
        frames_per_second: f64,
        frame_index: u64,
    ) -> Option<Arc<DynamicImage>> {
        match self.try_get(decoder, video, frames_per_second, frame_index) {
            Ok(image) => Some(image),
            Err(error) => {
                log::warn!("Frame {frame_index} unavailable: {error}");
                None
            }
        }
    }

    /// [`get`](FrameCache::get), keeping the reason for a failed decode.
    ///
    /// # Errors
    ///
    /// Whatever the decoder reported, or an image error if its output could
    /// not be loaded.
    pub fn try_get<D: FrameDecoder + ?Sized>(
        &mut self,
        decoder: &D,
        video: &Path,
        frames_per_second: f64,
        frame_index: u64,
    ) -> Result<Arc<DynamicImage>, FramepickError> {
        if let Some(entry) = self.entries.get(&frame_index) {
            self.statistics.hits += 1;
            log::debug!("Cache hit for frame {frame_index}");
            return Ok(Arc::clone(&entry.image));
        }

        self.statistics.misses += 1;
        log::debug!("Cache miss for frame {frame_index}, decoding");

        let path = self.scratch.file(&format!("frame_{frame_index}.png"));
        let decoded = decoder
            .extract_frame(video, frame_index, frames_per_second, &path)
            .and_then(|()| image::open(&path).map_err(FramepickError::from));

        match decoded {
            Ok(image) => Ok(self.insert(frame_index, image, path)),
            Err(error) => {
                self.statistics.failures += 1;
                remove_quietly(&path);
                Err(error)
            }
        }
    }

    /// Store a decoded image, evicting the lowest index first if full.
    pub(crate) fn insert(
        &mut self,
        frame_index: u64,
        image: DynamicImage,
        path: PathBuf,
    ) -> Arc<DynamicImage> {
        if let Some(previous) = self.entries.remove(&frame_index) {
            if previous.path != path {
                remove_quietly(&previous.path);
            }
        }

        while self.entries.len() >= self.capacity {
            let Some((evicted, entry)) = self.entries.pop_first() else {
                break;
            };
            self.statistics.evictions += 1;
            log::debug!("Evicting frame {evicted} to make room for frame {frame_index}");
            remove_quietly(&entry.path);
        }

        let image = Arc::new(image);
        self.entries.insert(
            frame_index,
            CachedFrame {
                image: Arc::clone(&image),
                path,
            },
        );
        image
    }

    /// Drop every resident frame and its file.
    pub fn clear(&mut self) {
        for entry in std::mem::take(&mut self.entries).into_values() {
            remove_quietly(&entry.path);
        }
    }

    /// Drop every frame and delete the scratch directory.
    pub fn close(self) {
        self.scratch.close();
    }
}

fn remove_quietly(path: &Path) {
    if let Err(error) = fs::remove_file(path) {
        if error.kind() != io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {error}", path.display());
        }
    }
}

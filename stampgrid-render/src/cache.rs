use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use image::GenericImageView;
use tracing::debug;

use crate::error::ImageLoadError;
use crate::surface::NodeId;

/// Largest side kept after decoding; bigger sources are downscaled.
pub const MAX_DECODED_SIDE: u32 = 512;

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// Decode raster bytes, downscaling anything larger than [`MAX_DECODED_SIDE`].
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    let img =
        image::load_from_memory(bytes).map_err(|e| ImageLoadError::Decode(e.to_string()))?;
    let (w, h) = img.dimensions();
    let img = if w > MAX_DECODED_SIDE || h > MAX_DECODED_SIDE {
        img.thumbnail(MAX_DECODED_SIDE, MAX_DECODED_SIDE)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque reference to a decoded image held by a [`HandleRegistry`].
///
/// Ids are never reissued, so a released handle can never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(u64);

impl ImageHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Owner of every live decoded image.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next: u64,
    live: HashMap<ImageHandle, Arc<DecodedImage>>,
}

impl HandleRegistry {
    pub fn register(&mut self, image: DecodedImage) -> (ImageHandle, Arc<DecodedImage>) {
        self.next += 1;
        let handle = ImageHandle(self.next);
        let image = Arc::new(image);
        self.live.insert(handle, Arc::clone(&image));
        (handle, image)
    }

    pub fn resolve(&self, handle: ImageHandle) -> Option<Arc<DecodedImage>> {
        self.live.get(&handle).cloned()
    }

    /// Free the image. Returns `false` if it was already released.
    pub fn release(&mut self, handle: ImageHandle) -> bool {
        self.live.remove(&handle).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CacheEntry {
    handle: ImageHandle,
    /// Nodes currently displaying this image.
    users: BTreeSet<NodeId>,
    /// Insertion order, used to break distance ties in the sweep.
    seq: u64,
}

/// An evicted cache entry: the freed handle and the nodes that showed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evicted {
    pub handle: ImageHandle,
    pub users: Vec<NodeId>,
}

/// Path-keyed cache of decoded images.
///
/// Identical paths converge on one handle however many nodes show them.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, CacheEntry>,
    registry: HandleRegistry,
    seq: u64,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<(ImageHandle, Arc<DecodedImage>)> {
        let entry = self.entries.get(path)?;
        let image = self.registry.resolve(entry.handle)?;
        Some((entry.handle, image))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Store a decoded image. If `path` is already cached the existing handle
    /// wins and `image` is dropped.
    pub fn insert(&mut self, path: &str, image: DecodedImage) -> (ImageHandle, Arc<DecodedImage>) {
        if let Some(hit) = self.get(path) {
            return hit;
        }
        let (handle, image) = self.registry.register(image);
        self.seq += 1;
        self.entries.insert(
            path.to_string(),
            CacheEntry {
                handle,
                users: BTreeSet::new(),
                seq: self.seq,
            },
        );
        (handle, image)
    }

    pub fn attach(&mut self, path: &str, node: NodeId) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.users.insert(node);
        }
    }

    /// Stop tracking `node` as a user. Returns `true` if no users remain.
    pub fn detach(&mut self, path: &str, node: NodeId) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) => {
                entry.users.remove(&node);
                entry.users.is_empty()
            }
            None => true,
        }
    }

    /// Remove `path` and free its handle.
    pub fn evict(&mut self, path: &str) -> Option<Evicted> {
        let entry = self.entries.remove(path)?;
        self.registry.release(entry.handle);
        debug!(path, handle = entry.handle.id(), "Evicted image");
        Some(Evicted {
            handle: entry.handle,
            users: entry.users.into_iter().collect(),
        })
    }

    /// `(path, users, insertion order)` for every entry.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &BTreeSet<NodeId>, u64)> {
        self.entries
            .iter()
            .map(|(p, e)| (p.as_str(), &e.users, e.seq))
    }

    pub fn resolve(&self, handle: ImageHandle) -> Option<Arc<DecodedImage>> {
        self.registry.resolve(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn live_handles(&self) -> usize {
        self.registry.live_count()
    }

    /// Evict everything, returning the freed handles.
    pub fn clear(&mut self) -> Vec<ImageHandle> {
        let paths: Vec<String> = self.entries.keys().cloned().collect();
        paths
            .iter()
            .filter_map(|p| self.evict(p))
            .map(|e| e.handle)
            .collect()
    }
}

//! Asynchronous texture loading.
//!
//! [`TextureLoader::load`] hands out a [`TextureHandle`] right away and fills
//! it from a background task once the image is fetched and decoded. The
//! renderer uploads decoded images lazily on first use, so sampling options
//! may still be changed after `load` returns. Loads that fail leave the
//! handle in [`TextureStatus::Failed`] and the scene keeps drawing with a
//! placeholder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::{ImageFormat, Rgba32FImage, RgbaImage};

use crate::data_structures::texture::{Texture, TextureOptions};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type ItemCallback = Arc<dyn Fn(&str, usize, usize) + Send + Sync>;
type DoneCallback = Arc<dyn Fn() + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    on_start: Option<ItemCallback>,
    on_progress: Option<ItemCallback>,
    on_load: Option<DoneCallback>,
    on_error: Option<ErrorCallback>,
}

#[derive(Debug, Default)]
struct Counters {
    loaded: usize,
    total: usize,
    is_loading: bool,
}

#[derive(Default)]
struct ManagerInner {
    counters: Mutex<Counters>,
    callbacks: Mutex<Callbacks>,
}

/// Tracks a group of loads and reports their progress.
///
/// * `on_start(url, loaded, total)` fires when the first item of a busy
///   period starts.
/// * `on_progress(url, loaded, total)` fires after every finished item,
///   failed ones included.
/// * `on_load()` fires once all started items are finished.
/// * `on_error(url)` fires for each failed item before its progress report.
///
/// Clones share the same counters and callbacks.
#[derive(Clone, Default)]
pub struct LoadingManager {
    inner: Arc<ManagerInner>,
}

impl std::fmt::Debug for LoadingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingManager")
            .field("counters", &*lock(&self.inner.counters))
            .finish()
    }
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(self, f: impl Fn(&str, usize, usize) + Send + Sync + 'static) -> Self {
        lock(&self.inner.callbacks).on_start = Some(Arc::new(f));
        self
    }

    pub fn on_progress(self, f: impl Fn(&str, usize, usize) + Send + Sync + 'static) -> Self {
        lock(&self.inner.callbacks).on_progress = Some(Arc::new(f));
        self
    }

    pub fn on_load(self, f: impl Fn() + Send + Sync + 'static) -> Self {
        lock(&self.inner.callbacks).on_load = Some(Arc::new(f));
        self
    }

    pub fn on_error(self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        lock(&self.inner.callbacks).on_error = Some(Arc::new(f));
        self
    }

    /// `(loaded, total)` of the items seen so far.
    pub fn progress(&self) -> (usize, usize) {
        let counters = lock(&self.inner.counters);
        (counters.loaded, counters.total)
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.counters).is_loading
    }

    pub fn item_start(&self, url: &str) {
        let (starts, loaded, total) = {
            let mut counters = lock(&self.inner.counters);
            counters.total += 1;
            let starts = !counters.is_loading;
            counters.is_loading = true;
            (starts, counters.loaded, counters.total)
        };
        if starts {
            // clone the callback out so it never runs under the lock
            let callback = lock(&self.inner.callbacks).on_start.clone();
            if let Some(callback) = callback {
                callback(url, loaded, total);
            }
        }
    }

    pub fn item_end(&self, url: &str) {
        let (done, loaded, total) = {
            let mut counters = lock(&self.inner.counters);
            counters.loaded += 1;
            let done = counters.loaded == counters.total;
            if done {
                counters.is_loading = false;
            }
            (done, counters.loaded, counters.total)
        };
        let (on_progress, on_load) = {
            let callbacks = lock(&self.inner.callbacks);
            (callbacks.on_progress.clone(), callbacks.on_load.clone())
        };
        if let Some(callback) = on_progress {
            callback(url, loaded, total);
        }
        if done {
            if let Some(callback) = on_load {
                callback();
            }
        }
    }

    pub fn item_error(&self, url: &str) {
        let callback = lock(&self.inner.callbacks).on_error.clone();
        if let Some(callback) = callback {
            callback(url);
        }
    }
}

/// Where a texture handle is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureStatus {
    Pending,
    Decoded,
    Failed,
}

#[derive(Debug)]
enum TextureData {
    Ldr(RgbaImage),
    Hdr(Rgba32FImage),
}

#[derive(Debug)]
struct TextureSlot {
    label: String,
    options: TextureOptions,
    data: Option<TextureData>,
    gpu: Option<Texture>,
    failed: bool,
    version: u64,
}

/// Shared reference to a texture that may still be loading.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone, Debug)]
pub struct TextureHandle {
    slot: Arc<Mutex<TextureSlot>>,
}

impl TextureHandle {
    fn with_slot(label: &str, options: TextureOptions, data: Option<TextureData>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(TextureSlot {
                label: label.to_string(),
                options,
                data,
                gpu: None,
                failed: false,
                version: 0,
            })),
        }
    }

    /// A handle that is yet to be filled by a loader.
    pub fn pending(label: &str) -> Self {
        Self::with_slot(label, TextureOptions::default(), None)
    }

    /// A handle over an image that is already in memory.
    pub fn from_image(label: &str, image: RgbaImage, options: TextureOptions) -> Self {
        Self::with_slot(label, options, Some(TextureData::Ldr(image)))
    }

    pub fn from_hdr(label: &str, image: Rgba32FImage) -> Self {
        Self::with_slot(label, TextureOptions::default(), Some(TextureData::Hdr(image)))
    }

    /// Whether both handles observe the same texture.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub fn label(&self) -> String {
        lock(&self.slot).label.clone()
    }

    pub fn status(&self) -> TextureStatus {
        let slot = lock(&self.slot);
        match (&slot.data, slot.failed) {
            (_, true) => TextureStatus::Failed,
            (Some(_), false) => TextureStatus::Decoded,
            (None, false) => TextureStatus::Pending,
        }
    }

    pub fn is_hdr(&self) -> bool {
        matches!(lock(&self.slot).data, Some(TextureData::Hdr(_)))
    }

    /// Pixel size of the decoded image, `None` while pending or failed.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match &lock(&self.slot).data {
            Some(TextureData::Ldr(image)) => Some(image.dimensions()),
            Some(TextureData::Hdr(image)) => Some(image.dimensions()),
            None => None,
        }
    }

    pub fn options(&self) -> TextureOptions {
        lock(&self.slot).options
    }

    /// Replace the sampling options. An already uploaded texture is dropped
    /// and re-uploaded with the new options on next use.
    pub fn set_options(&self, options: TextureOptions) {
        let mut slot = lock(&self.slot);
        if slot.options != options {
            slot.options = options;
            slot.gpu = None;
            slot.version += 1;
        }
    }

    /// Apply a change to the current options, see [`Self::set_options`].
    pub fn update_options(&self, f: impl FnOnce(&mut TextureOptions)) {
        let mut options = self.options();
        f(&mut options);
        self.set_options(options);
    }

    /// Bumped whenever the GPU view of this texture changes.
    pub fn version(&self) -> u64 {
        lock(&self.slot).version
    }

    fn finish(&self, result: anyhow::Result<TextureData>) {
        let mut slot = lock(&self.slot);
        match result {
            Ok(data) => slot.data = Some(data),
            Err(_) => slot.failed = true,
        }
        slot.gpu = None;
        slot.version += 1;
    }

    /// The uploaded texture, uploading it first if the image was decoded
    /// since the last call. `None` while pending or after a failed load.
    pub fn gpu_texture(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Option<Texture> {
        let mut slot = lock(&self.slot);
        if slot.gpu.is_none() {
            let uploaded = match &slot.data {
                Some(TextureData::Ldr(image)) => {
                    Texture::from_image(device, queue, image, &slot.options, &slot.label)
                }
                Some(TextureData::Hdr(image)) => {
                    Texture::from_hdr(device, queue, image, &slot.label)
                }
                None => return None,
            };
            log::debug!("Uploaded texture {}", slot.label);
            slot.gpu = Some(uploaded);
        }
        slot.gpu.clone()
    }
}

pub fn decode_image(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

pub fn decode_hdr(bytes: &[u8]) -> anyhow::Result<Rgba32FImage> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Hdr)?.to_rgba32f())
}

fn decode(kind: Kind, bytes: &[u8]) -> anyhow::Result<TextureData> {
    match kind {
        Kind::Image => decode_image(bytes).map(TextureData::Ldr),
        Kind::Hdr => decode_hdr(bytes).map(TextureData::Hdr),
    }
}

/// Runs loader tasks: a tokio runtime on native, the browser's microtask
/// queue on the web.
#[derive(Clone, Debug)]
pub struct Spawner {
    #[cfg(not(target_arch = "wasm32"))]
    handle: tokio::runtime::Handle,
}

impl Spawner {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.handle.spawn(fut);
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn(&self, fut: impl Future<Output = ()> + 'static) {
        wasm_bindgen_futures::spawn_local(fut);
    }
}

#[derive(Clone, Copy, Debug)]
enum Kind {
    Image,
    Hdr,
}

/// Loads image files from the asset root into [`TextureHandle`]s.
///
/// One loader can serve any number of loads; all of them run concurrently and
/// may complete in any order.
#[derive(Clone, Debug)]
pub struct TextureLoader {
    spawner: Spawner,
    manager: Option<LoadingManager>,
    #[cfg(not(target_arch = "wasm32"))]
    root: Option<std::path::PathBuf>,
}

impl TextureLoader {
    pub fn new(spawner: Spawner) -> Self {
        Self {
            spawner,
            manager: None,
            #[cfg(not(target_arch = "wasm32"))]
            root: None,
        }
    }

    pub fn with_manager(mut self, manager: LoadingManager) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Read from `root` instead of the default asset root.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Start loading a PNG/JPEG/... image.
    pub fn load(&self, path: &str) -> TextureHandle {
        self.start(path, Kind::Image)
    }

    /// Start loading an equirectangular Radiance HDR environment map.
    pub fn load_environment(&self, path: &str) -> TextureHandle {
        self.start(path, Kind::Hdr)
    }

    fn start(&self, path: &str, kind: Kind) -> TextureHandle {
        let path = path.trim_start_matches('/').to_string();
        let handle = TextureHandle::pending(&path);
        if let Some(manager) = &self.manager {
            manager.item_start(&path);
        }

        let task_handle = handle.clone();
        let manager = self.manager.clone();
        #[cfg(not(target_arch = "wasm32"))]
        let root = self.root.clone();
        self.spawner.spawn(async move {
            #[cfg(not(target_arch = "wasm32"))]
            let bytes = match &root {
                Some(root) => super::load_binary_in(root, &path).await,
                None => super::load_binary(&path).await,
            };
            #[cfg(target_arch = "wasm32")]
            let bytes = super::load_binary(&path).await;

            // Decoding is CPU bound, keep it off the runtime's workers.
            #[cfg(not(target_arch = "wasm32"))]
            let result = match bytes {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode(kind, &bytes))
                    .await
                    .map_err(anyhow::Error::from)
                    .and_then(|decoded| decoded),
                Err(e) => Err(e),
            };
            #[cfg(target_arch = "wasm32")]
            let result = bytes.and_then(|bytes| decode(kind, &bytes));
            if let Err(e) = &result {
                log::warn!("Could not load texture {path}: {e:#}");
                if let Some(manager) = &manager {
                    manager.item_error(&path);
                }
            } else {
                log::debug!("Decoded texture {path}");
            }
            task_handle.finish(result);
            if let Some(manager) = &manager {
                manager.item_end(&path);
            }
        });
        handle
    }
}

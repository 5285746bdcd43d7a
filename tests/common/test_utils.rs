use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Records the order frame callbacks run in.
#[derive(Default)]
pub(crate) struct FrameLog {
    events: Vec<String>,
}

impl FrameLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update(&mut self, frame: u64) {
        self.events.push(format!("update {frame}"));
    }

    pub(crate) fn draw(&mut self, frame: u64) {
        self.events.push(format!("draw {frame}"));
    }

    pub(crate) fn events(&self) -> &[String] {
        &self.events
    }
}

/// Thread safe event sink for callbacks that must be `Send + Sync`.
#[derive(Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub(crate) fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Asset root in the system temp directory, removed again on drop.
pub(crate) struct TempAssets {
    pub(crate) root: PathBuf,
}

impl TempAssets {
    pub(crate) fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "scene-ngin-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    pub(crate) fn write_png(&self, path: &str, width: u32, height: u32) {
        let file = self.root.join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 136, 204, 255]))
            .save(file)
            .unwrap();
    }

    pub(crate) fn write_bytes(&self, path: &str, bytes: &[u8]) {
        let file = self.root.join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, bytes).unwrap();
    }
}

impl Drop for TempAssets {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Poll `done` until it holds or five seconds pass.
pub(crate) fn wait_until(done: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    done()
}

#[cfg(feature = "integration-tests")]
pub(crate) fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .expect("no GPU adapter for integration tests");
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to open the GPU device")
    })
}

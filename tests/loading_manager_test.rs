use scene_ngin::resources::loader::{
    LoadingManager, Spawner, TextureHandle, TextureLoader, TextureStatus,
};

use crate::common::test_utils::{Recorder, TempAssets, wait_until};
mod common;

fn recording_manager(recorder: &Recorder) -> LoadingManager {
    let (start, progress, load, error) = (
        recorder.clone(),
        recorder.clone(),
        recorder.clone(),
        recorder.clone(),
    );
    LoadingManager::new()
        .on_start(move |url, loaded, total| start.push(format!("start {url} {loaded}/{total}")))
        .on_progress(move |url, loaded, total| {
            progress.push(format!("progress {url} {loaded}/{total}"))
        })
        .on_load(move || load.push("load"))
        .on_error(move |url| error.push(format!("error {url}")))
}

#[test]
fn manager_reports_a_busy_period() {
    let recorder = Recorder::default();
    let manager = recording_manager(&recorder);

    manager.item_start("a.png");
    manager.item_start("b.png");
    assert!(manager.is_loading());
    manager.item_end("b.png");
    manager.item_error("a.png");
    manager.item_end("a.png");
    assert!(!manager.is_loading());
    assert_eq!(manager.progress(), (2, 2));

    assert_eq!(
        recorder.events(),
        [
            "start a.png 0/1",
            "progress b.png 1/2",
            "error a.png",
            "progress a.png 2/2",
            "load",
        ]
    );
}

#[test]
fn a_new_item_after_completion_starts_again() {
    let recorder = Recorder::default();
    let manager = recording_manager(&recorder);
    manager.item_start("a.png");
    manager.item_end("a.png");
    manager.item_start("c.png");
    manager.item_end("c.png");
    assert_eq!(
        recorder.events(),
        [
            "start a.png 0/1",
            "progress a.png 1/1",
            "load",
            "start c.png 1/2",
            "progress c.png 2/2",
            "load",
        ]
    );
}

#[test]
fn handles_start_pending_and_resolve_in_the_background() {
    let assets = TempAssets::new("loader-ok");
    assets.write_png("textures/particles/2.png", 8, 4);
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let recorder = Recorder::default();
    let manager = recording_manager(&recorder);
    let loader = TextureLoader::new(Spawner::new(runtime.handle().clone()))
        .with_root(&assets.root)
        .with_manager(manager.clone());

    let handle = loader.load("/textures/particles/2.png");
    assert_eq!(handle.label(), "textures/particles/2.png");
    assert!(wait_until(|| handle.status() != TextureStatus::Pending));

    assert_eq!(handle.status(), TextureStatus::Decoded);
    assert_eq!(handle.dimensions(), Some((8, 4)));
    assert!(!handle.is_hdr());
    assert!(wait_until(|| recorder.events().contains(&"load".to_string())));
    assert!(!manager.is_loading());
    assert_eq!(manager.progress(), (1, 1));
}

#[test]
fn decoding_leaves_a_single_threaded_runtime_free() {
    let assets = TempAssets::new("loader-current-thread");
    assets.write_png("textures/door/color.png", 64, 32);
    assets.write_png("textures/minecraft.png", 8, 8);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let loader = TextureLoader::new(Spawner::new(runtime.handle().clone())).with_root(&assets.root);

    let door = loader.load("textures/door/color.png");
    let minecraft = loader.load("textures/minecraft.png");
    // tasks only run while the runtime's one thread is driven
    let ticks = runtime.block_on(async {
        let mut ticks = 0u32;
        while door.status() == TextureStatus::Pending || minecraft.status() == TextureStatus::Pending
        {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            ticks += 1;
            assert!(ticks < 5000, "loads never finished");
        }
        ticks
    });

    assert!(ticks > 0);
    assert_eq!(door.status(), TextureStatus::Decoded);
    assert_eq!(door.dimensions(), Some((64, 32)));
    assert_eq!(minecraft.dimensions(), Some((8, 8)));
}

#[test]
fn failed_loads_are_reported_and_leave_the_handle_failed() {
    let assets = TempAssets::new("loader-failed");
    assets.write_bytes("textures/broken.png", b"not an image");
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let recorder = Recorder::default();
    let manager = recording_manager(&recorder);
    let loader = TextureLoader::new(Spawner::new(runtime.handle().clone()))
        .with_root(&assets.root)
        .with_manager(manager.clone());

    let missing = loader.load("textures/missing.png");
    let broken = loader.load("textures/broken.png");
    // start, two errors, two progress reports and load
    assert!(wait_until(|| recorder.events().len() == 6));

    assert_eq!(missing.status(), TextureStatus::Failed);
    assert_eq!(broken.status(), TextureStatus::Failed);
    assert_eq!(missing.dimensions(), None);
    let events = recorder.events();
    assert!(events.contains(&"error textures/missing.png".to_string()));
    assert!(events.contains(&"error textures/broken.png".to_string()));
    assert_eq!(events.iter().filter(|e| e.starts_with("progress")).count(), 2);
}

#[test]
fn option_changes_bump_the_version() {
    let handle = TextureHandle::pending("door");
    let clone = handle.clone();
    assert!(handle.ptr_eq(&clone));
    assert!(!handle.ptr_eq(&TextureHandle::pending("door")));

    let before = handle.version();
    handle.update_options(|options| options.generate_mipmaps = false);
    assert!(clone.version() > before);
    assert!(!clone.options().generate_mipmaps);

    // unchanged options keep the upload
    let after = handle.version();
    handle.set_options(handle.options());
    assert_eq!(handle.version(), after);
}

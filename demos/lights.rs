fn main() -> anyhow::Result<()> {
    scene_ngin::lessons::lights::run()
}

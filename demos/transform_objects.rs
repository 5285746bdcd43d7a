fn main() -> anyhow::Result<()> {
    scene_ngin::lessons::transform_objects::run()
}

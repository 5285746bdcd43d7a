fn main() -> anyhow::Result<()> {
    scene_ngin::lessons::first_project::run()
}

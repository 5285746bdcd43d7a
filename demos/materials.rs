fn main() -> anyhow::Result<()> {
    scene_ngin::lessons::materials::run()
}

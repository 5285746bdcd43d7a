fn main() -> anyhow::Result<()> {
    scene_ngin::lessons::particles::run()
}

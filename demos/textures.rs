fn main() -> anyhow::Result<()> {
    scene_ngin::lessons::textures::run()
}

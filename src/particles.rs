//! Point cloud generation.

use rand::Rng;

/// Edge length of the cube particles get scattered in.
pub const SPREAD: f32 = 10.0;

/// Fill a flat `[x0, y0, z0, x1, y1, z1, ...]` buffer with `count` points,
/// each coordinate uniformly distributed in `[-SPREAD / 2, SPREAD / 2)`.
pub fn random_positions<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    let mut positions = vec![0.0; count * 3];
    for slot in positions.iter_mut() {
        *slot = (rng.r#gen::<f32>() - 0.5) * SPREAD;
    }
    positions
}

/// Same as [`random_positions`] but seeded from the thread rng.
pub fn scatter(count: usize) -> Vec<f32> {
    random_positions(count, &mut rand::thread_rng())
}

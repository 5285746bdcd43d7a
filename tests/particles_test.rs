use rand::{SeedableRng, rngs::StdRng};
use scene_ngin::particles::{SPREAD, random_positions, scatter};

#[test]
fn three_floats_per_point() {
    let mut rng = StdRng::seed_from_u64(7);
    for count in [0, 1, 2, 17, 5000] {
        assert_eq!(random_positions(count, &mut rng).len(), count * 3);
    }
    assert_eq!(scatter(100).len(), 300);
}

#[test]
fn positions_stay_inside_the_cube() {
    let mut rng = StdRng::seed_from_u64(42);
    let positions = random_positions(10_000, &mut rng);
    assert!(positions.iter().all(|v| (-5.0..5.0).contains(v)));
    assert_eq!(SPREAD / 2.0, 5.0);
}

#[test]
fn positions_cover_the_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let positions = random_positions(10_000, &mut rng);
    let min = positions.iter().copied().fold(f32::INFINITY, f32::min);
    let max = positions.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    assert!(min < -4.9, "min {min}");
    assert!(max > 4.9, "max {max}");
}

#[test]
fn same_seed_same_cloud() {
    let a = random_positions(64, &mut StdRng::seed_from_u64(3));
    let b = random_positions(64, &mut StdRng::seed_from_u64(3));
    assert_eq!(a, b);
}

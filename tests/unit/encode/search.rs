use super::*;
use crate::transform::block::down_sample_plane;

fn pattern_plane(w: u32, h: u32) -> ChannelPlane {
    let data = (0..h)
        .flat_map(|y| {
            (0..w).map(move |x| ((x * x * 7 + y * y * 3 + x * y * 5 + x * 11 + y) % 251) as u8)
        })
        .collect();
    ChannelPlane::from_raw(w, h, data).unwrap()
}

fn block_of(plane: &ChannelPlane, x: u32, y: u32, size: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for j in 0..size {
        for i in 0..size {
            out.push(plane.get(x + i, y + j));
        }
    }
    out
}

struct Lcg(u64);

impl Lcg {
    fn next_u8(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 56) as u8
    }
}

#[test]
fn flat_domain_falls_back_to_zero_scale() {
    let domain = [9u8; 4];
    let range = [10u8, 20, 30, 40];
    let f = fit(&domain, &range, mean(&range));
    assert_eq!(f.scale, 0.0);
    assert_eq!(f.offset, 25.0);
    assert_eq!(f.error, (225.0 + 25.0 + 25.0 + 225.0) / 4.0);
}

#[test]
fn exact_affine_relation_is_recovered() {
    let domain = [0u8, 1, 2, 3];
    let range = [5u8, 7, 9, 11];
    let f = fit(&domain, &range, mean(&range));
    assert_eq!(f.scale, 2.0);
    assert_eq!(f.offset, 5.0);
    assert_eq!(f.error, 0.0);
}

#[test]
fn regression_beats_identity_and_flat_guesses() {
    // least squares is only optimal for the unrounded error; rounding can reorder candidates
    let mut rng = Lcg(42);
    for _ in 0..200 {
        let domain: Vec<u8> = (0..16).map(|_| rng.next_u8()).collect();
        let range: Vec<u8> = (0..16).map(|_| rng.next_u8()).collect();
        let range_avg = mean(&range);
        let f = fit(&domain, &range, range_avg);
        let fitted = collage_error(&domain, &range, f.scale, f.offset);
        assert!(fitted <= collage_error(&domain, &range, 1.0, 0.0) + 1e-9);
        assert!(fitted <= collage_error(&domain, &range, 0.0, range_avg) + 1e-9);
    }
}

#[test]
fn candidates_scan_rows_then_columns() {
    let down = ChannelPlane::filled(16, 16, 0);
    let pool = DomainPool::new(&down, 32, 32).unwrap();
    assert_eq!(
        pool.candidates(8),
        vec![(0, 0), (16, 0), (0, 16), (16, 16)]
    );
    assert_eq!(pool.candidates(16), vec![(0, 0)]);
    // a 64-pixel domain cannot fit a 32-pixel plane; origin is the only candidate
    assert_eq!(pool.candidates(32), vec![(0, 0)]);
    assert_eq!(pool.candidates(2).len(), 64);
}

#[test]
fn ties_keep_the_first_candidate() {
    let down = ChannelPlane::filled(32, 32, 50);
    let pool = DomainPool::new(&down, 64, 64).unwrap();
    let range = vec![80u8; 16];
    let mut scratch = Vec::new();
    let m = best_match(&pool, &range, 4, SymmetrySet::searchable(), &mut scratch).unwrap();
    assert_eq!((m.domain_x, m.domain_y), (0, 0));
    assert_eq!(m.symmetry, Symmetry::Identity);
    assert_eq!(m.scale, 0.0);
    assert_eq!(m.offset, 80);
    assert_eq!(m.error, 0.0);
}

#[test]
fn exact_copy_is_found() {
    let full = pattern_plane(64, 64);
    let down = down_sample_plane(&full).unwrap();
    let pool = DomainPool::new(&down, 64, 64).unwrap();
    // candidate (32, 16) lives at (16, 8) in the half-resolution pool
    let range = block_of(&down, 16, 8, 8);
    let mut scratch = Vec::new();
    let m = best_match(&pool, &range, 8, SymmetrySet::identity_only(), &mut scratch).unwrap();
    assert_eq!((m.domain_x, m.domain_y), (32, 16));
    assert_eq!(m.scale, 1.0);
    assert_eq!(m.offset, 0);
    // only the rounding of the centered prediction remains
    assert!(m.error <= 0.25);
}

#[test]
fn rotated_copy_needs_the_symmetry_search() {
    let full = pattern_plane(64, 64);
    let down = down_sample_plane(&full).unwrap();
    let pool = DomainPool::new(&down, 64, 64).unwrap();
    let mut range = Vec::new();
    pool.load(16, 48, 8, Symmetry::Rot90, &mut range);

    let mut scratch = Vec::new();
    let identity =
        best_match(&pool, &range, 8, SymmetrySet::identity_only(), &mut scratch).unwrap();
    let full_search =
        best_match(&pool, &range, 8, SymmetrySet::searchable(), &mut scratch).unwrap();
    assert!(full_search.error <= 0.25);
    assert!(identity.error > full_search.error);
    assert_eq!((full_search.domain_x, full_search.domain_y), (16, 48));
    assert_eq!(full_search.symmetry, Symmetry::Rot90);
}

#[test]
fn malformed_inputs_are_rejected() {
    let empty = ChannelPlane::from_raw(0, 0, Vec::new()).unwrap();
    assert!(DomainPool::new(&empty, 0, 0).is_err());

    let down = ChannelPlane::filled(16, 16, 0);
    let pool = DomainPool::new(&down, 32, 32).unwrap();
    let mut scratch = Vec::new();
    assert!(best_match(&pool, &[], 4, SymmetrySet::identity_only(), &mut scratch).is_err());
    assert!(best_match(&pool, &[0; 15], 4, SymmetrySet::identity_only(), &mut scratch).is_err());
}

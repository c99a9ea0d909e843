use super::*;

#[test]
fn apply_affine_clamps_both_ends() {
    assert_eq!(apply_affine(200, 2.0, 0), 255);
    assert_eq!(apply_affine(10, -1.0, 0), 0);
    assert_eq!(apply_affine(100, 0.5, 7), 57);
    assert_eq!(apply_affine(3, 0.5, 0), 2);
}

#[test]
fn box4_truncates() {
    assert_eq!(box4(0, 0, 0, 3), 0);
    assert_eq!(box4(1, 2, 3, 4), 2);
    assert_eq!(box4(255, 255, 255, 255), 255);
}

#[test]
fn mean_of_empty_is_zero() {
    assert_eq!(mean(&[]), 0.0);
    assert_eq!(mean(&[1, 2, 3, 4]), 2.5);
}

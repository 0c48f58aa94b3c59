use super::*;

#[test]
fn linear_mode_hits_the_endpoints() {
    // equal W values with clear low bits select the linear path
    let mut interp = Interpolator::<false>::new(0, 16, 0x1000, 0x1000);

    interp.set_x(0);
    assert_eq!(interp.interpolate(0x40, 0x80), 0x40);

    interp.set_x(16);
    assert_eq!(interp.interpolate(0x40, 0x80), 0x80);
}

#[test]
fn linear_interpolation_is_monotone_and_bounded() {
    let mut interp = Interpolator::<false>::new(0, 100, 0x2000, 0x2000);

    let mut prev = 10;
    for x in 0..=100 {
        interp.set_x(x);
        let v = interp.interpolate(10, 1000);
        assert!((10..=1000).contains(&v), "x={x} v={v}");
        assert!(v >= prev, "x={x}");
        prev = v;
    }
}

#[test]
fn ordering_asymmetry_covers_both_directions() {
    // descending endpoints take the mirrored path; both orderings must
    // still be exact at the span ends
    let mut interp = Interpolator::<false>::new(0, 32, 0x1000, 0x2000);

    interp.set_x(0);
    assert_eq!(interp.interpolate(100, 50), 100);
    assert_eq!(interp.interpolate(50, 100), 50);

    interp.set_x(32);
    assert_eq!(interp.interpolate(100, 50), 50);
    assert_eq!(interp.interpolate(50, 100), 100);
}

#[test]
fn perspective_factor_skews_toward_the_nearer_endpoint() {
    let mut interp = Interpolator::<false>::new(0, 32, 0x1000, 0x2000);

    // halfway across, the factor is w0/(w0+w1) = 1/3 (0x55/0x100)
    interp.set_x(16);
    assert_eq!(interp.interpolate(0, 96), 31);
}

#[test]
fn zero_length_spans_return_the_first_value() {
    let mut interp = Interpolator::<false>::new(5, 5, 0x1000, 0x1000);
    interp.set_x(5);

    assert_eq!(interp.interpolate(123, 456), 123);
    assert_eq!(interp.interpolate_z(111, 222, false), 111);
    assert_eq!(interp.interpolate_z(111, 222, true), 111);
}

#[test]
fn w_buffered_z_reuses_the_perspective_factor() {
    let mut interp = Interpolator::<false>::new(0, 32, 0x1000, 0x2000);

    interp.set_x(32);
    assert_eq!(interp.interpolate_z(0x100, 0x4000, true), 0x4000);

    interp.set_x(0);
    assert_eq!(interp.interpolate_z(0x100, 0x4000, true), 0x100);
}

#[test]
fn z_buffered_path_along_x_drops_low_displacement_bits() {
    let mut interp = Interpolator::<false>::new(0, 16, 0x1000, 0x1000);

    interp.set_x(8);
    assert_eq!(interp.interpolate_z(0, 0x20000, false), 0x10000);
}

#[test]
fn z_buffered_path_along_y_normalizes_large_displacements() {
    let mut interp = Interpolator::<true>::new(0, 16, 0x1000, 0x1000);

    interp.set_x(8);
    assert_eq!(interp.interpolate_z(0, 0x100000, false), 0x80000);
}

#[test]
fn odd_even_w_pair_adjusts_the_numerator_along_y() {
    // w0 odd and w1 even: the numerator uses w0-1 while the denominator
    // pairs w0+1 with w1
    let mut interp = Interpolator::<true>::new(0, 16, 0x1001, 0x2000);

    interp.set_x(16);
    let expected = (((16_i64 * 0x1000) << 9) / (16 * 0x1002)) as i32;
    assert_eq!(interp.interpolate(0, 1 << 9), expected);
}

#[test]
fn linear_mode_mask_ignores_bit_zero_along_y() {
    // bit 0 of W doesn't block linear mode along Y, but does along X;
    // both paths land mid-range for equal Ws
    let mut y_interp = Interpolator::<true>::new(0, 16, 0x1001, 0x1001);
    y_interp.set_x(8);
    assert_eq!(y_interp.interpolate(0, 256), 128);

    let mut x_interp = Interpolator::<false>::new(0, 16, 0x1001, 0x1001);
    x_interp.set_x(8);
    assert_eq!(x_interp.interpolate(0, 256), 128);
}

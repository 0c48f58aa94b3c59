use super::*;

#[test]
fn setup_starts_at_the_first_vertex() {
    let mut slope = Slope::<false>::default();
    let x = slope.setup(10, 50, 0, 40, 0x1000, 0x1000, 0);

    assert_eq!(x, 10);
    assert_eq!(slope.x_val(), 10);
    assert!(!slope.x_major);
    assert_eq!(slope.increment, 0x40000);
}

#[test]
fn stepping_walks_to_the_last_vertex() {
    let mut slope = Slope::<false>::default();
    let mut x = slope.setup(10, 50, 0, 40, 0x1000, 0x1000, 0);

    for _ in 0..40 {
        x = slope.step();
    }

    // the end vertex itself lies one pixel past xmax
    assert_eq!(x, 49);
}

#[test]
fn diagonals_advance_one_pixel_per_step() {
    let mut slope = Slope::<false>::default();
    slope.setup(0, 100, 0, 100, 0x1000, 0x1000, 0);

    for expected in 1..50 {
        assert_eq!(slope.step(), expected);
    }
}

#[test]
fn negative_edges_walk_leftwards() {
    let mut slope = Slope::<false>::default();
    let mut x = slope.setup(50, 10, 0, 40, 0x1000, 0x1000, 0);

    assert!(slope.negative);
    assert_eq!(x, 49);

    for _ in 0..39 {
        x = slope.step();
    }
    assert_eq!(x, 10);
}

#[test]
fn x_major_right_edges_span_multiple_pixels() {
    let mut slope = Slope::<true>::default();
    let x = slope.setup(10, 50, 0, 10, 0x1000, 0x1000, 0);

    assert!(slope.x_major);
    assert_eq!(x, 13);

    let (length, coverage) = slope.edge_params();
    assert_eq!(length, 4);
    // X-major coverage descriptors are tagged in bit 31
    assert!(coverage & (1 << 31) != 0);
}

#[test]
fn y_major_coverage_drops_as_the_edge_steepens() {
    let mut shallow = Slope::<true>::default();
    shallow.setup(90, 100, 0, 12, 0x1000, 0x1000, 0);
    let (length, shallow_cov) = shallow.edge_params();
    assert_eq!(length, 1);

    let mut steep = Slope::<true>::default();
    steep.setup(90, 100, 0, 40, 0x1000, 0x1000, 0);
    let (_, steep_cov) = steep.edge_params();

    assert!(shallow_cov < 31);
    assert!(steep_cov < shallow_cov);
}

#[test]
fn vertical_right_edges_are_pushed_one_pixel_left() {
    let mut slope = Slope::<true>::default();
    let x = slope.setup(200, 200, 0, 50, 0x1000, 0x1000, 0);

    assert_eq!(x, 199);
    assert_eq!(slope.increment, 0);

    // zero-increment edges take full coverage
    assert_eq!(slope.edge_params(), (1, 31));
}

#[test]
fn vertical_left_edges_stay_put() {
    let mut slope = Slope::<false>::default();
    let x = slope.setup(32, 32, 5, 60, 0x1000, 0x1000, 5);

    assert_eq!(x, 32);
    for _ in 0..20 {
        assert_eq!(slope.step(), 32);
    }
}

#[test]
fn dummy_setup_degenerates_to_one_pixel() {
    let mut left = Slope::<false>::default();
    assert_eq!(left.setup_dummy(30), 30);
    assert_eq!(left.x_val(), 30);

    let mut right = Slope::<true>::default();
    // the right side is pushed one pixel left
    assert_eq!(right.setup_dummy(30), 29);
    assert_eq!(right.x_val(), 29);
}

#[test]
fn mid_polygon_setup_seeds_from_the_current_scanline() {
    // an edge picked up at y=20 must land where stepping from y=0
    // would have
    let mut stepped = Slope::<false>::default();
    stepped.setup(0, 100, 0, 50, 0x1000, 0x1000, 0);
    for _ in 0..20 {
        stepped.step();
    }

    let mut seeded = Slope::<false>::default();
    let x = seeded.setup(0, 100, 0, 50, 0x1000, 0x1000, 20);

    assert_eq!(x, stepped.x_val());
}

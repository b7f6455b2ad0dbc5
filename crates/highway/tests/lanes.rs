use highway::{Lane, Vec2};

#[test]
fn straight_lane_round_trips_local_coordinates() {
    let lane = Lane::straight(Vec2::new(0.0, 4.0), Vec2::new(100.0, 4.0));
    let p = lane.position(30.0, 0.0);
    assert!((p.x - 30.0).abs() < 1e-9);
    assert!((p.y - 4.0).abs() < 1e-9);

    let (s, r) = lane.local_coordinates(Vec2::new(42.0, 5.5));
    assert!((s - 42.0).abs() < 1e-9);
    assert!((r - 1.5).abs() < 1e-9);
    assert!((lane.length() - 100.0).abs() < 1e-9);
    assert!(lane.heading_at(10.0).abs() < 1e-12);
}

#[test]
fn sine_lane_offsets_centre_line() {
    let amplitude = 3.25;
    let pulsation = std::f64::consts::PI / 80.0;
    let lane = Lane::sine(
        Vec2::new(150.0, 11.25),
        Vec2::new(230.0, 11.25),
        amplitude,
        pulsation,
        std::f64::consts::FRAC_PI_2,
    );
    // phase pi/2: full amplitude at the start, zero crossing in the middle
    let start = lane.position(0.0, 0.0);
    assert!((start.y - (11.25 + amplitude)).abs() < 1e-9);
    let middle = lane.position(40.0, 0.0);
    assert!((middle.y - 11.25).abs() < 1e-9);

    let (s, r) = lane.local_coordinates(lane.position(25.0, 0.7));
    assert!((s - 25.0).abs() < 1e-9);
    assert!((r - 0.7).abs() < 1e-9);
}

#[test]
fn reachability_and_end_of_lane() {
    let lane = Lane::straight(Vec2::ZERO, Vec2::new(50.0, 0.0));
    assert!(lane.on_lane(Vec2::new(10.0, 1.0), 0.0));
    assert!(!lane.on_lane(Vec2::new(10.0, 3.0), 0.0));
    assert!(lane.is_reachable_from(Vec2::new(10.0, 7.0)));
    assert!(!lane.is_reachable_from(Vec2::new(10.0, 9.0)));
    assert!(lane.after_end(Vec2::new(48.0, 0.0)));
    assert!(!lane.after_end(Vec2::new(20.0, 0.0)));
    assert!(lane.distance(Vec2::new(60.0, 2.0)) > 11.9);
}

#[test]
fn forbidden_flag_survives_builders() {
    let lane = Lane::sine(Vec2::ZERO, Vec2::new(80.0, 0.0), 3.0, 0.1, 0.0).forbidden(true);
    assert!(lane.is_forbidden());
    assert!(!Lane::straight(Vec2::ZERO, Vec2::new(1.0, 0.0)).is_forbidden());
}

use highway::{HighwayError, Lane, LaneIndex, RoadNetwork, Vec2};

fn two_lane_road() -> RoadNetwork {
    let mut net = RoadNetwork::new();
    for y in [0.0, 4.0] {
        net.add_lane("a", "b", Lane::straight(Vec2::new(0.0, y), Vec2::new(100.0, y)));
        net.add_lane("b", "c", Lane::straight(Vec2::new(100.0, y), Vec2::new(200.0, y)));
    }
    net.add_lane("b", "c", Lane::straight(Vec2::new(100.0, 8.0), Vec2::new(200.0, 8.0)));
    net
}

#[test]
fn get_lane_rejects_unknown_keys() {
    let net = two_lane_road();
    assert!(net.get_lane(&LaneIndex::new("a", "b", 1)).is_ok());
    let missing = LaneIndex::new("a", "b", 2);
    assert_eq!(net.get_lane(&missing), Err(HighwayError::UnknownLane(missing.clone())));
    assert!(net.get_lane(&LaneIndex::new("x", "y", 0)).is_err());
}

#[test]
fn closest_lane_follows_position() {
    let net = two_lane_road();
    assert_eq!(net.closest_lane_index(Vec2::new(30.0, 3.5), 0.0), Some(LaneIndex::new("a", "b", 1)));
    assert_eq!(net.closest_lane_index(Vec2::new(150.0, 7.0), 0.0), Some(LaneIndex::new("b", "c", 2)));
}

#[test]
fn next_lane_picks_closest_when_lane_counts_differ() {
    let net = two_lane_road();
    let next = net.next_lane(&("a", "b", 1).into(), Vec2::new(99.0, 4.0));
    assert_eq!(next, LaneIndex::new("b", "c", 1));
    let dead_end = net.next_lane(&("b", "c", 0).into(), Vec2::new(199.0, 0.0));
    assert_eq!(dead_end, LaneIndex::new("b", "c", 0));
}

#[test]
fn side_lanes_stay_on_the_same_road() {
    let net = two_lane_road();
    assert_eq!(net.side_lanes(&("b", "c", 1).into()), vec![LaneIndex::new("b", "c", 0), LaneIndex::new("b", "c", 2)]);
    assert_eq!(net.side_lanes(&("a", "b", 0).into()), vec![LaneIndex::new("a", "b", 1)]);
    assert_eq!(net.lane_count("b", "c"), 3);
}

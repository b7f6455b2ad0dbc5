use highway::{controlled_vehicle, Behavior, Lane, LaneIndex, MetaAction, Obstacle, Road, RoadNetwork, Vec2, Vehicle, VehicleType};

fn straight_road() -> Road {
    let mut net = RoadNetwork::new();
    for y in [0.0, 4.0] {
        net.add_lane("a", "b", Lane::straight(Vec2::new(0.0, y), Vec2::new(1000.0, y)));
    }
    Road::new(net)
}

#[test]
fn passive_vehicle_keeps_speed_and_lane() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let id = road.push(Vehicle::on_lane(&road.network, &index, 10.0, 20.0, Behavior::Passive).unwrap());
    for _ in 0..15 {
        road.act();
        road.step(1.0 / 15.0);
    }
    let v = road.get(id).unwrap();
    assert!((v.speed - 20.0).abs() < 1e-9);
    assert!((v.position.x - 30.0).abs() < 1e-6);
    assert_eq!(v.lane_index, index);
}

#[test]
fn idm_vehicle_brakes_behind_slow_leader() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let idm = VehicleType::Idm;
    let leader = road.push(Vehicle::on_lane(&road.network, &index, 40.0, 5.0, Behavior::Passive).unwrap());
    let follower = road.push(
        idm.spawn(&road.network, &index, road.network.get_lane(&index).unwrap().position(10.0, 0.0), 25.0)
            .unwrap(),
    );
    road.act();
    let action = road.get(follower).unwrap().action();
    assert!(action.acceleration < -3.0, "follower should brake, got {action:?}");
    assert!(road.get(leader).unwrap().action().acceleration.abs() < 1e-12);
}

#[test]
fn vehicle_type_resolves_from_path() {
    assert_eq!(VehicleType::IDM_PATH.parse::<VehicleType>().unwrap(), VehicleType::Idm);
    assert_eq!(VehicleType::PASSIVE_PATH.parse::<VehicleType>().unwrap(), VehicleType::Passive);
    assert!("nope::Car".parse::<VehicleType>().is_err());
}

#[test]
fn overlapping_vehicles_crash() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let a = road.push(Vehicle::on_lane(&road.network, &index, 10.0, 10.0, Behavior::Passive).unwrap());
    let b = road.push(Vehicle::on_lane(&road.network, &index, 13.0, 0.0, Behavior::Passive).unwrap());
    road.act();
    road.step(0.1);
    assert!(road.get(a).unwrap().crashed);
    assert!(road.get(b).unwrap().crashed);
}

#[test]
fn obstacle_is_a_front_neighbour_and_hits() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let lane_point = road.network.get_lane(&index).unwrap().position(50.0, 0.0);
    road.obstacles.push(Obstacle::new(lane_point, 0.0));
    let id = road.push(Vehicle::on_lane(&road.network, &index, 20.0, 10.0, Behavior::Passive).unwrap());

    let (front, rear) = road.neighbour_vehicles(id, &index);
    let front = front.expect("obstacle ahead");
    assert!(front.id.is_none());
    assert!(rear.is_none());

    for _ in 0..60 {
        road.act();
        road.step(0.1);
    }
    assert!(road.get(id).unwrap().crashed);
    assert!(road.obstacles[0].hit);
}

#[test]
fn meta_actions_move_controlled_targets() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let pos = road.network.get_lane(&index).unwrap().position(30.0, 0.0);
    let ego = road.push(controlled_vehicle(&road.network, &index, pos, 25.0, vec![20.0, 25.0, 30.0]).unwrap());
    assert!((road.get(ego).unwrap().target_speed - 25.0).abs() < 1e-12);

    assert!(road.apply_meta_action(ego, MetaAction::Faster).unwrap());
    assert!((road.get(ego).unwrap().target_speed - 30.0).abs() < 1e-12);

    road.apply_meta_action(ego, MetaAction::LaneRight).unwrap();
    assert_eq!(road.get(ego).unwrap().target_lane_index, LaneIndex::new("a", "b", 1));
    road.apply_meta_action(ego, MetaAction::LaneRight).unwrap();
    assert_eq!(road.get(ego).unwrap().target_lane_index, LaneIndex::new("a", "b", 1));

    for _ in 0..45 {
        road.act();
        road.step(1.0 / 15.0);
    }
    let v = road.get(ego).unwrap();
    assert_eq!(v.lane_index, LaneIndex::new("a", "b", 1));
    assert!(v.speed > 28.0);
}

#[test]
fn passive_vehicles_ignore_meta_actions() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let id = road.push(Vehicle::on_lane(&road.network, &index, 10.0, 20.0, Behavior::Passive).unwrap());
    assert!(!road.apply_meta_action(id, MetaAction::Faster).unwrap());
}

#[test]
fn speed_above_the_limit_decays_gradually() {
    let mut road = straight_road();
    let index = LaneIndex::new("a", "b", 0);
    let id = road.push(Vehicle::on_lane(&road.network, &index, 10.0, 60.0, Behavior::Passive).unwrap());
    let dt = 1.0 / 15.0;

    road.act();
    road.step(dt);
    let after_one = road.get(id).unwrap().speed;
    assert!((after_one - (60.0 - 20.0 * dt)).abs() < 1e-9, "speed {after_one}");

    for _ in 0..14 {
        road.act();
        road.step(dt);
    }
    let after_second = road.get(id).unwrap().speed;
    assert!(after_second < after_one);
    assert!(after_second > highway::MAX_SPEED);
}

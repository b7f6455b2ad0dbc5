use highway::{Behavior, LaneIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rl::config::SpeedRange;
use rl::{Env, FastMergeConfig, FastMergeEnv};

fn reset_with(config: FastMergeConfig, seed: u64) -> FastMergeEnv {
    let mut env = FastMergeEnv::with_config(config).unwrap();
    env.reset(Some(seed)).unwrap();
    env
}

#[test]
fn population_appends_five_vehicles_in_order() {
    let env = reset_with(FastMergeConfig::default(), 11);
    let road = env.road().unwrap();
    assert_eq!(road.len(), 5);

    assert_eq!(env.vehicle().unwrap().0, 0);
    assert!(matches!(road.vehicles[0].behavior, Behavior::Controlled(_)));
    for other in &road.vehicles[1..4] {
        assert_eq!(other.lane_index.from, "a");
        assert_eq!(other.lane_index.to, "b");
        assert!(other.lane_index.id < 2);
        assert!(matches!(other.behavior, Behavior::Idm(_)));
    }
    assert_eq!(road.vehicles[4].lane_index, LaneIndex::new("j", "k", 0));
}

#[test]
fn ego_starts_at_fixed_lane_position() {
    let mut config = FastMergeConfig::default();
    config.speed_multiplier = 1.7;
    config.ego_speed = 22.0;
    let env = reset_with(config, 3);
    let road = env.road().unwrap();
    let ego = road.get(env.vehicle().unwrap()).unwrap();
    let lane_index = LaneIndex::new("a", "b", 1);
    assert_eq!(ego.lane_index, lane_index);

    let (longitudinal, lateral) = road.network.get_lane(&lane_index).unwrap().local_coordinates(ego.position);
    assert!((longitudinal - 30.0).abs() < 1e-9);
    assert!(lateral.abs() < 1e-9);
}

#[test]
fn speed_multiplier_scales_ego_and_merging_vehicle() {
    let mut config = FastMergeConfig::default();
    config.speed_multiplier = 2.0;
    let env = reset_with(config, 0);
    let vehicles = &env.road().unwrap().vehicles;

    assert_eq!(vehicles[0].speed, 60.0);
    assert_eq!(vehicles[4].speed, 40.0);
    assert_eq!(vehicles[4].target_speed, 60.0);
    for other in &vehicles[1..4] {
        assert!((58.0..64.0).contains(&other.speed), "speed {}", other.speed);
    }
}

#[test]
fn degenerate_speed_range_gives_constant_speed() {
    let mut config = FastMergeConfig::default();
    config.other_vehicles_speed_range = SpeedRange::new(10.0, 10.0);
    for seed in 0..5 {
        let env = reset_with(config.clone(), seed);
        for other in &env.road().unwrap().vehicles[1..4] {
            assert_eq!(other.speed, 10.0);
        }
    }
}

#[test]
fn other_vehicles_ignore_fallback_speeds() {
    let mut config = FastMergeConfig::default();
    config.other_vehicles_speed_range = SpeedRange::new(12.0, 13.0);
    let env = reset_with(config, 5);
    for other in &env.road().unwrap().vehicles[1..4] {
        assert!((12.0..13.0).contains(&other.speed));
    }
}

#[test]
fn other_vehicles_are_jittered_around_base_offsets() {
    let env = reset_with(FastMergeConfig::default(), 9);
    let road = env.road().unwrap();
    for (other, base) in road.vehicles[1..4].iter().zip([90.0, 70.0, 5.0]) {
        let (longitudinal, lateral) = road.network.get_lane(&other.lane_index).unwrap().local_coordinates(other.position);
        assert!((longitudinal - base).abs() <= 5.0, "offset {longitudinal} around {base}");
        assert!(lateral.abs() < 1e-9);
    }
}

#[test]
fn draws_lane_then_offset_then_speed_per_vehicle() {
    let seed = 42;
    let env = reset_with(FastMergeConfig::default(), seed);
    let road = env.road().unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for (other, base) in road.vehicles[1..4].iter().zip([90.0, 70.0, 5.0]) {
        let lane_id: usize = rng.gen_range(0..2);
        let offset = base + rng.gen_range(-5.0..5.0);
        let speed = 29.0 + rng.gen::<f64>() * (32.0 - 29.0);

        assert_eq!(other.lane_index, LaneIndex::new("a", "b", lane_id));
        let (longitudinal, _) = road.network.get_lane(&other.lane_index).unwrap().local_coordinates(other.position);
        assert!((longitudinal - offset).abs() < 1e-9, "offset {longitudinal} vs {offset}");
        assert_eq!(other.speed, speed);
    }
}

#[test]
fn same_seed_reproduces_population() {
    let a = reset_with(FastMergeConfig::default(), 42);
    let b = reset_with(FastMergeConfig::default(), 42);
    let positions = |env: &FastMergeEnv| {
        env.road()
            .unwrap()
            .vehicles
            .iter()
            .map(|v| (v.position.x, v.position.y, v.speed, v.lane_index.id))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(&a), positions(&b));
}

#[test]
fn reset_rebuilds_the_road() {
    let mut env = FastMergeEnv::new();
    env.reset(Some(1)).unwrap();
    for _ in 0..3 {
        env.step(1).unwrap();
    }
    env.reset(Some(1)).unwrap();
    assert_eq!(env.road().unwrap().len(), 5);
    assert_eq!(env.steps(), 0);
}

#[test]
fn episode_runs_until_done() -> anyhow::Result<()> {
    let mut env = rl::TimeLimit::new(FastMergeEnv::new(), rl::FAST_MERGE_MAX_STEPS);
    let obs = env.reset(Some(0))?;
    assert_eq!(obs.len(), env.obs_size());
    let mut steps = 0;
    loop {
        let step = env.step(1)?;
        steps += 1;
        assert!(step.reward.is_finite());
        if step.done() {
            break;
        }
    }
    assert!(steps <= rl::FAST_MERGE_MAX_STEPS);
    Ok(())
}

use rl::registry::{self, EnvSpec, Registry, RegistryError, MERGE_ID};
use rl::{register_fast_merge_env, Env, FastMergeEnv, FAST_MERGE_ID, FAST_MERGE_MAX_STEPS};

fn fast_merge_spec() -> EnvSpec {
    EnvSpec::new(FAST_MERGE_ID, "rl::fast_merge::FastMergeEnv", FAST_MERGE_MAX_STEPS, make_fast_merge)
}

fn make_fast_merge() -> Box<dyn Env> {
    Box::new(FastMergeEnv::new())
}

#[test]
fn repeated_registration_is_harmless() -> anyhow::Result<()> {
    register_fast_merge_env()?;
    register_fast_merge_env()?;

    assert!(registry::registered_ids().iter().any(|id| id == FAST_MERGE_ID));
    let mut env = registry::make(FAST_MERGE_ID)?;
    assert_eq!(env.max_episode_steps(), 100);
    let obs = env.reset(Some(0))?;
    assert_eq!(obs.len(), env.obs_size());
    Ok(())
}

#[test]
fn direct_duplicate_is_reported() {
    let mut registry = Registry::new();
    registry.register(fast_merge_spec()).unwrap();
    assert_eq!(
        registry.register(fast_merge_spec()),
        Err(RegistryError::AlreadyRegistered(FAST_MERGE_ID.to_owned()))
    );
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![FAST_MERGE_ID]);
}

#[test]
fn unknown_id_is_an_error() {
    assert!(matches!(
        registry::make("fast-merge-v9"),
        Err(RegistryError::UnknownEnv(id)) if id == "fast-merge-v9"
    ));
    assert!(Registry::new().spec(FAST_MERGE_ID).is_none());
}

#[test]
fn spec_keeps_entry_point_and_limit() {
    let mut registry = Registry::new();
    registry.register(fast_merge_spec()).unwrap();
    let spec = registry.spec(FAST_MERGE_ID).unwrap();
    assert_eq!(spec.entry_point, "rl::fast_merge::FastMergeEnv");
    assert_eq!(spec.max_episode_steps, FAST_MERGE_MAX_STEPS);
    assert_eq!(registry.make(FAST_MERGE_ID).unwrap().max_episode_steps(), FAST_MERGE_MAX_STEPS);
}

#[test]
fn stock_merge_registers_once() {
    // Other tests in this binary may have registered it first.
    let _ = registry::register_merge_env();
    assert!(matches!(
        registry::register_merge_env(),
        Err(RegistryError::AlreadyRegistered(id)) if id == MERGE_ID
    ));
    assert!(registry::make(MERGE_ID).is_ok());
}

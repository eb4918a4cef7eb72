use anyhow::anyhow;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::component::{
    AcceptanceCriterion, BiddingStrategy, ComponentFactory, NegotiationSetup, OpponentModel,
};

pub type ConstructorFunction<T> =
    Box<dyn Fn(&str, serde_yaml::Value, &NegotiationSetup) -> anyhow::Result<T> + Send + Sync>;

pub type OpponentModelConstructor = ConstructorFunction<Box<dyn OpponentModel>>;
pub type BiddingConstructor = ConstructorFunction<Box<dyn BiddingStrategy>>;
pub type CriterionConstructor = ConstructorFunction<Box<dyn AcceptanceCriterion>>;

type Registry<T> = Mutex<HashMap<String, ConstructorFunction<T>>>;

lazy_static! {
    /// Contains functions that can create components by `library::name` path.
    static ref OPPONENT_MODELS: Registry<Box<dyn OpponentModel>> = Mutex::new(HashMap::new());
    static ref BIDDING_STRATEGIES: Registry<Box<dyn BiddingStrategy>> = Mutex::new(HashMap::new());
    static ref CRITERIA: Registry<Box<dyn AcceptanceCriterion>> = Mutex::new(HashMap::new());
}

pub fn opponent_model_factory<T>() -> OpponentModelConstructor
where
    T: ComponentFactory + OpponentModel + 'static,
{
    Box::new(|name, config, setup| {
        Ok(Box::new(T::new(name, config, setup)?) as Box<dyn OpponentModel>)
    })
}

pub fn bidding_factory<T>() -> BiddingConstructor
where
    T: ComponentFactory + BiddingStrategy + 'static,
{
    Box::new(|name, config, setup| {
        Ok(Box::new(T::new(name, config, setup)?) as Box<dyn BiddingStrategy>)
    })
}

pub fn criterion_factory<T>() -> CriterionConstructor
where
    T: ComponentFactory + AcceptanceCriterion + 'static,
{
    Box::new(|name, config, setup| {
        Ok(Box::new(T::new(name, config, setup)?) as Box<dyn AcceptanceCriterion>)
    })
}

fn register<T>(
    registry: &Registry<T>,
    library: &str,
    name: &str,
    constructor: ConstructorFunction<T>,
) {
    match registry.lock() {
        Ok(mut map) => {
            map.insert(format!("{}::{}", library, name), constructor);
        }
        Err(e) => log::error!("Failed to register component '{library}::{name}': {e}"),
    }
}

fn create<T>(
    registry: &Registry<T>,
    kind: &str,
    name_path: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<T> {
    let map = registry
        .lock()
        .map_err(|e| anyhow!("Failed to acquire static {kind} creation lock: {}", e))?;

    match map.get(name_path) {
        Some(constructor) => constructor(name_path, config, setup),
        None => Err(anyhow!("{} '{}' not found.", kind, name_path)),
    }
}

fn contains<T>(registry: &Registry<T>, name_path: &str) -> bool {
    registry
        .lock()
        .map(|map| map.contains_key(name_path))
        .unwrap_or(false)
}

pub fn register_opponent_model(library: &str, name: &str, constructor: OpponentModelConstructor) {
    register(&OPPONENT_MODELS, library, name, constructor)
}

pub fn register_bidding_strategy(library: &str, name: &str, constructor: BiddingConstructor) {
    register(&BIDDING_STRATEGIES, library, name, constructor)
}

pub fn register_criterion(library: &str, name: &str, constructor: CriterionConstructor) {
    register(&CRITERIA, library, name, constructor)
}

pub fn create_static_opponent_model(
    name_path: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn OpponentModel>> {
    create(&OPPONENT_MODELS, "Opponent model", name_path, config, setup)
}

pub fn create_static_bidding_strategy(
    name_path: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn BiddingStrategy>> {
    create(&BIDDING_STRATEGIES, "Bidding strategy", name_path, config, setup)
}

pub fn create_static_criterion(
    name_path: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn AcceptanceCriterion>> {
    create(&CRITERIA, "Acceptance criterion", name_path, config, setup)
}

pub fn is_criterion_registered(name_path: &str) -> bool {
    contains(&CRITERIA, name_path)
}

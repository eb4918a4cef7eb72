use anyhow::bail;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use boa_negotiator_component::static_lib::{
    create_static_bidding_strategy, create_static_criterion, create_static_opponent_model,
};
use boa_negotiator_component::{
    AcceptanceChain, AcceptanceCriterion, BiddingStrategy, ComponentFactory, NegotiationSetup,
    OpponentModel,
};
use boa_outcome_utils::{OutcomeSpace, UtilityFunction};

use crate::aggregator::percentile;
use crate::builtin::{
    FrequencyOpponentModel, OpponentTrend, RelativeBest, ReservationFloor, TimeDependentBidding,
    TimePressure, UtilityThreshold,
};
use crate::negotiators::Deadline;
use crate::BoaNegotiator;

const RESERVATION_FLOOR: &str = "ReservationFloor";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum LoadMode {
    BuiltIn,
    /// Component registered in static registry under `library::name`.
    StaticLib { library: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub load_mode: LoadMode,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl ComponentConfig {
    pub fn builtin(name: &str) -> ComponentConfig {
        ComponentConfig {
            name: name.to_string(),
            load_mode: LoadMode::BuiltIn,
            params: serde_yaml::Value::Null,
        }
    }

    fn name_path(&self, library: &str) -> String {
        format!("{}::{}", library, self.name)
    }
}

/// How own reservation value is determined.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ReservationPolicy {
    Fixed { value: f64 },
    /// Percentile of own utility over `samples` random outcomes.
    Percentile { percentile: f64, samples: usize },
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        ReservationPolicy::Percentile {
            percentile: 15.0,
            samples: 100,
        }
    }
}

impl ReservationPolicy {
    pub fn resolve(
        &self,
        space: &OutcomeSpace,
        utility: &UtilityFunction,
        seed: u64,
    ) -> anyhow::Result<f64> {
        match *self {
            ReservationPolicy::Fixed { value } => {
                if !(0.0..=1.0).contains(&value) {
                    bail!("Reservation value {value} outside of [0, 1].");
                }
                Ok(value)
            }
            ReservationPolicy::Percentile {
                percentile: p,
                samples,
            } => {
                if !(0.0..=100.0).contains(&p) || samples == 0 {
                    bail!("Invalid reservation percentile {p} over {samples} sample(s).");
                }

                let mut rng = StdRng::seed_from_u64(seed);
                let mut utilities = (0..samples)
                    .map(|_| utility.utility(&space.domain().random_outcome(&mut rng)))
                    .collect::<Vec<_>>();
                utilities.sort_by(|a, b| a.total_cmp(b));

                let reservation = percentile(&utilities, p);
                log::debug!(
                    "Reservation value {reservation:.3} ({p}th percentile of {samples} samples)."
                );
                Ok(reservation)
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiatorConfig {
    pub opponent_model: ComponentConfig,
    pub bidding: ComponentConfig,
    /// Evaluated in order. `ReservationFloor` is always put first.
    #[serde(default)]
    pub acceptance: Vec<ComponentConfig>,
    pub deadline: Deadline,
    #[serde(default)]
    pub reservation: ReservationPolicy,
    #[serde(default)]
    pub seed: u64,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        NegotiatorConfig {
            opponent_model: ComponentConfig::builtin("FrequencyOpponentModel"),
            bidding: ComponentConfig::builtin("TimeDependentBidding"),
            acceptance: vec![
                ComponentConfig::builtin("UtilityThreshold"),
                ComponentConfig::builtin("TimePressure"),
                ComponentConfig::builtin("OpponentTrend"),
                ComponentConfig::builtin("RelativeBest"),
            ],
            deadline: Deadline::Rounds { rounds: 100 },
            reservation: ReservationPolicy::default(),
            seed: 0,
        }
    }
}

pub fn create_negotiator(
    config: NegotiatorConfig,
    space: OutcomeSpace,
    utility: UtilityFunction,
) -> anyhow::Result<BoaNegotiator> {
    let reservation = config.reservation.resolve(&space, &utility, config.seed)?;
    let setup = NegotiationSetup::new(space, utility, reservation).with_seed(config.seed);

    let opponent = create_opponent_model(&config.opponent_model, &setup)?;
    let bidding = create_bidding(&config.bidding, &setup)?;

    let mut acceptance = AcceptanceChain::new();
    acceptance.add_component(
        RESERVATION_FLOOR.to_string(),
        Box::new(ReservationFloor::new(setup.reservation)),
    );

    for component in config.acceptance.iter() {
        if component.name == RESERVATION_FLOOR && component.load_mode == LoadMode::BuiltIn {
            log::debug!("{RESERVATION_FLOOR} is always evaluated first, skipping duplicate.");
            continue;
        }
        let criterion = create_criterion(component, &setup)?;
        acceptance.add_component(component.name.clone(), criterion);
    }

    log::info!(
        "Created negotiator: opponent model '{}', bidding '{}', acceptance {:?}, reservation {:.3}.",
        config.opponent_model.name,
        config.bidding.name,
        acceptance.list_components(),
        setup.reservation
    );

    Ok(BoaNegotiator::new(
        setup,
        config.deadline,
        opponent,
        bidding,
        acceptance,
    ))
}

fn create_opponent_model(
    config: &ComponentConfig,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn OpponentModel>> {
    match &config.load_mode {
        LoadMode::BuiltIn => {
            create_builtin_opponent_model(&config.name, config.params.clone(), setup)
        }
        LoadMode::StaticLib { library } => {
            create_static_opponent_model(&config.name_path(library), config.params.clone(), setup)
        }
    }
}

fn create_bidding(
    config: &ComponentConfig,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn BiddingStrategy>> {
    match &config.load_mode {
        LoadMode::BuiltIn => create_builtin_bidding(&config.name, config.params.clone(), setup),
        LoadMode::StaticLib { library } => {
            create_static_bidding_strategy(&config.name_path(library), config.params.clone(), setup)
        }
    }
}

fn create_criterion(
    config: &ComponentConfig,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn AcceptanceCriterion>> {
    match &config.load_mode {
        LoadMode::BuiltIn => create_builtin_criterion(&config.name, config.params.clone(), setup),
        LoadMode::StaticLib { library } => {
            create_static_criterion(&config.name_path(library), config.params.clone(), setup)
        }
    }
}

pub fn create_builtin_opponent_model(
    name: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn OpponentModel>> {
    let model = match name {
        "FrequencyOpponentModel" => {
            Box::new(FrequencyOpponentModel::new(name, config, setup)?) as Box<dyn OpponentModel>
        }
        _ => bail!("BuiltIn opponent model {} doesn't exists.", name),
    };
    Ok(model)
}

pub fn create_builtin_bidding(
    name: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn BiddingStrategy>> {
    let bidding = match name {
        "TimeDependentBidding" => {
            Box::new(TimeDependentBidding::new(name, config, setup)?) as Box<dyn BiddingStrategy>
        }
        _ => bail!("BuiltIn bidding strategy {} doesn't exists.", name),
    };
    Ok(bidding)
}

pub fn create_builtin_criterion(
    name: &str,
    config: serde_yaml::Value,
    setup: &NegotiationSetup,
) -> anyhow::Result<Box<dyn AcceptanceCriterion>> {
    let criterion = match name {
        "ReservationFloor" => {
            Box::new(<ReservationFloor as ComponentFactory>::new(name, config, setup)?)
                as Box<dyn AcceptanceCriterion>
        }
        "UtilityThreshold" => {
            Box::new(UtilityThreshold::new(name, config, setup)?) as Box<dyn AcceptanceCriterion>
        }
        "TimePressure" => {
            Box::new(TimePressure::new(name, config, setup)?) as Box<dyn AcceptanceCriterion>
        }
        "OpponentTrend" => {
            Box::new(OpponentTrend::new(name, config, setup)?) as Box<dyn AcceptanceCriterion>
        }
        "RelativeBest" => {
            Box::new(RelativeBest::new(name, config, setup)?) as Box<dyn AcceptanceCriterion>
        }
        _ => bail!("BuiltIn acceptance criterion {} doesn't exists.", name),
    };
    Ok(criterion)
}

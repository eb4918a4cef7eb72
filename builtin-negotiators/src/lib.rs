pub mod acceptance;
pub mod frequency_model;
pub mod time_dependent;
pub mod trend;

pub use acceptance::{OpponentTrend, RelativeBest, ReservationFloor, TimePressure, UtilityThreshold};
pub use frequency_model::FrequencyOpponentModel;
pub use time_dependent::TimeDependentBidding;

use boa_negotiator_component::static_lib::{
    bidding_factory, criterion_factory, opponent_model_factory, register_bidding_strategy,
    register_criterion, register_opponent_model,
};

pub const LIBRARY: &str = "boa-negotiators";

pub fn register_negotiators() {
    register_opponent_model(
        LIBRARY,
        "FrequencyOpponentModel",
        opponent_model_factory::<FrequencyOpponentModel>(),
    );
    register_bidding_strategy(
        LIBRARY,
        "TimeDependentBidding",
        bidding_factory::<TimeDependentBidding>(),
    );
    register_criterion(
        LIBRARY,
        "ReservationFloor",
        criterion_factory::<ReservationFloor>(),
    );
    register_criterion(
        LIBRARY,
        "UtilityThreshold",
        criterion_factory::<UtilityThreshold>(),
    );
    register_criterion(LIBRARY, "TimePressure", criterion_factory::<TimePressure>());
    register_criterion(LIBRARY, "OpponentTrend", criterion_factory::<OpponentTrend>());
    register_criterion(LIBRARY, "RelativeBest", criterion_factory::<RelativeBest>());
}

use boa_negotiators::builtin::register_negotiators;
use boa_negotiators::factory::{ComponentConfig, LoadMode, ReservationPolicy};
use boa_negotiators::{create_negotiator, Decision, NegotiatorConfig, Outcome};
use boa_negotiators_testing::domains::{holiday, space};

fn static_component(name: &str) -> ComponentConfig {
    ComponentConfig {
        name: name.to_string(),
        load_mode: LoadMode::StaticLib {
            library: "boa-negotiators".to_string(),
        },
        params: serde_yaml::Value::Null,
    }
}

fn example_config() -> NegotiatorConfig {
    NegotiatorConfig {
        opponent_model: static_component("FrequencyOpponentModel"),
        bidding: static_component("TimeDependentBidding"),
        acceptance: vec![
            static_component("UtilityThreshold"),
            static_component("TimePressure"),
        ],
        reservation: ReservationPolicy::Fixed { value: 0.3 },
        ..Default::default()
    }
}

#[test]
fn test_static_library() {
    // Register components as static library instead of using them as builtin.
    register_negotiators();

    let scenario = holiday().unwrap();
    let negotiator =
        create_negotiator(example_config(), space(&scenario), scenario.own.clone()).unwrap();

    assert_eq!(
        negotiator.acceptance().list_components(),
        vec![
            "ReservationFloor".to_string(),
            "UtilityThreshold".to_string(),
            "TimePressure".to_string(),
        ]
    );

    // Paris, 2 weeks, Hotel is our best outcome.
    match negotiator.decide(&Outcome::new(vec![0, 1, 0])).unwrap() {
        Decision::Accept { criterion, .. } => assert_eq!(criterion, "UtilityThreshold"),
        decision => panic!("Expected Accept, got {:?}", decision),
    }

    // Rome, 1 week, Hostel is worth nothing to us.
    assert!(!negotiator
        .decide(&Outcome::new(vec![1, 0, 1]))
        .unwrap()
        .is_accept());
}

#[test]
fn test_unregistered_library() {
    let scenario = holiday().unwrap();
    let config = NegotiatorConfig {
        bidding: ComponentConfig {
            name: "TimeDependentBidding".to_string(),
            load_mode: LoadMode::StaticLib {
                library: "not-registered".to_string(),
            },
            params: serde_yaml::Value::Null,
        },
        ..example_config()
    };

    let error = create_negotiator(config, space(&scenario), scenario.own.clone())
        .err()
        .unwrap();
    assert_eq!(
        error.to_string(),
        "Bidding strategy 'not-registered::TimeDependentBidding' not found."
    );
}

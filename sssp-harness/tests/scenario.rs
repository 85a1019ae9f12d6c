use sssp_harness::sweep::{scenario, Scenario};

#[test]
fn test_scenario_keys() {
    assert_eq!(Scenario::new(0.9, None).key(), "prob_0.9");
    assert_eq!(Scenario::new(0.9, Some(60)).key(), "prob_0.9_delta_60");
    assert_eq!(Scenario::new(1.0, None).key(), "prob_1.0");
    assert_eq!(Scenario::new(0.25, Some(1)).key(), "prob_0.25_delta_1");
    assert_eq!(
        Scenario::from_key("prob_0.9_delta_100"),
        Some(Scenario::new(0.9, Some(100)))
    );
    assert_eq!(Scenario::from_key("prob_1.0"), Some(Scenario::new(1.0, None)));
    assert_eq!(Scenario::from_key("delta_1"), None);
    assert_eq!(
        Scenario::new(0.9, Some(60)).title(),
        "edge probability = 0.9, delta = 60"
    );
}

#[test]
fn test_scenarios_are_probability_major() {
    let all = scenario::scenarios(&[0.5, 0.9], Some(&[1, 60]));
    let keys = all.iter().map(|s| s.key()).collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec![
            "prob_0.5_delta_1",
            "prob_0.5_delta_60",
            "prob_0.9_delta_1",
            "prob_0.9_delta_60"
        ]
    );
    assert_eq!(scenario::scenarios(&[0.5, 0.9], None).len(), 2);
}

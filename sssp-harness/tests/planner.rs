use sssp_harness::sweep::{
    planner::{self, cost},
    GrowthSchedule, GrowthStep, PlanError, SizeSweepPlanner,
};

#[test]
fn test_default_ladder() -> anyhow::Result<()> {
    let sizes = planner::plan(0.5, Some(3e8), 100, None)?;
    assert_eq!(&sizes[..7], &[100, 200, 300, 400, 500, 1000, 2000]);
    assert_eq!(&sizes[sizes.len() - 4..], &[12500, 15000, 17500, 20000]);
    Ok(())
}

#[test]
fn test_budget_bounds_every_size() -> anyhow::Result<()> {
    for &prob in &[0.001, 0.01, 0.1, 0.25, 0.5, 0.9, 1.0] {
        for &budget in &[1e4, 2.5e8, 3e8] {
            let sizes = planner::plan(prob, Some(budget), 100, None)?;
            assert!(sizes.iter().all(|&s| cost(s, prob) <= budget));
            assert!(sizes.windows(2).all(|w| w[0] < w[1]));
            // The next size would break the budget
            if let Some(&last) = sizes.last() {
                let next = last + GrowthSchedule::default().step_at(last);
                assert!(cost(next, prob) > budget);
            }
        }
    }
    Ok(())
}

#[test]
fn test_budget_is_inclusive() -> anyhow::Result<()> {
    // 200² × 0.5 = 20000
    let sizes = planner::plan(0.5, Some(20000.0), 100, None)?;
    assert_eq!(sizes, vec![100, 200]);
    Ok(())
}

#[test]
fn test_start_size_over_budget() -> anyhow::Result<()> {
    let sizes = planner::plan(1.0, Some(100.0), 100, None)?;
    assert!(sizes.is_empty());
    Ok(())
}

#[test]
fn test_size_cap() -> anyhow::Result<()> {
    let sizes = planner::plan(0.9, Some(3e8), 1000, Some(10000))?;
    assert_eq!(sizes.first(), Some(&1000));
    assert_eq!(sizes.last(), Some(&10000));
    assert_eq!(sizes.len(), 10);
    // Without a budget the cap alone bounds the sweep
    let sizes = planner::plan(0.9, None, 1000, Some(25000))?;
    assert_eq!(sizes.last(), Some(&25000));
    assert_eq!(
        &sizes[9..],
        &[10000, 12500, 15000, 17500, 20000, 25000]
    );
    Ok(())
}

#[test]
fn test_budget_and_cap_smaller_wins() -> anyhow::Result<()> {
    let sizes = planner::plan(0.9, Some(3e8), 1000, Some(25000))?;
    assert_eq!(sizes.last(), Some(&17500));
    assert_eq!(sizes.len(), 13);
    Ok(())
}

#[test]
fn test_invalid_inputs() {
    assert_eq!(
        planner::plan(0.0, Some(3e8), 100, None),
        Err(PlanError::InvalidProbability(0.0))
    );
    assert_eq!(
        planner::plan(1.5, Some(3e8), 100, None),
        Err(PlanError::InvalidProbability(1.5))
    );
    assert_eq!(
        planner::plan(0.5, Some(-1.0), 100, None),
        Err(PlanError::InvalidBudget(-1.0))
    );
    assert_eq!(
        planner::plan(0.5, None, 100, None),
        Err(PlanError::Unbounded(0.5))
    );
    assert_eq!(
        planner::plan(0.5, Some(3e8), 0, None),
        Err(PlanError::ZeroStartSize)
    );
    assert!(matches!(
        planner::plan(f64::NAN, Some(3e8), 100, None),
        Err(PlanError::InvalidProbability(_))
    ));
}

#[test]
fn test_custom_schedule() -> anyhow::Result<()> {
    let schedule = GrowthSchedule {
        steps: vec![GrowthStep { below: 30, step: 10 }],
        tail: 50,
    };
    let planner = SizeSweepPlanner::new(None)
        .start_size(10)
        .schedule(schedule);
    assert_eq!(planner.plan(1.0, Some(150))?, vec![10, 20, 30, 80, 130]);
    let zero = GrowthSchedule {
        steps: vec![GrowthStep { below: 30, step: 0 }],
        tail: 50,
    };
    let planner = SizeSweepPlanner::new(Some(1e6)).schedule(zero);
    assert_eq!(planner.plan(1.0, None), Err(PlanError::ZeroStep { below: 30 }));
    Ok(())
}

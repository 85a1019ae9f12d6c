use polars::prelude::*;

use crate::charts::ScenarioSeries;

/// One row per `(scenario, variant, vertices)` speedup point.
pub fn speedup_points(series: &[ScenarioSeries]) -> PolarsResult<DataFrame> {
    let mut scenario = Vec::new();
    let mut variant = Vec::new();
    let mut vertices = Vec::new();
    let mut speedup = Vec::new();
    for s in series {
        for (label, values) in &s.speedups {
            for (v, x) in s.vertices.iter().zip(values) {
                scenario.push(s.stem());
                variant.push(label.clone());
                vertices.push(*v as u64);
                speedup.push(*x);
            }
        }
    }
    DataFrame::new(vec![
        Series::new("scenario", scenario),
        Series::new("variant", variant),
        Series::new("vertices", vertices),
        Series::new("speedup", speedup),
    ])
}

/// Speedup statistics per variant. Undefined points (zero) are left out.
pub fn speedup_summary(points: &DataFrame) -> PolarsResult<DataFrame> {
    points
        .clone()
        .lazy()
        .filter(col("speedup").gt(lit(0.0f64)))
        .group_by(["variant"])
        .agg([
            len().alias("points"),
            col("speedup").min().alias("min"),
            col("speedup").max().alias("max"),
            col("speedup").mean().alias("mean"),
            col("speedup")
                .product()
                .pow(lit(1.0f64) / len())
                .alias("geomean"),
        ])
        .sort_by_exprs([col("variant")], [false], false, true)
        .collect()
}

/// Speedup at the largest vertex count of every scenario.
pub fn largest_size_speedups(points: &DataFrame) -> PolarsResult<DataFrame> {
    points
        .clone()
        .lazy()
        .group_by(["scenario", "variant"])
        .agg([
            col("vertices").max().alias("vertices"),
            col("speedup")
                .sort_by([col("vertices")], [false])
                .last()
                .alias("speedup"),
        ])
        .sort_by_exprs(
            [col("scenario"), col("variant")],
            [false, false],
            false,
            true,
        )
        .collect()
}

use clap::Parser;

use crate::{
    commands::ProfileArgs,
    sweep::{Progress, ResultStore},
    utils::md::MarkdownPrinter,
};

/// Print the planned vertex sizes of every scenario and how much of each is cached
#[derive(Parser, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    /// Override the work budget (vertices² × probability)
    #[arg(long)]
    pub budget: Option<f64>,
}

fn status(progress: &Progress) -> String {
    match progress {
        Progress::Absent => "pending".to_owned(),
        Progress::Partial { done, total } => format!("partial ({}/{})", done, total),
        Progress::Complete => "complete".to_owned(),
        Progress::Stale(reason) => format!("stale: {}", reason),
    }
}

impl PlanArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let mut loaded = self.profile.load()?;
        if let Some(budget) = self.budget {
            loaded.profile.budget = Some(budget);
        }
        let profile = &loaded.profile;
        let plan = profile.execution_plan()?;
        let labels = plan.labels();
        let planner = profile.planner();
        let catalog = ResultStore::new(loaded.results_path()).load()?;
        let mut printer = MarkdownPrinter::new();
        printer.add(format!("# Sweep Plan: `{}`\n\n", loaded.name));
        printer.add(format!("* baseline: `{}`\n", plan.baseline().label));
        printer.add(format!("* implementations: `{}`\n", labels.join("`, `")));
        printer.add(format!("* results: `{}`\n\n", loaded.results_path().display()));
        let mut rows = Vec::new();
        let mut cells = 0;
        for scenario in profile.scenarios() {
            let sweep = planner.plan(scenario.prob, profile.cap_for(scenario.prob))?;
            let progress = catalog.progress(&scenario.key(), &sweep, &labels);
            let sizes = match (sweep.first(), sweep.last()) {
                (Some(first), Some(last)) => format!("{} .. {}", first, last),
                _ => "-".to_owned(),
            };
            cells += match progress {
                Progress::Complete => 0,
                Progress::Partial { done, total } => total - done,
                _ => sweep.len(),
            };
            rows.push(vec![
                format!("`{}`", scenario.key()),
                sweep.len().to_string(),
                sizes,
                status(&progress),
            ]);
        }
        printer.add_table(
            &[
                "scenario".to_owned(),
                "sizes".to_owned(),
                "vertices".to_owned(),
                "status".to_owned(),
            ],
            &rows,
        );
        printer.add(format!(
            "\n{} cells to run, {} invocations each.\n",
            cells,
            labels.len()
        ));
        printer.dump();
        Ok(())
    }
}

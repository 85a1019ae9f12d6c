use std::path::Path;

use crate::{
    commands::run::{runner::SweepRunner, RunArgs},
    configs::{harness::LoadedProfile, run_info::RunInfo},
    sweep::{exec::resolve_executable, ExecutionPlan},
};

struct PreRunChecker<'a> {
    warnings: Vec<String>,
    #[allow(unused)]
    allow_multi_user: bool,
    #[allow(unused)]
    allow_any_scaling_governor: bool,
    loaded: &'a LoadedProfile,
    plan: &'a ExecutionPlan,
    #[allow(unused)]
    run: &'a RunInfo,
}

impl<'a> PreRunChecker<'a> {
    fn new(args: &RunArgs, loaded: &'a LoadedProfile, plan: &'a ExecutionPlan, run: &'a RunInfo) -> Self {
        Self {
            warnings: Vec::new(),
            allow_multi_user: args.allow_multi_user,
            allow_any_scaling_governor: args.allow_any_scaling_governor,
            loaded,
            plan,
            run,
        }
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_owned());
    }

    fn check_implementations(&mut self) -> anyhow::Result<()> {
        let count = self.plan.implementations().count();
        if count == 1 {
            self.warn("Only one implementation: no speedup will be reported.");
        }
        if count > SweepRunner::MAX_SUPPORTED_IMPLEMENTATIONS {
            anyhow::bail!(
                "Too many implementations. Maximum supported is {}.",
                SweepRunner::MAX_SUPPORTED_IMPLEMENTATIONS
            );
        }
        let work_dir = self.loaded.work_dir();
        if !work_dir.is_dir() {
            anyhow::bail!("Work dir not found: {}", work_dir.display());
        }
        for implementation in self.plan.implementations() {
            let exe = resolve_executable(&work_dir, &implementation.executable);
            // Bare names are resolved through PATH at launch
            if exe == implementation.executable && exe.components().count() <= 1 {
                continue;
            }
            if !exe.is_file() {
                anyhow::bail!(
                    "Executable for `{}` not found: {}",
                    implementation.label,
                    exe.display()
                );
            }
            if !is_executable(&exe) {
                anyhow::bail!(
                    "`{}` is not executable: {}",
                    implementation.label,
                    exe.display()
                );
            }
        }
        Ok(())
    }

    fn check_scenarios(&mut self) -> anyhow::Result<()> {
        let loaded = self.loaded;
        let profile = &loaded.profile;
        if profile.probabilities.is_empty() {
            anyhow::bail!("No edge probabilities in profile `{}`.", loaded.name);
        }
        if profile.deltas.as_ref().is_some_and(|d| d.is_empty()) {
            anyhow::bail!("`deltas` is set but empty in profile `{}`.", loaded.name);
        }
        if profile.deltas.as_ref().is_some_and(|d| d.contains(&0)) {
            anyhow::bail!("Step sizes must be positive.");
        }
        let planner = profile.planner();
        for scenario in profile.scenarios() {
            let sweep = planner.plan(scenario.prob, profile.cap_for(scenario.prob))?;
            if sweep.is_empty() {
                self.warn(format!(
                    "{}: the start size {} is already over budget, nothing will run.",
                    scenario.key(),
                    profile.start_size
                ));
            }
        }
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn check_system(&mut self) -> anyhow::Result<()> {
        let system = &self.run.system;
        // Check if the current user is the only one logged in
        if system.users.len() > 1 {
            let msg = format!("More than one user logged in: {}", system.users.join(", "));
            if self.allow_multi_user {
                self.warn(msg);
            } else {
                anyhow::bail!("{}", msg);
            }
        }
        // Check if all the scaling governors are set to `performance`
        if !system.scaling_governor.iter().all(|g| g == "performance") {
            let msg = format!(
                "Not all scaling governors are set to `performance`: [{}]",
                system.scaling_governor.join(", ")
            );
            if self.allow_any_scaling_governor {
                self.warn(msg);
            } else {
                anyhow::bail!("{}", msg);
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn check_system(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn check(&mut self) -> anyhow::Result<()> {
        self.check_implementations()?;
        self.check_scenarios()?;
        self.check_system()?;
        Ok(())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

pub fn check(
    args: &RunArgs,
    loaded: &LoadedProfile,
    plan: &ExecutionPlan,
    run: &RunInfo,
) -> anyhow::Result<()> {
    let mut checker = PreRunChecker::new(args, loaded, plan, run);
    checker.check()?;
    super::dump_warnings("Pre-Run Checks", &checker.warnings);
    Ok(())
}

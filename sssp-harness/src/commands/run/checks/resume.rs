use std::cell::RefCell;

use colored::{Colorize, CustomColor};
use once_cell::sync::Lazy;

use crate::configs::run_info::RunInfo;

static BG: Lazy<CustomColor> = Lazy::new(|| CustomColor::new(0x23, 0x23, 0x23));

/// Compares the run that produced the partial results with the one resuming them.
struct ResumeChecker<'a, 'b> {
    warnings: RefCell<Vec<String>>,
    changed: RefCell<Vec<String>>,
    old: &'a RunInfo,
    new: &'b RunInfo,
}

impl<'a, 'b> ResumeChecker<'a, 'b> {
    fn new(old: &'a RunInfo, new: &'b RunInfo) -> Self {
        Self {
            warnings: RefCell::new(Vec::new()),
            changed: RefCell::new(Vec::new()),
            old,
            new,
        }
    }

    fn warn(&self, name: &str, msg: impl AsRef<str>) {
        self.changed.borrow_mut().push(name.to_owned());
        self.warnings.borrow_mut().push(msg.as_ref().to_owned());
    }

    fn warn_changed(&self, name: impl AsRef<str>, old: impl AsRef<str>, new: impl AsRef<str>) {
        self.warn(name.as_ref(), format!(
            "{}: {} ➔ {}",
            name.as_ref().bold(),
            old.as_ref().italic().on_custom_color(*BG),
            new.as_ref().italic().on_custom_color(*BG)
        ));
    }

    fn check_changed(&self, name: impl AsRef<str>, old: impl AsRef<str>, new: impl AsRef<str>) {
        if old.as_ref() != new.as_ref() {
            self.warn_changed(name, old, new);
        }
    }

    fn check_changed_mem(&self, name: impl AsRef<str>, old: usize, new: usize) {
        let to_gb = |x: usize| format!("{:.1}GB", x as f64 / 1024.0 / 1024.0 / 1024.0);
        if old != new {
            self.warn_changed(name, to_gb(old), to_gb(new));
        }
    }

    fn check(&self) {
        let old = &self.old;
        let new = &self.new;
        self.check_changed("Host", &old.system.host, &new.system.host);
        self.check_changed("OS", &old.system.os, &new.system.os);
        self.check_changed("Arch", &old.system.arch, &new.system.arch);
        self.check_changed("Kernel", &old.system.kernel, &new.system.kernel);
        self.check_changed("CPU", &old.system.cpu_model, &new.system.cpu_model);
        self.check_changed_mem("Memory", old.system.memory_size, new.system.memory_size);
        if old.profile.env != new.profile.env {
            let mut s = "Profile Environment Variables Changed:\n".to_owned();
            let mut list_env = |name: &str, old: &str, new: &str| {
                s += &format!(
                    "   {} {}: {} {} {}\n",
                    "•".bright_red(),
                    name,
                    old.italic(),
                    "➔".bold(),
                    new.italic(),
                );
            };
            for (k, v) in &new.profile.env {
                if old.profile.env.get(k) != Some(v) {
                    list_env(k, old.profile.env.get(k).map(|s| s.as_str()).unwrap_or(""), v);
                }
            }
            for (k, v) in &old.profile.env {
                if !new.profile.env.contains_key(k) {
                    list_env(k, v, "");
                }
            }
            self.warn("Profile Environment", s.trim_end());
        }
        if old.profile.sampling != new.profile.sampling {
            self.warn_changed(
                "Sampling",
                format!("{:?}", old.profile.sampling),
                format!("{:?}", new.profile.sampling),
            );
        }
        if old.profile.implementations != new.profile.implementations {
            self.warn(
                "Implementations",
                "Implementations changed since the partial results were recorded.",
            );
        }
        if old.commit != new.commit {
            self.check_changed("Commit", &old.commit, &new.commit);
        }
    }
}

/// Warn about environment differences between the previous run and this one.
/// Returns the names of everything that changed.
pub fn check(old: &RunInfo, new: &RunInfo) -> Vec<String> {
    let checker = ResumeChecker::new(old, new);
    checker.check();
    super::dump_warnings(
        "Resume: Environment Differs From The Previous Run",
        &checker.warnings.borrow(),
    );
    checker.changed.into_inner()
}

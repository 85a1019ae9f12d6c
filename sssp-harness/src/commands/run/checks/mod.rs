use colored::Colorize;

mod pre_run;
mod resume;

pub use pre_run::check as pre_run_check;
pub use resume::check as resume_check;

fn dump_warnings(title: &str, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("{}\n", title.bold().black().on_red());
    for msg in warnings {
        eprintln!("{} {}", "•".bright_red(), msg.red());
    }
    eprintln!();
}

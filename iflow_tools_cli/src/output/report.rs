use colored::*;
use iflow_tools_core::{Job, JobOutcome, RunReport, StepStatus};
use std::time::Duration;

/// Print the invocations a run would perform, without running them
pub fn print_plan(jobs: &[Job]) {
    for job in jobs {
        println!("{}", format!("[{}]", job.label).cyan());
        for step in &job.steps {
            println!("  {}", step.command_line());
        }
    }
}

/// Header line printed above a finished job's output
pub fn format_job_header(outcome: &JobOutcome) -> String {
    let status = if outcome.is_success() {
        "ok".green()
    } else {
        "failed".red()
    };
    format!(
        "{} {} ({}, {})",
        "==>".bold(),
        outcome.label.bold(),
        status,
        format_duration(outcome.duration)
    )
}

/// Print a finished job: header and captured output on stdout, tool stderr on stderr
pub fn print_job_outcome(outcome: &JobOutcome) {
    println!("{}", format_job_header(outcome));

    if let Some(reason) = &outcome.aborted {
        eprintln!("{}", format!("job aborted: {reason}").red());
    }

    for step in &outcome.steps {
        match &step.status {
            StepStatus::Skipped => {
                println!(
                    "{}",
                    format!("skipped: {}", step.invocation.command_line()).yellow()
                );
                continue;
            }
            StepStatus::SpawnFailed { message } => {
                eprintln!(
                    "{}",
                    format!("could not start {}: {message}", step.invocation.program).red()
                );
                continue;
            }
            StepStatus::Failed { code } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                eprintln!(
                    "{}",
                    format!("{} exited with {code}", step.invocation.program).red()
                );
            }
            StepStatus::Succeeded => {}
        }
        if !step.stdout.is_empty() {
            print!("{}", with_trailing_newline(&step.stdout));
        }
        if !step.stderr.is_empty() {
            eprint!("{}", with_trailing_newline(&step.stderr));
        }
    }
}

/// One line summarizing a run
pub fn format_summary(report: &RunReport) -> String {
    let line = format!(
        "{} job(s): {} succeeded, {} failed in {}",
        report.outcomes.len(),
        report.succeeded(),
        report.failed(),
        format_duration(report.duration)
    );
    if report.is_success() {
        line.green().to_string()
    } else {
        line.red().to_string()
    }
}

pub fn print_summary(report: &RunReport) {
    eprintln!("\n{}", format_summary(report));
    for outcome in report.failed_jobs() {
        eprintln!("  {} {}", "✗".red(), outcome.label);
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

fn with_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

//! Parallel execution of tool invocations
//!
//! Every job runs in its own tokio task. Jobs are independent: there is no
//! ordering between them, no cancellation, no timeout and no retry. The
//! runner waits for all of them and reports how each one ended.

use serde::Serialize;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::invocation::{Invocation, Job};

/// How a single step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    /// Exited non-zero; `code` is `None` when killed by a signal
    Failed { code: Option<i32> },
    /// The binary could not be started at all
    SpawnFailed { message: String },
    /// Not run because an earlier step of the same job failed
    Skipped,
}

/// Result of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub invocation: Invocation,
    #[serde(flatten)]
    pub status: StepStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }

    fn skipped(invocation: Invocation) -> Self {
        Self {
            invocation,
            status: StepStatus::Skipped,
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Result of one job
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub label: String,
    pub steps: Vec<StepOutcome>,
    /// Set when the task running the job panicked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    pub duration: Duration,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.steps.iter().all(StepOutcome::is_success)
    }
}

/// Outcomes of a run, in completion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<JobOutcome>,
    pub duration: Duration,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Runs jobs concurrently, optionally bounded
#[derive(Debug, Clone)]
pub struct ParallelRunner {
    max_parallel: usize,
}

impl ParallelRunner {
    /// `max_parallel == 0` starts every job at once
    pub fn new(max_parallel: usize) -> Self {
        Self { max_parallel }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Run all jobs and wait for every one of them
    pub async fn run(&self, jobs: Vec<Job>) -> RunReport {
        self.run_with(jobs, |_| {}).await
    }

    /// Run all jobs, calling `on_complete` as each job finishes
    pub async fn run_with<F>(&self, jobs: Vec<Job>, mut on_complete: F) -> RunReport
    where
        F: FnMut(&JobOutcome),
    {
        let start = Instant::now();
        let semaphore = (self.max_parallel > 0).then(|| Arc::new(Semaphore::new(self.max_parallel)));
        let mut tasks = JoinSet::new();
        let mut labels = HashMap::new();

        log::debug!(
            "Starting {} job(s), max parallel {}",
            jobs.len(),
            self.max_parallel
        );

        for job in jobs {
            let label = job.label.clone();
            let semaphore = semaphore.clone();
            let handle = tasks.spawn(async move {
                // Held until the job finishes
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                run_job(job).await
            });
            labels.insert(handle.id(), label);
        }

        let mut outcomes = Vec::with_capacity(labels.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let outcome = match joined {
                Ok((_, outcome)) => outcome,
                Err(e) => {
                    let label = labels.remove(&e.id()).unwrap_or_default();
                    log::error!("Job {label} did not complete: {e}");
                    JobOutcome {
                        label,
                        steps: Vec::new(),
                        aborted: Some(e.to_string()),
                        duration: Duration::ZERO,
                    }
                }
            };
            on_complete(&outcome);
            outcomes.push(outcome);
        }

        RunReport {
            outcomes,
            duration: start.elapsed(),
        }
    }
}

async fn run_job(job: Job) -> JobOutcome {
    let start = Instant::now();
    let mut steps = Vec::with_capacity(job.steps.len());
    let mut failed = false;

    for invocation in job.steps {
        if failed {
            steps.push(StepOutcome::skipped(invocation));
            continue;
        }
        let outcome = run_step(invocation).await;
        failed = !outcome.is_success();
        steps.push(outcome);
    }

    JobOutcome {
        label: job.label,
        steps,
        aborted: None,
        duration: start.elapsed(),
    }
}

async fn run_step(invocation: Invocation) -> StepOutcome {
    log::debug!(
        "Spawning in {}: {}",
        invocation.cwd.display(),
        invocation.command_line()
    );
    let start = Instant::now();
    let result = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .output()
        .await;
    let duration = start.elapsed();

    match result {
        Ok(output) => {
            let status = if output.status.success() {
                StepStatus::Succeeded
            } else {
                StepStatus::Failed {
                    code: output.status.code(),
                }
            };
            log::debug!("{} finished: {status:?}", invocation.program);
            StepOutcome {
                invocation,
                status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                duration,
            }
        }
        Err(e) => {
            log::warn!("Failed to start {}: {e}", invocation.program);
            StepOutcome {
                status: StepStatus::SpawnFailed {
                    message: e.to_string(),
                },
                invocation,
                stdout: String::new(),
                stderr: String::new(),
                duration,
            }
        }
    }
}

// Scripted workflow simulation.
// Drives the portfolio's automation card: a fixed step script advanced on
// timed delays. The run is a state machine that always ends in a terminal
// state, either completed or cancelled.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::sleep;

/// Kind of a workflow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Trigger,
    Agent,
    Api,
    Condition,
    Output,
}

/// Role of the simulated agent executing a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Researcher,
    Writer,
    Editor,
    Analyst,
}

/// One scripted step of the simulated workflow.
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub id: &'static str,
    pub name: String,
    pub kind: StepKind,
    pub agent: Option<AgentRole>,
    /// Scripted duration of this step.
    pub duration: Duration,
    /// Scripted output line logged on completion.
    pub output: String,
}

impl WorkflowStep {
    pub fn new(
        id: &'static str,
        name: impl Into<String>,
        kind: StepKind,
        duration: Duration,
        output: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            agent: None,
            duration,
            output: output.into(),
        }
    }

    pub fn with_agent(mut self, agent: AgentRole) -> Self {
        self.agent = Some(agent);
        self
    }
}

/// State of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running {
        current: usize,
    },
    Completed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Cancelled)
    }
}

/// A timestamped line in the run's activity log.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogLine {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Runs a scripted workflow step by step.
pub struct WorkflowRunner {
    steps: Vec<WorkflowStep>,
    state: RunState,
    logs: Vec<LogLine>,
    completed: Vec<bool>,
}

impl WorkflowRunner {
    pub fn new(steps: Vec<WorkflowStep>) -> Self {
        let completed = vec![false; steps.len()];
        Self {
            steps,
            state: RunState::Idle,
            logs: Vec::new(),
            completed,
        }
    }

    /// Runner loaded with the default content-pipeline script.
    pub fn with_default_script() -> Self {
        Self::new(default_steps())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn logs(&self) -> &[LogLine] {
        &self.logs
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    /// Whether the step at `index` has finished in the current run.
    pub fn is_step_completed(&self, index: usize) -> bool {
        self.completed.get(index).copied().unwrap_or(false)
    }

    /// Return to idle with empty logs and no completed steps.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.logs.clear();
        self.completed.fill(false);
    }

    /// Execute the script from the beginning.
    ///
    /// Sleeps each step's scripted duration, logging a start and a
    /// completion line per step. The cancellation flag is honored at
    /// every delay; a run that began from a terminal state starts over.
    /// Returns the terminal state reached.
    pub async fn run(&mut self, cancel: &mut watch::Receiver<bool>) -> RunState {
        self.reset();
        self.log("> initializing workflow");

        for i in 0..self.steps.len() {
            self.state = RunState::Running { current: i };

            let (name, duration, output) = {
                let step = &self.steps[i];
                (step.name.clone(), step.duration, step.output.clone())
            };
            self.log(format!("▸ starting {name}"));

            tokio::select! {
                _ = sleep(duration) => {}
                _ = cancelled(cancel) => {
                    self.state = RunState::Cancelled;
                    return self.state;
                }
            }

            self.log(format!("✓ {output}"));
            self.completed[i] = true;
        }

        self.log("> workflow complete");
        self.state = RunState::Completed;
        self.state
    }

    fn log(&mut self, message: impl Into<String>) {
        self.logs.push(LogLine::new(message));
    }
}

/// Resolves once the cancellation flag flips to true. If the sender is
/// gone the run can no longer be cancelled, so this never resolves.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// The default script: the content-automation pipeline shown on the
/// portfolio's automation card.
pub fn default_steps() -> Vec<WorkflowStep> {
    vec![
        WorkflowStep::new(
            "trigger",
            "Webhook: topic received",
            StepKind::Trigger,
            Duration::from_millis(500),
            "webhook received",
        ),
        WorkflowStep::new(
            "research",
            "Researcher: analyzing sources",
            StepKind::Agent,
            Duration::from_millis(3000),
            "found 12 sources, extracted 4,200 tokens of context",
        )
        .with_agent(AgentRole::Researcher),
        WorkflowStep::new(
            "draft",
            "Writer: generating article",
            StepKind::Agent,
            Duration::from_millis(4000),
            "generated 1,200-word draft with 3 sections",
        )
        .with_agent(AgentRole::Writer),
        WorkflowStep::new(
            "review",
            "Editor: quality check",
            StepKind::Agent,
            Duration::from_millis(2000),
            "SEO 87/100, readability grade 9, approved",
        )
        .with_agent(AgentRole::Editor),
        WorkflowStep::new(
            "publish",
            "CMS: publishing",
            StepKind::Api,
            Duration::from_millis(1000),
            "publish skipped (simulation)",
        ),
    ]
}

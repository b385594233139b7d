// Simulation module for the portfolio's animated cards.
// Scripted state machines only; rendering belongs to the consumer.

pub mod workflow;

pub use workflow::{
    AgentRole, LogLine, RunState, StepKind, WorkflowRunner, WorkflowStep, default_steps,
};

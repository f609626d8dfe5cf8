//! Reinforcement-learning environment over the supervised emulator.

mod action;
mod environment;

pub use action::ActionSampler;
pub use action::ActionSpace;
pub use action::DEFAULT_ACTION_COUNT;
pub use environment::DaggorathEnv;
pub use environment::Observation;
pub use environment::StepInfo;
pub use environment::StepResult;
pub use environment::parse_heartrate;

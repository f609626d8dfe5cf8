//! Gym-style environment wrapping a supervised MAME process.
//!
//! The autoboot Lua script prints `heartrate:<n>` lines on standard output.
//! Each [`DaggorathEnv::step`] consumes exactly one output line.

use super::action::ActionSpace;
use crate::EmulatorError;
use crate::emulator::LaunchCommand;
use crate::emulator::ProcessSupervisor;

/// Observation vector: the player's heart rate clamped to `0..=255`.
pub type Observation = [u8; 1];

const HEARTRATE_PREFIX: &str = "heartrate:";

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// The observation after taking the action.
    pub observation: Observation,
    /// The reward for this step.
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
    /// Additional information about the step.
    pub info: StepInfo,
}

/// Additional information returned from a step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// The output line consumed by this step, if any.
    pub raw_line: Option<String>,
    /// Steps taken since the last reset, including this one.
    pub step: u64,
    /// Termination reason if done.
    pub termination_reason: Option<String>,
}

/// Parses a `heartrate:<n>` line. Whitespace around `<n>` is ignored.
#[must_use]
pub fn parse_heartrate(line: &str) -> Option<i64> {
    line.trim_end()
        .strip_prefix(HEARTRATE_PREFIX)?
        .trim()
        .parse()
        .ok()
}

/// Environment driving Dungeons of Daggorath through a [`ProcessSupervisor`].
///
/// # Examples
///
/// ```
/// use daggym_core::EmulatorConfig;
/// use daggym_core::env::DaggorathEnv;
/// use daggym_core::test_utils::ScriptedSupervisor;
///
/// let supervisor = ScriptedSupervisor::stdout(["heartrate:72"]);
/// let mut env = DaggorathEnv::new(supervisor, EmulatorConfig::default().command());
/// assert_eq!(env.reset().unwrap(), [0]);
///
/// let result = env.step(1).unwrap();
/// assert_eq!(result.observation, [72]);
/// assert_eq!(result.reward, 72.0);
///
/// assert!(env.step(0).unwrap().done);
/// env.close().unwrap();
/// ```
pub struct DaggorathEnv<S: ProcessSupervisor> {
    supervisor: S,
    command: LaunchCommand,
    action_space: ActionSpace,
    process: Option<S::Handle>,
    observation: Observation,
    steps: u64,
    done: bool,
}

impl<S: ProcessSupervisor> DaggorathEnv<S> {
    /// Creates an environment that launches `command` on reset.
    pub fn new(supervisor: S, command: LaunchCommand) -> Self {
        Self {
            supervisor,
            command,
            action_space: ActionSpace::default(),
            process: None,
            observation: [0],
            steps: 0,
            done: false,
        }
    }

    /// Replaces the action space.
    #[must_use]
    pub fn with_action_space(mut self, space: ActionSpace) -> Self {
        self.action_space = space;
        self
    }

    /// The action space.
    pub const fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    /// Most recent observation.
    pub const fn observation(&self) -> Observation {
        self.observation
    }

    /// Returns `true` while an emulator process is attached.
    pub const fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// The underlying supervisor.
    pub const fn supervisor(&self) -> &S {
        &self.supervisor
    }

    /// Restarts the emulator and returns the initial observation `[0]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the old process cannot be stopped or the new one
    /// cannot be spawned.
    pub fn reset(&mut self) -> Result<Observation, EmulatorError> {
        self.close()?;
        self.process = Some(self.supervisor.spawn(&self.command)?);
        self.observation = [0];
        self.steps = 0;
        self.done = false;
        Ok(self.observation)
    }

    /// Takes `action` and consumes the next output line.
    ///
    /// A `heartrate:<n>` line yields observation `[min(n, 255)]` and reward
    /// `n`. Any other line keeps the previous observation with reward 0. End
    /// of output ends the episode.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::InvalidAction`] for an action outside the
    /// space and [`EmulatorError::NotRunning`] before the first reset.
    pub fn step(&mut self, action: u32) -> Result<StepResult, EmulatorError> {
        if !self.action_space.contains(action) {
            return Err(EmulatorError::InvalidAction {
                action,
                n: self.action_space.n(),
            });
        }

        if self.done {
            return Ok(self.terminal_result("episode already done"));
        }

        let process = self.process.as_mut().ok_or(EmulatorError::NotRunning)?;
        // Actions are not yet delivered to the game.
        tracing::debug!(action, "step");

        self.steps += 1;
        let Some(line) = self.supervisor.read_line(process) else {
            self.done = true;
            tracing::info!(steps = self.steps, "emulator output ended");
            return Ok(self.terminal_result("emulator output ended"));
        };

        let text = line.text().to_string();
        let reward = match parse_heartrate(&text).filter(|_| line.is_stdout()) {
            Some(rate) => {
                self.observation = [u8::try_from(rate.clamp(0, 255)).unwrap_or(u8::MAX)];
                rate as f64
            }
            None => {
                if text.starts_with(HEARTRATE_PREFIX) {
                    tracing::warn!(line = %text, "unparseable heart rate");
                }
                0.0
            }
        };

        Ok(StepResult {
            observation: self.observation,
            reward,
            done: false,
            info: StepInfo {
                raw_line: Some(text),
                step: self.steps,
                termination_reason: None,
            },
        })
    }

    /// Stops the emulator. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be stopped.
    pub fn close(&mut self) -> Result<(), EmulatorError> {
        if let Some(process) = self.process.take() {
            self.supervisor.terminate(process)?;
        }
        Ok(())
    }

    fn terminal_result(&self, reason: &str) -> StepResult {
        StepResult {
            observation: self.observation,
            reward: 0.0,
            done: true,
            info: StepInfo {
                raw_line: None,
                step: self.steps,
                termination_reason: Some(reason.to_string()),
            },
        }
    }
}

impl<S: ProcessSupervisor> Drop for DaggorathEnv<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to stop emulator: {e}");
        }
    }
}

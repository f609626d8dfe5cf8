//! Play command: one episode of random actions against a live emulator.

use crate::cli::PlayArgs;
use crate::error::convert_emulator_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use daggym_core::EmulatorConfig;
use daggym_core::ProcessSupervisor;
use daggym_core::SystemSupervisor;
use daggym_core::env::ActionSampler;
use daggym_core::env::DaggorathEnv;
use daggym_core::env::Observation;
use serde::Serialize;

/// Outcome of one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub steps: u64,
    pub total_reward: f64,
    pub final_observation: Observation,
    pub done: bool,
    pub seed: u64,
}

pub fn execute(args: &PlayArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let profile = if args.debug {
        EmulatorConfig::debug()
    } else {
        EmulatorConfig::standard()
    };
    let command = profile.with_program(&args.program).command();

    let env = DaggorathEnv::new(SystemSupervisor, command);
    let summary = run_episode(env, args.steps, args.seed).map_err(convert_emulator_error)?;

    formatter.format_episode(&summary)
}

/// Resets `env` and steps it with sampled actions until the episode ends or
/// `max_steps` is reached.
fn run_episode<S: ProcessSupervisor>(
    mut env: DaggorathEnv<S>,
    max_steps: u64,
    seed: u64,
) -> Result<EpisodeSummary, daggym_core::EmulatorError> {
    let mut rng = ActionSampler::new(seed);
    let mut summary = EpisodeSummary {
        steps: 0,
        total_reward: 0.0,
        final_observation: env.reset()?,
        done: false,
        seed,
    };

    while summary.steps < max_steps {
        let action = env.action_space().sample(&mut rng);
        let result = env.step(action)?;
        summary.total_reward += result.reward;
        summary.final_observation = result.observation;
        if result.done {
            summary.done = true;
            break;
        }
        summary.steps += 1;
    }

    tracing::info!(
        steps = summary.steps,
        reward = summary.total_reward,
        "episode finished"
    );
    env.close()?;
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use daggym_core::LaunchCommand;
    use daggym_core::test_utils::ScriptedSupervisor;

    fn scripted_env(lines: &[&str]) -> DaggorathEnv<ScriptedSupervisor> {
        DaggorathEnv::new(
            ScriptedSupervisor::stdout(lines.iter().copied()),
            LaunchCommand::new("mame"),
        )
    }

    #[test]
    fn test_episode_ends_with_output() {
        let env = scripted_env(&["boot", "heartrate:72", "heartrate:80"]);
        let summary = run_episode(env, 100, 7).unwrap();

        assert!(summary.done);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.total_reward, 152.0);
        assert_eq!(summary.final_observation, [80]);
    }

    #[test]
    fn test_episode_step_limit() {
        let env = scripted_env(&["heartrate:10", "heartrate:20", "heartrate:30"]);
        let summary = run_episode(env, 2, 1).unwrap();

        assert!(!summary.done);
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.total_reward, 30.0);
        assert_eq!(summary.final_observation, [20]);
    }
}

//! Launch command implementation.

use crate::cli::LaunchArgs;
use crate::error::convert_emulator_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use daggym_core::EmulatorConfig;
use daggym_core::ProcessSupervisor;
use daggym_core::SystemSupervisor;
use daggym_core::emulator::relay_output;
use daggym_core::ipc::SideChannel;
use std::thread;

pub fn execute(args: &LaunchArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let profile = if args.debug {
        EmulatorConfig::debug()
    } else {
        EmulatorConfig::standard()
    };
    let command = profile.with_program(&args.program).command();

    formatter.format_launch_command(&command, args.dry_run)?;
    if args.dry_run {
        return Ok(());
    }

    if let Some(addr) = &args.listen {
        let channel = SideChannel::bind(addr.as_str()).map_err(convert_emulator_error)?;
        spawn_side_channel(channel)?;
    }

    let mut supervisor = SystemSupervisor;
    let mut process = supervisor
        .spawn(&command)
        .map_err(convert_emulator_error)?;

    let summary = relay_output(&mut supervisor, &mut process, args.stop_on.as_deref());
    let exit_code = supervisor
        .terminate(process)
        .map_err(convert_emulator_error)?;

    formatter.format_relay_summary(&summary, exit_code)
}

/// Accepts one side-channel client in the background and logs what it sends.
///
/// The thread is detached; it ends with the connection or with the process.
fn spawn_side_channel(channel: SideChannel) -> Result<()> {
    if let Ok(addr) = channel.local_addr() {
        tracing::info!(%addr, "side channel listening");
    }

    thread::Builder::new()
        .name("side-channel".to_string())
        .spawn(move || {
            let mut connection = match channel.accept() {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!("side channel accept failed: {e}");
                    return;
                }
            };
            tracing::info!(peer = %connection.peer(), "side channel connected");

            loop {
                match connection.recv() {
                    Ok(Some(message)) => tracing::info!(target: "side_channel", "{message}"),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("side channel read failed: {e}");
                        break;
                    }
                }
            }
            tracing::info!("side channel closed");
        })?;
    Ok(())
}

//! Emulator launch and supervision.
//!
//! [`EmulatorConfig`] derives the MAME command line; a
//! [`ProcessSupervisor`] runs it and yields its output as tagged lines.

mod command;
mod supervisor;

pub use command::EmulatorConfig;
pub use command::LaunchCommand;
pub use supervisor::OutputLine;
pub use supervisor::ProcessSupervisor;
pub use supervisor::RelaySummary;
pub use supervisor::SystemProcess;
pub use supervisor::SystemSupervisor;
pub use supervisor::relay_output;

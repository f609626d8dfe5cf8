//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use daggym_core::config::DEFAULT_ARCHIVE_PATH;
use daggym_core::config::DEFAULT_MANIFEST_PATH;
use daggym_core::config::DEFAULT_SCRATCH_DIR;
use daggym_core::hashdir::DEFAULT_LOCAL_HASH_DIR;
use daggym_core::hashdir::DEFAULT_SYSTEM_HASH_DIR;
use daggym_core::ipc::DEFAULT_ECHO_ADDR;
use daggym_core::ipc::DEFAULT_SIDE_CHANNEL_ADDR;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daggym")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify a ROM archive against a MAME software-list manifest
    Verify(VerifyArgs),
    /// Copy MAME hash files into the local hash directory
    SetupHash(SetupHashArgs),
    /// Launch MAME on Dungeons of Daggorath and relay its output
    Launch(LaunchArgs),
    /// Run one episode of the environment with random actions
    Play(PlayArgs),
    /// Loopback JSON echo probe
    Ipc(IpcArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the ROM archive
    #[arg(value_name = "ARCHIVE", default_value = DEFAULT_ARCHIVE_PATH)]
    pub archive: PathBuf,

    /// Path to the software-list XML
    #[arg(value_name = "MANIFEST", default_value = DEFAULT_MANIFEST_PATH)]
    pub manifest: PathBuf,

    /// Directory the archive is extracted into
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SCRATCH_DIR)]
    pub scratch_dir: PathBuf,

    /// Hash every extracted file, not only size matches
    #[arg(long)]
    pub hash_all: bool,
}

#[derive(clap::Args)]
pub struct SetupHashArgs {
    /// System MAME hash directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SYSTEM_HASH_DIR)]
    pub system_dir: PathBuf,

    /// Local hash directory to populate
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOCAL_HASH_DIR)]
    pub local_dir: PathBuf,

    /// Hash files to copy (default: coco_cart.xml)
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,
}

#[derive(clap::Args)]
pub struct LaunchArgs {
    /// Use the debug profile (debugger, log file, no sound)
    #[arg(long)]
    pub debug: bool,

    /// Print the command line without starting MAME
    #[arg(long)]
    pub dry_run: bool,

    /// Emulator executable
    #[arg(long, value_name = "PROGRAM", default_value = "mame")]
    pub program: String,

    /// Stop relaying when stdout prints this line
    #[arg(long, value_name = "LINE")]
    pub stop_on: Option<String>,

    /// Accept a side-channel connection on this address
    #[arg(long, value_name = "ADDR", num_args = 0..=1, default_missing_value = DEFAULT_SIDE_CHANNEL_ADDR)]
    pub listen: Option<String>,
}

#[derive(clap::Args)]
pub struct PlayArgs {
    /// Maximum number of steps
    #[arg(long, default_value = "100")]
    pub steps: u64,

    /// Seed for action sampling
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Use the debug emulator profile
    #[arg(long)]
    pub debug: bool,

    /// Emulator executable
    #[arg(long, value_name = "PROGRAM", default_value = "mame")]
    pub program: String,
}

#[derive(clap::Args)]
pub struct IpcArgs {
    #[command(subcommand)]
    pub role: IpcRole,
}

#[derive(Subcommand)]
pub enum IpcRole {
    /// Answer JSON requests until an empty connection arrives
    Server {
        /// Listen address
        #[arg(long, default_value = DEFAULT_ECHO_ADDR)]
        addr: String,

        /// Stop after this many connections
        #[arg(long, value_name = "N")]
        max_connections: Option<usize>,
    },
    /// Send one JSON request and print the reply
    Client {
        /// Server address
        #[arg(long, default_value = DEFAULT_ECHO_ADDR)]
        addr: String,

        /// JSON object to send
        #[arg(long, value_name = "JSON")]
        payload: Option<String>,
    },
}

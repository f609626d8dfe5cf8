//! MAME launch configuration.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// A program and its argument vector, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Executable name or path.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Builds a [`std::process::Command`] with the same program and arguments.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty() && !word.contains(char::is_whitespace) && !word.contains('\'') {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Everything needed to start MAME on the Daggorath cartridge.
///
/// The command line is derived with [`EmulatorConfig::command`]; nothing is
/// read from global state.
///
/// # Examples
///
/// ```
/// use daggym_core::EmulatorConfig;
///
/// let cmd = EmulatorConfig::default().command();
/// assert_eq!(cmd.program, "mame");
/// assert_eq!(&cmd.args[..3], ["coco3", "daggorath", "-verbose"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Emulator executable.
    pub program: String,
    /// Emulated system.
    pub system: String,
    /// Software list entry to mount.
    pub software: String,
    /// Pass `-verbose`.
    pub verbose: bool,
    /// Pass `-debug` (opens the MAME debugger).
    pub debug: bool,
    /// `-logfile` target.
    pub log_file: Option<PathBuf>,
    /// `-autoboot_delay` in seconds.
    pub autoboot_delay: Option<u32>,
    /// `-autoboot_script` Lua file.
    pub autoboot_script: Option<PathBuf>,
    /// `-rompath`.
    pub rom_path: Option<PathBuf>,
    /// `-hashpath`.
    pub hash_path: Option<PathBuf>,
    /// `-pluginspath`.
    pub plugins_path: Option<PathBuf>,
    /// Pass `-window`.
    pub window: bool,
    /// `-resolution` as (width, height).
    pub resolution: Option<(u32, u32)>,
    /// `-sound` driver, e.g. `none`.
    pub sound: Option<String>,
}

impl Default for EmulatorConfig {
    /// Same as [`EmulatorConfig::standard`].
    fn default() -> Self {
        Self::standard()
    }
}

impl EmulatorConfig {
    /// Windowed run with the test boot script and a one second autoboot delay.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            program: "mame".to_string(),
            system: "coco3".to_string(),
            software: "daggorath".to_string(),
            verbose: true,
            debug: false,
            log_file: None,
            autoboot_delay: Some(1),
            autoboot_script: Some(PathBuf::from("./src/emu/testboot.lua")),
            rom_path: Some(PathBuf::from("/usr/share/games/mame/roms")),
            hash_path: Some(PathBuf::from("/usr/share/games/mame/hash")),
            plugins_path: Some(PathBuf::from("/usr/share/games/mame/plugins")),
            window: true,
            resolution: Some((1280, 960)),
            sound: None,
        }
    }

    /// Debugger enabled, log written to `logs/mame.log`, sound disabled, and
    /// the full autoboot script after a four second delay.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            debug: true,
            log_file: Some(PathBuf::from("logs/mame.log")),
            autoboot_delay: Some(4),
            autoboot_script: Some(PathBuf::from("emu/autoboot.lua")),
            sound: Some("none".to_string()),
            ..Self::standard()
        }
    }

    /// Sets the emulator executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the hash path passed to MAME.
    #[must_use]
    pub fn with_hash_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hash_path = Some(path.into());
        self
    }

    /// Sets the ROM path passed to MAME.
    #[must_use]
    pub fn with_rom_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rom_path = Some(path.into());
        self
    }

    /// Derives the full command line. Unset options are omitted.
    #[must_use]
    pub fn command(&self) -> LaunchCommand {
        let mut args = vec![self.system.clone(), self.software.clone()];

        if self.verbose {
            args.push("-verbose".to_string());
        }
        if self.debug {
            args.push("-debug".to_string());
        }
        push_path(&mut args, "-logfile", self.log_file.as_ref());
        if let Some(delay) = self.autoboot_delay {
            args.push("-autoboot_delay".to_string());
            args.push(delay.to_string());
        }
        push_path(&mut args, "-autoboot_script", self.autoboot_script.as_ref());
        push_path(&mut args, "-rompath", self.rom_path.as_ref());
        push_path(&mut args, "-hashpath", self.hash_path.as_ref());
        push_path(&mut args, "-pluginspath", self.plugins_path.as_ref());
        if self.window {
            args.push("-window".to_string());
        }
        if let Some((width, height)) = self.resolution {
            args.push("-resolution".to_string());
            args.push(format!("{width}x{height}"));
        }
        if let Some(ref sound) = self.sound {
            args.push("-sound".to_string());
            args.push(sound.clone());
        }

        LaunchCommand {
            program: self.program.clone(),
            args,
        }
    }
}

fn push_path(args: &mut Vec<String>, flag: &str, value: Option<&PathBuf>) {
    if let Some(path) = value {
        args.push(flag.to_string());
        args.push(path.to_string_lossy().into_owned());
    }
}

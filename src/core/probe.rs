//! Access to the OS surfaces the testers read from.
//!
//! Every path is written as the absolute host path (`/proc/cpuinfo`) and
//! resolved under a configurable root, so a fake tree can stand in for the
//! real one. External diagnostic tools go through [`CommandProbe`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::config::TestConfig;
use crate::core::error::{ProbeError, Result};
use crate::core::logging::Logger;

#[derive(Debug, Clone)]
pub struct SysFs {
    root: PathBuf,
}

impl SysFs {
    /// The live host filesystem.
    pub fn host() -> Self {
        Self::with_root("/")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, abs: impl AsRef<Path>) -> PathBuf {
        let abs = abs.as_ref();
        self.root.join(abs.strip_prefix("/").unwrap_or(abs))
    }

    pub fn exists(&self, abs: impl AsRef<Path>) -> bool {
        self.path(abs).exists()
    }

    /// Reads a file and trims surrounding whitespace.
    pub fn read_string(&self, abs: impl AsRef<Path>) -> Result<String> {
        let path = self.path(abs);
        fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|e| ProbeError::io(path, e))
    }

    pub fn read_parsed<T>(&self, abs: impl AsRef<Path>) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.read_string(abs.as_ref())?;
        raw.parse::<T>()
            .map_err(|e| ProbeError::Parse(format!("{}: '{}': {}", abs.as_ref().display(), raw, e)))
    }

    /// Reads a file and returns its lines untrimmed.
    pub fn read_lines(&self, abs: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = self.path(abs);
        let contents = fs::read_to_string(&path).map_err(|e| ProbeError::io(path, e))?;
        Ok(contents.lines().map(str::to_string).collect())
    }

    pub fn write(&self, abs: impl AsRef<Path>, value: impl fmt::Display) -> Result<()> {
        let path = self.path(abs);
        fs::write(&path, value.to_string()).map_err(|e| ProbeError::io(path, e))
    }

    /// Entry names of a directory, sorted.
    pub fn list_dir(&self, abs: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = self.path(abs);
        let entries = fs::read_dir(&path).map_err(|e| ProbeError::io(&path, e))?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    pub stdout: String,
    pub status: Option<i32>,
}

impl ProbeOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external diagnostic tools (`lspci`, `xrandr`, `ping`, ...).
pub trait CommandProbe: Send + Sync {
    fn run(&self, command: &str) -> Result<ProbeOutput>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Default)]
pub struct ShellProbe;

impl CommandProbe for ShellProbe {
    fn run(&self, command: &str) -> Result<ProbeOutput> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|e| ProbeError::Command(format!("{}: {}", command, e)))?;

        Ok(ProbeOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            status: output.status.code(),
        })
    }
}

/// Everything a tester needs from its environment.
#[derive(Clone)]
pub struct ProbeContext {
    pub fs: SysFs,
    pub commands: Arc<dyn CommandProbe>,
    pub config: Arc<TestConfig>,
    pub logger: Logger,
}

impl ProbeContext {
    pub fn new(fs: SysFs, commands: Arc<dyn CommandProbe>, config: TestConfig, logger: Logger) -> Self {
        Self {
            fs,
            commands,
            config: Arc::new(config),
            logger,
        }
    }

    /// Context bound to the live host.
    pub fn host(config: TestConfig, logger: Logger) -> Self {
        Self::new(SysFs::host(), Arc::new(ShellProbe), config, logger)
    }

    /// Runs a command, logging and swallowing spawn failures.
    pub fn run(&self, command: &str) -> Option<ProbeOutput> {
        match self.commands.run(command) {
            Ok(output) => Some(output),
            Err(e) => {
                self.logger.debug(format_args!("{}", e));
                None
            }
        }
    }

    /// `true` if the command ran and exited with status 0.
    pub fn run_ok(&self, command: &str) -> bool {
        self.run(command).map(|o| o.success()).unwrap_or(false)
    }

    /// Stdout of a successful command.
    pub fn run_stdout(&self, command: &str) -> Option<String> {
        self.run(command).filter(|o| o.success()).map(|o| o.stdout)
    }
}

impl fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeContext")
            .field("fs", &self.fs)
            .field("logger", &self.logger)
            .finish()
    }
}

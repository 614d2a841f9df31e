//! Shared integration-test harness for running the `lander` binary and
//! capturing in-process output.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};

/// Helpers for invoking the compiled `lander` binary.
pub struct LanderProcess;

impl LanderProcess {
    /// Runs `lander` with the given arguments and waits for it to exit.
    ///
    /// Logging is forced quiet through `LANDER_LOG_LEVEL=off` so stderr only
    /// carries error reports.
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args).output().expect("failed to spawn lander")
    }

    /// Like [`Self::spawn_command`], with stdout redirected to `stdout`.
    /// The returned `stdout` buffer is empty.
    pub fn spawn_with_stdout(args: &[&str], stdout: impl Into<Stdio>) -> Output {
        Self::command(args)
            .stdout(stdout)
            .output()
            .expect("failed to spawn lander")
    }

    fn command(args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lander"));
        cmd.args(args)
            .env("LANDER_LOG_LEVEL", "off")
            .env_remove("LANDER_CONFIG")
            .env_remove("LANDER_STEPS");
        cmd
    }

    /// Returns the path to a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}

/// Cloneable in-memory writer.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writer whose writes start failing once `fail` is set.
#[derive(Clone, Default)]
pub struct FlakyConsole {
    pub fail: Arc<Mutex<bool>>,
    pub inner: SharedBuffer,
}

impl Write for FlakyConsole {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if *self.fail.lock().unwrap() {
            return Err(std::io::Error::other("telemetry link lost"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

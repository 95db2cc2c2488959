use std::fs;
use std::path::PathBuf;
use std::process::ExitStatus;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated data directory for one test.
pub struct DeckWorkspace {
    temp_dir: TempDir,
    env: Vec<(String, String)>,
}

impl DeckWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            env: Vec::new(),
        }
    }

    /// Workspace whose commands run with an extra environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    pub fn slot_path(&self) -> PathBuf {
        self.data_dir().join("issuedeck-store.json")
    }

    pub fn write_slot(&self, contents: &str) {
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(self.slot_path(), contents).expect("write slot");
    }

    pub fn read_slot(&self) -> Value {
        let text = fs::read_to_string(self.slot_path()).expect("read slot");
        serde_json::from_str(&text).expect("slot is JSON")
    }
}

pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

pub fn deck_command(workspace: &DeckWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("deck").expect("deck binary");
    cmd.current_dir(workspace.temp_dir.path())
        .env("DECK_DATA_DIR", workspace.data_dir())
        .env_remove("DECK_LOG")
        .env_remove("DECK_LOG_FORMAT")
        .env_remove("DECK_STORAGE_KEY")
        .env_remove("DECK_INTEGRITY")
        .env_remove("DECK_NUMBERING")
        .env_remove("DECK_PERSIST");
    for (key, value) in &workspace.env {
        cmd.env(key, value);
    }
    cmd
}

pub fn run_deck<I, S>(workspace: &DeckWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = deck_command(workspace)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run deck: {e}"));
    CmdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Run and assert success, returning the output.
pub fn run_ok<I, S>(workspace: &DeckWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let out = run_deck(workspace, args, label);
    assert!(
        out.status.success(),
        "{label} failed:\nstdout: {}\nstderr: {}",
        out.stdout,
        out.stderr
    );
    out
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A throwaway project directory with a schema, migrations and queries.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("Failed to create temp dir: {e}"));
        std::fs::create_dir(dir.path().join("migrations")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes `contents` to `relative`, returning the full path.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::write(&path, contents).unwrap_or_else(|e| panic!("Failed to write {relative}: {e}"));
        path
    }

    pub fn migration(&self, name: &str, contents: &str) -> PathBuf {
        self.write(&format!("migrations/{name}"), contents)
    }

    /// Runs the `oxide-verify` binary inside the project directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_oxide-verify"))
            .args(args)
            .current_dir(self.root())
            .env_remove("OXIDE_DIALECT")
            .env_remove("OXIDE_VERIFY_CONFIG")
            .output()
            .unwrap_or_else(|e| panic!("Failed to run oxide-verify: {e}"))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

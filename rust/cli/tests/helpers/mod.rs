//! Shared test helpers: an in-process CLI runner and scoped env variables.
//!
//! Tests that read configuration must be `#[serial]`; environment variables
//! are process-wide.

#![allow(dead_code)]

use spinhall_cli::run;

pub const CONFIG_VARS: &[&str] = &[
    "SPINHALL_CONFIG",
    "SPINHALL_STARTING_BALANCE",
    "SPINHALL_DEFAULT_BET",
    "SPINHALL_SPIN_DELAY_MS",
    "SPINHALL_AUTO_ROLL_DELAY_MS",
    "SPINHALL_SEED",
    "SPINHALL_LOG",
];

pub struct CliOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_cli(args: &[&str]) -> CliOutput {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let argv: Vec<&str> = std::iter::once("spinhall").chain(args.iter().copied()).collect();
    let code = run(argv, &mut out, &mut err);
    CliOutput {
        code,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}

pub struct TempEnvVar {
    key: &'static str,
    previous: Option<String>,
}

impl TempEnvVar {
    pub fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        unsafe { std::env::set_var(key, value) };
        Self { key, previous }
    }

    pub fn unset(key: &'static str) -> Self {
        let previous = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        Self { key, previous }
    }
}

impl Drop for TempEnvVar {
    fn drop(&mut self) {
        match &self.previous {
            Some(prev) => unsafe { std::env::set_var(self.key, prev) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

/// Clears every `SPINHALL_*` variable for the lifetime of the returned guards.
pub fn clean_env() -> Vec<TempEnvVar> {
    CONFIG_VARS.iter().map(|&k| TempEnvVar::unset(k)).collect()
}

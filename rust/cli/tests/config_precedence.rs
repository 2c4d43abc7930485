mod helpers;

use helpers::{TempEnvVar, clean_env, run_cli};
use serial_test::serial;

fn cfg_json() -> serde_json::Value {
    let res = run_cli(&["cfg"]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    serde_json::from_str(&res.stdout).unwrap()
}

#[test]
#[serial]
fn defaults_when_nothing_is_set() {
    let _env = clean_env();
    let json = cfg_json();
    assert_eq!(json["starting_balance"]["value"], 5000);
    assert_eq!(json["default_bet"]["value"], 100);
    assert_eq!(json["spin_delay_ms"]["value"], 1500);
    assert_eq!(json["auto_roll_delay_ms"]["value"], 2000);
    assert!(json["seed"]["value"].is_null());
    for key in ["starting_balance", "default_bet", "spin_delay_ms", "auto_roll_delay_ms", "seed"] {
        assert_eq!(json[key]["source"], "default", "{}", key);
    }
}

#[test]
#[serial]
fn env_overrides_file() {
    let _env = clean_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spinhall.toml");
    std::fs::write(&path, "default_bet = 50\nseed = 9\n").unwrap();

    let _cfg = TempEnvVar::set("SPINHALL_CONFIG", path.to_str().unwrap());
    let _seed = TempEnvVar::set("SPINHALL_SEED", "11");

    let json = cfg_json();
    assert_eq!(json["default_bet"]["value"], 50);
    assert_eq!(json["default_bet"]["source"], "file");
    assert_eq!(json["seed"]["value"], 11);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["starting_balance"]["source"], "default");
}

#[test]
#[serial]
fn empty_env_values_are_ignored() {
    let _env = clean_env();
    let _bet = TempEnvVar::set("SPINHALL_DEFAULT_BET", "  ");
    let json = cfg_json();
    assert_eq!(json["default_bet"]["source"], "default");
}

#[test]
#[serial]
fn unparsable_env_value_fails() {
    let _env = clean_env();
    let _bet = TempEnvVar::set("SPINHALL_DEFAULT_BET", "lots");
    let res = run_cli(&["cfg"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("SPINHALL_DEFAULT_BET"));
}

#[test]
#[serial]
fn zero_starting_balance_is_invalid() {
    let _env = clean_env();
    let _balance = TempEnvVar::set("SPINHALL_STARTING_BALANCE", "0");
    let res = run_cli(&["cfg"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("Invalid configuration"));
}

#[test]
#[serial]
fn unknown_file_keys_are_rejected() {
    let _env = clean_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spinhall.toml");
    std::fs::write(&path, "jackpot = 1\n").unwrap();
    let _cfg = TempEnvVar::set("SPINHALL_CONFIG", path.to_str().unwrap());

    let res = run_cli(&["cfg"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("cannot parse config file"));
}

#[test]
#[serial]
fn configured_bet_drives_sim() {
    let _env = clean_env();
    let _bet = TempEnvVar::set("SPINHALL_DEFAULT_BET", "10");
    let res = run_cli(&["sim", "--spins", "5", "--seed", "1"]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.contains("Wagered: 50  Won:"));
}

#[test]
#[serial]
fn configured_seed_makes_spin_reproducible() {
    let _env = clean_env();
    let _seed = TempEnvVar::set("SPINHALL_SEED", "77");
    let a = run_cli(&["spin", "--spins", "3"]);
    let b = run_cli(&["spin", "--spins", "3"]);
    assert_eq!(a.code, 0, "stderr: {}", a.stderr);
    assert_eq!(a.stdout, b.stdout);
}

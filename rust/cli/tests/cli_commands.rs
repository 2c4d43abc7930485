mod helpers;

use helpers::{clean_env, run_cli};
use serial_test::serial;
use std::path::Path;

fn stats_json(path: &Path) -> serde_json::Value {
    let res = run_cli(&["stats", "--input", path.to_str().unwrap()]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    serde_json::from_str(&res.stdout).unwrap()
}

fn final_balance(stdout: &str) -> u64 {
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("Final balance: "))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| panic!("no final balance in: {}", stdout))
}

#[test]
#[serial]
fn help_lists_every_command() {
    let _env = clean_env();
    let res = run_cli(&["--help"]);
    assert_eq!(res.code, 0);
    for cmd in ["spin", "sim", "stats", "rng", "paytable", "cfg"] {
        assert!(res.stdout.contains(cmd), "help should list `{}`", cmd);
    }
}

#[test]
#[serial]
fn unknown_command_prints_usage_and_fails() {
    let _env = clean_env();
    let res = run_cli(&["deal"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("Usage: spinhall"));
    assert!(res.stderr.contains("  paytable"));
}

#[test]
#[serial]
fn paytable_for_zeus() {
    let _env = clean_env();
    let res = run_cli(&["paytable", "--game", "zeus"]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.contains("ZEUS"));
    assert!(res.stdout.contains("AMPHORA"));
    assert!(!res.stdout.contains("DIAMOND"));
}

#[test]
#[serial]
fn rng_is_reproducible_with_a_seed() {
    let _env = clean_env();
    let a = run_cli(&["rng", "--draws", "2000", "--seed", "7"]);
    let b = run_cli(&["rng", "--draws", "2000", "--seed", "7"]);
    assert_eq!(a.code, 0, "stderr: {}", a.stderr);
    assert_eq!(a.stdout, b.stdout);
}

#[test]
#[serial]
fn rng_rejects_zero_draws() {
    let _env = clean_env();
    let res = run_cli(&["rng", "--draws", "0"]);
    assert_eq!(res.code, 2);
}

#[test]
#[serial]
fn sim_log_feeds_stats() {
    let _env = clean_env();
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs").join("spins.jsonl");

    let sim = run_cli(&[
        "sim",
        "--spins",
        "50",
        "--seed",
        "3",
        "--balance",
        "100000",
        "--output",
        log.to_str().unwrap(),
    ]);
    assert_eq!(sim.code, 0, "stderr: {}", sim.stderr);
    assert!(sim.stdout.contains("Simulated 50 spins of classic (seed 3)"));

    let content = std::fs::read_to_string(&log).unwrap();
    assert_eq!(content.lines().count(), 50);

    let json = stats_json(&log);
    assert_eq!(json["spins"], 50);
    assert_eq!(json["wagered"], 5000);
    assert_eq!(json["final_balance"], final_balance(&sim.stdout));
}

#[test]
#[serial]
fn stats_reads_compressed_logs_and_directories() {
    let _env = clean_env();
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("a.jsonl");
    let res = run_cli(&[
        "sim",
        "--spins",
        "20",
        "--seed",
        "11",
        "--output",
        plain.to_str().unwrap(),
    ]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);

    let raw = std::fs::read(&plain).unwrap();
    let packed = zstd::stream::encode_all(raw.as_slice(), 0).unwrap();
    let compressed = dir.path().join("b.jsonl.zst");
    std::fs::write(&compressed, packed).unwrap();

    assert_eq!(stats_json(&compressed)["spins"], 20);
    // each file chains on its own
    assert_eq!(stats_json(dir.path())["spins"], 40);
}

#[test]
#[serial]
fn same_seed_gives_same_log() {
    let _env = clean_env();
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.jsonl");
    let b = dir.path().join("b.jsonl");
    for p in [&a, &b] {
        let res = run_cli(&["sim", "--spins", "30", "--seed", "99", "--output", p.to_str().unwrap()]);
        assert_eq!(res.code, 0);
    }
    let strip_ids = |p: &Path| -> Vec<serde_json::Value> {
        std::fs::read_to_string(p)
            .unwrap()
            .lines()
            .map(|l| {
                let mut v: serde_json::Value = serde_json::from_str(l).unwrap();
                v.as_object_mut().unwrap().remove("spin_id");
                v
            })
            .collect()
    };
    assert_eq!(strip_ids(&a), strip_ids(&b));
}

#[test]
#[serial]
fn stats_flags_broken_balance_chain() {
    let _env = clean_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jsonl");
    let lines = [
        r#"{"spin_id":"20260101-000001","game":"classic","bet":100,"reels":["coin","heart","star","gift","diamond"],"winnings":0,"balance_after":4900}"#,
        r#"{"spin_id":"20260101-000002","game":"classic","bet":100,"reels":["coin","heart","star","gift","diamond"],"winnings":0,"balance_after":3000}"#,
    ];
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let res = run_cli(&["stats", "--input", path.to_str().unwrap()]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("balance chain broken at spin 20260101-000002"));
    assert!(res.stderr.contains("broken.jsonl:2"));
}

#[test]
#[serial]
fn stats_on_missing_file_fails() {
    let _env = clean_env();
    let res = run_cli(&["stats", "--input", "/nonexistent/spins.jsonl"]);
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("Failed to read"));
}

#[test]
#[serial]
fn spin_plays_through_a_controller() {
    let _env = clean_env();
    let res = run_cli(&["spin", "--seed", "1", "--spins", "3", "--balance", "1000"]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.starts_with("classic | bet 100 | balance 1000"));
    assert!(res.stdout.contains("#1 ["));
    assert!(res.stdout.contains("#3 ["));
    assert!(res.stdout.contains("Played 3 spin(s)."));
}

#[test]
#[serial]
fn spin_is_reproducible_with_a_seed() {
    let _env = clean_env();
    let args = ["spin", "--game", "zeus", "--seed", "5", "--spins", "5", "--balance", "5000"];
    let a = run_cli(&args);
    let b = run_cli(&args);
    assert_eq!(a.code, 0, "stderr: {}", a.stderr);
    assert_eq!(a.stdout, b.stdout);
}

#[test]
#[serial]
fn spin_auto_stops_at_requested_count() {
    let _env = clean_env();
    let res = run_cli(&[
        "spin", "--auto", "--seed", "2", "--spins", "4", "--balance", "100000",
    ]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.contains("#4 ["));
    assert!(!res.stdout.contains("#5 ["));
    assert!(res.stdout.contains("Played 4 spin(s)."));
}

#[test]
#[serial]
fn spin_auto_terminates_on_a_small_balance() {
    let _env = clean_env();
    let res = run_cli(&[
        "spin", "--auto", "--seed", "8", "--spins", "50", "--balance", "300",
    ]);
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.contains("Played "));
}

#[test]
#[serial]
fn spin_with_insufficient_balance_warns() {
    let _env = clean_env();
    let res = run_cli(&["spin", "--balance", "50"]);
    assert_eq!(res.code, 0);
    assert!(res.stderr.contains("WARNING: stopped after 0 spins"));
    assert!(res.stdout.contains("Played 0 spin(s). Final balance: 50"));
}

#[test]
#[serial]
fn spin_rejects_bad_bets() {
    let _env = clean_env();
    let zero = run_cli(&["spin", "--bet", "0"]);
    assert_eq!(zero.code, 2);
    assert!(zero.stderr.contains("bet must be >= 1"));

    let too_big = run_cli(&["spin", "--bet", "900", "--balance", "500"]);
    assert_eq!(too_big.code, 2);
    assert!(too_big.stderr.contains("exceeds balance"));
}

#[test]
#[serial]
fn sim_rejects_zero_spins() {
    let _env = clean_env();
    let res = run_cli(&["sim", "--spins", "0"]);
    assert_eq!(res.code, 2);
}

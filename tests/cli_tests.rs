//! CLI integration tests using assert_cmd.
//!
//! All tests run the real binary on small ceilings; no network or config
//! file is needed. Output contract under test: primes on stdout (pipeable),
//! summaries and errors on stderr, nonzero exit on failure.

use assert_cmd::Command;
use predicates::prelude::*;

/// Fresh command with ambient config scrubbed, so a developer's own
/// FARSIEVE_* environment cannot leak into assertions.
#[allow(deprecated)]
fn farsieve() -> Command {
    let mut cmd = Command::cargo_bin("farsieve").unwrap();
    cmd.env_remove("FARSIEVE_CONFIG");
    cmd.env_remove("FARSIEVE_ENDPOINT");
    cmd
}

// --- Help and arg validation ---

#[test]
fn help_shows_all_subcommands() {
    farsieve().arg("--help").assert().success().stdout(
        predicate::str::contains("compute")
            .and(predicate::str::contains("algorithms"))
            .and(predicate::str::contains("compare")),
    );
}

#[test]
fn help_compute_shows_args() {
    farsieve()
        .args(["compute", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--ceiling")
                .and(predicate::str::contains("--algorithm"))
                .and(predicate::str::contains("--keep-last")),
        );
}

#[test]
fn unknown_subcommand_fails() {
    farsieve()
        .arg("nonexistent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn compute_missing_ceiling_fails() {
    farsieve()
        .arg("compute")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ceiling").or(predicate::str::contains("required")));
}

// --- Compute ---

/// The primes land on stdout one per line, nothing else mixed in.
#[test]
fn compute_prints_exact_primes() {
    farsieve()
        .args(["compute", "--ceiling", "30"])
        .assert()
        .success()
        .stdout("2\n3\n5\n7\n11\n13\n17\n19\n23\n29\n")
        .stderr(predicate::str::contains("10 primes <= 30"));
}

#[test]
fn compute_keep_last_prints_tail_only() {
    farsieve()
        .args(["compute", "--ceiling", "100", "--keep-last", "2"])
        .assert()
        .success()
        .stdout("89\n97\n")
        .stderr(predicate::str::contains("25 primes <= 100"));
}

#[test]
fn compute_with_trial_division() {
    farsieve()
        .args(["compute", "--ceiling", "50", "--algorithm", "trial-division"])
        .assert()
        .success()
        .stdout(predicate::str::contains("47\n"))
        .stderr(predicate::str::contains("trial-division"));
}

#[test]
fn compute_unknown_algorithm_fails_with_listing() {
    farsieve()
        .args(["compute", "--ceiling", "100", "--algorithm", "quantum"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("unknown algorithm 'quantum'")
                .and(predicate::str::contains("trial-division")),
        );
}

#[test]
fn compute_ceiling_one_fails() {
    farsieve()
        .args(["compute", "--ceiling", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ceiling must be greater than 1"));
}

#[test]
fn compute_zero_keep_last_fails() {
    farsieve()
        .args(["compute", "--ceiling", "100", "--keep-last", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("keep_last must be at least 1"));
}

// --- Algorithms listing ---

#[test]
fn algorithms_lists_local_registry() {
    farsieve().arg("algorithms").assert().success().stdout(
        predicate::str::contains("trial-division")
            .and(predicate::str::contains("sieve"))
            .and(predicate::str::contains("segmented"))
            .and(predicate::str::contains("segmented-remote").not()),
    );
}

/// An endpoint flag registers the remote algorithm without contacting it;
/// listing does no I/O.
#[test]
fn algorithms_with_endpoint_lists_remote() {
    farsieve()
        .args(["--endpoint", "http://127.0.0.1:1/segments", "algorithms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("segmented-remote"));
}

#[test]
fn algorithms_endpoint_via_env_lists_remote() {
    farsieve()
        .env("FARSIEVE_ENDPOINT", "http://127.0.0.1:1/segments")
        .arg("algorithms")
        .assert()
        .success()
        .stdout(predicate::str::contains("segmented-remote"));
}

// --- Compare ---

#[test]
fn compare_ranks_local_algorithms() {
    farsieve()
        .args(["compare", "--ceiling", "2000"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("rank")
                .and(predicate::str::contains("trial-division"))
                .and(predicate::str::contains("sieve"))
                .and(predicate::str::contains("segmented"))
                .and(predicate::str::contains("303")),
        );
}

// --- Config file ---

#[test]
fn missing_config_file_fails_with_path() {
    farsieve()
        .args(["--config", "/nonexistent/farsieve.toml", "algorithms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/farsieve.toml"));
}

#[test]
fn config_file_remote_section_registers_remote() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("farsieve.toml");
    std::fs::write(
        &path,
        "[remote]\nendpoint = \"http://sieve.internal:8080/segments\"\n",
    )
    .unwrap();

    farsieve()
        .args(["--config", path.to_str().unwrap(), "algorithms"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("segmented-remote")
                .and(predicate::str::contains("http://sieve.internal:8080/segments")),
        );
}

#[test]
fn invalid_config_tuning_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("farsieve.toml");
    std::fs::write(
        &path,
        "[engine]\nmin_segment_size = 100\nmax_segment_size = 10\n",
    )
    .unwrap();

    farsieve()
        .args(["--config", path.to_str().unwrap(), "compute", "--ceiling", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_segment_size"));
}

//! Smoke test for the sentinel-line failure format (spec §7).

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_file_is_reported_as_a_sentinel_line_and_the_process_still_exits_cleanly() {
    let missing = Path::new("this-file-does-not-exist.png");

    Command::cargo_bin("chess-corners")
        .unwrap()
        .arg(missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("this-file-does-not-exist.png - - -"));
}

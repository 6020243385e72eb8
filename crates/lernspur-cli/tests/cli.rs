use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const START: &str = r#"{"action_type":"ExplorationStart","action_customization_args":{"state_name":{"value":"Intro"}},"schema_version":1}"#;
const ANSWER: &str = r#"{"action_type":"AnswerSubmit","action_customization_args":{"state_name":{"value":"S1"},"dest_state_name":{"value":"S2"},"interaction_id":{"value":"TextInput"},"submitted_answer":{"value":"42"},"feedback":{"value":"Good"},"time_spent_state_in_msecs":{"value":1500}},"schema_version":3}"#;

fn lernspur() -> Command {
    let mut cmd = Command::cargo_bin("lernspur").expect("lernspur binary is built");
    cmd.env_remove("LERNSPUR_SCHEMA_VERSION");
    cmd
}

#[test]
fn kinds_lists_every_action_type_with_keys() {
    lernspur()
        .arg("kinds")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ExplorationStart\tstate_name")
                .and(predicate::str::contains("AnswerSubmit"))
                .and(predicate::str::contains("time_spent_state_in_msecs"))
                .and(predicate::str::contains("time_spent_in_state_in_msecs")),
        );
}

#[test]
fn new_prints_wrapped_wire_dict_with_flag_version() {
    let output = lernspur()
        .args([
            "new",
            "ExplorationStart",
            "--args",
            r#"{"state_name":"Intro"}"#,
            "--schema-version",
            "4",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let dict: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout is a JSON wire dict");
    assert_eq!(
        dict,
        serde_json::json!({
            "action_type": "ExplorationStart",
            "action_customization_args": { "state_name": { "value": "Intro" } },
            "schema_version": 4
        })
    );
}

#[test]
fn new_uses_schema_version_from_env() {
    lernspur()
        .env("LERNSPUR_SCHEMA_VERSION", "7")
        .args([
            "new",
            "ExplorationQuit",
            "--args",
            r#"{"state_name":"End","time_spent_in_state_in_msecs":20}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""schema_version": 7"#));
}

#[test]
fn new_rejects_invalid_env_version() {
    lernspur()
        .env("LERNSPUR_SCHEMA_VERSION", "0")
        .args(["new", "ExplorationStart", "--args", r#"{"state_name":"Intro"}"#])
        .assert()
        .failure();
}

#[test]
fn new_names_missing_field() {
    lernspur()
        .args(["new", "AnswerSubmit", "--args", r#"{"state_name":"S1"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dest_state_name"));
}

#[test]
fn new_rejects_unknown_kind() {
    lernspur()
        .args(["new", "Bogus", "--args", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action type 'Bogus'"));
}

#[test]
fn decode_from_stdin_prints_summary_per_action() {
    lernspur()
        .arg("decode")
        .write_stdin(format!("{START}\n\n{ANSWER}\n"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ExplorationStart\tIntro\tv1")
                .and(predicate::str::contains("AnswerSubmit\tS1\tv3")),
        );
}

#[test]
fn decode_fails_on_unknown_action_type_with_line_number() {
    let bogus = START.replace("ExplorationStart", "Bogus");
    lernspur()
        .arg("decode")
        .write_stdin(format!("{START}\n{bogus}\n"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2").and(predicate::str::contains("Bogus")));
}

#[test]
fn decode_file_updates_stats() {
    let dir = std::env::temp_dir().join(format!("lernspur_cli_decode_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    let input = dir.join("actions.jsonl");
    let stats_file = dir.join("stats.json");
    fs::write(&input, format!("{START}\n{ANSWER}\n")).expect("write input");

    lernspur()
        .args(["decode", "--path"])
        .arg(&input)
        .arg("--stats-file")
        .arg(&stats_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 actions."));

    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&stats_file).expect("stats written"))
            .expect("stats are JSON");
    assert_eq!(stats["total_processed"], 2);
    assert_eq!(stats["by_kind"]["AnswerSubmit"], 1);
    assert_eq!(stats["by_state"]["Intro"], 1);
    assert_eq!(stats["total_time_spent_msecs"], 1500.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn decode_fails_on_corrupt_stats_file_and_keeps_it() {
    let dir = std::env::temp_dir().join(format!("lernspur_cli_bad_stats_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    let input = dir.join("actions.jsonl");
    let stats_file = dir.join("stats.json");
    let corrupt = r#"{"total_processed":1000,"by_kind":{},"by_state":{},"total_time_spent_msecs":0.0,"last_updated":"not-a-date"}"#;
    fs::write(&input, format!("{START}\n")).expect("write input");
    fs::write(&stats_file, corrupt).expect("write stats");

    lernspur()
        .args(["decode", "--path"])
        .arg(&input)
        .arg("--stats-file")
        .arg(&stats_file)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to read stats file"));

    assert_eq!(fs::read_to_string(&stats_file).expect("stats kept"), corrupt);

    let _ = fs::remove_dir_all(&dir);
}

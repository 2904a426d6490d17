use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// `segcut` run from an empty directory so no config file is picked up
fn segcut(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("segcut").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("SEGCUT_CONFIG")
        .env_remove("SEGCUT_TOLERANCE_SECS")
        .env_remove("SEGCUT_LOG_LEVEL");
    cmd
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

const JOB: &str = r#"{
    "video_url": "https://cdn.example.com/source.mp4",
    "cuts": [{"start": 10, "end": 20}]
}"#;

#[test]
fn test_plan_from_stdin() {
    let dir = TempDir::new().unwrap();
    let output = segcut(&dir)
        .args(["plan", "--job", "-", "--duration", "100"])
        .write_stdin(JOB)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan = stdout_json(&output);
    assert_eq!(plan["segments_kept"], 2);
    assert_eq!(plan["total_duration_kept"], 90.0);
    assert_eq!(plan["media_type"], "video+audio");
    assert_eq!(plan["stream_copy"], false);
    assert!(plan["filter_graph"].as_str().unwrap().contains("[outv]"));
    assert_eq!(plan["keep"][1]["start"], 20.0);
}

#[test]
fn test_plan_from_file_audio_only() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("job.json"), JOB).unwrap();

    let output = segcut(&dir)
        .args(["plan", "--job", "job.json", "--duration", "100", "--no-video"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan = stdout_json(&output);
    assert_eq!(plan["media_type"], "audio");
    let graph = plan["filter_graph"].as_str().unwrap();
    assert!(!graph.contains("[0:v]"));
    assert!(graph.contains("[outa]"));
}

#[test]
fn test_plan_full_cover_prints_error_envelope() {
    let dir = TempDir::new().unwrap();
    segcut(&dir)
        .args(["plan", "--job", "-", "--duration", "100"])
        .write_stdin(r#"{"video_url": "https://h/v.mp4", "cuts": {"cuts": [{"start": 0, "end": 100}]}}"#)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error\""))
        .stdout(predicate::str::contains("Nothing left to keep"));
}

#[test]
fn test_run_rejects_invalid_json_with_envelope() {
    let dir = TempDir::new().unwrap();
    segcut(&dir)
        .args(["run", "--job", "-"])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stdout(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_run_without_credential_fails_without_network() {
    let dir = TempDir::new().unwrap();
    segcut(&dir)
        .args(["run", "--job", "-"])
        .write_stdin(JOB)
        .assert()
        .failure()
        .stdout(predicate::str::contains("credential"));
}

#[test]
fn test_missing_job_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    segcut(&dir)
        .args(["plan", "--job", "absent.json", "--duration", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("segcut.toml"), "[upload]\nchunk_size_bytes = 0\n").unwrap();

    segcut(&dir)
        .args(["plan", "--job", "-", "--duration", "100"])
        .write_stdin(JOB)
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_size_bytes"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let dir = TempDir::new().unwrap();
    let output = segcut(&dir)
        .args(["--log-level", "debug", "plan", "--job", "-", "--duration", "100"])
        .write_stdin(JOB)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert!(serde_json::from_slice::<Value>(&output).is_ok());
}

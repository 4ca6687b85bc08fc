use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar_with(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_classhubd");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn classhubd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn write_students(dir: &Path, students: serde_json::Value) {
    std::fs::write(dir.join("students.json"), students.to_string()).expect("write students.json");
}

#[test]
fn seed_dir_flag_replaces_only_present_snapshots() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_students(
        dir.path(),
        json!([
            { "Id": 5, "firstName": "Katherine", "lastName": "Johnson", "gradeLevel": "12", "studentId": "K-1" }
        ]),
    );
    let seed_dir = dir.path().to_string_lossy().to_string();
    let (mut child, mut stdin, mut reader) =
        spawn_sidecar_with(&["--no-latency", "--seed-dir", &seed_dir]);

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["counts"]["students"], json!(1));
    assert_eq!(health["counts"]["grades"], json!(10));

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "firstName": "Dorothy", "lastName": "Vaughan" }),
    );
    assert_eq!(created["student"]["Id"], json!(6));
    assert_eq!(created["student"]["status"], json!("active"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn config_file_supplies_seed_dir_and_latency() {
    let dir = tempfile::tempdir().expect("temp dir");
    let seed = dir.path().join("seed");
    std::fs::create_dir_all(&seed).expect("seed dir");
    write_students(&seed, json!([]));

    let cfg = dir.path().join("classhub.toml");
    std::fs::write(
        &cfg,
        format!(
            "seed_dir = {:?}\nlog_level = \"warn\"\n\n[latency]\nget_all_ms = 0\nget_by_id_ms = 0\ncreate_ms = 0\nupdate_ms = 0\ndelete_ms = 0\n",
            seed.to_string_lossy()
        ),
    )
    .expect("write config");

    let cfg_arg = cfg.to_string_lossy().to_string();
    let (mut child, mut stdin, mut reader) = spawn_sidecar_with(&["--config", &cfg_arg]);

    let list = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(list["students"], json!([]));

    // First record in an empty collection gets Id 1.
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "firstName": "Mary", "lastName": "Jackson" }),
    );
    assert_eq!(created["student"]["Id"], json!(1));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn unreadable_config_exits_without_serving() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("nope.toml");
    let status = Command::new(env!("CARGO_BIN_EXE_classhubd"))
        .arg("--config")
        .arg(&missing)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run classhubd");
    assert!(!status.success());
}

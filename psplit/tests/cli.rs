// End-to-end runs of the psplit binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn psplit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_psplit"))
        .args(args)
        .env_remove("PSPLIT_EXT")
        .env_remove("PSPLIT_MAX_PART_MIB")
        .env_remove("PSPLIT_BLOCK_MIB")
        .env_remove("PSPLIT_ERROR_LOG")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run psplit")
}

fn p(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn split_then_join_round_trips() {
    let td = tempdir().unwrap();
    let src = td.path().join("dump.sql");
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&src, &data).unwrap();
    let out = td.path().join("parts");

    let o = psplit(&[
        "split",
        p(&src),
        p(&out),
        "--max-part-bytes",
        "4000",
        "--block-size",
        "1500",
        "--quiet",
    ]);
    assert!(o.status.success(), "{}", String::from_utf8_lossy(&o.stderr));
    assert_eq!(fs::metadata(out.join("part_01.sql")).unwrap().len(), 4000);
    assert_eq!(fs::metadata(out.join("part_02.sql")).unwrap().len(), 4000);
    assert_eq!(fs::metadata(out.join("part_03.sql")).unwrap().len(), 2000);

    let again = psplit(&[
        "split",
        p(&src),
        p(&out),
        "--max-part-bytes",
        "4000",
        "--quiet",
    ]);
    assert!(again.status.success());
    assert!(!out.join("part_04.sql").exists());

    let dest = td.path().join("restored.sql");
    let j = psplit(&["join", p(&out), p(&dest)]);
    assert!(j.status.success());
    assert_eq!(fs::read(dest).unwrap(), data);
}

#[test]
fn failure_exits_non_zero_and_logs() {
    let td = tempdir().unwrap();
    let out = td.path().join("parts");
    let missing = td.path().join("missing.sql");

    let o = psplit(&["split", p(&missing), p(&out), "--quiet"]);
    assert_eq!(o.status.code(), Some(1));

    let log = fs::read_to_string(out.join("errors.log")).unwrap();
    let line = log.lines().next().unwrap();
    assert!(line.starts_with('['));
    assert!(line.contains("] ERROR: source unavailable"));
}

#[test]
fn status_reports_resume_point_as_json() {
    let td = tempdir().unwrap();
    let out = td.path().join("parts");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("part_01.sql"), vec![1u8; 400]).unwrap();
    fs::write(out.join("part_02.sql"), vec![2u8; 50]).unwrap();
    let src = td.path().join("dump.sql");
    fs::write(&src, vec![0u8; 1000]).unwrap();

    let o = psplit(&[
        "status",
        p(&out),
        "--source",
        p(&src),
        "--max-part-bytes",
        "400",
        "--json",
    ]);
    assert!(o.status.success(), "{}", String::from_utf8_lossy(&o.stderr));
    let v: serde_json::Value = serde_json::from_slice(&o.stdout).unwrap();
    assert_eq!(v["resume_offset"], 450);
    assert_eq!(v["current_part"], 2);
    assert_eq!(v["current_part_len"], 50);
    assert_eq!(v["source_len"], 1000);
    assert_eq!(v["complete"], false);
    assert_eq!(v["parts"].as_array().unwrap().len(), 2);
}

fn split_small(td: &Path) -> (std::path::PathBuf, Vec<u8>) {
    let src = td.join("dump.sql");
    let data: Vec<u8> = (0..1_000u32).map(|i| (i % 253) as u8).collect();
    fs::write(&src, &data).unwrap();
    let out = td.join("parts");
    let o = psplit(&[
        "split",
        p(&src),
        p(&out),
        "--max-part-bytes",
        "400",
        "--quiet",
    ]);
    assert!(o.status.success(), "{}", String::from_utf8_lossy(&o.stderr));
    (out, data)
}

#[test]
fn join_refuses_to_overwrite_a_part() {
    let td = tempdir().unwrap();
    let (out, data) = split_small(td.path());
    let part = out.join("part_02.sql");

    let o = psplit(&["join", p(&out), p(&part)]);
    assert_eq!(o.status.code(), Some(1));
    assert_eq!(fs::read(&part).unwrap(), &data[400..800]);
}

#[test]
fn join_finds_parts_whatever_the_dest_extension() {
    let td = tempdir().unwrap();
    let (out, data) = split_small(td.path());
    let dest = td.path().join("restored.bin");

    let o = psplit(&["join", p(&out), p(&dest)]);
    assert!(o.status.success(), "{}", String::from_utf8_lossy(&o.stderr));
    assert_eq!(fs::read(&dest).unwrap(), data);

    let wrong = td.path().join("other.bin");
    let o = psplit(&["join", p(&out), p(&wrong), "--ext", "bin"]);
    assert_eq!(o.status.code(), Some(1));
    assert!(!wrong.exists());
}

// e2e/cli.rs: black-box tests of the `zlits` binary.
//
// Inputs are zstd frames written into a TempDir; the binary is run with
// std::process::Command and its stdout, stderr and exit code are checked.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn zlits_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_zlits"))
}

fn run(args: &[&str]) -> Output {
    Command::new(zlits_bin())
        .args(args)
        .env_remove("ZLITS_DISPLAY_LEVEL")
        .env_remove("ZLITS_NBWORKERS")
        .output()
        .expect("failed to run zlits")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

fn text(n: usize) -> Vec<u8> {
    b"a literals section holds the bytes no match could cover. "
        .iter()
        .copied()
        .cycle()
        .enumerate()
        .map(|(i, c)| if i % 97 == 0 { b'0' + (i % 10) as u8 } else { c })
        .take(n)
        .collect()
}

fn write_frame(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, zstd::bulk::compress(data, 3).unwrap()).unwrap();
    path
}

fn arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

// ── blocks ────────────────────────────────────────────────────────────────────

#[test]
fn blocks_lists_every_block() {
    let dir = TempDir::new().unwrap();
    let f = write_frame(dir.path(), "a.zst", &text(300_000));
    let out = run(&["blocks", arg(&f)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let lines: Vec<_> = stdout(&out).lines().map(str::to_owned).collect();
    assert!(lines.len() >= 3);
    assert!(lines.iter().all(|l| l.contains("a.zst#0 block")));
    assert!(lines.last().unwrap().ends_with("last=1"));
    assert_eq!(lines.iter().filter(|l| l.ends_with("last=1")).count(), 1);
}

// ── literals ──────────────────────────────────────────────────────────────────

#[test]
fn literals_prints_digests() {
    let dir = TempDir::new().unwrap();
    let f = write_frame(dir.path(), "t.zst", &text(100_000));
    let out = run(&["literals", arg(&f)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let s = stdout(&out);
    assert!(s.contains("xxh64"));
    assert!(stderr(&out).contains("literal bytes"));

    // Same input, same report.
    let again = run(&["literals", arg(&f)]);
    assert_eq!(stdout(&again), s);
}

#[test]
fn quiet_suppresses_the_summary() {
    let dir = TempDir::new().unwrap();
    let f = write_frame(dir.path(), "q.zst", &text(10_000));
    let out = run(&["-q", "literals", arg(&f)]);
    assert!(out.status.success());
    assert!(stderr(&out).is_empty(), "stderr: {}", stderr(&out));
}

// ── recompress ────────────────────────────────────────────────────────────────

#[test]
fn recompress_reports_each_file_in_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| write_frame(dir.path(), &format!("f{i}.zst"), &text(40_000 + i * 10_000)))
        .collect();

    let mut args = vec!["-T3", "recompress", "--suspect-uncompressible"];
    args.extend(paths.iter().map(|p| arg(p)));
    let out = run(&args);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let s = stdout(&out);
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), 4);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.contains(&format!("f{i}.zst:")), "line {i}: {line}");
        assert!(line.contains("recompressed"));
    }

    // Worker count does not change the report.
    let mut args1 = vec!["-T1", "recompress", "--suspect-uncompressible"];
    args1.extend(paths.iter().map(|p| arg(p)));
    assert_eq!(stdout(&run(&args1)), s);
}

#[test]
fn repeat_mode_trace_only_at_verbose_level() {
    let dir = TempDir::new().unwrap();
    let f = write_frame(dir.path(), "v.zst", &text(60_000));

    let out = run(&["recompress", arg(&f)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(!stderr(&out).contains("(repeat "), "stderr: {}", stderr(&out));

    let out = run(&["-vv", "recompress", arg(&f)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("(repeat "), "stderr: {}", stderr(&out));
}

#[test]
fn recursive_expansion() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_frame(dir.path(), "top.zst", &text(5_000));
    write_frame(&dir.path().join("nested"), "deep.zst", &text(6_000));

    let out = run(&["recompress", arg(dir.path())]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));

    let out = run(&["-r", "recompress", arg(dir.path())]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let s = stdout(&out);
    assert!(s.contains("deep.zst"));
    assert!(s.contains("top.zst"));
}

// ── bench / probe ─────────────────────────────────────────────────────────────

#[test]
fn bench_reports_throughput() {
    let dir = TempDir::new().unwrap();
    let f = write_frame(dir.path(), "b.zst", &text(200_000));
    let out = run(&["bench", "-i", "1", arg(&f)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let s = stdout(&out);
    assert!(s.contains("MB/s"));
    assert!(s.contains("ratio"));
}

#[test]
fn probe_prints_sizes() {
    let out = run(&["probe"]);
    assert!(out.status.success());
    let s = stdout(&out);
    assert!(s.contains("compression table (max symbol 255): 129"));
    assert!(s.contains("decompression table (log 12): 4098"));
    assert!(s.contains("table build workspace: 2176"));
    assert!(s.contains("fast bit ops:"));
}

// ── errors ────────────────────────────────────────────────────────────────────

#[test]
fn missing_file_exits_with_error() {
    let out = run(&["blocks", "/no/such/file.zst"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("/no/such/file.zst"));
}

#[test]
fn corrupt_input_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let f = dir.path().join("bad.zst");
    fs::write(&f, b"this is not a zstd frame").unwrap();
    let out = run(&["literals", arg(&f)]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn reserved_block_type_exits_as_defect() {
    let dir = TempDir::new().unwrap();
    let f = dir.path().join("reserved.zst");
    // Single-segment frame, content size 0, then a reserved last block.
    let mut frame = vec![0x28, 0xB5, 0x2F, 0xFD, 0x20, 0x00];
    frame.extend_from_slice(&[0x07, 0x00, 0x00]);
    fs::write(&f, &frame).unwrap();
    let out = run(&["blocks", arg(&f)]);
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));
}

#[test]
fn missing_operands_is_a_usage_error() {
    let out = run(&["literals"]);
    assert!(!out.status.success());
    assert_ne!(out.status.code(), Some(3));
}

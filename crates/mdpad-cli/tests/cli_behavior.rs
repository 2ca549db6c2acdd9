use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

fn mdpad_bin() -> &'static str {
    env!("CARGO_BIN_EXE_mdpad-cli")
}

fn with_coverage_env(cmd: &mut Command) {
    if let Ok(profile) = std::env::var("LLVM_PROFILE_FILE") {
        cmd.env("LLVM_PROFILE_FILE", profile);
    }
}

/// Binary with its store and downloads confined to `home`.
fn mdpad_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(mdpad_bin());
    with_coverage_env(&mut cmd);
    cmd.env("MDPAD_STORE_DIR", home.join("store"))
        .env("MDPAD_DOWNLOADS_DIR", home)
        .env_remove("MDPAD_FORCE_TUI")
        .env_remove("MDPAD_LOG_FILE");
    cmd
}

fn temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write temp markdown");
    path
}

fn large_markdown_fixture(target_bytes: usize) -> String {
    let row = "## heading\n- item alpha\n- item beta\n`inline`\n\n";
    let mut out = String::from("# large fixture\n");
    while out.len() < target_bytes {
        out.push_str(row);
    }
    out
}

fn drain<R: std::io::Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_with_timeout(mut child: std::process::Child, timeout: Duration) -> Output {
    // Drain pipes concurrently so large output cannot fill the pipe buffer and block the child.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let started = std::time::Instant::now();
    loop {
        match child.try_wait().expect("try_wait") {
            Some(status) => {
                return Output {
                    status,
                    stdout: stdout.join().expect("stdout reader"),
                    stderr: stderr.join().expect("stderr reader"),
                };
            }
            None => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    panic!("process timed out");
                }
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

fn run_piped(cmd: &mut Command, timeout: Duration) -> Output {
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn mdpad");
    wait_with_timeout(child, timeout)
}

fn assert_force_tui_exit_or_known_io_error(output: Output) {
    if output.status.success() {
        return;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Resource temporarily unavailable")
            || stderr.contains("No such file or directory")
            || stderr.contains("No such device or address")
            || stderr.contains("Inappropriate ioctl"),
        "stderr: {}",
        stderr
    );
}

#[cfg(target_os = "linux")]
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

#[cfg(target_os = "linux")]
fn spawn_script(command: &str) -> std::process::Child {
    let mut cmd = Command::new("script");
    cmd.arg("-qfec").arg(command).arg("/dev/null");
    with_coverage_env(&mut cmd);

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn script")
}

#[test]
fn path_non_tty_renders_once_and_exits() {
    let home = tempfile::tempdir().expect("home");
    let path = temp_file(&home, "doc.md", "# Title\nbody with **bold**\n");
    let output = run_piped(mdpad_cmd(home.path()).arg(&path), Duration::from_millis(1500));
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("# Title"), "stdout: {stdout}");
    assert!(stdout.contains("body with bold"), "stdout: {stdout}");
}

#[test]
fn path_non_tty_large_file_exits() {
    let home = tempfile::tempdir().expect("home");
    let path = temp_file(&home, "large.md", &large_markdown_fixture(1024 * 1024));
    let output = run_piped(mdpad_cmd(home.path()).arg(&path), Duration::from_millis(4000));
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn missing_path_errors_in_print_mode() {
    let home = tempfile::tempdir().expect("home");
    let missing = home.path().join("nope.md");
    let output = run_piped(
        mdpad_cmd(home.path()).arg(&missing),
        Duration::from_millis(1500),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot open"), "stderr: {stderr}");
}

#[test]
fn no_path_prints_welcome_document_without_persisting() {
    let home = tempfile::tempdir().expect("home");
    let output = run_piped(&mut mdpad_cmd(home.path()), Duration::from_millis(1500));
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Welcome to mdpad"), "stdout: {stdout}");
    assert!(!home.path().join("store").exists());
}

#[test]
fn no_path_prints_stored_document() {
    let home = tempfile::tempdir().expect("home");
    fs::create_dir_all(home.path().join("store")).expect("store dir");
    fs::write(
        home.path().join("store").join("mdpad-content.md"),
        "# Saved draft\n- one\n",
    )
    .expect("seed store");

    let output = run_piped(&mut mdpad_cmd(home.path()), Duration::from_millis(1500));
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("# Saved draft"), "stdout: {stdout}");
    assert!(stdout.contains("- one"), "stdout: {stdout}");
}

#[test]
fn columns_env_controls_print_width() {
    let home = tempfile::tempdir().expect("home");
    let path = temp_file(&home, "wide.md", &"word ".repeat(40));
    let output = run_piped(
        mdpad_cmd(home.path()).arg(&path).env("COLUMNS", "20"),
        Duration::from_millis(1500),
    );
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.lines().count() > 5, "stdout: {stdout}");
    assert!(
        stdout.lines().all(|line| line.chars().count() <= 20),
        "stdout: {stdout}"
    );
}

#[test]
fn help_lists_flags() {
    let home = tempfile::tempdir().expect("home");
    let output = mdpad_cmd(home.path())
        .arg("--help")
        .output()
        .expect("run mdpad");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Usage:"), "stdout: {stdout}");
    assert!(stdout.contains("[PATH]"), "stdout: {stdout}");
    assert!(stdout.contains("--ephemeral"), "stdout: {stdout}");
    assert!(stdout.contains("--no-native-save"), "stdout: {stdout}");
}

#[test]
fn ephemeral_with_store_dir_is_rejected() {
    let home = tempfile::tempdir().expect("home");
    let output = mdpad_cmd(home.path())
        .args(["--ephemeral", "--store-dir", "x"])
        .output()
        .expect("run mdpad");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot be used with"), "stderr: {stderr}");
}

#[test]
fn log_file_receives_print_mode_warnings() {
    let home = tempfile::tempdir().expect("home");
    let log = home.path().join("mdpad.log");
    let output = run_piped(
        mdpad_cmd(home.path())
            .arg("--log-file")
            .arg(&log)
            .env("RUST_LOG", "debug"),
        Duration::from_millis(1500),
    );
    assert!(output.status.success());
    assert!(log.exists());
    assert!(String::from_utf8_lossy(&output.stderr).trim().is_empty());
}

#[test]
fn force_tui_still_exits_non_interactive() {
    let home = tempfile::tempdir().expect("home");
    let path = temp_file(&home, "force.md", "# title\nx");
    let output = run_piped(
        mdpad_cmd(home.path())
            .arg(&path)
            .env("MDPAD_FORCE_TUI", "1"),
        Duration::from_millis(1500),
    );
    assert_force_tui_exit_or_known_io_error(output);
}

#[cfg(target_os = "linux")]
#[test]
fn pty_interactive_exits_on_ctrl_q() {
    let home = tempfile::tempdir().expect("home");
    let path = temp_file(&home, "interactive.md", "# title\nx");
    let command = format!(
        "MDPAD_STORE_DIR={} {} {}",
        sh_quote(&home.path().join("store").to_string_lossy()),
        sh_quote(mdpad_bin()),
        sh_quote(&path.to_string_lossy())
    );
    let mut child = spawn_script(&command);

    thread::sleep(Duration::from_millis(300));
    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin.write_all(&[0x11]).expect("write ctrl+q");
    }
    let _ = child.stdin.take();

    let output = wait_with_timeout(child, Duration::from_secs(3));
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[cfg(target_os = "linux")]
#[test]
fn pty_typing_is_autosaved_to_store() {
    let home = tempfile::tempdir().expect("home");
    let store = home.path().join("store");
    let command = format!(
        "MDPAD_STORE_DIR={} {}",
        sh_quote(&store.to_string_lossy()),
        sh_quote(mdpad_bin()),
    );
    let mut child = spawn_script(&command);

    thread::sleep(Duration::from_millis(300));
    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin.write_all(b"zz").expect("type");
        stdin.flush().expect("flush");
    }
    thread::sleep(Duration::from_millis(300));
    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin.write_all(&[0x11]).expect("write ctrl+q");
    }
    let _ = child.stdin.take();

    let output = wait_with_timeout(child, Duration::from_secs(3));
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stored = fs::read_to_string(store.join("mdpad-content.md")).expect("stored document");
    assert!(stored.ends_with("zz"), "stored: {stored}");
}

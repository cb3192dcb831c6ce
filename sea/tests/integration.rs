use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// A throwaway application root with its own config and plugin manifest
struct TestApp {
    dir: tempfile::TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("configs")).unwrap();
        fs::create_dir_all(dir.path().join("xdg")).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::write(&path, body).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        // Run the compiled binary directly (avoids cargo lock issues)
        Command::new(env!("CARGO_BIN_EXE_sea"))
            .arg("-C")
            .arg(self.root())
            .args(args)
            .env("XDG_CONFIG_HOME", self.root().join("xdg"))
            .env_remove("SEA_ENV")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to start sea")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_plusone_default_number() {
    let app = TestApp::new();
    let output = app.run(&["plusone"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "NUMBER = 101");
}

#[test]
fn test_plusone_reads_config_and_flags() {
    let app = TestApp::new();
    app.write("configs/default.toml", "NUMBER = 5\n");
    app.write("configs/testing.toml", "NUMBER = 41\n");

    let output = app.run(&["plusone"]);
    assert_eq!(stdout(&output).trim(), "NUMBER = 6");

    let output = app.run(&["-e", "testing", "plusone"]);
    assert_eq!(stdout(&output).trim(), "NUMBER = 42");

    let output = app.run(&["plusone", "-n", "100"]);
    assert_eq!(stdout(&output).trim(), "NUMBER = 101");
}

#[test]
fn test_unknown_job() {
    let app = TestApp::new();
    let output = app.run(&["config_hello"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no such job: config_hello"));
}

#[test]
fn test_domain_failure_exit_code() {
    let app = TestApp::new();
    let output = app.run(&["config", "MISSING"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("config key not set: MISSING"));
}

#[test]
fn test_no_arguments_shows_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_sea")).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage"));
}

#[cfg(unix)]
#[test]
fn test_plugin_jobs_survive_broken_plugin() {
    let app = TestApp::new();
    app.write(
        "plugins.toml",
        r#"
        [[provider]]
        name = "xyz"
        command = "sh"
        args = ["-c", "echo hello from $SEA_JOB"]
        about = "Say hello"

        [[provider]]
        name = "broken"
        command = "./bin/missing-plugin"
        "#,
    );

    let output = app.run(&["xyz"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "hello from xyz");

    let log = stderr(&output);
    assert_eq!(log.matches("error has occurred during pkg loading").count(), 1);
    assert!(log.contains("command not found"));

    let output = app.run(&["--list"]);
    let listing = stdout(&output);
    assert!(listing.contains("xyz"));
    assert!(listing.contains("plusone"));
    assert!(!listing.contains("broken"));
}

#[cfg(unix)]
#[test]
fn test_job_arguments_are_forwarded_verbatim() {
    let app = TestApp::new();
    app.write(
        "plugins.toml",
        "[[provider]]\nname = \"echo\"\ncommand = \"sh\"\nargs = [\"-c\", 'printf \"%s\\n\" \"$*\"', \"sh\"]\n",
    );

    let output = app.run(&["echo", "-v", "--list", "-e", "prod", "-C", "/tmp", "--help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "-v --list -e prod -C /tmp --help");

    // Flags before the job name still belong to sea
    let output = app.run(&["-v", "echo", "hello"]);
    assert_eq!(stdout(&output).trim(), "hello");
    assert!(stderr(&output).contains("DEBUG"));
}

#[test]
fn test_job_help_goes_to_stdout() {
    let app = TestApp::new();
    let output = app.run(&["plusone", "--help"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("--number"));
    assert!(!stdout(&output).contains("NUMBER ="));
    assert!(!stderr(&output).contains("failed"));
}

#[cfg(unix)]
#[test]
fn test_plugin_failure_status_is_reported() {
    let app = TestApp::new();
    app.write(
        "plugins.toml",
        "[[provider]]\nname = \"migrate\"\ncommand = \"sh\"\nargs = [\"-c\", \"exit 4\"]\n",
    );

    let output = app.run(&["migrate"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_invalid_manifest_does_not_block_builtin_jobs() {
    let app = TestApp::new();
    app.write("plugins.toml", "[[provider]\nname = ");

    let output = app.run(&["plusone"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("error has occurred during pkg loading: invalid plugin manifest"));
}

use ikein::dispatcher::{END_SENTINEL, START_SENTINEL};
use ikein::env::FixedAnswer;
use ikein::{Dispatcher, Environment};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn env_at(root: &Path, cwd: &Path) -> Environment {
    Environment::with_root(
        root.to_path_buf(),
        cwd.to_path_buf(),
        Box::new(FixedAnswer(false)),
    )
}

/// Run `ikein <args...>` the way the binary does and capture stdout.
fn invoke(env: &mut Environment, args: &[&str]) -> (i32, String) {
    let registry = ikein::bootstrap(env).unwrap();
    let argv: Vec<String> = std::iter::once("ikein")
        .chain(args.iter().copied())
        .map(String::from)
        .collect();
    let mut out = Vec::new();
    let code = Dispatcher::new(&registry).run(&argv, env, &mut out);
    (code, String::from_utf8(out).unwrap())
}

fn framed(payload: &str) -> String {
    format!("{START_SENTINEL}\n{payload}\n{END_SENTINEL}\n")
}

#[test]
fn no_arguments_lists_every_module() {
    let root = TempDir::new().unwrap();
    let mut env = env_at(root.path(), root.path());
    let (code, out) = invoke(&mut env, &[]);
    assert_eq!(code, 0);
    assert!(out.starts_with("- ikein\n\t- list: Displays all available IKEIN commands.\n"));
    for module in ["- echo", "- git", "- goto", "- run"] {
        assert!(out.lines().any(|l| l == module), "{module} missing from:\n{out}");
    }
    assert!(!out.contains(START_SENTINEL));
}

#[test]
fn goto_round_trip_through_the_config_file() {
    let root = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let dir = project.path().to_string_lossy().into_owned();

    let mut env = env_at(root.path(), project.path());
    let (code, out) = invoke(&mut env, &["goto", "-a", "proj"]);
    assert_eq!(code, 0);
    assert_eq!(out, format!("- [I.K.E.I.N.]: Alias added: proj → {dir}\n"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.path().join("config.json")).unwrap())
            .unwrap();
    assert_eq!(stored, json!({"goto": {"dirs": {"proj": dir}}}));

    let mut env = env_at(root.path(), root.path());
    let (code, out) = invoke(&mut env, &["goto", "proj"]);
    assert_eq!(code, 0);
    assert_eq!(
        out,
        format!(
            "- [I.K.E.I.N.]: Navigating to: {dir}\n{}",
            framed(&format!("cd {}", ikein::shell::quote(&dir)))
        )
    );
}

#[test]
fn run_round_trip_returns_to_the_calling_directory() {
    let root = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let quote = |p: &Path| ikein::shell::quote(&p.to_string_lossy()).into_owned();

    let mut env = env_at(root.path(), project.path());
    let (code, _) = invoke(&mut env, &["run", "-a", "test", "make", "check"]);
    assert_eq!(code, 0);

    let mut env = env_at(root.path(), root.path());
    let (code, out) = invoke(&mut env, &["run", "test"]);
    assert_eq!(code, 0);
    assert_eq!(
        out,
        framed(&format!(
            "cd {}; make check; cd {};",
            quote(project.path()),
            quote(root.path())
        ))
    );
}

#[test]
fn unknown_command_exits_127() {
    let root = TempDir::new().unwrap();
    let mut env = env_at(root.path(), root.path());
    let (code, out) = invoke(&mut env, &["teleport"]);
    assert_eq!(code, 127);
    assert_eq!(out, "error: command not found: teleport\n");
}

#[test]
fn bad_arguments_exit_2_without_a_payload() {
    let root = TempDir::new().unwrap();
    let mut env = env_at(root.path(), root.path());
    let (code, out) = invoke(&mut env, &["gnewf"]);
    assert_eq!(code, 2);
    assert!(out.starts_with("error: gnewf: "));
    assert!(!out.contains(START_SENTINEL));
}

#[test]
fn help_is_printed_plainly() {
    let root = TempDir::new().unwrap();
    let mut env = env_at(root.path(), root.path());
    let (code, out) = invoke(&mut env, &["goto", "--help"]);
    assert_eq!(code, 0);
    assert!(out.starts_with("Usage: ikein goto"));
    assert!(!out.contains(START_SENTINEL));
}

#[test]
fn usage_describes_a_plugin_command() {
    let root = TempDir::new().unwrap();
    let mut env = env_at(root.path(), root.path());
    let (_, out) = invoke(&mut env, &["usage", "glock"]);
    assert_eq!(
        out,
        "- Temporarily ignore local changes to a tracked file without modifying .gitignore.:\n\
         \t$ ikein glock <file>\n"
    );
}

#[test]
fn disabled_plugins_are_not_dispatched() {
    let root = TempDir::new().unwrap();
    let mut env = env_at(root.path(), root.path());
    env.config
        .save(&json!({"plugins": {"disabled": ["git"]}}))
        .unwrap();

    let (code, out) = invoke(&mut env, &["gtree"]);
    assert_eq!(code, 127);
    assert_eq!(out, "error: command not found: gtree\n");

    let (_, listed) = invoke(&mut env, &["list"]);
    assert!(!listed.lines().any(|l| l == "- git"));
    assert!(listed.lines().any(|l| l == "- goto"));
}

#[test]
fn malformed_config_fails_bootstrap() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("config.json"), "{ not json").unwrap();
    let env = env_at(root.path(), root.path());
    assert!(ikein::bootstrap(&env).is_err());
}

#[test]
fn install_writes_config_and_shell_function() {
    let root = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let rc = home.path().join(".bashrc");
    std::fs::write(&rc, "export PATH=/opt/bin:$PATH\n").unwrap();
    let rc_arg = rc.to_string_lossy().into_owned();

    let mut env = env_at(root.path(), root.path());
    env.config.save(&json!({"displayName": "Ada"})).unwrap();

    let (code, _) = invoke(&mut env, &["install", "--rc", &rc_arg]);
    assert_eq!(code, 0);
    let config = env.config.get().unwrap();
    assert_eq!(config["displayName"], "Ada");
    assert_eq!(config["goto"], json!({"dirs": {}}));

    let (code, _) = invoke(&mut env, &["install", "--rc", &rc_arg]);
    assert_eq!(code, 0);
    let contents = std::fs::read_to_string(&rc).unwrap();
    assert!(contents.starts_with("export PATH=/opt/bin:$PATH\n"));
    assert_eq!(contents.matches(ikein::install::BLOCK_BEGIN).count(), 1);
}

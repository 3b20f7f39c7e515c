//! Bootstrap of a user installation.
//!
//! Installing creates the root directory, merges the default configuration into
//! whatever the user already has, and adds a shell function to the rc file. The
//! function runs the binary, prints everything outside the sentinel frame, and
//! `eval`s what is inside it in the calling shell.

use crate::config;
use crate::env::Environment;
use crate::shell::quote;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BLOCK_BEGIN: &str = "# >>> ikein >>>";
pub const BLOCK_END: &str = "# <<< ikein <<<";

const LEGACY_ALIAS: &str = "alias ikein=";

const WRAPPER: &str = r#"ikein() {
  local __ikein_out __ikein_status
  __ikein_out="$(@BIN@ "$@")"
  __ikein_status=$?
  [ -n "$__ikein_out" ] || return $__ikein_status
  printf '%s\n' "$__ikein_out" | awk '/^<<START_COMMAND>>$/{f=1;next} /^<<END_COMMAND>>$/{f=0;next} !f'
  eval "$(printf '%s\n' "$__ikein_out" | awk '/^<<END_COMMAND>>$/{f=0} f; /^<<START_COMMAND>>$/{f=1}')"
  return $__ikein_status
}"#;

/// Default contents of a fresh configuration document.
pub fn template() -> Value {
    json!({
        "displayName": "",
        "goto": { "dirs": {} },
        "run": { "commands": {} },
        "git": { "profiles": {} },
        "plugins": { "disabled": [] }
    })
}

/// The marked rc-file block defining the `ikein` shell function.
pub fn wrapper(binary: &Path) -> String {
    let function = WRAPPER.replace("@BIN@", &quote(&binary.to_string_lossy()));
    format!("{BLOCK_BEGIN}\n{function}\n{BLOCK_END}\n")
}

/// `~/.bashrc` for bash users, `~/.zshrc` for everyone else.
pub fn default_rc_file(env: &Environment) -> Option<PathBuf> {
    let home = env
        .get_var("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)?;
    let bash = env
        .get_var("SHELL")
        .is_some_and(|shell| shell.ends_with("bash"));
    Some(home.join(if bash { ".bashrc" } else { ".zshrc" }))
}

/// Remove a previously installed block and any legacy `alias ikein=` line.
///
/// A block is only dropped once its end marker is seen; a begin marker without one
/// leaves every following line in place. Returns the remaining text and whether
/// anything was removed.
pub fn strip_previous(contents: &str) -> (String, bool) {
    let mut kept = String::with_capacity(contents.len());
    let mut removed = false;
    let mut block: Option<Vec<&str>> = None;
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed == BLOCK_BEGIN {
            if let Some(unterminated) = block.replace(vec![line]) {
                keep_lines(&mut kept, &unterminated);
            }
        } else if let Some(lines) = block.as_mut() {
            if trimmed == BLOCK_END {
                block = None;
                removed = true;
            } else {
                lines.push(line);
            }
        } else if trimmed.starts_with(LEGACY_ALIAS) {
            removed = true;
        } else {
            keep_lines(&mut kept, &[line]);
        }
    }
    if let Some(unterminated) = block {
        keep_lines(&mut kept, &unterminated);
    }
    (kept, removed)
}

fn keep_lines(kept: &mut String, lines: &[&str]) {
    for line in lines {
        kept.push_str(line);
        kept.push('\n');
    }
}

/// What an installation did.
#[derive(Debug)]
pub struct Report {
    pub config: PathBuf,
    pub rc_file: PathBuf,
    pub replaced: bool,
    pub backup: Option<PathBuf>,
}

pub struct Installer {
    /// Binary the shell function calls.
    pub binary: PathBuf,
    /// Shell startup file receiving the function.
    pub rc_file: PathBuf,
}

impl Installer {
    pub fn install(&self, env: &Environment) -> Result<Report> {
        fs::create_dir_all(&env.root)
            .with_context(|| format!("can't create {}", env.root.display()))?;

        let merged = config::merge(env.config.get()?, template());
        env.config.save(&merged)?;

        let previous = match fs::read_to_string(&self.rc_file) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("can't read {}", self.rc_file.display()));
            }
        };

        let (mut updated, replaced) = strip_previous(&previous);
        if !updated.is_empty() && !updated.ends_with("\n\n") {
            updated.push('\n');
        }
        updated.push_str(&wrapper(&self.binary));

        let backup = if !previous.is_empty() && previous != updated {
            let mut name = OsString::from(self.rc_file.as_os_str());
            name.push(".bak");
            let backup = PathBuf::from(name);
            fs::write(&backup, &previous)
                .with_context(|| format!("can't write {}", backup.display()))?;
            Some(backup)
        } else {
            None
        };

        fs::write(&self.rc_file, &updated)
            .with_context(|| format!("can't write {}", self.rc_file.display()))?;
        info!(rc_file = %self.rc_file.display(), replaced, "shell function installed");

        Ok(Report {
            config: env.config.path().to_path_buf(),
            rc_file: self.rc_file.clone(),
            replaced,
            backup,
        })
    }
}

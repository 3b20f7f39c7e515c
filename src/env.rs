use crate::config::ConfigStore;
use anyhow::{Context, Result};
use rustyline::config::{Behavior, Config};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Variable that overrides the installation root.
pub const HOME_VAR: &str = "IKEIN_HOME";

/// Directory under `$HOME` used when [`HOME_VAR`] is unset.
pub const DEFAULT_ROOT: &str = "ikein";

/// Per-invocation view of the process and the user's installation.
///
/// The environment contains:
/// - `vars`: environment variables visible to commands (e.g. `SHELL`, `EDITOR`).
/// - `current_dir`: the directory the user invoked `ikein` from.
/// - `root`: the installation root holding `config.json`.
/// - `config`: the configuration document store inside `root`.
/// - `prompt`: how yes/no questions reach the user.
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub root: PathBuf,
    pub config: ConfigStore,
    pub prompt: Box<dyn Prompt>,
}

impl Environment {
    /// Capture the current process state.
    ///
    /// The root is `$IKEIN_HOME` when set, otherwise `~/ikein`.
    pub fn new() -> Result<Self> {
        let vars: HashMap<String, String> = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().context("can't read the current directory")?;
        let root = root_from(&vars, dirs::home_dir())?;
        let mut env = Self::with_root(root, current_dir, Box::new(TerminalPrompt));
        env.vars = vars;
        Ok(env)
    }

    /// An environment with no variables, rooted at `root` and invoked from `current_dir`.
    pub fn with_root(root: PathBuf, current_dir: PathBuf, prompt: Box<dyn Prompt>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir,
            config: ConfigStore::in_root(&root),
            root,
            prompt,
        }
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

/// `$IKEIN_HOME` when set and non-empty, otherwise `<home>/ikein`.
fn root_from(vars: &HashMap<String, String>, home: Option<PathBuf>) -> Result<PathBuf> {
    match vars.get(HOME_VAR) {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => home
            .map(|home| home.join(DEFAULT_ROOT))
            .ok_or_else(|| anyhow::anyhow!("can't locate the home directory; set {HOME_VAR}")),
    }
}

/// Asks the user yes/no questions.
pub trait Prompt {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Reads the answer from the controlling terminal.
///
/// Prefers the terminal over stdin/stdout so the question is still visible while the
/// shell wrapper captures stdout.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let config = Config::builder().behavior(Behavior::PreferTerm).build();
        let mut rl = DefaultEditor::with_config(config)?;
        match rl.readline(&format!("{question} [y/N] ")) {
            Ok(answer) => Ok(is_yes(&answer)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Gives the same answer to every question.
pub struct FixedAnswer(pub bool);

impl Prompt for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(self.0)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

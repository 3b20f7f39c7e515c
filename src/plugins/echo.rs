use crate::command::{Command, Output, Scope};
use crate::env::Environment;
use crate::registry::Module;
use crate::shell::notice;
use anyhow::Result;
use argh::FromArgs;
use std::io::Write;

/// Top-level configuration key with the user's display name.
pub const DISPLAY_NAME: &str = "displayName";

pub fn module() -> Module {
    Module::new("echo").command::<Hello>()
}

#[derive(FromArgs)]
/// greet someone, or yourself.
pub struct Hello {
    #[argh(positional)]
    /// who to greet; defaults to the configured display name.
    pub name: Option<String>,
}

impl Command for Hello {
    fn name() -> &'static str {
        "hello"
    }

    fn info() -> &'static str {
        "Greets the given name, or the configured display name."
    }

    fn usage() -> &'static str {
        "ikein hello [name]"
    }

    fn execute(
        self,
        _scope: Scope<'_>,
        env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        Ok(match self.name {
            Some(name) => notice(format!("Hi {name}")),
            None => {
                let display: String = env.config.section(DISPLAY_NAME)?;
                notice(format!("Hi {display}!"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedAnswer;
    use serde_json::json;
    use tempfile::TempDir;

    fn env_in(dir: &TempDir) -> Environment {
        Environment::with_root(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
            Box::new(FixedAnswer(false)),
        )
    }

    #[test]
    fn test_hello_with_name() {
        let dir = TempDir::new().unwrap();
        let mut env = env_in(&dir);
        let cmd = Hello {
            name: Some("Grace".to_string()),
        };
        let out = cmd.execute(Scope::Plugin, &mut env, &mut Vec::new()).unwrap();
        assert_eq!(out, notice("Hi Grace"));
    }

    #[test]
    fn test_hello_uses_display_name() {
        let dir = TempDir::new().unwrap();
        let mut env = env_in(&dir);
        env.config.save(&json!({"displayName": "Ada"})).unwrap();
        let out = Hello { name: None }
            .execute(Scope::Plugin, &mut env, &mut Vec::new())
            .unwrap();
        assert_eq!(out, notice("Hi Ada!"));
    }

    #[test]
    fn test_hello_without_config() {
        let dir = TempDir::new().unwrap();
        let mut env = env_in(&dir);
        let out = Hello { name: None }
            .execute(Scope::Plugin, &mut env, &mut Vec::new())
            .unwrap();
        assert_eq!(out, notice("Hi !"));
    }
}

use crate::command::{Command, Output, Scope};
use crate::env::Environment;
use crate::install::{self, Installer};
use crate::registry::Module;
use crate::shell::{notice, quote};
use anyhow::{Context, Result};
use argh::FromArgs;
use std::io::Write;
use std::path::PathBuf;

/// Name of the always-present module.
pub const CORE_MODULE: &str = "ikein";

/// The core commands, always registered ahead of any plugin.
pub fn module() -> Module {
    Module::new(CORE_MODULE)
        .command::<List>()
        .command::<Usage>()
        .command::<Config>()
        .command::<Install>()
}

#[derive(FromArgs)]
/// display all available commands.
pub struct List {}

impl Command for List {
    fn name() -> &'static str {
        "list"
    }

    fn info() -> &'static str {
        "Displays all available IKEIN commands."
    }

    fn usage() -> &'static str {
        "ikein list"
    }

    fn execute(
        self,
        scope: Scope<'_>,
        _env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        let mut lines = Vec::new();
        for module in scope.catalog()?.modules() {
            lines.push(format!("- {}", module.name));
            for command in &module.commands {
                lines.push(format!("\t- {}: {}", command.name, command.info));
            }
        }
        Ok(Output::Message(lines.join("\n")))
    }
}

#[derive(FromArgs)]
/// show usage details for a command.
pub struct Usage {
    #[argh(positional)]
    /// the command to describe.
    pub command: String,
}

impl Command for Usage {
    fn name() -> &'static str {
        "usage"
    }

    fn info() -> &'static str {
        "Provides usage details for a specific command."
    }

    fn usage() -> &'static str {
        "ikein usage <command>"
    }

    fn execute(
        self,
        scope: Scope<'_>,
        _env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        let found = scope.catalog()?.find(&self.command);
        if found.is_empty() {
            return Ok(notice(format!("Command not found: '{}'", self.command)));
        }
        let text = found
            .iter()
            .map(|(_, d)| format!("- {}:\n\t$ {}", d.info, d.usage))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Output::Message(text))
    }
}

#[derive(FromArgs)]
/// open the configuration file in an editor.
pub struct Config {}

impl Command for Config {
    fn name() -> &'static str {
        "config"
    }

    fn info() -> &'static str {
        "Opens the IKEIN configuration file in your editor."
    }

    fn usage() -> &'static str {
        "ikein config"
    }

    fn execute(
        self,
        _scope: Scope<'_>,
        env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        let path = env.config.path().to_string_lossy().into_owned();
        Ok(Output::Executable(format!(
            "${{EDITOR:-vi}} {}",
            quote(&path)
        )))
    }
}

#[derive(FromArgs)]
/// set up the configuration file and the shell function.
pub struct Install {
    #[argh(option)]
    /// shell startup file to write the function to; defaults to ~/.bashrc or ~/.zshrc.
    pub rc: Option<PathBuf>,
}

impl Command for Install {
    fn name() -> &'static str {
        "install"
    }

    fn info() -> &'static str {
        "Creates the configuration and installs the ikein shell function."
    }

    fn usage() -> &'static str {
        "ikein install [--rc <file>]"
    }

    fn execute(
        self,
        _scope: Scope<'_>,
        env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        let rc_file = match self.rc {
            Some(rc) => rc,
            None => install::default_rc_file(env)
                .context("can't locate the home directory; pass --rc <file>")?,
        };
        let binary = std::env::current_exe().context("can't locate the ikein binary")?;
        let report = Installer { binary, rc_file }.install(env)?;

        let mut lines = vec![
            format!("Configuration: {}", report.config.display()),
            format!(
                "{} shell function in {}",
                if report.replaced { "Updated" } else { "Added" },
                report.rc_file.display()
            ),
        ];
        if let Some(backup) = &report.backup {
            lines.push(format!("Previous version saved to {}", backup.display()));
        }
        lines.push(format!(
            "Run `source {}` or open a new shell to start using ikein.",
            report.rc_file.display()
        ));
        Ok(notice(lines.join("\n")))
    }
}

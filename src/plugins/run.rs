use crate::command::{Command, Output, Scope, invalid_args};
use crate::env::Environment;
use crate::registry::Module;
use crate::shell::{is_valid_alias, notice, quote};
use anyhow::Result;
use argh::FromArgs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;

pub const SECTION: &str = "run";

/// A saved command and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAlias {
    pub directory: String,
    pub command: String,
}

/// `run` section of the configuration document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(default)]
    pub commands: BTreeMap<String, RunAlias>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

pub fn module() -> Module {
    Module::new("run").command::<Run>()
}

#[derive(FromArgs)]
/// manage and run saved command aliases.
pub struct Run {
    #[argh(option, short = 'a')]
    /// save the trailing words as a command under this alias, run from the current directory.
    pub add: Option<String>,

    #[argh(switch, short = 'l')]
    /// list saved aliases.
    pub list: bool,

    #[argh(option, short = 'r')]
    /// forget an alias.
    pub remove: Option<String>,

    #[argh(positional, greedy)]
    /// the alias to run, or the command to save with -a.
    pub words: Vec<String>,
}

enum Mode {
    Add { alias: String, command: String },
    List,
    Remove(String),
    Run(String),
}

impl Run {
    fn mode(self) -> Result<Mode> {
        match (self.add, self.list, self.remove) {
            (Some(alias), false, None) => {
                if self.words.is_empty() {
                    return Err(invalid_args(
                        Self::name(),
                        "a command is required. Use: ikein run -a <alias> <command>",
                    ));
                }
                Ok(Mode::Add {
                    alias,
                    command: self.words.join(" "),
                })
            }
            (None, true, None) if self.words.is_empty() => Ok(Mode::List),
            (None, false, Some(alias)) if self.words.is_empty() => Ok(Mode::Remove(alias)),
            (None, false, None) if self.words.len() == 1 => {
                Ok(Mode::Run(self.words.into_iter().next().unwrap_or_default()))
            }
            _ => Err(invalid_args(
                Self::name(),
                format!("invalid combination of arguments. Use: {}", Self::usage()),
            )),
        }
    }
}

impl Command for Run {
    fn name() -> &'static str {
        "run"
    }

    fn info() -> &'static str {
        "Manage and run predefined command aliases."
    }

    fn usage() -> &'static str {
        "ikein run [-a <alias> <command>] | [<alias>] | [-l] | [-r <alias>]"
    }

    fn execute(
        self,
        _scope: Scope<'_>,
        env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        let mode = self.mode()?;
        let mut section: RunSection = env.config.section(SECTION)?;

        match mode {
            Mode::Add { alias, command } => {
                if !is_valid_alias(&alias) {
                    return Ok(notice(format!("Invalid alias name: '{alias}'")));
                }
                let entry = RunAlias {
                    directory: env.current_dir.to_string_lossy().into_owned(),
                    command,
                };
                let shown = format!("{} {}", entry.directory, entry.command);
                section.commands.insert(alias.clone(), entry);
                env.config.save_section(SECTION, &section)?;
                Ok(notice(format!("Alias added: {alias} → {shown}")))
            }
            Mode::List => {
                if section.commands.is_empty() {
                    return Ok(notice("No saved aliases."));
                }
                let lines: Vec<String> = section
                    .commands
                    .iter()
                    .map(|(alias, e)| format!("\t- {alias} → {} {}", e.directory, e.command))
                    .collect();
                Ok(notice(format!("Saved aliases:\n{}", lines.join("\n"))))
            }
            Mode::Remove(alias) => {
                if section.commands.remove(&alias).is_none() {
                    return Ok(notice(format!("Alias not found: '{alias}'")));
                }
                env.config.save_section(SECTION, &section)?;
                Ok(notice(format!("Alias removed: {alias}")))
            }
            Mode::Run(alias) => match section.commands.get(&alias) {
                Some(entry) => Ok(Output::Executable(format!(
                    "cd {}; {}; cd {};",
                    quote(&entry.directory),
                    entry.command,
                    quote(&env.current_dir.to_string_lossy())
                ))),
                None => Ok(notice(format!("Alias not found: '{alias}'"))),
            },
        }
    }
}

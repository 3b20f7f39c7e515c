//! Directory bookmarks.
//!
//! `goto -a <alias>` remembers the current directory, `goto <alias>` produces the
//! `cd` that takes the calling shell back there.

use crate::command::{Command, Output, Scope, invalid_args};
use crate::env::Environment;
use crate::registry::Module;
use crate::shell::{BANNER, is_valid_alias, notice, quote};
use anyhow::Result;
use argh::FromArgs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;

pub const SECTION: &str = "goto";

/// `goto` section of the configuration document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GotoSection {
    /// Alias to absolute directory.
    #[serde(default)]
    pub dirs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

pub fn module() -> Module {
    Module::new("goto").command::<Goto>()
}

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

#[derive(FromArgs)]
/// manage and navigate to directory aliases.
pub struct Goto {
    #[argh(option, short = 'a')]
    /// save the current directory under this alias.
    pub add: Option<String>,

    #[argh(switch, short = 'l')]
    /// list saved aliases.
    pub list: bool,

    #[argh(option, short = 'r')]
    /// forget an alias.
    pub remove: Option<String>,

    #[argh(option, short = 'o')]
    /// open the aliased directory in the file manager.
    pub open: Option<String>,

    #[argh(positional)]
    /// alias to navigate to.
    pub alias: Option<String>,
}

enum Action<'a> {
    Add(&'a str),
    List,
    Remove(&'a str),
    Open(&'a str),
    Navigate(&'a str),
}

impl Goto {
    fn action(&self) -> Result<Action<'_>> {
        let mut actions = Vec::new();
        if let Some(alias) = &self.add {
            actions.push(Action::Add(alias));
        }
        if self.list {
            actions.push(Action::List);
        }
        if let Some(alias) = &self.remove {
            actions.push(Action::Remove(alias));
        }
        if let Some(alias) = &self.open {
            actions.push(Action::Open(alias));
        }
        if let Some(alias) = &self.alias {
            actions.push(Action::Navigate(alias));
        }
        if actions.len() != 1 {
            return Err(invalid_args(
                Self::name(),
                format!("expected exactly one of -a, -l, -r, -o or an alias. Use: {}", Self::usage()),
            ));
        }
        Ok(actions.remove(0))
    }
}

impl Command for Goto {
    fn name() -> &'static str {
        "goto"
    }

    fn info() -> &'static str {
        "Manage and navigate to predefined directory aliases."
    }

    fn usage() -> &'static str {
        "ikein goto [-a <alias>] | [<alias>] | [-l] | [-o <alias>] | [-r <alias>]"
    }

    fn execute(
        self,
        _scope: Scope<'_>,
        env: &mut Environment,
        stdout: &mut dyn Write,
    ) -> Result<Output> {
        let action = self.action()?;
        let mut section: GotoSection = env.config.section(SECTION)?;
        match action {
            Action::Add(alias) => {
                if !is_valid_alias(alias) {
                    return Ok(notice(format!("Invalid alias name: '{alias}'")));
                }
                let directory = env.current_dir.to_string_lossy().into_owned();
                section.dirs.insert(alias.to_string(), directory.clone());
                env.config.save_section(SECTION, &section)?;
                Ok(notice(format!("Alias added: {alias} → {directory}")))
            }
            Action::List => {
                if section.dirs.is_empty() {
                    return Ok(notice("No saved aliases."));
                }
                let lines: Vec<String> = section
                    .dirs
                    .iter()
                    .map(|(alias, path)| format!("\t- {alias} → {path}"))
                    .collect();
                Ok(notice(format!("Saved aliases:\n{}", lines.join("\n"))))
            }
            Action::Remove(alias) => {
                if section.dirs.remove(alias).is_none() {
                    return Ok(notice(format!("Alias not found: '{alias}'")));
                }
                env.config.save_section(SECTION, &section)?;
                Ok(notice(format!("Alias removed: {alias}")))
            }
            Action::Open(alias) => match section.dirs.get(alias) {
                Some(path) => {
                    writeln!(stdout, "{BANNER}: Opening directory: {path}")?;
                    Ok(Output::Executable(format!("{OPENER} {}", quote(path))))
                }
                None => Ok(notice(format!("Alias not found: '{alias}'"))),
            },
            Action::Navigate(alias) => match section.dirs.get(alias) {
                Some(path) => {
                    writeln!(stdout, "{BANNER}: Navigating to: {path}")?;
                    Ok(Output::Executable(format!("cd {}", quote(path))))
                }
                None => Ok(notice(format!("Alias not found: '{alias}'"))),
            },
        }
    }
}

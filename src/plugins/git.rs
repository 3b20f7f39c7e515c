//! Git shortcuts.
//!
//! Every command only produces shell text. Anything that depends on repository state
//! (current branch, local branches) is resolved by that text when the wrapper runs it.

use crate::command::{Command, Output, Scope, invalid_args};
use crate::env::Environment;
use crate::registry::Module;
use crate::shell::{echo, notice, quote};
use anyhow::Result;
use argh::FromArgs;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;

pub const SECTION: &str = "git";

const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_BRANCH: &str = "main";

const TREE: &str = "git log --graph --pretty=format:'%Cred%h%Creset -%C(yellow)%d%Creset %s %Cgreen(%cr) %C(bold blue)<%an>%Creset' --abbrev-commit --date=relative --branches";

const CURRENT_BRANCH: &str = r#"__ikein_branch="$(git symbolic-ref --short -q HEAD)""#;

/// Scripts run in the caller's shell; they must not leave their variables behind.
const UNSET: &str = "unset __ikein_branch __ikein_b";

/// A git identity the user can switch to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

/// `git` section of the configuration document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GitSection {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

pub fn module() -> Module {
    Module::new("git")
        .command::<NewFeature>()
        .command::<NewBug>()
        .command::<CleanBranch>()
        .command::<Squash>()
        .command::<Undo>()
        .command::<DeleteLocalBranches>()
        .command::<Tree>()
        .command::<CleanUntracked>()
        .command::<Lock>()
        .command::<UpdateBranch>()
        .command::<SwitchUser>()
}

fn temp_branch() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect()
}

/// `[]` is origin/main, `[branch]` is on origin, `[remote, branch]` is explicit.
fn remote_and_branch(command: &str, refs: &[String]) -> Result<(String, String)> {
    match refs {
        [] => Ok((DEFAULT_REMOTE.to_string(), DEFAULT_BRANCH.to_string())),
        [branch] => Ok((DEFAULT_REMOTE.to_string(), branch.clone())),
        [remote, branch] => Ok((remote.clone(), branch.clone())),
        _ => Err(invalid_args(command, "expected at most a remote and a branch")),
    }
}

fn script(lines: &[String]) -> Output {
    Output::Executable(lines.join("\n"))
}

#[derive(FromArgs)]
/// create a feature branch.
pub struct NewFeature {
    #[argh(positional)]
    /// name of the feature.
    pub name: String,
}

impl Command for NewFeature {
    fn name() -> &'static str {
        "gnewf"
    }

    fn info() -> &'static str {
        "Creates a new feature branch."
    }

    fn usage() -> &'static str {
        "ikein gnewf <feature_name>"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        Ok(Output::Executable(format!(
            "git checkout -b {}",
            quote(&format!("feature/{}", self.name))
        )))
    }
}

#[derive(FromArgs)]
/// create a bug branch.
pub struct NewBug {
    #[argh(positional)]
    /// name of the bug.
    pub name: String,
}

impl Command for NewBug {
    fn name() -> &'static str {
        "gnewb"
    }

    fn info() -> &'static str {
        "Creates a new bug branch."
    }

    fn usage() -> &'static str {
        "ikein gnewb <bug_name>"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        Ok(Output::Executable(format!(
            "git checkout -b {}",
            quote(&format!("bug/{}", self.name))
        )))
    }
}

#[derive(FromArgs)]
/// reset a branch to its remote state.
pub struct CleanBranch {
    #[argh(positional)]
    /// optional remote, then branch; defaults to origin main.
    pub refs: Vec<String>,
}

impl Command for CleanBranch {
    fn name() -> &'static str {
        "gclean"
    }

    fn info() -> &'static str {
        "Cleans the target branch and updates it from the remote repository."
    }

    fn usage() -> &'static str {
        "ikein gclean [remote] [branch]"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        let (remote, branch) = remote_and_branch(Self::name(), &self.refs)?;
        let (remote, branch) = (quote(&remote), quote(&branch));
        let tmp = temp_branch();
        Ok(script(&[
            format!("git fetch {remote}"),
            format!("git branch -D {tmp} || true"),
            format!("git checkout -b {tmp}"),
            format!("git branch -D {branch} || true"),
            format!("git checkout --track {remote}/{branch}"),
            format!("git branch -D {tmp} || true"),
        ]))
    }
}

#[derive(FromArgs)]
/// interactively rebase onto a remote branch.
pub struct Squash {
    #[argh(positional)]
    /// optional remote, then branch; defaults to origin main.
    pub refs: Vec<String>,
}

impl Command for Squash {
    fn name() -> &'static str {
        "gsquash"
    }

    fn info() -> &'static str {
        "Performs a Git squash operation to combine multiple commits into one."
    }

    fn usage() -> &'static str {
        "ikein gsquash [remote] [branch]"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        let (remote, branch) = remote_and_branch(Self::name(), &self.refs)?;
        let (remote, branch) = (quote(&remote), quote(&branch));
        Ok(script(&[
            format!("git fetch {remote}"),
            format!("git rebase -i {remote}/{branch}"),
        ]))
    }
}

#[derive(FromArgs)]
/// discard local changes.
pub struct Undo {
    #[argh(positional)]
    /// files to restore; everything when omitted.
    pub files: Vec<String>,
}

impl Command for Undo {
    fn name() -> &'static str {
        "gundo"
    }

    fn info() -> &'static str {
        "Undoes changes made to the specified files in the repository."
    }

    fn usage() -> &'static str {
        "ikein gundo [files]"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        if self.files.is_empty() {
            return Ok(Output::Executable("git checkout -- .".to_string()));
        }
        let files: Vec<String> = self.files.iter().map(|f| quote(f).into_owned()).collect();
        Ok(Output::Executable(format!("git checkout -- {}", files.join(" "))))
    }
}

#[derive(FromArgs)]
/// delete every local branch but the current one.
pub struct DeleteLocalBranches {}

impl Command for DeleteLocalBranches {
    fn name() -> &'static str {
        "gbclean"
    }

    fn info() -> &'static str {
        "Delete all local branches except the current one."
    }

    fn usage() -> &'static str {
        "ikein gbclean"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        Ok(script(&[
            CURRENT_BRANCH.to_string(),
            "git for-each-ref --format='%(refname:short)' refs/heads | while read -r __ikein_b; do".to_string(),
            r#"  [ "$__ikein_b" = "$__ikein_branch" ] || git branch -D "$__ikein_b""#.to_string(),
            "done".to_string(),
            UNSET.to_string(),
        ]))
    }
}

#[derive(FromArgs)]
/// show the commit graph.
pub struct Tree {}

impl Command for Tree {
    fn name() -> &'static str {
        "gtree"
    }

    fn info() -> &'static str {
        "Display the Git commit tree."
    }

    fn usage() -> &'static str {
        "ikein gtree"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        Ok(Output::Executable(TREE.to_string()))
    }
}

#[derive(FromArgs)]
/// remove untracked files and directories.
pub struct CleanUntracked {}

impl Command for CleanUntracked {
    fn name() -> &'static str {
        "gcache"
    }

    fn info() -> &'static str {
        "Remove all untracked files and directories from the working directory in Git."
    }

    fn usage() -> &'static str {
        "ikein gcache"
    }

    fn execute(self, _scope: Scope<'_>, env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        let question = "Warning: This action will permanently delete all untracked files and directories. \
                        This cannot be undone. Do you want to proceed?";
        if env.prompt.confirm(question)? {
            Ok(Output::Executable("git clean -dfx".to_string()))
        } else {
            Ok(notice("Operation canceled: No changes were made."))
        }
    }
}

#[derive(FromArgs)]
/// ignore local changes to a tracked file.
pub struct Lock {
    #[argh(positional)]
    /// the tracked file.
    pub file: String,
}

impl Command for Lock {
    fn name() -> &'static str {
        "glock"
    }

    fn info() -> &'static str {
        "Temporarily ignore local changes to a tracked file without modifying .gitignore."
    }

    fn usage() -> &'static str {
        "ikein glock <file>"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        Ok(Output::Executable(format!(
            "git update-index --assume-unchanged {}",
            quote(&self.file)
        )))
    }
}

#[derive(FromArgs)]
/// reset the current branch to its remote state.
pub struct UpdateBranch {
    #[argh(positional)]
    /// remote to update from, defaults to origin.
    pub remote: Option<String>,
}

impl Command for UpdateBranch {
    fn name() -> &'static str {
        "gupdate"
    }

    fn info() -> &'static str {
        "Update the current branch with the latest changes from the specified remote."
    }

    fn usage() -> &'static str {
        "ikein gupdate [remote]"
    }

    fn execute(self, _scope: Scope<'_>, _env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        let remote = self.remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string());
        let remote = quote(&remote);
        let tmp = temp_branch();
        Ok(script(&[
            CURRENT_BRANCH.to_string(),
            r#"if [ -z "$__ikein_branch" ]; then"#.to_string(),
            format!("  {}", echo("Not on a branch.")),
            "else".to_string(),
            format!("  git fetch {remote}"),
            format!("  git checkout -b {tmp}"),
            r#"  git branch -D "$__ikein_branch""#.to_string(),
            format!(r#"  git checkout --track {remote}/"$__ikein_branch""#),
            format!("  git branch -D {tmp}"),
            "fi".to_string(),
            UNSET.to_string(),
        ]))
    }
}

#[derive(FromArgs)]
/// switch the repository's git identity.
pub struct SwitchUser {
    #[argh(positional)]
    /// profile name from the configuration.
    pub profile: Option<String>,
}

impl Command for SwitchUser {
    fn name() -> &'static str {
        "guser"
    }

    fn info() -> &'static str {
        "Update the Git user configuration (name and email) with the specified profile."
    }

    fn usage() -> &'static str {
        "ikein guser [profile]"
    }

    fn execute(self, _scope: Scope<'_>, env: &mut Environment, _stdout: &mut dyn Write) -> Result<Output> {
        let section: GitSection = env.config.section(SECTION)?;
        match self.profile.as_ref().and_then(|p| section.profiles.get(p)) {
            Some(user) => Ok(script(&[
                format!("git config user.email {}", quote(&user.email)),
                format!("git config user.name {}", quote(&user.name)),
                echo(&format!("New user: {} ({})", user.name, user.email)),
            ])),
            None => {
                let available: Vec<&str> = section.profiles.keys().map(String::as_str).collect();
                Ok(notice(format!(
                    "Profile not found. Available profiles: {}",
                    available.join(", ")
                )))
            }
        }
    }
}

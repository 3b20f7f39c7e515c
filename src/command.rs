use crate::env::Environment;
use crate::error::DispatchError;
use crate::registry::Catalog;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::Write;
use std::marker::PhantomData;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Name printed before the usage line of every command's `--help`.
pub const PROGRAM: &str = "ikein";

/// What a command hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Shell text the wrapper should run in the caller's shell.
    Executable(String),
    /// Text meant to be read, never executed.
    Message(String),
}

impl Output {
    /// The text carried by either variant.
    pub fn text(&self) -> &str {
        match self {
            Output::Executable(text) | Output::Message(text) => text,
        }
    }
}

/// The `{name, info, usage}` triple shown by `list` and `usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Name the command is invoked by.
    pub name: &'static str,
    /// One-line description.
    pub info: &'static str,
    /// Synopsis, e.g. `ikein goto <alias>`.
    pub usage: &'static str,
}

/// Which lookup tier resolved the command being executed.
///
/// Core commands are handed the catalog of every registered command; plugin
/// commands are not.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Resolved from the core module; carries every registered module.
    Core(&'a Catalog),
    /// Resolved from the full command map.
    Plugin,
}

impl<'a> Scope<'a> {
    /// The catalog, when running as a core command.
    pub fn catalog(&self) -> Result<&'a Catalog> {
        match self {
            Scope::Core(catalog) => Ok(catalog),
            Scope::Plugin => Err(anyhow::anyhow!(
                "the command catalog is only available to core commands"
            )),
        }
    }
}

/// A command known at compile time.
///
/// The argument schema is the `argh` derive on the implementing struct: arguments are
/// parsed and validated once, before [`Command::execute`] runs.
pub trait Command: Sized + FromArgs {
    /// Name the command is invoked by, e.g. "goto".
    fn name() -> &'static str;

    /// One-line description shown by `list`.
    fn info() -> &'static str;

    /// Synopsis shown by `usage`.
    fn usage() -> &'static str;

    /// Runs the command.
    ///
    /// Progress notices may be written to `stdout`; the returned [`Output`] is
    /// rendered by the dispatcher after the command returns.
    fn execute(
        self,
        scope: Scope<'_>,
        env: &mut Environment,
        stdout: &mut dyn Write,
    ) -> Result<Output>;
}

/// Object-safe view of a parsed command, ready to run.
pub trait ExecutableCommand {
    /// Runs the command, consuming it.
    fn execute(
        self: Box<Self>,
        scope: Scope<'_>,
        env: &mut Environment,
        stdout: &mut dyn Write,
    ) -> Result<Output>;
}

impl<T: Command> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        scope: Scope<'_>,
        env: &mut Environment,
        stdout: &mut dyn Write,
    ) -> Result<Output> {
        <T as Command>::execute(*self, scope, env, stdout)
    }
}

/// Factory that describes a command and builds it from raw arguments.
pub trait CommandFactory {
    /// Name, info and usage of the command this factory builds.
    fn descriptor(&self) -> Descriptor;

    /// Validate `args` against the command's schema.
    ///
    /// `--help` is not an error: it yields a command that prints the generated help.
    fn create(&self, args: &[&str]) -> Result<Box<dyn ExecutableCommand>, DispatchError>;
}

/// [`CommandFactory`] for any [`Command`] type.
pub struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

/// Help text produced by `--help`.
struct Help {
    output: String,
}

impl ExecutableCommand for Help {
    fn execute(
        self: Box<Self>,
        _scope: Scope<'_>,
        _env: &mut Environment,
        _stdout: &mut dyn Write,
    ) -> Result<Output> {
        Ok(Output::Message(self.output.trim_end().to_string()))
    }
}

impl<T: Command + 'static> CommandFactory for Factory<T> {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            name: T::name(),
            info: T::info(),
            usage: T::usage(),
        }
    }

    fn create(&self, args: &[&str]) -> Result<Box<dyn ExecutableCommand>, DispatchError> {
        match T::from_args(&[PROGRAM, T::name()], args) {
            Ok(cmd) => Ok(Box::new(cmd)),
            Err(EarlyExit { output, status }) => match status {
                Ok(()) => Ok(Box::new(Help { output })),
                Err(()) => Err(DispatchError::InvalidArgs {
                    command: T::name().to_string(),
                    message: output.trim_end().to_string(),
                }),
            },
        }
    }
}

/// Usage error raised from inside a command body, after the schema itself accepted
/// the arguments (e.g. two mutually exclusive modes were given).
pub fn invalid_args(command: &str, message: impl Into<String>) -> anyhow::Error {
    DispatchError::InvalidArgs {
        command: command.to_string(),
        message: message.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Environment, FixedAnswer};
    use tempfile::TempDir;

    #[derive(FromArgs)]
    /// shout a word back.
    struct Shout {
        #[argh(positional)]
        /// the word to repeat.
        word: String,

        #[argh(switch, short = 't')]
        /// repeat it twice.
        twice: bool,
    }

    impl Command for Shout {
        fn name() -> &'static str {
            "shout"
        }

        fn info() -> &'static str {
            "Shouts a word."
        }

        fn usage() -> &'static str {
            "ikein shout <word> [-t]"
        }

        fn execute(
            self,
            _scope: Scope<'_>,
            _env: &mut Environment,
            _stdout: &mut dyn Write,
        ) -> Result<Output> {
            let word = self.word.to_uppercase();
            Ok(Output::Executable(if self.twice {
                format!("echo {word} {word}")
            } else {
                format!("echo {word}")
            }))
        }
    }

    fn env_in(dir: &TempDir) -> Environment {
        Environment::with_root(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
            Box::new(FixedAnswer(false)),
        )
    }

    #[test]
    fn test_factory_descriptor() {
        let factory = Factory::<Shout>::default();
        let d = factory.descriptor();
        assert_eq!(d.name, "shout");
        assert_eq!(d.info, "Shouts a word.");
        assert_eq!(d.usage, "ikein shout <word> [-t]");
    }

    #[test]
    fn test_factory_parses_and_executes() {
        let dir = TempDir::new().unwrap();
        let mut env = env_in(&dir);
        let cmd = Factory::<Shout>::default().create(&["hey", "-t"]).unwrap();
        let out = cmd.execute(Scope::Plugin, &mut env, &mut Vec::new()).unwrap();
        assert_eq!(out, Output::Executable("echo HEY HEY".to_string()));
    }

    #[test]
    fn test_factory_rejects_missing_positional() {
        let err = Factory::<Shout>::default().create(&[]).err().unwrap();
        match err {
            DispatchError::InvalidArgs { command, message } => {
                assert_eq!(command, "shout");
                assert!(message.contains("word"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_factory_rejects_unknown_flag() {
        let err = Factory::<Shout>::default().create(&["hey", "--loud"]).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_factory_help_is_a_message() {
        let dir = TempDir::new().unwrap();
        let mut env = env_in(&dir);
        let cmd = Factory::<Shout>::default().create(&["--help"]).unwrap();
        let out = cmd.execute(Scope::Plugin, &mut env, &mut Vec::new()).unwrap();
        match out {
            Output::Message(text) => assert!(text.contains("Usage: ikein shout")),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_plugin_scope_has_no_catalog() {
        assert!(Scope::Plugin.catalog().is_err());
        let catalog = Catalog::default();
        assert!(Scope::Core(&catalog).catalog().is_ok());
    }
}

use crate::command::{ExitCode, Output, Scope};
use crate::env::Environment;
use crate::error::DispatchError;
use crate::registry::Registry;
use std::io::Write;
use tracing::{debug, error};

/// Line that opens the payload the shell wrapper should run.
pub const START_SENTINEL: &str = "<<START_COMMAND>>";
/// Line that closes it.
pub const END_SENTINEL: &str = "<<END_COMMAND>>";
/// Command run when none is given.
pub const DEFAULT_COMMAND: &str = "list";

/// Resolves a command name against a [`Registry`] and renders the result.
///
/// Example
/// ```
/// use ikein::env::FixedAnswer;
/// use ikein::{Dispatcher, Environment, Registry};
///
/// let root = tempfile::tempdir().unwrap();
/// let mut env = Environment::with_root(
///     root.path().to_path_buf(),
///     root.path().to_path_buf(),
///     Box::new(FixedAnswer(false)),
/// );
/// let registry = Registry::discover(ikein::core_module(), Vec::new()).unwrap();
///
/// let mut out = Vec::new();
/// let argv = vec!["ikein".to_string(), "config".to_string()];
/// let code = Dispatcher::new(&registry).run(&argv, &mut env, &mut out);
/// assert_eq!(code, 0);
/// assert!(String::from_utf8(out).unwrap().starts_with("<<START_COMMAND>>\n"));
/// ```
pub struct Dispatcher<'a> {
    registry: &'a Registry,
}

impl<'a> Dispatcher<'a> {
    /// A dispatcher over `registry`.
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Look `name` up (core commands first, then every command) and run it with `args`.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[&str],
        env: &mut Environment,
        stdout: &mut dyn Write,
    ) -> Result<Output, DispatchError> {
        let (factory, scope) = if let Some(factory) = self.registry.builtin(name) {
            (factory, Scope::Core(self.registry.catalog()))
        } else if let Some(factory) = self.registry.command(name) {
            (factory, Scope::Plugin)
        } else {
            return Err(DispatchError::NotFound(name.to_string()));
        };

        debug!(command = name, args = ?args, core = matches!(scope, Scope::Core(_)), "dispatching");
        let command = factory.create(args)?;
        command
            .execute(scope, env, stdout)
            .map_err(DispatchError::from_command)
    }

    /// Run one process invocation: `argv[0]` is the program, `argv[1]` the command
    /// (default `list`), the rest its arguments.
    pub fn run(&self, argv: &[String], env: &mut Environment, stdout: &mut dyn Write) -> ExitCode {
        let name = argv.get(1).map(String::as_str).unwrap_or(DEFAULT_COMMAND);
        let args: Vec<&str> = argv.iter().skip(2).map(String::as_str).collect();

        let result = self.dispatch(name, &args, env, stdout);
        match render(&result, stdout) {
            Ok(()) => match result {
                Ok(_) => 0,
                Err(e) => e.exit_code(),
            },
            Err(e) => {
                error!(error = %e, "failed to write output");
                1
            }
        }
    }
}

/// Write a dispatch result in the form the shell wrapper expects.
///
/// Only executable output is framed by the sentinels; messages and errors are plain
/// lines the wrapper shows but never runs.
pub fn render(result: &Result<Output, DispatchError>, stdout: &mut dyn Write) -> std::io::Result<()> {
    match result {
        Ok(Output::Executable(payload)) => {
            writeln!(stdout, "{START_SENTINEL}")?;
            writeln!(stdout, "{payload}")?;
            writeln!(stdout, "{END_SENTINEL}")?;
        }
        Ok(Output::Message(text)) => {
            if !text.is_empty() {
                writeln!(stdout, "{text}")?;
            }
        }
        Err(e) => writeln!(stdout, "error: {e}")?,
    }
    stdout.flush()
}

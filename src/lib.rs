//! A personal command-line alias manager.
//!
//! `ikein` turns a command name plus arguments into a line of shell text. It never
//! runs that text itself: a small shell function installed by `ikein install` reads
//! the framed payload from stdout and `eval`s it, so commands such as `goto` can
//! change the directory of the calling shell.
//!
//! Commands live in [`registry::Module`]s. The core module (`list`, `usage`,
//! `config`, `install`) is always present; plugins (`echo`, `git`, `goto`, `run`)
//! are registered from a static table in [`plugins`]. The [`Dispatcher`] looks a
//! name up in the core tier first and in the full command map second.

mod builtin;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod env;
pub mod error;
pub mod install;
pub mod plugins;
pub mod registry;
pub mod shell;

pub use dispatcher::Dispatcher;
pub use env::Environment;
pub use registry::Registry;

/// The always-present core module.
pub fn core_module() -> registry::Module {
    builtin::module()
}

/// Build the registry for one invocation: the core module plus every plugin the
/// configuration does not disable.
pub fn bootstrap(env: &Environment) -> anyhow::Result<Registry> {
    let settings: plugins::PluginSettings = env.config.section(plugins::SECTION)?;
    let registry = Registry::discover(core_module(), plugins::load(&settings))?;
    Ok(registry)
}

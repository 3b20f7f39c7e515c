use crate::command::{Command, CommandFactory, Descriptor, Factory};
use crate::error::RegistryError;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// A named group of commands, e.g. the core module or the `git` plugin.
pub struct Module {
    name: &'static str,
    commands: Vec<Rc<dyn CommandFactory>>,
}

impl Module {
    /// An empty module called `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            commands: Vec::new(),
        }
    }

    /// Register a command type in this module.
    pub fn command<T: Command + 'static>(mut self) -> Self {
        self.commands.push(Rc::new(Factory::<T>::default()));
        self
    }

    /// Module name, as shown by `list`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Descriptors of the registered commands, in registration order.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        self.commands.iter().map(|c| c.descriptor()).collect()
    }
}

/// The commands of one module, as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name.
    pub name: &'static str,
    /// Its commands, in registration order.
    pub commands: Vec<Descriptor>,
}

/// Module name to its command descriptors, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    modules: Vec<ModuleInfo>,
}

impl Catalog {
    /// Every module, core first.
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// The module called `name`, if registered.
    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Every module that has a command called `command`, with its descriptor.
    pub fn find(&self, command: &str) -> Vec<(&'static str, Descriptor)> {
        self.modules
            .iter()
            .flat_map(|m| m.commands.iter().map(move |d| (m.name, *d)))
            .filter(|(_, d)| d.name == command)
            .collect()
    }
}

/// The commands available to one invocation.
///
/// Built fresh at every start: a catalog for listing, the core commands alone, and
/// the flat map of every command (core included).
pub struct Registry {
    catalog: Catalog,
    builtins: BTreeMap<&'static str, Rc<dyn CommandFactory>>,
    methods: BTreeMap<&'static str, Rc<dyn CommandFactory>>,
}

impl Registry {
    /// Assemble the registry from the core module and the plugin modules.
    ///
    /// Fails on the first duplicate module or command name; nothing of a failed
    /// discovery is kept.
    pub fn discover(
        core: Module,
        plugins: impl IntoIterator<Item = Module>,
    ) -> Result<Self, RegistryError> {
        let mut catalog = Catalog::default();
        let mut builtins = BTreeMap::new();
        let mut methods: BTreeMap<&'static str, Rc<dyn CommandFactory>> = BTreeMap::new();
        let mut owners: BTreeMap<&'static str, &'static str> = BTreeMap::new();

        for factory in &core.commands {
            builtins.insert(factory.descriptor().name, Rc::clone(factory));
        }

        for module in std::iter::once(core).chain(plugins) {
            if catalog.module(module.name).is_some() {
                return Err(RegistryError::DuplicateModule(module.name.to_string()));
            }
            let mut descriptors = Vec::with_capacity(module.commands.len());
            for factory in module.commands {
                let descriptor = factory.descriptor();
                if let Some(first) = owners.insert(descriptor.name, module.name) {
                    return Err(RegistryError::DuplicateCommand {
                        command: descriptor.name.to_string(),
                        first: first.to_string(),
                        second: module.name.to_string(),
                    });
                }
                debug!(module = module.name, command = descriptor.name, "registering command");
                methods.insert(descriptor.name, factory);
                descriptors.push(descriptor);
            }
            catalog.modules.push(ModuleInfo {
                name: module.name,
                commands: descriptors,
            });
        }

        Ok(Self {
            catalog,
            builtins,
            methods,
        })
    }

    /// Module name to command descriptors, for `list` and `usage`.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// A core command by name. Plugin commands are never returned here.
    pub fn builtin(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.builtins.get(name).map(|f| f.as_ref())
    }

    /// Any registered command by name, core commands included.
    pub fn command(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.methods.get(name).map(|f| f.as_ref())
    }

    /// Names of the core commands, sorted.
    pub fn builtin_names(&self) -> Vec<&'static str> {
        self.builtins.keys().copied().collect()
    }

    /// Names of every registered command, sorted.
    pub fn command_names(&self) -> Vec<&'static str> {
        self.methods.keys().copied().collect()
    }
}

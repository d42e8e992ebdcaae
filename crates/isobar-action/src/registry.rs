//! The stage registry: stage-type names mapped to builders.
//!
//! Pipeline topology is data-driven: a plan's configuration names stage
//! types, and the registry turns each name into a constructed [`Action`].
//! Registration, deregistration and building are serialized by one
//! re-entrant critical section, so a builder may build its own successor
//! through the same registry without deadlocking.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use indexmap::IndexMap;
use isobar_core::Configuration;

use crate::action::Action;
use crate::error::ActionError;
use crate::lock::ReentrantLock;

/// Constructs a stage from its configuration block.
///
/// Implemented for every closure of the matching shape, so most builders
/// are plain closures capturing whatever shared services the stage needs.
pub trait ActionBuilder: Send + Sync {
    /// Build one stage. `registry` is the registry performing the build,
    /// used to resolve the stage's successor.
    fn build(
        &self,
        config: &Configuration,
        registry: &ActionRegistry,
    ) -> Result<Box<dyn Action>, ActionError>;
}

impl<F> ActionBuilder for F
where
    F: Fn(&Configuration, &ActionRegistry) -> Result<Box<dyn Action>, ActionError> + Send + Sync,
{
    fn build(
        &self,
        config: &Configuration,
        registry: &ActionRegistry,
    ) -> Result<Box<dyn Action>, ActionError> {
        self(config, registry)
    }
}

/// Name → builder table with a re-entrant critical section.
#[derive(Default)]
pub struct ActionRegistry {
    section: ReentrantLock,
    /// Held only for table reads and writes, never while a builder runs.
    builders: Mutex<IndexMap<String, Arc<dyn ActionBuilder>>>,
}

impl ActionRegistry {
    /// An empty registry, independent of the process-wide one.
    pub fn new() -> Self {
        Self {
            section: ReentrantLock::new(),
            builders: Mutex::new(IndexMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static ActionRegistry {
        static GLOBAL: OnceLock<ActionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ActionRegistry::new)
    }

    /// Register `builder` under `name`.
    ///
    /// The returned guard unregisters the name when dropped. Fails with
    /// [`ActionError::DuplicateAction`] if the name is taken, leaving the
    /// existing registration untouched.
    pub fn register(
        &self,
        name: impl Into<String>,
        builder: impl ActionBuilder + 'static,
    ) -> Result<Registration<'_>, ActionError> {
        let name = name.into();
        let _section = self.section.lock();
        let mut table = self.table();
        if table.contains_key(&name) {
            return Err(ActionError::DuplicateAction { name });
        }
        table.insert(name.clone(), Arc::new(builder));
        tracing::debug!(action = %name, "registered action builder");
        Ok(Registration {
            registry: self,
            name,
        })
    }

    /// Remove the builder registered under `name`.
    pub fn unregister(&self, name: &str) -> Result<(), ActionError> {
        let _section = self.section.lock();
        match self.table().shift_remove(name) {
            Some(_) => {
                tracing::debug!(action = name, "unregistered action builder");
                Ok(())
            }
            None => Err(ActionError::NotRegistered {
                name: name.to_string(),
            }),
        }
    }

    /// Build the stage registered under `name` from `config`.
    ///
    /// An unknown name is logged together with every registered name and
    /// fails with [`ActionError::UnknownAction`].
    pub fn build(&self, name: &str, config: &Configuration) -> Result<Box<dyn Action>, ActionError> {
        let _section = self.section.lock();
        let builder = self.table().get(name).cloned();
        match builder {
            Some(builder) => {
                tracing::debug!(action = name, depth = self.section.depth(), "building action");
                builder.build(config, self)
            }
            None => {
                let available = self.names();
                tracing::error!(
                    action = name,
                    available = %available.join(", "),
                    "no builder registered for action"
                );
                Err(ActionError::UnknownAction {
                    name: name.to_string(),
                    available,
                })
            }
        }
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        let _section = self.section.lock();
        self.table().contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        let _section = self.section.lock();
        self.table().keys().cloned().collect()
    }

    fn table(&self) -> MutexGuard<'_, IndexMap<String, Arc<dyn ActionBuilder>>> {
        self.builders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Keeps a builder registered for as long as it lives.
#[must_use = "dropping a Registration unregisters the builder immediately"]
#[derive(Debug)]
pub struct Registration<'a> {
    registry: &'a ActionRegistry,
    name: String,
}

impl Registration<'_> {
    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.registry.unregister(&self.name) {
            tracing::warn!(action = %self.name, %err, "builder was already unregistered");
        }
    }
}

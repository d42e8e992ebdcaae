//! Plans and the dispatcher.
//!
//! A [`Plan`] owns one fully built action chain and is its single entry
//! point. A [`Dispatcher`] owns every plan of a server configuration and
//! delivers each incoming message to all of them.

use std::sync::{Mutex, PoisonError};

use isobar_core::{ConfigError, Configuration, Message};

use crate::action::{stage_names, Action};
use crate::error::ActionError;
use crate::registry::ActionRegistry;

/// Configuration key holding a plan's root stage block.
pub const ACTIONS_KEY: &str = "actions";

/// Configuration key holding the list of plans of a server.
pub const PLANS_KEY: &str = "plans";

/// Name given to plans whose configuration has none.
pub const DEFAULT_PLAN_NAME: &str = "anonymous";

/// One configured action chain.
///
/// The chain is built once and never re-linked. Messages delivered from
/// several threads are processed one at a time, each to completion on
/// the calling thread.
pub struct Plan {
    name: String,
    root: Mutex<Box<dyn Action>>,
}

impl Plan {
    /// Build a plan from `{ "name": ..., "actions": { "type": ..., ... } }`.
    pub fn new(config: &Configuration, registry: &ActionRegistry) -> Result<Self, ActionError> {
        let name = config.get_str_or("name", DEFAULT_PLAN_NAME)?.to_string();
        let actions = config
            .sub(ACTIONS_KEY)?
            .ok_or_else(|| ConfigError::MissingKey {
                key: ACTIONS_KEY.to_string(),
            })?;
        let root = registry.build(actions.action_type()?, &actions)?;
        tracing::info!(
            plan = %name,
            stages = %stage_names(root.as_ref()).join(" -> "),
            "plan created"
        );
        Ok(Self::from_root(name, root))
    }

    /// Wrap an already-built chain.
    pub fn from_root(name: impl Into<String>, root: Box<dyn Action>) -> Self {
        Self {
            name: name.into(),
            root: Mutex::new(root),
        }
    }

    /// The plan's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the chain's stages, outermost first.
    pub fn stage_names(&self) -> Vec<String> {
        let root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        stage_names(root.as_ref())
    }

    /// Deliver `msg` to the root stage.
    ///
    /// Any stage failure is returned as-is; the plan performs no recovery.
    pub fn process(&self, msg: Message) -> Result<(), ActionError> {
        let mut root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        root.execute(msg)
    }
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Fans every message out to the plans of one server configuration.
#[derive(Debug, Default)]
pub struct Dispatcher {
    plans: Vec<Plan>,
}

impl Dispatcher {
    /// Build every plan listed under `plans`.
    pub fn new(config: &Configuration, registry: &ActionRegistry) -> Result<Self, ActionError> {
        let plans = config
            .sub_list(PLANS_KEY)?
            .iter()
            .map(|plan| Plan::new(plan, registry))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(plans = plans.len(), "dispatcher ready");
        Ok(Self { plans })
    }

    /// Wrap already-built plans.
    pub fn from_plans(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// The plans, in configuration order.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Deliver `msg` to every plan in order, stopping at the first failure.
    pub fn dispatch(&self, msg: Message) -> Result<(), ActionError> {
        for plan in &self.plans {
            plan.process(msg.clone())?;
        }
        Ok(())
    }
}

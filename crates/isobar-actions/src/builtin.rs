//! Startup registration of the built-in stages.

use isobar_action::{Action, ActionError, ActionRegistry, Registration};
use isobar_core::Configuration;

use crate::context::PipelineContext;
use crate::encode::Encode;
use crate::print::Print;
use crate::select::Select;
use crate::sink::Sink;
use crate::statistics::Statistics;
use crate::{encode, print, select, sink, statistics};

/// Names of every built-in stage, in registration order.
pub const BUILTIN_NAMES: [&str; 5] = [
    print::NAME,
    select::NAME,
    statistics::NAME,
    encode::NAME,
    sink::NAME,
];

/// Holds the registrations of the built-in stages.
///
/// Dropping it unregisters every built-in stage.
#[derive(Debug)]
pub struct BuiltinActions<'a> {
    registrations: Vec<Registration<'a>>,
}

impl<'a> BuiltinActions<'a> {
    /// Register every built-in stage in `registry`, sharing `ctx`.
    ///
    /// Fails if any of the names is already registered, in which case the
    /// stages registered so far are removed again.
    pub fn register(registry: &'a ActionRegistry, ctx: PipelineContext) -> Result<Self, ActionError> {
        let mut registrations = Vec::with_capacity(BUILTIN_NAMES.len());

        registrations.push(registry.register(
            print::NAME,
            |config: &Configuration, registry: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
                Ok(Box::new(Print::from_config(config, registry)?))
            },
        )?);

        registrations.push(registry.register(
            select::NAME,
            |config: &Configuration, registry: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
                Ok(Box::new(Select::from_config(config, registry)?))
            },
        )?);

        registrations.push(registry.register(
            statistics::NAME,
            |config: &Configuration, registry: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
                Ok(Box::new(Statistics::from_config(config, registry)?))
            },
        )?);

        let (grids, codecs) = (ctx.grids.clone(), ctx.codecs.clone());
        registrations.push(registry.register(
            encode::NAME,
            move |config: &Configuration, registry: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
                Ok(Box::new(Encode::from_config(
                    config,
                    registry,
                    grids.clone(),
                    codecs.clone(),
                )?))
            },
        )?);

        let sinks = ctx.sinks;
        registrations.push(registry.register(
            sink::NAME,
            move |config: &Configuration, _: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
                Ok(Box::new(Sink::from_config(config, sinks.as_ref())?))
            },
        )?);

        tracing::info!(stages = %BUILTIN_NAMES.join(", "), "registered built-in stages");
        Ok(Self { registrations })
    }

    /// The registered names.
    pub fn names(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_unregisters_all() {
        let registry = ActionRegistry::new();
        {
            let builtins = BuiltinActions::register(&registry, PipelineContext::default()).unwrap();
            assert_eq!(builtins.names(), BUILTIN_NAMES.to_vec());
            assert_eq!(registry.names(), BUILTIN_NAMES.to_vec());
        }
        assert!(registry.names().is_empty());
    }

    #[test]
    fn clash_rolls_back_partial_registration() {
        let registry = ActionRegistry::new();
        let _taken = registry
            .register(
                encode::NAME,
                |_: &Configuration, _: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
                    Err(ActionError::stage("placeholder", "unused"))
                },
            )
            .unwrap();
        let err = BuiltinActions::register(&registry, PipelineContext::default()).unwrap_err();
        assert!(matches!(err, ActionError::DuplicateAction { ref name } if name == encode::NAME));
        assert_eq!(registry.names(), vec![encode::NAME]);
    }
}

//! Folds fields into calendar-windowed statistics.
//!
//! Raw fields are consumed: nothing is forwarded until a window completes,
//! at which point one field per operation goes downstream. `Close`
//! flushes the partial window before being forwarded itself. Coordinates
//! and other messages pass through untouched.
//!
//! # Configuration
//!
//! ```json
//! { "type": "statistics", "period": "monthly", "operations": ["average", "maximum"] }
//! ```

use isobar_action::{Action, ActionError, ActionRegistry, Successor};
use isobar_core::{Configuration, Message, Tag};
use isobar_stats::{
    parse_operations, Operations, Period, StatisticsError, StatisticsOutput, TemporalStatistics,
};

/// Registered stage name.
pub const NAME: &str = "statistics";

/// Window kind used when none is configured.
pub const DEFAULT_PERIOD: &str = "monthly";

/// Temporal statistics stage.
#[derive(Debug)]
pub struct Statistics {
    period: Period,
    operations: Operations,
    /// Created from the first field, whose size fixes the buffers.
    window: Option<Box<dyn TemporalStatistics>>,
    next: Successor,
}

impl Statistics {
    /// Build from configuration.
    pub fn from_config(config: &Configuration, registry: &ActionRegistry) -> Result<Self, ActionError> {
        let period = config
            .get_str_or("period", DEFAULT_PERIOD)?
            .parse::<Period>()
            .map_err(|e| ActionError::stage(NAME, e))?;
        let operations = parse_operations(&config.get_str_list("operations")?)
            .map_err(|e| ActionError::stage(NAME, e))?;
        tracing::info!(?period, ?operations, "statistics stage configured");
        Ok(Self {
            period,
            operations,
            window: None,
            next: Successor::from_config(config, registry)?,
        })
    }

    /// Fields folded into the current window.
    pub fn count(&self) -> u64 {
        self.window.as_ref().map_or(0, |w| w.count())
    }

    fn emit(&mut self, outputs: Vec<StatisticsOutput>) -> Result<(), ActionError> {
        for output in outputs {
            self.next.forward(output.into_message())?;
        }
        Ok(())
    }

    fn fold(&mut self, msg: &Message) -> Result<Vec<StatisticsOutput>, ActionError> {
        let window = match self.window.take() {
            Some(window) => window,
            None => {
                let size = msg.global_size()?;
                if msg.payload().value_count() != size {
                    return Err(ActionError::stage(
                        NAME,
                        StatisticsError::SizeMismatch {
                            expected: size,
                            found: msg.payload().value_count(),
                        },
                    ));
                }
                self.period.create(&self.operations, size)
            }
        };
        self.window
            .insert(window)
            .process_next(msg)
            .map_err(|e| ActionError::stage(NAME, e))
    }
}

impl Action for Statistics {
    fn name(&self) -> &str {
        NAME
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        match msg.tag() {
            Tag::Field => {
                let outputs = self.fold(&msg)?;
                self.emit(outputs)
            }
            Tag::Close => {
                let outputs = self.window.as_mut().map(|w| w.flush()).unwrap_or_default();
                self.emit(outputs)?;
                self.next.forward(msg)
            }
            _ => self.next.forward(msg),
        }
    }

    fn next(&self) -> Option<&dyn Action> {
        self.next.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isobar_core::GridSubtype;
    use isobar_test_utils::{field_at_step, field_message};

    fn stage(json: &str) -> Statistics {
        let registry = ActionRegistry::new();
        Statistics::from_config(&Configuration::from_json(json).unwrap(), &registry).unwrap()
    }

    #[test]
    fn window_created_from_first_field() {
        let mut s = stage(r#"{"type": "statistics", "operations": ["accumulate"]}"#);
        assert_eq!(s.count(), 0);
        s.execute(field_at_step(GridSubtype::T, 20200101, 1, &[1.0, 2.0]))
            .unwrap();
        s.execute(field_at_step(GridSubtype::T, 20200102, 2, &[1.0, 2.0]))
            .unwrap();
        assert_eq!(s.count(), 2);
        s.execute(Message::control(Tag::Close)).unwrap();
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn size_change_is_a_stage_error() {
        let mut s = stage(r#"{"type": "statistics", "operations": ["maximum"]}"#);
        s.execute(field_message(GridSubtype::T, 20200101, &[1.0, 2.0]))
            .unwrap();
        let err = s
            .execute(field_message(GridSubtype::T, 20200101, &[1.0]))
            .unwrap_err();
        assert!(matches!(err, ActionError::Stage { ref stage, .. } if stage == NAME));
    }

    #[test]
    fn first_field_must_match_its_declared_size() {
        let mut s = stage(r#"{"type": "statistics", "operations": ["accumulate"]}"#);
        let md = field_message(GridSubtype::T, 20200101, &[1.0])
            .metadata()
            .clone()
            .with("globalSize", 1_i64 << 61);
        let err = s.execute(Message::field(md, &[1.0])).unwrap_err();
        match err {
            ActionError::Stage { stage, source } => {
                assert_eq!(stage, NAME);
                assert_eq!(
                    source.downcast_ref::<StatisticsError>(),
                    Some(&StatisticsError::SizeMismatch {
                        expected: 1 << 61,
                        found: 1
                    })
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(s.count(), 0);

        s.execute(field_message(GridSubtype::T, 20200101, &[1.0, 2.0]))
            .unwrap();
        assert_eq!(s.count(), 1);
    }

    #[test]
    fn bad_configuration_rejected() {
        let registry = ActionRegistry::new();
        for json in [
            r#"{"type": "statistics"}"#,
            r#"{"type": "statistics", "operations": ["median"]}"#,
            r#"{"type": "statistics", "period": "hourly", "operations": ["average"]}"#,
        ] {
            let config = Configuration::from_json(json).unwrap();
            assert!(Statistics::from_config(&config, &registry).is_err(), "{json}");
        }
    }
}

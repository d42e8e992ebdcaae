//! Forwards only the messages whose metadata matches a value list.

use isobar_action::{Action, ActionError, ActionRegistry, Successor};
use isobar_core::{Configuration, MetaValue, Message, Tag};

/// Registered stage name.
pub const NAME: &str = "select";

/// Metadata key compared when none is configured.
pub const DEFAULT_KEY: &str = "category";

/// Filtering stage.
///
/// Configuration: `key` (default `category`) and `match`, the accepted
/// values. Messages lacking the key are dropped. Control messages
/// (`StepComplete`, `Close`) always pass.
#[derive(Debug)]
pub struct Select {
    key: String,
    accepted: Vec<String>,
    next: Successor,
}

impl Select {
    /// Build from configuration.
    pub fn from_config(config: &Configuration, registry: &ActionRegistry) -> Result<Self, ActionError> {
        Ok(Self {
            key: config.get_str_or("key", DEFAULT_KEY)?.to_string(),
            accepted: config.get_str_list("match")?,
            next: Successor::from_config(config, registry)?,
        })
    }

    fn matches(&self, msg: &Message) -> bool {
        match msg.tag() {
            Tag::StepComplete | Tag::Close => true,
            _ => match msg.metadata().get(&self.key) {
                Some(MetaValue::Str(s)) => self.accepted.iter().any(|a| a == s),
                Some(MetaValue::Int(i)) => self.accepted.iter().any(|a| *a == i.to_string()),
                _ => false,
            },
        }
    }
}

impl Action for Select {
    fn name(&self) -> &str {
        NAME
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        if self.matches(&msg) {
            self.next.forward(msg)
        } else {
            Ok(())
        }
    }

    fn next(&self) -> Option<&dyn Action> {
        self.next.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isobar_core::{GridSubtype, Metadata};
    use isobar_test_utils::{coordinate_message, field_message};

    fn select(json: &str) -> Select {
        let registry = ActionRegistry::new();
        Select::from_config(&Configuration::from_json(json).unwrap(), &registry).unwrap()
    }

    #[test]
    fn matches_category_by_default() {
        let stage = select(r#"{"type": "select", "match": ["ocean-2d"]}"#);
        assert!(stage.matches(&field_message(GridSubtype::T, 20200101, &[0.0])));
        assert!(!stage.matches(&coordinate_message(GridSubtype::T, "lat_T", &[0.0])));
        assert!(stage.matches(&Message::control(Tag::Close)));
    }

    #[test]
    fn integer_values_compare_by_text() {
        let stage = select(r#"{"type": "select", "key": "param", "match": ["151130"]}"#);
        assert!(stage.matches(&field_message(GridSubtype::T, 20200101, &[0.0])));
        let other = Message::field(Metadata::new().with("param", 1_i64), &[]);
        assert!(!stage.matches(&other));
    }

    #[test]
    fn match_list_is_required() {
        let registry = ActionRegistry::new();
        let config = Configuration::from_json(r#"{"type": "select"}"#).unwrap();
        assert!(matches!(
            Select::from_config(&config, &registry),
            Err(ActionError::Config(_))
        ));
    }
}

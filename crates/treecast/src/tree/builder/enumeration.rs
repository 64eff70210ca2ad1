use serde_json::Value as JsonValue;
use treecast_core::{
    types::{EnumBacking, EnumCase, EnumType},
    value::{EnumValue, Value},
};

use super::scalar::as_int;
use crate::{
    config::CoercionConfig,
    error::ErrorKind,
    tree::{Failure, Shell, describe},
};

pub(crate) struct EnumNodeBuilder {
    coercion: CoercionConfig,
}

impl EnumNodeBuilder {
    pub(crate) fn new(coercion: CoercionConfig) -> Self {
        Self { coercion }
    }

    pub(super) fn build(&self, enumeration: &EnumType, shell: &Shell) -> Result<Value, Failure> {
        let input = shell.input().unwrap_or(&JsonValue::Null);

        match matching_case(enumeration, input, &self.coercion) {
            Some(case) => Ok(Value::Enum(EnumValue::new(
                enumeration.name(),
                case.name(),
                case.value().cloned(),
            ))),
            None => Err(Failure::message(
                ErrorKind::InvalidEnumValue,
                format!(
                    "value {} does not match any of {}",
                    describe(Some(input)),
                    accepted_values(enumeration)
                ),
            )),
        }
    }
}

/// The case selected by `input`: backed cases match their backing value,
/// pure cases their name.
pub(crate) fn matching_case<'a>(
    enumeration: &'a EnumType,
    input: &JsonValue,
    coercion: &CoercionConfig,
) -> Option<&'a EnumCase> {
    enumeration.cases().iter().find(|case| match case.value() {
        Some(EnumBacking::String(backing)) => input.as_str() == Some(backing.as_str()),
        Some(EnumBacking::Int(backing)) => as_int(input, coercion) == Some(*backing),
        None => input.as_str() == Some(case.name()),
    })
}

fn accepted_values(enumeration: &EnumType) -> String {
    enumeration
        .cases()
        .iter()
        .map(|case| match case.value() {
            Some(EnumBacking::Int(value)) => value.to_string(),
            Some(EnumBacking::String(value)) => format!("'{value}'"),
            None => format!("'{}'", case.name()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn priority() -> EnumType {
        EnumType::new(
            "Priority",
            vec![
                EnumCase::backed("Low", EnumBacking::Int(1)),
                EnumCase::backed("High", EnumBacking::Int(2)),
            ],
        )
    }

    #[test]
    fn test_backed_cases_match_their_value() {
        let table = CoercionConfig::default();

        assert_eq!(
            matching_case(&priority(), &json!(2), &table).map(EnumCase::name),
            Some("High")
        );
        assert_eq!(
            matching_case(&priority(), &json!("1"), &table).map(EnumCase::name),
            Some("Low")
        );
        assert!(matching_case(&priority(), &json!("High"), &table).is_none());
    }

    #[test]
    fn test_pure_cases_match_their_name() {
        let status = EnumType::new("Status", vec![EnumCase::pure("Open"), EnumCase::pure("Closed")]);

        assert_eq!(
            matching_case(&status, &json!("Closed"), &CoercionConfig::default()).map(EnumCase::name),
            Some("Closed")
        );
        assert_eq!(accepted_values(&status), "'Open', 'Closed'");
        assert_eq!(accepted_values(&priority()), "1, 2");
    }
}

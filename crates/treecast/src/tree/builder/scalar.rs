//! Scalar, `null` and `mixed` nodes, and the coercion table.

use serde_json::{Number, Value as JsonValue};
use treecast_core::{types::ScalarKind, value::Value};

use crate::{
    config::CoercionConfig,
    error::ErrorKind,
    tree::{Failure, Shell, describe},
};

pub(crate) struct ScalarNodeBuilder {
    coercion: CoercionConfig,
}

impl ScalarNodeBuilder {
    pub(crate) fn new(coercion: CoercionConfig) -> Self {
        Self { coercion }
    }

    pub(super) fn build(&self, kind: &ScalarKind, shell: &Shell) -> Result<Value, Failure> {
        let Some(input) = shell.input() else {
            return Err(Failure::message(ErrorKind::MissingValue, "value is missing"));
        };

        coerce(kind, input, &self.coercion).ok_or_else(|| {
            Failure::message(
                ErrorKind::InvalidScalarValue,
                format!("value {} is not a valid {kind}", describe(Some(input))),
            )
        })
    }

    /// Absent values and explicit `null` both map to [`Value::Null`].
    pub(super) fn build_null(shell: &Shell) -> Result<Value, Failure> {
        match shell.input() {
            None | Some(JsonValue::Null) => Ok(Value::Null),
            Some(other) => Err(Failure::message(
                ErrorKind::InvalidScalarValue,
                format!("value {} is not null", describe(Some(other))),
            )),
        }
    }

    pub(super) fn build_mixed(shell: &Shell) -> Value {
        shell.input().map_or(Value::Null, Value::from_json)
    }
}

/// Convert `input` to a value of `kind`, or `None` if the coercion table
/// does not allow it.
pub(crate) fn coerce(kind: &ScalarKind, input: &JsonValue, table: &CoercionConfig) -> Option<Value> {
    match kind {
        ScalarKind::Bool => as_bool(input, table).map(Value::Bool),
        ScalarKind::BoolValue(expected) => as_bool(input, table)
            .filter(|value| value == expected)
            .map(Value::Bool),
        ScalarKind::Int
        | ScalarKind::PositiveInt
        | ScalarKind::NegativeInt
        | ScalarKind::IntRange { .. }
        | ScalarKind::IntValue(_) => as_int(input, table)
            .filter(|value| kind.accepts_int(*value))
            .map(Value::Int),
        ScalarKind::Float => as_float(input, table).map(Value::Float),
        ScalarKind::String => as_string(input, table).map(Value::String),
        ScalarKind::NonEmptyString => as_string(input, table)
            .filter(|value| !value.is_empty())
            .map(Value::String),
        ScalarKind::StringValue(expected) => as_string(input, table)
            .filter(|value| value == expected)
            .map(Value::String),
        ScalarKind::ArrayKey => match input {
            JsonValue::String(value) => Some(Value::String(value.clone())),
            other => as_int(other, table).map(Value::Int),
        },
    }
}

fn as_bool(input: &JsonValue, table: &CoercionConfig) -> Option<bool> {
    match input {
        JsonValue::Bool(value) => Some(*value),
        JsonValue::String(value) if table.string_to_bool() => match value.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(super) fn as_int(input: &JsonValue, table: &CoercionConfig) -> Option<i64> {
    match input {
        JsonValue::Number(number) => number
            .as_i64()
            .or_else(|| integral_float(number).filter(|_| table.float_to_int())),
        JsonValue::String(value) if table.string_to_number() => value.parse().ok(),
        _ => None,
    }
}

fn integral_float(number: &Number) -> Option<i64> {
    let value = number.as_f64()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn as_float(input: &JsonValue, table: &CoercionConfig) -> Option<f64> {
    match input {
        JsonValue::Number(number) if number.is_f64() => number.as_f64(),
        JsonValue::Number(number) if table.int_to_float() => number.as_f64(),
        JsonValue::String(value) if table.string_to_number() => {
            value.parse::<f64>().ok().filter(|value| value.is_finite())
        }
        _ => None,
    }
}

fn as_string(input: &JsonValue, table: &CoercionConfig) -> Option<String> {
    match input {
        JsonValue::String(value) => Some(value.clone()),
        JsonValue::Number(number) if table.number_to_string() => Some(number.to_string()),
        _ => None,
    }
}

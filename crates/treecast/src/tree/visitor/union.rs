use log::debug;
use serde_json::Value as JsonValue;
use treecast_core::{
    types::{Type, UnionType},
    value::Value,
};

use crate::{
    config::CoercionConfig,
    error::ErrorKind,
    tree::{
        Failure, Shell, TreeBuilder,
        builder::{coerce, matching_case},
        describe,
        visitor::{ShellVisitor, Visited},
    },
};

/// Outcome of a narrower that could decide.
enum Narrowed {
    /// Map the node against this member.
    Member(Type),
    /// A member was fully built while narrowing.
    Built(Value),
}

trait UnionNarrower: Send + Sync {
    /// `None` when this narrower cannot decide for the input.
    fn narrow(
        &self,
        union: &UnionType,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Option<Narrowed>, Failure>;
}

/// Replaces a union by one of its members.
pub(crate) struct UnionShellVisitor {
    narrowers: Vec<Box<dyn UnionNarrower>>,
}

impl UnionShellVisitor {
    pub(crate) fn new(coercion: CoercionConfig) -> Self {
        Self {
            narrowers: vec![
                Box::new(UnionNullNarrower),
                Box::new(UnionObjectNarrower),
                Box::new(UnionScalarNarrower { coercion }),
            ],
        }
    }
}

impl ShellVisitor for UnionShellVisitor {
    fn visit(&self, shell: Shell, tree: &TreeBuilder) -> Result<Visited, Failure> {
        let Type::Union(union) = shell.ty() else {
            return Ok(Visited::Continue(shell));
        };

        for narrower in &self.narrowers {
            match narrower.narrow(union, &shell, tree)? {
                Some(Narrowed::Member(member)) => {
                    debug!(path:% = shell.path(), member:% = member; "Narrowed union");
                    return Ok(Visited::Continue(shell.with_type(member)));
                }
                Some(Narrowed::Built(value)) => return Ok(Visited::Done(value)),
                None => {}
            }
        }

        Err(Failure::message(
            ErrorKind::UnionResolutionError,
            format!(
                "value {} does not match any of `{}`",
                describe(shell.input()),
                shell.ty()
            ),
        ))
    }
}

/// `null` and absent input pick the `null` member, or `mixed`.
struct UnionNullNarrower;

impl UnionNarrower for UnionNullNarrower {
    fn narrow(&self, union: &UnionType, shell: &Shell, _: &TreeBuilder) -> Result<Option<Narrowed>, Failure> {
        if !matches!(shell.input(), None | Some(JsonValue::Null)) {
            return Ok(None);
        }

        let members = union.members();
        Ok([Type::Null, Type::Mixed]
            .into_iter()
            .find(|wanted| members.contains(wanted))
            .map(Narrowed::Member))
    }
}

/// Build `member` on behalf of the union node.
///
/// Returns the summary of the failure when the member does not fit the
/// input. Fatal failures abort the narrowing.
fn attempt(member: &Type, shell: &Shell, tree: &TreeBuilder) -> Result<Result<Value, String>, Failure> {
    match tree.build(shell.attempt(member.clone())) {
        Ok(value) => {
            debug!(path:% = shell.path(), member:% = member; "Union member built");
            Ok(Ok(value))
        }
        Err(fatal @ Failure::Fatal(_)) => Err(fatal),
        Err(failure) => Ok(Err(format!("`{member}`: {}", failure.summary()))),
    }
}

fn unresolved(shell: &Shell, attempts: &[String]) -> Failure {
    Failure::message(
        ErrorKind::UnionResolutionError,
        format!(
            "value {} does not match any of `{}` ({})",
            describe(shell.input()),
            shell.ty(),
            attempts.join("; ")
        ),
    )
}

/// Mapping and sequence input is built against each structured member in
/// declaration order; the first success wins.
struct UnionObjectNarrower;

impl UnionNarrower for UnionObjectNarrower {
    fn narrow(
        &self,
        union: &UnionType,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Option<Narrowed>, Failure> {
        if !matches!(shell.input(), Some(JsonValue::Object(_) | JsonValue::Array(_))) {
            return Ok(None);
        }

        let mut attempts = Vec::new();
        for member in union.members().iter().filter(|member| member.is_structured()) {
            match attempt(member, shell, tree)? {
                Ok(value) => return Ok(Some(Narrowed::Built(value))),
                Err(summary) => attempts.push(summary),
            }
        }

        if attempts.is_empty() {
            return Ok(None);
        }
        if union.members().contains(&Type::Mixed) {
            return Ok(Some(Narrowed::Member(Type::Mixed)));
        }
        Err(unresolved(shell, &attempts))
    }
}

/// Scalar input picks the first member, in declaration order, that accepts
/// it under the coercion table. Class members are built from the bare value,
/// which single-parameter classes accept.
struct UnionScalarNarrower {
    coercion: CoercionConfig,
}

impl UnionScalarNarrower {
    fn accepts(member: &Type, input: &JsonValue, coercion: &CoercionConfig) -> bool {
        match member {
            Type::Null => input.is_null(),
            Type::Mixed => true,
            Type::Scalar(kind) => coerce(kind, input, coercion).is_some(),
            Type::Enum(enumeration) => matching_case(enumeration, input, coercion).is_some(),
            _ => false,
        }
    }
}

impl UnionNarrower for UnionScalarNarrower {
    fn narrow(
        &self,
        union: &UnionType,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Option<Narrowed>, Failure> {
        let Some(input) = shell.input() else {
            return Err(Failure::message(ErrorKind::MissingValue, "value is missing"));
        };

        let mut attempts = Vec::new();
        for member in union.members() {
            if let Type::Class(_) = member {
                match attempt(member, shell, tree)? {
                    Ok(value) => return Ok(Some(Narrowed::Built(value))),
                    Err(summary) => attempts.push(summary),
                }
            } else if Self::accepts(member, input, &self.coercion) {
                return Ok(Some(Narrowed::Member(member.clone())));
            }
        }

        if attempts.is_empty() {
            return Ok(None);
        }
        Err(unresolved(shell, &attempts))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use treecast_core::types::{EnumBacking, EnumCase, EnumType, ScalarKind};

    use super::*;

    fn first_accepting<'a>(
        union: &'a [Type],
        input: JsonValue,
        coercion: CoercionConfig,
    ) -> Option<&'a Type> {
        union
            .iter()
            .find(|member| UnionScalarNarrower::accepts(member, &input, &coercion))
    }

    #[test]
    fn test_first_compatible_member_wins() {
        let members = [
            Type::Null,
            Type::Scalar(ScalarKind::Int),
            Type::Scalar(ScalarKind::String),
        ];
        let coercion = CoercionConfig::default();

        assert_eq!(first_accepting(&members, json!("5"), coercion), Some(&members[1]));
        assert_eq!(first_accepting(&members, json!("abc"), coercion), Some(&members[2]));
        assert_eq!(first_accepting(&members, json!(5), coercion), Some(&members[1]));
    }

    #[test]
    fn test_coercion_table_decides_compatibility() {
        let members = [Type::Scalar(ScalarKind::Int), Type::Scalar(ScalarKind::String)];

        assert_eq!(
            first_accepting(&members, json!("5"), CoercionConfig::strict()),
            Some(&members[1])
        );
        assert_eq!(
            first_accepting(&members, json!(true), CoercionConfig::default()),
            None
        );
    }

    #[test]
    fn test_enum_and_mixed_members() {
        let status = Type::Enum(EnumType::new(
            "Status",
            vec![EnumCase::backed("Open", EnumBacking::String("open".to_string()))],
        ));
        let members = [status.clone(), Type::Mixed];
        let coercion = CoercionConfig::default();

        assert_eq!(first_accepting(&members, json!("open"), coercion), Some(&status));
        assert_eq!(first_accepting(&members, json!("closed"), coercion), Some(&Type::Mixed));
    }
}

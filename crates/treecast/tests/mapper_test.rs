//! Integration tests for mapping through the public API.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use treecast::{
    ErrorKind, MapperBuilder, TreeMapper, TreecastError,
    config::{CoercionConfig, InterfaceBinding, MapperConfig},
    registry::{ClassDeclaration, ClassRegistry, ParameterDeclaration},
    types::{EnumBacking, EnumCase},
    value::{Object, Value},
};
use treecast_core::definition::Attribute;

fn registry() -> ClassRegistry {
    ClassRegistry::new()
        .with_class(
            ClassDeclaration::new("Point")
                .with_parameter(ParameterDeclaration::new("x", "int"))
                .with_parameter(ParameterDeclaration::new("y", "int").with_default(Value::Int(0))),
        )
        .with_class(
            ClassDeclaration::new("Email")
                .with_parameter(ParameterDeclaration::new("address", "non-empty-string")),
        )
        .with_class(
            ClassDeclaration::new("Money")
                .with_attribute(Attribute::Factory {
                    method: "of".to_string(),
                })
                .with_factory(
                    "of",
                    vec![
                        ParameterDeclaration::new("amount", "float"),
                        ParameterDeclaration::new("currency", "string"),
                    ],
                    |arguments| {
                        let Some(Value::Float(amount)) = arguments.get("amount") else {
                            return Err("amount is not a float".to_string());
                        };
                        let cents = (amount * 100.0).round() as i64;
                        let mut fields = arguments.clone();
                        fields.shift_remove("amount");
                        fields.insert("cents".to_string(), Value::Int(cents));
                        Ok(Value::Object(Object::new("Money", fields)))
                    },
                ),
        )
        .with_class(ClassDeclaration::new("Node").with_parameter(ParameterDeclaration::new("next", "Node")))
        .with_class(
            ClassDeclaration::new("Link")
                .with_parameter(ParameterDeclaration::new("label", "int"))
                .with_parameter(ParameterDeclaration::new("next", "?Link").with_default(Value::Null)),
        )
        .with_class(ClassDeclaration::new("Shape").not_instantiable())
        .with_interface("Animal")
        .with_class(
            ClassDeclaration::new("Cat")
                .with_parameter(ParameterDeclaration::new("name", "string"))
                .with_parameter(ParameterDeclaration::new("lives", "int<1, 9>").with_default(Value::Int(9))),
        )
        .with_class(
            ClassDeclaration::new("Dog")
                .with_parameter(ParameterDeclaration::new("name", "string"))
                .with_parameter(ParameterDeclaration::new("good", "bool")),
        )
        .with_class(
            ClassDeclaration::new("Tag")
                .with_parameter(
                    ParameterDeclaration::new("label", "non-empty-string").with_attribute(Attribute::Transform {
                        name: "trim".to_string(),
                    }),
                )
                .with_parameter(
                    ParameterDeclaration::new("weight", "string").with_attribute(Attribute::Type {
                        description: "?int".to_string(),
                    }),
                ),
        )
        .with_enum(
            "Suit",
            vec![
                EnumCase::backed("Hearts", EnumBacking::String("H".to_string())),
                EnumCase::backed("Spades", EnumBacking::String("S".to_string())),
            ],
        )
}

fn mapper() -> TreeMapper {
    MapperBuilder::new(Arc::new(registry())).build().unwrap()
}

fn mapper_with(config: MapperConfig) -> TreeMapper {
    MapperBuilder::new(Arc::new(registry()))
        .with_config(config)
        .build()
        .unwrap()
}

fn map(mapper: &TreeMapper, description: &str, input: JsonValue) -> JsonValue {
    mapper
        .map(description, input)
        .unwrap_or_else(|err| panic!("mapping `{description}` failed: {err}"))
        .to_json()
}

/// `(path, kind)` of every mapping error.
fn errors(result: Result<Value, TreecastError>) -> Vec<(String, ErrorKind)> {
    match result {
        Err(TreecastError::Mapping(errors)) => errors
            .iter()
            .map(|error| (error.path().to_string(), error.kind()))
            .collect(),
        other => panic!("Expected mapping errors, got {other:?}"),
    }
}

#[test]
fn test_numeric_string_maps_to_int() {
    let mapper = mapper();

    assert_eq!(mapper.map("int", json!("42")).unwrap(), Value::Int(42));
    assert_eq!(
        errors(mapper.map("int", json!("abc"))),
        [("$".to_string(), ErrorKind::InvalidScalarValue)]
    );
}

#[test]
fn test_strict_coercion_rejects_numeric_string() {
    let mapper = mapper_with(MapperConfig::default().with_coercion(CoercionConfig::strict()));

    assert_eq!(
        errors(mapper.map("int", json!("42"))),
        [("$".to_string(), ErrorKind::InvalidScalarValue)]
    );
}

#[test]
fn test_lists() {
    let mapper = mapper();

    assert_eq!(map(&mapper, "list<int>", json!([1, "2", 3])), json!([1, 2, 3]));
    assert_eq!(map(&mapper, "string[]", json!(["a"])), json!(["a"]));
    assert_eq!(
        errors(mapper.map("non-empty-list<int>", json!([]))),
        [("$".to_string(), ErrorKind::EmptySequence)]
    );
    assert_eq!(
        errors(mapper.map("list<int>", json!({"a": 1}))),
        [("$".to_string(), ErrorKind::InvalidSequence)]
    );
    assert_eq!(
        errors(mapper.map("list<int>", json!([1, "x", 3, true]))),
        [
            ("$[1]".to_string(), ErrorKind::InvalidScalarValue),
            ("$[3]".to_string(), ErrorKind::InvalidScalarValue),
        ]
    );
}

#[test]
fn test_arrays_validate_keys() {
    let mapper = mapper();

    assert_eq!(
        map(&mapper, "array<string, int>", json!({"a": 1, "b": 2})),
        json!({"a": 1, "b": 2})
    );
    assert_eq!(
        errors(mapper.map("array<int, string>", json!({"1": "a", "b": "c"}))),
        [("$.b".to_string(), ErrorKind::InvalidKey)]
    );
    assert_eq!(
        errors(mapper.map("non-empty-array<int>", json!({}))),
        [("$".to_string(), ErrorKind::EmptySequence)]
    );
}

#[test]
fn test_shaped_array_optional_and_unexpected_keys() {
    let mapper = mapper();
    let shape = "array{a: int, b?: string}";

    assert_eq!(map(&mapper, shape, json!({"a": 1})), json!({"a": 1}));
    assert_eq!(map(&mapper, shape, json!({"a": 1, "b": "x"})), json!({"a": 1, "b": "x"}));
    assert_eq!(
        errors(mapper.map(shape, json!({"a": 1, "c": 2}))),
        [("$.c".to_string(), ErrorKind::UnexpectedKey)]
    );
    assert_eq!(
        errors(mapper.map(shape, json!({"b": "x"}))),
        [("$.a".to_string(), ErrorKind::MissingShapedField)]
    );
}

#[test]
fn test_unsealed_and_permissive_shapes_accept_extra_keys() {
    assert_eq!(
        map(&mapper(), "array{a: int, ...}", json!({"a": 1, "c": [2]})),
        json!({"a": 1, "c": [2]})
    );

    let permissive = mapper_with(MapperConfig::default().with_superfluous_keys(true));
    assert_eq!(
        map(&permissive, "array{a: int}", json!({"a": 1, "c": 2})),
        json!({"a": 1})
    );
    assert_eq!(map(&permissive, "Point", json!({"x": 1, "z": 2})), json!({"x": 1, "y": 0}));
}

#[test]
fn test_union_resolution_order() {
    let mapper = mapper();
    let union = "null|int|string";

    assert_eq!(mapper.map(union, json!(null)).unwrap(), Value::Null);
    assert_eq!(mapper.map(union, json!(42)).unwrap(), Value::Int(42));
    assert_eq!(mapper.map(union, json!("abc")).unwrap(), Value::from("abc"));
    assert_eq!(mapper.map(union, json!("42")).unwrap(), Value::Int(42));
    assert_eq!(mapper.map("int|float", json!("4.5")).unwrap(), Value::Float(4.5));
    assert_eq!(
        errors(mapper.map(union, json!([1]))),
        [("$".to_string(), ErrorKind::UnionResolutionError)]
    );
}

#[test]
fn test_union_of_structured_members() {
    let mapper = mapper();
    let union = "Point|list<int>";

    assert_eq!(map(&mapper, union, json!([1, 2])), json!([1, 2]));
    assert_eq!(map(&mapper, union, json!({"x": 3})), json!({"x": 3, "y": 0}));

    let err = mapper.map(union, json!({"y": "a"})).unwrap_err();
    let errors = err.mapping_errors().unwrap();
    assert_eq!(errors.len(), 1);
    let error = errors.at("$").unwrap();
    assert_eq!(error.kind(), ErrorKind::UnionResolutionError);
    assert!(error.message().contains("`Point`"), "{}", error.message());
    assert!(error.message().contains("`list<int>`"), "{}", error.message());
}

#[test]
fn test_union_backtracks_between_classes() {
    let mapper = mapper();

    assert_eq!(
        map(&mapper, "Cat|Dog", json!({"name": "Rex", "good": true})),
        json!({"name": "Rex", "good": true})
    );
    assert_eq!(
        map(&mapper, "Cat|Dog", json!({"name": "Tom"})),
        json!({"name": "Tom", "lives": 9})
    );
}

#[test]
fn test_first_successful_class_member_wins() {
    let dogs = Arc::new(AtomicUsize::new(0));
    let built = Arc::clone(&dogs);
    let mapper = MapperBuilder::new(Arc::new(registry()))
        .with_config(MapperConfig::default().with_superfluous_keys(true))
        .bind("Dog", move |_| {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from("dog"))
        })
        .build()
        .unwrap();
    let input = json!({"name": "Rex", "good": true});

    assert_eq!(map(&mapper, "Cat|Dog", input.clone()), json!({"name": "Rex", "lives": 9}));
    assert_eq!(dogs.load(Ordering::SeqCst), 0);

    assert_eq!(map(&mapper, "Dog|Cat", input), json!("dog"));
    assert_eq!(dogs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scalar_input_builds_single_parameter_class_member() {
    let mapper = mapper();

    assert_eq!(
        map(&mapper, "Email|int", json!("me@x.io")),
        json!({"address": "me@x.io"})
    );
    assert_eq!(map(&mapper, "int|Email", json!("5")), json!(5));
    assert_eq!(map(&mapper, "Email|int", json!(5)), json!(5));

    let err = mapper.map("Email|int", json!("")).unwrap_err();
    let error = err.mapping_errors().unwrap().at("$").unwrap();
    assert_eq!(error.kind(), ErrorKind::UnionResolutionError);
    assert!(error.message().contains("`Email`"), "{}", error.message());
}

#[test]
fn test_nullable_self_reference_uses_one_level_per_node() {
    let mut input = json!({"label": 0});
    for label in 1..40 {
        input = json!({"label": label, "next": input});
    }

    let mapper = mapper();
    let mut link = mapper.map("Link", input).unwrap().to_json();
    let mut length = 1;
    while let Some(next) = link.get("next").filter(|next| !next.is_null()).cloned() {
        link = next;
        length += 1;
    }
    assert_eq!(length, 40);
}

#[test]
fn test_null_and_absent_values() {
    let mapper = mapper();

    assert_eq!(
        errors(mapper.map("array{a: ?int, b: int}", json!({"b": 1}))),
        [("$.a".to_string(), ErrorKind::MissingShapedField)]
    );
    assert_eq!(
        map(&mapper, "array{a: ?int, b?: int}", json!({"a": null})),
        json!({"a": null})
    );
    assert_eq!(
        errors(mapper.map("array{a: int}", json!({"a": null}))),
        [("$.a".to_string(), ErrorKind::InvalidScalarValue)]
    );
    assert_eq!(map(&mapper, "mixed", json!({"a": [1]})), json!({"a": [1]}));
}

#[test]
fn test_class_errors_are_aggregated() {
    let mapper = mapper();

    assert_eq!(
        errors(mapper.map("Point", json!({"x": "a", "y": "b", "z": 1}))),
        [
            ("$.x".to_string(), ErrorKind::InvalidScalarValue),
            ("$.y".to_string(), ErrorKind::InvalidScalarValue),
            ("$.z".to_string(), ErrorKind::UnexpectedKey),
        ]
    );
    assert_eq!(
        errors(mapper.map("list<Point>", json!([{"x": 1}, {}, {"x": []}]))),
        [
            ("$[1].x".to_string(), ErrorKind::MissingValue),
            ("$[2].x".to_string(), ErrorKind::InvalidScalarValue),
        ]
    );
}

#[test]
fn test_class_defaults_and_bare_values() {
    let mapper = mapper();

    assert_eq!(map(&mapper, "Point", json!({"x": 1})), json!({"x": 1, "y": 0}));
    assert_eq!(map(&mapper, "Email", json!("me@example.com")), json!({"address": "me@example.com"}));
    assert_eq!(
        map(&mapper, "Email", json!({"address": "me@example.com"})),
        json!({"address": "me@example.com"})
    );
    assert_eq!(
        errors(mapper.map("Email", json!(""))),
        [("$".to_string(), ErrorKind::InvalidScalarValue)]
    );
    assert_eq!(
        errors(mapper.map("Point", json!(5))),
        [("$".to_string(), ErrorKind::InvalidMapping)]
    );
}

#[test]
fn test_factory_attribute_selects_factory() {
    let value = mapper()
        .map("Money", json!({"amount": 12.5, "currency": "EUR"}))
        .unwrap();

    assert_eq!(value.as_object().map(Object::class), Some("Money"));
    assert_eq!(value.to_json(), json!({"currency": "EUR", "cents": 1250}));
}

#[test]
fn test_non_instantiable_class() {
    assert_eq!(
        errors(mapper().map("Shape", json!({}))),
        [("$".to_string(), ErrorKind::ClassNotInstantiable)]
    );
}

#[test]
fn test_enums() {
    let mapper = mapper();

    assert_eq!(map(&mapper, "list<Suit>", json!(["H", "S"])), json!(["H", "S"]));

    let err = mapper.map("Suit", json!("X")).unwrap_err();
    let error = err.mapping_errors().unwrap().at("$").unwrap();
    assert_eq!(error.kind(), ErrorKind::InvalidEnumValue);
    assert_eq!(error.message(), "value 'X' does not match any of 'H', 'S'");
}

#[test]
fn test_interfaces() {
    assert_eq!(
        errors(mapper().map("Animal", json!({"name": "Tom"}))),
        [("$".to_string(), ErrorKind::InterfaceNotRegistered)]
    );

    let fixed = mapper_with(
        MapperConfig::default().with_interface("Animal", InterfaceBinding::fixed("Cat")),
    );
    assert_eq!(map(&fixed, "Animal", json!({"name": "Tom"})), json!({"name": "Tom", "lives": 9}));

    let discriminated = mapper_with(MapperConfig::default().with_interface(
        "Animal",
        InterfaceBinding::discriminated("kind", [("cat", "Cat"), ("dog", "Dog")]),
    ));
    let animals = discriminated
        .map(
            "list<Animal>",
            json!([
                {"kind": "cat", "name": "Tom", "lives": 3},
                {"kind": "dog", "name": "Rex", "good": true},
            ]),
        )
        .unwrap();
    let Value::List(animals) = animals else {
        panic!("Expected a list, got {animals:?}");
    };
    let classes: Vec<_> = animals
        .iter()
        .filter_map(Value::as_object)
        .map(Object::class)
        .collect();
    assert_eq!(classes, ["Cat", "Dog"]);

    assert_eq!(
        errors(discriminated.map(
            "list<Animal>",
            json!([{"kind": "cow", "name": "Daisy"}, {"name": "Rex"}])
        )),
        [
            ("$[0].kind".to_string(), ErrorKind::InterfaceNotRegistered),
            ("$[1].kind".to_string(), ErrorKind::MissingShapedField),
        ]
    );
}

#[test]
fn test_type_and_transform_attributes() {
    let mapper = MapperBuilder::new(Arc::new(registry()))
        .transformer("trim", |input| match input {
            JsonValue::String(value) => Ok(JsonValue::String(value.trim().to_string())),
            other => Err(format!("cannot trim {other}")),
        })
        .build()
        .unwrap();

    assert_eq!(
        map(&mapper, "Tag", json!({"label": "  rust ", "weight": "3"})),
        json!({"label": "rust", "weight": 3})
    );
    assert_eq!(
        errors(mapper.map("Tag", json!({"label": 1, "weight": null}))),
        [("$.label".to_string(), ErrorKind::TransformFailed)]
    );
    assert_eq!(
        errors(mapper.map("Tag", json!({"label": "   "}))),
        [("$.label".to_string(), ErrorKind::InvalidScalarValue)]
    );
    assert_eq!(
        map(&mapper, "Tag", json!({"label": "x"})),
        json!({"label": "x", "weight": null})
    );
}

#[test]
fn test_unregistered_transformer_is_fatal() {
    let err = mapper().map("Tag", json!({"label": "x"})).unwrap_err();

    assert!(matches!(err, TreecastError::Config(_)), "{err:?}");
}

#[test]
fn test_binders_alterers_and_observers() {
    let nodes = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&nodes);
    let mapper = MapperBuilder::new(Arc::new(registry()))
        .bind("Point", |input| {
            let [x, y] = input.as_array().map(Vec::as_slice).unwrap_or_default() else {
                return Err("expected a pair".to_string());
            };
            Ok(Value::from(format!("({x}, {y})")))
        })
        .alter("string", |input| match input {
            JsonValue::String(input) => JsonValue::String(input.to_uppercase()),
            other => other,
        })
        .observe(move |_, _| {
            observed.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    assert_eq!(map(&mapper, "Point", json!([1, 2])), json!("(1, 2)"));
    assert_eq!(
        errors(mapper.map("Point", json!({"x": 1}))),
        [("$".to_string(), ErrorKind::ConstructionFailed)]
    );

    nodes.store(0, Ordering::SeqCst);
    assert_eq!(map(&mapper, "list<string>", json!(["a", "b"])), json!(["A", "B"]));
    assert_eq!(nodes.load(Ordering::SeqCst), 3);
}

#[test]
fn test_alterers_rewrite_raw_input() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);
    let mapper = MapperBuilder::new(Arc::new(registry()))
        .alter("int", move |input| {
            recorded.lock().unwrap().push(input.clone());
            match input {
                JsonValue::String(input) => JsonValue::String(input.trim_end_matches('x').to_string()),
                other => other,
            }
        })
        .build()
        .unwrap();

    assert_eq!(mapper.map("int", json!("7x")).unwrap(), Value::Int(7));
    assert_eq!(
        errors(mapper.map("int", json!("y"))),
        [("$".to_string(), ErrorKind::InvalidScalarValue)]
    );
    assert_eq!(map(&mapper, "list<int>", json!(["1x", 2])), json!([1, 2]));
    assert_eq!(
        *seen.lock().unwrap(),
        [json!("7x"), json!("y"), json!("1x"), json!(2)]
    );
}

#[test]
fn test_observers_ignore_discarded_union_members() {
    let nodes = Arc::new(Mutex::new(Vec::new()));
    let observed = Arc::clone(&nodes);
    let mapper = MapperBuilder::new(Arc::new(registry()))
        .observe(move |shell, _| {
            observed
                .lock()
                .unwrap()
                .push(format!("{} as {}", shell.path(), shell.ty()));
        })
        .build()
        .unwrap();

    map(&mapper, "Cat|Dog", json!({"name": "Rex", "good": true}));

    assert_eq!(
        *nodes.lock().unwrap(),
        ["$.name as string", "$.good as bool", "$ as Cat|Dog"]
    );
}

#[test]
fn test_self_referencing_class_fails_with_depth_error() {
    let mapper = mapper_with(MapperConfig::default().with_max_depth(16));

    let err = mapper.map("Node", json!(1)).unwrap_err();
    assert!(
        matches!(err, TreecastError::TypeGraphTooDeep { depth: 16, .. }),
        "{err:?}"
    );
}

#[test]
fn test_fatal_errors() {
    let mapper = mapper();

    assert!(matches!(
        mapper.map("list<int", json!([])),
        Err(TreecastError::TypeParsing { .. })
    ));
    assert!(matches!(
        mapper.map("Unknown", json!({})),
        Err(TreecastError::TypeParsing { .. })
    ));
}

#[test]
fn test_map_into() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Point {
        x: i64,
        y: i64,
    }

    let points: Vec<Point> = mapper()
        .map_into("list<Point>", json!([{"x": "1"}, {"x": 2, "y": 3}]))
        .unwrap();
    assert_eq!(points, [Point { x: 1, y: 0 }, Point { x: 2, y: 3 }]);

    let err = mapper()
        .map_into::<Vec<Point>>("list<int>", json!([1]))
        .unwrap_err();
    assert!(matches!(err, TreecastError::Deserialize(_)), "{err:?}");
}

#[test]
fn test_mapper_is_shareable_across_threads() {
    let mapper = Arc::new(mapper());

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let mapper = Arc::clone(&mapper);
            std::thread::spawn(move || mapper.map("Point", json!({"x": index})).unwrap())
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap().to_json(), json!({"x": index, "y": 0}));
    }
}

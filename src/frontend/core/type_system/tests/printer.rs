//! 类型打印测试

use proptest::prelude::*;

use crate::frontend::core::type_system::*;
use crate::frontend::typecheck::ascription::parse_type;

#[test]
fn test_print_primitives() {
    assert_eq!(Type::number().to_string(), "Number");
    assert_eq!(Type::string().to_string(), "String");
    assert_eq!(Type::boolean().to_string(), "Boolean");
    assert_eq!(Type::null().to_string(), "Null");
    assert_eq!(Type::undefined().to_string(), "Undefined");
}

#[test]
fn test_print_structures() {
    let ty = Type::object([
        ("name", Type::string()),
        ("tags", Type::array(vec![Type::string(), Type::number()])),
    ]);
    assert_eq!(
        print_type(&ty),
        "Object({name: String, tags: Array([String, Number])})"
    );
    assert_eq!(
        Type::function(vec![Type::var(0), Type::number()], Type::var(0)).to_string(),
        "Function([a, Number], a)"
    );
    assert_eq!(
        Type::union(vec![Type::number(), Type::string()]).to_string(),
        "Any([Number, String])"
    );
    assert_eq!(Type::object(Vec::<(String, Type)>::new()).to_string(), "Object({})");
    assert_eq!(Type::array(Vec::new()).to_string(), "Array([])");
}

#[test]
fn test_print_values() {
    assert_eq!(
        Type::value(LiteralValue::String("BTree".into())).to_string(),
        "Value(\"BTree\")"
    );
    assert_eq!(Type::value(LiteralValue::Number(3.0)).to_string(), "Value(3)");
    assert_eq!(Type::value(LiteralValue::Number(-0.5)).to_string(), "Value(-0.5)");
    assert_eq!(Type::value(LiteralValue::Boolean(true)).to_string(), "Value(true)");
    assert_eq!(Type::value(LiteralValue::Null).to_string(), "Value(null)");
}

#[test]
fn test_print_quotes_non_identifier_keys() {
    let ty = Type::object([("first name", Type::string()), ("0", Type::number())]);
    assert_eq!(ty.to_string(), "Object({\"first name\": String, \"0\": Number})");
}

#[test]
fn test_is_identifier() {
    assert!(printer::is_identifier("foo"));
    assert!(printer::is_identifier("_x1"));
    assert!(printer::is_identifier("$el"));
    assert!(printer::is_identifier("名字"));
    assert!(!printer::is_identifier("1x"));
    assert!(!printer::is_identifier("a-b"));
    assert!(!printer::is_identifier(""));
}

fn arb_literal() -> impl Strategy<Value = LiteralValue> {
    prop_oneof![
        (-1000i32..1000).prop_map(|n| LiteralValue::Number(n as f64)),
        "[a-z ]{0,6}".prop_map(LiteralValue::String),
        any::<bool>().prop_map(LiteralValue::Boolean),
        Just(LiteralValue::Null),
        Just(LiteralValue::Undefined),
    ]
}

fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::number()),
        Just(Type::string()),
        Just(Type::boolean()),
        Just(Type::null()),
        Just(Type::undefined()),
        (0u32..60).prop_map(Type::var),
        arb_literal().prop_map(Type::value),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Type::array),
            prop::collection::vec(("[a-z]{1,5}|\"[a-z ]{1,5}\"", inner.clone()), 0..4).prop_map(
                |fields| {
                    Type::object(
                        fields
                            .into_iter()
                            .map(|(k, v)| (k.trim_matches('"').to_string(), v)),
                    )
                }
            ),
            (prop::collection::vec(inner.clone(), 0..3), inner.clone())
                .prop_map(|(params, output)| Type::function(params, output)),
            prop::collection::vec(inner, 1..4).prop_map(Type::union),
        ]
    })
}

proptest! {
    /// 打印结果可以作为声明语法重新解析
    #[test]
    fn prop_print_then_parse(ty in arb_type()) {
        let printed = ty.to_string();
        let parsed = parse_type(&printed, &Aliases::new());
        prop_assert_eq!(parsed, Ok(ty), "printed: {}", printed);
    }
}

//! 类型系统单元测试

mod printer;

use crate::frontend::core::type_system::*;

#[test]
fn test_var_names() {
    assert_eq!(TypeVar::new(0).to_string(), "a");
    assert_eq!(TypeVar::new(25).to_string(), "z");
    assert_eq!(TypeVar::new(26).to_string(), "a1");
    assert_eq!(TypeVar::new(27).to_string(), "b1");
    assert_eq!(TypeVar::new(53).to_string(), "b2");
}

#[test]
fn test_var_from_name() {
    assert_eq!(TypeVar::from_name("a"), Some(TypeVar::new(0)));
    assert_eq!(TypeVar::from_name("b1"), Some(TypeVar::new(27)));
    assert_eq!(TypeVar::from_name("A"), None);
    assert_eq!(TypeVar::from_name("ab"), None);
    assert_eq!(TypeVar::from_name("a01"), None);
    assert_eq!(TypeVar::from_name(""), None);
}

#[test]
fn test_var_gen() {
    let mut vars = VarGen::starting_at(3);
    assert_eq!(vars.fresh(), TypeVar::new(3));
    assert_eq!(vars.peek(), 4);
    vars.advance_to(2);
    assert_eq!(vars.peek(), 4);
    vars.advance_to(10);
    assert_eq!(vars.fresh(), TypeVar::new(10));
}

#[test]
fn test_union_flattens_and_dedupes() {
    let inner = Type::union(vec![Type::number(), Type::string()]);
    let ty = Type::union(vec![Type::string(), inner, Type::boolean()]);
    assert_eq!(
        ty,
        Type::Union(vec![Type::string(), Type::number(), Type::boolean()])
    );
}

#[test]
fn test_union_of_one_collapses() {
    assert_eq!(
        Type::union(vec![Type::number(), Type::number()]),
        Type::number()
    );
}

#[test]
fn test_object_equality_ignores_openness() {
    let open = Type::open_object([("x", Type::number())]);
    let closed = Type::object([("x", Type::number())]);
    assert_eq!(open, closed);
}

#[test]
fn test_occurs_and_substitute() {
    let a = TypeVar::new(0);
    let ty = Type::array(vec![Type::Var(a), Type::object([("f", Type::Var(a))])]);
    assert!(ty.occurs(a));
    let replaced = ty.substitute(a, &Type::string());
    assert!(!replaced.occurs(a));
    assert_eq!(
        replaced.to_string(),
        "Array([String, Object({f: String})])"
    );
}

#[test]
fn test_substitute_skips_owned_function_vars() {
    // 函数自有的变量（编号在 owned 区间内）不受外层代入影响
    let a = TypeVar::new(0);
    let ty = Type::Function(FunctionType::signature(vec![Type::Var(a)], Type::Var(a)));
    assert_eq!(ty.substitute(a, &Type::number()), ty);

    let mut captured = FunctionType::signature(vec![Type::Var(a)], Type::number());
    captured.owned = 1..3;
    let ty = Type::Function(captured);
    assert_eq!(
        ty.substitute(a, &Type::string()).to_string(),
        "Function([String], Number)"
    );
}

#[test]
fn test_ownership_is_a_closed_range() {
    // 区间之后的变量是外层在收窄时带进来的，同样可以代入
    let mut f = FunctionType::signature(vec![Type::var(1)], Type::var(2));
    f.owned = 1..2;
    assert!(f.owns(TypeVar::new(1)));
    assert!(!f.owns(TypeVar::new(0)));
    assert!(!f.owns(TypeVar::new(2)));
    let ty = Type::Function(f);
    assert!(ty.mentions(TypeVar::new(2)));
    assert!(!ty.mentions(TypeVar::new(1)));
    assert_eq!(
        ty.substitute(TypeVar::new(2), &Type::number()).to_string(),
        "Function([b], Number)"
    );
    assert_eq!(
        ty.substitute(TypeVar::new(1), &Type::number()).to_string(),
        "Function([b], c)"
    );

    let borrowed = FunctionType::borrowed(vec![Type::var(0)], Type::var(0));
    assert!(!borrowed.owns(TypeVar::new(0)));
}

#[test]
fn test_collect_free_vars_skips_owned() {
    let mut inner = FunctionType::signature(vec![Type::var(3)], Type::var(0));
    inner.owned = 3..4;
    let ty = Type::object([("f", Type::Function(inner)), ("x", Type::var(1))]);
    let mut free = Vec::new();
    ty.collect_free_vars(&mut free);
    assert_eq!(free, vec![TypeVar::new(0), TypeVar::new(1)]);
}

#[test]
fn test_placeholder_vars_are_reserved() {
    let p = TypeVar::placeholder(3);
    assert!(p.is_placeholder());
    assert_ne!(p, TypeVar::placeholder(4));
    assert!(!TypeVar::new(TypeVar::RESERVED - 1).is_placeholder());
    assert!(!FunctionType::signature(vec![], Type::Var(p)).owns(p));
}

#[test]
fn test_map_vars_renames_everywhere() {
    let ty = Type::function(vec![Type::var(0)], Type::array(vec![Type::var(1)]));
    let renamed = ty.map_vars(&mut |v| Type::var(v.index() + 2));
    assert_eq!(renamed.to_string(), "Function([c], Array([d]))");
}

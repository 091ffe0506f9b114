use crate::type_syntax::parse_type;
use genbind_solver::{TypeCatalog, TypeKind, TypeStore, TypeStoreBuilder, Variance};

fn store() -> TypeStore {
    let mut b = TypeStoreBuilder::new("object");
    b.declare(TypeKind::Struct, "int");
    b.declare(TypeKind::Class, "string");
    b.declare(TypeKind::Struct, "void*");
    b.declare(TypeKind::Class, "System.Uri");
    b.declare_generic(TypeKind::Class, "List", &[("T", Variance::Invariant)]);
    b.declare_generic(
        TypeKind::Class,
        "Dictionary",
        &[("TKey", Variance::Invariant), ("TValue", Variance::Invariant)],
    );
    b.finish()
}

fn name(store: &mut TypeStore, text: &str) -> String {
    let ty = parse_type(store, text, &[]).expect("type parses");
    store.type_name(ty).to_string()
}

#[test]
fn named_types() {
    let mut store = store();
    assert_eq!(name(&mut store, "int"), "int");
    assert_eq!(name(&mut store, "  string "), "string");
    assert_eq!(name(&mut store, "void*"), "void*");
    assert_eq!(name(&mut store, "System.Uri"), "System.Uri");
}

#[test]
fn instantiations_nest() {
    let mut store = store();
    assert_eq!(name(&mut store, "List<int>"), "List<int>");
    assert_eq!(
        name(&mut store, "Dictionary< string ,List<int> >"),
        "Dictionary<string, List<int>>"
    );

    let first = parse_type(&mut store, "List<string>", &[]).expect("type parses");
    let second = parse_type(&mut store, "List< string >", &[]).expect("type parses");
    assert_eq!(first, second);
}

#[test]
fn arrays() {
    let mut store = store();
    assert_eq!(name(&mut store, "int[]"), "int[]");
    assert_eq!(name(&mut store, "int[,]"), "int[,]");
    assert_eq!(name(&mut store, "int[][]"), "int[][]");
    assert_eq!(name(&mut store, "List<string>[]"), "List<string>[]");
}

#[test]
fn scope_shadows_declared_types() {
    let mut store = store();
    let list = store.lookup("List").expect("List declared");
    let param = store.generic_arguments(list)[0];
    let scope = [("int".to_string(), param)];

    assert_eq!(parse_type(&mut store, "int", &scope).expect("type parses"), param);
    let own = parse_type(&mut store, "List<int>", &scope).expect("type parses");
    assert_eq!(own, list);
}

#[test]
fn rejects_malformed_types() {
    let mut store = store();
    let cases = [
        ("Unknown", "unknown type `Unknown`"),
        ("int<string>", "`int` is not a generic type"),
        ("List<int, int>", "`List` takes 1 type argument(s), got 2"),
        ("List<int", "expected `>`"),
        ("int[", "expected `]`"),
        ("int string", "unexpected `string`"),
        ("", "expected a type name"),
        ("List<>", "expected a type name"),
    ];
    for (text, message) in cases {
        let err = parse_type(&mut store, text, &[]).expect_err(text);
        let rendered = format!("{err:#}");
        assert!(rendered.contains(message), "{text}: {rendered}");
    }
}

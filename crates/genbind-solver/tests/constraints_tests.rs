use super::*;
use crate::test_catalog::{Library, declare_callable, library, signature};

// ===================================================================
// Generic types
// ===================================================================

#[test]
fn test_value_type_only() {
    let (mut store, lib) = library();
    let nullable_int = store.instantiate(lib.nullable, &[lib.int]);
    let nullable = Declaration::Type(lib.nullable);

    assert!(satisfies_constraints(&store, nullable, &[lib.int]));
    assert!(satisfies_constraints(&store, nullable, &[lib.date_time]));
    assert!(satisfies_constraints(&store, nullable, &[lib.member_types]));
    assert!(!satisfies_constraints(&store, nullable, &[lib.string]));
    assert!(!satisfies_constraints(&store, nullable, &[nullable_int]));
}

#[test]
fn test_instantiation_stands_for_definition() {
    let (mut store, lib) = library();
    let nullable_long = store.instantiate(lib.nullable, &[lib.long]);
    assert!(satisfies_constraints(&store, Declaration::Type(nullable_long), &[lib.int]));
    assert!(!satisfies_constraints(&store, Declaration::Type(nullable_long), &[lib.cat]));
}

#[test]
fn test_unconstrained_and_non_generic_types() {
    let (store, lib) = library();
    assert!(satisfies_constraints(&store, Declaration::Type(lib.list), &[lib.cat]));
    assert!(satisfies_constraints(&store, Declaration::Type(lib.cat), &[]));
    assert!(!satisfies_constraints(&store, Declaration::Type(lib.cat), &[lib.int]));
}

#[test]
fn test_arity_mismatch_fails() {
    let (store, lib) = library();
    assert!(!satisfies_constraints(&store, Declaration::Type(lib.list), &[]));
    assert!(!satisfies_constraints(
        &store,
        Declaration::Type(lib.list),
        &[lib.int, lib.int]
    ));
}

#[test]
fn test_self_referential_constraint() {
    let (store, lib) = library();
    let circular = Declaration::Type(lib.circular);
    assert!(satisfies_constraints(&store, circular, &[lib.node]));
    assert!(!satisfies_constraints(&store, circular, &[lib.cat]));
}

// ===================================================================
// Generic callables
// ===================================================================

#[test]
fn test_interface_constraint() {
    let (mut store, lib) = library();
    let (id, params) = declare_callable(&mut store, "Feed", &["T"]);
    store.add_constraint(params[0], Constraint::BaseTypeOrInterface(lib.animal_interface));
    let sig = signature(&store, id);
    let feed = Declaration::Callable(&sig);

    assert!(satisfies_constraints(&store, feed, &[lib.cat]));
    assert!(satisfies_constraints(&store, feed, &[lib.tiger]));
    assert!(satisfies_constraints(&store, feed, &[lib.animal_interface]));
    assert!(!satisfies_constraints(&store, feed, &[lib.base]));
}

#[test]
fn test_default_constructible() {
    let (mut store, lib) = library();
    let (id, params) = declare_callable(&mut store, "Create", &["T"]);
    store.add_constraint(params[0], Constraint::DefaultConstructible);
    let sig = signature(&store, id);
    let create = Declaration::Callable(&sig);

    assert!(satisfies_constraints(&store, create, &[lib.int]));
    assert!(satisfies_constraints(&store, create, &[lib.date_time]));
    assert!(satisfies_constraints(&store, create, &[lib.cat]));
    assert!(!satisfies_constraints(&store, create, &[lib.abstract_class]));
    assert!(!satisfies_constraints(&store, create, &[lib.without_default_ctor]));
    assert!(!satisfies_constraints(&store, create, &[lib.animal_interface]));
    assert!(!satisfies_constraints(&store, create, &[lib.string]));
}

#[test]
fn test_reference_type_only() {
    let (mut store, lib) = library();
    let (id, params) = declare_callable(&mut store, "Share", &["T"]);
    store.add_constraint(params[0], Constraint::ReferenceTypeOnly);
    let sig = signature(&store, id);
    let share = Declaration::Callable(&sig);

    assert!(satisfies_constraints(&store, share, &[lib.string]));
    assert!(satisfies_constraints(&store, share, &[lib.animal_interface]));
    assert!(!satisfies_constraints(&store, share, &[lib.int]));
}

#[test]
fn test_constraint_mentioning_sibling_parameter() {
    let (mut store, lib) = library();
    let (id, params) = declare_callable(&mut store, "Sort", &["T"]);
    let comparable_t = store.instantiate(lib.comparable, &[params[0]]);
    store.add_constraint(params[0], Constraint::BaseTypeOrInterface(comparable_t));
    let sig = signature(&store, id);
    let sort = Declaration::Callable(&sig);

    assert!(satisfies_constraints(&store, sort, &[lib.int]));
    assert!(satisfies_constraints(&store, sort, &[lib.string]));
    assert!(!satisfies_constraints(&store, sort, &[lib.cat]));
    assert!(!satisfies_constraints(&store, sort, &[lib.float]));
}

#[test]
fn test_constraint_mentioning_enclosing_parameter() {
    let (mut store, lib) = library();
    let list_t = Library::params(&store, lib.list)[0];
    let list_of_animal = store.instantiate(lib.list, &[lib.animal]);
    let (id, params) = declare_callable(&mut store, "AddDerived", &["TDerived"]);
    store.add_constraint(params[0], Constraint::BaseTypeOrInterface(list_t));
    store.set_declaring_type(id, list_of_animal);
    let sig = signature(&store, id);
    let add = Declaration::Callable(&sig);

    assert!(satisfies_constraints(&store, add, &[lib.tiger]));
    assert!(!satisfies_constraints(&store, add, &[lib.base]));
}

#[test]
fn test_first_violation_fails_whole_tuple() {
    let (mut store, lib) = library();
    let (id, params) = declare_callable(&mut store, "Both", &["A", "B"]);
    store.add_constraint(params[0], Constraint::ValueTypeOnly);
    store.add_constraint(params[1], Constraint::ReferenceTypeOnly);
    store.add_constraint(params[1], Constraint::DefaultConstructible);
    let sig = signature(&store, id);
    let both = Declaration::Callable(&sig);

    assert!(satisfies_constraints(&store, both, &[lib.int, lib.cat]));
    assert!(!satisfies_constraints(&store, both, &[lib.cat, lib.cat]));
    assert!(!satisfies_constraints(&store, both, &[lib.int, lib.string]));
    assert!(!satisfies_constraints(&store, both, &[lib.int]));
}

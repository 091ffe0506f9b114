use super::*;
use crate::test_catalog::library;

// ===================================================================
// Witnesses
// ===================================================================

#[test]
fn test_witnesses_grow_in_order() {
    let mut witnesses = Witnesses::default();
    assert!(witnesses.is_empty());
    witnesses.add(TypeId(3));
    assert_eq!(witnesses, Witnesses::Single(TypeId(3)));
    witnesses.add(TypeId(3));
    assert_eq!(witnesses.len(), 1);
    witnesses.add(TypeId(5));
    witnesses.add(TypeId(3));
    assert_eq!(witnesses.as_slice(), &[TypeId(3), TypeId(5), TypeId(3)]);
}

#[test]
fn test_bound_kind_follows_variance() {
    let mut bounds = BoundSet::default();
    assert!(bounds.is_empty());
    bounds.add(TypeId(1), InferenceVariance::Covariant);
    bounds.add(TypeId(2), InferenceVariance::Contravariant);
    bounds.add(TypeId(3), InferenceVariance::Invariant);
    assert_eq!(bounds.lower.as_slice(), &[TypeId(1)]);
    assert_eq!(bounds.upper.as_slice(), &[TypeId(2)]);
    assert_eq!(bounds.exact.as_slice(), &[TypeId(3)]);
}

// ===================================================================
// Fixing
// ===================================================================

#[test]
fn test_empty_set_is_unfixable() {
    let (store, _) = library();
    assert_eq!(BoundSet::default().fix(&store), None);
}

#[test]
fn test_exact_wins() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.cat, InferenceVariance::Invariant);
    bounds.add(lib.tiger, InferenceVariance::Covariant);
    bounds.add(lib.animal, InferenceVariance::Contravariant);
    assert_eq!(bounds.fix(&store), Some(lib.cat));
}

#[test]
fn test_exact_must_respect_other_bounds() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.cat, InferenceVariance::Invariant);
    bounds.add(lib.animal, InferenceVariance::Covariant);
    assert_eq!(bounds.fix(&store), None);

    let mut bounds = BoundSet::default();
    bounds.add(lib.cat, InferenceVariance::Invariant);
    bounds.add(lib.tiger, InferenceVariance::Contravariant);
    assert_eq!(bounds.fix(&store), None);
}

#[test]
fn test_conflicting_exact_bounds() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.int, InferenceVariance::Invariant);
    bounds.add(lib.long, InferenceVariance::Invariant);
    assert_eq!(bounds.fix(&store), None);
}

#[test]
fn test_lower_bounds_pick_common_supertype() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.tiger, InferenceVariance::Covariant);
    bounds.add(lib.animal, InferenceVariance::Covariant);
    bounds.add(lib.cat, InferenceVariance::Covariant);
    assert_eq!(bounds.fix(&store), Some(lib.animal));
}

#[test]
fn test_lower_bounds_without_common_witness() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.cat, InferenceVariance::Covariant);
    bounds.add(lib.dog, InferenceVariance::Covariant);
    // `Animal` would do, but only witnesses are candidates.
    assert_eq!(bounds.fix(&store), None);
}

#[test]
fn test_upper_bounds_pick_common_subtype() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.animal, InferenceVariance::Contravariant);
    bounds.add(lib.tiger, InferenceVariance::Contravariant);
    bounds.add(lib.animal_interface, InferenceVariance::Contravariant);
    assert_eq!(bounds.fix(&store), Some(lib.tiger));
}

#[test]
fn test_upper_candidate_must_accept_lower_bounds() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.animal, InferenceVariance::Contravariant);
    bounds.add(lib.cat, InferenceVariance::Covariant);
    assert_eq!(bounds.fix(&store), Some(lib.animal));

    let mut bounds = BoundSet::default();
    bounds.add(lib.cat, InferenceVariance::Contravariant);
    bounds.add(lib.animal, InferenceVariance::Covariant);
    // A failing Upper candidate does not fall back to the Lower rule.
    assert_eq!(bounds.fix(&store), None);
}

#[test]
fn test_lower_candidate_must_respect_upper_bounds() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.cat, InferenceVariance::Contravariant);
    bounds.add(lib.dog, InferenceVariance::Contravariant);
    bounds.add(lib.tiger, InferenceVariance::Covariant);
    // No Upper witness is below both Cat and Dog, and Tiger is not a Dog.
    assert_eq!(bounds.fix(&store), None);
}

#[test]
fn test_fixing_is_deterministic() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.string, InferenceVariance::Covariant);
    bounds.add(lib.object, InferenceVariance::Covariant);
    let first = bounds.fix(&store);
    for _ in 0..10 {
        assert_eq!(bounds.fix(&store), first);
    }
    assert_eq!(first, Some(lib.object));
}

// ===================================================================
// Display and InferredBounds
// ===================================================================

#[test]
fn test_display() {
    let (store, lib) = library();
    let mut bounds = BoundSet::default();
    bounds.add(lib.string, InferenceVariance::Covariant);
    bounds.add(lib.cat, InferenceVariance::Covariant);
    bounds.add(lib.int, InferenceVariance::Invariant);
    assert_eq!(
        bounds.display(&store).to_string(),
        "lower={string, Cat} upper={} exact={int}"
    );
}

#[test]
fn test_inferred_bounds_tracking() {
    let mut inferred = InferredBounds::new(&[TypeId(10), TypeId(11)]);
    assert_eq!(inferred.len(), 2);
    assert_eq!(inferred.unresolved(), 2);
    assert_eq!(inferred.fixed_types(), None);

    inferred.fixed[0] = Some(TypeId(1));
    assert_eq!(inferred.unresolved(), 1);
    inferred.fixed[1] = Some(TypeId(2));
    assert_eq!(inferred.fixed_types(), Some(vec![TypeId(1), TypeId(2)]));
    assert!(InferredBounds::new(&[]).is_empty());
}

//! Type-argument inference benchmarks.
//!
//! Measures collection and fixing over a small catalog with generic
//! interfaces, deep class chains and mutually constrained parameters.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use genbind_solver::{
    CallableSignature, Constraint, Declaration, InferenceOptions, ParamMode, PrimitiveKind, TypeId,
    TypeKind, TypeStore, TypeStoreBuilder, Variance, infer_types, satisfies_constraints,
};

struct Fixture {
    store: TypeStore,
    sequence: CallableSignature,
    pair: CallableSignature,
    list_of_string: TypeId,
    ints: TypeId,
    deep: Vec<(usize, TypeId)>,
    left: TypeId,
    comparable_sort: CallableSignature,
    int: TypeId,
}

fn build_fixture() -> Fixture {
    let mut b = TypeStoreBuilder::new("object");
    let value_type = b.declare(TypeKind::Class, "ValueType");
    b.set_value_type_root(value_type);
    let array = b.declare(TypeKind::Class, "Array");
    b.set_array_root(array);

    let enumerable = b.declare_generic(TypeKind::Interface, "IEnumerable", &[("T", Variance::Covariant)]);
    b.add_sequence_interface(enumerable);
    let comparable = b.declare_generic(TypeKind::Interface, "IComparable", &[("T", Variance::Contravariant)]);
    let peer = b.declare_generic(TypeKind::Interface, "IPeer", &[("T", Variance::Covariant)]);

    let int = b.primitive("int", PrimitiveKind::I32);
    let comparable_int = b.instantiate(comparable, &[int]);
    b.add_interface(int, comparable_int);
    let string = b.declare(TypeKind::Class, "string");

    let list = b.declare_generic(TypeKind::Class, "List", &[("T", Variance::Invariant)]);
    let list_t = b.params(list)[0];
    let enumerable_t = b.instantiate(enumerable, &[list_t]);
    b.add_interface(list, enumerable_t);

    // Chain of classes, the root of which implements IEnumerable<string>.
    let strings = b.instantiate(enumerable, &[string]);
    let mut deep = Vec::new();
    let mut previous = b.declare(TypeKind::Class, "Level0");
    b.add_interface(previous, strings);
    for depth in 1..=64 {
        let level = b.declare(TypeKind::Class, &format!("Level{depth}"));
        b.set_base(level, previous);
        if depth % 16 == 0 {
            deep.push((depth, level));
        }
        previous = level;
    }

    let left = b.declare(TypeKind::Class, "Left");
    let right = b.declare(TypeKind::Class, "Right");
    let peer_of_right = b.instantiate(peer, &[right]);
    let peer_of_left = b.instantiate(peer, &[left]);
    b.add_interface(left, peer_of_right);
    b.add_interface(right, peer_of_left);

    let mut store = b.finish();
    let list_of_string = store.instantiate(list, &[string]);
    let ints = store.array_of(int, 1);

    let sequence_id = store.declare_callable("First", &["T"]);
    let t = store.callable(sequence_id).map(|s| s.type_params[0]).expect("callable declared");
    let template = store.instantiate(enumerable, &[t]);
    store.add_parameter(sequence_id, template, ParamMode::ByValue);
    store.set_return_type(sequence_id, t);

    let pair_id = store.declare_callable("Pair", &["A", "B"]);
    let (a, bb) = store
        .callable(pair_id)
        .map(|s| (s.type_params[0], s.type_params[1]))
        .expect("callable declared");
    let peer_of_b = store.instantiate(peer, &[bb]);
    let peer_of_a = store.instantiate(peer, &[a]);
    store.add_constraint(a, Constraint::BaseTypeOrInterface(peer_of_b));
    store.add_constraint(bb, Constraint::BaseTypeOrInterface(peer_of_a));
    store.add_parameter(pair_id, a, ParamMode::ByValue);

    let sort_id = store.declare_callable("Sort", &["T"]);
    let st = store.callable(sort_id).map(|s| s.type_params[0]).expect("callable declared");
    let comparable_st = store.instantiate(comparable, &[st]);
    store.add_constraint(st, Constraint::BaseTypeOrInterface(comparable_st));

    let sequence = store.callable(sequence_id).cloned().expect("callable declared");
    let pair = store.callable(pair_id).cloned().expect("callable declared");
    let comparable_sort = store.callable(sort_id).cloned().expect("callable declared");
    Fixture {
        store,
        sequence,
        pair,
        list_of_string,
        ints,
        deep,
        left,
        comparable_sort,
        int,
    }
}

fn bench_inference(c: &mut Criterion) {
    let fixture = build_fixture();
    let options = InferenceOptions::default();
    let mut group = c.benchmark_group("inference");

    group.bench_function("sequence_list", |b| {
        b.iter(|| {
            infer_types(
                &fixture.store,
                &fixture.sequence,
                black_box(&[fixture.list_of_string]),
                options,
            )
        })
    });
    group.bench_function("sequence_array", |b| {
        b.iter(|| infer_types(&fixture.store, &fixture.sequence, black_box(&[fixture.ints]), options))
    });
    for &(depth, level) in &fixture.deep {
        group.bench_with_input(BenchmarkId::new("deep_hierarchy", depth), &level, |b, &level| {
            b.iter(|| infer_types(&fixture.store, &fixture.sequence, black_box(&[level]), options))
        });
    }

    let bootstrap = InferenceOptions {
        bootstrap_from_constraints: true,
        ..InferenceOptions::default()
    };
    group.bench_function("bootstrap_peers", |b| {
        b.iter(|| infer_types(&fixture.store, &fixture.pair, black_box(&[fixture.left]), bootstrap))
    });
    group.finish();
}

fn bench_constraints(c: &mut Criterion) {
    let fixture = build_fixture();
    c.bench_function("constraints_self_referential", |b| {
        b.iter(|| {
            satisfies_constraints(
                &fixture.store,
                Declaration::Callable(&fixture.comparable_sort),
                black_box(&[fixture.int]),
            )
        })
    });
}

criterion_group!(benches, bench_inference, bench_constraints);
criterion_main!(benches);

//! Fixture catalog shaped like a small base class library.

use crate::store::{TypeKind, TypeStore, TypeStoreBuilder};
use crate::types::{CallableId, CallableSignature, Constraint, PrimitiveKind, TypeFlags, TypeId};

use crate::types::Variance::{Contravariant as In, Covariant as Out, Invariant as Inv};

/// Handles of every fixture type.
#[allow(dead_code)]
pub(crate) struct Library {
    pub object: TypeId,
    pub value_type: TypeId,
    pub array: TypeId,

    pub bool_: TypeId,
    pub char_: TypeId,
    pub byte: TypeId,
    pub short: TypeId,
    pub int: TypeId,
    pub long: TypeId,
    pub float: TypeId,
    pub double: TypeId,
    pub int_ptr: TypeId,
    pub pointer: TypeId,
    pub date_time: TypeId,
    pub member_types: TypeId,
    pub string: TypeId,

    // Generic definitions
    pub enumerable: TypeId,
    pub read_only_collection: TypeId,
    pub read_only_list: TypeId,
    pub collection: TypeId,
    pub ilist: TypeId,
    pub list: TypeId,
    pub comparable: TypeId,
    pub equatable: TypeId,
    pub key_value_pair: TypeId,
    pub dictionary: TypeId,
    pub nullable: TypeId,
    pub tuple: TypeId,
    pub action: TypeId,
    pub action2: TypeId,
    pub func: TypeId,
    pub converter: TypeId,
    pub value: TypeId,
    pub peer: TypeId,
    pub circular: TypeId,

    // Hierarchies
    pub animal_interface: TypeId,
    pub animal: TypeId,
    pub cat: TypeId,
    pub tiger: TypeId,
    pub dog: TypeId,
    pub base: TypeId,
    pub sub: TypeId,
    pub base_interface: TypeId,
    pub sub_interface: TypeId,
    pub string_value: TypeId,
    pub object_and_string_value: TypeId,
    pub string_and_int_value: TypeId,
    pub left: TypeId,
    pub right: TypeId,
    pub node: TypeId,
    pub abstract_class: TypeId,
    pub without_default_ctor: TypeId,
}

impl Library {
    /// Type parameters of a generic definition.
    pub fn params(store: &TypeStore, definition: TypeId) -> Vec<TypeId> {
        use crate::catalog::TypeCatalog;
        store.generic_arguments(definition).to_vec()
    }
}

/// Build the fixture catalog.
pub(crate) fn library() -> (TypeStore, Library) {
    let mut b = TypeStoreBuilder::new("object");
    let object = b.root();

    let value_type = b.declare(TypeKind::Class, "ValueType");
    b.add_flags(value_type, TypeFlags::ABSTRACT);
    b.set_value_type_root(value_type);
    let array = b.declare(TypeKind::Class, "Array");
    b.add_flags(array, TypeFlags::ABSTRACT);
    b.set_array_root(array);

    // Generic interfaces
    let enumerable = b.declare_generic(TypeKind::Interface, "IEnumerable", &[("T", Out)]);
    let read_only_collection =
        b.declare_generic(TypeKind::Interface, "IReadOnlyCollection", &[("T", Out)]);
    let read_only_list = b.declare_generic(TypeKind::Interface, "IReadOnlyList", &[("T", Out)]);
    let collection = b.declare_generic(TypeKind::Interface, "ICollection", &[("T", Inv)]);
    let ilist = b.declare_generic(TypeKind::Interface, "IList", &[("T", Inv)]);
    let comparable = b.declare_generic(TypeKind::Interface, "IComparable", &[("T", In)]);
    let equatable = b.declare_generic(TypeKind::Interface, "IEquatable", &[("T", Inv)]);
    for sequence in [enumerable, read_only_collection, read_only_list, collection, ilist] {
        b.add_sequence_interface(sequence);
    }

    let [t] = param_array(&b, read_only_collection);
    let enumerable_t = b.instantiate(enumerable, &[t]);
    b.add_interface(read_only_collection, enumerable_t);
    let [t] = param_array(&b, read_only_list);
    let collection_t = b.instantiate(read_only_collection, &[t]);
    b.add_interface(read_only_list, collection_t);
    let [t] = param_array(&b, collection);
    let enumerable_t = b.instantiate(enumerable, &[t]);
    b.add_interface(collection, enumerable_t);
    let [t] = param_array(&b, ilist);
    let collection_t = b.instantiate(collection, &[t]);
    b.add_interface(ilist, collection_t);

    // Primitives and structs
    let bool_ = b.primitive("bool", PrimitiveKind::Bool);
    let char_ = b.primitive("char", PrimitiveKind::Char);
    let byte = b.primitive("byte", PrimitiveKind::U8);
    let short = b.primitive("short", PrimitiveKind::I16);
    let int = b.primitive("int", PrimitiveKind::I32);
    let long = b.primitive("long", PrimitiveKind::I64);
    let float = b.primitive("float", PrimitiveKind::F32);
    let double = b.primitive("double", PrimitiveKind::F64);
    let int_ptr = b.primitive("IntPtr", PrimitiveKind::ISize);
    let pointer = b.pointer("void*");
    let date_time = b.declare(TypeKind::Struct, "DateTime");
    let member_types = b.enumeration("MemberTypes", int);
    for primitive in [int, long, double] {
        let comparable_self = b.instantiate(comparable, &[primitive]);
        let equatable_self = b.instantiate(equatable, &[primitive]);
        b.add_interface(primitive, comparable_self);
        b.add_interface(primitive, equatable_self);
    }

    let string = b.declare(TypeKind::Class, "string");
    b.remove_flags(string, TypeFlags::DEFAULT_CONSTRUCTOR);
    let chars = b.instantiate(enumerable, &[char_]);
    let comparable_string = b.instantiate(comparable, &[string]);
    let equatable_string = b.instantiate(equatable, &[string]);
    b.add_interface(string, chars);
    b.add_interface(string, comparable_string);
    b.add_interface(string, equatable_string);

    // Collections
    let list = b.declare_generic(TypeKind::Class, "List", &[("T", Inv)]);
    let [t] = param_array(&b, list);
    let ilist_t = b.instantiate(ilist, &[t]);
    let read_only_list_t = b.instantiate(read_only_list, &[t]);
    b.add_interface(list, ilist_t);
    b.add_interface(list, read_only_list_t);

    let key_value_pair = b.declare_generic(
        TypeKind::Struct,
        "KeyValuePair",
        &[("TKey", Inv), ("TValue", Inv)],
    );
    let dictionary =
        b.declare_generic(TypeKind::Class, "Dictionary", &[("TKey", Inv), ("TValue", Inv)]);
    let [key, value] = param_array(&b, dictionary);
    let pair = b.instantiate(key_value_pair, &[key, value]);
    let pairs = b.instantiate(enumerable, &[pair]);
    b.add_interface(dictionary, pairs);

    let nullable = b.declare_generic(TypeKind::Struct, "Nullable", &[("T", Inv)]);
    let [t] = param_array(&b, nullable);
    b.add_constraint(t, Constraint::ValueTypeOnly);
    b.set_optional_wrapper(nullable);

    let tuple = b.declare_generic(TypeKind::Class, "Tuple", &[("T1", Inv), ("T2", Inv)]);
    b.remove_flags(tuple, TypeFlags::DEFAULT_CONSTRUCTOR);

    // Delegates
    let action = b.declare_generic(TypeKind::Delegate, "Action", &[("T", In)]);
    let action2 = b.declare_generic(TypeKind::Delegate, "Action2", &[("T1", In), ("T2", In)]);
    let func = b.declare_generic(TypeKind::Delegate, "Func", &[("TResult", Out)]);
    let converter = b.declare_generic(
        TypeKind::Delegate,
        "Converter",
        &[("TInput", In), ("TOutput", Out)],
    );

    // Animals
    let animal_interface = b.declare(TypeKind::Interface, "IAnimal");
    let animal = b.declare(TypeKind::Class, "Animal");
    b.add_flags(animal, TypeFlags::ABSTRACT);
    b.add_interface(animal, animal_interface);
    let cat = b.declare(TypeKind::Class, "Cat");
    b.set_base(cat, animal);
    let tiger = b.declare(TypeKind::Class, "Tiger");
    b.set_base(tiger, cat);
    let dog = b.declare(TypeKind::Class, "Dog");
    b.set_base(dog, animal);

    let base = b.declare(TypeKind::Class, "Base");
    let sub = b.declare(TypeKind::Class, "Sub");
    b.set_base(sub, base);
    let base_interface = b.declare(TypeKind::Interface, "IBase");
    let sub_interface = b.declare(TypeKind::Interface, "ISub");
    b.add_interface(sub_interface, base_interface);

    // Values implementing one interface several times
    let value = b.declare_generic(TypeKind::Interface, "IValue", &[("T", Out)]);
    let value_of_string = b.instantiate(value, &[string]);
    let value_of_object = b.instantiate(value, &[object]);
    let value_of_int = b.instantiate(value, &[int]);
    let string_value = b.declare(TypeKind::Class, "StringValue");
    b.add_interface(string_value, value_of_string);
    let object_and_string_value = b.declare(TypeKind::Class, "ObjectAndStringValue");
    b.add_interface(object_and_string_value, value_of_object);
    b.add_interface(object_and_string_value, value_of_string);
    let string_and_int_value = b.declare(TypeKind::Class, "StringAndIntValue");
    b.add_interface(string_and_int_value, value_of_string);
    b.add_interface(string_and_int_value, value_of_int);

    // Mutually referencing peers
    let peer = b.declare_generic(TypeKind::Interface, "IPeer", &[("T", Out)]);
    let left = b.declare(TypeKind::Class, "Left");
    let right = b.declare(TypeKind::Class, "Right");
    let peer_of_right = b.instantiate(peer, &[right]);
    let peer_of_left = b.instantiate(peer, &[left]);
    b.add_interface(left, peer_of_right);
    b.add_interface(right, peer_of_left);

    // Self-referential constraint: Circular<T> where T : Circular<T>
    let circular = b.declare_generic(TypeKind::Class, "Circular", &[("T", Inv)]);
    let [t] = param_array(&b, circular);
    let circular_t = b.instantiate(circular, &[t]);
    b.add_constraint(t, Constraint::BaseTypeOrInterface(circular_t));
    let node = b.declare(TypeKind::Class, "Node");
    let circular_node = b.instantiate(circular, &[node]);
    b.set_base(node, circular_node);

    let abstract_class = b.declare(TypeKind::Class, "AbstractClass");
    b.add_flags(abstract_class, TypeFlags::ABSTRACT);
    let without_default_ctor = b.declare(TypeKind::Class, "ClassWithoutDefaultCtor");
    b.remove_flags(without_default_ctor, TypeFlags::DEFAULT_CONSTRUCTOR);

    let library = Library {
        object,
        value_type,
        array,
        bool_,
        char_,
        byte,
        short,
        int,
        long,
        float,
        double,
        int_ptr,
        pointer,
        date_time,
        member_types,
        string,
        enumerable,
        read_only_collection,
        read_only_list,
        collection,
        ilist,
        list,
        comparable,
        equatable,
        key_value_pair,
        dictionary,
        nullable,
        tuple,
        action,
        action2,
        func,
        converter,
        value,
        peer,
        circular,
        animal_interface,
        animal,
        cat,
        tiger,
        dog,
        base,
        sub,
        base_interface,
        sub_interface,
        string_value,
        object_and_string_value,
        string_and_int_value,
        left,
        right,
        node,
        abstract_class,
        without_default_ctor,
    };
    (b.finish(), library)
}

/// Type parameters of a definition as a fixed-size array.
fn param_array<const N: usize>(b: &TypeStoreBuilder, definition: TypeId) -> [TypeId; N] {
    let params = b.params(definition);
    std::array::from_fn(|i| params[i])
}

/// Declare a callable on a finished store, returning its id and type parameters.
pub(crate) fn declare_callable(
    store: &mut TypeStore,
    name: &str,
    type_params: &[&str],
) -> (CallableId, Vec<TypeId>) {
    let id = store.declare_callable(name, type_params);
    let params = store
        .callable(id)
        .map(|signature| signature.type_params.clone())
        .unwrap_or_default();
    (id, params)
}

/// Snapshot of a declared callable's signature.
pub(crate) fn signature(store: &TypeStore, id: CallableId) -> CallableSignature {
    store.callable(id).cloned().expect("callable declared")
}

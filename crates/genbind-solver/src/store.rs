//! In-memory type catalog.
//!
//! `TypeStore` interns every type it knows about into a flat table indexed by
//! `TypeId`. It is populated in two phases:
//!
//! 1. **Declaration** through [`TypeStoreBuilder`]: named types, generic
//!    definitions with declared variance, bases, interfaces, roles.
//! 2. **Closure** in [`TypeStoreBuilder::finish`]: the base type and
//!    interfaces of every instantiation are computed by substituting its
//!    arguments into the definition's declared supertypes. Substitution may
//!    intern further instantiations, which are expanded in turn until the
//!    set is closed (bounded by `MAX_INSTANTIATION_DEPTH` nesting).
//!
//! A finished store still accepts new instantiations, arrays and callables;
//! their supertypes are closed eagerly. Declarations are builder-only, so
//! the supertypes of existing types never change after `finish()`.

use crate::catalog::TypeCatalog;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::{
    CallableId, CallableSignature, Constraint, ParamInfo, ParamMode, ParamOwner, PrimitiveKind,
    TypeFlags, TypeId, TypeList, TypeParamInfo, Variance,
};
use genbind_common::interner::{Atom, Interner};
use genbind_common::limits::MAX_INSTANTIATION_DEPTH;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

/// Kind of a declared named type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference type with a parameterless constructor, based on the root.
    Class,
    /// Abstract, with no base type.
    Interface,
    /// Value type with a parameterless constructor.
    Struct,
    /// Reference type without a parameterless constructor.
    Delegate,
}

impl TypeKind {
    fn default_flags(self) -> TypeFlags {
        match self {
            TypeKind::Class => TypeFlags::DEFAULT_CONSTRUCTOR,
            TypeKind::Interface => TypeFlags::INTERFACE | TypeFlags::ABSTRACT,
            TypeKind::Struct => TypeFlags::VALUE_TYPE | TypeFlags::DEFAULT_CONSTRUCTOR,
            TypeKind::Delegate => TypeFlags::empty(),
        }
    }
}

#[derive(Clone, Debug)]
enum TypeShape {
    Named,
    Definition { params: TypeList },
    Instance { definition: TypeId, args: TypeList },
    Array { element: TypeId, rank: u32 },
    Param(TypeParamInfo),
}

#[derive(Clone, Debug)]
struct TypeEntry {
    name: Atom,
    flags: TypeFlags,
    shape: TypeShape,
    base: Option<TypeId>,
    /// Declared (named types, definitions) or substituted (instantiations).
    direct_interfaces: Vec<TypeId>,
    /// Transitive interface set, valid once `closed`.
    interfaces: Vec<TypeId>,
    closed: bool,
    primitive: Option<PrimitiveKind>,
    underlying: Option<TypeId>,
    has_params: bool,
    /// Instantiation/array nesting depth; 0 for leaves.
    nesting: u32,
}

impl TypeEntry {
    fn new(name: Atom, flags: TypeFlags, shape: TypeShape) -> Self {
        Self {
            name,
            flags,
            shape,
            base: None,
            direct_interfaces: Vec::new(),
            interfaces: Vec::new(),
            closed: false,
            primitive: None,
            underlying: None,
            has_params: false,
            nesting: 0,
        }
    }
}

// =============================================================================
// TypeStore
// =============================================================================

/// A nominal type catalog held in memory.
#[derive(Clone)]
pub struct TypeStore {
    interner: Interner,
    types: Vec<TypeEntry>,
    by_name: FxHashMap<Atom, TypeId>,
    instances: FxHashMap<(TypeId, TypeList), TypeId>,
    arrays: FxHashMap<(TypeId, u32), TypeId>,
    callables: Vec<CallableSignature>,
    callables_by_name: FxHashMap<Atom, CallableId>,
    root: TypeId,
    value_type_root: Option<TypeId>,
    array_root: Option<TypeId>,
    optional_wrapper: Option<TypeId>,
    sequence_interfaces: FxHashSet<TypeId>,
    /// Instantiations and arrays whose supertypes are not computed yet.
    pending: Vec<TypeId>,
    finished: bool,
}

impl TypeStore {
    fn new(root_name: &str) -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        let mut store = Self {
            interner,
            types: Vec::new(),
            by_name: FxHashMap::default(),
            instances: FxHashMap::default(),
            arrays: FxHashMap::default(),
            callables: Vec::new(),
            callables_by_name: FxHashMap::default(),
            root: TypeId(0),
            value_type_root: None,
            array_root: None,
            optional_wrapper: None,
            sequence_interfaces: FxHashSet::default(),
            pending: Vec::new(),
            finished: false,
        };
        store.root = store.push_named(root_name, TypeFlags::DEFAULT_CONSTRUCTOR, TypeShape::Named);
        store
    }

    #[inline]
    fn entry(&self, ty: TypeId) -> &TypeEntry {
        &self.types[ty.index()]
    }

    fn push(&mut self, entry: TypeEntry) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(entry);
        id
    }

    fn push_named(&mut self, name: &str, flags: TypeFlags, shape: TypeShape) -> TypeId {
        let atom = self.interner.intern(name);
        let id = self.push(TypeEntry::new(atom, flags, shape));
        self.by_name.entry(atom).or_insert(id);
        id
    }

    fn push_param(&mut self, name: &str, owner: ParamOwner, position: usize, variance: Variance) -> TypeId {
        let atom = self.interner.intern(name);
        let info = TypeParamInfo {
            name: atom,
            owner,
            position,
            variance,
            constraints: Vec::new(),
        };
        let mut entry = TypeEntry::new(atom, TypeFlags::empty(), TypeShape::Param(info));
        entry.has_params = true;
        entry.closed = true;
        self.push(entry)
    }

    /// Look up a declared type (or an interned instantiation) by display name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.interner
            .get(name)
            .and_then(|atom| self.by_name.get(&atom).copied())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // -------------------------------------------------------------------------
    // Interning
    // -------------------------------------------------------------------------

    /// Instantiate a generic definition.
    ///
    /// Instantiating a definition with its own type parameters yields the
    /// definition itself. A non-definition or an arity mismatch yields
    /// `definition` unchanged.
    pub fn instantiate(&mut self, definition: TypeId, args: &[TypeId]) -> TypeId {
        let id = self.intern_instance(definition, args);
        if self.finished {
            self.close();
        }
        id
    }

    /// Array of `element` with the given rank (at least 1).
    pub fn array_of(&mut self, element: TypeId, rank: u32) -> TypeId {
        let id = self.intern_array(element, rank.max(1));
        if self.finished {
            self.close();
        }
        id
    }

    fn intern_instance(&mut self, definition: TypeId, args: &[TypeId]) -> TypeId {
        let params = match &self.entry(definition).shape {
            TypeShape::Definition { params } if params.len() == args.len() => params,
            _ => {
                trace!(
                    definition = self.type_name(definition),
                    arity = args.len(),
                    "not instantiable"
                );
                return definition;
            }
        };
        if params.as_slice() == args {
            return definition;
        }

        let key = (definition, TypeList::from_slice(args));
        if let Some(&id) = self.instances.get(&key) {
            return id;
        }

        let definition_entry = self.entry(definition);
        let arg_names: Vec<&str> = args.iter().map(|&a| self.type_name(a)).collect();
        let name = format!(
            "{}<{}>",
            self.interner.resolve(definition_entry.name),
            arg_names.join(", ")
        );
        let flags = definition_entry.flags;
        let has_params = args.iter().any(|&a| self.entry(a).has_params);
        let nesting = 1 + args.iter().map(|&a| self.entry(a).nesting).max().unwrap_or(0);

        let atom = self.interner.intern_owned(name);
        let mut entry = TypeEntry::new(
            atom,
            flags,
            TypeShape::Instance {
                definition,
                args: key.1.clone(),
            },
        );
        entry.has_params = has_params;
        entry.nesting = nesting;
        let id = self.push(entry);
        self.instances.insert(key, id);
        self.by_name.entry(atom).or_insert(id);
        self.pending.push(id);
        id
    }

    fn intern_array(&mut self, element: TypeId, rank: u32) -> TypeId {
        if let Some(&id) = self.arrays.get(&(element, rank)) {
            return id;
        }
        let commas = ",".repeat(rank as usize - 1);
        let name = format!("{}[{commas}]", self.type_name(element));
        let element_entry = self.entry(element);
        let has_params = element_entry.has_params;
        let nesting = element_entry.nesting + 1;

        let atom = self.interner.intern_owned(name);
        let mut entry = TypeEntry::new(atom, TypeFlags::empty(), TypeShape::Array { element, rank });
        entry.has_params = has_params;
        entry.nesting = nesting;
        let id = self.push(entry);
        self.arrays.insert((element, rank), id);
        self.by_name.entry(atom).or_insert(id);
        self.pending.push(id);
        id
    }

    /// Replace `params` by `args` throughout `ty`.
    fn substitute(&mut self, ty: TypeId, params: &[TypeId], args: &[TypeId]) -> TypeId {
        if let Some(position) = params.iter().position(|&p| p == ty) {
            return args[position];
        }
        match self.entry(ty).shape.clone() {
            TypeShape::Instance {
                definition,
                args: inner,
            } => {
                let replaced: TypeList = inner
                    .iter()
                    .map(|&arg| self.substitute(arg, params, args))
                    .collect();
                if replaced == inner {
                    ty
                } else {
                    self.intern_instance(definition, &replaced)
                }
            }
            TypeShape::Array { element, rank } => {
                let replaced = self.substitute(element, params, args);
                if replaced == element {
                    ty
                } else {
                    self.intern_array(replaced, rank)
                }
            }
            _ => ty,
        }
    }

    // -------------------------------------------------------------------------
    // Supertype closure
    // -------------------------------------------------------------------------

    /// Expand every pending type, then close the interface sets of the types
    /// expanded.
    fn close(&mut self) {
        let mut expanded = Vec::new();
        while let Some(id) = self.pending.pop() {
            self.expand(id);
            expanded.push(id);
        }
        let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeClosure);
        for id in expanded {
            self.close_interfaces(id, &mut guard);
        }
    }

    /// Compute the direct supertypes of an instantiation or array.
    fn expand(&mut self, id: TypeId) {
        match self.entry(id).shape.clone() {
            TypeShape::Instance { definition, args } => {
                if self.entry(id).nesting > MAX_INSTANTIATION_DEPTH {
                    trace!(ty = self.type_name(id), "instantiation too deep, not expanded");
                    return;
                }
                let params = match &self.entry(definition).shape {
                    TypeShape::Definition { params } => params.clone(),
                    _ => return,
                };
                let declared_base = self.entry(definition).base;
                let declared_interfaces = self.entry(definition).direct_interfaces.clone();

                let base = declared_base.map(|b| self.substitute(b, &params, &args));
                let interfaces: Vec<TypeId> = declared_interfaces
                    .into_iter()
                    .map(|i| self.substitute(i, &params, &args))
                    .collect();
                let entry = &mut self.types[id.index()];
                entry.base = base;
                entry.direct_interfaces = interfaces;
            }
            TypeShape::Array { .. } => {
                let base = self.array_root.unwrap_or(self.root);
                self.types[id.index()].base = Some(base);
            }
            _ => {}
        }
    }

    fn close_interfaces(&mut self, id: TypeId, guard: &mut RecursionGuard<TypeId>) {
        if self.entry(id).closed || !guard.enter(id).is_entered() {
            return;
        }

        let direct = self.entry(id).direct_interfaces.clone();
        let base = self.entry(id).base;
        let mut all: Vec<TypeId> = Vec::with_capacity(direct.len());
        for iface in direct {
            self.close_interfaces(iface, guard);
            push_unique(&mut all, iface);
            for &inherited in &self.entry(iface).interfaces {
                push_unique(&mut all, inherited);
            }
        }
        if let Some(base) = base {
            self.close_interfaces(base, guard);
            for &inherited in &self.entry(base).interfaces {
                push_unique(&mut all, inherited);
            }
        }

        let entry = &mut self.types[id.index()];
        entry.interfaces = all;
        entry.closed = true;
        guard.leave(id);
    }

    // -------------------------------------------------------------------------
    // Callables
    // -------------------------------------------------------------------------

    /// Declare a generic callable with the named type parameters.
    pub fn declare_callable(&mut self, name: &str, type_params: &[&str]) -> CallableId {
        let id = CallableId(self.callables.len() as u32);
        let params = type_params
            .iter()
            .enumerate()
            .map(|(position, param)| {
                self.push_param(param, ParamOwner::Callable(id), position, Variance::Invariant)
            })
            .collect();
        let atom = self.interner.intern(name);
        self.callables.push(CallableSignature {
            id,
            name: atom,
            type_params: params,
            params: Vec::new(),
            return_type: None,
            declaring_type: None,
        });
        self.callables_by_name.entry(atom).or_insert(id);
        id
    }

    pub fn callable(&self, id: CallableId) -> Option<&CallableSignature> {
        self.callables.get(id.0 as usize)
    }

    pub fn find_callable(&self, name: &str) -> Option<CallableId> {
        self.interner
            .get(name)
            .and_then(|atom| self.callables_by_name.get(&atom).copied())
    }

    pub fn callable_name(&self, id: CallableId) -> &str {
        self.callable(id)
            .map(|signature| self.interner.resolve(signature.name))
            .unwrap_or("")
    }

    pub fn add_parameter(&mut self, id: CallableId, ty: TypeId, mode: ParamMode) {
        if let Some(signature) = self.callables.get_mut(id.0 as usize) {
            signature.params.push(ParamInfo { ty, mode });
        }
    }

    pub fn set_return_type(&mut self, id: CallableId, ty: TypeId) {
        if let Some(signature) = self.callables.get_mut(id.0 as usize) {
            signature.return_type = Some(ty);
        }
    }

    /// Record the enclosing instantiation whose arguments bind the enclosing
    /// type's parameters in the callable's templates and constraints.
    pub fn set_declaring_type(&mut self, id: CallableId, ty: TypeId) {
        if let Some(signature) = self.callables.get_mut(id.0 as usize) {
            signature.declaring_type = Some(ty);
        }
    }

    /// Attach a constraint to a type parameter of a type or callable.
    pub fn add_constraint(&mut self, param: TypeId, constraint: Constraint) {
        if let TypeShape::Param(info) = &mut self.types[param.index()].shape {
            info.constraints.push(constraint);
        }
    }
}

fn push_unique(list: &mut Vec<TypeId>, ty: TypeId) {
    if !list.contains(&ty) {
        list.push(ty);
    }
}

impl TypeCatalog for TypeStore {
    fn type_name(&self, ty: TypeId) -> &str {
        self.interner.resolve(self.entry(ty).name)
    }

    fn flags(&self, ty: TypeId) -> TypeFlags {
        self.entry(ty).flags
    }

    fn base_type(&self, ty: TypeId) -> Option<TypeId> {
        self.entry(ty).base
    }

    fn interfaces(&self, ty: TypeId) -> &[TypeId] {
        &self.entry(ty).interfaces
    }

    fn generic_definition(&self, ty: TypeId) -> Option<TypeId> {
        match &self.entry(ty).shape {
            TypeShape::Definition { .. } => Some(ty),
            TypeShape::Instance { definition, .. } => Some(*definition),
            _ => None,
        }
    }

    fn generic_arguments(&self, ty: TypeId) -> &[TypeId] {
        match &self.entry(ty).shape {
            TypeShape::Definition { params } => params,
            TypeShape::Instance { args, .. } => args,
            _ => &[],
        }
    }

    fn array_shape(&self, ty: TypeId) -> Option<(TypeId, u32)> {
        match self.entry(ty).shape {
            TypeShape::Array { element, rank } => Some((element, rank)),
            _ => None,
        }
    }

    fn type_param(&self, ty: TypeId) -> Option<&TypeParamInfo> {
        match &self.entry(ty).shape {
            TypeShape::Param(info) => Some(info),
            _ => None,
        }
    }

    fn enum_underlying(&self, ty: TypeId) -> Option<TypeId> {
        self.entry(ty).underlying
    }

    fn primitive_kind(&self, ty: TypeId) -> Option<PrimitiveKind> {
        self.entry(ty).primitive
    }

    fn root_type(&self) -> TypeId {
        self.root
    }

    fn optional_wrapper(&self) -> Option<TypeId> {
        self.optional_wrapper
    }

    fn is_sequence_interface(&self, definition: TypeId) -> bool {
        self.sequence_interfaces.contains(&definition)
    }

    fn contains_type_parameters(&self, ty: TypeId) -> bool {
        self.entry(ty).has_params
    }
}

// =============================================================================
// TypeStoreBuilder
// =============================================================================

/// Declaration phase of a [`TypeStore`].
///
/// Dereferences to the store under construction, so interning and callable
/// declarations are available here as well.
pub struct TypeStoreBuilder {
    store: TypeStore,
}

impl Deref for TypeStoreBuilder {
    type Target = TypeStore;

    fn deref(&self) -> &TypeStore {
        &self.store
    }
}

impl DerefMut for TypeStoreBuilder {
    fn deref_mut(&mut self) -> &mut TypeStore {
        &mut self.store
    }
}

impl TypeStoreBuilder {
    /// Start a catalog whose universal root type is named `root_name`.
    pub fn new(root_name: &str) -> Self {
        Self {
            store: TypeStore::new(root_name),
        }
    }

    pub fn root(&self) -> TypeId {
        self.store.root
    }

    /// Declare a non-generic named type.
    pub fn declare(&mut self, kind: TypeKind, name: &str) -> TypeId {
        self.store
            .push_named(name, kind.default_flags(), TypeShape::Named)
    }

    /// Declare a generic definition with `(name, variance)` type parameters.
    pub fn declare_generic(&mut self, kind: TypeKind, name: &str, params: &[(&str, Variance)]) -> TypeId {
        let definition = self.store.push_named(
            name,
            kind.default_flags(),
            TypeShape::Definition {
                params: TypeList::new(),
            },
        );
        let ids: TypeList = params
            .iter()
            .enumerate()
            .map(|(position, &(param, variance))| {
                self.store
                    .push_param(param, ParamOwner::Type(definition), position, variance)
            })
            .collect();
        let entry = &mut self.store.types[definition.index()];
        entry.shape = TypeShape::Definition { params: ids };
        entry.has_params = !params.is_empty();
        definition
    }

    /// Declare a primitive value type.
    pub fn primitive(&mut self, name: &str, kind: PrimitiveKind) -> TypeId {
        let id = self.declare(TypeKind::Struct, name);
        self.store.types[id.index()].primitive = Some(kind);
        id
    }

    /// Declare an enum over an integral underlying type.
    pub fn enumeration(&mut self, name: &str, underlying: TypeId) -> TypeId {
        let id = self.declare(TypeKind::Struct, name);
        let entry = &mut self.store.types[id.index()];
        entry.flags |= TypeFlags::ENUM;
        entry.underlying = Some(underlying);
        id
    }

    /// Declare a pointer type.
    pub fn pointer(&mut self, name: &str) -> TypeId {
        let id = self.declare(TypeKind::Struct, name);
        let entry = &mut self.store.types[id.index()];
        entry.flags = TypeFlags::POINTER | TypeFlags::VALUE_TYPE;
        id
    }

    /// Type parameters of a generic definition.
    pub fn params(&self, definition: TypeId) -> TypeList {
        TypeList::from_slice(self.store.generic_arguments(definition))
    }

    pub fn set_base(&mut self, ty: TypeId, base: TypeId) {
        self.store.types[ty.index()].base = Some(base);
    }

    pub fn add_interface(&mut self, ty: TypeId, interface: TypeId) {
        push_unique(&mut self.store.types[ty.index()].direct_interfaces, interface);
    }

    pub fn add_flags(&mut self, ty: TypeId, flags: TypeFlags) {
        self.store.types[ty.index()].flags |= flags;
    }

    pub fn remove_flags(&mut self, ty: TypeId, flags: TypeFlags) {
        self.store.types[ty.index()].flags -= flags;
    }

    // -------------------------------------------------------------------------
    // Well-known roles
    // -------------------------------------------------------------------------

    /// Base of value types declared without an explicit base.
    pub fn set_value_type_root(&mut self, ty: TypeId) {
        self.store.value_type_root = Some(ty);
    }

    /// Base of every array type.
    pub fn set_array_root(&mut self, ty: TypeId) {
        self.store.array_root = Some(ty);
    }

    /// The single-parameter optional-value wrapper definition.
    pub fn set_optional_wrapper(&mut self, definition: TypeId) {
        self.store.optional_wrapper = Some(definition);
    }

    /// Mark a single-parameter covariant interface as implemented by rank-1
    /// arrays.
    pub fn add_sequence_interface(&mut self, definition: TypeId) {
        self.store.sequence_interfaces.insert(definition);
    }

    /// Apply default bases, close all supertypes and freeze declarations.
    pub fn finish(mut self) -> TypeStore {
        let store = &mut self.store;
        let root = store.root;
        let value_type_root = store.value_type_root;
        for (index, entry) in store.types.iter_mut().enumerate() {
            let id = TypeId(index as u32);
            let declared = matches!(entry.shape, TypeShape::Named | TypeShape::Definition { .. });
            if !declared || entry.base.is_some() || id == root {
                continue;
            }
            if entry.flags.contains(TypeFlags::INTERFACE) {
                continue;
            }
            entry.base = match value_type_root {
                Some(value_root) if entry.flags.contains(TypeFlags::VALUE_TYPE) && id != value_root => {
                    Some(value_root)
                }
                _ => Some(root),
            };
        }

        store.close();
        let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeClosure);
        for index in 0..store.types.len() {
            store.close_interfaces(TypeId(index as u32), &mut guard);
        }
        store.finished = true;

        debug!(
            types = store.types.len(),
            instances = store.instances.len(),
            callables = store.callables.len(),
            "type store finished"
        );
        self.store
    }
}

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;

//! JSON type catalog files.
//!
//! A catalog file declares named types, generic callables and the
//! well-known roles the engine needs:
//!
//! ```json
//! {
//!   "roles": { "root": "object", "value_type_root": "ValueType",
//!              "array_root": "Array", "optional_wrapper": "Nullable",
//!              "sequence_interfaces": ["IEnumerable"] },
//!   "types": [
//!     { "name": "IEnumerable", "kind": "interface",
//!       "params": [{ "name": "T", "variance": "out" }] },
//!     { "name": "int", "kind": "primitive", "primitive": "i32",
//!       "interfaces": ["IComparable<int>"] },
//!     { "name": "List", "kind": "class", "params": [{ "name": "T" }],
//!       "interfaces": ["IEnumerable<T>"] }
//!   ],
//!   "callables": [
//!     { "name": "Max",
//!       "type_params": [{ "name": "T", "constraints": ["IComparable<T>"] }],
//!       "params": [{ "type": "IEnumerable<T>" }], "returns": "T" }
//!   ],
//!   "options": { "bootstrap_from_constraints": false }
//! }
//! ```
//!
//! Loading runs in two passes so declarations may refer to types declared
//! later in the file: every name is declared first, then bases, interfaces,
//! constraints and roles are resolved. Callables are added once the type
//! store is finished.

use anyhow::{Context, Result, bail};
use genbind_solver::{
    Constraint, InferenceOptions, ParamMode, PrimitiveKind, TypeCatalog, TypeFlags, TypeId,
    TypeKind, TypeStore, TypeStoreBuilder, Variance,
};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::type_syntax::{Scope, parse_type};

// =============================================================================
// File model
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogFile {
    #[serde(default)]
    pub roles: Roles,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub callables: Vec<CallableDecl>,
    #[serde(default)]
    pub options: InferenceOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Roles {
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default)]
    pub value_type_root: Option<String>,
    #[serde(default)]
    pub array_root: Option<String>,
    #[serde(default)]
    pub optional_wrapper: Option<String>,
    #[serde(default)]
    pub sequence_interfaces: Vec<String>,
}

impl Default for Roles {
    fn default() -> Self {
        Self {
            root: default_root(),
            value_type_root: None,
            array_root: None,
            optional_wrapper: None,
            sequence_interfaces: Vec::new(),
        }
    }
}

fn default_root() -> String {
    "object".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindDecl {
    Class,
    Interface,
    Struct,
    Delegate,
    Primitive,
    Enum,
    Pointer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: KindDecl,
    #[serde(default)]
    pub params: Vec<TypeParamDecl>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Overrides the kind's default (classes and structs have one).
    #[serde(default)]
    pub default_constructor: Option<bool>,
    /// Required for `primitive` types.
    #[serde(default)]
    pub primitive: Option<PrimitiveKind>,
    /// Required for `enum` types.
    #[serde(default)]
    pub underlying: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeParamDecl {
    pub name: String,
    /// Ignored for callable type parameters.
    #[serde(default)]
    pub variance: Variance,
    /// `struct`, `class`, `new()` or a type expression.
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallableDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParamDecl>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub returns: Option<String>,
    /// Instantiation of the enclosing generic type, e.g. `List<string>`.
    #[serde(default)]
    pub declaring_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamDecl {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub mode: ParamMode,
}

/// A catalog ready for queries.
pub struct LoadedCatalog {
    pub store: TypeStore,
    pub options: InferenceOptions,
}

// =============================================================================
// Loading
// =============================================================================

impl CatalogFile {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid catalog JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in catalog {}", path.display()))
    }

    /// Build the type store and register every callable.
    pub fn build(&self) -> Result<LoadedCatalog> {
        let mut builder = TypeStoreBuilder::new(&self.roles.root);
        self.declare_types(&mut builder)?;
        self.resolve_types(&mut builder)?;
        self.assign_roles(&mut builder)?;

        let mut store = builder.finish();
        for callable in &self.callables {
            declare_callable(&mut store, callable)
                .with_context(|| format!("in callable `{}`", callable.name))?;
        }
        debug!(
            types = self.types.len(),
            callables = self.callables.len(),
            "catalog loaded"
        );
        Ok(LoadedCatalog {
            store,
            options: self.options,
        })
    }

    /// First pass: declare every name. Enums come last so their underlying
    /// types may be declared anywhere in the file.
    fn declare_types(&self, builder: &mut TypeStoreBuilder) -> Result<()> {
        let mut seen = FxHashSet::default();
        for decl in &self.types {
            if !seen.insert(decl.name.as_str()) {
                bail!("type `{}` is declared twice", decl.name);
            }
        }

        let (enums, others): (Vec<&TypeDecl>, Vec<&TypeDecl>) =
            self.types.iter().partition(|decl| decl.kind == KindDecl::Enum);
        for decl in others.into_iter().chain(enums) {
            if decl.name == self.roles.root {
                continue;
            }
            declare_type(builder, decl).with_context(|| format!("in type `{}`", decl.name))?;
        }
        Ok(())
    }

    /// Second pass: bases, interfaces, flags and type parameter constraints.
    fn resolve_types(&self, builder: &mut TypeStoreBuilder) -> Result<()> {
        for decl in &self.types {
            resolve_type(builder, decl).with_context(|| format!("in type `{}`", decl.name))?;
        }
        Ok(())
    }

    fn assign_roles(&self, builder: &mut TypeStoreBuilder) -> Result<()> {
        let roles = &self.roles;
        if let Some(name) = &roles.value_type_root {
            let ty = lookup(builder, name)?;
            builder.set_value_type_root(ty);
        }
        if let Some(name) = &roles.array_root {
            let ty = lookup(builder, name)?;
            builder.set_array_root(ty);
        }
        if let Some(name) = &roles.optional_wrapper {
            let definition = single_parameter_definition(builder, name)
                .context("optional wrapper")?;
            builder.set_optional_wrapper(definition);
        }
        for name in &roles.sequence_interfaces {
            let definition = single_parameter_definition(builder, name)
                .context("sequence interface")?;
            builder.add_sequence_interface(definition);
        }
        Ok(())
    }
}

fn lookup(store: &TypeStore, name: &str) -> Result<TypeId> {
    store
        .lookup(name)
        .with_context(|| format!("unknown type `{name}`"))
}

fn single_parameter_definition(store: &TypeStore, name: &str) -> Result<TypeId> {
    let ty = lookup(store, name)?;
    if store.generic_definition(ty) != Some(ty) || store.generic_arguments(ty).len() != 1 {
        bail!("`{name}` must be a generic definition with one type parameter");
    }
    Ok(ty)
}

fn declare_type(builder: &mut TypeStoreBuilder, decl: &TypeDecl) -> Result<TypeId> {
    let kind = match decl.kind {
        KindDecl::Class => TypeKind::Class,
        KindDecl::Interface => TypeKind::Interface,
        KindDecl::Struct => TypeKind::Struct,
        KindDecl::Delegate => TypeKind::Delegate,
        KindDecl::Primitive | KindDecl::Enum | KindDecl::Pointer => {
            if !decl.params.is_empty() {
                bail!("{:?} types cannot be generic", decl.kind);
            }
            return declare_value(builder, decl);
        }
    };

    if decl.params.is_empty() {
        return Ok(builder.declare(kind, &decl.name));
    }
    let params: Vec<(&str, Variance)> = decl
        .params
        .iter()
        .map(|param| (param.name.as_str(), param.variance))
        .collect();
    Ok(builder.declare_generic(kind, &decl.name, &params))
}

fn declare_value(builder: &mut TypeStoreBuilder, decl: &TypeDecl) -> Result<TypeId> {
    match decl.kind {
        KindDecl::Primitive => {
            let kind = decl
                .primitive
                .context("primitive types need a `primitive` kind")?;
            Ok(builder.primitive(&decl.name, kind))
        }
        KindDecl::Enum => {
            let name = decl
                .underlying
                .as_deref()
                .context("enum types need an `underlying` type")?;
            let underlying = lookup(builder, name)?;
            if builder.primitive_kind(underlying).is_none() {
                bail!("enum underlying type `{name}` is not a primitive");
            }
            Ok(builder.enumeration(&decl.name, underlying))
        }
        _ => Ok(builder.pointer(&decl.name)),
    }
}

fn resolve_type(builder: &mut TypeStoreBuilder, decl: &TypeDecl) -> Result<()> {
    let ty = lookup(builder, &decl.name)?;
    let params = builder.params(ty);
    let scope: Vec<(String, TypeId)> = decl
        .params
        .iter()
        .map(|param| param.name.clone())
        .zip(params.iter().copied())
        .collect();

    if let Some(base) = &decl.base {
        let base = parse_type(builder, base, &scope)?;
        builder.set_base(ty, base);
    }
    for interface in &decl.interfaces {
        let interface = parse_type(builder, interface, &scope)?;
        builder.add_interface(ty, interface);
    }
    if decl.is_abstract {
        builder.add_flags(ty, TypeFlags::ABSTRACT);
    }
    match decl.default_constructor {
        Some(true) => builder.add_flags(ty, TypeFlags::DEFAULT_CONSTRUCTOR),
        Some(false) => builder.remove_flags(ty, TypeFlags::DEFAULT_CONSTRUCTOR),
        None => {}
    }

    for (param_decl, &param) in decl.params.iter().zip(params.iter()) {
        for text in &param_decl.constraints {
            let constraint = parse_constraint(builder, text, &scope)?;
            builder.add_constraint(param, constraint);
        }
    }
    Ok(())
}

/// `struct`, `class`, `new()`, or a base type/interface expression.
pub fn parse_constraint(store: &mut TypeStore, text: &str, scope: &Scope) -> Result<Constraint> {
    Ok(match text.trim() {
        "struct" => Constraint::ValueTypeOnly,
        "class" => Constraint::ReferenceTypeOnly,
        "new()" => Constraint::DefaultConstructible,
        target => Constraint::BaseTypeOrInterface(parse_type(store, target, scope)?),
    })
}

fn declare_callable(store: &mut TypeStore, decl: &CallableDecl) -> Result<()> {
    if store.find_callable(&decl.name).is_some() {
        bail!("callable is declared twice");
    }
    let declaring = decl
        .declaring_type
        .as_deref()
        .map(|text| parse_type(store, text, &[]))
        .transpose()?;

    let names: Vec<&str> = decl.type_params.iter().map(|p| p.name.as_str()).collect();
    let id = store.declare_callable(&decl.name, &names);
    let own = store
        .callable(id)
        .map(|signature| signature.type_params.clone())
        .unwrap_or_default();

    // Own parameters shadow those of the enclosing type.
    let mut scope: Vec<(String, TypeId)> = names
        .iter()
        .map(|name| name.to_string())
        .zip(own.iter().copied())
        .collect();
    if let Some(declaring) = declaring {
        if store.generic_definition(declaring).is_none() {
            bail!("declaring type `{}` is not generic", store.type_name(declaring));
        }
        let enclosing = store.definition_or_self(declaring);
        let enclosing_params = store.generic_arguments(enclosing).to_vec();
        scope.extend(
            enclosing_params
                .into_iter()
                .map(|param| (store.type_name(param).to_string(), param)),
        );
        store.set_declaring_type(id, declaring);
    }

    for (param_decl, &param) in decl.type_params.iter().zip(&own) {
        for text in &param_decl.constraints {
            let constraint = parse_constraint(store, text, &scope)?;
            store.add_constraint(param, constraint);
        }
    }
    for param in &decl.params {
        let ty = parse_type(store, &param.ty, &scope)?;
        store.add_parameter(id, ty, param.mode);
    }
    if let Some(returns) = &decl.returns {
        let ty = parse_type(store, returns, &scope)?;
        store.set_return_type(id, ty);
    }
    Ok(())
}

/// Read and build a catalog file.
pub fn load_catalog(path: &Path) -> Result<LoadedCatalog> {
    CatalogFile::load(path)?.build()
}

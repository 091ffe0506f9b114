//! Command execution.
//!
//! Each command produces a [`Report`]: the lines to print and an overall
//! [`Status`]. Errors in the inputs (an unreadable catalog, an unknown
//! type name, the wrong number of argument types) are returned as `Err`
//! and are distinct from a negative outcome such as a failed inference.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use genbind_solver::{
    Declaration, InferenceContext, InferenceFailure, InferenceOptions, TypeCatalog, TypeId,
    TypeStore, satisfies_constraints,
};
use tracing::debug;

use crate::args::{CheckArgs, InferArgs};
use crate::catalog_file::{LoadedCatalog, load_catalog};
use crate::type_syntax::parse_type;

/// Outcome of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Every type parameter was inferred.
    Inferred,
    /// Bounds were collected without fixing them.
    Collected,
    Satisfied,
    Violated,
    Failed(InferenceFailure),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Inferred | Status::Collected | Status::Satisfied)
    }

    fn word(&self) -> &'static str {
        match self {
            Status::Inferred => "inferred",
            Status::Collected => "collected",
            Status::Satisfied => "satisfied",
            Status::Violated => "violated",
            Status::Failed(_) => "failed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Report {
    pub lines: Vec<String>,
    pub status: Status,
}

impl Report {
    fn new(status: Status) -> Self {
        Self {
            lines: Vec::new(),
            status,
        }
    }

    /// Output text, one line per entry followed by the status line.
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        let word = self.status.word();
        let word = match (color, self.status.is_success()) {
            (false, _) => word.to_string(),
            (true, true) => word.green().bold().to_string(),
            (true, false) => word.red().bold().to_string(),
        };
        out.push_str(&word);
        if let Status::Failed(failure) = &self.status {
            out.push_str(&format!(": {failure}"));
        }
        out.push('\n');
        out
    }
}

// =============================================================================
// infer
// =============================================================================

/// Load the catalog named by `args` and run inference.
pub fn infer(args: &InferArgs) -> Result<Report> {
    let mut catalog = load_catalog(&args.catalog)?;
    infer_in(&mut catalog, args)
}

/// Run inference against an already loaded catalog.
///
/// Flags add to the options stored in the catalog file.
pub fn infer_in(catalog: &mut LoadedCatalog, args: &InferArgs) -> Result<Report> {
    let id = catalog
        .store
        .find_callable(&args.callable)
        .with_context(|| format!("unknown callable `{}`", args.callable))?;
    let types = parse_all(&mut catalog.store, &args.types)?;

    let store = &catalog.store;
    let signature = store
        .callable(id)
        .with_context(|| format!("callable `{}` has no signature", args.callable))?;
    let declared = signature.params.len();
    if types.len() < declared || types.len() > declared + 1 {
        bail!(
            "`{}` takes {declared} argument type(s) and an optional result type, got {}",
            args.callable,
            types.len()
        );
    }

    let options = InferenceOptions {
        skip_constraint_check: args.skip_constraints || catalog.options.skip_constraint_check,
        bootstrap_from_constraints: args.bootstrap || catalog.options.bootstrap_from_constraints,
    };
    debug!(
        callable = %args.callable,
        arguments = types.len(),
        ?options,
        "running inference"
    );

    let mut context = InferenceContext::new(store, signature);
    if args.bounds {
        return Ok(match context.collect_bounds(&types) {
            Ok(()) => {
                let bounds = context.bounds();
                let lines = bounds
                    .type_params
                    .iter()
                    .zip(&bounds.bounds)
                    .map(|(&param, set)| format!("{}: {}", store.type_name(param), set.display(store)))
                    .collect();
                Report {
                    lines,
                    status: Status::Collected,
                }
            }
            Err(failure) => Report::new(Status::Failed(failure)),
        });
    }

    Ok(match context.infer(&types, options) {
        Ok(inferred) => Report {
            lines: signature
                .type_params
                .iter()
                .zip(&inferred)
                .map(|(&param, &ty)| format!("{} = {}", store.type_name(param), store.type_name(ty)))
                .collect(),
            status: Status::Inferred,
        },
        Err(failure) => Report::new(Status::Failed(failure)),
    })
}

// =============================================================================
// check
// =============================================================================

/// Load the catalog named by `args` and check constraints.
pub fn check(args: &CheckArgs) -> Result<Report> {
    let mut catalog = load_catalog(&args.catalog)?;
    check_in(&mut catalog, &args.declaration, &args.types)
}

/// Check `types` against the constraints of a callable or generic type.
///
/// A callable of the given name takes precedence over a type.
pub fn check_in(catalog: &mut LoadedCatalog, declaration: &str, types: &[String]) -> Result<Report> {
    let args = parse_all(&mut catalog.store, types)?;
    let store = &catalog.store;

    let satisfied = match store.find_callable(declaration) {
        Some(id) => {
            let signature = store
                .callable(id)
                .with_context(|| format!("callable `{declaration}` has no signature"))?;
            satisfies_constraints(store, Declaration::Callable(signature), &args)
        }
        None => {
            let ty = store
                .lookup(declaration)
                .with_context(|| format!("unknown declaration `{declaration}`"))?;
            satisfies_constraints(store, Declaration::Type(ty), &args)
        }
    };

    let names: Vec<&str> = args.iter().map(|&ty| store.type_name(ty)).collect();
    Ok(Report {
        lines: vec![format!("{declaration}<{}>", names.join(", "))],
        status: if satisfied {
            Status::Satisfied
        } else {
            Status::Violated
        },
    })
}

fn parse_all(store: &mut TypeStore, texts: &[String]) -> Result<Vec<TypeId>> {
    texts
        .iter()
        .map(|text| parse_type(store, text, &[]))
        .collect()
}

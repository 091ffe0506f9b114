use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the genbind binary.
#[derive(Parser, Debug)]
#[command(
    name = "genbind",
    version,
    about = "Infer and check generic type arguments against a type catalog"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Infer the type arguments of a generic callable from argument types.
    Infer(InferArgs),
    /// Check type arguments against a generic declaration's constraints.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Path to the JSON type catalog.
    #[arg(long)]
    pub catalog: PathBuf,

    /// Name of the generic callable.
    #[arg(long)]
    pub callable: String,

    /// Argument types, one per declared parameter, optionally followed by
    /// the expected result type.
    #[arg(value_name = "TYPE")]
    pub types: Vec<String>,

    /// Accept inferred types without checking the callable's constraints.
    #[arg(long = "skip-constraints")]
    pub skip_constraints: bool,

    /// Use constraints to fix parameters the arguments leave unbound.
    #[arg(long)]
    pub bootstrap: bool,

    /// Print the collected bound sets instead of fixing them.
    #[arg(long)]
    pub bounds: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the JSON type catalog.
    #[arg(long)]
    pub catalog: PathBuf,

    /// Name of a generic type or callable.
    #[arg(long)]
    pub declaration: String,

    /// Candidate type arguments in declaration order.
    #[arg(value_name = "TYPE")]
    pub types: Vec<String>,
}

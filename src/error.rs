//! Error types for the reaction engine

use thiserror::Error;

/// A reaction step or ledger update hit an inconsistent state.
///
/// These are bugs in the caller or the catalog, not outcomes of a normal
/// simulation; a container that simply has nothing left to react reports
/// `StepOutcome::NoReaction` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionError {
    #[error("cannot remove {requested} {name}: only {available} present")]
    Overdrawn {
        name: String,
        available: u64,
        requested: u64,
    },

    #[error("cannot remove {name}: not present in the container")]
    Missing { name: String },

    #[error("recipe '{recipe}' has no reagents in the container to compute a ratio from")]
    EmptyRatio { recipe: String },

    #[error("recipe '{recipe}' was selected but the container cannot supply a single batch")]
    ZeroRatio { recipe: String },

    #[error("recipe '{recipe}' matched but none of its components are in the container")]
    Unanchored { recipe: String },

    #[error("amount of {name} does not fit in 64 bits")]
    Overflow { name: String },
}

/// Rejected recipe definition while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("recipe '{0}' is already defined")]
    Duplicate(String),

    #[error("composite recipe '{0}' has no components")]
    EmptyComposite(String),

    #[error("composite recipe '{0}' must produce a positive amount")]
    ZeroOutput(String),

    #[error("component '{component}' of recipe '{recipe}' must have a positive amount")]
    ZeroAmount { recipe: String, component: String },

    #[error(transparent)]
    Amount(#[from] ReactionError),
}

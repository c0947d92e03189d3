//! Minuta Signatory — who signs for the provider side of a contract.
//!
//! A company record names its billing providers in free text. Each name is
//! matched against the static provider registry and the results are rendered
//! into the lettered "a) …; b) …; e c) …" clause of the contract.

pub mod clause;
pub mod registry;
pub mod resolver;
pub mod similarity;

pub use clause::{Signatory, SignatoryClause, SignatoryClauseBuilder};
pub use registry::{ProviderEntry, DEFAULT_REGISTRY};
pub use resolver::CompanyResolver;

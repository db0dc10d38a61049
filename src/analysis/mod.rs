//! Read-only analysis over subjects and the host dependency index.

pub mod dependencies;
pub mod functions;
pub mod references;

pub use dependencies::{analyze_dependencies, DependencySet};
pub use functions::{list_functions, FunctionInfo, FunctionListing, FunctionType};
pub use references::{
    find_references, verify_no_external_references, ExternalReferenceReport, ReferenceLocation,
    ReferenceQuery, Referencer, ReferencerKind, RemainingReference,
};

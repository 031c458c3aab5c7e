//! Category model and wire types shared by every apibreak crate.
//!
//! Profile declarations are read from disk and activation reports are written to it. Their
//! field names are part of the file format; new fields go in as optional.

pub mod activation;
pub mod category;
pub mod definition;
pub mod endpoint;
pub mod profile;
pub mod violation;

pub use activation::{
    ActivationMode, ActivationReport, ActivationSummary, EndpointActivation, ToolInfo,
};
pub use category::{CATEGORY_TABLE, Category, CategoryInfo};
pub use definition::{
    Definition, DefinitionError, FieldRenameDef, RequiredFieldDef, ResponseStructureDef,
    StatusCodeDef,
};
pub use endpoint::{EndpointKey, EndpointKeyError, HttpMethod, PathTemplate};
pub use profile::{EndpointBreakingProfile, ProfileDecl, ProfileDiagnostic};
pub use violation::ContractViolation;

/// Schema identifiers.
pub mod schema {
    pub const APIBREAK_ACTIVATION_V1: &str = "apibreak.activation.v1";
}

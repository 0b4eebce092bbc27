//! Workload template engine
//!
//! This crate provides the core functionality for:
//! - Editing the nested workload form tree by field path
//! - Keeping dynamic arrays in sync with their count fields
//! - Tri-state field validation
//! - Submit-time resource request derivation
//! - Registration envelope and template document encoding
//! - The preloaded template catalog

pub mod catalog;
pub mod codec;
pub mod derive;
pub mod error;
pub mod form;
pub mod models;
pub mod observability;
pub mod path;
pub mod randomize;
pub mod sync;
pub mod validation;

pub use catalog::TemplateCatalog;
pub use codec::{
    RegistrationEnvelope, RegistrationTransport, TemplateDocument, TemplateResponse,
    WorkloadRegistrationRequest,
};
pub use error::{Result, TemplateError};
pub use form::{FieldValue, FormStore, SubscriptionId};
pub use models::*;
pub use observability::StructuredLogger;
pub use path::{ArrayPath, FieldPath};
pub use validation::{ValidationReport, Validity};

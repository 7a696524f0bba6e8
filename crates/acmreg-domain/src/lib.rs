//! ACM Register Domain Layer
//!
//! This crate contains the core data model for the ACM (Asbestos
//! Containing Material) extraction pipeline. It stays dependency-light
//! and defines the record schema, field enumerations, validation rules,
//! and trait interfaces that the pipeline and provider layers depend on.
//!
//! ## Key Concepts
//!
//! - **AcmRecord**: one physical item of (possible) asbestos-containing
//!   material, located within a School > Building > Room hierarchy
//! - **Confidence**: the extraction confidence tier (low/medium/high)
//!   attached to every extracted record
//! - **BuildingRoomContext**: the currently-active location, carried
//!   across document chunks so item rows inherit the right hierarchy
//! - **Validation**: required-field and range invariants enforced at
//!   the point a record is assembled, never downstream
//!
//! ## Architecture
//!
//! - No heavyweight external dependencies
//! - Pure data + invariant enforcement only
//! - Model-provider implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod context;
pub mod fields;
pub mod record;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use confidence::Confidence;
pub use context::BuildingRoomContext;
pub use fields::{AreaType, Friable, RiskStatus};
pub use record::{AcmRecord, RecordId};
pub use traits::{ModelProvider, ProviderFailure};
pub use validation::{RecordDraft, ValidationError};

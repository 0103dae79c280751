//! Canonical domain model for the PermitFlow permit-to-work core.
//!
//! This crate is the single source of truth for:
//! - the permit record and its embedded sub-documents (`types`, `annexes`)
//! - the static hazard/verification/PPE catalogs (`catalog`)
//! - the shared error taxonomy (`error`)
//!
//! Field names and nesting are a stored-document contract: serde renames
//! pin the canonical (second-generation) wire shape. Legacy documents are
//! rewritten at the persistence boundary, never here.

pub mod annexes;
pub mod catalog;
pub mod error;
pub mod types;

pub use annexes::{
    AnexoAltura, AnexoConfinado, AnexoEnergias, AnexoExcavaciones, AnexoIzaje, PruebaGases,
    SistemaElectrico, ValidacionDiaria,
};
pub use error::{PermitError, Result};
pub use types::{
    AdditionalHazard, Approval, ApprovalRole, ApprovalState, Aptitude, Closure, ClosureSignature,
    GeneralInfo, HazardAnalysis, Identity, Permit, PermitId, PermitNumber, PermitStatus, PpeValue,
    SignatureBlob, SocialSecurity, Training, Tristate, UserRole, WorkTypes, WorkerDetail,
};

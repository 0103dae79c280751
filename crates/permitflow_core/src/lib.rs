//! PermitFlow core: the permit approval state machine and its
//! signature/validation invariants.
//!
//! The presentation layer calls [`PermitService`] and nothing else; every
//! permission decision (who may sign what, which status transition is
//! legal) lives behind `can_sign` and the transition gates, never in UI
//! conditionals.
//!
//! # Modules
//!
//! - `lifecycle` - the status transition table and its gates
//! - `ledger` - approval, worker and closure signature decisions
//! - `create` - wizard-output validation and permit construction
//! - `query` - role-scoped visibility and search filters
//! - `service` - orchestration over the store gateway

pub mod create;
pub mod ledger;
pub mod lifecycle;
pub mod query;
pub mod service;

pub use create::{validate_draft, PermitDraft, WorkerDraft};
pub use ledger::{ClosureParty, SignDecision, WorkerSignatureKind};
pub use query::PermitFilter;
pub use service::PermitService;

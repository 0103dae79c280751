//! Targeted field-path updates.
//!
//! Each variant touches exactly one dotted path of the stored document.
//! Two concurrent signings of *different* roles write disjoint paths
//! (`approvals.<role>`, `workers[i].firmaCierre`, `closure.<field>`) and
//! therefore do not race; two writes to the *same* path last-write-win.

use serde::{Deserialize, Serialize};
use std::fmt;

use permitflow_protocol::{
    Approval, ApprovalRole, Closure, ClosureSignature, Permit, PermitError, PermitStatus, Result,
    SignatureBlob,
};

/// One mergeable update to a permit document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PermitPatch {
    /// `status`
    Status { status: PermitStatus },
    /// `rejectionReason`
    RejectionReason { reason: String },
    /// `suspensionReason`
    SuspensionReason { reason: Option<String> },
    /// `approvals.<role>` - merge key is the role name; sibling roles stay
    /// untouched
    Approval {
        role: ApprovalRole,
        approval: Approval,
    },
    /// `workers[<index>].firmaApertura`
    WorkerFirmaApertura {
        index: usize,
        firma: SignatureBlob,
    },
    /// `workers[<index>].firmaCierre`
    WorkerFirmaCierre {
        index: usize,
        firma: SignatureBlob,
    },
    /// `closure.responsable`
    ClosureResponsable { firma: ClosureSignature },
    /// `closure.autoridad`
    ClosureAutoridad { firma: ClosureSignature },
    /// `closure.observacionesCierre`
    ClosureObservaciones { observaciones: String },
}

impl PermitPatch {
    /// Dotted path this patch writes, for logging and audit.
    pub fn field_path(&self) -> String {
        match self {
            PermitPatch::Status { .. } => "status".to_string(),
            PermitPatch::RejectionReason { .. } => "rejectionReason".to_string(),
            PermitPatch::SuspensionReason { .. } => "suspensionReason".to_string(),
            PermitPatch::Approval { role, .. } => format!("approvals.{}", role),
            PermitPatch::WorkerFirmaApertura { index, .. } => {
                format!("workers[{}].firmaApertura", index)
            }
            PermitPatch::WorkerFirmaCierre { index, .. } => {
                format!("workers[{}].firmaCierre", index)
            }
            PermitPatch::ClosureResponsable { .. } => "closure.responsable".to_string(),
            PermitPatch::ClosureAutoridad { .. } => "closure.autoridad".to_string(),
            PermitPatch::ClosureObservaciones { .. } => "closure.observacionesCierre".to_string(),
        }
    }

    /// Merge this patch into the document, leaving every sibling path
    /// untouched.
    pub fn apply(&self, permit: &mut Permit) -> Result<()> {
        match self {
            PermitPatch::Status { status } => {
                permit.status = *status;
            }
            PermitPatch::RejectionReason { reason } => {
                permit.rejection_reason = Some(reason.clone());
            }
            PermitPatch::SuspensionReason { reason } => {
                permit.suspension_reason = reason.clone();
            }
            PermitPatch::Approval { role, approval } => {
                permit.approvals.insert(*role, approval.clone());
            }
            PermitPatch::WorkerFirmaApertura { index, firma } => {
                let worker = permit.workers.get_mut(*index).ok_or_else(|| {
                    PermitError::not_found(format!("worker index {} out of range", index))
                })?;
                worker.firma_apertura = Some(firma.clone());
            }
            PermitPatch::WorkerFirmaCierre { index, firma } => {
                let worker = permit.workers.get_mut(*index).ok_or_else(|| {
                    PermitError::not_found(format!("worker index {} out of range", index))
                })?;
                worker.firma_cierre = Some(firma.clone());
            }
            PermitPatch::ClosureResponsable { firma } => {
                permit
                    .closure
                    .get_or_insert_with(Closure::default)
                    .responsable = Some(firma.clone());
            }
            PermitPatch::ClosureAutoridad { firma } => {
                permit.closure.get_or_insert_with(Closure::default).autoridad = Some(firma.clone());
            }
            PermitPatch::ClosureObservaciones { observaciones } => {
                permit
                    .closure
                    .get_or_insert_with(Closure::default)
                    .observaciones_cierre = Some(observaciones.clone());
            }
        }
        Ok(())
    }
}

/// `Display` renders the written path; patch payloads are not for logs.
impl fmt::Display for PermitPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_path())
    }
}

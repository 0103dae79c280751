//! Approval / signature ledger.
//!
//! Decides, for a given (permit, actor, current approvals), whether a
//! signing action is currently permitted, and builds the targeted patch
//! that applies it. Every denial is produced *before* any write: signing is
//! idempotent-guarded, not best-effort.
//!
//! Ordering rules:
//! - `solicitante` signs first; no other approval role may sign before it
//! - `mantenimiento` only participates when energy-control work is flagged,
//!   `lider_sst` only when the SST flag is set
//! - `closure.autoridad` is gated on `closure.responsable`
//! - a worker's closing signature only while en_ejecucion or suspendido

use tracing::warn;

use permitflow_protocol::{
    Approval, ApprovalRole, ClosureSignature, Identity, Permit, PermitError, PermitStatus, Result,
    SignatureBlob,
};
use permitflow_store::PermitPatch;

/// Outcome of a `can_sign` check. `reason` is present iff not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl SignDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// Turn a denial into the error the caller surfaces.
    pub fn into_result(self) -> Result<()> {
        if self.allowed {
            Ok(())
        } else {
            Err(PermitError::permission_denied(
                self.reason.unwrap_or_else(|| "not allowed".to_string()),
            ))
        }
    }
}

/// Which of the two independent worker signature slots an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSignatureKind {
    Apertura,
    Cierre,
}

/// Whether `actor` may currently sign the `role` slot of `permit`.
pub fn can_sign(permit: &Permit, role: ApprovalRole, actor: &Identity) -> SignDecision {
    if permit.status.blocks_signing() {
        return SignDecision::denied(format!("permiso {}", permit.status));
    }
    if permit.is_signed(role) {
        return SignDecision::denied("ya firmado");
    }
    if !permit.requires_role(role) {
        return SignDecision::denied(format!(
            "la firma de {} no aplica a este permiso",
            role
        ));
    }

    match role {
        ApprovalRole::Solicitante => {
            if permit.created_by != actor.id && !actor.is_admin() {
                return SignDecision::denied("solo el creador puede firmar");
            }
        }
        ApprovalRole::Autorizante | ApprovalRole::Mantenimiento | ApprovalRole::LiderSst => {
            if actor.role != role.matching_user_role() && !actor.is_admin() {
                return SignDecision::denied(format!("rol requerido: {}", role));
            }
            if !permit.is_signed(ApprovalRole::Solicitante) {
                return SignDecision::denied("falta firma del solicitante");
            }
        }
    }
    SignDecision::allowed()
}

/// Validate and build the `approvals.<role>` patch for a signing action.
pub fn sign(
    permit: &Permit,
    role: ApprovalRole,
    signature: SignatureBlob,
    actor: &Identity,
) -> Result<PermitPatch> {
    let decision = can_sign(permit, role, actor);
    if !decision.allowed {
        warn!(
            permit_id = %permit.id,
            %role,
            actor = %actor.id,
            reason = decision.reason.as_deref().unwrap_or(""),
            "signing denied"
        );
        decision.into_result()?;
    }
    Ok(PermitPatch::Approval {
        role,
        approval: Approval::signed_by(actor, signature),
    })
}

/// Validate and build a rejection entry for the `role` slot. Rejecting uses
/// the same gate as signing (an actor who could not sign cannot reject).
pub fn reject_approval(
    permit: &Permit,
    role: ApprovalRole,
    reason: &str,
    actor: &Identity,
) -> Result<PermitPatch> {
    can_sign(permit, role, actor).into_result()?;
    if reason.trim().is_empty() {
        return Err(PermitError::validation("rejection requires an explicit reason"));
    }
    Ok(PermitPatch::Approval {
        role,
        approval: Approval::rejected_by(actor, reason),
    })
}

/// Validate and build a worker apertura/cierre signature patch. Each action
/// sets exactly one slot on exactly one roster entry.
pub fn sign_worker(
    permit: &Permit,
    index: usize,
    kind: WorkerSignatureKind,
    firma: SignatureBlob,
) -> Result<PermitPatch> {
    let worker = permit
        .workers
        .get(index)
        .ok_or_else(|| PermitError::not_found(format!("worker index {} out of range", index)))?;

    match kind {
        WorkerSignatureKind::Apertura => {
            if permit.status.is_terminal() || permit.status == PermitStatus::Suspendido {
                return Err(PermitError::permission_denied(format!(
                    "permiso {}",
                    permit.status
                )));
            }
            if worker.firma_apertura.is_some() {
                return Err(PermitError::permission_denied("ya firmado"));
            }
            Ok(PermitPatch::WorkerFirmaApertura { index, firma })
        }
        WorkerSignatureKind::Cierre => {
            if !matches!(
                permit.status,
                PermitStatus::EnEjecucion | PermitStatus::Suspendido
            ) {
                return Err(PermitError::permission_denied(format!(
                    "la firma de cierre solo aplica en ejecucion o suspendido (permiso {})",
                    permit.status
                )));
            }
            if worker.firma_cierre.is_some() {
                return Err(PermitError::permission_denied("ya firmado"));
            }
            Ok(PermitPatch::WorkerFirmaCierre { index, firma })
        }
    }
}

/// Which closure slot a closing signature targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureParty {
    Responsable,
    Autoridad,
}

/// Validate and build the closing-observations patch. Observations are
/// written while the closure is being collected, alongside the two
/// signatures; they may be revised until the permit is closed.
pub fn closure_observations(permit: &Permit, observaciones: &str) -> Result<PermitPatch> {
    if permit.status != PermitStatus::EnEjecucion {
        return Err(PermitError::permission_denied(format!(
            "las observaciones de cierre solo aplican en ejecucion (permiso {})",
            permit.status
        )));
    }
    let observaciones = observaciones.trim();
    if observaciones.is_empty() {
        return Err(PermitError::validation(
            "las observaciones de cierre no pueden estar vacias",
        ));
    }
    Ok(PermitPatch::ClosureObservaciones {
        observaciones: observaciones.to_string(),
    })
}

/// Validate and build one of the two closure signature patches.
/// `autoridad` cannot be signed before `responsable`.
pub fn sign_closure(
    permit: &Permit,
    party: ClosureParty,
    actor: &Identity,
    firma: SignatureBlob,
) -> Result<PermitPatch> {
    if permit.status != PermitStatus::EnEjecucion {
        return Err(PermitError::permission_denied(format!(
            "las firmas de cierre solo aplican en ejecucion (permiso {})",
            permit.status
        )));
    }
    let closure = permit.closure.as_ref();
    match party {
        ClosureParty::Responsable => {
            if closure.and_then(|c| c.responsable.as_ref()).is_some() {
                return Err(PermitError::permission_denied("ya firmado"));
            }
            Ok(PermitPatch::ClosureResponsable {
                firma: ClosureSignature::by(actor, firma),
            })
        }
        ClosureParty::Autoridad => {
            if closure.and_then(|c| c.responsable.as_ref()).is_none() {
                return Err(PermitError::precondition(
                    "falta firma de cierre del responsable",
                ));
            }
            if closure.and_then(|c| c.autoridad.as_ref()).is_some() {
                return Err(PermitError::permission_denied("ya firmado"));
            }
            Ok(PermitPatch::ClosureAutoridad {
                firma: ClosureSignature::by(actor, firma),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::tests::{identity, signed_permit};
    use permitflow_protocol::UserRole;

    fn blob() -> SignatureBlob {
        SignatureBlob::new("data:image/png;base64,Zg==")
    }

    #[test]
    fn test_solicitante_only_creator_or_admin() {
        let permit = signed_permit(&[]);

        let mut stranger = identity(UserRole::Solicitante);
        stranger.id = "u99".to_string();
        let decision = can_sign(&permit, ApprovalRole::Solicitante, &stranger);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("solo el creador puede firmar"));

        assert!(can_sign(&permit, ApprovalRole::Solicitante, &identity(UserRole::Solicitante)).allowed);
        assert!(can_sign(&permit, ApprovalRole::Solicitante, &identity(UserRole::Admin)).allowed);
    }

    #[test]
    fn test_authorizers_blocked_until_solicitante_signs() {
        let permit = signed_permit(&[]);
        for role in [
            ApprovalRole::Autorizante,
            ApprovalRole::Mantenimiento,
            ApprovalRole::LiderSst,
        ] {
            // the fixture only requires solicitante + autorizante
            if !permit.requires_role(role) {
                continue;
            }
            let actor = identity(role.matching_user_role());
            let decision = can_sign(&permit, role, &actor);
            assert!(!decision.allowed, "{} should be blocked", role);
            assert_eq!(decision.reason.as_deref(), Some("falta firma del solicitante"));
        }

        let permit = signed_permit(&[ApprovalRole::Solicitante]);
        let decision = can_sign(&permit, ApprovalRole::Autorizante, &identity(UserRole::Autorizante));
        assert!(decision.allowed);
    }

    #[test]
    fn test_no_double_signing() {
        let permit = signed_permit(&[ApprovalRole::Solicitante]);
        let decision = can_sign(&permit, ApprovalRole::Solicitante, &identity(UserRole::Solicitante));
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("ya firmado"));
    }

    #[test]
    fn test_wrong_role_denied() {
        let permit = signed_permit(&[ApprovalRole::Solicitante]);
        let decision = can_sign(&permit, ApprovalRole::Autorizante, &identity(UserRole::LiderSst));
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("rol requerido: autorizante"));
    }

    #[test]
    fn test_status_blocks_signing() {
        let mut permit = signed_permit(&[]);
        for status in [
            PermitStatus::Suspendido,
            PermitStatus::Cerrado,
            PermitStatus::Rechazado,
        ] {
            permit.status = status;
            let decision =
                can_sign(&permit, ApprovalRole::Solicitante, &identity(UserRole::Solicitante));
            assert!(!decision.allowed);
            assert!(decision.reason.unwrap().contains(status.as_str()));
        }
    }

    #[test]
    fn test_irrelevant_role_denied() {
        // signed_permit has no energia flag and no SST flag
        let permit = signed_permit(&[ApprovalRole::Solicitante]);
        let decision =
            can_sign(&permit, ApprovalRole::Mantenimiento, &identity(UserRole::Mantenimiento));
        assert!(!decision.allowed);
    }

    #[test]
    fn test_sign_builds_targeted_patch() {
        let permit = signed_permit(&[ApprovalRole::Solicitante]);
        let patch = sign(
            &permit,
            ApprovalRole::Autorizante,
            blob(),
            &identity(UserRole::Autorizante),
        )
        .unwrap();
        assert_eq!(patch.field_path(), "approvals.autorizante");
    }

    #[test]
    fn test_worker_cierre_status_gate() {
        let mut permit = signed_permit(&[]);
        let err = sign_worker(&permit, 0, WorkerSignatureKind::Cierre, blob()).unwrap_err();
        assert!(matches!(err, PermitError::PermissionDenied(_)));

        permit.status = PermitStatus::EnEjecucion;
        let patch = sign_worker(&permit, 0, WorkerSignatureKind::Cierre, blob()).unwrap();
        assert_eq!(patch.field_path(), "workers[0].firmaCierre");

        permit.status = PermitStatus::Suspendido;
        sign_worker(&permit, 0, WorkerSignatureKind::Cierre, blob()).unwrap();
    }

    #[test]
    fn test_worker_apertura_already_signed() {
        // Creation guarantees every rostered worker signed apertura.
        let permit = signed_permit(&[]);
        let err = sign_worker(&permit, 0, WorkerSignatureKind::Apertura, blob()).unwrap_err();
        assert!(matches!(err, PermitError::PermissionDenied(_)));
    }

    #[test]
    fn test_closure_observations_gated_and_trimmed() {
        let mut permit = signed_permit(&[]);
        let err = closure_observations(&permit, "sin novedad").unwrap_err();
        assert!(matches!(err, PermitError::PermissionDenied(_)));

        permit.status = PermitStatus::EnEjecucion;
        let err = closure_observations(&permit, "   ").unwrap_err();
        assert!(matches!(err, PermitError::Validation(_)));

        let patch = closure_observations(&permit, "  area entregada limpia  ").unwrap();
        assert_eq!(patch.field_path(), "closure.observacionesCierre");
        patch.apply(&mut permit).unwrap();
        assert_eq!(
            permit.closure.unwrap().observaciones_cierre.as_deref(),
            Some("area entregada limpia")
        );
    }

    #[test]
    fn test_closure_ordering() {
        let mut permit = signed_permit(&[]);
        permit.status = PermitStatus::EnEjecucion;

        let err = sign_closure(
            &permit,
            ClosureParty::Autoridad,
            &identity(UserRole::Autorizante),
            blob(),
        )
        .unwrap_err();
        assert!(matches!(err, PermitError::PreconditionNotMet(_)));

        let patch = sign_closure(
            &permit,
            ClosureParty::Responsable,
            &identity(UserRole::Solicitante),
            blob(),
        )
        .unwrap();
        patch.apply(&mut permit).unwrap();

        let patch = sign_closure(
            &permit,
            ClosureParty::Autoridad,
            &identity(UserRole::Autorizante),
            blob(),
        )
        .unwrap();
        assert_eq!(patch.field_path(), "closure.autoridad");
    }
}

//! Permit lifecycle state machine.
//!
//! Status is monotonic along the defined graph; an edge missing from the
//! table does not exist, and each defined edge carries a gate. A failed
//! gate returns the specific unmet requirement - a transition never
//! silently no-ops or partially applies.
//!
//! ```text
//! pendiente_revision ──► aprobado ──► en_ejecucion ──► cerrado
//!         │                              ▲    │
//!         ▼                              │    ▼
//!     rechazado                       suspendido
//! ```

use tracing::warn;

use permitflow_protocol::{Identity, Permit, PermitError, PermitStatus, Result};

/// Whether the edge `from -> to` exists at all, ignoring gates.
pub fn transition_defined(from: PermitStatus, to: PermitStatus) -> bool {
    use PermitStatus::*;
    matches!(
        (from, to),
        (PendienteRevision, Aprobado)
            | (PendienteRevision, Rechazado)
            | (Aprobado, EnEjecucion)
            | (EnEjecucion, Suspendido)
            | (Suspendido, EnEjecucion)
            | (EnEjecucion, Cerrado)
    )
}

/// Check the gate for `permit.status -> to` acted by `actor`.
///
/// `reason` is the rejection/suspension reason supplied by the caller; it
/// is only consulted by the edges that require or recommend one. Status
/// changes re-validate nothing but the gate - in particular the date
/// window is a creation-time invariant and is not re-checked here.
pub fn check_transition(
    permit: &Permit,
    to: PermitStatus,
    actor: &Identity,
    reason: Option<&str>,
) -> Result<()> {
    let from = permit.status;
    if !transition_defined(from, to) {
        warn!(permit_id = %permit.id, %from, %to, "undefined transition attempted");
        return Err(PermitError::precondition(format!(
            "no transition from '{}' to '{}'",
            from, to
        )));
    }

    use PermitStatus::*;
    match (from, to) {
        (PendienteRevision, Aprobado) => {
            let missing = permit.missing_signatures();
            if let Some(role) = missing.first() {
                return Err(PermitError::precondition(format!(
                    "falta firma de {}",
                    role
                )));
            }
            Ok(())
        }
        (PendienteRevision, Rechazado) => {
            if !actor.role.is_authorizer_class() {
                return Err(PermitError::permission_denied(format!(
                    "role '{}' may not reject a permit",
                    actor.role
                )));
            }
            if reason.map(str::trim).filter(|r| !r.is_empty()).is_none() {
                return Err(PermitError::validation("rejection requires an explicit reason"));
            }
            Ok(())
        }
        (Aprobado, EnEjecucion) => {
            if permit.created_by != actor.id && !actor.is_admin() {
                return Err(PermitError::permission_denied(
                    "only the requester or an admin may start execution",
                ));
            }
            Ok(())
        }
        (EnEjecucion, Suspendido) => {
            // Free-text reason recommended but not required.
            if !actor.role.is_authorizer_class() {
                return Err(PermitError::permission_denied(format!(
                    "role '{}' may not suspend a permit",
                    actor.role
                )));
            }
            Ok(())
        }
        (Suspendido, EnEjecucion) => {
            if !actor.role.is_authorizer_class() {
                return Err(PermitError::permission_denied(format!(
                    "role '{}' may not resume a permit",
                    actor.role
                )));
            }
            Ok(())
        }
        (EnEjecucion, Cerrado) => {
            let closure = permit.closure.as_ref();
            if closure.and_then(|c| c.responsable.as_ref()).is_none() {
                return Err(PermitError::precondition(
                    "falta firma de cierre del responsable",
                ));
            }
            if closure.and_then(|c| c.autoridad.as_ref()).is_none() {
                return Err(PermitError::precondition(
                    "falta firma de cierre de la autoridad",
                ));
            }
            Ok(())
        }
        _ => unreachable!("transition_defined covered all edges"),
    }
}

//! Orchestration over the store gateway.
//!
//! [`PermitService`] is the single permission-decision point the
//! presentation layer talks to. Every mutating operation re-reads the
//! stored snapshot before deciding (the caller's copy may be stale),
//! runs the relevant gate, then applies one targeted patch set.

use tracing::{debug, info};

use permitflow_protocol::{
    ApprovalRole, Permit, PermitError, PermitId, PermitStatus, Result, SignatureBlob,
};
use permitflow_store::{Observer, PermitPatch, PermitStore, Session, Subscription};

use crate::create::PermitDraft;
use crate::ledger::{self, ClosureParty, SignDecision, WorkerSignatureKind};
use crate::lifecycle;
use crate::query::{self, PermitFilter};

pub struct PermitService<S: PermitStore> {
    store: S,
}

impl<S: PermitStore> PermitService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and persist a new permit, recording the requester's
    /// solicitante approval as part of the same submission. Two underlying
    /// writes: the document, then the approval patch.
    pub fn create_permit(
        &self,
        draft: PermitDraft,
        firma: SignatureBlob,
        session: &Session,
    ) -> Result<Permit> {
        let requester = session.identity();
        let permit = draft.into_permit(requester)?;
        let number = permit.number.clone();

        let id = self.store.create(permit)?;
        info!(permit_id = %id, number = number.as_str(), requester = %requester.id, "permit created");

        let snapshot = self.fetch(&id)?;
        let patch = ledger::sign(&snapshot, ApprovalRole::Solicitante, firma, requester)?;
        self.store.update(&id, &[patch])?;
        self.fetch(&id)
    }

    pub fn get_permit(&self, id: &PermitId) -> Result<Permit> {
        self.fetch(id)
    }

    /// Permits visible to the session's identity, newest first, with the
    /// filter applied over the scoped list.
    pub fn list_permits(&self, session: &Session, filter: &PermitFilter) -> Result<Vec<Permit>> {
        let scoped = query::scope_list(self.store.list()?, session.identity());
        Ok(filter.apply(&scoped))
    }

    /// Whether the session's identity could sign `role` right now. Purely
    /// advisory for the UI; `sign` re-checks against a fresh snapshot.
    pub fn can_sign(
        &self,
        id: &PermitId,
        role: ApprovalRole,
        session: &Session,
    ) -> Result<SignDecision> {
        let permit = self.fetch(id)?;
        Ok(ledger::can_sign(&permit, role, session.identity()))
    }

    pub fn sign(
        &self,
        id: &PermitId,
        role: ApprovalRole,
        firma: SignatureBlob,
        session: &Session,
    ) -> Result<Permit> {
        let permit = self.fetch(id)?;
        let patch = ledger::sign(&permit, role, firma, session.identity())?;
        info!(permit_id = %id, %role, actor = %session.identity().id, "approval signed");
        self.store.update(id, &[patch])
    }

    /// Record a `rechazado` entry in the `role` approval slot with the
    /// given comments. This does not change the permit status; `reject`
    /// does that.
    pub fn reject_approval(
        &self,
        id: &PermitId,
        role: ApprovalRole,
        reason: &str,
        session: &Session,
    ) -> Result<Permit> {
        let permit = self.fetch(id)?;
        let patch = ledger::reject_approval(&permit, role, reason, session.identity())?;
        info!(permit_id = %id, %role, actor = %session.identity().id, "approval rejected");
        self.store.update(id, &[patch])
    }

    pub fn sign_worker(
        &self,
        id: &PermitId,
        index: usize,
        kind: WorkerSignatureKind,
        firma: SignatureBlob,
        session: &Session,
    ) -> Result<Permit> {
        let permit = self.fetch(id)?;
        let patch = ledger::sign_worker(&permit, index, kind, firma)?;
        debug!(permit_id = %id, path = %patch, actor = %session.identity().id, "worker signature");
        self.store.update(id, &[patch])
    }

    pub fn sign_closure(
        &self,
        id: &PermitId,
        party: ClosureParty,
        firma: SignatureBlob,
        session: &Session,
    ) -> Result<Permit> {
        let permit = self.fetch(id)?;
        let patch = ledger::sign_closure(&permit, party, session.identity(), firma)?;
        debug!(permit_id = %id, path = %patch, actor = %session.identity().id, "closure signature");
        self.store.update(id, &[patch])
    }

    /// Record or revise the closing observations while the closure is
    /// being collected.
    pub fn set_closure_observations(
        &self,
        id: &PermitId,
        observaciones: &str,
        session: &Session,
    ) -> Result<Permit> {
        let permit = self.fetch(id)?;
        let patch = ledger::closure_observations(&permit, observaciones)?;
        debug!(permit_id = %id, path = %patch, actor = %session.identity().id, "closure observations");
        self.store.update(id, &[patch])
    }

    /// Run the transition gate against a fresh snapshot, then apply the
    /// status change plus the reason bookkeeping the target status needs.
    pub fn change_status(
        &self,
        id: &PermitId,
        to: PermitStatus,
        reason: Option<&str>,
        session: &Session,
    ) -> Result<Permit> {
        let permit = self.fetch(id)?;
        let actor = session.identity();
        lifecycle::check_transition(&permit, to, actor, reason)?;

        let mut patches = vec![PermitPatch::Status { status: to }];
        match to {
            PermitStatus::Rechazado => {
                // the gate guarantees a non-empty reason here
                patches.push(PermitPatch::RejectionReason {
                    reason: reason.unwrap_or_default().trim().to_string(),
                });
            }
            PermitStatus::Suspendido => {
                patches.push(PermitPatch::SuspensionReason {
                    reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
                });
            }
            PermitStatus::EnEjecucion if permit.status == PermitStatus::Suspendido => {
                patches.push(PermitPatch::SuspensionReason { reason: None });
            }
            _ => {}
        }
        info!(permit_id = %id, from = %permit.status, %to, actor = %actor.id, "status change");
        self.store.update(id, &patches)
    }

    pub fn approve(&self, id: &PermitId, session: &Session) -> Result<Permit> {
        self.change_status(id, PermitStatus::Aprobado, None, session)
    }

    pub fn reject(&self, id: &PermitId, reason: &str, session: &Session) -> Result<Permit> {
        self.change_status(id, PermitStatus::Rechazado, Some(reason), session)
    }

    pub fn start_execution(&self, id: &PermitId, session: &Session) -> Result<Permit> {
        self.change_status(id, PermitStatus::EnEjecucion, None, session)
    }

    pub fn suspend(
        &self,
        id: &PermitId,
        reason: Option<&str>,
        session: &Session,
    ) -> Result<Permit> {
        self.change_status(id, PermitStatus::Suspendido, reason, session)
    }

    pub fn resume(&self, id: &PermitId, session: &Session) -> Result<Permit> {
        self.change_status(id, PermitStatus::EnEjecucion, None, session)
    }

    pub fn close(&self, id: &PermitId, session: &Session) -> Result<Permit> {
        self.change_status(id, PermitStatus::Cerrado, None, session)
    }

    /// Subscribe to post-write snapshots of one permit.
    pub fn watch(&self, id: &PermitId, observer: Observer) -> Result<Subscription> {
        self.store.subscribe(id, observer)
    }

    fn fetch(&self, id: &PermitId) -> Result<Permit> {
        self.store
            .get(id)?
            .ok_or_else(|| PermitError::not_found(format!("permit {}", id)))
    }
}

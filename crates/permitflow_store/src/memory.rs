//! In-memory permit store.
//!
//! Reference implementation of the [`PermitStore`] contract and the backend
//! every core test runs against. Documents live in a mutex-guarded map;
//! observers are notified with the post-write snapshot while no lock is
//! held.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use permitflow_protocol::{Permit, PermitError, PermitId, Result};

use crate::{Observer, PermitPatch, PermitStore, Subscription};

#[derive(Default)]
struct Inner {
    documents: HashMap<PermitId, Permit>,
    observers: HashMap<PermitId, Vec<(u64, Arc<Observer>)>>,
}

/// Shared in-memory document store. Cloning shares the backing map, so a
/// handle per simulated client observes the same documents.
#[derive(Clone, Default)]
pub struct MemoryPermitStore {
    inner: Arc<Mutex<Inner>>,
    next_observer_id: Arc<AtomicU64>,
}

impl MemoryPermitStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PermitError::gateway("memory store lock poisoned"))
    }

    /// Deliver the post-write snapshot to this document's observers.
    /// Callbacks run with no lock held, so an observer may re-enter the
    /// store. An observer unsubscribed while a delivery is in flight may
    /// still receive that one snapshot.
    fn notify(&self, id: &PermitId, snapshot: &Permit) {
        let callbacks: Vec<Arc<Observer>> = {
            let inner = match self.inner.lock() {
                Ok(inner) => inner,
                Err(_) => return,
            };
            inner
                .observers
                .get(id)
                .map(|subs| subs.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

impl PermitStore for MemoryPermitStore {
    fn create(&self, mut permit: Permit) -> Result<PermitId> {
        if permit.id.as_ref().is_empty() {
            permit.id = PermitId::new();
        }
        let id = permit.id.clone();
        let mut inner = self.lock()?;
        if inner.documents.contains_key(&id) {
            return Err(PermitError::gateway(format!(
                "document already exists: {}",
                id
            )));
        }
        inner.documents.insert(id.clone(), permit);
        debug!(permit_id = %id, "created permit document");
        Ok(id)
    }

    fn get(&self, id: &PermitId) -> Result<Option<Permit>> {
        Ok(self.lock()?.documents.get(id).cloned())
    }

    fn update(&self, id: &PermitId, patches: &[PermitPatch]) -> Result<Permit> {
        let snapshot = {
            let mut inner = self.lock()?;
            let permit = inner
                .documents
                .get_mut(id)
                .ok_or_else(|| PermitError::not_found(format!("permit {}", id)))?;
            for patch in patches {
                patch.apply(permit)?;
                debug!(permit_id = %id, path = %patch.field_path(), "applied patch");
            }
            permit.clone()
        };
        self.notify(id, &snapshot);
        Ok(snapshot)
    }

    fn list(&self) -> Result<Vec<Permit>> {
        Ok(self.lock()?.documents.values().cloned().collect())
    }

    fn delete(&self, id: &PermitId) -> Result<bool> {
        let mut inner = self.lock()?;
        inner.observers.remove(id);
        Ok(inner.documents.remove(id).is_some())
    }

    fn subscribe(&self, id: &PermitId, observer: Observer) -> Result<Subscription> {
        let oid = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut inner = self.lock()?;
            if !inner.documents.contains_key(id) {
                return Err(PermitError::not_found(format!("permit {}", id)));
            }
            inner
                .observers
                .entry(id.clone())
                .or_default()
                .push((oid, Arc::new(observer)));
        }

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let doc_id = id.clone();
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut inner) = inner.lock() {
                    if let Some(subs) = inner.observers.get_mut(&doc_id) {
                        subs.retain(|(cand, _)| *cand != oid);
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use permitflow_protocol::{
        GeneralInfo, Permit, PermitNumber, PermitStatus, SignatureBlob, WorkTypes, WorkerDetail,
    };
    use std::sync::atomic::AtomicUsize;

    /// A minimal well-formed permit for store-level tests.
    pub(crate) fn sample_permit() -> Permit {
        Permit {
            id: PermitId::from_string(""),
            number: PermitNumber("PT-2024-0042".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 7, 30, 0).unwrap(),
            created_by: "u2".to_string(),
            requester_name: "Juan Solicitante".to_string(),
            status: PermitStatus::PendienteRevision,
            general_info: GeneralInfo {
                area_especifica: "Caldera 3".to_string(),
                planta: "Planta Principal".to_string(),
                proceso: "Mantenimiento".to_string(),
                contrato: "CT-2024-001".to_string(),
                empresa: "Contratista A".to_string(),
                valid_from: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
                valid_until: Utc.with_ymd_and_hms(2024, 6, 3, 17, 0, 0).unwrap(),
                work_description: "Cambio de valvula de alivio".to_string(),
                tools: None,
            },
            selected_work_types: WorkTypes::default(),
            sst_signature_required: false,
            hazard_analysis: Default::default(),
            workers: vec![WorkerDetail {
                cedula: "1010".to_string(),
                nombre: "Roberto Gomez".to_string(),
                rol: "Soldador".to_string(),
                otro_rol: None,
                aptitude: Default::default(),
                training: Default::default(),
                social_security: Default::default(),
                firma_apertura: Some(SignatureBlob::new("data:image/png;base64,Zg==")),
                firma_cierre: None,
            }],
            approvals: Default::default(),
            anexo_altura: None,
            anexo_confinado: None,
            anexo_energias: None,
            anexo_izaje: None,
            anexo_excavaciones: None,
            closure: None,
            rejection_reason: None,
            suspension_reason: None,
        }
    }

    #[test]
    fn test_create_assigns_id_and_roundtrips() {
        let store = MemoryPermitStore::new();
        let id = store.create(sample_permit()).unwrap();
        assert!(!id.as_ref().is_empty());

        let fetched = store.get(&id).unwrap().unwrap();
        assert_eq!(fetched.number.as_str(), "PT-2024-0042");
        assert_eq!(fetched.status, PermitStatus::PendienteRevision);
        assert_eq!(fetched.workers.len(), 1);
    }

    #[test]
    fn test_get_missing_is_none_update_missing_is_not_found() {
        let store = MemoryPermitStore::new();
        let ghost = PermitId::from_string("ghost");
        assert!(store.get(&ghost).unwrap().is_none());
        let err = store
            .update(&ghost, &[PermitPatch::Status { status: PermitStatus::Aprobado }])
            .unwrap_err();
        assert!(matches!(err, PermitError::NotFound(_)));
    }

    #[test]
    fn test_update_returns_post_write_snapshot() {
        let store = MemoryPermitStore::new();
        let id = store.create(sample_permit()).unwrap();
        let snapshot = store
            .update(&id, &[PermitPatch::Status { status: PermitStatus::Aprobado }])
            .unwrap();
        assert_eq!(snapshot.status, PermitStatus::Aprobado);
    }

    #[test]
    fn test_subscribe_delivers_and_unsubscribes() {
        let store = MemoryPermitStore::new();
        let id = store.create(sample_permit()).unwrap();

        let delivered = Arc::new(AtomicUsize::new(0));
        let seen = delivered.clone();
        let sub = store
            .subscribe(
                &id,
                Box::new(move |permit| {
                    assert_eq!(permit.status, PermitStatus::Aprobado);
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        store
            .update(&id, &[PermitPatch::Status { status: PermitStatus::Aprobado }])
            .unwrap();
        assert_eq!(delivered.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        store
            .update(&id, &[PermitPatch::Status { status: PermitStatus::Aprobado }])
            .unwrap();
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delete() {
        let store = MemoryPermitStore::new();
        let id = store.create(sample_permit()).unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.get(&id).unwrap().is_none());
    }
}

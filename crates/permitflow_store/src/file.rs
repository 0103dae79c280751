//! JSON file-per-document permit store.
//!
//! # Storage Format
//!
//! ```text
//! ~/.permitflow/permits/
//! ├── {permit_id_1}.json
//! ├── {permit_id_2}.json
//! └── ...
//! ```
//!
//! Writes go through a temp file + rename so a crashed writer never leaves
//! a half-written document. Legacy-generation documents are migrated by
//! [`crate::compat::migrate_document`] on read.
//!
//! Observers fire for writes through this handle only; a change made by
//! another process is not observed. The in-memory backend is the reference
//! for full subscription semantics.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use permitflow_protocol::{Permit, PermitError, PermitId, Result};

use crate::compat::migrate_document;
use crate::{Observer, PermitPatch, PermitStore, Subscription};

type ObserverMap = HashMap<PermitId, Vec<(u64, Arc<Observer>)>>;

/// File-backed permit store.
pub struct FilePermitStore {
    /// Directory holding one JSON file per permit
    dir: PathBuf,
    observers: Arc<Mutex<ObserverMap>>,
    next_observer_id: AtomicU64,
}

impl FilePermitStore {
    /// Open (creating if needed) a store at the given collection directory.
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(|e| {
            PermitError::gateway(format!(
                "Failed to create permit store directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            dir,
            observers: Arc::new(Mutex::new(HashMap::new())),
            next_observer_id: AtomicU64::new(0),
        })
    }

    /// Default collection directory: `~/.permitflow/permits`.
    pub fn default_dir() -> PathBuf {
        if let Ok(override_path) = std::env::var("PERMITFLOW_HOME") {
            return PathBuf::from(override_path).join("permits");
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".permitflow")
            .join("permits")
    }

    fn permit_path(&self, id: &PermitId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn read_permit(&self, path: &Path) -> Result<Permit> {
        let json = fs::read_to_string(path).map_err(|e| {
            PermitError::gateway(format!("Failed to read permit file {}: {}", path.display(), e))
        })?;
        let raw: serde_json::Value = serde_json::from_str(&json)?;
        let canonical = migrate_document(raw);
        let permit: Permit = serde_json::from_value(canonical).map_err(|e| {
            PermitError::gateway(format!(
                "Failed to parse permit file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(permit)
    }

    fn write_permit(&self, permit: &Permit) -> Result<()> {
        let path = self.permit_path(&permit.id);
        let json = serde_json::to_string_pretty(permit)?;
        atomic_write(&path, json.as_bytes())?;
        debug!(permit_id = %permit.id, path = %path.display(), "wrote permit document");
        Ok(())
    }

    fn notify(&self, id: &PermitId, snapshot: &Permit) {
        let callbacks: Vec<Arc<Observer>> = {
            let observers = match self.observers.lock() {
                Ok(observers) => observers,
                Err(_) => return,
            };
            observers
                .get(id)
                .map(|subs| subs.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

impl PermitStore for FilePermitStore {
    fn create(&self, mut permit: Permit) -> Result<PermitId> {
        if permit.id.as_ref().is_empty() {
            permit.id = PermitId::new();
        }
        let path = self.permit_path(&permit.id);
        if path.exists() {
            return Err(PermitError::gateway(format!(
                "document already exists: {}",
                permit.id
            )));
        }
        self.write_permit(&permit)?;
        Ok(permit.id)
    }

    fn get(&self, id: &PermitId) -> Result<Option<Permit>> {
        let path = self.permit_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_permit(&path).map(Some)
    }

    fn update(&self, id: &PermitId, patches: &[PermitPatch]) -> Result<Permit> {
        let mut permit = self
            .get(id)?
            .ok_or_else(|| PermitError::not_found(format!("permit {}", id)))?;
        for patch in patches {
            patch.apply(&mut permit)?;
            debug!(permit_id = %id, path = %patch.field_path(), "applied patch");
        }
        self.write_permit(&permit)?;
        self.notify(id, &permit);
        Ok(permit)
    }

    fn list(&self) -> Result<Vec<Permit>> {
        let mut permits = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            PermitError::gateway(format!(
                "Failed to read permit store directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| PermitError::gateway(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            permits.push(self.read_permit(&path)?);
        }
        debug!(count = permits.len(), "loaded permit documents");
        Ok(permits)
    }

    fn delete(&self, id: &PermitId) -> Result<bool> {
        let path = self.permit_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| {
            PermitError::gateway(format!(
                "Failed to delete permit file {}: {}",
                path.display(),
                e
            ))
        })?;
        if let Ok(mut observers) = self.observers.lock() {
            observers.remove(id);
        }
        Ok(true)
    }

    fn subscribe(&self, id: &PermitId, observer: Observer) -> Result<Subscription> {
        if !self.permit_path(id).exists() {
            return Err(PermitError::not_found(format!("permit {}", id)));
        }
        let oid = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut observers = self
                .observers
                .lock()
                .map_err(|_| PermitError::gateway("observer registry lock poisoned"))?;
            observers
                .entry(id.clone())
                .or_default()
                .push((oid, Arc::new(observer)));
        }

        let weak: Weak<Mutex<ObserverMap>> = Arc::downgrade(&self.observers);
        let doc_id = id.clone();
        Ok(Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                if let Ok(mut observers) = registry.lock() {
                    if let Some(subs) = observers.get_mut(&doc_id) {
                        subs.retain(|(cand, _)| *cand != oid);
                    }
                }
            }
        }))
    }
}

/// Atomic write via temp file + rename
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(".tmp_{}", uuid::Uuid::new_v4()));
    fs::write(&temp_path, content).map_err(|e| {
        PermitError::gateway(format!(
            "Failed to write temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;
    fs::rename(&temp_path, path).map_err(|e| {
        PermitError::gateway(format!(
            "Failed to rename temp file to {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::sample_permit;
    use permitflow_protocol::PermitStatus;
    use tempfile::TempDir;

    fn test_store() -> (FilePermitStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = FilePermitStore::new(temp.path().to_path_buf()).unwrap();
        (store, temp)
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let (store, _temp) = test_store();
        let id = store.create(sample_permit()).unwrap();

        let fetched = store.get(&id).unwrap().unwrap();
        assert_eq!(fetched.number.as_str(), "PT-2024-0042");
        assert_eq!(fetched.status, PermitStatus::PendienteRevision);
        assert_eq!(fetched.workers[0].cedula, "1010");
    }

    #[test]
    fn test_get_nonexistent() {
        let (store, _temp) = test_store();
        let loaded = store.get(&PermitId::from_string("nonexistent")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_update_persists() {
        let (store, _temp) = test_store();
        let id = store.create(sample_permit()).unwrap();

        store
            .update(&id, &[PermitPatch::Status { status: PermitStatus::Aprobado }])
            .unwrap();

        // A fresh handle over the same directory sees the write.
        let reopened = FilePermitStore::new(store.dir.clone()).unwrap();
        let fetched = reopened.get(&id).unwrap().unwrap();
        assert_eq!(fetched.status, PermitStatus::Aprobado);
    }

    #[test]
    fn test_list_and_delete() {
        let (store, _temp) = test_store();
        for _ in 0..3 {
            let mut permit = sample_permit();
            permit.id = PermitId::new();
            store.create(permit).unwrap();
        }
        assert_eq!(store.list().unwrap().len(), 3);

        let id = store.list().unwrap()[0].id.clone();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_reads_legacy_generation_document() {
        let (store, _temp) = test_store();
        // First-generation flat shape as the original front end stored it.
        let legacy = serde_json::json!({
            "id": "legacy-1",
            "number": "PT-2023-0777",
            "createdAt": "2023-11-05T13:00:00Z",
            "createdBy": "u2",
            "requesterName": "Juan Solicitante",
            "status": "en_ejecucion",
            "area": "Tanque 7",
            "plant": "Patio Tanques",
            "process": "Mantenimiento",
            "contract": "Interno",
            "company": "Italcol",
            "startDate": "2023-11-06T08:00:00Z",
            "endDate": "2023-11-08T17:00:00Z",
            "description": "Limpieza interna",
            "workTypes": { "espaciosConfinados": true, "caliente": true },
            "workers": [{
                "id": "2020",
                "name": "Ana Martinez",
                "role": "Electricista",
                "signatureOpen": "data:image/png;base64,Zg=="
            }],
            "signatures": {
                "requester": {
                    "signedBy": "u2",
                    "signerName": "Juan Solicitante",
                    "signedAt": "2023-11-05T13:05:00Z",
                    "role": "solicitante"
                }
            }
        });
        let path = store.dir.join("legacy-1.json");
        fs::write(&path, serde_json::to_vec_pretty(&legacy).unwrap()).unwrap();

        let permit = store
            .get(&PermitId::from_string("legacy-1"))
            .unwrap()
            .unwrap();
        assert_eq!(permit.general_info.area_especifica, "Tanque 7");
        assert_eq!(permit.general_info.planta, "Patio Tanques");
        assert!(permit.selected_work_types.espacios_confinados);
        // caliente folds into energia
        assert!(permit.selected_work_types.energia);
        assert_eq!(permit.workers[0].cedula, "2020");
        assert!(permit.workers[0].firma_apertura.is_some());
        assert!(permit.is_signed(permitflow_protocol::ApprovalRole::Solicitante));
    }
}

//! Persistence and identity gateways for the permit core.
//!
//! The core never talks to a concrete store; it goes through [`PermitStore`]
//! (document create/read/targeted-update/list/delete plus change
//! subscriptions) and [`identity::IdentityGateway`]. Two reference backends
//! ship here: an in-memory store (tests, reference semantics) and a JSON
//! file-per-document store.
//!
//! All mutations are expressed as [`PermitPatch`] values - one disjoint
//! field path each - specifically to minimize the surface of a lost-update
//! race between concurrent clients (see the patch module).

pub mod compat;
pub mod file;
pub mod identity;
pub mod memory;
pub mod patch;

pub use file::FilePermitStore;
pub use identity::{IdentityGateway, MemoryIdentityGateway, Session};
pub use memory::MemoryPermitStore;
pub use patch::PermitPatch;

use permitflow_protocol::{Permit, PermitId, Result};

/// Observer invoked with the authoritative post-write snapshot whenever the
/// subscribed document changes. The last delivered snapshot wins over any
/// locally-optimistic guess.
pub type Observer = Box<dyn Fn(&Permit) + Send + Sync + 'static>;

/// Handle returned by [`PermitStore::subscribe`]. Dropping it (or calling
/// [`Subscription::unsubscribe`]) deregisters the observer.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicitly stop receiving notifications.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Document-store contract consumed by the permit core.
///
/// Every call is a suspension point from the caller's perspective: by the
/// time it returns, the caller's previous in-memory snapshot may be stale.
/// Implementations apply patches atomically per document and notify
/// subscribers with the post-write state.
pub trait PermitStore: Send + Sync {
    /// Store a new permit document. The store assigns the id when the
    /// permit's id field is empty.
    fn create(&self, permit: Permit) -> Result<PermitId>;

    /// Fetch one permit by id.
    fn get(&self, id: &PermitId) -> Result<Option<Permit>>;

    /// Apply targeted field-path updates and return the post-write snapshot.
    /// Patches touching different paths never clobber each other.
    fn update(&self, id: &PermitId, patches: &[PermitPatch]) -> Result<Permit>;

    /// All permit documents, unordered. Role scoping happens in the core.
    fn list(&self) -> Result<Vec<Permit>>;

    /// Administrative data management only; the core never deletes.
    fn delete(&self, id: &PermitId) -> Result<bool>;

    /// Register an observer for one document's changes.
    fn subscribe(&self, id: &PermitId, observer: Observer) -> Result<Subscription>;
}

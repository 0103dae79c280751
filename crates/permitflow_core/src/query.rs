//! Role-scoped visibility and client-side search filters.
//!
//! Scoping is coarse on purpose: a solicitante only ever sees their own
//! permits, every other role sees the full list. Filtering happens over the
//! already fetched (and already scoped) list.

use permitflow_protocol::{Identity, Permit, PermitStatus, UserRole};

/// Whether `identity` may see `permit` in listings.
pub fn visible_to(permit: &Permit, identity: &Identity) -> bool {
    match identity.role {
        UserRole::Solicitante => permit.created_by == identity.id,
        _ => true,
    }
}

/// Scope and order a fetched list for `identity`: own-permits-only for
/// solicitantes, newest first for everyone.
pub fn scope_list(mut permits: Vec<Permit>, identity: &Identity) -> Vec<Permit> {
    permits.retain(|p| visible_to(p, identity));
    permits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    permits
}

/// Search predicate over a permit list. Both fields are optional and ANDed;
/// an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermitFilter {
    /// Case-insensitive substring over number, planta, area and requester.
    pub text: Option<String>,
    pub status: Option<PermitStatus>,
}

impl PermitFilter {
    pub fn matches(&self, permit: &Permit) -> bool {
        if let Some(status) = self.status {
            if permit.status != status {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if needle.is_empty() {
                return true;
            }
            let haystacks = [
                permit.number.as_str(),
                permit.general_info.planta.as_str(),
                permit.general_info.area_especifica.as_str(),
                permit.requester_name.as_str(),
            ];
            return haystacks
                .iter()
                .any(|h| h.to_lowercase().contains(&needle));
        }
        true
    }

    /// Apply over an already scoped list, preserving order.
    pub fn apply(&self, permits: &[Permit]) -> Vec<Permit> {
        permits.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

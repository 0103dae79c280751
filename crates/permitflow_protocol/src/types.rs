//! Permit record types (canonical definitions, used across all crates)

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::annexes::{AnexoAltura, AnexoConfinado, AnexoEnergias, AnexoExcavaciones, AnexoIzaje};

// ============================================================================
// Canonical Enums (used across all crates)
// ============================================================================

/// Permit lifecycle status.
/// This is the CANONICAL definition - use this everywhere.
///
/// Wire strings are the stored-document contract and match the original
/// Spanish generation (`pendiente_revision`, `en_ejecucion`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermitStatus {
    /// Saved but never submitted. The wizard submits straight to review,
    /// so the creation path never produces this value.
    Borrador,
    /// Submitted, awaiting the required approval signatures
    PendienteRevision,
    /// All required roles signed
    Aprobado,
    /// Work started
    EnEjecucion,
    /// Work paused by an authorized role
    Suspendido,
    /// Terminal: both closure signatures collected
    Cerrado,
    /// Terminal: rejected during review
    Rechazado,
}

impl PermitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermitStatus::Borrador => "borrador",
            PermitStatus::PendienteRevision => "pendiente_revision",
            PermitStatus::Aprobado => "aprobado",
            PermitStatus::EnEjecucion => "en_ejecucion",
            PermitStatus::Suspendido => "suspendido",
            PermitStatus::Cerrado => "cerrado",
            PermitStatus::Rechazado => "rechazado",
        }
    }

    /// No transition is defined out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PermitStatus::Cerrado | PermitStatus::Rechazado)
    }

    /// Statuses in which no approval signature may be recorded.
    pub fn blocks_signing(&self) -> bool {
        matches!(
            self,
            PermitStatus::Rechazado | PermitStatus::Cerrado | PermitStatus::Suspendido
        )
    }

    /// All defined statuses, in lifecycle order.
    pub fn all() -> [PermitStatus; 7] {
        [
            PermitStatus::Borrador,
            PermitStatus::PendienteRevision,
            PermitStatus::Aprobado,
            PermitStatus::EnEjecucion,
            PermitStatus::Suspendido,
            PermitStatus::Cerrado,
            PermitStatus::Rechazado,
        ]
    }
}

impl fmt::Display for PermitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrador" => Ok(PermitStatus::Borrador),
            "pendiente_revision" => Ok(PermitStatus::PendienteRevision),
            "aprobado" => Ok(PermitStatus::Aprobado),
            "en_ejecucion" => Ok(PermitStatus::EnEjecucion),
            "suspendido" => Ok(PermitStatus::Suspendido),
            "cerrado" => Ok(PermitStatus::Cerrado),
            "rechazado" => Ok(PermitStatus::Rechazado),
            _ => Err(format!("Invalid permit status: '{}'", s)),
        }
    }
}

/// Role of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Administrative override: may act in place of any approval role
    Admin,
    /// Requester / task leader
    Solicitante,
    /// Authorizing supervisor
    Autorizante,
    /// Maintenance (energy-control work only)
    Mantenimiento,
    /// Safety (SST) lead
    LiderSst,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Solicitante => "solicitante",
            UserRole::Autorizante => "autorizante",
            UserRole::Mantenimiento => "mantenimiento",
            UserRole::LiderSst => "lider_sst",
        }
    }

    /// Authorizer-class roles may reject a permit under review and
    /// suspend/resume execution.
    pub fn is_authorizer_class(&self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::Autorizante | UserRole::Mantenimiento | UserRole::LiderSst
        )
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "solicitante" => Ok(UserRole::Solicitante),
            "autorizante" => Ok(UserRole::Autorizante),
            "mantenimiento" => Ok(UserRole::Mantenimiento),
            "lider_sst" => Ok(UserRole::LiderSst),
            _ => Err(format!("Invalid user role: '{}'", s)),
        }
    }
}

/// Key set of the approvals map. Unlike [`UserRole`] there is no admin
/// entry: an admin signs *as* one of these roles, never as itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRole {
    Solicitante,
    Autorizante,
    Mantenimiento,
    LiderSst,
}

impl ApprovalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalRole::Solicitante => "solicitante",
            ApprovalRole::Autorizante => "autorizante",
            ApprovalRole::Mantenimiento => "mantenimiento",
            ApprovalRole::LiderSst => "lider_sst",
        }
    }

    /// The user role whose holders may sign this slot (admin always may).
    pub fn matching_user_role(&self) -> UserRole {
        match self {
            ApprovalRole::Solicitante => UserRole::Solicitante,
            ApprovalRole::Autorizante => UserRole::Autorizante,
            ApprovalRole::Mantenimiento => UserRole::Mantenimiento,
            ApprovalRole::LiderSst => UserRole::LiderSst,
        }
    }
}

impl fmt::Display for ApprovalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApprovalRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solicitante" => Ok(ApprovalRole::Solicitante),
            "autorizante" => Ok(ApprovalRole::Autorizante),
            "mantenimiento" => Ok(ApprovalRole::Mantenimiento),
            "lider_sst" => Ok(ApprovalRole::LiderSst),
            _ => Err(format!("Unknown approval role: '{}'", s)),
        }
    }
}

/// State of one approval slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    #[default]
    Pendiente,
    Aprobado,
    Rechazado,
}

impl ApprovalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalState::Pendiente => "pendiente",
            ApprovalState::Aprobado => "aprobado",
            ApprovalState::Rechazado => "rechazado",
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checklist answer: yes / no / not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tristate {
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "NA")]
    Na,
}

impl Tristate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tristate::Si => "SI",
            Tristate::No => "NO",
            Tristate::Na => "NA",
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tristate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SI" => Ok(Tristate::Si),
            "NO" => Ok(Tristate::No),
            "NA" | "N/A" => Ok(Tristate::Na),
            _ => Err(format!("Invalid tristate: '{}'. Expected: SI, NO or NA", s)),
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Authenticated identity as returned by the identity gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// ============================================================================
// Signatures & Approvals
// ============================================================================

/// Opaque signature image (data URL). Never interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlob(pub String);

impl SignatureBlob {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One slot of the approvals map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub status: ApprovalState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Approval {
    /// Build a signed approval for the given actor.
    pub fn signed_by(actor: &Identity, signature: SignatureBlob) -> Self {
        Self {
            status: ApprovalState::Aprobado,
            signer_id: Some(actor.id.clone()),
            signer_name: Some(actor.name.clone()),
            signer_role: Some(actor.role),
            signed_at: Some(Utc::now()),
            signature: Some(signature),
            comments: None,
        }
    }

    /// Build a rejected approval with the mandatory reason.
    pub fn rejected_by(actor: &Identity, reason: impl Into<String>) -> Self {
        Self {
            status: ApprovalState::Rechazado,
            signer_id: Some(actor.id.clone()),
            signer_name: Some(actor.name.clone()),
            signer_role: Some(actor.role),
            signed_at: Some(Utc::now()),
            signature: None,
            comments: Some(reason.into()),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.status == ApprovalState::Aprobado
    }
}

/// One of the two terminal closure sign-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureSignature {
    pub nombre: String,
    pub fecha: DateTime<Utc>,
    pub firma: SignatureBlob,
}

impl ClosureSignature {
    pub fn by(actor: &Identity, firma: SignatureBlob) -> Self {
        Self {
            nombre: actor.name.clone(),
            fecha: Utc::now(),
            firma,
        }
    }
}

/// The two-signature terminal closure block.
///
/// Invariant: `autoridad` is never set while `responsable` is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Closure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsable: Option<ClosureSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoridad: Option<ClosureSignature>,
    #[serde(default)]
    pub terminado: bool,
    #[serde(default)]
    pub cancelado: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razon_cancelacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones_cierre: Option<String>,
}

impl Closure {
    /// Both signatures present: the permit may transition to `cerrado`.
    pub fn is_complete(&self) -> bool {
        self.responsable.is_some() && self.autoridad.is_some()
    }
}

// ============================================================================
// Workers
// ============================================================================

/// Medical aptitude flags (trabajo en alturas TEC / TSA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Aptitude {
    pub tec: bool,
    pub tsa: bool,
}

/// Training flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub tec: bool,
    pub tsa: bool,
    pub otro: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otro_desc: Option<String>,
}

/// Social security affiliation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SocialSecurity {
    pub eps: bool,
    pub arl: bool,
    pub pension: bool,
}

/// One entry of the worker roster. `cedula` is the natural key and must be
/// unique within a permit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDetail {
    pub cedula: String,
    pub nombre: String,
    pub rol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otro_rol: Option<String>,
    #[serde(default)]
    pub aptitude: Aptitude,
    #[serde(default)]
    pub training: Training,
    #[serde(default)]
    pub social_security: SocialSecurity,
    /// Signed when the worker is rostered; mandatory at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma_apertura: Option<SignatureBlob>,
    /// Signed at the end of the works, only while en_ejecucion/suspendido
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma_cierre: Option<SignatureBlob>,
}

// ============================================================================
// General info, work types, hazard analysis
// ============================================================================

/// Location, dates and description of the planned task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfo {
    pub area_especifica: String,
    pub planta: String,
    #[serde(default)]
    pub proceso: String,
    #[serde(default)]
    pub contrato: String,
    #[serde(default)]
    pub empresa: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub work_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<String>,
}

/// Work-type flags. A `true` flag is the sole trigger for requiring the
/// matching annex and, for `energia`, the mantenimiento approval role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkTypes {
    #[serde(default)]
    pub altura: bool,
    #[serde(default)]
    pub espacios_confinados: bool,
    #[serde(default)]
    pub energia: bool,
    #[serde(default)]
    pub izaje: bool,
    #[serde(default)]
    pub excavacion: bool,
    #[serde(default)]
    pub general: bool,
}

impl WorkTypes {
    pub fn any(&self) -> bool {
        self.altura
            || self.espacios_confinados
            || self.energia
            || self.izaje
            || self.excavacion
            || self.general
    }
}

/// Free-text hazard/control pair added by the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalHazard {
    pub hazard: String,
    pub control: String,
}

/// PPE checklist value. The catalog decides which shape each item takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PpeValue {
    Checked(bool),
    Text(String),
}

/// Task-specific hazard analysis (ATS) attached to the permit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HazardAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justificacion: Option<String>,
    /// Catalog hazard item ids
    #[serde(default)]
    pub selected_hazards: BTreeSet<String>,
    #[serde(default)]
    pub additional_hazards: Vec<AdditionalHazard>,
    /// Verification checklist item -> SI/NO/NA
    #[serde(default)]
    pub verification_matrix: BTreeMap<String, Tristate>,
    /// PPE item key -> checked flag or free text, per catalog item kind
    #[serde(default)]
    pub ppe: BTreeMap<String, PpeValue>,
    /// Emergency check name -> SI/NO/NA
    #[serde(default)]
    pub emergency_checks: BTreeMap<String, Tristate>,
}

// ============================================================================
// Identity of the permit document
// ============================================================================

/// Store-assigned opaque document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermitId(pub String);

impl PermitId {
    /// Mint a fresh random id (used by store backends on create).
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Default for PermitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PermitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PermitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Human-readable permit number, format `PT-<year>-<4 digits>`.
///
/// The suffix is random, so uniqueness is best-effort only: two concurrent
/// creations can collide. Known weakness carried over from the original
/// system; the backing store does not guarantee a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermitNumber(pub String);

impl PermitNumber {
    pub fn generate(year: i32) -> Self {
        let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
        Self(format!("PT-{}-{:04}", year, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermitNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PermitNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let ok = parts.len() == 3
            && parts[0] == "PT"
            && parts[1].len() == 4
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].len() == 4
            && parts[2].chars().all(|c| c.is_ascii_digit());
        if ok {
            Ok(Self(s.to_string()))
        } else {
            Err(format!(
                "Invalid permit number: '{}'. Expected PT-<year>-<4 digits>",
                s
            ))
        }
    }
}

// ============================================================================
// The aggregate root
// ============================================================================

/// The work-permit aggregate. Mutated field-by-field via targeted patches,
/// never rewritten whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit {
    pub id: PermitId,
    pub number: PermitNumber,
    pub created_at: DateTime<Utc>,
    /// Requester identity id. Immutable after creation.
    pub created_by: String,
    pub requester_name: String,
    pub status: PermitStatus,

    pub general_info: GeneralInfo,
    #[serde(default)]
    pub selected_work_types: WorkTypes,
    /// Explicit flag requiring the lider_sst approval role
    #[serde(default, rename = "isSSTSignatureRequired")]
    pub sst_signature_required: bool,

    #[serde(default)]
    pub hazard_analysis: HazardAnalysis,

    #[serde(default)]
    pub workers: Vec<WorkerDetail>,

    /// Role -> approval slot; merged per-role, never rewritten whole
    #[serde(default)]
    pub approvals: BTreeMap<ApprovalRole, Approval>,

    // Annexes, present only when the matching work-type flag is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anexo_altura: Option<AnexoAltura>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anexo_confinado: Option<AnexoConfinado>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anexo_energias: Option<AnexoEnergias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anexo_izaje: Option<AnexoIzaje>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anexo_excavaciones: Option<AnexoExcavaciones>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure: Option<Closure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
}

impl Permit {
    /// Approval roles this permit requires before it may be approved.
    ///
    /// Mantenimiento only participates when energy-control work is flagged;
    /// lider_sst only when the explicit SST flag is set.
    pub fn required_roles(&self) -> Vec<ApprovalRole> {
        let mut roles = vec![ApprovalRole::Solicitante, ApprovalRole::Autorizante];
        if self.selected_work_types.energia {
            roles.push(ApprovalRole::Mantenimiento);
        }
        if self.sst_signature_required {
            roles.push(ApprovalRole::LiderSst);
        }
        roles
    }

    /// Whether the given approval role is relevant for this permit.
    pub fn requires_role(&self, role: ApprovalRole) -> bool {
        self.required_roles().contains(&role)
    }

    pub fn approval(&self, role: ApprovalRole) -> Option<&Approval> {
        self.approvals.get(&role)
    }

    pub fn is_signed(&self, role: ApprovalRole) -> bool {
        self.approval(role).map(Approval::is_signed).unwrap_or(false)
    }

    /// Required roles whose signature is still missing.
    pub fn missing_signatures(&self) -> Vec<ApprovalRole> {
        self.required_roles()
            .into_iter()
            .filter(|r| !self.is_signed(*r))
            .collect()
    }

    pub fn worker_by_cedula(&self, cedula: &str) -> Option<&WorkerDetail> {
        self.workers.iter().find(|w| w.cedula == cedula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in PermitStatus::all() {
            let parsed: PermitStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("en_curso".parse::<PermitStatus>().is_err());
    }

    #[test]
    fn test_status_serde_wire_strings() {
        let json = serde_json::to_string(&PermitStatus::PendienteRevision).unwrap();
        assert_eq!(json, "\"pendiente_revision\"");
        let back: PermitStatus = serde_json::from_str("\"en_ejecucion\"").unwrap();
        assert_eq!(back, PermitStatus::EnEjecucion);
    }

    #[test]
    fn test_terminal_and_signing_blocks() {
        assert!(PermitStatus::Cerrado.is_terminal());
        assert!(PermitStatus::Rechazado.is_terminal());
        assert!(!PermitStatus::Suspendido.is_terminal());
        assert!(PermitStatus::Suspendido.blocks_signing());
        assert!(!PermitStatus::PendienteRevision.blocks_signing());
    }

    #[test]
    fn test_approval_role_rejects_unknown() {
        assert!("coordinador_alturas".parse::<ApprovalRole>().is_err());
        assert_eq!(
            "lider_sst".parse::<ApprovalRole>().unwrap(),
            ApprovalRole::LiderSst
        );
    }

    #[test]
    fn test_tristate_parse() {
        assert_eq!("si".parse::<Tristate>().unwrap(), Tristate::Si);
        assert_eq!("N/A".parse::<Tristate>().unwrap(), Tristate::Na);
        assert!("tal vez".parse::<Tristate>().is_err());
    }

    #[test]
    fn test_permit_number_format() {
        let n = PermitNumber::generate(2024);
        let parsed: PermitNumber = n.as_str().parse().unwrap();
        assert_eq!(parsed, n);
        assert!("PT-24-0001".parse::<PermitNumber>().is_err());
        assert!("WO-2024-0001".parse::<PermitNumber>().is_err());
    }

    #[test]
    fn test_ppe_value_untagged_serde() {
        let v: PpeValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, PpeValue::Checked(true));
        let v: PpeValue = serde_json::from_str("\"Tipo II\"").unwrap();
        assert_eq!(v, PpeValue::Text("Tipo II".to_string()));
    }
}

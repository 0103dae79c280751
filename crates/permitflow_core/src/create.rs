//! Wizard-output validation and permit construction.
//!
//! A [`PermitDraft`] is what the multi-step creation wizard hands over. It
//! is validated as a whole at the submission boundary; field-level checks in
//! the UI are advisory only. On success the draft becomes a `Permit` in
//! `pendiente_revision` with a freshly generated number.

use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::{Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use permitflow_protocol::catalog::{
    self, hazard_item, is_emergency_check, is_justification, ppe_item, verification_item_exists,
};
use permitflow_protocol::{
    AnexoAltura, AnexoConfinado, AnexoEnergias, AnexoExcavaciones, AnexoIzaje, Aptitude,
    GeneralInfo, HazardAnalysis, Identity, Permit, PermitError, PermitId, PermitNumber,
    PermitStatus, PpeValue, Result, SignatureBlob, SocialSecurity, Training, WorkTypes,
    WorkerDetail,
};

/// Longest span a single permit may cover, inclusive.
const MAX_VALIDITY_DAYS: i64 = 7;

/// One roster entry as captured by the wizard. The opening signature is
/// optional here; submission rejects the draft when any entry lacks it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDraft {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma_apertura: Option<SignatureBlob>,
}

impl WorkerDraft {
    fn into_detail(self) -> WorkerDetail {
        WorkerDetail {
            cedula: self.cedula,
            nombre: self.nombre,
            rol: self.rol,
            otro_rol: self.otro_rol,
            aptitude: self.aptitude,
            training: self.training,
            social_security: self.social_security,
            firma_apertura: self.firma_apertura,
            firma_cierre: None,
        }
    }
}

/// Everything the wizard collects before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitDraft {
    pub general_info: GeneralInfo,
    #[serde(default)]
    pub selected_work_types: WorkTypes,
    #[serde(default, rename = "isSSTSignatureRequired")]
    pub sst_signature_required: bool,
    #[serde(default)]
    pub hazard_analysis: HazardAnalysis,
    pub workers: Vec<WorkerDraft>,
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
}

impl PermitDraft {
    /// Validate and convert into a stored-form permit on behalf of
    /// `requester`. The solicitante approval is NOT recorded here; the
    /// service applies it as the second write of the submission.
    pub fn into_permit(self, requester: &Identity) -> Result<Permit> {
        validate_draft(&self)?;

        let now = Utc::now();
        let number = PermitNumber::generate(now.year());
        debug!(number = number.as_str(), requester = %requester.id, "assembling permit");

        Ok(Permit {
            id: PermitId::new(),
            number,
            created_at: now,
            created_by: requester.id.clone(),
            requester_name: requester.name.clone(),
            status: PermitStatus::PendienteRevision,
            general_info: self.general_info,
            selected_work_types: self.selected_work_types,
            sst_signature_required: self.sst_signature_required,
            hazard_analysis: self.hazard_analysis,
            workers: self.workers.into_iter().map(WorkerDraft::into_detail).collect(),
            approvals: BTreeMap::new(),
            anexo_altura: self.anexo_altura,
            anexo_confinado: self.anexo_confinado,
            anexo_energias: self.anexo_energias,
            anexo_izaje: self.anexo_izaje,
            anexo_excavaciones: self.anexo_excavaciones,
            closure: None,
            rejection_reason: None,
            suspension_reason: None,
        })
    }
}

/// Whole-draft validation. Returns the first violation found; the order
/// below is the order the wizard presents the steps in.
pub fn validate_draft(draft: &PermitDraft) -> Result<()> {
    validate_general_info(&draft.general_info)?;
    validate_workers(&draft.workers)?;
    validate_hazard_analysis(&draft.hazard_analysis)?;
    validate_annexes(draft)?;
    Ok(())
}

fn validate_general_info(info: &GeneralInfo) -> Result<()> {
    if info.area_especifica.trim().is_empty() {
        return Err(PermitError::validation("area especifica es obligatoria"));
    }
    if info.planta.trim().is_empty() {
        return Err(PermitError::validation("planta es obligatoria"));
    }
    if info.work_description.trim().is_empty() {
        return Err(PermitError::validation(
            "la descripcion del trabajo es obligatoria",
        ));
    }
    if info.valid_until <= info.valid_from {
        return Err(PermitError::validation(
            "la fecha de fin debe ser posterior a la de inicio",
        ));
    }
    if info.valid_until - info.valid_from > Duration::days(MAX_VALIDITY_DAYS) {
        return Err(PermitError::validation(format!(
            "la vigencia no puede superar {} dias",
            MAX_VALIDITY_DAYS
        )));
    }
    Ok(())
}

fn validate_workers(workers: &[WorkerDraft]) -> Result<()> {
    if workers.is_empty() {
        return Err(PermitError::validation("se requiere al menos un trabajador"));
    }
    let mut seen = HashSet::new();
    for (i, worker) in workers.iter().enumerate() {
        if worker.cedula.trim().is_empty()
            || worker.nombre.trim().is_empty()
            || worker.rol.trim().is_empty()
        {
            return Err(PermitError::validation(format!(
                "trabajador {}: cedula, nombre y rol son obligatorios",
                i + 1
            )));
        }
        if worker.firma_apertura.is_none() {
            return Err(PermitError::validation(format!(
                "trabajador {} ({}) no ha firmado la apertura",
                i + 1,
                worker.nombre
            )));
        }
        if !seen.insert(worker.cedula.as_str()) {
            return Err(PermitError::validation(format!(
                "cedula duplicada: {}",
                worker.cedula
            )));
        }
    }
    Ok(())
}

// Checklist mappings only ever hold catalog keys; anything else is a
// client-side bug surfaced here rather than stored.
fn validate_hazard_analysis(analysis: &HazardAnalysis) -> Result<()> {
    if let Some(justificacion) = &analysis.justificacion {
        if !is_justification(justificacion) {
            return Err(PermitError::validation(format!(
                "justificacion ATS desconocida: '{}'",
                justificacion
            )));
        }
    }
    for id in &analysis.selected_hazards {
        if hazard_item(id).is_none() {
            return Err(PermitError::validation(format!(
                "peligro desconocido: '{}'",
                id
            )));
        }
    }
    for name in analysis.verification_matrix.keys() {
        if !verification_item_exists(name) {
            return Err(PermitError::validation(format!(
                "item de verificacion desconocido: '{}'",
                name
            )));
        }
    }
    for (key, value) in &analysis.ppe {
        let item = ppe_item(key).ok_or_else(|| {
            PermitError::validation(format!("elemento de proteccion desconocido: '{}'", key))
        })?;
        let kind_ok = match (item.kind, value) {
            (catalog::PpeKind::Bool, PpeValue::Checked(_)) => true,
            (catalog::PpeKind::Text, PpeValue::Text(_)) => true,
            _ => false,
        };
        if !kind_ok {
            return Err(PermitError::validation(format!(
                "valor invalido para el elemento de proteccion '{}'",
                key
            )));
        }
    }
    for name in analysis.emergency_checks.keys() {
        if !is_emergency_check(name) {
            return Err(PermitError::validation(format!(
                "verificacion de emergencia desconocida: '{}'",
                name
            )));
        }
    }
    for extra in &analysis.additional_hazards {
        if extra.hazard.trim().is_empty() || extra.control.trim().is_empty() {
            return Err(PermitError::validation(
                "los peligros adicionales requieren descripcion y control",
            ));
        }
    }
    Ok(())
}

// Each flagged work type must carry its annex, and no annex may ride along
// without its flag.
fn validate_annexes(draft: &PermitDraft) -> Result<()> {
    let pairs = [
        ("altura", draft.selected_work_types.altura, draft.anexo_altura.is_some()),
        (
            "espacios confinados",
            draft.selected_work_types.espacios_confinados,
            draft.anexo_confinado.is_some(),
        ),
        (
            "control de energias",
            draft.selected_work_types.energia,
            draft.anexo_energias.is_some(),
        ),
        ("izaje", draft.selected_work_types.izaje, draft.anexo_izaje.is_some()),
        (
            "excavaciones",
            draft.selected_work_types.excavacion,
            draft.anexo_excavaciones.is_some(),
        ),
    ];
    for (label, flagged, present) in pairs {
        if flagged && !present {
            return Err(PermitError::validation(format!(
                "falta el anexo de {}",
                label
            )));
        }
        if present && !flagged {
            return Err(PermitError::validation(format!(
                "anexo de {} sin el tipo de trabajo correspondiente",
                label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use permitflow_protocol::{Approval, ApprovalRole, UserRole};

    /// Demo identities mirrored across the test suites. The solicitante
    /// (`u2`) is the creator of every fixture permit.
    pub(crate) fn identity(role: UserRole) -> Identity {
        let (id, name, email) = match role {
            UserRole::Admin => ("u1", "Carlos Admin", "admin@sgtc.com"),
            UserRole::Solicitante => ("u2", "Juan Solicitante", "juan@sgtc.com"),
            UserRole::Autorizante => ("u3", "Maria Autorizante", "maria@sgtc.com"),
            UserRole::Mantenimiento => ("u4", "Pedro Mantenimiento", "pedro@sgtc.com"),
            UserRole::LiderSst => ("u5", "Luisa SST", "luisa@sgtc.com"),
        };
        Identity {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            empresa: None,
        }
    }

    pub(crate) fn base_draft() -> PermitDraft {
        PermitDraft {
            general_info: GeneralInfo {
                area_especifica: "Sala de calderas".to_string(),
                planta: "Planta 2".to_string(),
                proceso: "Mantenimiento".to_string(),
                contrato: "CT-77".to_string(),
                empresa: "Contratista SAS".to_string(),
                valid_from: Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap(),
                valid_until: Utc.with_ymd_and_hms(2024, 6, 3, 17, 0, 0).unwrap(),
                work_description: "Cambio de valvula de alivio".to_string(),
                tools: None,
            },
            selected_work_types: WorkTypes {
                general: true,
                ..Default::default()
            },
            sst_signature_required: false,
            hazard_analysis: HazardAnalysis::default(),
            workers: vec![WorkerDraft {
                cedula: "1010".to_string(),
                nombre: "Roberto Gomez".to_string(),
                rol: "Mecanico".to_string(),
                firma_apertura: Some(SignatureBlob::new("data:image/png;base64,Zg==")),
                ..Default::default()
            }],
            anexo_altura: None,
            anexo_confinado: None,
            anexo_energias: None,
            anexo_izaje: None,
            anexo_excavaciones: None,
        }
    }

    /// A pendiente_revision permit created by u2 with the given approval
    /// slots already signed by their matching demo identities.
    pub(crate) fn signed_permit(signed: &[ApprovalRole]) -> Permit {
        let mut permit = base_draft()
            .into_permit(&identity(UserRole::Solicitante))
            .unwrap();
        for role in signed {
            let signer = identity(role.matching_user_role());
            permit.approvals.insert(
                *role,
                Approval::signed_by(&signer, SignatureBlob::new("data:image/png;base64,Zg==")),
            );
        }
        permit
    }

    /// A fully signed permit in `aprobado`.
    pub(crate) fn approved_permit() -> Permit {
        let mut permit = signed_permit(&[ApprovalRole::Solicitante, ApprovalRole::Autorizante]);
        permit.status = PermitStatus::Aprobado;
        permit
    }

    #[test]
    fn test_valid_draft_becomes_pending_permit() {
        let permit = base_draft()
            .into_permit(&identity(UserRole::Solicitante))
            .unwrap();
        assert_eq!(permit.status, PermitStatus::PendienteRevision);
        assert_eq!(permit.created_by, "u2");
        assert_eq!(permit.requester_name, "Juan Solicitante");
        assert!(permit.approvals.is_empty());
        assert!(permit.number.as_str().starts_with("PT-"));
    }

    #[test]
    fn test_validity_span_boundary() {
        let mut draft = base_draft();
        draft.general_info.valid_from = Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap();

        // exactly seven days passes
        draft.general_info.valid_until = Utc.with_ymd_and_hms(2024, 6, 8, 7, 0, 0).unwrap();
        validate_draft(&draft).unwrap();

        // one second past seven days fails
        draft.general_info.valid_until = Utc.with_ymd_and_hms(2024, 6, 8, 7, 0, 1).unwrap();
        let err = validate_draft(&draft).unwrap_err();
        assert!(matches!(err, PermitError::Validation(_)));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut draft = base_draft();
        draft.general_info.valid_until = draft.general_info.valid_from;
        assert!(validate_draft(&draft).is_err());
    }

    #[test]
    fn test_worker_rules() {
        let mut draft = base_draft();
        draft.workers.clear();
        assert!(validate_draft(&draft).is_err());

        let mut draft = base_draft();
        draft.workers[0].firma_apertura = None;
        let err = validate_draft(&draft).unwrap_err();
        assert!(err.to_string().contains("firmado"));

        let mut draft = base_draft();
        let dup = draft.workers[0].clone();
        draft.workers.push(dup);
        let err = validate_draft(&draft).unwrap_err();
        assert!(err.to_string().contains("cedula duplicada"));
    }

    #[test]
    fn test_catalog_keys_enforced() {
        let mut draft = base_draft();
        draft
            .hazard_analysis
            .selected_hazards
            .insert("loc_999".to_string());
        assert!(validate_draft(&draft).is_err());

        let mut draft = base_draft();
        draft
            .hazard_analysis
            .ppe
            .insert("casco".to_string(), PpeValue::Text("Tipo II".to_string()));
        validate_draft(&draft).unwrap();

        // casco is a text item; a bare check is the wrong shape
        draft
            .hazard_analysis
            .ppe
            .insert("casco".to_string(), PpeValue::Checked(true));
        assert!(validate_draft(&draft).is_err());
    }

    #[test]
    fn test_annex_must_match_work_type() {
        let mut draft = base_draft();
        draft.selected_work_types.altura = true;
        let err = validate_draft(&draft).unwrap_err();
        assert!(err.to_string().contains("anexo de altura"));

        draft.anexo_altura = Some(AnexoAltura::default());
        validate_draft(&draft).unwrap();

        draft.selected_work_types.altura = false;
        assert!(validate_draft(&draft).is_err());
    }
}

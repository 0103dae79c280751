//! Legacy-schema migration.
//!
//! The original system carried two schema generations side by side (flat
//! `area`/`plant`/`startDate` fields next to `generalInfo.*`, `workTypes`
//! next to `selectedWorkTypes`, `signatures.requester` next to
//! `approvals.solicitante`) with ad hoc `a || b` fallbacks at every read
//! site. Here the second generation is canonical and this module is the
//! one place legacy names are rewritten - business rules never see them.
//!
//! [`migrate_document`] is applied to the raw JSON document at the
//! persistence boundary, before typed deserialization.

use serde_json::{json, Map, Value};

/// Rewrite a stored permit document into the canonical shape. Canonical
/// documents pass through unchanged; legacy fields are folded in only where
/// the canonical counterpart is absent.
pub fn migrate_document(value: Value) -> Value {
    let mut doc = match value {
        Value::Object(map) => map,
        other => return other,
    };

    migrate_general_info(&mut doc);
    migrate_work_types(&mut doc);
    migrate_workers(&mut doc);
    migrate_signatures(&mut doc);
    migrate_hazard_analysis(&mut doc);

    // Helper flag of the first generation; folds into the work-type record.
    if take_bool(&mut doc, "controlEnergia") {
        if let Some(Value::Object(wt)) = doc.get_mut("selectedWorkTypes") {
            wt.insert("energia".to_string(), Value::Bool(true));
        }
    }

    Value::Object(doc)
}

fn migrate_general_info(doc: &mut Map<String, Value>) {
    if doc.contains_key("generalInfo") {
        return;
    }
    let mut info = Map::new();
    for (legacy, canonical) in [
        ("area", "areaEspecifica"),
        ("plant", "planta"),
        ("process", "proceso"),
        ("contract", "contrato"),
        ("company", "empresa"),
        ("startDate", "validFrom"),
        ("endDate", "validUntil"),
        ("description", "workDescription"),
        ("tools", "tools"),
    ] {
        if let Some(v) = doc.remove(legacy) {
            if !v.is_null() {
                info.insert(canonical.to_string(), v);
            }
        }
    }
    doc.insert("generalInfo".to_string(), Value::Object(info));
}

fn migrate_work_types(doc: &mut Map<String, Value>) {
    if !doc.contains_key("selectedWorkTypes") {
        if let Some(legacy) = doc.remove("workTypes") {
            doc.insert("selectedWorkTypes".to_string(), legacy);
        }
    }
    let Some(Value::Object(wt)) = doc.get_mut("selectedWorkTypes") else {
        return;
    };
    // First generation spelled two of the flags differently.
    if take_bool(wt, "caliente") {
        wt.insert("energia".to_string(), Value::Bool(true));
    }
    if take_bool(wt, "confinado") {
        wt.insert("espaciosConfinados".to_string(), Value::Bool(true));
    }
}

fn migrate_workers(doc: &mut Map<String, Value>) {
    let Some(Value::Array(workers)) = doc.get_mut("workers") else {
        return;
    };
    for worker in workers.iter_mut() {
        let Value::Object(w) = worker else { continue };
        rename_if_absent(w, "id", "cedula");
        rename_if_absent(w, "name", "nombre");
        rename_if_absent(w, "role", "rol");
        rename_if_absent(w, "signatureOpen", "firmaApertura");
        rename_if_absent(w, "tsaTec", "aptitude");
        rename_if_absent(w, "entrenamiento", "training");
        if let Some(Value::Object(training)) = w.get_mut("training") {
            rename_if_absent(training, "otroCual", "otroDesc");
        }
        // Flat affiliation booleans of the first generation
        if !w.contains_key("socialSecurity") {
            let eps = take_bool(w, "eps");
            let arl = take_bool(w, "arl");
            let pension = take_bool(w, "pensiones");
            if eps || arl || pension {
                w.insert(
                    "socialSecurity".to_string(),
                    json!({ "eps": eps, "arl": arl, "pension": pension }),
                );
            }
        }
    }
}

/// Fold the first-generation `signatures` block into the approvals map.
/// Legacy signatures carried no blob; they migrate as signed approvals with
/// the signer metadata they did record.
fn migrate_signatures(doc: &mut Map<String, Value>) {
    let Some(Value::Object(signatures)) = doc.remove("signatures").filter(|v| v.is_object()) else {
        return;
    };
    let approvals = doc
        .entry("approvals".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(approvals) = approvals else {
        return;
    };
    for (legacy_key, role) in [
        ("requester", "solicitante"),
        ("authorizer", "autorizante"),
        ("maintenance", "mantenimiento"),
        ("sst", "lider_sst"),
    ] {
        if approvals.contains_key(role) {
            continue;
        }
        let Some(Value::Object(sig)) = signatures.get(legacy_key) else {
            continue;
        };
        approvals.insert(
            role.to_string(),
            json!({
                "status": "aprobado",
                "signerId": sig.get("signedBy").cloned().unwrap_or(Value::Null),
                "signerName": sig.get("signerName").cloned().unwrap_or(Value::Null),
                "signerRole": sig.get("role").cloned().unwrap_or(Value::Null),
                "signedAt": sig.get("signedAt").cloned().unwrap_or(Value::Null),
            }),
        );
    }
}

fn migrate_hazard_analysis(doc: &mut Map<String, Value>) {
    if doc.contains_key("hazardAnalysis") {
        return;
    }
    let mut ats = Map::new();

    if let Some(v) = doc.remove("selectedHazards") {
        ats.insert("selectedHazards".to_string(), v);
    }
    if let Some(v) = doc.remove("additionalHazards") {
        ats.insert("additionalHazards".to_string(), v);
    }
    if let Some(v) = doc.remove("verificationMatrix") {
        ats.insert("verificationMatrix".to_string(), normalize_tristate_map(v));
    }
    if let Some(v) = doc.remove("ppe") {
        ats.insert("ppe".to_string(), v);
    }
    if let Some(v) = doc.remove("emergencyChecks") {
        ats.insert("emergencyChecks".to_string(), normalize_tristate_map(v));
    }
    if let Some(Value::String(just)) = doc.remove("atsJustification") {
        if !just.is_empty() {
            ats.insert("justificacion".to_string(), Value::String(just));
        }
    }

    // Second-generation ATS form, superseded by the consolidated block
    if let Some(Value::Object(mut anexo)) = doc.remove("anexoATS") {
        if let Some(Value::Object(peligros)) = anexo.remove("peligros") {
            let selected = ats
                .entry("selectedHazards".to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(selected) = selected {
                for (id, answer) in peligros {
                    let yes = answer.as_str().is_some_and(|s| s.eq_ignore_ascii_case("si"));
                    if yes && !selected.iter().any(|v| v.as_str() == Some(&id)) {
                        selected.push(Value::String(id));
                    }
                }
            }
        }
        if let Some(epp) = anexo.remove("epp") {
            ats.entry("ppe".to_string()).or_insert(epp);
        }
    }

    if !ats.is_empty() {
        doc.insert("hazardAnalysis".to_string(), Value::Object(ats));
    }
}

/// Uppercase tristate answers and drop values that are not SI/NO/NA; the
/// validation boundary rejects unknowns for new writes, migration just
/// discards them.
fn normalize_tristate_map(value: Value) -> Value {
    let Value::Object(map) = value else {
        return Value::Object(Map::new());
    };
    let mut out = Map::new();
    for (k, v) in map {
        if let Some(s) = v.as_str() {
            let upper = s.to_uppercase();
            match upper.as_str() {
                "SI" | "NO" | "NA" => {
                    out.insert(k, Value::String(upper));
                }
                "N/A" => {
                    out.insert(k, Value::String("NA".to_string()));
                }
                _ => {}
            }
        }
    }
    Value::Object(out)
}

fn rename_if_absent(obj: &mut Map<String, Value>, legacy: &str, canonical: &str) {
    if obj.contains_key(canonical) {
        obj.remove(legacy);
        return;
    }
    if let Some(v) = obj.remove(legacy) {
        if !v.is_null() {
            obj.insert(canonical.to_string(), v);
        }
    }
}

fn take_bool(obj: &mut Map<String, Value>, key: &str) -> bool {
    obj.remove(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_document_passes_through() {
        let doc = json!({
            "generalInfo": { "areaEspecifica": "Caldera 3", "planta": "Planta B" },
            "selectedWorkTypes": { "altura": true },
            "approvals": { "solicitante": { "status": "aprobado" } }
        });
        let migrated = migrate_document(doc.clone());
        assert_eq!(migrated["generalInfo"]["areaEspecifica"], "Caldera 3");
        assert_eq!(migrated["selectedWorkTypes"]["altura"], true);
        assert_eq!(migrated["approvals"]["solicitante"]["status"], "aprobado");
    }

    #[test]
    fn test_flat_fields_fold_into_general_info() {
        let doc = json!({
            "area": "Tanque 7",
            "plant": "Patio Tanques",
            "startDate": "2023-11-06T08:00:00Z",
            "endDate": "2023-11-08T17:00:00Z",
            "description": "Limpieza interna"
        });
        let migrated = migrate_document(doc);
        let info = &migrated["generalInfo"];
        assert_eq!(info["areaEspecifica"], "Tanque 7");
        assert_eq!(info["planta"], "Patio Tanques");
        assert_eq!(info["validFrom"], "2023-11-06T08:00:00Z");
        assert_eq!(info["workDescription"], "Limpieza interna");
        assert!(migrated.get("area").is_none());
    }

    #[test]
    fn test_work_type_spelling_folds() {
        let doc = json!({ "workTypes": { "caliente": true, "confinado": true } });
        let migrated = migrate_document(doc);
        let wt = &migrated["selectedWorkTypes"];
        assert_eq!(wt["energia"], true);
        assert_eq!(wt["espaciosConfinados"], true);
        assert!(wt.get("caliente").is_none());
    }

    #[test]
    fn test_legacy_signatures_become_approvals() {
        let doc = json!({
            "signatures": {
                "requester": {
                    "signedBy": "u2",
                    "signerName": "Juan Solicitante",
                    "signedAt": "2023-11-05T13:05:00Z",
                    "role": "solicitante"
                }
            }
        });
        let migrated = migrate_document(doc);
        let approval = &migrated["approvals"]["solicitante"];
        assert_eq!(approval["status"], "aprobado");
        assert_eq!(approval["signerId"], "u2");
        assert!(migrated.get("signatures").is_none());
    }

    #[test]
    fn test_canonical_approval_wins_over_legacy_signature() {
        let doc = json!({
            "approvals": { "solicitante": { "status": "pendiente" } },
            "signatures": { "requester": { "signedBy": "u9" } }
        });
        let migrated = migrate_document(doc);
        assert_eq!(migrated["approvals"]["solicitante"]["status"], "pendiente");
    }

    #[test]
    fn test_tristate_values_normalized() {
        let doc = json!({
            "verificationMatrix": { "Ruido": "si", "Fibras": "n/a", "Polvos": "quizas" }
        });
        let migrated = migrate_document(doc);
        let matrix = &migrated["hazardAnalysis"]["verificationMatrix"];
        assert_eq!(matrix["Ruido"], "SI");
        assert_eq!(matrix["Fibras"], "NA");
        assert!(matrix.get("Polvos").is_none());
    }

    #[test]
    fn test_ats_peligros_fold_into_selected_hazards() {
        let doc = json!({
            "selectedHazards": ["loc_1"],
            "anexoATS": { "peligros": { "fis_3": "si", "quim_1": "no" } }
        });
        let migrated = migrate_document(doc);
        let selected = migrated["hazardAnalysis"]["selectedHazards"]
            .as_array()
            .unwrap();
        assert!(selected.contains(&json!("loc_1")));
        assert!(selected.contains(&json!("fis_3")));
        assert!(!selected.contains(&json!("quim_1")));
    }

    #[test]
    fn test_worker_aliases() {
        let doc = json!({
            "workers": [{
                "id": "2020",
                "name": "Ana Martinez",
                "role": "Electricista",
                "signatureOpen": "data:,sig",
                "eps": true,
                "arl": true,
                "pensiones": false
            }]
        });
        let migrated = migrate_document(doc);
        let worker = &migrated["workers"][0];
        assert_eq!(worker["cedula"], "2020");
        assert_eq!(worker["nombre"], "Ana Martinez");
        assert_eq!(worker["firmaApertura"], "data:,sig");
        assert_eq!(worker["socialSecurity"]["eps"], true);
        assert_eq!(worker["socialSecurity"]["pension"], false);
    }
}

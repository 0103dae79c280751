//! Specialized hazard-domain annex sub-documents.
//!
//! An annex is present on a permit only when the matching work-type flag is
//! set; the validation boundary enforces both directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{SignatureBlob, Tristate};

/// Daily re-validation row carried by the annexes that span several days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidacionDiaria {
    pub dia: u8,
    pub nombre: String,
    pub fecha: DateTime<Utc>,
    pub firma: SignatureBlob,
}

/// Daily validation ledger: one track per closure authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidacionAnexo {
    #[serde(default)]
    pub responsable: Vec<ValidacionDiaria>,
    #[serde(default)]
    pub autoridad: Vec<ValidacionDiaria>,
}

/// Emergency contact block shared by the altura/confinado annexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactoEmergencia {
    pub contacto: String,
    pub telefono: String,
}

// ============================================================================
// Trabajo en alturas
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnexoAltura {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altura_aproximada: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergencia: Option<ContactoEmergencia>,
    /// Structure type -> selected
    #[serde(default)]
    pub tipo_estructura: BTreeMap<String, bool>,
    #[serde(default)]
    pub aspectos_seguridad: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub precauciones: BTreeMap<String, Tristate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validacion: Option<ValidacionAnexo>,
}

// ============================================================================
// Espacios confinados
// ============================================================================

/// Single atmospheric gas test (LEL / O2 / H2S / CO readings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PruebaGases {
    #[serde(default)]
    pub hora: String,
    #[serde(default)]
    pub lel: String,
    #[serde(default)]
    pub o2: String,
    #[serde(default)]
    pub h2s: String,
    #[serde(default)]
    pub co: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma: Option<SignatureBlob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnexoConfinado {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergencia: Option<ContactoEmergencia>,
    #[serde(default)]
    pub identificacion_peligros: BTreeMap<String, Tristate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedimiento_comunicacion: Option<String>,
    #[serde(default)]
    pub precauciones: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub requerimientos_equipos: BTreeMap<String, Tristate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoridad_del_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsable_del_trabajo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_trabajo: Option<String>,
    /// Initial entry test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultados_pruebas_gases: Option<PruebaGases>,
    /// Periodic re-tests while the entry stays open
    #[serde(default)]
    pub pruebas_gases_periodicas: Vec<PruebaGases>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validacion: Option<ValidacionAnexo>,
}

// ============================================================================
// Control de energias / trabajo en caliente
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SistemaElectrico {
    #[serde(default)]
    pub tension_nominal: String,
    #[serde(default)]
    pub tension_personal: String,
    #[serde(default)]
    pub distancia_seguridad: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnexoEnergias {
    #[serde(default)]
    pub energias_peligrosas: BTreeMap<String, bool>,
    #[serde(default)]
    pub trabajos_en_caliente: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub procedimiento_loto: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub planeacion: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub metodos_control: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sistema_electrico: Option<SistemaElectrico>,
}

// ============================================================================
// Izaje de cargas
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnexoIzaje {
    #[serde(default)]
    pub accion: BTreeMap<String, bool>,
    #[serde(default)]
    pub peso_carga: BTreeMap<String, bool>,
    #[serde(default)]
    pub equipo_utilizar: BTreeMap<String, bool>,
    #[serde(default)]
    pub capacidad_equipo: String,
    #[serde(default)]
    pub aspectos_requeridos: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub precauciones: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validacion: Option<ValidacionAnexo>,
}

// ============================================================================
// Excavaciones
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnexoExcavaciones {
    #[serde(default)]
    pub profundidad: String,
    #[serde(default)]
    pub ancho: String,
    #[serde(default)]
    pub largo: String,
    #[serde(default)]
    pub aspectos_requeridos: BTreeMap<String, Tristate>,
    #[serde(default)]
    pub precauciones: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validacion: Option<ValidacionAnexo>,
}

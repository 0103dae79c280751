//! Static hazard/verification/PPE reference data.
//!
//! Consumed read-only by the creation wizard and the validation boundary.
//! Unknown keys are rejected there; nothing outside these catalogs is ever
//! stored in a checklist mapping.

/// One hazard of the ATS master list, with its standard control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardItem {
    pub id: &'static str,
    pub hazard: &'static str,
    pub control: &'static str,
}

/// Category grouping of the hazard master list.
#[derive(Debug, Clone, Copy)]
pub struct HazardCategory {
    pub name: &'static str,
    pub items: &'static [HazardItem],
}

/// Section of the verification matrix.
#[derive(Debug, Clone, Copy)]
pub struct VerificationSection {
    pub name: &'static str,
    pub items: &'static [&'static str],
}

/// Shape a PPE checklist value takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpeKind {
    /// Checked / not checked
    Bool,
    /// Free text (type, class, anchoring point, ...)
    Text,
}

/// One PPE / collective-protection item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpeItem {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: PpeKind,
}

// ============================================================================
// ATS hazard master list
// ============================================================================

pub const HAZARD_MASTER_LIST: &[HazardCategory] = &[
    HazardCategory {
        name: "LOCATIVOS",
        items: &[
            HazardItem { id: "loc_1", hazard: "Superficies irregulares", control: "Uso de botas de seguridad con suela antideslizante. Controlar escapes, derrames o goteras. Limpiar de inmediato." },
            HazardItem { id: "loc_2", hazard: "Superficies deslizantes", control: "Al subir o bajar escaleras utilizar todos los peldaños y sujetarse del pasamanos; mantener los tres puntos de apoyo." },
            HazardItem { id: "loc_3", hazard: "Superficies con diferencia de nivel", control: "No caminar hacia atrás. No acercarse a los vacíos existentes cerca al área de trabajo." },
            HazardItem { id: "loc_4", hazard: "Techos, muros, pisos en mal estado", control: "Hacer uso de los elementos de prevención contra caídas. Diligenciar permiso de altura si supera 2.0m." },
            HazardItem { id: "loc_5", hazard: "Espacios reducidos", control: "Si esta catalogado como espacio confinado, aplica permiso de espacios confinados." },
        ],
    },
    HazardCategory {
        name: "FÍSICOS",
        items: &[
            HazardItem { id: "fis_1", hazard: "Deficiencia de iluminación", control: "Uso de reflectores y/o lámparas. Informar ausencia de luz. Usar gafas claras." },
            HazardItem { id: "fis_2", hazard: "Exceso de iluminación", control: "Uso de gafas oscuras en caso de exceso de iluminación." },
            HazardItem { id: "fis_3", hazard: "Ruido (Intermitente/Continuo)", control: "Usar de manera permanente protección auditiva tipo copa o de inserción." },
            HazardItem { id: "fis_4", hazard: "Contacto superficies calientes", control: "Usar guantes de protección, ropa manga larga, identificar con señalización." },
            HazardItem { id: "fis_5", hazard: "Exposición a arco de soldadura", control: "Utilizar yelmo de soldar o pantalla de mano siempre que se suelde." },
        ],
    },
    HazardCategory {
        name: "QUÍMICOS",
        items: &[
            HazardItem { id: "quim_1", hazard: "Gases, humos, vapores", control: "Uso permanente de protección respiratoria adecuada (filtros específicos)." },
            HazardItem { id: "quim_2", hazard: "Material particulado", control: "Mantenimiento periódico de mascarilla. Asegurar sello efectivo." },
            HazardItem { id: "quim_3", hazard: "Uso sustancias peligrosas", control: "Uso de EPP de acuerdo a FDS. Disponer de Ficha de Datos de Seguridad en sitio." },
            HazardItem { id: "quim_4", hazard: "Derrame de productos", control: "Definir plan de emergencia, contar con kit antiderrames." },
        ],
    },
    HazardCategory {
        name: "MECÁNICOS",
        items: &[
            HazardItem { id: "mec_1", hazard: "Proyección de partículas", control: "Uso obligatorio de EPP facial y visual." },
            HazardItem { id: "mec_2", hazard: "Mecanismo en movimiento", control: "Mantener guardas instaladas. No acercar segmentos corporales." },
            HazardItem { id: "mec_3", hazard: "Manejo de herramientas", control: "Inspección preoperacional. Uso en condiciones operativas seguras." },
            HazardItem { id: "mec_4", hazard: "Movimiento equipos pesados", control: "Señalización en sitio, paleta de pare y siga." },
        ],
    },
    HazardCategory {
        name: "BIOMECÁNICOS",
        items: &[
            HazardItem { id: "bio_1", hazard: "Carga Estática (Posturas)", control: "Calentamiento previo, pausas activas, higiene postural." },
            HazardItem { id: "bio_2", hazard: "Carga Dinámica (Peso)", control: "No levantar >25kg (H) / 12.5kg (M). Usar ayudas mecánicas." },
        ],
    },
    HazardCategory {
        name: "BIOLÓGICOS / VIAL",
        items: &[
            HazardItem { id: "biol_1", hazard: "Exposición vectores/enfermedades", control: "Orden y aseo, evitar acumulación de agua." },
            HazardItem { id: "vial_1", hazard: "Accidente vial (Peatonal)", control: "Hacer uso de vías definidas." },
            HazardItem { id: "vial_2", hazard: "Atropellamiento", control: "Respetar límites de velocidad (10km/h), no usar celular." },
        ],
    },
    HazardCategory {
        name: "AMBIENTALES",
        items: &[
            HazardItem { id: "amb_1", hazard: "Generación residuos", control: "Realizar separación y disponer según clasificación." },
            HazardItem { id: "amb_2", hazard: "Consumo de agua", control: "Uso eficiente, prevenir derrames." },
            HazardItem { id: "amb_3", hazard: "Mezcla concreto suelo", control: "Uso de mezcladora o recipiente." },
            HazardItem { id: "amb_4", hazard: "Emisiones material particulado", control: "Cubrir materiales que puedan generar polvo." },
        ],
    },
];

/// Look up a hazard item by catalog id.
pub fn hazard_item(id: &str) -> Option<&'static HazardItem> {
    HAZARD_MASTER_LIST
        .iter()
        .flat_map(|c| c.items.iter())
        .find(|i| i.id == id)
}

// ============================================================================
// Verification matrix sections
// ============================================================================

pub const VERIFICATION_SECTIONS: &[VerificationSection] = &[
    VerificationSection {
        name: "FÍSICOS",
        items: &["Ruido", "Iluminación Deficiente", "Temperaturas Extremas", "Vibración", "Radiación Ionizante", "Radiación NO ionizante", "Disconfort térmico", "Superficies calientes"],
    },
    VerificationSection {
        name: "QUÍMICOS",
        items: &["Gases y vapores", "Humos metálicos", "Fibras", "Polvos", "Liquidos Nieblas", "Liquidos Rocios"],
    },
    VerificationSection {
        name: "SEGURIDAD",
        items: &["Elementos de maquinas", "Herramientas mecanicas", "Herramientas manuales", "Equipos en movimiento", "Proyeccion de particulas", "Proyeccion de fluidos", "Equipos presurizados", "Intervencion sistemas electricos", "Adyacente equipos/lineas energizados", "Alta tension", "Baja tension", "Estática", "Fuga", "Incendio", "Explosion"],
    },
    VerificationSection {
        name: "LOCATIVOS",
        items: &["Trabajo alturas", "Espacios confinados", "Superficies irregulares", "Superficies deslizantes", "Superficies con desnivel", "Condiciones de orden y aseo", "Transito de vehiculos", "Almacenamiento"],
    },
    VerificationSection {
        name: "BIOLOGICO / AMBIENTAL",
        items: &["Picaduras", "Mordeduras", "Bacterias, virus hongos", "Fluidos o excrementos", "Generacion de residuos", "Emisiones y/o vertimientos", "Derrame potencial sutancias quimicas", "Uso material de arrastre o cantera"],
    },
    VerificationSection {
        name: "BIOMECANICOS",
        items: &["Posturas forzadas", "Posturas prolongada", "Esfuerzo", "Movimiento repetitivo", "Movimiento antigravitacional", "Manipulacion manual de cargas"],
    },
    VerificationSection {
        name: "PSICOSOCIAL",
        items: &["Pausas", "Trabajo nocturno", "Rotacion", "Horas extras", "Turno"],
    },
];

/// Whether a verification matrix key names a known checklist item.
pub fn verification_item_exists(name: &str) -> bool {
    VERIFICATION_SECTIONS
        .iter()
        .flat_map(|s| s.items.iter())
        .any(|i| *i == name)
}

// ============================================================================
// PPE / collective protection
// ============================================================================

pub const PPE_LIST: &[PpeItem] = &[
    PpeItem { key: "ropa_trabajo", label: "Ropa de trabajo", kind: PpeKind::Bool },
    PpeItem { key: "overol_ignifugo", label: "Overol Ignífugo (Categoría)", kind: PpeKind::Text },
    PpeItem { key: "prot_soldador", label: "Protección cuerpo para soldador", kind: PpeKind::Bool },
    PpeItem { key: "prot_respiratoria", label: "Protección respiratoria", kind: PpeKind::Bool },
    PpeItem { key: "casco", label: "Casco (Tipo/Clase)", kind: PpeKind::Text },
    PpeItem { key: "chavo", label: "Chavo en tela o carnaza", kind: PpeKind::Bool },
    PpeItem { key: "botas_dielectricas", label: "Botas de seguridad + dielectrica", kind: PpeKind::Bool },
    PpeItem { key: "prot_metatarso", label: "Protección metatarso", kind: PpeKind::Bool },
    PpeItem { key: "monogafas", label: "Monogafas / Gafas", kind: PpeKind::Bool },
    PpeItem { key: "careta_soldador", label: "Careta de soldador", kind: PpeKind::Bool },
    PpeItem { key: "gafas_oxicorte", label: "Gafas de oxicorte", kind: PpeKind::Bool },
    PpeItem { key: "careta_total", label: "Careta de protección total", kind: PpeKind::Bool },
    PpeItem { key: "auditiva_insercion", label: "Protección auditiva Inserción", kind: PpeKind::Bool },
    PpeItem { key: "auditiva_copa", label: "Protección auditiva copa", kind: PpeKind::Bool },
    PpeItem { key: "guantes_corte", label: "Guantes anti corte", kind: PpeKind::Bool },
    PpeItem { key: "guantes_quimicos", label: "Guantes sustancias químicas", kind: PpeKind::Bool },
    PpeItem { key: "guantes_temp", label: "Guantes temperatura", kind: PpeKind::Bool },
    PpeItem { key: "arnes", label: "Arnés (Tipo)", kind: PpeKind::Text },
    PpeItem { key: "mosqueton", label: "Mosquetón", kind: PpeKind::Bool },
    PpeItem { key: "eslinga", label: "Eslinga (Tipo)", kind: PpeKind::Text },
    PpeItem { key: "linea_vida", label: "Línea de vida (Tipo)", kind: PpeKind::Text },
    PpeItem { key: "punto_anclaje", label: "Punto de anclaje (Cual)", kind: PpeKind::Text },
    PpeItem { key: "senalizacion", label: "Señalización", kind: PpeKind::Bool },
    PpeItem { key: "barandas", label: "Barandas", kind: PpeKind::Bool },
    PpeItem { key: "delimitacion", label: "Delimitación Perimetral", kind: PpeKind::Bool },
    PpeItem { key: "control_acceso", label: "Control de acceso", kind: PpeKind::Bool },
];

/// Look up a PPE item by key.
pub fn ppe_item(key: &str) -> Option<&'static PpeItem> {
    PPE_LIST.iter().find(|i| i.key == key)
}

// ============================================================================
// Emergency checks & ATS justifications
// ============================================================================

pub const EMERGENCY_CHECKS: &[&str] = &[
    "NOTIFICACIÓN: El personal afectado fue notificado",
    "EMERGENCIAS: Recordar y verificar",
    "A.- Las emergencias potenciales que pueden ocurrir",
    "B.- Los procedimientos establecidos",
    "C.- Rutas de Evacuación",
    "D.- Puntos de encuentro",
    "E.- Ubicación equipos emergencia",
];

pub fn is_emergency_check(name: &str) -> bool {
    EMERGENCY_CHECKS.contains(&name)
}

pub const ATS_JUSTIFICATIONS: &[&str] = &[
    "TRABAJO RUTINARIO REALIZADO 1 VEZ CADA 3 MESES",
    "TRABAJO NO RUTINARIO (EMERGENCIA)",
    "TRABAJO RUTINARIO QUE NO POSEE UN PROCEDIMIENTO SEGURO",
    "TRABAJO NO RUTINARIO (PLANEADO)",
    "TRABAJO RUTINARIO CON CONDICIÓN ESPECÍFICA",
];

pub fn is_justification(text: &str) -> bool {
    ATS_JUSTIFICATIONS.contains(&text)
}

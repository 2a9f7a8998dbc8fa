// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Annual report answers and render context types.

use serde::{Deserialize, Serialize};

/// Per-year narrative answers document.
///
/// Stored in `annual_report_answers`, keyed by the four-digit year. Written
/// from the settings UI; read verbatim by the report job. Each answer
/// defaults to an empty string when the document does not exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnualReportAnswers {
    #[serde(default)]
    pub p1: String,
    #[serde(default)]
    pub p2: String,
    #[serde(default)]
    pub p3: String,
    #[serde(default)]
    pub p4: String,
    #[serde(default)]
    pub p5: String,
    #[serde(default)]
    pub p6: String,
}

impl AnnualReportAnswers {
    /// Answers in template order (`respuesta_p1` .. `respuesta_p6`).
    pub fn as_array(&self) -> [&str; 6] {
        [&self.p1, &self.p2, &self.p3, &self.p4, &self.p5, &self.p6]
    }
}

/// An image resolved and sized for embedding.
#[derive(Debug, Clone)]
pub struct ReportImage {
    /// Raw encoded image bytes (PNG/JPEG/GIF)
    pub bytes: Vec<u8>,
    /// Display width in pixels (already capped)
    pub width_px: u32,
    /// Display height in pixels (aspect preserved)
    pub height_px: u32,
}

/// One entry of the `lista_actividades` template section.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub titulo: String,
    /// Formatted date plus optional time, e.g. `15 de junio de 2025, 18:30`
    pub fecha: String,
    /// Composed multi-paragraph description
    pub descripcion: String,
    pub imagenes: Vec<ReportImage>,
}

/// One entry of the `lista_bautismos` template section.
#[derive(Debug, Clone)]
pub struct BaptismEntry {
    /// `name (formatted date)`
    pub nombre: String,
    pub imagenes: Vec<ReportImage>,
}

/// Fully-resolved input of the template renderer.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub fecha_reporte: String,
    pub respuestas: [String; 6],
    pub lista_actividades: Vec<ActivityEntry>,
    pub lista_bautismos: Vec<BaptismEntry>,
}

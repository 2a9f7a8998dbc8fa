// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Annual report generation service.
//!
//! Handles the core workflow:
//! 1. Aggregate activities, baptisms and answers for the year
//! 2. Fetch the DOCX template from object storage
//! 3. Resolve and size every item's images (bounded pool)
//! 4. Render the template and hand back the document bytes

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::report::{ActivityEntry, BaptismEntry, ReportContext, ReportImage};
use crate::models::{Activity, Baptism};
use crate::services::aggregator::{ReportAggregator, YearData};
use crate::services::images::{resolve_item_images, ImageFetcher};
use crate::services::{docx, TemplateStorage};
use crate::time_utils::format_date_es;
use chrono::NaiveDate;

/// Optional description sections, appended in this exact order.
const DESCRIPTION_SECTIONS: [&str; 4] = ["Texto adicional", "Lugar", "Contexto", "Aprendizaje"];

/// Generates the annual report document.
#[derive(Clone)]
pub struct ReportService {
    aggregator: ReportAggregator,
    storage: TemplateStorage,
    images: ImageFetcher,
}

impl ReportService {
    pub fn new(db: FirestoreDb, storage: TemplateStorage, images: ImageFetcher) -> Self {
        Self {
            aggregator: ReportAggregator::new(db),
            storage,
            images,
        }
    }

    /// Generate the report for `year` and return the DOCX bytes.
    pub async fn generate(&self, year: i32) -> Result<Vec<u8>> {
        tracing::info!(year, "Generating annual report");

        let data = self.aggregator.collect_year(year).await?;
        let template = self.storage.fetch_template().await?;

        // One URL list per report item, activities first, then baptisms.
        let mut items: Vec<Vec<String>> = data
            .activities
            .iter()
            .map(|a| a.image_urls.clone())
            .collect();
        items.extend(data.baptisms.iter().map(|b| b.photo_urls.clone()));

        let mut resolved = resolve_item_images(&self.images, items).await;
        let baptism_images = resolved.split_off(data.activities.len());
        let activity_images = resolved;

        let today = chrono::Utc::now().date_naive();
        let ctx = build_context(today, &data, activity_images, baptism_images);

        let bytes =
            docx::render_report(&template, &ctx).map_err(|e| AppError::Render(e.to_string()))?;

        tracing::info!(
            year,
            activities = ctx.lista_actividades.len(),
            baptisms = ctx.lista_bautismos.len(),
            size = bytes.len(),
            "Annual report rendered"
        );

        Ok(bytes)
    }
}

/// Assemble the render context from aggregated data and resolved images.
pub fn build_context(
    report_date: NaiveDate,
    data: &YearData,
    activity_images: Vec<Vec<ReportImage>>,
    baptism_images: Vec<Vec<ReportImage>>,
) -> ReportContext {
    let lista_actividades = data
        .activities
        .iter()
        .zip(activity_images)
        .map(|(activity, imagenes)| activity_entry(activity, imagenes))
        .collect();

    let lista_bautismos = data
        .baptisms
        .iter()
        .zip(baptism_images)
        .map(|(baptism, imagenes)| baptism_entry(baptism, imagenes))
        .collect();

    let respuestas = data.answers.as_array().map(str::to_string);

    ReportContext {
        fecha_reporte: format_date_es(report_date),
        respuestas,
        lista_actividades,
        lista_bautismos,
    }
}

/// Template entry for one activity.
pub fn activity_entry(activity: &Activity, imagenes: Vec<ReportImage>) -> ActivityEntry {
    let mut fecha = format_date_es(activity.date.date_naive());
    if let Some(time) = activity.time.as_deref().filter(|t| !t.is_empty()) {
        fecha = format!("{}, {}", fecha, time);
    }

    ActivityEntry {
        titulo: activity.title.clone(),
        fecha,
        descripcion: compose_description(activity),
        imagenes,
    }
}

/// Template entry for one baptism: `name (formatted date)`.
pub fn baptism_entry(baptism: &Baptism, imagenes: Vec<ReportImage>) -> BaptismEntry {
    BaptismEntry {
        nombre: format!(
            "{} ({})",
            baptism.name,
            format_date_es(baptism.date.date_naive())
        ),
        imagenes,
    }
}

/// Compose the activity description: base text plus the optional labeled
/// sections, each appended only when non-empty, in fixed order.
pub fn compose_description(activity: &Activity) -> String {
    let values = [
        activity.additional_text.as_deref(),
        activity.location.as_deref(),
        activity.context.as_deref(),
        activity.learning.as_deref(),
    ];

    let mut text = activity.description.clone();
    for (label, value) in DESCRIPTION_SECTIONS.iter().zip(values) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            text.push_str(&format!("\n\n{}: {}", label, value));
        }
    }
    text
}

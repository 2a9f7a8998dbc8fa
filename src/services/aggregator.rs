// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report data aggregation for a target calendar year.
//!
//! Queries are ordered by date descending and filtered client-side to the
//! year range (index-then-filter, matching how the collections are read
//! elsewhere in the app). Baptisms merge two source collections into the
//! tagged [`Baptism`] shape before sorting.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Activity, AnnualReportAnswers, Baptism, FutureMember, ManualBaptism};
use crate::time_utils::in_year;

/// Everything the report template needs for one year.
#[derive(Debug, Clone)]
pub struct YearData {
    /// Activities in range, date descending
    pub activities: Vec<Activity>,
    /// Merged baptisms in range, date descending
    pub baptisms: Vec<Baptism>,
    /// Narrative answers (all empty when the year has none)
    pub answers: AnnualReportAnswers,
}

/// Aggregates the three report sources for a given year.
#[derive(Clone)]
pub struct ReportAggregator {
    db: FirestoreDb,
}

impl ReportAggregator {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Collect activities, baptisms and answers for `year`.
    ///
    /// An empty year yields empty vectors, not an error.
    pub async fn collect_year(&self, year: i32) -> Result<YearData, AppError> {
        let activities = filter_activities_by_year(self.db.list_activities().await?, year);

        let manual = self.db.list_manual_baptisms().await?;
        let future = self.db.list_future_members().await?;
        let baptisms = merge_baptisms(manual, future, year);

        let answers = self.db.get_annual_answers(year).await?.unwrap_or_default();

        tracing::debug!(
            year,
            activities = activities.len(),
            baptisms = baptisms.len(),
            "Aggregated report data"
        );

        Ok(YearData {
            activities,
            baptisms,
            answers,
        })
    }
}

/// Keep only activities dated inside `year`, preserving the query order.
pub fn filter_activities_by_year(mut activities: Vec<Activity>, year: i32) -> Vec<Activity> {
    activities.retain(|a| in_year(a.date, year));
    activities
}

/// Merge both baptism sources into one tagged list, date descending.
pub fn merge_baptisms(
    manual: Vec<ManualBaptism>,
    future: Vec<FutureMember>,
    year: i32,
) -> Vec<Baptism> {
    let mut merged: Vec<Baptism> = future
        .into_iter()
        .filter_map(Baptism::from_future_member)
        .filter(|b| in_year(b.date, year))
        .collect();

    merged.extend(
        manual
            .into_iter()
            .map(Baptism::from)
            .filter(|b| in_year(b.date, year)),
    );

    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

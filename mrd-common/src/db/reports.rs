//! Report store: persistence contract and SQLite backend
//!
//! The assembler and the CRUD surface talk to storage only through the
//! `ReportStore` trait; each call is its own atomic unit (no cross-fragment
//! transaction), so a partial batch failure never rolls back earlier merges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::report::{MarketReport, NewMarketReport, ReportPatch, ReportSection};
use crate::{Error, Result};

/// Persistence contract for market reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a new report, generating id and created_at
    async fn create(&self, new: NewMarketReport) -> Result<MarketReport>;

    /// Fetch one report by id
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MarketReport>>;

    /// Overwrite a single section slot, leaving all others untouched
    ///
    /// Returns `None` when the report no longer exists (e.g. deleted between
    /// fragments of a batch).
    async fn update_section(
        &self,
        id: Uuid,
        section: ReportSection,
        value: &serde_json::Value,
    ) -> Result<Option<MarketReport>>;

    /// Apply a partial update; absent patch fields are left untouched
    async fn update(&self, id: Uuid, patch: ReportPatch) -> Result<Option<MarketReport>>;

    /// All reports, newest first
    async fn list_all(&self) -> Result<Vec<MarketReport>>;

    /// Reports for one industry, newest first
    async fn list_by_industry(&self, industry: &str) -> Result<Vec<MarketReport>>;

    /// Reports for one region, newest first
    async fn list_by_region(&self, region: &str) -> Result<Vec<MarketReport>>;

    /// Delete a report; false when no such report existed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// SQLite-backed report store
#[derive(Clone)]
pub struct SqliteReportStore {
    pool: SqlitePool,
}

impl SqliteReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, industry_name, company_type, report_scope, region, \
     submitted_at, form_mode, executive_summary, market_introduction, market_dynamics, \
     market_growth_trends, market_segmentation, competitor_analysis, created_at";

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn create(&self, new: NewMarketReport) -> Result<MarketReport> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO market_reports (
                id, industry_name, company_type, report_scope, region,
                submitted_at, form_mode, executive_summary, market_introduction,
                market_dynamics, market_growth_trends, market_segmentation,
                competitor_analysis, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&new.industry_name)
        .bind(&new.company_type)
        .bind(&new.report_scope)
        .bind(&new.region)
        .bind(new.submitted_at.to_rfc3339())
        .bind(&new.form_mode)
        .bind(to_json_column(&new.executive_summary)?)
        .bind(to_json_column(&new.market_introduction)?)
        .bind(to_json_column(&new.market_dynamics)?)
        .bind(to_json_column(&new.market_growth_trends)?)
        .bind(to_json_column(&new.market_segmentation)?)
        .bind(to_json_column(&new.competitor_analysis)?)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(MarketReport {
            id,
            industry_name: new.industry_name,
            company_type: new.company_type,
            report_scope: new.report_scope,
            region: new.region,
            submitted_at: new.submitted_at,
            form_mode: new.form_mode,
            executive_summary: new.executive_summary,
            market_introduction: new.market_introduction,
            market_dynamics: new.market_dynamics,
            market_growth_trends: new.market_growth_trends,
            market_segmentation: new.market_segmentation,
            competitor_analysis: new.competitor_analysis,
            created_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MarketReport>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM market_reports WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_report(&r)).transpose()
    }

    async fn update_section(
        &self,
        id: Uuid,
        section: ReportSection,
        value: &serde_json::Value,
    ) -> Result<Option<MarketReport>> {
        // Column names come from the closed ReportSection enum, never from input
        let result = sqlx::query(&format!(
            "UPDATE market_reports SET {} = ? WHERE id = ?",
            section.column()
        ))
        .bind(serde_json::to_string(value)?)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    async fn update(&self, id: Uuid, patch: ReportPatch) -> Result<Option<MarketReport>> {
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        // (column, bound value) pairs; section slots serialize to JSON text
        let mut changes: Vec<(&'static str, String)> = Vec::new();

        if let Some(v) = patch.industry_name {
            changes.push(("industry_name", v));
        }
        if let Some(v) = patch.company_type {
            changes.push(("company_type", v));
        }
        if let Some(v) = patch.report_scope {
            changes.push(("report_scope", v));
        }
        if let Some(v) = patch.region {
            changes.push(("region", v));
        }
        if let Some(v) = patch.form_mode {
            changes.push(("form_mode", v));
        }
        if let Some(v) = &patch.executive_summary {
            changes.push(("executive_summary", serde_json::to_string(v)?));
        }
        if let Some(v) = &patch.market_introduction {
            changes.push(("market_introduction", serde_json::to_string(v)?));
        }
        if let Some(v) = &patch.market_dynamics {
            changes.push(("market_dynamics", serde_json::to_string(v)?));
        }
        if let Some(v) = &patch.market_growth_trends {
            changes.push(("market_growth_trends", serde_json::to_string(v)?));
        }
        if let Some(v) = &patch.market_segmentation {
            changes.push(("market_segmentation", serde_json::to_string(v)?));
        }
        if let Some(v) = &patch.competitor_analysis {
            changes.push(("competitor_analysis", serde_json::to_string(v)?));
        }

        let assignments = changes
            .iter()
            .map(|(col, _)| format!("{col} = ?"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!("UPDATE market_reports SET {assignments} WHERE id = ?");
        let mut query = sqlx::query(&sql);
        for (_, value) in &changes {
            query = query.bind(value);
        }
        let result = query.bind(id.to_string()).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    async fn list_all(&self) -> Result<Vec<MarketReport>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM market_reports ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }

    async fn list_by_industry(&self, industry: &str) -> Result<Vec<MarketReport>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM market_reports WHERE industry_name = ? ORDER BY created_at DESC"
        ))
        .bind(industry)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }

    async fn list_by_region(&self, region: &str) -> Result<Vec<MarketReport>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM market_reports WHERE region = ? ORDER BY created_at DESC"
        ))
        .bind(region)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM market_reports WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn to_json_column<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(Error::from)
}

fn from_json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<Option<T>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| serde_json::from_str(&s)).transpose().map_err(Error::from)
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid {column} timestamp '{raw}': {e}")))
}

fn row_to_report(row: &SqliteRow) -> Result<MarketReport> {
    let id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Invalid report id '{id}': {e}")))?;

    let submitted_at: String = row.try_get("submitted_at")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(MarketReport {
        id,
        industry_name: row.try_get("industry_name")?,
        company_type: row.try_get("company_type")?,
        report_scope: row.try_get("report_scope")?,
        region: row.try_get("region")?,
        submitted_at: parse_timestamp(&submitted_at, "submitted_at")?,
        form_mode: row.try_get("form_mode")?,
        executive_summary: from_json_column(row, "executive_summary")?,
        market_introduction: from_json_column(row, "market_introduction")?,
        market_dynamics: from_json_column(row, "market_dynamics")?,
        market_growth_trends: from_json_column(row, "market_growth_trends")?,
        market_segmentation: from_json_column(row, "market_segmentation")?,
        competitor_analysis: from_json_column(row, "competitor_analysis")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}

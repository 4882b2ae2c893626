//! Project lifecycle business logic.
//!
//! A project is the root every ledger row, calculation and summary belongs to.
//! Projects move through four phases in order; reaching the last one closes
//! the project. Deleting a project removes everything it owns and clears any
//! session that had it selected.

use crate::{
    core::{
        lookup, money,
        summary::{self, SummaryReport},
    },
    entities::{
        BudgetItem, CableCalculation, Calculation, FinancialSummary, GypsumCalculation,
        ItemCategory, LedStripCalculation, PaintCalculation, Project, ProjectPhase, ProjectStatus,
        ProjectType, RealExpense, Session, budget_item, calculation, calculation_details,
        financial_summary, project, real_expense, session,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    Iterable, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::info;

const fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

const fn default_phase() -> ProjectPhase {
    ProjectPhase::Design
}

/// Fields a client supplies for a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInput {
    /// Project name
    pub name: String,
    /// Client name
    pub client: String,
    /// Site address
    #[serde(default)]
    pub location: String,
    /// Kind of building
    pub project_type: ProjectType,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Planned start
    pub start_date: NaiveDate,
    /// Planned end; not before the start
    pub end_date: Option<NaiveDate>,
    /// Commercial status, defaults to planning
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
    /// Lifecycle phase, defaults to design
    #[serde(default = "default_phase")]
    pub current_phase: ProjectPhase,
    /// Link to the shared document folder
    pub document_folder_url: Option<String>,
    /// Budget agreed with the client
    pub initial_budget: Option<Decimal>,
}

impl ProjectInput {
    /// A residential project in planning, starting on `start_date`.
    #[must_use]
    pub fn new(name: &str, client: &str, start_date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            client: client.to_string(),
            location: String::new(),
            project_type: ProjectType::Residential,
            description: String::new(),
            start_date,
            end_date: None,
            status: default_status(),
            current_phase: default_phase(),
            document_folder_url: None,
            initial_budget: None,
        }
    }
}

/// Project list filters; they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    /// Only this kind of building
    pub project_type: Option<ProjectType>,
    /// Only this status
    pub status: Option<ProjectStatus>,
    /// Only this phase
    pub current_phase: Option<ProjectPhase>,
    /// Inclusive lower bound on the start date
    pub start_from: Option<NaiveDate>,
    /// Inclusive upper bound on the start date
    pub start_to: Option<NaiveDate>,
    /// Substring match on name, client or location
    pub search: Option<String>,
}

fn validate(input: &ProjectInput) -> Result<Option<Decimal>> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("name cannot be empty"));
    }
    if input.client.trim().is_empty() {
        return Err(Error::validation("client cannot be empty"));
    }
    if let Some(end) = input.end_date.filter(|end| *end < input.start_date) {
        return Err(Error::validation(format!(
            "end_date {end} is before start_date {}",
            input.start_date
        )));
    }
    input
        .initial_budget
        .map(|budget| money::non_negative_money("initial_budget", budget))
        .transpose()
}

/// Creates a project.
pub async fn create_project<C>(db: &C, input: ProjectInput) -> Result<project::Model>
where
    C: ConnectionTrait,
{
    let initial_budget = validate(&input)?;

    let now = chrono::Utc::now();
    let model = project::ActiveModel {
        name: Set(input.name.trim().to_string()),
        client: Set(input.client.trim().to_string()),
        location: Set(input.location),
        project_type: Set(input.project_type),
        description: Set(input.description),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        actual_end_date: Set(None),
        current_phase: Set(input.current_phase),
        status: Set(input.status),
        document_folder_url: Set(input.document_folder_url),
        initial_budget: Set(initial_budget),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(project_id = created.id, name = %created.name, "Project created");
    Ok(created)
}

/// Retrieves a project by id.
pub async fn get_project(db: &DatabaseConnection, project_id: i64) -> Result<project::Model> {
    lookup::require::<Project, _>(db, "Project", project_id).await
}

/// Replaces a project's editable fields. Phase changes go through [`advance_phase`].
pub async fn update_project(
    db: &DatabaseConnection,
    project_id: i64,
    input: ProjectInput,
) -> Result<project::Model> {
    let initial_budget = validate(&input)?;
    let existing = get_project(db, project_id).await?;

    let mut model: project::ActiveModel = existing.into();
    model.name = Set(input.name.trim().to_string());
    model.client = Set(input.client.trim().to_string());
    model.location = Set(input.location);
    model.project_type = Set(input.project_type);
    model.description = Set(input.description);
    model.start_date = Set(input.start_date);
    model.end_date = Set(input.end_date);
    model.status = Set(input.status);
    model.document_folder_url = Set(input.document_folder_url);
    model.initial_budget = Set(initial_budget);
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes a project with its ledgers, calculations and summary, and clears
/// every session that had it selected.
pub async fn delete_project(db: &DatabaseConnection, project_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let project = lookup::require::<Project, _>(&txn, "Project", project_id).await?;

    let calculation_ids: Vec<i64> = Calculation::find()
        .select_only()
        .column(calculation::Column::Id)
        .filter(calculation::Column::ProjectId.eq(project_id))
        .into_tuple()
        .all(&txn)
        .await?;

    PaintCalculation::delete_many()
        .filter(calculation_details::paint::Column::CalculationId.is_in(calculation_ids.clone()))
        .exec(&txn)
        .await?;
    GypsumCalculation::delete_many()
        .filter(calculation_details::gypsum::Column::CalculationId.is_in(calculation_ids.clone()))
        .exec(&txn)
        .await?;
    LedStripCalculation::delete_many()
        .filter(
            calculation_details::led_strip::Column::CalculationId.is_in(calculation_ids.clone()),
        )
        .exec(&txn)
        .await?;
    CableCalculation::delete_many()
        .filter(calculation_details::cable::Column::CalculationId.is_in(calculation_ids))
        .exec(&txn)
        .await?;
    Calculation::delete_many()
        .filter(calculation::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    RealExpense::delete_many()
        .filter(real_expense::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    BudgetItem::delete_many()
        .filter(budget_item::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    FinancialSummary::delete_many()
        .filter(financial_summary::Column::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;
    Session::update_many()
        .col_expr(
            session::Column::SelectedProjectId,
            Expr::value(Option::<i64>::None),
        )
        .filter(session::Column::SelectedProjectId.eq(project_id))
        .exec(&txn)
        .await?;

    project.delete(&txn).await?;
    txn.commit().await?;

    info!(project_id, "Project deleted");
    Ok(())
}

/// Lists projects matching `filter`, newest first.
pub async fn list_projects(
    db: &DatabaseConnection,
    filter: &ProjectFilter,
) -> Result<Vec<project::Model>> {
    let mut query = Project::find();

    if let Some(project_type) = filter.project_type {
        query = query.filter(project::Column::ProjectType.eq(project_type));
    }
    if let Some(status) = filter.status {
        query = query.filter(project::Column::Status.eq(status));
    }
    if let Some(phase) = filter.current_phase {
        query = query.filter(project::Column::CurrentPhase.eq(phase));
    }
    if let Some(from) = filter.start_from {
        query = query.filter(project::Column::StartDate.gte(from));
    }
    if let Some(to) = filter.start_to {
        query = query.filter(project::Column::StartDate.lte(to));
    }
    if let Some(search) = &filter.search {
        let s = search.as_str();
        query = query.filter(
            project::Column::Name
                .contains(s)
                .or(project::Column::Client.contains(s))
                .or(project::Column::Location.contains(s)),
        );
    }

    query
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a project to its next phase.
///
/// Reaching the completed phase also sets the status to completed and stamps
/// `actual_end_date` with `today`.
///
/// # Errors
/// `Error::Conflict` when the project is already completed.
pub async fn advance_phase(
    db: &DatabaseConnection,
    project_id: i64,
    today: NaiveDate,
) -> Result<project::Model> {
    let existing = get_project(db, project_id).await?;
    let next = existing.current_phase.next().ok_or_else(|| {
        Error::conflict(format!("Project {project_id} is already in its final phase"))
    })?;

    let mut model: project::ActiveModel = existing.into();
    model.current_phase = Set(next);
    if next == ProjectPhase::Completed {
        model.status = Set(ProjectStatus::Completed);
        model.actual_end_date = Set(Some(today));
    }
    model.updated_at = Set(chrono::Utc::now());

    let updated = model.update(db).await?;
    info!(project_id, phase = ?updated.current_phase, "Project phase advanced");
    Ok(updated)
}

/// A project with its derived schedule figures.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    /// Stored project
    #[serde(flatten)]
    pub project: project::Model,
    /// Days between start and end, when the end is set
    pub duration_days: Option<i64>,
    /// End date passed and not completed
    pub is_overdue: bool,
    /// Progress implied by the phase
    pub progress_percentage: u8,
}

impl ProjectDetail {
    /// Derives the schedule figures as of `today`.
    #[must_use]
    pub fn new(project: project::Model, today: NaiveDate) -> Self {
        Self {
            duration_days: project.duration_days(),
            is_overdue: project.is_overdue(today),
            progress_percentage: project.progress_percentage(),
            project,
        }
    }
}

/// Planned and spent amounts of one bucket.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BucketProgress {
    /// Sum of budget lines
    pub budgeted: Decimal,
    /// Sum of expenses
    pub spent: Decimal,
}

/// Dashboard breakdown over the three summary buckets.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BudgetByBucket {
    /// Construction bucket
    pub construction: BucketProgress,
    /// Lighting bucket
    pub lighting: BucketProgress,
    /// Electrical, labor and others
    pub others: BucketProgress,
}

/// Short form of an expense for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RecentExpense {
    /// Expense id
    pub id: i64,
    /// Purchase description
    pub description: String,
    /// Discounted total
    pub total_price: Decimal,
    /// Day of purchase
    pub purchase_date: NaiveDate,
    /// Ledger category
    pub category: ItemCategory,
}

/// Row counts shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatistics {
    /// Budget lines in the project
    pub budget_items_count: u64,
    /// Expenses in the project
    pub expenses_count: u64,
    /// Calculator runs in the project
    pub calculations_count: u64,
    /// Five latest purchases, newest first
    pub recent_expenses: Vec<RecentExpense>,
}

/// Everything the project overview screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDashboard {
    /// Project with schedule figures
    pub project: ProjectDetail,
    /// Summary and derived metrics
    pub financial_summary: SummaryReport,
    /// Planned vs spent per bucket
    pub budget_by_category: BudgetByBucket,
    /// Row counts and latest purchases
    pub statistics: DashboardStatistics,
}

/// Builds the overview of one project as of `today`.
pub async fn dashboard(
    db: &DatabaseConnection,
    project_id: i64,
    today: NaiveDate,
) -> Result<ProjectDashboard> {
    let project = get_project(db, project_id).await?;
    let summary = summary::get_or_create_summary(db, project_id).await?;

    let budget_by_category = BudgetByBucket {
        construction: BucketProgress {
            budgeted: summary.budget_construction,
            spent: summary.expenses_construction,
        },
        lighting: BucketProgress {
            budgeted: summary.budget_lighting,
            spent: summary.expenses_lighting,
        },
        others: BucketProgress {
            budgeted: summary.budget_others,
            spent: summary.expenses_others,
        },
    };

    let budget_items_count = BudgetItem::find()
        .filter(budget_item::Column::ProjectId.eq(project_id))
        .count(db)
        .await?;
    let expenses_count = RealExpense::find()
        .filter(real_expense::Column::ProjectId.eq(project_id))
        .count(db)
        .await?;
    let calculations_count = Calculation::find()
        .filter(calculation::Column::ProjectId.eq(project_id))
        .count(db)
        .await?;
    let recent_expenses = RealExpense::find()
        .filter(real_expense::Column::ProjectId.eq(project_id))
        .order_by_desc(real_expense::Column::PurchaseDate)
        .order_by_desc(real_expense::Column::Id)
        .limit(5)
        .all(db)
        .await?
        .into_iter()
        .map(|e| RecentExpense {
            id: e.id,
            description: e.description,
            total_price: e.total_price,
            purchase_date: e.purchase_date,
            category: e.category,
        })
        .collect();

    Ok(ProjectDashboard {
        project: ProjectDetail::new(project, today),
        financial_summary: SummaryReport::from(summary),
        budget_by_category,
        statistics: DashboardStatistics {
            budget_items_count,
            expenses_count,
            calculations_count,
            recent_expenses,
        },
    })
}

/// Number of projects in one status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    /// Status counted
    pub status: ProjectStatus,
    /// Projects in it
    pub count: u64,
}

/// Number of projects in one phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseCount {
    /// Phase counted
    pub phase: ProjectPhase,
    /// Projects in it
    pub count: u64,
}

/// Portfolio-wide project counts.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    /// All projects
    pub total_projects: u64,
    /// Count per status, every status listed
    pub by_status: Vec<StatusCount>,
    /// Count per phase, every phase listed
    pub by_phase: Vec<PhaseCount>,
    /// Projects past their end date and not completed
    pub overdue_projects: u64,
}

/// Project counts by status and phase, plus how many are overdue on `today`.
pub async fn project_stats(db: &DatabaseConnection, today: NaiveDate) -> Result<ProjectStats> {
    let projects = Project::find().all(db).await?;

    Ok(ProjectStats {
        total_projects: projects.len() as u64,
        by_status: ProjectStatus::iter()
            .map(|status| StatusCount {
                status,
                count: projects.iter().filter(|p| p.status == status).count() as u64,
            })
            .collect(),
        by_phase: ProjectPhase::iter()
            .map(|phase| PhaseCount {
                phase,
                count: projects.iter().filter(|p| p.current_phase == phase).count() as u64,
            })
            .collect(),
        overdue_projects: projects.iter().filter(|p| p.is_overdue(today)).count() as u64,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{budget, session};
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_project_rejects_end_before_start() -> Result<()> {
        let db = setup_test_db().await?;
        let input = ProjectInput {
            end_date: Some(day(1, 1)),
            ..ProjectInput::new("Office fit-out", "Acme", day(2, 1))
        };
        let result = create_project(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_advance_phase_until_completed() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        assert_eq!(project.current_phase, ProjectPhase::Design);

        let p = advance_phase(&db, project.id, day(3, 1)).await?;
        assert_eq!(p.current_phase, ProjectPhase::Purchase);
        assert_eq!(p.actual_end_date, None);

        advance_phase(&db, project.id, day(3, 2)).await?;
        let done = advance_phase(&db, project.id, day(3, 3)).await?;
        assert_eq!(done.current_phase, ProjectPhase::Completed);
        assert_eq!(done.status, ProjectStatus::Completed);
        assert_eq!(done.actual_end_date, Some(day(3, 3)));
        assert_eq!(done.progress_percentage(), 100);

        let again = advance_phase(&db, project.id, day(3, 4)).await;
        assert!(matches!(again, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_project_removes_children_and_selection() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let other = create_test_project(&db, "Keep me").await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(10))
            .await?;
        create_expense_with_total(&db, project.id, ItemCategory::Construction, dec!(5)).await?;
        create_budget_item_with_total(&db, other.id, ItemCategory::Lighting, dec!(7)).await?;
        session::select_project(&db, "tablet-1", project.id).await?;

        delete_project(&db, project.id).await?;

        assert!(matches!(
            get_project(&db, project.id).await,
            Err(Error::NotFound { .. })
        ));
        let remaining = budget::list_budget_items(&db, &budget::BudgetItemFilter::default()).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].project_id, other.id);
        assert!(RealExpense::find().all(&db).await?.is_empty());
        assert!(session::selected_project(&db, "tablet-1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_reports_buckets_and_counts() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(100))
            .await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Lighting, dec!(50)).await?;
        create_expense_with_total(&db, project.id, ItemCategory::Construction, dec!(80)).await?;

        let board = dashboard(&db, project.id, day(6, 1)).await?;
        assert_eq!(board.budget_by_category.construction.budgeted, dec!(100));
        assert_eq!(board.budget_by_category.construction.spent, dec!(80));
        assert_eq!(board.budget_by_category.lighting.budgeted, dec!(50));
        assert_eq!(board.financial_summary.summary.balance, dec!(70));
        assert!(!board.financial_summary.is_over_budget);
        assert_eq!(board.statistics.budget_items_count, 2);
        assert_eq!(board.statistics.expenses_count, 1);
        assert_eq!(board.statistics.calculations_count, 0);
        assert_eq!(board.statistics.recent_expenses.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_project_stats_counts_overdue() -> Result<()> {
        let db = setup_test_db().await?;
        create_project(
            &db,
            ProjectInput {
                end_date: Some(day(1, 31)),
                ..ProjectInput::new("Late", "Client", day(1, 1))
            },
        )
        .await?;
        create_project(
            &db,
            ProjectInput {
                end_date: Some(day(12, 31)),
                status: ProjectStatus::InProgress,
                ..ProjectInput::new("On time", "Client", day(1, 1))
            },
        )
        .await?;

        let stats = project_stats(&db, day(6, 1)).await?;
        assert_eq!(stats.total_projects, 2);
        assert_eq!(stats.overdue_projects, 1);
        let planning = stats
            .by_status
            .iter()
            .find(|s| s.status == ProjectStatus::Planning)
            .unwrap();
        assert_eq!(planning.count, 1);
        let design = stats
            .by_phase
            .iter()
            .find(|p| p.phase == ProjectPhase::Design)
            .unwrap();
        assert_eq!(design.count, 2);
        Ok(())
    }
}

//! # Tender Repository
//!
//! Data access for tender rows. The status column is only ever written
//! through `update_status_guarded`, which makes the transition conditional
//! on the expected source status so concurrent transitions cannot stack.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::tender::{ActiveModel, Column, Entity, Model};
use crate::workflow::status::TenderStatus;

pub type DateTimeFixed = DateTime<FixedOffset>;

/// Fields supplied by the caller when creating a tender.
#[derive(Debug, Clone)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub budget: Decimal,
    pub deadline: DateTimeFixed,
    pub company_id: Uuid,
    pub required_department_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

/// Repository for tender database operations
pub struct TenderRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TenderRepository<'a, C> {
    /// Create a new TenderRepository on the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new tender in draft with a pre-generated reference number.
    pub async fn insert(
        &self,
        reference_number: String,
        fields: NewTender,
        created_by: Uuid,
        now: DateTimeFixed,
    ) -> Result<Model, WorkflowError> {
        let tender = ActiveModel {
            id: Set(Uuid::new_v4()),
            reference_number: Set(reference_number),
            name: Set(fields.name),
            description: Set(fields.description),
            budget: Set(fields.budget),
            deadline: Set(fields.deadline),
            status: Set(TenderStatus::Draft.as_str().to_string()),
            created_by: Set(created_by),
            company_id: Set(fields.company_id),
            required_department_id: Set(fields.required_department_id),
            category_id: Set(fields.category_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = tender
            .insert(self.conn)
            .await
            .map_err(|e| WorkflowError::from_db(e, "reference number already taken"))?;

        Ok(model)
    }

    /// Fetch a tender by id.
    pub async fn find_by_id(&self, tender_id: Uuid) -> Result<Option<Model>, WorkflowError> {
        Ok(Entity::find_by_id(tender_id).one(self.conn).await?)
    }

    /// Fetch a tender by id, failing with NotFound when absent.
    pub async fn get(&self, tender_id: Uuid) -> Result<Model, WorkflowError> {
        self.find_by_id(tender_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("tender".to_string()))
    }

    /// Fetch a tender by its reference number.
    pub async fn find_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<Option<Model>, WorkflowError> {
        let tender = Entity::find()
            .filter(Column::ReferenceNumber.eq(reference_number))
            .one(self.conn)
            .await?;

        Ok(tender)
    }

    /// Flip the status column, conditional on the expected source status.
    ///
    /// Returns the refreshed row, or `ConflictRetryable` when zero rows
    /// matched because a concurrent transaction moved the tender first.
    pub async fn update_status_guarded(
        &self,
        tender_id: Uuid,
        from: TenderStatus,
        to: TenderStatus,
        now: DateTimeFixed,
    ) -> Result<Model, WorkflowError> {
        let result = Entity::update_many()
            .col_expr(Column::Status, Expr::value(to.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(tender_id))
            .filter(Column::Status.eq(from.as_str()))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(WorkflowError::ConflictRetryable(format!(
                "tender is no longer in status {from}"
            )));
        }

        self.get(tender_id).await
    }

    /// List all tenders.
    pub async fn list_all(&self) -> Result<Vec<Model>, WorkflowError> {
        Ok(Entity::find().all(self.conn).await?)
    }

    /// List tenders currently in the given status.
    pub async fn list_by_status(
        &self,
        status: TenderStatus,
    ) -> Result<Vec<Model>, WorkflowError> {
        let tenders = Entity::find()
            .filter(Column::Status.eq(status.as_str()))
            .all(self.conn)
            .await?;

        Ok(tenders)
    }
}

//! Manager assignment registry.
//!
//! Tracks which manager is currently responsible for a tender. Reassignment
//! is the only mutation path: `assign` deactivates every existing active row
//! and inserts exactly one new active row inside the caller's transaction.
//! The partial unique index on (tender_id) WHERE is_active turns a racing
//! second assignment into a unique violation, surfaced as
//! `ConflictRetryable` rather than a second active row.

use chrono::{DateTime, FixedOffset};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::manager_assignment::{ActiveModel, Column, Entity, Model};
use crate::repositories::UserRepository;
use crate::workflow::status::Role;

/// Deactivate all active assignments for `tender_id` and insert one new
/// active row. Must run inside the lifecycle transaction so readers never
/// observe zero or two active rows.
pub async fn assign<C: ConnectionTrait>(
    conn: &C,
    tender_id: Uuid,
    manager_id: Uuid,
    assigned_by: Uuid,
    now: DateTime<FixedOffset>,
) -> Result<Model, WorkflowError> {
    Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .filter(Column::TenderId.eq(tender_id))
        .filter(Column::IsActive.eq(true))
        .exec(conn)
        .await?;

    let assignment = ActiveModel {
        id: Set(Uuid::new_v4()),
        tender_id: Set(tender_id),
        manager_id: Set(manager_id),
        assigned_by: Set(assigned_by),
        is_active: Set(true),
        assigned_at: Set(now),
    };

    let model = assignment.insert(conn).await.map_err(|e| {
        WorkflowError::from_db(e, "another manager assignment won concurrently")
    })?;

    tracing::info!(
        tender_id = %tender_id,
        manager_id = %manager_id,
        assigned_by = %assigned_by,
        "Manager assigned"
    );

    Ok(model)
}

/// The current active assignment for a tender, if any.
pub async fn current<C: ConnectionTrait>(
    conn: &C,
    tender_id: Uuid,
) -> Result<Option<Model>, WorkflowError> {
    let assignment = Entity::find()
        .filter(Column::TenderId.eq(tender_id))
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await?;

    Ok(assignment)
}

/// Full assignment history for a tender, newest first.
pub async fn history<C: ConnectionTrait>(
    conn: &C,
    tender_id: Uuid,
) -> Result<Vec<Model>, WorkflowError> {
    let rows = Entity::find()
        .filter(Column::TenderId.eq(tender_id))
        .order_by_desc(Column::AssignedAt)
        .all(conn)
        .await?;

    Ok(rows)
}

/// Derived assigned-set for a tender: the active manager plus every user
/// with the manager role in the tender's required department. Computed at
/// read time from the authoritative assignment table; nothing denormalized
/// is stored.
pub async fn assigned_users<C: ConnectionTrait>(
    conn: &C,
    tender_id: Uuid,
    required_department_id: Option<Uuid>,
) -> Result<Vec<Uuid>, WorkflowError> {
    let mut users = Vec::new();

    if let Some(active) = current(conn, tender_id).await? {
        users.push(active.manager_id);
    }

    if let Some(department_id) = required_department_id {
        let managers = UserRepository::new(conn)
            .list_by_department_role(department_id, Role::Manager)
            .await?;

        for manager in managers {
            if !users.contains(&manager.id) {
                users.push(manager.id);
            }
        }
    }

    Ok(users)
}

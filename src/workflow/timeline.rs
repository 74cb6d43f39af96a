//! Timeline manager: derives milestone dates from status transitions.
//!
//! Updates are keyed on the status a tender is moving *into* and only ever
//! populate fields that are still unset, so replaying a transition is a
//! no-op. The timeline row itself is created lazily with defaults derived
//! from the tender's creation date and deadline.

use chrono::{DateTime, Days, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::tender;
use crate::models::tender_timeline::{ActiveModel, Column, Entity, Model};
use crate::workflow::status::TenderStatus;

/// Fetch the timeline for a tender, creating it with derived defaults when
/// absent. Safe to call from within a lifecycle transaction.
pub async fn get_or_create<C: ConnectionTrait>(
    conn: &C,
    tender: &tender::Model,
    now: DateTime<FixedOffset>,
) -> Result<Model, WorkflowError> {
    if let Some(existing) = Entity::find()
        .filter(Column::TenderId.eq(tender.id))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let deadline = tender.deadline;
    let timeline = ActiveModel {
        id: Set(Uuid::new_v4()),
        tender_id: Set(tender.id),
        submission_start: Set(Some(tender.created_at)),
        submission_end: Set(Some(deadline)),
        evaluation_start: Set(plus_days(deadline, 1)),
        evaluation_end: Set(plus_days(deadline, 14)),
        award_date: Set(plus_days(deadline, 21)),
        project_start_date: Set(plus_days(deadline, 30)),
        project_end_date: Set(plus_days(deadline, 90)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = timeline
        .insert(conn)
        .await
        .map_err(|e| WorkflowError::from_db(e, "timeline already created concurrently"))?;

    tracing::debug!(tender_id = %tender.id, timeline_id = %model.id, "Timeline created");
    Ok(model)
}

/// Apply the status-driven milestone updates for a transition into
/// `new_status`. Only unset fields are written; fields that already hold a
/// value are left untouched.
pub async fn apply_status_dates<C: ConnectionTrait>(
    conn: &C,
    timeline: Model,
    new_status: TenderStatus,
    now: DateTime<FixedOffset>,
) -> Result<Model, WorkflowError> {
    let mut active: ActiveModel = timeline.clone().into();
    let mut changed = false;

    match new_status {
        TenderStatus::Draft => {
            if timeline.submission_start.is_none() {
                active.submission_start = Set(Some(now));
                changed = true;
            }
        }
        TenderStatus::InReview | TenderStatus::PendingSuperuserApproval => {
            if timeline.submission_end.is_none() {
                active.submission_end = Set(Some(now));
                changed = true;
            }
            if timeline.evaluation_start.is_none() {
                active.evaluation_start = Set(Some(now));
                changed = true;
            }
        }
        TenderStatus::Approved | TenderStatus::InProgress => {
            if timeline.evaluation_end.is_none() {
                active.evaluation_end = Set(Some(now));
                changed = true;
            }
        }
        TenderStatus::Awarded => {
            if timeline.award_date.is_none() {
                active.award_date = Set(Some(now));
                changed = true;
            }
            if timeline.project_start_date.is_none()
                && let Some(start) = plus_days(now, 30)
            {
                active.project_start_date = Set(Some(start));
                changed = true;
            }
        }
        TenderStatus::Closed => {
            if timeline.project_end_date.is_none() {
                active.project_end_date = Set(Some(now));
                changed = true;
            }
        }
        TenderStatus::Submitted
        | TenderStatus::PendingFinalApproval
        | TenderStatus::Rejected => {}
    }

    if !changed {
        return Ok(timeline);
    }

    active.updated_at = Set(now);
    Ok(active.update(conn).await?)
}

fn plus_days(base: DateTime<FixedOffset>, days: u64) -> Option<DateTime<FixedOffset>> {
    base.checked_add_days(Days::new(days))
}

//! # User Repository
//!
//! Lookups against the users master-data table: resolving referenced actors
//! (e.g. the manager_id supplied on superuser approval) and role checks that
//! need the stored record rather than the request identity.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::models::user::{Column, Entity, Model};
use crate::workflow::status::Role;

/// Repository for user lookups
pub struct UserRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    /// Create a new UserRepository on the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Fetch a user by id.
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Model>, WorkflowError> {
        Ok(Entity::find_by_id(user_id).one(self.conn).await?)
    }

    /// Fetch a user by id and require them to hold the given role.
    pub async fn get_with_role(&self, user_id: Uuid, role: Role) -> Result<Model, WorkflowError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("user".to_string()))?;

        if user.role != role.as_str() {
            return Err(WorkflowError::InvalidArgument(format!(
                "user {user_id} does not hold the {role} role"
            )));
        }

        Ok(user)
    }

    /// All users with the given role in a department.
    pub async fn list_by_department_role(
        &self,
        department_id: Uuid,
        role: Role,
    ) -> Result<Vec<Model>, WorkflowError> {
        let users = Entity::find()
            .filter(Column::DepartmentId.eq(department_id))
            .filter(Column::Role.eq(role.as_str()))
            .all(self.conn)
            .await?;

        Ok(users)
    }
}

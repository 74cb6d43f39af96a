//! Shared fixtures for integration tests: an in-memory SQLite database with
//! migrations applied, seeded reference data, and workflow services wired
//! with a fixed clock.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use tenders::clock::FixedClock;
use tenders::models::{company, department, user};
use tenders::notify::LogNotifier;
use tenders::repositories::NewTender;
use tenders::workflow::{Actor, ChecklistEngine, Role, TenderWorkflow, WorkflowMode};

pub const NOW: &str = "2025-06-01T09:00:00+00:00";
pub const DEADLINE: &str = "2025-06-20T17:00:00+00:00";

pub fn now() -> DateTime<FixedOffset> {
    NOW.parse().unwrap()
}

pub fn deadline() -> DateTime<FixedOffset> {
    DEADLINE.parse().unwrap()
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub workflow: TenderWorkflow,
    pub checklist: ChecklistEngine,
    pub company_id: Uuid,
    pub department_id: Uuid,
    pub bd: Actor,
    pub superuser: Actor,
    pub manager: Actor,
    pub second_manager: Actor,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_mode(WorkflowMode::Managed).await
    }

    pub async fn with_mode(mode: WorkflowMode) -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory SQLite");
        Migrator::up(&db, None).await.expect("Migrations failed");

        let company_id = seed_company(&db).await;
        let department_id = seed_department(&db).await;

        let bd = seed_user(&db, Role::BdTeam, Some(department_id), company_id).await;
        let superuser = seed_user(&db, Role::Superuser, None, company_id).await;
        let manager = seed_user(&db, Role::Manager, Some(department_id), company_id).await;
        let second_manager = seed_user(&db, Role::Manager, Some(department_id), company_id).await;

        let clock = Arc::new(FixedClock(now()));
        let notifier = Arc::new(LogNotifier);
        let workflow = TenderWorkflow::new(
            db.clone(),
            clock.clone(),
            notifier.clone(),
            mode,
            "BTD".to_string(),
        );
        let checklist = ChecklistEngine::new(db.clone(), clock, notifier);

        Self {
            db,
            workflow,
            checklist,
            company_id,
            department_id,
            bd,
            superuser,
            manager,
            second_manager,
        }
    }

    pub fn new_tender_fields(&self) -> NewTender {
        NewTender {
            name: "Road resurfacing, phase 2".to_string(),
            description: "Resurfacing of the northern access road".to_string(),
            budget: "250000.00".parse::<Decimal>().unwrap(),
            deadline: deadline(),
            company_id: self.company_id,
            required_department_id: Some(self.department_id),
            category_id: None,
        }
    }

    pub async fn create_draft(&self) -> tenders::models::tender::Model {
        self.workflow
            .create(self.bd, self.new_tender_fields())
            .await
            .expect("Failed to create tender")
    }

    pub async fn attach_spec(&self, tender_id: Uuid) {
        self.workflow
            .attach_document(
                tender_id,
                self.bd,
                "spec",
                format!("tenders/{tender_id}/spec.pdf"),
                None,
            )
            .await
            .expect("Failed to attach spec document");
    }

    /// Create a tender and drive it to in_progress with a manager assigned.
    pub async fn create_in_progress(&self) -> tenders::models::tender::Model {
        let tender = self.create_draft().await;
        self.attach_spec(tender.id).await;
        self.workflow
            .submit_for_superuser_review(tender.id, self.bd)
            .await
            .expect("Failed to submit for review");
        self.workflow
            .superuser_review(tender.id, self.superuser, "approve", None, Some(self.manager.id))
            .await
            .expect("Failed to approve tender")
    }
}

async fn seed_company(db: &DatabaseConnection) -> Uuid {
    let id = Uuid::new_v4();
    company::ActiveModel {
        id: Set(id),
        name: Set("Bright Tenders Ltd".to_string()),
        description: Set(None),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed company");
    id
}

async fn seed_department(db: &DatabaseConnection) -> Uuid {
    let id = Uuid::new_v4();
    department::ActiveModel {
        id: Set(id),
        name: Set("Civil Works".to_string()),
        description: Set(None),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed department");
    id
}

pub async fn seed_user(
    db: &DatabaseConnection,
    role: Role,
    department_id: Option<Uuid>,
    company_id: Uuid,
) -> Actor {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        first_name: Set("Test".to_string()),
        last_name: Set(role.as_str().to_string()),
        email: Set(format!("{}-{id}@example.com", role.as_str())),
        role: Set(role.as_str().to_string()),
        department_id: Set(department_id),
        company_id: Set(Some(company_id)),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed user");

    Actor { id, role }
}

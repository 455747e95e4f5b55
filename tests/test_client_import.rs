mod helpers;

use std::sync::Arc;

use serde_json::{json, Value};

use creatordesk_worker::domain::entities::{LogLevel, NewJob};
use creatordesk_worker::domain::errors::{WorkerError, WorkerResult};
use creatordesk_worker::domain::ports::{CustomerStore, JobStore};
use creatordesk_worker::handlers::{ClientImportHandler, CLIENT_IMPORT};
use creatordesk_worker::infrastructure::persistence::{Database, SqlCustomerStore, SqlJobStore};
use creatordesk_worker::worker::{JobContext, JobFile, JobHandler, JobLogger};

use helpers::test_db::setup_test_db;

fn default_payload() -> Value {
    json!({
        "columnMapping": {
            "Name": "name",
            "Industry": "industry",
            "Contact Email": "contact_email",
            "Phone": "phone",
            "Notes": "notes"
        }
    })
}

/// Run one client import against a real job row so row logs are persisted.
/// Returns the handler outcome plus the task id for log assertions.
async fn run_import(db: &Database, payload: Value, csv: &str) -> (WorkerResult<Value>, String) {
    let jobs: Arc<dyn JobStore> = Arc::new(SqlJobStore::new(db.clone()));
    let job = NewJob::new(CLIENT_IMPORT, payload).with_file("imports/clients.csv", "clients.csv");
    jobs.create(&job).await.expect("Failed to create job");

    let ctx = JobContext {
        task_id: job.task_id.clone(),
        job_type: job.job_type.clone(),
        payload: job.payload.clone(),
        file: Some(JobFile {
            name: job.file_name.clone(),
            bytes: csv.as_bytes().to_vec(),
        }),
        logger: JobLogger::new(job.task_id.clone(), Arc::clone(&jobs)),
    };

    let handler = ClientImportHandler::new(Arc::new(SqlCustomerStore::new(db.clone())));
    let result = handler.execute(&ctx).await;
    (result, job.task_id)
}

#[tokio::test]
async fn creates_new_clients_from_csv() {
    let db = setup_test_db().await;

    let csv = "Name,Industry,Contact Email,Phone\n\
               Acme Corp,Technology,jane@acme.test,555-0100\n\
               Globex,Media,sam@globex.test,\n";
    let (result, _) = run_import(&db, default_payload(), csv).await;
    let result = result.expect("Import should succeed");

    assert_eq!(result["successCount"], 2);
    assert_eq!(result["createdClients"], 2);
    assert_eq!(result["errorCount"], 0);

    let customers = SqlCustomerStore::new(db.clone());
    let acme = customers
        .find_by_name("Acme Corp")
        .await
        .unwrap()
        .expect("Acme Corp should exist");
    assert_eq!(acme.industry.as_deref(), Some("Technology"));
    assert_eq!(acme.contact_email.as_deref(), Some("jane@acme.test"));
    assert!(!acme.is_deleted());

    // Blank trailing cell never becomes an empty-string value.
    let globex = customers.find_by_name("Globex").await.unwrap().unwrap();
    assert!(globex.phone.is_none());
}

#[tokio::test]
async fn duplicate_names_are_skipped_case_insensitively() {
    let db = setup_test_db().await;

    let csv = "Name,Industry\nAcme Corp,Technology\n";
    let (first, _) = run_import(&db, default_payload(), csv).await;
    assert_eq!(first.unwrap()["createdClients"], 1);

    let csv_again = "Name,Industry\nACME CORP,Finance\n";
    let (second, _) = run_import(&db, default_payload(), csv_again).await;
    let second = second.unwrap();

    assert_eq!(second["createdClients"], 0);
    assert_eq!(second["duplicateCount"], 1);
    assert_eq!(second["successCount"], 0);

    // Skip mode leaves the stored record untouched.
    let customers = SqlCustomerStore::new(db.clone());
    let acme = customers.find_by_name("acme corp").await.unwrap().unwrap();
    assert_eq!(acme.industry.as_deref(), Some("Technology"));
}

#[tokio::test]
async fn update_mode_merges_without_clearing_fields() {
    let db = setup_test_db().await;

    let csv = "Name,Industry,Notes\nAcme Corp,Technology,key account\n";
    let (first, _) = run_import(&db, default_payload(), csv).await;
    first.unwrap();

    let mut payload = default_payload();
    payload["duplicateHandling"] = json!("update");
    let csv_update = "Name,Industry,Notes\nAcme Corp,Finance,\n";
    let (second, _) = run_import(&db, payload, csv_update).await;
    let second = second.unwrap();

    assert_eq!(second["updatedClients"], 1);
    assert_eq!(second["successCount"], 1);

    let customers = SqlCustomerStore::new(db.clone());
    let acme = customers.find_by_name("Acme Corp").await.unwrap().unwrap();
    assert_eq!(acme.industry.as_deref(), Some("Finance"));
    // The blank notes cell must not erase the stored value.
    assert_eq!(acme.notes.as_deref(), Some("key account"));
}

#[tokio::test]
async fn restores_soft_deleted_client() {
    let db = setup_test_db().await;
    let customers = SqlCustomerStore::new(db.clone());

    let mut existing = creatordesk_worker::domain::entities::Customer::new("Acme Corp".to_string());
    existing.notes = Some("vip".to_string());
    customers.create(&existing).await.unwrap();

    sqlx::query("UPDATE customers SET deleted_at = ? WHERE id = ?")
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&existing.id)
        .execute(db.pool())
        .await
        .unwrap();

    let csv = "Name,Industry\nAcme Corp,Technology\n";
    let (result, task_id) = run_import(&db, default_payload(), csv).await;
    let result = result.unwrap();

    assert_eq!(result["restoredClients"], 1);
    assert_eq!(result["successCount"], 1);
    assert_eq!(result["duplicateCount"], 0);

    let acme = customers.find_by_name("Acme Corp").await.unwrap().unwrap();
    assert!(!acme.is_deleted());
    assert_eq!(acme.industry.as_deref(), Some("Technology"));
    // Restore merges, so the pre-deletion notes survive.
    assert_eq!(acme.notes.as_deref(), Some("vip"));

    let jobs = SqlJobStore::new(db.clone());
    let logs = jobs.list_logs(&task_id).await.unwrap();
    assert!(logs
        .iter()
        .any(|log| log.message.contains("Restored client 'Acme Corp'")));
}

#[tokio::test]
async fn invalid_email_is_a_row_error_with_row_number() {
    let db = setup_test_db().await;

    let csv = "Name,Contact Email\nAcme Corp,not-an-email\nGlobex,sam@globex.test\n";
    let (result, task_id) = run_import(&db, default_payload(), csv).await;
    let result = result.unwrap();

    assert_eq!(result["errorCount"], 1);
    assert_eq!(result["createdClients"], 1);
    assert_eq!(result["successCount"], 1);

    let jobs = SqlJobStore::new(db.clone());
    let logs = jobs.list_logs(&task_id).await.unwrap();
    let row_error = logs
        .iter()
        .find(|log| log.level == LogLevel::Error)
        .expect("Row error should be logged");
    assert_eq!(row_error.row_number, Some(1));
    assert!(row_error.message.contains("Invalid email format: not-an-email"));
}

#[tokio::test]
async fn blank_rows_are_skipped_and_missing_name_is_an_error() {
    let db = setup_test_db().await;

    let csv = "Name,Industry\n,\nAcme Corp,Technology\n,Finance\n";
    let (result, task_id) = run_import(&db, default_payload(), csv).await;
    let result = result.unwrap();

    assert_eq!(result["skippedCount"], 1);
    assert_eq!(result["createdClients"], 1);
    assert_eq!(result["errorCount"], 1);

    let jobs = SqlJobStore::new(db.clone());
    let logs = jobs.list_logs(&task_id).await.unwrap();
    let row_error = logs
        .iter()
        .find(|log| log.level == LogLevel::Error)
        .expect("Missing name should be logged");
    assert_eq!(row_error.row_number, Some(3));
    assert!(row_error.message.contains("Missing required field 'name'"));
}

#[tokio::test]
async fn import_without_a_file_fails_before_any_row() {
    let db = setup_test_db().await;

    let jobs: Arc<dyn JobStore> = Arc::new(SqlJobStore::new(db.clone()));
    let job = NewJob::new(CLIENT_IMPORT, default_payload());
    jobs.create(&job).await.expect("Failed to create job");

    let ctx = JobContext {
        task_id: job.task_id.clone(),
        job_type: job.job_type.clone(),
        payload: job.payload.clone(),
        file: None,
        logger: JobLogger::new(job.task_id.clone(), Arc::clone(&jobs)),
    };

    let handler = ClientImportHandler::new(Arc::new(SqlCustomerStore::new(db.clone())));
    match handler.execute(&ctx).await {
        Err(WorkerError::Config(message)) => assert!(message.contains("file")),
        other => panic!("Expected configuration error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn missing_column_mapping_fails_the_whole_job() {
    let db = setup_test_db().await;

    let (result, _) = run_import(&db, json!({"columnMapping": {}}), "Name\nAcme Corp\n").await;
    match result {
        Err(WorkerError::Config(message)) => assert!(message.contains("column mapping")),
        other => panic!("Expected configuration error, got {:?}", other.map(|_| ())),
    }

    // Nothing was imported before the config check.
    let customers = SqlCustomerStore::new(db.clone());
    assert!(customers.find_by_name("Acme Corp").await.unwrap().is_none());
}

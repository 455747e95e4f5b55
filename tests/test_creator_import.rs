mod helpers;

use std::sync::Arc;

use serde_json::{json, Value};

use creatordesk_worker::domain::entities::NewJob;
use creatordesk_worker::domain::errors::{WorkerError, WorkerResult};
use creatordesk_worker::domain::ports::{CreatorStore, JobStore};
use creatordesk_worker::handlers::{CreatorImportHandler, CREATOR_IMPORT};
use creatordesk_worker::infrastructure::persistence::{Database, SqlCreatorStore, SqlJobStore};
use creatordesk_worker::worker::{JobContext, JobFile, JobHandler, JobLogger};

use helpers::test_db::setup_test_db;

fn default_payload() -> Value {
    json!({
        "columnMapping": {
            "ID": "creator_id",
            "Full Name": "full_name",
            "Platform": "platform",
            "Handle": "handle",
            "Email": "email",
            "Country": "country",
            "Followers": "followers",
            "URL": "url"
        }
    })
}

async fn run_import(db: &Database, payload: Value, csv: &str) -> (WorkerResult<Value>, String) {
    let jobs: Arc<dyn JobStore> = Arc::new(SqlJobStore::new(db.clone()));
    let job = NewJob::new(CREATOR_IMPORT, payload).with_file("imports/creators.csv", "creators.csv");
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

    let handler = CreatorImportHandler::new(Arc::new(SqlCreatorStore::new(db.clone())));
    let result = handler.execute(&ctx).await;
    (result, job.task_id)
}

#[tokio::test]
async fn rows_sharing_a_grouping_id_become_one_creator() {
    let db = setup_test_db().await;

    let csv = "ID,Full Name,Platform,Handle,Email,Country,Followers,URL\n\
               c1,Dana Lee,instagram,danalee,,,10,https://instagram.test/danalee\n\
               c1,Dana Lee,tiktok,dana.lee,dana@example.test,US,\"2,500\",\n";
    let (result, _) = run_import(&db, default_payload(), csv).await;
    let result = result.expect("Import should succeed");

    assert_eq!(result["createdCreators"], 1);
    assert_eq!(result["createdSocials"], 2);
    assert_eq!(result["successCount"], 2);
    assert_eq!(result["errorCount"], 0);

    let creators = SqlCreatorStore::new(db.clone());
    let dana = creators
        .find_by_name("Dana Lee")
        .await
        .unwrap()
        .expect("Creator should exist");
    // First non-empty value per field wins across the group.
    assert_eq!(dana.email.as_deref(), Some("dana@example.test"));
    assert_eq!(dana.country.as_deref(), Some("US"));

    let instagram = creators
        .find_social("instagram", "danalee")
        .await
        .unwrap()
        .expect("Instagram social should exist");
    assert_eq!(instagram.creator_id, dana.id);
    assert_eq!(instagram.followers, Some(10));

    let tiktok = creators
        .find_social("tiktok", "dana.lee")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tiktok.creator_id, dana.id);
    assert_eq!(tiktok.followers, Some(2500));
}

#[tokio::test]
async fn duplicate_creator_still_attaches_new_socials() {
    let db = setup_test_db().await;

    let csv = "ID,Full Name,Platform,Handle\nc1,Dana Lee,instagram,danalee\n";
    let (first, _) = run_import(&db, default_payload(), csv).await;
    assert_eq!(first.unwrap()["createdCreators"], 1);

    // A later file with a different grouping id but the same name: the
    // creator is a duplicate, but its new social still lands.
    let csv_again = "ID,Full Name,Platform,Handle\nc9,Dana Lee,youtube,danalee\n";
    let (second, _) = run_import(&db, default_payload(), csv_again).await;
    let second = second.unwrap();

    assert_eq!(second["createdCreators"], 0);
    assert_eq!(second["duplicateCount"], 1);
    assert_eq!(second["createdSocials"], 1);
    assert_eq!(second["successCount"], 1);

    let creators = SqlCreatorStore::new(db.clone());
    let dana = creators.find_by_name("Dana Lee").await.unwrap().unwrap();
    let youtube = creators
        .find_social("youtube", "danalee")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(youtube.creator_id, dana.id);
}

#[tokio::test]
async fn update_mode_merges_creator_fields() {
    let db = setup_test_db().await;

    let csv = "ID,Full Name,Platform,Handle,Email\nc1,Dana Lee,instagram,danalee,dana@example.test\n";
    let (first, _) = run_import(&db, default_payload(), csv).await;
    first.unwrap();

    let mut payload = default_payload();
    payload["duplicateHandling"] = json!("update");
    let csv_update = "ID,Full Name,Platform,Handle,Country,Followers\nc1,Dana Lee,instagram,danalee,US,42\n";
    let (second, _) = run_import(&db, payload, csv_update).await;
    let second = second.unwrap();

    assert_eq!(second["updatedCreators"], 1);
    assert_eq!(second["updatedSocials"], 1);

    let creators = SqlCreatorStore::new(db.clone());
    let dana = creators.find_by_name("Dana Lee").await.unwrap().unwrap();
    assert_eq!(dana.country.as_deref(), Some("US"));
    // Absent email column leaves the stored address alone.
    assert_eq!(dana.email.as_deref(), Some("dana@example.test"));

    let instagram = creators
        .find_social("instagram", "danalee")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(instagram.followers, Some(42));
}

#[tokio::test]
async fn restores_soft_deleted_creator_and_social() {
    let db = setup_test_db().await;
    let creators = SqlCreatorStore::new(db.clone());

    let csv = "ID,Full Name,Platform,Handle\nc1,Dana Lee,instagram,danalee\n";
    let (first, _) = run_import(&db, default_payload(), csv).await;
    first.unwrap();

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE creators SET deleted_at = ?")
        .bind(&now)
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("UPDATE creator_socials SET deleted_at = ?")
        .bind(&now)
        .execute(db.pool())
        .await
        .unwrap();

    let (second, _) = run_import(&db, default_payload(), csv).await;
    let second = second.unwrap();

    assert_eq!(second["restoredCreators"], 1);
    assert_eq!(second["restoredSocials"], 1);
    assert_eq!(second["duplicateCount"], 0);

    let dana = creators.find_by_name("Dana Lee").await.unwrap().unwrap();
    assert!(!dana.is_deleted());

    let instagram = creators
        .find_social("instagram", "danalee")
        .await
        .unwrap()
        .unwrap();
    assert!(!instagram.is_deleted());
    assert_eq!(instagram.creator_id, dana.id);
}

#[tokio::test]
async fn missing_required_field_is_a_row_error() {
    let db = setup_test_db().await;

    let csv = "ID,Full Name,Platform,Handle\nc1,Dana Lee,instagram,\n";
    let (result, task_id) = run_import(&db, default_payload(), csv).await;
    let result = result.unwrap();

    assert_eq!(result["errorCount"], 1);
    assert_eq!(result["createdCreators"], 0);
    assert_eq!(result["successCount"], 0);

    let jobs = SqlJobStore::new(db.clone());
    let logs = jobs.list_logs(&task_id).await.unwrap();
    assert!(logs
        .iter()
        .any(|log| log.row_number == Some(1)
            && log.message.contains("Missing required field 'handle'")));
}

#[tokio::test]
async fn missing_column_mapping_fails_the_whole_job() {
    let db = setup_test_db().await;

    let (result, _) = run_import(&db, Value::Null, "ID\nc1\n").await;
    match result {
        Err(WorkerError::Config(message)) => assert!(message.contains("payload")),
        other => panic!("Expected configuration error, got {:?}", other.map(|_| ())),
    }
}

//! Integration tests for `JsonStore` against a temporary directory.

use chrono::NaiveDate;
use gn_core::{
  record::{Citizen, DailyLog, Entity, Permit, PermitStatus, PermitType, WelfareProgram},
  search::Aggregator,
  store::{RecordStore, delete_record, find_record, upsert_record},
};
use std::sync::Arc;
use tempfile::TempDir;

use crate::{Error, JsonStore};

async fn store() -> (TempDir, JsonStore) {
  let dir = TempDir::new().expect("temp dir");
  let store = JsonStore::open(dir.path()).await.expect("open store");
  (dir, store)
}

fn citizen(nic: &str, name: &str) -> Citizen {
  Citizen {
    nic: nic.into(),
    full_name: name.into(),
    is_alive: true,
    is_active: true,
    ..Default::default()
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_document_is_empty() {
  let (_dir, s) = store().await;
  let rows: Vec<Citizen> = s.read_all().await.unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn malformed_document_is_empty() {
  let (_dir, s) = store().await;
  std::fs::write(s.path_for(WelfareProgram::COLLECTION), "[{\"nic\": ").unwrap();
  let rows: Vec<WelfareProgram> = s.read_all().await.unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn directory_in_place_of_document_is_an_error() {
  let (_dir, s) = store().await;
  std::fs::create_dir(s.path_for(Citizen::COLLECTION)).unwrap();
  assert!(matches!(s.read_all::<Citizen>().await, Err(Error::Io { .. })));
}

#[tokio::test]
async fn reads_hand_written_camel_case_document() {
  let (_dir, s) = store().await;
  std::fs::write(
    s.path_for(Permit::COLLECTION),
    r#"[{"id":"p1","nic":"123456789V","permitType":"ResourceTransport",
         "status":"Expired","issueDate":"2023-01-15","expiryDate":"2024-01-15"}]"#,
  )
  .unwrap();

  let rows: Vec<Permit> = s.read_all().await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].permit_type, PermitType::ResourceTransport);
  assert_eq!(rows[0].status, PermitStatus::Expired);
  assert_eq!(rows[0].expiry_date, NaiveDate::from_ymd_opt(2024, 1, 15));
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn write_replaces_whole_document() {
  let (_dir, s) = store().await;
  s.write_all(vec![citizen("123456789V", "John Doe"), citizen("987654321V", "Jane Roe")])
    .await
    .unwrap();
  s.write_all(vec![citizen("200012345678", "Nimal Bandara")])
    .await
    .unwrap();

  let rows: Vec<Citizen> = s.read_all().await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].full_name, "Nimal Bandara");
}

#[tokio::test]
async fn write_leaves_no_temp_file() {
  let (dir, s) = store().await;
  s.write_all(vec![citizen("123456789V", "John Doe")]).await.unwrap();

  let names: Vec<String> = std::fs::read_dir(dir.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, ["citizens.json"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_writes_to_one_collection_all_succeed() {
  let (dir, s) = store().await;

  for round in 0..20 {
    let writers: Vec<_> = (0..8)
      .map(|i| {
        let s = s.clone();
        let rows = (0..=i)
          .map(|n| citizen(&format!("{round:04}{i:03}{n:03}V"), "Writer"))
          .collect::<Vec<_>>();
        tokio::spawn(async move { s.write_all(rows).await })
      })
      .collect();

    for writer in writers {
      writer.await.unwrap().unwrap();
    }

    // Whichever writer renamed last, the document is one whole write.
    let text = std::fs::read_to_string(s.path_for(Citizen::COLLECTION)).unwrap();
    let rows: Vec<Citizen> = serde_json::from_str(&text).unwrap();
    assert!((1..=8).contains(&rows.len()));
  }

  let names: Vec<String> = std::fs::read_dir(dir.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, ["citizens.json"]);
}

#[tokio::test]
async fn overwriting_malformed_document_keeps_a_backup() {
  let (_dir, s) = store().await;
  let garbage = "[{\"id\": \"w1\", \"nic\": ";
  std::fs::write(s.path_for(WelfareProgram::COLLECTION), garbage).unwrap();

  upsert_record(&s, WelfareProgram {
    id: "w2".into(),
    nic: "123456789V".into(),
    program_name: "Aswesuma".into(),
    ..Default::default()
  })
  .await
  .unwrap();

  let rows: Vec<WelfareProgram> = s.read_all().await.unwrap();
  assert_eq!(rows.len(), 1);
  let backup = std::fs::read_to_string(s.backup_path_for(WelfareProgram::COLLECTION)).unwrap();
  assert_eq!(backup, garbage);
}

#[tokio::test]
async fn well_formed_document_gets_no_backup() {
  let (_dir, s) = store().await;
  upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
  upsert_record(&s, citizen("987654321V", "Jane Roe")).await.unwrap();
  assert!(!s.backup_path_for(Citizen::COLLECTION).exists());
}

#[tokio::test]
async fn open_creates_nested_directory() {
  let dir = TempDir::new().unwrap();
  let nested = dir.path().join("gn").join("data");
  let s = JsonStore::open(&nested).await.unwrap();
  assert!(nested.is_dir());
  assert_eq!(s.dir(), nested.as_path());
}

#[tokio::test]
async fn documents_survive_reopen() {
  let (dir, s) = store().await;
  upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
  drop(s);

  let reopened = JsonStore::open(dir.path()).await.unwrap();
  let found: Option<Citizen> = find_record(&reopened, "123456789V").await.unwrap();
  assert_eq!(found.unwrap().full_name, "John Doe");
}

// ─── Upsert rule ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_replaces_by_key_and_appends() {
  let (_dir, s) = store().await;
  upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
  upsert_record(&s, citizen("987654321V", "Jane Roe")).await.unwrap();
  upsert_record(&s, citizen("123456789V", "John Albert Doe")).await.unwrap();

  let rows: Vec<Citizen> = s.read_all().await.unwrap();
  let names: Vec<_> = rows.iter().map(|c| c.full_name.as_str()).collect();
  assert_eq!(names, ["Jane Roe", "John Albert Doe"]);
}

#[tokio::test]
async fn delete_by_key() {
  let (_dir, s) = store().await;
  upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
  assert!(delete_record::<_, Citizen>(&s, "123456789V").await.unwrap());
  assert!(!delete_record::<_, Citizen>(&s, "123456789V").await.unwrap());
  assert!(s.read_all::<Citizen>().await.unwrap().is_empty());
}

// ─── Search over files ───────────────────────────────────────────────────────

#[tokio::test]
async fn search_survives_corrupt_welfare_file() {
  let (_dir, s) = store().await;
  upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
  upsert_record(&s, DailyLog {
    id: "l1".into(),
    visitor_name: "John Doe".into(),
    purpose: "ID renewal".into(),
    ..Default::default()
  })
  .await
  .unwrap();
  std::fs::write(s.path_for(WelfareProgram::COLLECTION), "not json at all").unwrap();

  let results = Aggregator::new(Arc::new(s)).search("john").await;
  assert_eq!(results.len(), 1);
  assert!(results[0].welfare_programs.is_empty());
  assert_eq!(results[0].daily_logs.len(), 1);
}

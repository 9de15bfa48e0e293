use school_admin::config::{builtin_catalog, resolve, Catalog};
use school_admin::service::{Row, RowRepository};
use school_admin::store::{connect, Stores};
use school_admin::ensure_tables;
use serde_json::{json, Value};
use sqlx::SqlitePool;

async fn setup() -> (Stores, Catalog) {
    let catalog = resolve(&builtin_catalog()).expect("catalog");
    let stores = Stores::in_memory().await.expect("stores");
    ensure_tables(&stores, &catalog).await.expect("tables");
    (stores, catalog)
}

fn fields(v: Value) -> Row {
    v.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn created_course_reads_back_with_same_fields() {
    let (stores, _) = setup().await;
    let pool = &stores.school;
    let created = RowRepository::create(
        pool,
        "course",
        Some(&fields(json!({"code": "CS101", "title": "Intro", "active": true}))),
    )
    .await
    .expect("create");
    let id = created.get("id").and_then(Value::as_str).expect("id").to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let row = RowRepository::get(pool, "course", &id).await.expect("get").expect("found");
    assert_eq!(row.get("code"), Some(&json!("CS101")));
    assert_eq!(row.get("title"), Some(&json!("Intro")));
    assert_eq!(row.get("active"), Some(&json!(true)));
}

#[tokio::test]
async fn create_without_fields_applies_store_defaults() {
    let (stores, _) = setup().await;
    let row = RowRepository::create(&stores.school, "course", None).await.expect("create");
    assert_eq!(row.get("active"), Some(&json!(false)));
    assert_eq!(row.get("code"), Some(&json!("")));
    assert_eq!(row.get("title"), Some(&Value::Null));
}

#[tokio::test]
async fn quotes_are_stored_verbatim() {
    let (stores, _) = setup().await;
    let pool = &stores.school;
    let title = r#"O'Brien's "Advanced" Reading; DROP TABLE course; --"#;
    let created = RowRepository::create(pool, "course", Some(&fields(json!({"code": "ENG201", "title": title}))))
        .await
        .expect("create");
    let id = created.get("id").and_then(Value::as_str).expect("id").to_string();
    let row = RowRepository::get(pool, "course", &id).await.expect("get").expect("found");
    assert_eq!(row.get("title"), Some(&json!(title)));

    let mut changed = fields(json!({"title": "it's fine"}));
    changed.insert("id".into(), json!(id.clone()));
    assert_eq!(RowRepository::update(pool, "course", &changed).await.expect("update"), 1);
    let row = RowRepository::get(pool, "course", &id).await.expect("get").expect("found");
    assert_eq!(row.get("title"), Some(&json!("it's fine")));
    assert_eq!(row.get("code"), Some(&json!("ENG201")));
}

#[tokio::test]
async fn deleting_a_missing_id_is_harmless() {
    let (stores, _) = setup().await;
    let pool = &stores.school;
    RowRepository::create(pool, "room", Some(&fields(json!({"name": "A1"})))).await.expect("create");
    let before = RowRepository::get_all(pool, "room").await.expect("list");

    let affected = RowRepository::delete(pool, "room", "no-such-id").await.expect("delete");
    assert_eq!(affected, 0);
    let after = RowRepository::get_all(pool, "room").await.expect("list");
    assert_eq!(before, after);
}

#[tokio::test]
async fn delete_removes_the_row() {
    let (stores, _) = setup().await;
    let pool = &stores.school;
    let row = RowRepository::create(pool, "room", Some(&fields(json!({"name": "B2"})))).await.expect("create");
    let id = row.get("id").and_then(Value::as_str).expect("id").to_string();
    assert_eq!(RowRepository::delete(pool, "room", &id).await.expect("delete"), 1);
    assert!(RowRepository::get(pool, "room", &id).await.expect("get").is_none());
    assert_eq!(RowRepository::delete(pool, "room", &id).await.expect("delete again"), 0);
}

#[tokio::test]
async fn update_of_missing_id_affects_nothing() {
    let (stores, _) = setup().await;
    let changed = fields(json!({"id": "missing", "title": "x"}));
    assert_eq!(RowRepository::update(&stores.school, "course", &changed).await.expect("update"), 0);
    let only_id = fields(json!({"id": "missing"}));
    assert_eq!(RowRepository::update(&stores.school, "course", &only_id).await.expect("update"), 0);
}

#[tokio::test]
async fn active_rows_only() {
    let (stores, _) = setup().await;
    let pool = &stores.spin;
    for (email, active) in [("a@x.jp", true), ("b@x.jp", false), ("c@x.jp", true)] {
        RowRepository::create(pool, "student", Some(&fields(json!({"email": email, "active": active}))))
            .await
            .expect("create");
    }
    let active = RowRepository::get_all_active(pool, "student").await.expect("active");
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|r| r.get("id").map_or(false, Value::is_string)));
    assert!(active.iter().all(|r| r.get("active") == Some(&json!(true))));
    // stores are independent
    assert!(RowRepository::get_all(&stores.school, "course").await.expect("list").is_empty());
}

#[tokio::test]
async fn on_disk_store_survives_reconnect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("school.db").display());
    let catalog = resolve(&builtin_catalog()).expect("catalog");

    let pool: SqlitePool = connect(&url, 2).await.expect("connect");
    let stores = Stores { school: pool.clone(), spin: pool.clone() };
    ensure_tables(&stores, &catalog).await.expect("tables");
    ensure_tables(&stores, &catalog).await.expect("tables are idempotent");
    RowRepository::create(&pool, "teacher", Some(&fields(json!({"name": "Kozue"})))).await.expect("create");
    pool.close().await;

    let pool = connect(&url, 2).await.expect("reconnect");
    let rows = RowRepository::get_all(&pool, "teacher").await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&json!("Kozue")));
}

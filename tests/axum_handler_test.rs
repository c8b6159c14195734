use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::get,
};
use datatable::{ApiError, DataTable, DataTableRequest, DataTableResponse};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::{setup_members_db, setup_people_db, user_entity as user};

async fn list_users(
    State(db): State<DatabaseConnection>,
    request: DataTableRequest,
) -> Result<Json<DataTableResponse>, ApiError> {
    let response = DataTable::make(user::Entity::find())
        .relation("company", user::Relation::Company)
        .searchable(["name", "email", "company.name"])
        .sortable(["name", "company.name"])
        .filterable([("is_active", "boolean"), ("role", "in")])
        .with(["company"])
        .get_response(&db, &request)
        .await?;
    Ok(Json(response))
}

fn app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .route("/users", get(list_users))
        .with_state(db);

    Router::new().nest("/api/v1", api)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_handler_returns_items_and_meta() {
    let db = setup_people_db().await.expect("Failed to setup test database");
    let (status, body) = get_json(app(db), "/api/v1/users?search=acme&col=name").await;

    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items should be an array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Alice Anderson");
    assert_eq!(items[0]["company"]["name"], "Acme");
    assert_eq!(items[1]["name"], "Carol Chen");

    let meta = &body["meta"];
    assert_eq!(meta["total"], 2);
    assert_eq!(meta["current_page"], 1);
    assert_eq!(meta["last_page"], 1);
    assert_eq!(meta["from"], 1);
    assert_eq!(meta["to"], 2);
    assert_eq!(meta["path"], "/api/v1/users");
    assert_eq!(meta["first_page_url"], "/api/v1/users?search=acme&col=name&page=1");
    assert!(meta["next_page_url"].is_null());
    assert!(meta["prev_page_url"].is_null());
}

#[tokio::test]
async fn test_handler_decodes_query_string() {
    let db = setup_people_db().await.expect("Failed to setup test database");
    let roles = url_escape::encode_component("admin, editor");
    let uri = format!("/api/v1/users?role={roles}&is_active=on");
    let (status, body) = get_json(app(db), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
}

#[tokio::test]
async fn test_handler_links_window() {
    let db = setup_members_db(200).await.expect("Failed to setup test database");
    let (status, body) = get_json(app(db), "/api/v1/users?page=10").await;

    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = body["meta"]["links"]
        .as_array()
        .expect("links should be an array")
        .iter()
        .map(|link| link["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        vec![
            "&laquo; Previous", "1", "2", "...", "7", "8", "9", "10", "11", "12", "13", "...", "19",
            "20", "Next &raquo;"
        ]
    );
    let active: Vec<&Value> = body["meta"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|link| link["active"] == true)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["url"], "/api/v1/users?page=10");
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let db = setup_members_db(25).await.expect("Failed to setup test database");
    let (status, body) = get_json(app(db), "/api/v1/users?page=9").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], serde_json::json!([]));
    assert_eq!(body["meta"]["total"], 25);
    assert_eq!(body["meta"]["last_page"], 3);
    assert!(body["meta"]["from"].is_null());
    assert!(body["meta"]["to"].is_null());
}

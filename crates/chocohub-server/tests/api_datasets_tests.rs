//! Integration tests for the dataset HTTP endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};

mod helpers;
use helpers::{body_json, json_request, TestHub, TEST_DOMAIN};

fn create_body(title: &str, file: &str, anonymous: bool) -> Value {
    json!({
        "title": title,
        "description": "Product line models",
        "publication_type": "journal_article",
        "anonymous": anonymous,
        "feature_models": [{ "uvl_filename": file, "title": "Car" }]
    })
}

#[tokio::test]
async fn test_health() {
    let hub = TestHub::new().await;
    let response = hub
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_create_requires_known_user() {
    let hub = TestHub::new().await;
    let body = create_body("Cars", "car.uvl", false);

    let missing = hub.send(json_request("POST", "/api/v1/datasets", None, &body)).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let unknown = hub.send(json_request("POST", "/api/v1/datasets", Some(77), &body)).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_relocates_files_and_lists_dataset() {
    let hub = TestHub::new().await;
    let user = hub.user("ada@example.org", "Ada", "Lovelace").await;
    hub.stage(&user, "car.uvl", "features\n    Car");

    let response = hub
        .send(json_request("POST", "/api/v1/datasets", Some(user.id), &create_body("Cars", "car.uvl", false)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let dataset_id = json["data"]["id"].as_i64().unwrap();

    assert!(hub
        .storage
        .dataset_dir(user.id, dataset_id)
        .join("car.uvl")
        .exists());

    let synced = body_json(
        hub.send(Request::builder().uri("/api/v1/datasets/synchronized").body(Body::empty()).unwrap())
            .await,
    )
    .await;
    assert_eq!(synced["data"][0]["name"], "Cars");

    let listing = body_json(
        hub.send(
            Request::builder()
                .uri(format!("/api/v1/users/{}/datasets", user.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await,
    )
    .await;
    assert_eq!(listing["data"].as_array().unwrap().len(), 1);
    assert_eq!(listing["meta"]["pagination"]["per_page"], 5);
}

#[tokio::test]
async fn test_create_rejects_invalid_form() {
    let hub = TestHub::new().await;
    let user = hub.user("ada@example.org", "Ada", "Lovelace").await;

    let response = hub
        .send(json_request("POST", "/api/v1/datasets", Some(user.id), &create_body(" ", "car.uvl", false)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(hub.count("ds_meta_data").await, 0);
}

#[tokio::test]
async fn test_toggle_by_non_owner_is_forbidden() {
    let hub = TestHub::new().await;
    let owner = hub.user("ada@example.org", "Ada", "Lovelace").await;
    let other = hub.user("alan@example.org", "Alan", "Turing").await;
    hub.stage(&owner, "car.uvl", "features\n    Car");

    let created = body_json(
        hub.send(json_request("POST", "/api/v1/datasets", Some(owner.id), &create_body("Cars", "car.uvl", true)))
            .await,
    )
    .await;
    let uri = format!("/api/v1/datasets/{}/anonymity", created["data"]["id"]);

    let forbidden = hub.send(json_request("POST", &uri, Some(other.id), &json!({}))).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let toggled = hub.send(json_request("POST", &uri, Some(owner.id), &json!({}))).await;
    assert_eq!(toggled.status(), StatusCode::OK);
    let json = body_json(toggled).await;
    assert_eq!(json["data"]["is_anonymous"], false);
    assert_eq!(json["data"]["authors"][0]["name"], "Lovelace, Ada");
}

#[tokio::test]
async fn test_view_cookie_deduplicates() {
    let hub = TestHub::new().await;
    let user = hub.user("ada@example.org", "Ada", "Lovelace").await;
    hub.stage(&user, "car.uvl", "features\n    Car");
    let created = body_json(
        hub.send(json_request("POST", "/api/v1/datasets", Some(user.id), &create_body("Cars", "car.uvl", false)))
            .await,
    )
    .await;
    let uri = format!("/api/v1/datasets/{}/views", created["data"]["id"]);

    // no cookie: one is generated and recorded
    let first = hub
        .send(Request::builder().method("POST").uri(&uri).body(Body::empty()).unwrap())
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let set_cookie = first.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("view_cookie="));
    assert_eq!(body_json(first).await["data"]["created"], true);

    // same cookie again: nothing new
    let second = hub
        .send(
            Request::builder()
                .method("POST")
                .uri(&uri)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let json = body_json(second).await;
    assert_eq!(json["data"]["created"], false);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(hub.count("ds_view_records").await, 1);
}

#[tokio::test]
async fn test_like_endpoint() {
    let hub = TestHub::new().await;
    let user = hub.user("ada@example.org", "Ada", "Lovelace").await;
    hub.stage(&user, "car.uvl", "features\n    Car");
    let created = body_json(
        hub.send(json_request("POST", "/api/v1/datasets", Some(user.id), &create_body("Cars", "car.uvl", false)))
            .await,
    )
    .await;
    let dataset_id = created["data"]["id"].as_i64().unwrap();

    let liked = hub
        .send(json_request("POST", "/api/dataset/like", Some(user.id), &json!({ "dataset_id": dataset_id, "value": 1 })))
        .await;
    assert_eq!(liked.status(), StatusCode::OK);
    assert_eq!(body_json(liked).await, json!({ "total_likes": "1" }));

    let disliked = hub
        .send(json_request("POST", "/api/dataset/like", Some(user.id), &json!({ "dataset_id": dataset_id, "value": -1 })))
        .await;
    assert_eq!(disliked.status(), StatusCode::OK);
    assert_eq!(body_json(disliked).await, json!({ "total_likes": "-1" }));

    for bad in [
        json!({ "dataset_id": dataset_id, "value": 5 }),
        json!({ "dataset_id": dataset_id, "value": "up" }),
        json!({ "value": 1 }),
    ] {
        let response = hub.send(json_request("POST", "/api/dataset/like", Some(user.id), &bad)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Invalid data" }));
    }
}

#[tokio::test]
async fn test_doi_url_and_mapping() {
    let hub = TestHub::new().await;
    let user = hub.user("ada@example.org", "Ada", "Lovelace").await;
    hub.stage(&user, "car.uvl", "features\n    Car");
    let mut body = create_body("Cars", "car.uvl", false);
    body["dataset_doi"] = json!("10.5281/zenodo.1234");
    let created = body_json(hub.send(json_request("POST", "/api/v1/datasets", Some(user.id), &body)).await).await;

    let doi = body_json(
        hub.send(
            Request::builder()
                .uri(format!("/api/v1/datasets/{}/doi", created["data"]["id"]))
                .body(Body::empty())
                .unwrap(),
        )
        .await,
    )
    .await;
    assert_eq!(
        doi["data"]["doi_url"],
        format!("http://{TEST_DOMAIN}/doi/10.5281/zenodo.1234")
    );

    sqlx::query("INSERT INTO doi_mappings (dataset_doi_old, dataset_doi_new) VALUES ('10.5281/zenodo.1', '10.5281/zenodo.1234')")
        .execute(&hub.pool)
        .await
        .unwrap();
    let mapping = hub
        .send(
            Request::builder()
                .uri("/api/v1/doi-mappings/10.5281/zenodo.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(mapping.status(), StatusCode::OK);
    assert_eq!(body_json(mapping).await["data"]["dataset_doi_new"], "10.5281/zenodo.1234");
}

#[tokio::test]
async fn test_export_endpoint_returns_zip() {
    let hub = TestHub::new().await;
    let user = hub.user("ada@example.org", "Ada", "Lovelace").await;
    hub.stage(&user, "car.uvl", "features\n    Car");
    hub.send(json_request("POST", "/api/v1/datasets", Some(user.id), &create_body("Cars", "car.uvl", false)))
        .await;

    let response = hub
        .send(Request::builder().uri("/api/v1/datasets/export").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("chocohub2_datasets_from_"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(archive.len(), 1);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recipe search, listing and detail API tests.

use axum::http::StatusCode;
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::{body_json, create_offline_app, create_test_app, json_request};

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(json_request("GET", uri, None, None))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_by_title_word() {
    let (app, _, _) = create_test_app();

    let (status, body) = get_json(app, "/api/search?q=tacos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body["results"]), vec!["Barbacoa Tacos"]);
    // Search results are the short form
    assert!(body["results"][0].get("ingredients").is_none());
}

#[tokio::test]
async fn test_search_by_cuisine_is_case_insensitive() {
    let (app, _, _) = create_test_app();

    let (_, body) = get_json(app, "/api/search?q=MEXICAN").await;
    assert_eq!(
        titles(&body["results"]),
        vec!["Barbacoa Tacos", "Chili Lime Corn"]
    );
}

#[tokio::test]
async fn test_search_by_dietary_tag() {
    let (app, _, _) = create_test_app();

    let (_, body) = get_json(app, "/api/search?q=vegetarian").await;
    assert_eq!(titles(&body["results"]), vec!["Chili Lime Corn", "Shakshuka"]);
}

#[tokio::test]
async fn test_blank_search_is_empty() {
    let (app, _, _) = create_test_app();

    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20%20"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], Value::Array(vec![]));
    }
}

#[tokio::test]
async fn test_overlong_search_is_empty() {
    let (app, _, _) = create_test_app();

    let uri = format!("/api/search?q={}", "a".repeat(101));
    let (status, body) = get_json(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], Value::Array(vec![]));

    // A term at the limit still searches
    let uri = format!("/api/search?q=tacos{}", "%20".repeat(95));
    let (status, body) = get_json(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body["results"]), vec!["Barbacoa Tacos"]);
}

#[tokio::test]
async fn test_search_degrades_when_store_unavailable() {
    let app = create_offline_app();

    let (status, body) = get_json(app, "/api/search?q=tacos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_list_filters_and_orders_by_title() {
    let (app, _, _) = create_test_app();

    let (_, body) = get_json(app.clone(), "/api/recipes?cuisine=mexican").await;
    assert_eq!(
        titles(&body["recipes"]),
        vec!["Barbacoa Tacos", "Chili Lime Corn"]
    );
    assert_eq!(body["total"], 2);

    let (_, body) = get_json(app.clone(), "/api/recipes?cuisine=Mexican&mealType=side").await;
    assert_eq!(titles(&body["recipes"]), vec!["Chili Lime Corn"]);

    let (_, body) = get_json(app, "/api/recipes").await;
    assert_eq!(
        titles(&body["recipes"]),
        vec![
            "Barbacoa Tacos",
            "Char Burgers",
            "Chili Lime Corn",
            "Miso Ramen",
            "Shakshuka"
        ]
    );
}

#[tokio::test]
async fn test_list_by_ids_ignores_input_order_and_unknown_ids() {
    let (app, _, _) = create_test_app();

    let (_, body) = get_json(app, "/api/recipes?ids=shakshuka,nope,char-burgers").await;
    assert_eq!(titles(&body["recipes"]), vec!["Char Burgers", "Shakshuka"]);
}

#[tokio::test]
async fn test_list_pagination() {
    let (app, _, _) = create_test_app();

    let (_, body) = get_json(app.clone(), "/api/recipes?page=2&perPage=2").await;
    assert_eq!(titles(&body["recipes"]), vec!["Chili Lime Corn", "Miso Ramen"]);
    assert_eq!(body["page"], 2);
    assert_eq!(body["perPage"], 2);
    assert_eq!(body["total"], 5);

    let (_, body) = get_json(app.clone(), "/api/recipes?page=9&perPage=2").await;
    assert_eq!(body["recipes"], Value::Array(vec![]));

    let (_, body) = get_json(app.clone(), "/api/recipes?perPage=1000").await;
    assert_eq!(body["perPage"], 100);

    let (status, _) = get_json(app, "/api/recipes?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recipe_detail() {
    let (app, _, _) = create_test_app();

    let (status, body) = get_json(app.clone(), "/api/recipes/lime-corn").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Chili Lime Corn");
    assert_eq!(body["mealType"], "Side");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 3);

    let (status, body) = get_json(app, "/api/recipes/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_recipe_detail_reports_store_failure() {
    let app = create_offline_app();

    let (status, body) = get_json(app, "/api/recipes/lime-corn").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

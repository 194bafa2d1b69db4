// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites client against a live server on an ephemeral port.

use recipe_box::client::{
    FavoritesError, FavoritesService, FavoritesStore, FileStorage, LocalFavoritesStore,
    LocalStorage, MemoryStorage, RecipeSummary, RemoteFavoritesStore, RemoteStoreFactory, Session,
    SessionContext, StoreKind, FAVORITES_KEY,
};
use recipe_box::db::Database;
use std::sync::Arc;

mod common;
use common::{create_test_jwt, insert_user, spawn_test_server};

fn summary(id: &str, title: &str) -> RecipeSummary {
    RecipeSummary {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        image: format!("/images/recipes/{id}.jpg"),
        cuisine: Some("Mexican".to_string()),
        meal_type: Some("Dinner".to_string()),
    }
}

fn lime_corn() -> RecipeSummary {
    summary("lime-corn", "Chili Lime Corn")
}

fn service(base_url: &str, storage: Arc<dyn LocalStorage>, session: Session) -> FavoritesService {
    FavoritesService::new(
        Arc::new(LocalFavoritesStore::new(storage)),
        Arc::new(RemoteStoreFactory::new(base_url)),
        session,
    )
}

#[tokio::test]
async fn test_login_cuts_over_to_server_favorites() {
    let (base_url, state, db) = spawn_test_server().await;
    insert_user(&db, "u1", "ada@example.com", "ada").await;
    let token = create_test_jwt("u1", &state);

    let storage = Arc::new(MemoryStorage::new());
    let svc = service(&base_url, storage.clone(), Session::anonymous());

    assert!(svc.add_favorite(&lime_corn()).await);
    assert!(svc.is_favorite("lime-corn"));

    svc.set_session(Session::authenticated("u1", Some(token))).await;
    assert_eq!(svc.store_kind(), StoreKind::Persistent);
    assert!(!svc.is_favorite("lime-corn"));
    assert!(db.list_favorites("u1").await.unwrap().is_empty());

    // Local storage itself is left alone
    assert!(storage.get_item(FAVORITES_KEY).unwrap().unwrap().contains("lime-corn"));
}

#[tokio::test]
async fn test_server_add_remove_round_trip() {
    let (base_url, state, db) = spawn_test_server().await;
    insert_user(&db, "u1", "ada@example.com", "ada").await;
    let token = create_test_jwt("u1", &state);

    let svc = service(
        &base_url,
        Arc::new(MemoryStorage::new()),
        Session::authenticated("u1", Some(token)),
    );

    assert!(svc.add_favorite(&lime_corn()).await);
    assert!(svc.add_favorite(&summary("barbacoa-tacos", "Barbacoa Tacos")).await);
    assert!(svc.is_favorite("lime-corn"));

    // Second add is refused and stores nothing new
    assert!(!svc.add_favorite(&lime_corn()).await);
    assert!(matches!(
        svc.try_add_favorite(&lime_corn()).await,
        Err(FavoritesError::AlreadyFavorited(_))
    ));
    assert_eq!(db.list_favorites("u1").await.unwrap().len(), 2);

    // A fresh load shows server order, newest first
    let loaded = svc.load_favorites().await;
    let ids: Vec<&str> = loaded.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["barbacoa-tacos", "lime-corn"]);

    assert!(!svc.remove_favorite("char-burgers").await);
    assert_eq!(svc.sorted_favorites().len(), 2);

    assert!(svc.remove_favorite("lime-corn").await);
    assert!(!svc.is_favorite("lime-corn"));
    let remaining = db.list_favorites("u1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].recipe_id, "barbacoa-tacos");
}

#[tokio::test]
async fn test_unknown_user_add_fails() {
    let (base_url, state, _) = spawn_test_server().await;
    let token = create_test_jwt("ghost", &state);

    let store = RemoteFavoritesStore::new(reqwest::Client::new(), &base_url, "ghost", Some(token));
    assert!(matches!(
        store.add(&lime_corn()).await,
        Err(FavoritesError::UnknownUser(id)) if id == "ghost"
    ));
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (base_url, _, db) = spawn_test_server().await;
    insert_user(&db, "u1", "ada@example.com", "ada").await;

    let store = RemoteFavoritesStore::new(reqwest::Client::new(), &base_url, "u1", None);
    assert!(matches!(
        store.list().await,
        Err(FavoritesError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_remove_after_external_delete_is_not_favorited() {
    let (base_url, state, db) = spawn_test_server().await;
    insert_user(&db, "u1", "ada@example.com", "ada").await;
    let token = create_test_jwt("u1", &state);

    let svc = service(
        &base_url,
        Arc::new(MemoryStorage::new()),
        Session::authenticated("u1", Some(token)),
    );
    assert!(svc.add_favorite(&lime_corn()).await);

    // Removed behind the client's back; the cache still has it
    let favorite = db.list_favorites("u1").await.unwrap().remove(0);
    assert!(db.delete_favorite(&favorite.id, "u1").await.unwrap());
    assert!(svc.is_favorite("lime-corn"));

    assert!(matches!(
        svc.try_remove_favorite("lime-corn").await,
        Err(FavoritesError::NotFavorited(_))
    ));
    // Failure leaves the cache as it was; a reload corrects it
    assert!(svc.is_favorite("lime-corn"));
    svc.load_favorites().await;
    assert!(!svc.is_favorite("lime-corn"));
}

/// Server that lists one favorite for u1 but answers every delete with 404,
/// as when the record goes away between the client's lookup and its delete.
async fn spawn_vanishing_server() -> String {
    use axum::{http::StatusCode, routing::delete, routing::get, Json, Router};
    use recipe_box::models::Favorite;

    let app = Router::new()
        .route(
            "/api/favorites",
            get(|| async {
                Json(vec![Favorite {
                    id: Favorite::document_id("u1", "lime-corn"),
                    user_id: "u1".to_string(),
                    recipe_id: "lime-corn".to_string(),
                    recipe_title: "Chili Lime Corn".to_string(),
                    recipe_description: "Chili Lime Corn description".to_string(),
                    recipe_image: "/images/recipes/lime-corn.jpg".to_string(),
                    recipe_cuisine: Some("Mexican".to_string()),
                    added_at: chrono::Utc::now(),
                }])
            }),
        )
        .route(
            "/api/favorites/{favorite_id}",
            delete(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "Favorite not found"})),
                )
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_remove_vanished_between_lookup_and_delete() {
    let base_url = spawn_vanishing_server().await;

    let svc = service(
        &base_url,
        Arc::new(MemoryStorage::new()),
        Session::authenticated("u1", None),
    );
    let loaded = svc.load_favorites().await;
    assert_eq!(loaded.len(), 1);
    assert!(svc.is_favorite("lime-corn"));

    assert!(matches!(
        svc.try_remove_favorite("lime-corn").await,
        Err(FavoritesError::Vanished(id)) if id == "lime-corn"
    ));
    // Cache is untouched
    assert!(svc.is_favorite("lime-corn"));
    assert_eq!(svc.sorted_favorites().len(), 1);

    assert!(!svc.remove_favorite("lime-corn").await);
    assert!(svc.is_favorite("lime-corn"));
}

#[tokio::test]
async fn test_anonymous_favorites_persist_in_file() {
    let path = std::env::temp_dir().join(format!("recipe-box-sync-{}.json", uuid::Uuid::new_v4()));

    {
        let svc = service(
            "http://127.0.0.1:9",
            Arc::new(FileStorage::new(&path)),
            Session::anonymous(),
        );
        assert!(svc.add_favorite(&lime_corn()).await);
        assert!(svc.add_favorite(&summary("barbacoa-tacos", "Barbacoa Tacos")).await);
    }

    let svc = service(
        "http://127.0.0.1:9",
        Arc::new(FileStorage::new(&path)),
        Session::anonymous(),
    );
    assert!(!svc.is_favorite("lime-corn"));
    let loaded = svc.load_favorites().await;
    assert_eq!(loaded.len(), 2);
    assert!(svc.is_favorite("lime-corn"));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_unreachable_server_shows_local_list() {
    let storage = Arc::new(MemoryStorage::new());
    let svc = service("http://127.0.0.1:9", storage, Session::anonymous());
    assert!(svc.add_favorite(&lime_corn()).await);

    let items = svc
        .set_session(Session::authenticated("u1", Some("token".to_string())))
        .await;
    assert_eq!(items.len(), 1);
    assert!(svc.is_favorite("lime-corn"));

    // Writes still go to the server and fail
    assert!(!svc.add_favorite(&summary("barbacoa-tacos", "Barbacoa Tacos")).await);
}

#[tokio::test]
async fn test_session_context_drives_service() {
    let (base_url, state, db) = spawn_test_server().await;
    insert_user(&db, "u1", "ada@example.com", "ada").await;
    let token = create_test_jwt("u1", &state);

    let ctx = SessionContext::default();
    let svc = Arc::new(service(
        &base_url,
        Arc::new(MemoryStorage::new()),
        ctx.current(),
    ));
    let listener = svc.clone().spawn_session_listener(ctx.subscribe());

    ctx.log_in("u1", Some(token));
    for _ in 0..200 {
        if svc.store_kind() == StoreKind::Persistent {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(svc.store_kind(), StoreKind::Persistent);
    assert!(svc.add_favorite(&lime_corn()).await);
    assert_eq!(db.list_favorites("u1").await.unwrap().len(), 1);

    drop(ctx);
    listener.await.unwrap();
}

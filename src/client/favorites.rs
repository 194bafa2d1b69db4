// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites reconciliation.
//!
//! [`FavoritesService`] picks a store once per session and mirrors it in an
//! in-memory cache. Callers use the boolean operations, which are the only
//! place store failures are logged and turned into `false` or an empty list.
//! The `try_` operations report the reason instead.
//!
//! Every session switch bumps a generation counter. A store call that
//! started under an older generation does not touch the cache when it
//! completes.

use crate::client::session::Session;
use crate::client::store::{
    sort_newest_first, FavoriteItem, FavoritesError, FavoritesStore, PersistentStoreFactory,
    RecipeSummary, StoreKind,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Active {
    session: Session,
    store: Arc<dyn FavoritesStore>,
    generation: u64,
    cache: Vec<FavoriteItem>,
}

pub struct FavoritesService {
    local: Arc<dyn FavoritesStore>,
    persistent: Arc<dyn PersistentStoreFactory>,
    active: Mutex<Active>,
}

impl FavoritesService {
    /// Create the service for an initial session. The cache starts empty;
    /// call [`load_favorites`](Self::load_favorites) to fill it.
    pub fn new(
        local: Arc<dyn FavoritesStore>,
        persistent: Arc<dyn PersistentStoreFactory>,
        session: Session,
    ) -> Self {
        let store = select_store(&local, persistent.as_ref(), &session);
        Self {
            local,
            persistent,
            active: Mutex::new(Active {
                session,
                store,
                generation: 0,
                cache: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Active> {
        // The cache is always left consistent, so a poisoned lock is usable
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> (Arc<dyn FavoritesStore>, u64) {
        let active = self.lock();
        (active.store.clone(), active.generation)
    }

    /// Apply `f` to the cache unless the session changed since `generation`.
    fn commit(&self, generation: u64, f: impl FnOnce(&mut Vec<FavoriteItem>)) {
        let mut active = self.lock();
        if active.generation == generation {
            f(&mut active.cache);
        } else {
            tracing::debug!(
                started = generation,
                current = active.generation,
                "Dropping favorites update from previous session"
            );
        }
    }

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn store_kind(&self) -> StoreKind {
        self.lock().store.kind()
    }

    // ─── Store operations ────────────────────────────────────────

    /// Reload the cache from the active store, newest first.
    ///
    /// If the server cannot be read, the local list is shown instead. If
    /// local storage cannot be read either, the list is empty.
    pub async fn load_favorites(&self) -> Vec<FavoriteItem> {
        let (store, generation) = self.snapshot();

        let mut items = match store.list().await {
            Ok(items) => items,
            Err(e) if store.kind() == StoreKind::Persistent => {
                tracing::warn!(error = %e, "Failed to load favorites from server, using local list");
                self.local.list().await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to read local favorites");
                    Vec::new()
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read local favorites");
                Vec::new()
            }
        };
        sort_newest_first(&mut items);

        self.commit(generation, |cache| *cache = items.clone());
        items
    }

    pub async fn try_add_favorite(&self, recipe: &RecipeSummary) -> Result<(), FavoritesError> {
        let (store, generation) = self.snapshot();
        let item = store.add(recipe).await?;

        tracing::debug!(recipe_id = %item.id, kind = ?store.kind(), "Favorite added");
        self.commit(generation, |cache| {
            cache.retain(|i| i.id != item.id);
            cache.push(item);
        });
        Ok(())
    }

    /// Add a recipe to favorites. Returns `false` if it was already a
    /// favorite or the store failed.
    pub async fn add_favorite(&self, recipe: &RecipeSummary) -> bool {
        report("add", &recipe.id, self.try_add_favorite(recipe).await)
    }

    pub async fn try_remove_favorite(&self, recipe_id: &str) -> Result<(), FavoritesError> {
        let (store, generation) = self.snapshot();
        store.remove(recipe_id).await?;

        tracing::debug!(recipe_id = %recipe_id, kind = ?store.kind(), "Favorite removed");
        self.commit(generation, |cache| cache.retain(|i| i.id != recipe_id));
        Ok(())
    }

    /// Remove a recipe from favorites. Returns `false` if it was not a
    /// favorite or the store failed; the cache is unchanged in that case.
    pub async fn remove_favorite(&self, recipe_id: &str) -> bool {
        report("remove", recipe_id, self.try_remove_favorite(recipe_id).await)
    }

    /// Add or remove depending on whether the cache has the recipe.
    pub async fn toggle_favorite(&self, recipe: &RecipeSummary) -> bool {
        if self.is_favorite(&recipe.id) {
            self.remove_favorite(&recipe.id).await
        } else {
            self.add_favorite(recipe).await
        }
    }

    // ─── Cache queries ───────────────────────────────────────────

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.lock().cache.iter().any(|i| i.id == recipe_id)
    }

    pub fn sorted_favorites(&self) -> Vec<FavoriteItem> {
        let mut items = self.lock().cache.clone();
        sort_newest_first(&mut items);
        items
    }

    // ─── Session changes ─────────────────────────────────────────

    /// Switch to a new session: pick its store, drop the cache and reload.
    ///
    /// Local favorites are not carried over to an authenticated session.
    pub async fn set_session(&self, session: Session) -> Vec<FavoriteItem> {
        {
            let mut active = self.lock();
            active.store = select_store(&self.local, self.persistent.as_ref(), &session);
            active.generation += 1;
            active.cache.clear();
            tracing::info!(
                user_id = ?session.user_id,
                kind = ?active.store.kind(),
                generation = active.generation,
                "Favorites session changed"
            );
            active.session = session;
        }
        self.load_favorites().await
    }

    /// Follow a session channel, switching on every change until the sender
    /// is dropped.
    pub fn spawn_session_listener(
        self: Arc<Self>,
        mut sessions: watch::Receiver<Session>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while sessions.changed().await.is_ok() {
                let session = sessions.borrow_and_update().clone();
                self.set_session(session).await;
            }
            tracing::debug!("Session channel closed, favorites listener exiting");
        })
    }
}

fn select_store(
    local: &Arc<dyn FavoritesStore>,
    persistent: &dyn PersistentStoreFactory,
    session: &Session,
) -> Arc<dyn FavoritesStore> {
    match session.user_id.as_deref() {
        Some(user_id) if session.is_authenticated() => persistent.for_session(user_id, session),
        _ => local.clone(),
    }
}

/// Collapse a typed result into a success flag, logging the failure.
fn report(op: &str, recipe_id: &str, result: Result<(), FavoritesError>) -> bool {
    match result {
        Ok(()) => true,
        Err(
            e @ (FavoritesError::AlreadyFavorited(_)
            | FavoritesError::NotFavorited(_)
            | FavoritesError::Vanished(_)),
        ) => {
            tracing::info!(op, recipe_id, reason = %e, "Favorite unchanged");
            false
        }
        Err(e) => {
            tracing::warn!(op, recipe_id, error = %e, "Favorite operation failed");
            false
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites client.
//!
//! [`FavoritesService`] keeps a session's favorites in memory and writes
//! through to one store: the server ([`RemoteFavoritesStore`]) while the
//! session is authenticated, local key/value storage
//! ([`LocalFavoritesStore`]) otherwise.

pub mod favorites;
pub mod local;
pub mod remote;
pub mod session;
pub mod store;

pub use favorites::FavoritesService;
pub use local::{FileStorage, LocalFavoritesStore, LocalStorage, MemoryStorage, StorageError};
pub use remote::{RemoteFavoritesStore, RemoteStoreFactory};
pub use session::{Session, SessionContext};
pub use store::{
    FavoriteItem, FavoritesError, FavoritesStore, PersistentStoreFactory, RecipeSummary,
    StoreKind, FAVORITES_KEY,
};

//! JSON-file backed favorites store.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::domain::{Crs, FavoriteStation};

use super::error::FavoritesError;

/// Persistent favorites keyed by station code.
///
/// Writers are serialized; the on-disk file is replaced atomically before the
/// new list is published, so subscribers never see a state that wasn't
/// stored.
#[derive(Debug)]
pub struct FavoritesStore {
    /// Backing file, or `None` for a session-only store.
    path: Option<PathBuf>,
    tx: watch::Sender<Vec<FavoriteStation>>,
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// Repeated codes in the file keep their first entry.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, FavoritesError> {
        let path = path.into();
        let stored: Vec<FavoriteStation> = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut favorites: Vec<FavoriteStation> = Vec::with_capacity(stored.len());
        for station in stored {
            if favorites.iter().any(|f| f.code == station.code) {
                debug!(station = %station.code, "Skipping duplicate favorite");
                continue;
            }
            favorites.push(station);
        }

        Ok(Self::with_contents(Some(path), favorites))
    }

    /// A store that keeps favorites for this process only.
    pub fn in_memory() -> Self {
        Self::with_contents(None, Vec::new())
    }

    fn with_contents(path: Option<PathBuf>, favorites: Vec<FavoriteStation>) -> Self {
        let (tx, _) = watch::channel(favorites);
        Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        }
    }

    /// Current favorites.
    pub fn list(&self) -> Vec<FavoriteStation> {
        self.tx.borrow().clone()
    }

    /// Live view of the favorites list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoriteStation>> {
        self.tx.subscribe()
    }

    pub fn contains(&self, code: &Crs) -> bool {
        self.tx.borrow().iter().any(|f| &f.code == code)
    }

    /// Add a favorite, replacing any existing entry with the same code.
    pub async fn add(&self, station: FavoriteStation) -> Result<(), FavoritesError> {
        let _guard = self.write_lock.lock().await;

        let mut favorites = self.list();
        match favorites.iter_mut().find(|f| f.code == station.code) {
            Some(existing) => *existing = station,
            None => favorites.push(station),
        }

        self.commit(favorites).await
    }

    /// Remove the favorite with `code`. Returns whether it was present.
    pub async fn remove(&self, code: &Crs) -> Result<bool, FavoritesError> {
        let _guard = self.write_lock.lock().await;

        let mut favorites = self.list();
        let before = favorites.len();
        favorites.retain(|f| &f.code != code);
        if favorites.len() == before {
            return Ok(false);
        }

        self.commit(favorites).await?;
        Ok(true)
    }

    /// Remove `station` if its code is stored, otherwise add it.
    ///
    /// The check and the change happen under one lock, so overlapping toggles
    /// cancel out. Returns `true` when the station was added.
    pub async fn toggle(&self, station: FavoriteStation) -> Result<bool, FavoritesError> {
        let _guard = self.write_lock.lock().await;

        let mut favorites = self.list();
        let before = favorites.len();
        favorites.retain(|f| f.code != station.code);
        let added = favorites.len() == before;
        if added {
            favorites.push(station);
        }

        self.commit(favorites).await?;
        Ok(added)
    }

    /// Persist then publish. Caller must hold the write lock.
    async fn commit(&self, favorites: Vec<FavoriteStation>) -> Result<(), FavoritesError> {
        if let Some(path) = &self.path {
            write_atomically(path, &favorites).await?;
        }
        debug!(count = favorites.len(), "Favorites updated");
        self.tx.send_replace(favorites);
        Ok(())
    }
}

/// Write to a sibling temp file and rename over the target.
async fn write_atomically(path: &Path, favorites: &[FavoriteStation]) -> Result<(), FavoritesError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(favorites)?;
    let tmp = path.with_extension("json.tmp");

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(json.as_bytes()).await?;
    // Data must be on disk before the rename makes it visible.
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

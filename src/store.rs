//! Saved-article persistence.
//!
//! [`ArticleStore`] is the surface the rest of the crate consumes.
//! [`MemoryStore`] keeps everything in memory and can round-trip itself
//! through a JSON file, which is all the command-line driver needs.

use crate::error::StoreError;
use crate::models::{Category, SavedArticle};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// CRUD operations over saved articles. Listings are newest first.
pub trait ArticleStore {
    /// Insert `article`, replacing any existing row with the same id. An id of
    /// zero is assigned a fresh one. Returns the stored id.
    fn insert(&mut self, article: SavedArticle) -> u64;
    fn update(&mut self, article: SavedArticle) -> Result<(), StoreError>;
    fn delete(&mut self, id: u64) -> Result<(), StoreError>;
    fn get(&self, id: u64) -> Option<SavedArticle>;
    fn list_all(&self) -> Vec<SavedArticle>;
    /// [`Category::All`] lists everything.
    fn list_by_category(&self, category: Category) -> Vec<SavedArticle>;
    /// Articles saved between `start` and `end` (inclusive, epoch millis).
    fn list_by_date_range(&self, start: i64, end: i64) -> Vec<SavedArticle>;
    fn list_favorites(&self) -> Vec<SavedArticle>;
    fn list_summarized(&self) -> Vec<SavedArticle>;
    fn toggle_favorite(&mut self, id: u64, is_favorite: bool) -> Result<(), StoreError>;
    fn delete_all(&mut self);
}

fn newest_first<'a>(rows: impl Iterator<Item = &'a SavedArticle>) -> Vec<SavedArticle> {
    let mut out: Vec<SavedArticle> = rows.cloned().collect();
    out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    out
}

/// In-memory store, optionally backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    articles: BTreeMap<u64, SavedArticle>,
}

impl MemoryStore {
    /// An empty store. Ids start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.articles.keys().next_back().map_or(1, |id| id + 1)
    }

    /// Load a store from `path`. A missing file is an empty store.
    ///
    /// Rows without an id (or with id 0) are given fresh ids after every
    /// explicitly numbered row is in place, exactly as [`ArticleStore::insert`]
    /// would. Two rows sharing a non-zero id are rejected with
    /// [`StoreError::DuplicateId`] rather than silently collapsed.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let text = match fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Store file does not exist yet; starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let rows: Vec<SavedArticle> = serde_json::from_str(&text)?;
        let (numbered, unnumbered): (Vec<_>, Vec<_>) = rows.into_iter().partition(|a| a.id != 0);

        let mut store = Self::new();
        for article in numbered {
            if store.articles.contains_key(&article.id) {
                warn!(id = article.id, "Duplicate id in store file");
                return Err(StoreError::DuplicateId(article.id));
            }
            store.articles.insert(article.id, article);
        }
        if !unnumbered.is_empty() {
            debug!(count = unnumbered.len(), "Assigning ids to unnumbered rows");
        }
        for article in unnumbered {
            store.insert(article);
        }
        info!(count = store.articles.len(), "Loaded saved articles");
        Ok(store)
    }

    /// Write the store to `path` as a JSON array, creating parent directories.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let rows: Vec<&SavedArticle> = self.articles.values().collect();
        let json = serde_json::to_string_pretty(&rows)?;
        fs::write(path, json).await?;
        info!(count = rows.len(), "Saved articles written");
        Ok(())
    }
}

impl ArticleStore for MemoryStore {
    fn insert(&mut self, mut article: SavedArticle) -> u64 {
        if article.id == 0 {
            article.id = self.next_id();
        }
        let id = article.id;
        debug!(id, url = %article.url, "Inserting article");
        self.articles.insert(id, article);
        id
    }

    fn update(&mut self, article: SavedArticle) -> Result<(), StoreError> {
        let row = self
            .articles
            .get_mut(&article.id)
            .ok_or(StoreError::NotFound(article.id))?;
        *row = article;
        Ok(())
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        self.articles.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    fn get(&self, id: u64) -> Option<SavedArticle> {
        self.articles.get(&id).cloned()
    }

    fn list_all(&self) -> Vec<SavedArticle> {
        newest_first(self.articles.values())
    }

    fn list_by_category(&self, category: Category) -> Vec<SavedArticle> {
        newest_first(
            self.articles
                .values()
                .filter(|a| category == Category::All || a.category == category),
        )
    }

    fn list_by_date_range(&self, start: i64, end: i64) -> Vec<SavedArticle> {
        newest_first(
            self.articles
                .values()
                .filter(|a| (start..=end).contains(&a.timestamp)),
        )
    }

    fn list_favorites(&self) -> Vec<SavedArticle> {
        newest_first(self.articles.values().filter(|a| a.is_favorite))
    }

    fn list_summarized(&self) -> Vec<SavedArticle> {
        newest_first(self.articles.values().filter(|a| a.is_summarized))
    }

    fn toggle_favorite(&mut self, id: u64, is_favorite: bool) -> Result<(), StoreError> {
        let row = self.articles.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        row.is_favorite = is_favorite;
        Ok(())
    }

    fn delete_all(&mut self) {
        self.articles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn article(title: &str, timestamp: i64, category: Category) -> SavedArticle {
        SavedArticle {
            id: 0,
            title: title.to_string(),
            url: format!("https://example.com/{timestamp}"),
            content: String::new(),
            summary: String::new(),
            timestamp,
            is_summarized: false,
            category,
            is_favorite: false,
            is_test: false,
        }
    }

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(article("첫 번째", 100, Category::Politics));
        store.insert(article("두 번째", 300, Category::Economy));
        store.insert(article("세 번째", 200, Category::Politics));
        store
    }

    #[test]
    fn test_insert_assigns_ids() {
        let mut store = MemoryStore::new();
        assert_eq!(store.insert(article("a", 1, Category::All)), 1);
        assert_eq!(store.insert(article("b", 2, Category::All)), 2);
        let mut explicit = article("c", 3, Category::All);
        explicit.id = 10;
        assert_eq!(store.insert(explicit), 10);
        assert_eq!(store.insert(article("d", 4, Category::All)), 11);
    }

    #[test]
    fn test_list_all_newest_first() {
        let titles: Vec<String> = seeded().list_all().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["두 번째", "세 번째", "첫 번째"]);
    }

    #[test]
    fn test_list_by_category() {
        let store = seeded();
        assert_eq!(store.list_by_category(Category::Politics).len(), 2);
        assert_eq!(store.list_by_category(Category::It).len(), 0);
        assert_eq!(store.list_by_category(Category::All).len(), 3);
    }

    #[test]
    fn test_list_by_date_range_inclusive() {
        let store = seeded();
        assert_eq!(store.list_by_date_range(100, 200).len(), 2);
        assert_eq!(store.list_by_date_range(301, 400).len(), 0);
    }

    #[test]
    fn test_toggle_favorite_and_list() {
        let mut store = seeded();
        store.toggle_favorite(2, true).unwrap();
        let favorites = store.list_favorites();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, 2);

        store.toggle_favorite(2, false).unwrap();
        assert!(store.list_favorites().is_empty());
        assert!(matches!(store.toggle_favorite(99, true), Err(StoreError::NotFound(99))));
    }

    #[test]
    fn test_update_and_delete() {
        let mut store = seeded();
        let mut row = store.get(1).unwrap();
        row.summary = "요약".to_string();
        row.is_summarized = true;
        store.update(row).unwrap();
        assert_eq!(store.list_summarized().len(), 1);

        store.delete(1).unwrap();
        assert!(store.get(1).is_none());
        assert!(matches!(store.delete(1), Err(StoreError::NotFound(1))));
        assert!(matches!(
            store.update(article("없음", 0, Category::All)),
            Err(StoreError::NotFound(0))
        ));

        store.delete_all();
        assert!(store.list_all().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = seeded();
        store.toggle_favorite(3, true).unwrap();
        store.save(&path).await.unwrap();

        let loaded = MemoryStore::load(&path).await.unwrap();
        assert_eq!(loaded.list_all(), store.list_all());
        assert_eq!(loaded.list_favorites()[0].id, 3);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("absent.json")).await.unwrap();
        assert!(store.list_all().is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            MemoryStore::load(&path).await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_load_assigns_ids_to_unnumbered_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"[{"title":"정부 예산안","url":"https://a/1","is_favorite":true},{"title":"정부 정책","url":"https://a/2","is_favorite":true}]"#,
        )
        .unwrap();

        let store = MemoryStore::load(&path).await.unwrap();
        assert_eq!(store.list_all().len(), 2);
        assert_eq!(store.list_favorites().len(), 2);
        let ids: Vec<u64> = store.list_all().iter().map(|a| a.id).collect();
        assert!(ids.iter().all(|&id| id != 0));
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_load_unnumbered_rows_do_not_take_existing_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"[{"title":"번호 없음","url":"https://a/1"},{"id":1,"title":"번호 있음","url":"https://a/2"}]"#,
        )
        .unwrap();

        let store = MemoryStore::load(&path).await.unwrap();
        assert_eq!(store.get(1).unwrap().title, "번호 있음");
        assert_eq!(store.get(2).unwrap().title, "번호 없음");
    }

    #[tokio::test]
    async fn test_load_rejects_duplicate_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"[{"id":7,"title":"정부 예산안","url":"https://a/1"},{"id":7,"title":"정부 정책","url":"https://a/2"}]"#,
        )
        .unwrap();

        assert!(matches!(
            MemoryStore::load(&path).await,
            Err(StoreError::DuplicateId(7))
        ));
    }
}

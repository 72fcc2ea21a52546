use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SpendError};
use crate::models::CategoryMap;
use crate::settings::{Settings, StoreKind};

/// Where the category map lives between runs. `load` and `save` each read or
/// rewrite the whole map; a failed save leaves the previous copy intact.
pub trait CategoryStore {
    fn load(&self) -> Result<CategoryMap>;
    fn save(&mut self, map: &CategoryMap) -> Result<()>;
}

impl<S: CategoryStore + ?Sized> CategoryStore for Box<S> {
    fn load(&self) -> Result<CategoryMap> {
        (**self).load()
    }

    fn save(&mut self, map: &CategoryMap) -> Result<()> {
        (**self).save(map)
    }
}

pub fn open_store(settings: &Settings) -> Box<dyn CategoryStore> {
    let data_dir = PathBuf::from(&settings.data_dir);
    match settings.store {
        StoreKind::Json => Box::new(JsonStore::new(data_dir.join("categories.json"))),
        StoreKind::Sqlite => Box::new(SqliteStore::new(data_dir.join("categories.db"))),
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CategoryStore for JsonStore {
    fn load(&self) -> Result<CategoryMap> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No category file, starting from defaults");
            return Ok(CategoryMap::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, map: &CategoryMap) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;

        // Write beside the target, then rename over it.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, map)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| SpendError::Io(e.error))?;
        debug!(path = %self.path.display(), categories = map.len(), "Saved category map");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    name TEXT PRIMARY KEY,
    position INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS category_keywords (
    category TEXT NOT NULL,
    position INTEGER NOT NULL,
    keyword TEXT NOT NULL,
    FOREIGN KEY (category) REFERENCES categories(name) ON DELETE CASCADE
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CategoryStore for SqliteStore {
    fn load(&self) -> Result<CategoryMap> {
        if !self.path.exists() {
            return Ok(CategoryMap::default());
        }
        let conn = get_connection(&self.path)?;

        let mut cat_stmt = conn.prepare("SELECT name FROM categories ORDER BY position")?;
        let names: Vec<String> = cat_stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut kw_stmt = conn
            .prepare("SELECT keyword FROM category_keywords WHERE category = ?1 ORDER BY position")?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let keywords: Vec<String> = kw_stmt
                .query_map([&name], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            entries.push((name, keywords));
        }
        Ok(CategoryMap::from_entries(entries))
    }

    fn save(&mut self, map: &CategoryMap) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let mut conn = get_connection(&self.path)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM category_keywords", [])?;
        tx.execute("DELETE FROM categories", [])?;
        for (pos, (name, keywords)) in map.iter().enumerate() {
            tx.execute(
                "INSERT INTO categories (name, position) VALUES (?1, ?2)",
                rusqlite::params![name, pos as i64],
            )?;
            for (kw_pos, keyword) in keywords.iter().enumerate() {
                tx.execute(
                    "INSERT INTO category_keywords (category, position, keyword) VALUES (?1, ?2, ?3)",
                    rusqlite::params![name, kw_pos as i64, keyword],
                )?;
            }
        }
        tx.commit()?;
        debug!(path = %self.path.display(), categories = map.len(), "Saved category map");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory (tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    pub map: Option<CategoryMap>,
    pub saves: usize,
}

#[cfg(test)]
impl CategoryStore for MemoryStore {
    fn load(&self) -> Result<CategoryMap> {
        Ok(self.map.clone().unwrap_or_default())
    }

    fn save(&mut self, map: &CategoryMap) -> Result<()> {
        self.map = Some(map.clone());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNCATEGORIZED;

    fn sample_map() -> CategoryMap {
        CategoryMap::from_entries(vec![
            (UNCATEGORIZED.to_string(), vec![]),
            ("Food".to_string(), vec!["Coffee Shop".to_string(), "bakery".to_string()]),
            ("Bills".to_string(), vec!["Electric Co".to_string()]),
            ("Empty".to_string(), vec![]),
        ])
    }

    #[test]
    fn test_json_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("categories.json"));
        assert_eq!(store.load().unwrap(), CategoryMap::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(dir.path().join("categories.json"));
        let map = sample_map();
        store.save(&map).unwrap();
        assert_eq!(store.load().unwrap(), map);
    }

    #[test]
    fn test_json_save_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("categories.json");
        let mut store = JsonStore::new(&path);
        store.save(&sample_map()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_json_reads_plain_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, r#"{"Uncategorized": [], "Food": ["coffee shop"]}"#).unwrap();
        let map = JsonStore::new(&path).load().unwrap();
        assert_eq!(map.keywords("Food").unwrap(), ["coffee shop"]);
    }

    #[test]
    fn test_json_rejects_bad_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let err = JsonStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SpendError::Json(_)));
    }

    #[test]
    fn test_sqlite_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(dir.path().join("categories.db"));
        let map = sample_map();
        store.save(&map).unwrap();
        assert_eq!(store.load().unwrap(), map);
    }

    #[test]
    fn test_sqlite_save_replaces_previous_map() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(dir.path().join("categories.db"));
        store.save(&sample_map()).unwrap();
        let smaller = CategoryMap::from_entries(vec![("Travel".to_string(), vec!["Airline".to_string()])]);
        store.save(&smaller).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, smaller);
        assert!(!loaded.contains("Food"));
    }

    #[test]
    fn test_sqlite_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("categories.db"));
        assert_eq!(store.load().unwrap(), CategoryMap::default());
    }

    #[test]
    fn test_open_store_picks_backend() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().to_string_lossy().to_string(),
            store: StoreKind::Sqlite,
            ..Settings::default()
        };
        let mut store = open_store(&settings);
        store.save(&sample_map()).unwrap();
        assert!(dir.path().join("categories.db").exists());
        assert!(!dir.path().join("categories.json").exists());
    }
}

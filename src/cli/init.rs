use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path, StoreKind};
use crate::store::{open_store, CategoryStore};

pub fn run(data_dir: Option<String>, store: Option<StoreKind>, currency: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(kind) = store {
        settings.store = kind;
    }
    if let Some(label) = currency {
        settings.currency = label.trim().to_string();
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    // Materialize the store so later commands find a map on disk.
    let mut store = open_store(&settings);
    let map = store.load()?;
    store.save(&map)?;

    println!("Initialized spendsight at {}", resolved.display());
    println!("Settings: {}", settings_path().display());
    Ok(())
}

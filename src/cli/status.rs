use crate::cli::open_categorizer;
use crate::error::Result;
use crate::settings::{load_settings, settings_path, StoreKind};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let store_name = match settings.store {
        StoreKind::Json => "json (categories.json)",
        StoreKind::Sqlite => "sqlite (categories.db)",
    };

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_dir);
    println!("Store:      {store_name}");
    println!("Currency:   {}", settings.currency);

    let engine = open_categorizer(&settings)?;
    let keywords: usize = engine.map().iter().map(|(_, kws)| kws.len()).sum();
    println!();
    println!(
        "Categories: {} ({})",
        engine.map().len(),
        engine.map().names().collect::<Vec<_>>().join(", ")
    );
    println!("Keywords:   {keywords}");
    Ok(())
}

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_categorizer;
use crate::error::Result;
use crate::models::UNCATEGORIZED;
use crate::settings::load_settings;

pub fn list() -> Result<()> {
    let engine = open_categorizer(&load_settings())?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Keywords"]);
    for (name, keywords) in engine.map().iter() {
        let label = if name == UNCATEGORIZED {
            Cell::new(name.dimmed())
        } else {
            Cell::new(name)
        };
        table.add_row(vec![label, Cell::new(keywords.join("\n"))]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str) -> Result<()> {
    let mut engine = open_categorizer(&load_settings())?;
    engine.add_category(name)?;
    println!("Added category: {}", name.trim());
    Ok(())
}

pub fn learn(category: &str, keyword: &str) -> Result<()> {
    let mut engine = open_categorizer(&load_settings())?;
    if engine.learn(category, keyword)? {
        println!("Learned: '{}' \u{2192} {category}", keyword.trim());
    } else {
        println!("Nothing to learn: '{}' is blank or already known for {category}", keyword.trim());
    }
    Ok(())
}

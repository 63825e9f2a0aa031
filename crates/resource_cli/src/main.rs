//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `resource_core` linkage with a scripted session against an
//!   in-memory database.
//! - Keep output line-oriented `key=value` for quick local sanity checks.
//! - Start core logging before any store work; a logging failure is reported
//!   but does not abort the session.

mod bookmark;

use bookmark::{BookmarkManager, BookmarkPatch};
use resource_core::{
    default_log_level, init_logging, open_db_in_memory, FilterValue, ListParams, ResourceError,
};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

const LOG_DIR_NAME: &str = "resource_cli_logs";

fn main() -> ExitCode {
    let log_dir = std::env::temp_dir().join(LOG_DIR_NAME);
    match run(&log_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(log_dir: &Path) -> Result<(), Box<dyn Error>> {
    println!("resource_core version={}", resource_core::core_version());
    match start_logging(log_dir) {
        Ok(()) => println!("logging=ok dir={}", log_dir.display()),
        Err(err) => println!("logging=error error={err}"),
    }

    let conn = open_db_in_memory()?;
    conn.execute_batch(bookmark::BOOKMARKS_DDL)?;
    let manager = BookmarkManager::new(&conn)?;

    let rust = manager.add("https://www.rust-lang.org", "rust")?;
    let docs = manager.add("https://docs.rs", "rust")?;
    manager.add("https://sqlite.org", "db")?;
    println!("create id={} url={}", rust.envelope.id, rust.url);

    let dup = manager.add("https://docs.rs", "dup");
    println!("create_duplicate error={}", describe(dup.err()));

    manager.base().update(
        &docs.envelope.id.to_string(),
        &BookmarkPatch {
            title: Some("docs.rs".to_string()),
            ..BookmarkPatch::default()
        },
    )?;
    let reloaded = manager.base().get(&docs.envelope.id.to_string())?;
    println!(
        "update id={} title={}",
        reloaded.envelope.id,
        reloaded.title.as_deref().unwrap_or("-")
    );

    let tagged = manager.base().list(
        &ListParams::default()
            .with_filter("tag", FilterValue::Text("rust".to_string()))
            .with_sort("url"),
    )?;
    println!("list tag=rust count={}", tagged.len());

    manager.base().delete(&rust.envelope.id.to_string())?;
    let again = manager.base().delete(&rust.envelope.id.to_string());
    println!("delete_twice error={}", describe(again.err()));

    let malformed = manager.base().get("not-a-uuid");
    println!("get_malformed error={}", describe(malformed.err()));

    Ok(())
}

fn start_logging(log_dir: &Path) -> Result<(), String> {
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| format!("log directory `{}` is not valid UTF-8", log_dir.display()))?;
    init_logging(default_log_level(), log_dir)
}

fn describe(err: Option<ResourceError>) -> &'static str {
    err.map_or("none", ResourceError::code)
}

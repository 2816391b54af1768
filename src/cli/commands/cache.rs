//! Cache command - inspect and prune the build cache

use crate::cache::prune::{self, mb_to_bytes};
use crate::cache::{format_bytes, CacheEntry, Store};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::GoscriptResult;
use crate::ui::{self, UiContext};
use chrono::Utc;
use console::style;
use std::time::Duration;
use tracing::debug;

/// Temp outputs younger than this may belong to a build still running
const STALE_TEMP_AGE: Duration = Duration::from_secs(60 * 60);

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> GoscriptResult<()> {
    let store = Store::open(config.cache.root.as_deref())?;

    match args.action {
        CacheAction::List { format } => list_entries(&store, format),
        CacheAction::Path => {
            println!("{}", store.root().display());
            Ok(())
        }
        CacheAction::Gc {
            days,
            max_size_mb,
            dry_run,
        } => gc(&store, config, days, max_size_mb, dry_run),
        CacheAction::Clear { yes } => clear(&store, yes),
    }
}

fn list_entries(store: &Store, format: OutputFormat) -> GoscriptResult<()> {
    let entries = prune::list_entries(store)?;

    match format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.key);
            }
        }
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    if entries.is_empty() {
        println!("No cached scripts.");
        return;
    }

    println!("{:<14} {:<10} {:>10} {:<20}", "KEY", "STATE", "SIZE", "MODIFIED");
    println!("{}", "-".repeat(57));

    for entry in entries {
        // Pad before styling; escape codes would throw off the width
        let state = if entry.has_binary {
            style(format!("{:<10}", "built")).green()
        } else {
            style(format!("{:<10}", "unbuilt")).yellow()
        };

        println!(
            "{:<14} {} {:>10} {:<20}",
            entry.key.short(),
            state,
            format_bytes(entry.size_bytes),
            entry.modified.format("%Y-%m-%d %H:%M")
        );
    }

    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    println!();
    println!(
        "Total: {} ({})",
        entries_word(entries.len()),
        format_bytes(total)
    );
}

fn print_json(entries: &[CacheEntry]) -> GoscriptResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson<'a> {
        key: &'a str,
        built: bool,
        size_bytes: u64,
        modified: String,
    }

    let json: Vec<EntryJson<'_>> = entries
        .iter()
        .map(|e| EntryJson {
            key: e.key.as_str(),
            built: e.has_binary,
            size_bytes: e.size_bytes,
            modified: e.modified.to_rfc3339(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn entries_word(n: usize) -> String {
    if n == 1 {
        "1 entry".to_string()
    } else {
        format!("{} entries", n)
    }
}

/// Remove entries by age, then trim to the size limit, oldest first
fn gc(
    store: &Store,
    config: &Config,
    days_override: Option<u32>,
    max_size_override: Option<u64>,
    dry_run: bool,
) -> GoscriptResult<()> {
    let ctx = UiContext::detect();
    let gc_days = days_override.unwrap_or(config.cache.gc_days);
    let max_size_mb = max_size_override.unwrap_or(config.cache.max_size_mb);
    let now = Utc::now();

    let entries = prune::list_entries(store)?;

    let mut to_remove = if gc_days > 0 {
        prune::select_older_than(&entries, gc_days, now)
    } else {
        Vec::new()
    };

    if max_size_mb > 0 {
        let remaining: Vec<CacheEntry> = entries
            .iter()
            .filter(|e| !to_remove.iter().any(|r| r.key == e.key))
            .cloned()
            .collect();
        to_remove.extend(prune::select_to_fit(&remaining, mb_to_bytes(max_size_mb)));
    }

    if to_remove.is_empty() {
        ui::remark(&ctx, "Nothing to remove.");
    } else {
        println!("Removing {}:", entries_word(to_remove.len()));
        for entry in &to_remove {
            let age_days = (now - entry.modified).num_days();
            println!(
                "  {} {} ({} days old, {})",
                style("•").red(),
                entry.key.short(),
                age_days,
                format_bytes(entry.size_bytes)
            );
        }
    }

    if dry_run {
        println!();
        println!("Dry run - nothing removed.");
        return Ok(());
    }

    if !to_remove.is_empty() {
        let freed = prune::remove_entries(store, &to_remove)?;
        ui::step_ok_detail(
            &ctx,
            &format!("Removed {}", entries_word(to_remove.len())),
            &format!("{} freed", format_bytes(freed)),
        );
    }

    let temps = prune::remove_stale_temps(store, STALE_TEMP_AGE)?;
    if temps > 0 {
        debug!("Removed {} stale temp output(s)", temps);
        ui::step_ok(&ctx, &format!("Removed {} abandoned build output(s)", temps));
    }

    Ok(())
}

fn clear(store: &Store, skip_confirm: bool) -> GoscriptResult<()> {
    let ctx = UiContext::detect();
    let entries = prune::list_entries(store)?;

    if entries.is_empty() {
        ui::remark(&ctx, "Cache is already empty.");
        return Ok(());
    }

    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    println!(
        "This will remove {} cached script(s) ({}) from {}",
        entries.len(),
        format_bytes(total),
        store.root().display()
    );

    if !ui::confirm_inline("Are you sure?", skip_confirm) {
        println!("Aborted.");
        return Ok(());
    }

    let removed = prune::clear(store)?;
    ui::step_ok(&ctx, &format!("Cleared {} cached script(s)", removed));

    Ok(())
}

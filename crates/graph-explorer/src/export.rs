use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde_json::json;

use crate::analysis::Relationships;
use crate::cli::ExportFormat;
use crate::client::GraphEntry;
use crate::error::Result;
use crate::graph::SocialGraph;

/// Render the analysis as a single pretty-printed JSON document:
/// account metadata, category counts, the three categorized lists and the
/// two raw lists, plus a generation timestamp.
pub fn to_json(graph: &SocialGraph, rels: &Relationships) -> Result<String> {
    let doc = json!({
        "actor": graph.actor,
        "account": graph.profile,
        "counts": {
            "followers": graph.followers.len(),
            "follows": graph.follows.len(),
            "mutuals": rels.mutuals.len(),
            "fans": rels.fans.len(),
            "not_following_back": rels.not_following_back.len(),
        },
        "followers": graph.followers,
        "follows": graph.follows,
        "mutuals": rels.mutuals,
        "fans": rels.fans,
        "not_following_back": rels.not_following_back,
        "generated_at": Utc::now().to_rfc3339(),
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Render the analysis as CSV: header `identifier,category`, one row per
/// account handle. With `include_raw`, the raw lists are appended as plain
/// `follower` / `follow` rows.
pub fn to_csv(graph: &SocialGraph, rels: &Relationships, include_raw: bool) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["identifier", "category"])?;

    write_rows(&mut wtr, &rels.mutuals, "mutual")?;
    write_rows(&mut wtr, &rels.fans, "fan")?;
    write_rows(&mut wtr, &rels.not_following_back, "not_following_back")?;

    if include_raw {
        write_rows(&mut wtr, &graph.followers, "follower")?;
        write_rows(&mut wtr, &graph.follows, "follow")?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_rows(
    wtr: &mut csv::Writer<Vec<u8>>,
    entries: &[GraphEntry],
    category: &str,
) -> Result<()> {
    for entry in entries {
        wtr.write_record([entry.handle.as_str(), category])?;
    }
    Ok(())
}

/// Render in the requested format and write it to `output`, or to stdout
/// when no path was given.
pub fn write_report(
    graph: &SocialGraph,
    rels: &Relationships,
    format: ExportFormat,
    output: Option<&Path>,
    include_raw: bool,
) -> Result<()> {
    let rendered = match format {
        ExportFormat::Json => to_json(graph, rels)?,
        ExportFormat::Csv => to_csv(graph, rels, include_raw)?,
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)?;
            println!("Exported {} to {}", format, path.display());
        }
        None => {
            io::stdout().write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}

/// Human-readable summary, printed when no export format is requested.
pub fn print_summary(graph: &SocialGraph, rels: &Relationships) {
    let line = "=".repeat(60);
    println!();
    println!("{line}");
    println!("SOCIAL GRAPH SUMMARY");
    println!("{line}");

    let profile = &graph.profile;
    println!("Account:    {} (@{})", display_name(profile.display_name.as_str(), &profile.handle), profile.handle);
    println!("DID:        {}", profile.did);
    println!("Bio:        {}", truncate(&profile.description, 100));
    println!("Followers:  {}", graph.followers.len());
    println!("Following:  {}", graph.follows.len());
    println!("Mutuals:    {}", rels.mutuals.len());

    print_section("--- Top 20 Mutuals ---", &rels.mutuals, 20);
    print_section(
        "--- Top 10 Fans (follow you, you don't follow back) ---",
        &rels.fans,
        10,
    );
    print_section("--- Top 10 Not Following Back ---", &rels.not_following_back, 10);

    println!("{line}");
}

fn print_section(title: &str, entries: &[GraphEntry], limit: usize) {
    if entries.is_empty() {
        return;
    }
    println!();
    println!("{title}");
    for entry in entries.iter().take(limit) {
        let name = display_name(&entry.display_name, &entry.handle);
        println!("  @{:30}  {}", entry.handle, name);
    }
}

fn display_name<'a>(display_name: &'a str, handle: &'a str) -> &'a str {
    if display_name.is_empty() {
        handle
    } else {
        display_name
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use macrocal_core::{Config, pipeline};
use owo_colors::OwoColorize;
use tempfile::NamedTempFile;

use super::create_spinner;
use crate::fetch::HttpFetcher;

pub async fn run(config: Config) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;

    let spinner = create_spinner(&format!("Fetching {} release dates", config.year));
    let result = pipeline::generate(&config, &fetcher, Utc::now()).await;
    spinner.finish_and_clear();

    let calendar = result.with_context(|| format!("Could not build the {} calendar", config.year))?;

    let path = config.output_path();
    write_atomically(&path, &calendar.content)
        .with_context(|| format!("Could not write {}", path.display()))?;

    println!(
        "{} Generated {} ({} events)",
        "✔".green(),
        path.display(),
        calendar.event_count
    );

    Ok(())
}

/// Write through a temp file in the destination directory, then rename,
/// so a failed run never leaves a truncated calendar behind.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.persist(path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("calendar.ics");

        write_atomically(&path, "BEGIN:VCALENDAR\r\n").unwrap();
        write_atomically(&path, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n"
        );
        // Only the calendar itself is left in the directory
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}

// src/report.rs
// =============================================================================
// Renders a ScanReport for people and for other programs.
//
// Three formats:
// - table: fixed-width columns on the terminal, followed by a summary
// - JSON: the summary counts, every record and every warning
// - CSV: one row per record (url,term,snippet), for spreadsheets
//
// Everything writes to a `impl Write` so tests can render into a Vec<u8>
// instead of stdout.
// =============================================================================

use crate::scan::{MatchRecord, ScanReport};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

const URL_WIDTH: usize = 50;
const TERM_WIDTH: usize = 20;
const SNIPPET_WIDTH: usize = 70;

/// "Found X matches across Y pages"
pub fn summary_line(report: &ScanReport) -> String {
    format!(
        "Found {} matches across {} pages",
        report.total_matches(),
        report.pages_with_matches()
    )
}

pub fn write_table<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    if report.has_matches() {
        writeln!(
            out,
            "{:<url$} {:<term$} {}",
            "URL",
            "TERM",
            "SNIPPET",
            url = URL_WIDTH,
            term = TERM_WIDTH
        )?;
        writeln!(out, "{}", "=".repeat(URL_WIDTH + TERM_WIDTH + SNIPPET_WIDTH + 2))?;

        for record in &report.records {
            writeln!(
                out,
                "{:<url$} {:<term$} {}",
                truncate(&record.url, URL_WIDTH),
                truncate(&record.term, TERM_WIDTH),
                truncate(&record.snippet, SNIPPET_WIDTH),
                url = URL_WIDTH,
                term = TERM_WIDTH
            )?;
        }
        writeln!(out)?;
    }

    for warning in &report.warnings {
        writeln!(out, "⚠️  {}", warning)?;
    }
    if report.cancelled {
        writeln!(out, "⏹️  Scan cancelled, results are partial")?;
    }

    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   🔗 URLs discovered: {}", report.urls_discovered)?;
    writeln!(out, "   📄 Pages scanned: {}", report.urls_scanned)?;
    writeln!(out, "   🔍 {}", summary_line(report))?;
    Ok(())
}

#[derive(Serialize)]
struct JsonSummary {
    urls_discovered: usize,
    urls_scanned: usize,
    total_matches: usize,
    pages_with_matches: usize,
    cancelled: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: JsonSummary,
    records: &'a [MatchRecord],
    warnings: &'a [String],
}

pub fn to_json(report: &ScanReport) -> serde_json::Result<String> {
    let json = JsonReport {
        summary: JsonSummary {
            urls_discovered: report.urls_discovered,
            urls_scanned: report.urls_scanned,
            total_matches: report.total_matches(),
            pages_with_matches: report.pages_with_matches(),
            cancelled: report.cancelled,
        },
        records: &report.records,
        warnings: &report.warnings,
    };
    serde_json::to_string_pretty(&json)
}

/// Writes `url,term,snippet` rows, header first.
pub fn write_csv<W: Write>(out: W, records: &[MatchRecord]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    // An empty export still gets its header
    if records.is_empty() {
        writer.write_record(["url", "term", "snippet"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, records: &[MatchRecord]) -> csv::Result<()> {
    let file = File::create(path)?;
    write_csv(file, records)
}

// Shortens `text` to at most `max` characters, ending in "..." when cut.
// Counts chars so multi-byte text is never split mid-character.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, term: &str, snippet: &str) -> MatchRecord {
        MatchRecord {
            url: url.to_string(),
            term: term.to_string(),
            snippet: snippet.to_string(),
        }
    }

    fn sample() -> ScanReport {
        ScanReport {
            records: vec![
                record("https://example.com/a", "OldBrand", "Built by OldBrand"),
                record("https://example.com/a", "OldBrand", "OldBrand, again"),
                record("https://example.com/b", "Template", "A Template page"),
            ],
            urls_discovered: 5,
            urls_scanned: 4,
            warnings: vec!["Error reading sitemap x: boom".to_string()],
            cancelled: false,
        }
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line(&sample()), "Found 3 matches across 2 pages");
        assert_eq!(
            summary_line(&ScanReport::default()),
            "Found 0 matches across 0 pages"
        );
    }

    #[test]
    fn test_table_lists_records_and_warnings() {
        let mut out = Vec::new();
        write_table(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("URL"));
        assert!(text.contains("Built by OldBrand"));
        assert!(text.contains("Error reading sitemap x: boom"));
        assert!(text.contains("Found 3 matches across 2 pages"));
    }

    #[test]
    fn test_table_without_matches_has_no_header() {
        let mut out = Vec::new();
        write_table(&mut out, &ScanReport::default()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("SNIPPET"));
        assert!(text.contains("Found 0 matches across 0 pages"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total_matches"], 3);
        assert_eq!(value["summary"]["pages_with_matches"], 2);
        assert_eq!(value["summary"]["urls_scanned"], 4);
        assert_eq!(value["records"][0]["term"], "OldBrand");
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        write_csv(&mut out, &sample().records).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "url,term,snippet");
        assert_eq!(lines[1], "https://example.com/a,OldBrand,Built by OldBrand");
        // The comma forces quoting
        assert_eq!(lines[2], r#"https://example.com/a,OldBrand,"OldBrand, again""#);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "url,term,snippet\n");
    }

    #[test]
    fn test_export_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");

        export_csv(&path, &sample().records).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<MatchRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, sample().records);
    }
}

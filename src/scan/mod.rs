// src/scan/mod.rs
// =============================================================================
// This module searches pages for the terms.
//
// Submodules:
// - text: HTML -> visible plain text
// - matcher: plain text + terms -> snippets
// - pipeline: drives discovery and the scan pass, builds the ScanReport
// =============================================================================

mod matcher;
mod pipeline;
mod text;

pub use matcher::{search_terms, TermMatches, SNIPPET_RADIUS};
pub use pipeline::{match_page, Discovery, MatchRecord, ScanReport, Scanner};
pub use text::{extract_visible_text, normalize_whitespace};

//! Club Corpus — the authoritative, read-only club dataset.
//!
//! Loaded once at startup and shared behind an `Arc`. There are no writers
//! after construction, so no locking is involved anywhere.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::{IteratorRandom, SliceRandom};
use tracing::{info, warn};

use crate::models::club::ClubRecord;

/// Full records keyed by id, plus the compact listing used as resolver context.
#[derive(Debug, Clone)]
pub struct ClubCorpus {
    records: BTreeMap<i64, ClubRecord>,
    listing: String,
}

impl ClubCorpus {
    /// Builds a corpus whose listing is rendered from the records.
    pub fn new(records: BTreeMap<i64, ClubRecord>) -> Self {
        let listing = render_listing(&records);
        Self { records, listing }
    }

    /// Builds a corpus with an externally supplied listing text.
    pub fn with_listing(records: BTreeMap<i64, ClubRecord>, listing: String) -> Self {
        Self { records, listing }
    }

    /// Loads the club data file (a JSON object of id → record) and, if given,
    /// the listing file. Keys that are not integers are skipped with a warning.
    pub fn load(data_path: &Path, listing_path: Option<&Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(data_path)
            .with_context(|| format!("failed to read club data from {}", data_path.display()))?;
        let by_key: HashMap<String, ClubRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("club data in {} is not valid", data_path.display()))?;

        let mut records = BTreeMap::new();
        for (key, record) in by_key {
            match key.trim().parse::<i64>() {
                Ok(id) => {
                    records.insert(id, record);
                }
                Err(_) => warn!("Skipping club with non-numeric id '{key}'"),
            }
        }

        let corpus = match listing_path {
            Some(path) => {
                let listing = std::fs::read_to_string(path).with_context(|| {
                    format!("failed to read club listing from {}", path.display())
                })?;
                Self::with_listing(records, listing)
            }
            None => Self::new(records),
        };

        info!("Loaded {} clubs into the corpus", corpus.len());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&ClubRecord> {
        self.records.get(&id)
    }

    pub fn listing(&self) -> &str {
        &self.listing
    }

    /// Restricts the corpus to the requested ids. Unknown ids are dropped
    /// silently; duplicates collapse into a single entry.
    pub fn project(&self, ids: &[i64]) -> BTreeMap<i64, &ClubRecord> {
        ids.iter()
            .filter_map(|id| self.records.get(id).map(|record| (*id, record)))
            .collect()
    }

    /// Up to `limit` clubs in random order.
    pub fn sample(&self, limit: usize) -> Vec<(i64, &ClubRecord)> {
        let mut rng = rand::thread_rng();
        let mut picked: Vec<(i64, &ClubRecord)> = self
            .records
            .iter()
            .map(|(id, record)| (*id, record))
            .choose_multiple(&mut rng, limit);
        picked.shuffle(&mut rng);
        picked
    }

    pub fn random_id(&self) -> Option<i64> {
        self.records.keys().copied().choose(&mut rand::thread_rng())
    }

    /// Case-insensitive substring match on club names, ordered by id.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(i64, &ClubRecord)> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|(_, record)| record.name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|(id, record)| (*id, record))
            .collect()
    }
}

/// Renders `name,id` lines with a header row.
fn render_listing(records: &BTreeMap<i64, ClubRecord>) -> String {
    let mut listing = String::from("name,id\n");
    for (id, record) in records {
        listing.push_str(&csv_field(&record.name));
        listing.push(',');
        listing.push_str(&id.to_string());
        listing.push('\n');
    }
    listing
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
pub(crate) fn record(name: &str) -> ClubRecord {
    ClubRecord {
        name: name.to_string(),
        description: Some(format!("{name} meets weekly.")),
        logo_url: None,
        instagram_handle: None,
        instagram_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn corpus() -> ClubCorpus {
        ClubCorpus::new(BTreeMap::from([
            (3, record("Robotics Society")),
            (17, record("Chess Club")),
            (21, record("Chess, Go and Shogi")),
        ]))
    }

    #[test]
    fn test_project_keeps_only_known_ids() {
        let corpus = corpus();
        let projected = corpus.project(&[17, 42]);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[&17].name, "Chess Club");
        assert!(!projected.contains_key(&42));
    }

    #[test]
    fn test_project_collapses_duplicates() {
        let corpus = corpus();
        let projected = corpus.project(&[3, 3, 17]);
        assert_eq!(projected.keys().copied().collect::<Vec<_>>(), vec![3, 17]);
    }

    #[test]
    fn test_project_of_unknown_ids_is_empty() {
        assert!(corpus().project(&[99, 100]).is_empty());
    }

    #[test]
    fn test_listing_renders_name_id_lines_and_quotes_commas() {
        let listing = corpus().listing().to_string();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "name,id");
        assert_eq!(lines[1], "Robotics Society,3");
        assert_eq!(lines[2], "Chess Club,17");
        assert_eq!(lines[3], "\"Chess, Go and Shogi\",21");
    }

    #[test]
    fn test_search_is_case_insensitive_and_ordered() {
        let corpus = corpus();
        let ids: Vec<i64> = corpus.search("CHESS", 50).iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![17, 21]);
    }

    #[test]
    fn test_search_respects_limit_and_blank_query() {
        let corpus = corpus();
        assert_eq!(corpus.search("chess", 1).len(), 1);
        assert!(corpus.search("   ", 50).is_empty());
    }

    #[test]
    fn test_sample_never_exceeds_corpus_or_limit() {
        let corpus = corpus();
        assert_eq!(corpus.sample(50).len(), 3);
        assert_eq!(corpus.sample(2).len(), 2);
    }

    #[test]
    fn test_random_id_is_member_or_none() {
        let corpus = corpus();
        let id = corpus.random_id().unwrap();
        assert!(corpus.get(id).is_some());
        assert!(ClubCorpus::new(BTreeMap::new()).random_id().is_none());
    }

    #[test]
    fn test_load_reads_string_keyed_file_and_skips_bad_keys() {
        let mut data = tempfile::NamedTempFile::new().unwrap();
        write!(
            data,
            r#"{{
                "17": {{"club_name": "Chess Club", "description": "Blitz"}},
                "abc": {{"club_name": "Broken"}}
            }}"#
        )
        .unwrap();

        let corpus = ClubCorpus::load(data.path(), None).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(17).unwrap().description.as_deref(), Some("Blitz"));
        assert!(corpus.listing().contains("Chess Club,17"));
    }

    #[test]
    fn test_load_uses_listing_file_verbatim() {
        let mut data = tempfile::NamedTempFile::new().unwrap();
        write!(data, r#"{{"1": {{"club_name": "Film Society"}}}}"#).unwrap();
        let mut listing = tempfile::NamedTempFile::new().unwrap();
        write!(listing, "Name,ID\nFilm Society,1\n").unwrap();

        let corpus = ClubCorpus::load(data.path(), Some(listing.path())).unwrap();
        assert_eq!(corpus.listing(), "Name,ID\nFilm Society,1\n");
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = ClubCorpus::load(Path::new("/nonexistent/clubs.json"), None);
        assert!(result.is_err());
    }
}

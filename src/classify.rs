use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use crate::domain::{ClassificationStatus, Kingdom};
use crate::error::TriageError;

/// Keyword sets tested against a taxonomy string, in priority order.
///
/// The first kingdom with any matching keyword wins, so a lineage mentioning
/// both bacteria and a phage lands in `Bacteria`.
pub const KINGDOM_KEYWORDS: &[(Kingdom, &[&str])] = &[
    (Kingdom::Bacteria, &["Bacteria", "bacterium"]),
    (
        Kingdom::Viruses,
        &["Viruses", "Virus", "viridae", "virus", "phage", "Phage"],
    ),
    (Kingdom::Fungi, &["Fungi", "fungus", "mycota"]),
    (Kingdom::Archaea, &["Archaea", "archaeon"]),
    (
        Kingdom::Eukaryota,
        &["Eukaryota", "Metazoa", "Viridiplantae", "Protista"],
    ),
];

pub fn classify_taxonomy(taxonomy: &str) -> Kingdom {
    KINGDOM_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| taxonomy.contains(keyword)))
        .map(|(kingdom, _)| *kingdom)
        .unwrap_or(Kingdom::Other)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub status: ClassificationStatus,
    pub id: String,
    pub taxonomy: String,
}

impl ClassificationRecord {
    /// Parses a tab-separated line; `None` when it has fewer than three fields.
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 3 {
            return None;
        }
        let status = fields[0].parse().ok()?;
        Some(Self {
            status,
            id: fields[1].to_string(),
            taxonomy: fields[2].to_string(),
        })
    }

    pub fn kingdom(&self) -> Kingdom {
        match self.status {
            ClassificationStatus::Unclassified => Kingdom::Unclassified,
            ClassificationStatus::Classified => classify_taxonomy(&self.taxonomy),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KingdomMap {
    assignments: HashMap<String, Kingdom>,
}

impl KingdomMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, id: impl Into<String>, kingdom: Kingdom) {
        self.assignments.insert(id.into(), kingdom);
    }

    pub fn get(&self, id: &str) -> Option<Kingdom> {
        self.assignments.get(id).copied()
    }

    pub fn kingdom_of(&self, id: &str) -> Kingdom {
        self.get(id).unwrap_or(Kingdom::Unclassified)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

pub fn parse_classifier_output<R: BufRead>(reader: R) -> Result<KingdomMap, TriageError> {
    let mut map = KingdomMap::new();
    let mut skipped = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| TriageError::Filesystem(err.to_string()))?;
        match ClassificationRecord::parse_line(&line) {
            Some(record) => {
                let kingdom = record.kingdom();
                map.assign(record.id, kingdom);
            }
            None => {
                trace!(line = line_no + 1, "skipping short classifier line");
                skipped += 1;
            }
        }
    }
    debug!(assigned = map.len(), skipped, "parsed classifier output");
    Ok(map)
}

pub fn read_classifier_output(path: &Path) -> Result<KingdomMap, TriageError> {
    let file = File::open(path).map_err(|err| {
        TriageError::Filesystem(format!("open classifier output {}: {err}", path.display()))
    })?;
    parse_classifier_output(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_wins() {
        assert_eq!(
            classify_taxonomy("Bacteria; Siphoviridae; virus"),
            Kingdom::Bacteria
        );
    }

    #[test]
    fn keyword_sets() {
        assert_eq!(classify_taxonomy("Escherichia phage T4"), Kingdom::Viruses);
        assert_eq!(classify_taxonomy("Ascomycota"), Kingdom::Fungi);
        assert_eq!(
            classify_taxonomy("Methanogenic archaeon"),
            Kingdom::Archaea
        );
        assert_eq!(classify_taxonomy("Viridiplantae"), Kingdom::Eukaryota);
        assert_eq!(classify_taxonomy("root"), Kingdom::Other);
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(classify_taxonomy("BACTERIA"), Kingdom::Other);
    }

    #[test]
    fn unclassified_flag_ignores_taxonomy() {
        let record = ClassificationRecord::parse_line("U\tcontig_7\tBacteria").unwrap();
        assert_eq!(record.kingdom(), Kingdom::Unclassified);
    }

    #[test]
    fn empty_taxonomy_field_still_counts() {
        let record = ClassificationRecord::parse_line("U\tcontig_7\t").unwrap();
        assert_eq!(record.id, "contig_7");
        assert_eq!(record.kingdom(), Kingdom::Unclassified);
    }

    #[test]
    fn short_line_is_rejected() {
        assert_eq!(ClassificationRecord::parse_line("C\tcontig_1"), None);
    }
}

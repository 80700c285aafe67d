use std::str::FromStr;

use serde::Serialize;

use crate::error::TriageError;

/// Kingdom-level bucket a contig is triaged into.
///
/// Variants are declared in reporting order; `Kingdom::ALL` and
/// `Kingdom::index` rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Kingdom {
    Bacteria,
    Viruses,
    Fungi,
    Archaea,
    Eukaryota,
    Other,
    Unclassified,
}

impl Kingdom {
    pub const COUNT: usize = 7;

    pub const ALL: [Kingdom; Kingdom::COUNT] = [
        Kingdom::Bacteria,
        Kingdom::Viruses,
        Kingdom::Fungi,
        Kingdom::Archaea,
        Kingdom::Eukaryota,
        Kingdom::Other,
        Kingdom::Unclassified,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kingdom::Bacteria => "Bacteria",
            Kingdom::Viruses => "Viruses",
            Kingdom::Fungi => "Fungi",
            Kingdom::Archaea => "Archaea",
            Kingdom::Eukaryota => "Eukaryota",
            Kingdom::Other => "Other",
            Kingdom::Unclassified => "Unclassified",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}_contigs.fa", self.as_str().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassificationStatus {
    Classified,
    Unclassified,
}

impl FromStr for ClassificationStatus {
    type Err = TriageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "U" => Ok(ClassificationStatus::Unclassified),
            "" => Err(TriageError::InvalidStatus(value.to_string())),
            _ => Ok(ClassificationStatus::Classified),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn kingdom_order_matches_index() {
        for (position, kingdom) in Kingdom::ALL.iter().enumerate() {
            assert_eq!(kingdom.index(), position);
        }
    }

    #[test]
    fn kingdom_file_names() {
        assert_eq!(Kingdom::Bacteria.file_name(), "bacteria_contigs.fa");
        assert_eq!(Kingdom::Unclassified.file_name(), "unclassified_contigs.fa");
    }

    #[test]
    fn parse_status_flags() {
        assert_eq!(
            "U".parse::<ClassificationStatus>().unwrap(),
            ClassificationStatus::Unclassified
        );
        assert_eq!(
            "C".parse::<ClassificationStatus>().unwrap(),
            ClassificationStatus::Classified
        );
        assert_matches!(
            "".parse::<ClassificationStatus>(),
            Err(TriageError::InvalidStatus(_))
        );
    }
}

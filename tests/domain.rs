use assert_matches::assert_matches;

use contig_triage::domain::{ClassificationStatus, Kingdom};
use contig_triage::error::TriageError;

#[test]
fn all_kingdoms_in_report_order() {
    let names: Vec<&str> = Kingdom::ALL.iter().map(|kingdom| kingdom.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Bacteria",
            "Viruses",
            "Fungi",
            "Archaea",
            "Eukaryota",
            "Other",
            "Unclassified"
        ]
    );
}

#[test]
fn file_names_are_lowercase() {
    let files: Vec<String> = Kingdom::ALL.iter().map(|kingdom| kingdom.file_name()).collect();
    assert_eq!(files[0], "bacteria_contigs.fa");
    assert_eq!(files[4], "eukaryota_contigs.fa");
    assert_eq!(files[5], "other_contigs.fa");
}

#[test]
fn status_parses_unclassified_sentinel() {
    assert_eq!(
        "U".parse::<ClassificationStatus>().unwrap(),
        ClassificationStatus::Unclassified
    );
    assert_eq!(
        "taxid 562".parse::<ClassificationStatus>().unwrap(),
        ClassificationStatus::Classified
    );
}

#[test]
fn empty_status_is_rejected() {
    let err = "".parse::<ClassificationStatus>().unwrap_err();
    assert_matches!(err, TriageError::InvalidStatus(_));
}

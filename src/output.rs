use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, TriageResult};
use crate::domain::Kingdom;
use crate::stats::StatsOutcome;

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_stats(outcome: &StatsOutcome) -> io::Result<()> {
        Self::print_json(outcome)
    }

    pub fn print_triage(result: &TriageResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_stats(input: &Path, outcome: &StatsOutcome) -> io::Result<()> {
        Self::print(&render_stats(input, outcome))
    }

    pub fn print_triage(result: &TriageResult) -> io::Result<()> {
        Self::print(&render_triage(result))
    }

    fn print(text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({:.2}s)", event.message, elapsed.as_secs_f64()),
            None => eprintln!("{}", event.message),
        }
    }
}

pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// `{:.0}` rounds ties to even, so 12.5 prints as 12.
fn group_rounded(value: f64) -> String {
    let rounded = format!("{value:.0}");
    match rounded.parse::<u64>() {
        Ok(whole) => group_digits(whole),
        Err(_) => rounded,
    }
}

pub fn render_stats(input: &Path, outcome: &StatsOutcome) -> String {
    let stats = match outcome {
        StatsOutcome::Empty => return "No contigs found!\n".to_string(),
        StatsOutcome::Computed(stats) => stats,
    };

    let mut out = String::new();
    let _ = writeln!(out, "Assembly Statistics for {}", input.display());
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out, "Total contigs: {}", group_digits(stats.total_contigs as u64));
    let _ = writeln!(out, "Total bases: {}", group_digits(stats.total_bases));
    let _ = writeln!(out, "Longest contig: {} bp", group_digits(stats.longest));
    let _ = writeln!(out, "Shortest contig: {} bp", group_digits(stats.shortest));
    let _ = writeln!(out, "Mean contig length: {} bp", group_digits(stats.mean));
    let _ = writeln!(out, "Median contig length: {} bp", group_digits(stats.median));
    let _ = writeln!(out, "N50: {} bp", group_digits(stats.n50));
    let _ = writeln!(out);
    let _ = writeln!(out, "Length distribution:");
    for entry in &stats.length_distribution {
        let _ = writeln!(
            out,
            "  >= {} bp: {} contigs",
            group_digits(entry.min_length),
            group_digits(entry.contigs as u64)
        );
    }
    out
}

pub fn render_triage(result: &TriageResult) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "KINGDOM-LEVEL TRIAGE SUMMARY");
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(
        out,
        "{:<15} {:>10} {:>15} {:>12} {:>12}",
        "Kingdom", "Contigs", "Total BP", "Avg Length", "Max Length"
    );
    let _ = writeln!(out, "{light}");

    let populated = result.kingdoms.iter().filter(|report| report.contigs > 0);
    for report in populated.clone() {
        let avg = group_rounded(report.avg_length.unwrap_or_default());
        let max = report.max_length.unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<15} {:>10} {:>15} {:>12} {:>12}",
            report.kingdom.as_str(),
            group_digits(report.contigs),
            group_digits(report.total_bp),
            avg,
            group_digits(max)
        );
    }

    let _ = writeln!(out, "{light}");
    let _ = writeln!(
        out,
        "{:<15} {:>10} {:>15}",
        "TOTAL",
        group_digits(result.total_contigs),
        group_digits(result.total_bp)
    );
    let _ = writeln!(out, "{heavy}");

    let _ = writeln!(out);
    let _ = writeln!(out, "Output files saved in: {}/", result.output_dir);
    for report in populated {
        let _ = writeln!(
            out,
            "  {} ({} contigs)",
            report.kingdom.file_name(),
            group_digits(report.contigs)
        );
    }

    if let Some(viruses) = result.kingdom(Kingdom::Viruses).filter(|r| r.contigs > 0) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Viral contigs identified: {}",
            group_digits(viruses.contigs)
        );
        let _ = writeln!(
            out,
            "  Run with --keep-intermediates to see detailed classifications"
        );
    }

    if !result.classifier.skipped {
        let _ = writeln!(out);
        match &result.intermediates {
            Some(files) => {
                let _ = writeln!(out, "Kraken2 output: {}", files.output.display());
                let _ = writeln!(out, "Kraken2 report: {}", files.report.display());
            }
            None => {
                let _ = writeln!(
                    out,
                    "Intermediate files removed. Use --keep-intermediates to retain them."
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
    }

    #[test]
    fn rounded_averages_take_even_ties() {
        assert_eq!(group_rounded(12.5), "12");
        assert_eq!(group_rounded(13.5), "14");
        assert_eq!(group_rounded(1_234.4), "1,234");
    }

    #[test]
    fn empty_stats_report() {
        assert_eq!(
            render_stats(Path::new("empty.fa"), &StatsOutcome::Empty),
            "No contigs found!\n"
        );
    }
}

use serde::Serialize;

pub const LENGTH_THRESHOLDS: [u64; 5] = [500, 1_000, 5_000, 10_000, 50_000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdCount {
    pub min_length: u64,
    pub contigs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub total_contigs: usize,
    pub total_bases: u64,
    pub longest: u64,
    pub shortest: u64,
    pub mean: u64,
    pub median: u64,
    pub n50: u64,
    pub length_distribution: Vec<ThresholdCount>,
}

impl AssemblyStats {
    pub fn from_lengths(lengths: &[u64]) -> Option<Self> {
        if lengths.is_empty() {
            return None;
        }

        let mut ascending = lengths.to_vec();
        ascending.sort_unstable();

        let total_contigs = ascending.len();
        let total_bases: u64 = ascending.iter().sum();
        let shortest = ascending[0];
        let longest = ascending[total_contigs - 1];
        let mean = total_bases / total_contigs as u64;
        let median = ascending[(total_contigs - 1) / 2];

        let length_distribution = LENGTH_THRESHOLDS
            .iter()
            .map(|&min_length| ThresholdCount {
                min_length,
                contigs: ascending.len() - ascending.partition_point(|&len| len < min_length),
            })
            .collect();

        Some(Self {
            total_contigs,
            total_bases,
            longest,
            shortest,
            mean,
            median,
            n50: n50(lengths),
            length_distribution,
        })
    }
}

/// Length L such that contigs of length >= L hold at least half the bases.
///
/// Returns 0 for an empty slice.
pub fn n50(lengths: &[u64]) -> u64 {
    let mut descending = lengths.to_vec();
    descending.sort_unstable_by(|a, b| b.cmp(a));
    let half = descending.iter().sum::<u64>() as f64 / 2.0;

    let mut cumulative = 0u64;
    for length in descending {
        cumulative += length;
        if cumulative as f64 >= half {
            return length;
        }
    }
    0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsOutcome {
    Empty,
    Computed(AssemblyStats),
}

impl StatsOutcome {
    pub fn from_lengths(lengths: &[u64]) -> Self {
        match AssemblyStats::from_lengths(lengths) {
            Some(stats) => StatsOutcome::Computed(stats),
            None => StatsOutcome::Empty,
        }
    }
}

use serde::Serialize;

/// Descriptive statistics over the checklist occurrence counts, for the
/// human run summary. Missing counts are skipped.
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0.0 for a single value.
    pub std: f64,
    pub min: u64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: u64,
}

pub fn describe(values: impl IntoIterator<Item = u64>) -> Option<OccurrenceStats> {
    let mut sorted: Vec<u64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable();

    let count = sorted.len();
    let sum: u64 = sorted.iter().sum();
    let mean = sum as f64 / count as f64;

    let std = if count > 1 {
        let ss: f64 = sorted.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    Some(OccurrenceStats {
        count,
        mean,
        std,
        min: sorted[0],
        q25: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q75: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[u64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo] as f64
    } else {
        let frac = rank - lo as f64;
        sorted[lo] as f64 * (1.0 - frac) + sorted[hi] as f64 * frac
    }
}

//! Aggregate statistics over a soul's events

use serde::Serialize;

use super::reading::{Message, Pattern};
use super::soul::Soul;

/// Means and pattern frequencies for one soul
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoulStats {
    pub total_events: usize,
    pub avg_resonance: f64,
    pub avg_clarity: f64,
    pub avg_flux: f64,
    pub avg_emergence: f64,
    /// Pattern counts in first-encountered order
    pub pattern_counts: Vec<(Pattern, usize)>,
    /// Message counts in first-encountered order
    pub message_counts: Vec<(Message, usize)>,
    /// Most frequent pattern; ties go to the one seen first
    pub dominant_pattern: Pattern,
}

/// Bump `value`'s count, appending it on first sight
fn tally<T: PartialEq>(counts: &mut Vec<(T, usize)>, value: T) {
    match counts.iter_mut().find(|(v, _)| *v == value) {
        Some((_, count)) => *count += 1,
        None => counts.push((value, 1)),
    }
}

/// First entry holding the highest count
fn most_frequent<T: Copy>(counts: &[(T, usize)]) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for &(value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

impl SoulStats {
    /// Compute stats in one pass over the events; `None` when there are none
    pub fn compute(soul: &Soul) -> Option<Self> {
        let total = soul.events.len();
        if total == 0 {
            return None;
        }

        let mut sums = [0u64; 4];
        let mut pattern_counts: Vec<(Pattern, usize)> = Vec::new();
        let mut message_counts: Vec<(Message, usize)> = Vec::new();

        for event in &soul.events {
            for (sum, value) in sums.iter_mut().zip(event.reading.bounded_fields()) {
                *sum += u64::from(value);
            }
            tally(&mut pattern_counts, event.reading.pattern);
            tally(&mut message_counts, event.reading.message);
        }

        let dominant_pattern = most_frequent(&pattern_counts)?;
        let mean = |sum: u64| sum as f64 / total as f64;

        Some(Self {
            total_events: total,
            avg_resonance: mean(sums[0]),
            avg_clarity: mean(sums[1]),
            avg_flux: mean(sums[2]),
            avg_emergence: mean(sums[3]),
            pattern_counts,
            message_counts,
            dominant_pattern,
        })
    }
}

//! Reading and statistics display

use crate::models::{Event, SoulStats};

/// Format a consultation result
pub fn format_reading(soul_name: &str, event: &Event) -> String {
    let reading = &event.reading;
    let mut output = String::new();

    output.push_str(&format!(
        "{} #{}: \"{}\"\n\n",
        soul_name, event.sequence_number, event.input
    ));
    output.push_str(&format!("  Resonance:  {:>3}\n", reading.resonance));
    output.push_str(&format!("  Clarity:    {:>3}\n", reading.clarity));
    output.push_str(&format!("  Flux:       {:>3}\n", reading.flux));
    output.push_str(&format!("  Emergence:  {:>3}\n", reading.emergence));
    output.push('\n');
    output.push_str(&format!("  Pattern:    {}\n", reading.pattern));
    output.push_str(&format!("  Message:    {}\n", reading.message));

    if let Some(enhancement) = &reading.enhancement {
        output.push('\n');
        output.push_str(&format!(
            "  Harmony {:.2} / confidence {:.2} / {:?}\n",
            enhancement.harmony_index, enhancement.confidence, enhancement.trend
        ));
        output.push_str(&format!("  {}\n", enhancement.insight_text));
        for recommendation in &enhancement.recommendations {
            output.push_str(&format!("    - {}\n", recommendation));
        }
    }

    output
}

/// Format aggregate statistics for a soul
pub fn format_stats(soul_name: &str, stats: Option<&SoulStats>) -> String {
    let Some(stats) = stats else {
        return format!("{} has no consultations yet.\n", soul_name);
    };

    let mut output = String::new();
    output.push_str(&format!("Stats for {}\n", soul_name));
    output.push_str(&format!("  Total events:    {}\n", stats.total_events));
    output.push_str(&format!("  Avg resonance:   {:.1}\n", stats.avg_resonance));
    output.push_str(&format!("  Avg clarity:     {:.1}\n", stats.avg_clarity));
    output.push_str(&format!("  Avg flux:        {:.1}\n", stats.avg_flux));
    output.push_str(&format!("  Avg emergence:   {:.1}\n", stats.avg_emergence));
    output.push_str(&format!("  Dominant:        {}\n", stats.dominant_pattern));

    output.push_str("\n  Patterns:\n");
    for (pattern, count) in &stats.pattern_counts {
        output.push_str(&format!("    {:<10} {}\n", pattern.label(), count));
    }

    output.push_str("\n  Messages:\n");
    for (message, count) in &stats.message_counts {
        output.push_str(&format!("    {:>3}  {}\n", count, message.text()));
    }

    output
}

//! Relevance list truncation shared by template store implementations.

use crate::chem::template::TemplateId;

/// Sort `scored` by descending relevance and truncate it.
///
/// At most `max_count` entries are kept. Entries are accepted while the
/// running cumulative probability stays at or below `max_cum_prob`; the first
/// entry that would exceed it is dropped along with everything after it.
///
/// Ties keep the input order. NaN scores sort last.
#[must_use]
pub fn truncate_ranked(
    mut scored: Vec<(TemplateId, f64)>,
    max_count: usize,
    max_cum_prob: f64,
) -> Vec<(TemplateId, f64)> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.retain(|(_, s)| !s.is_nan());
    scored.truncate(max_count);

    let mut cumulative = 0.0;
    let mut keep = 0;
    for (_, score) in &scored {
        cumulative += score;
        if cumulative > max_cum_prob {
            break;
        }
        keep += 1;
    }
    scored.truncate(keep);
    scored
}

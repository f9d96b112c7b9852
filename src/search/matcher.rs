use serde::{Deserialize, Serialize};

use crate::search::catalog::{SearchableRecord, SourceType};
use crate::search::normalize::{normalize_for_search, query_tokens};

/// Number of results the search dialog shows.
pub const DEFAULT_RESULT_CAP: usize = 20;

/// How matches from several sources are combined under the result cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Scan sources in catalog order and stop at the cap. Later sources
    /// may be cut off entirely.
    #[default]
    SourceOrder,
    /// Give every source an equal share of the cap, hand unused slots back
    /// in source order, then emit in source order.
    PerSourceQuota,
}

/// Returns `true` when every query token occurs in the normalized text.
///
/// A query without tokens matches nothing.
pub fn matches_query(text: &str, query: &str) -> bool {
    let tokens = query_tokens(query);
    !tokens.is_empty() && tokens_match(&normalize_for_search(text), &tokens)
}

fn tokens_match(normalized: &str, tokens: &[String]) -> bool {
    tokens.iter().all(|token| normalized.contains(token.as_str()))
}

fn record_matches(record: &SearchableRecord, tokens: &[String]) -> bool {
    tokens_match(&normalize_for_search(&record.title), tokens)
        || tokens_match(&normalize_for_search(&record.description), tokens)
}

/// Filter `records` against `query`, keeping catalog order and stopping at `cap`.
pub fn search(records: &[SearchableRecord], query: &str, cap: usize) -> Vec<SearchableRecord> {
    search_with_policy(records, query, cap, AggregationPolicy::SourceOrder)
}

/// Filter `records` against `query` using the given aggregation policy.
pub fn search_with_policy(
    records: &[SearchableRecord],
    query: &str,
    cap: usize,
    policy: AggregationPolicy,
) -> Vec<SearchableRecord> {
    let tokens = query_tokens(query);
    if tokens.is_empty() || cap == 0 {
        return Vec::new();
    }

    let matching = records.iter().filter(|record| record_matches(record, &tokens));

    match policy {
        AggregationPolicy::SourceOrder => matching.take(cap).cloned().collect(),
        AggregationPolicy::PerSourceQuota => {
            let matched: Vec<&SearchableRecord> = matching.collect();
            apply_source_quota(&matched, cap)
        }
    }
}

fn apply_source_quota(matched: &[&SearchableRecord], cap: usize) -> Vec<SearchableRecord> {
    // Sources in order of first appearance.
    let mut sources: Vec<(SourceType, usize)> = Vec::new();
    for record in matched {
        match sources.iter_mut().find(|(source, _)| *source == record.source_type) {
            Some((_, count)) => *count += 1,
            None => sources.push((record.source_type, 1)),
        }
    }
    if sources.is_empty() {
        return Vec::new();
    }

    let share = cap / sources.len();
    let mut allowance: Vec<usize> = sources.iter().map(|(_, n)| (*n).min(share)).collect();
    let mut remaining = cap - allowance.iter().sum::<usize>();

    for (slot, (_, available)) in allowance.iter_mut().zip(&sources) {
        if remaining == 0 {
            break;
        }
        let extra = (available - *slot).min(remaining);
        *slot += extra;
        remaining -= extra;
    }

    let mut results = Vec::with_capacity(cap);
    for (index, (source, _)) in sources.iter().enumerate() {
        results.extend(
            matched
                .iter()
                .filter(|record| record.source_type == *source)
                .take(allowance[index])
                .map(|record| (*record).clone()),
        );
    }
    results
}

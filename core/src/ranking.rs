use crate::index::{DocHit, InvertedIndex};
use crate::tokenizer::tokenize;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Number of documents reported per query.
pub const MAX_RESULTS: usize = 5;

/// Best matches for one query, strongest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    pub query: String,
    /// `hit_count` here is the total over all query tokens.
    pub hits: Vec<DocHit>,
}

/// Top [`MAX_RESULTS`] documents for `query`.
pub fn lookup(index: &InvertedIndex, query: &str) -> RankedResult {
    lookup_top(index, query, MAX_RESULTS)
}

/// Top `k` documents for `query` by summed hit count; ties go to the
/// smaller docid. Documents that match no query token are never returned.
pub fn lookup_top(index: &InvertedIndex, query: &str, k: usize) -> RankedResult {
    let mut totals: HashMap<DocId, usize> = HashMap::new();
    for token in tokenize(query) {
        for hit in index.lookup(token) {
            *totals.entry(hit.docid).or_insert(0) += hit.hit_count;
        }
    }

    let mut candidates: Vec<DocHit> = totals
        .into_iter()
        .map(|(docid, hit_count)| DocHit { docid, hit_count })
        .collect();
    if k > 0 && candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, by_rank);
    }
    candidates.truncate(k);
    candidates.sort_unstable_by(by_rank);

    RankedResult { query: query.to_owned(), hits: candidates }
}

fn by_rank(a: &DocHit, b: &DocHit) -> Ordering {
    b.hit_count.cmp(&a.hit_count).then(a.docid.cmp(&b.docid))
}

use std::collections::BTreeSet;

use crate::index::WordIndex;
use crate::model::NodeId;
use crate::parse::query_terms;

/// Result of running a query string against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Blank query: the caller removes filtering entirely
    NoFilter,
    /// Nodes matching every term. Empty means nothing matches.
    Hits(BTreeSet<NodeId>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("the search index is not ready yet")]
    NotReady,
}

/// First index of a word starting with `target`.
///
/// Binary search for the lower bound of `target`; since the word list is
/// sorted, words sharing the prefix are contiguous from there.
pub fn find_prefix_start(words: &[String], target: &str) -> Option<usize> {
    if target.is_empty() {
        return None;
    }
    let start = words.partition_point(|w| w.as_str() < target);
    words
        .get(start)
        .filter(|w| w.starts_with(target))
        .map(|_| start)
}

/// Union of the nodes of every word starting with `target`
pub fn hits_for_prefix(index: &WordIndex, target: &str) -> BTreeSet<NodeId> {
    let mut hits = BTreeSet::new();
    let words = index.words();
    let Some(start) = find_prefix_start(words, target) else {
        return hits;
    };
    for word in words[start..].iter().take_while(|w| w.starts_with(target)) {
        if let Some(nodes) = index.nodes_for(word) {
            hits.extend(nodes.iter().copied());
        }
    }
    hits
}

/// Run a whitespace-separated, AND-combined prefix query.
pub fn query(index: &WordIndex, raw: &str) -> QueryOutcome {
    let terms = query_terms(raw);
    let Some((first, rest)) = terms.split_first() else {
        return QueryOutcome::NoFilter;
    };

    let mut hits = hits_for_prefix(index, first);
    for term in rest {
        if hits.is_empty() {
            break;
        }
        let term_hits = hits_for_prefix(index, term);
        hits.retain(|id| term_hits.contains(id));
    }
    QueryOutcome::Hits(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample_index() -> WordIndex {
        WordIndex::from_phrases([
            (NodeId(0), "Find Highlighting"),
            (NodeId(1), "Find In Files"),
            (NodeId(2), "Show Whitespace"),
            (NodeId(3), "Default Font Size"),
            (NodeId(4), "Fonts"),
        ])
    }

    fn ids(hits: QueryOutcome) -> Vec<u32> {
        match hits {
            QueryOutcome::Hits(set) => set.into_iter().map(|n| n.0).collect(),
            QueryOutcome::NoFilter => panic!("expected hits"),
        }
    }

    #[test]
    fn prefix_start_returns_first_match() {
        let list = words(&["apple", "find", "finder", "files", "zoo"]);
        let mut sorted = list.clone();
        sorted.sort();
        assert_eq!(find_prefix_start(&sorted, "fi"), Some(1));
        assert_eq!(sorted[1], "files");
        assert_eq!(find_prefix_start(&sorted, "find"), Some(2));
        assert_eq!(find_prefix_start(&sorted, "zoo"), Some(4));
    }

    #[test]
    fn prefix_start_none_without_prefix_match() {
        let list = words(&["apple", "cherry"]);
        assert_eq!(find_prefix_start(&list, "b"), None);
        assert_eq!(find_prefix_start(&list, "zebra"), None);
        assert_eq!(find_prefix_start(&list, ""), None);
        assert_eq!(find_prefix_start(&[], "a"), None);
    }

    #[test]
    fn prefix_start_agrees_with_linear_scan() {
        let index = sample_index();
        let list = index.words();
        for target in ["d", "de", "f", "fi", "fin", "font", "fonts", "x", "s", "size", "w"] {
            let expected = list.iter().position(|w| w.starts_with(target));
            assert_eq!(find_prefix_start(list, target), expected, "target {target}");
        }
    }

    #[test]
    fn find_prefix_covers_both_find_labels() {
        let index = WordIndex::from_phrases([
            (NodeId(0), "Find Highlighting"),
            (NodeId(1), "Find In Files"),
        ]);
        let start = find_prefix_start(index.words(), "find").unwrap();
        assert_eq!(index.words()[start], "find");
        assert_eq!(
            hits_for_prefix(&index, "find"),
            BTreeSet::from([NodeId(0), NodeId(1)])
        );
    }

    #[test]
    fn prefix_hits_union_words() {
        let index = sample_index();
        // "font" and "fonts"
        assert_eq!(
            hits_for_prefix(&index, "font"),
            BTreeSet::from([NodeId(3), NodeId(4)])
        );
        assert!(hits_for_prefix(&index, "zzz").is_empty());
    }

    #[test]
    fn blank_query_is_no_filter() {
        let index = sample_index();
        assert_eq!(query(&index, ""), QueryOutcome::NoFilter);
        assert_eq!(query(&index, "   \t "), QueryOutcome::NoFilter);
    }

    #[test]
    fn unmatched_first_term_filters_everything() {
        let index = sample_index();
        assert_eq!(query(&index, "qqq font"), QueryOutcome::Hits(BTreeSet::new()));
    }

    #[test]
    fn terms_are_intersected() {
        let index = sample_index();
        assert_eq!(ids(query(&index, "find")), vec![0, 1]);
        assert_eq!(ids(query(&index, "FIND fil")), vec![1]);
        assert_eq!(ids(query(&index, "find show")), Vec::<u32>::new());
    }

    #[test]
    fn intersection_law() {
        let index = sample_index();
        for (a, b) in [("find", "in"), ("f", "s"), ("font", "size"), ("show", "w")] {
            let both = ids(query(&index, &format!("{a} {b}")));
            let left = ids(query(&index, a));
            let right = ids(query(&index, b));
            let expected: Vec<u32> = left.into_iter().filter(|x| right.contains(x)).collect();
            assert_eq!(both, expected, "query '{a} {b}'");
        }
    }
}

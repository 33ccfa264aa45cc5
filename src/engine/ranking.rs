use log::debug;

use crate::model::{Category, TopicModelData};

#[derive(Clone, Debug, PartialEq)]
pub struct RankedTerm {
    /// Index of the source row in the relevance table.
    pub row: usize,
    pub term: String,
    pub relevance: f64,
    pub freq: f64,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    pub category: Category,
    pub lambda: f64,
    pub terms: Vec<RankedTerm>,
}

impl Ranking {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn term_list(&self) -> Vec<String> {
        self.terms.iter().map(|entry| entry.term.clone()).collect()
    }

    pub fn max_total(&self) -> Option<f64> {
        self.terms
            .iter()
            .map(|entry| entry.total)
            .filter(|total| total.is_finite())
            .reduce(f64::max)
    }
}

fn sort_key(relevance: f64) -> f64 {
    if relevance.is_nan() {
        f64::NEG_INFINITY
    } else {
        relevance
    }
}

/// Top-R terms of `category` ordered by `lambda * logprob + (1 - lambda) * loglift`.
///
/// The sort is stable, so equal scores keep their relevance-table order. An empty result is a
/// valid ranking: the chart simply renders no bars.
pub fn rank_terms(data: &TopicModelData, category: Category, lambda: f64) -> Ranking {
    let mut terms = data
        .rows_for(category)
        .map(|(row, entry)| RankedTerm {
            row,
            term: entry.term.clone(),
            relevance: entry.relevance(lambda),
            freq: entry.freq,
            total: entry.total,
        })
        .collect::<Vec<_>>();

    terms.sort_by(|a, b| sort_key(b.relevance).total_cmp(&sort_key(a.relevance)));
    terms.truncate(data.relevant_terms);

    if terms.is_empty() {
        debug!("empty ranking for {category} at lambda {lambda}");
    }

    Ranking {
        category,
        lambda,
        terms,
    }
}

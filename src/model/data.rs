use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Upper bound on the number of bars shown per chart, whatever the payload asks for.
pub const MAX_RELEVANT_TERMS: usize = 30;

const AGGREGATE_LABEL: &str = "Default";
const TOPIC_PREFIX: &str = "Topic";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Aggregate,
    Topic(usize),
}

impl Category {
    /// Maps a selected topic id to the rows that feed its bar chart; 0 means no topic.
    pub fn for_topic(topic: usize) -> Self {
        if topic == 0 {
            Self::Aggregate
        } else {
            Self::Topic(topic)
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if raw == AGGREGATE_LABEL {
            return Some(Self::Aggregate);
        }

        raw.strip_prefix(TOPIC_PREFIX)
            .and_then(|digits| digits.parse::<usize>().ok())
            .filter(|id| *id > 0)
            .map(Self::Topic)
    }

    pub fn topic(self) -> Option<usize> {
        match self {
            Self::Aggregate => None,
            Self::Topic(id) => Some(id),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate => f.write_str(AGGREGATE_LABEL),
            Self::Topic(id) => write!(f, "{TOPIC_PREFIX}{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Topic {
    pub id: usize,
    pub label: String,
    pub x: f64,
    pub y: f64,
    /// Marginal frequency as a percentage of all tokens.
    pub freq: f64,
    pub cluster: i64,
}

impl Topic {
    pub fn share(&self) -> f64 {
        self.freq / 100.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TermTopicMembership {
    pub term: String,
    pub topic: usize,
    pub freq: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TermRelevanceRow {
    pub term: String,
    pub category: Category,
    pub logprob: f64,
    pub loglift: f64,
    pub freq: f64,
    pub total: f64,
}

impl TermRelevanceRow {
    pub fn relevance(&self, lambda: f64) -> f64 {
        lambda * self.logprob + (1.0 - lambda) * self.loglift
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotLabels {
    pub x: String,
    pub y: String,
}

impl Default for PlotLabels {
    fn default() -> Self {
        Self {
            x: "PC1".to_owned(),
            y: "PC2".to_owned(),
        }
    }
}

/// Row-oriented view of a prepared topic model. Built once by the payload normalizer and never
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct TopicModelData {
    pub topics: Vec<Topic>,
    pub memberships: Vec<TermTopicMembership>,
    pub relevance_rows: Vec<TermRelevanceRow>,
    pub relevant_terms: usize,
    pub lambda_step: f64,
    pub labels: PlotLabels,
    pub topic_order: Vec<usize>,
    memberships_by_term: HashMap<String, Vec<usize>>,
}

impl TopicModelData {
    pub fn new(
        topics: Vec<Topic>,
        memberships: Vec<TermTopicMembership>,
        relevance_rows: Vec<TermRelevanceRow>,
        requested_terms: usize,
        lambda_step: f64,
        labels: PlotLabels,
        topic_order: Vec<usize>,
    ) -> Self {
        let mut memberships_by_term: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, membership) in memberships.iter().enumerate() {
            memberships_by_term
                .entry(membership.term.clone())
                .or_default()
                .push(index);
        }

        Self {
            topics,
            memberships,
            relevance_rows,
            relevant_terms: requested_terms.min(MAX_RELEVANT_TERMS),
            lambda_step,
            labels,
            topic_order,
            memberships_by_term,
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn topic(&self, id: usize) -> Option<&Topic> {
        id.checked_sub(1).and_then(|index| self.topics.get(index))
    }

    /// Topic id in the fitted model for display topic `id`, when the payload carries the order.
    pub fn source_topic(&self, id: usize) -> Option<usize> {
        id.checked_sub(1)
            .and_then(|index| self.topic_order.get(index))
            .copied()
    }

    pub fn rows_for(
        &self,
        category: Category,
    ) -> impl Iterator<Item = (usize, &TermRelevanceRow)> {
        self.relevance_rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.category == category)
    }

    /// Conditional frequency of every topic given `term`, indexed by topic id - 1. Topics without
    /// a membership row for the term get 0.
    pub fn conditional_frequencies(&self, term: &str) -> Vec<f64> {
        let mut frequencies = vec![0.0; self.topic_count()];
        let Some(rows) = self.memberships_by_term.get(term) else {
            return frequencies;
        };

        for &row in rows {
            let membership = &self.memberships[row];
            if let Some(slot) = membership
                .topic
                .checked_sub(1)
                .and_then(|index| frequencies.get_mut(index))
            {
                *slot = membership.freq;
            }
        }

        frequencies
    }

    /// Every term that can appear in a bar chart or in the token table, sorted and deduplicated.
    pub fn known_terms(&self) -> Vec<String> {
        self.relevance_rows
            .iter()
            .map(|row| row.term.as_str())
            .chain(self.memberships.iter().map(|row| row.term.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: usize, freq: f64) -> Topic {
        Topic {
            id,
            label: id.to_string(),
            x: 0.0,
            y: 0.0,
            freq,
            cluster: 1,
        }
    }

    fn membership(term: &str, topic: usize, freq: f64) -> TermTopicMembership {
        TermTopicMembership {
            term: term.to_owned(),
            topic,
            freq,
        }
    }

    #[test]
    fn category_parses_wire_labels() {
        assert_eq!(Category::parse("Default"), Some(Category::Aggregate));
        assert_eq!(Category::parse("Topic12"), Some(Category::Topic(12)));
        assert_eq!(Category::parse("Topic0"), None);
        assert_eq!(Category::parse("topic3"), None);
        assert_eq!(Category::Topic(4).to_string(), "Topic4");
        assert_eq!(Category::for_topic(0), Category::Aggregate);
    }

    #[test]
    fn conditional_frequencies_fill_missing_topics_with_zero() {
        let data = TopicModelData::new(
            vec![topic(1, 50.0), topic(2, 30.0), topic(3, 20.0)],
            vec![membership("apple", 1, 0.25), membership("apple", 3, 0.75)],
            Vec::new(),
            10,
            0.01,
            PlotLabels::default(),
            vec![1, 2, 3],
        );

        assert_eq!(data.conditional_frequencies("apple"), vec![0.25, 0.0, 0.75]);
        assert_eq!(data.conditional_frequencies("pear"), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn membership_with_unknown_topic_is_ignored() {
        let data = TopicModelData::new(
            vec![topic(1, 100.0)],
            vec![membership("apple", 7, 1.0)],
            Vec::new(),
            10,
            0.01,
            PlotLabels::default(),
            Vec::new(),
        );

        assert_eq!(data.conditional_frequencies("apple"), vec![0.0]);
    }

    #[test]
    fn relevant_terms_are_capped() {
        let data = TopicModelData::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            75,
            0.01,
            PlotLabels::default(),
            Vec::new(),
        );
        assert_eq!(data.relevant_terms, MAX_RELEVANT_TERMS);
    }
}

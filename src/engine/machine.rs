use std::sync::Arc;

use log::debug;

use crate::config::LayoutConfig;
use crate::model::{Category, TopicModelData};

use super::ranking::{Ranking, rank_terms};
use super::state::{LambdaHistory, SelectionState, clamp_lambda, clamp_topic};
use super::sync::{Projection, ReorderDirection, ViewCommand, ViewSynchronizer};

/// Owns the selection and everything derived from it. Every transition leaves the state
/// consistent and returns the draw commands that bring the views in line with it.
pub struct SelectionMachine {
    data: Arc<TopicModelData>,
    state: SelectionState,
    lambda: LambdaHistory,
    ranking: Ranking,
    ranking_revision: u64,
    term_pinned: bool,
    preview: Option<usize>,
    sync: ViewSynchronizer,
}

impl SelectionMachine {
    pub fn new(data: Arc<TopicModelData>, config: LayoutConfig) -> Self {
        let sync = ViewSynchronizer::new(&data, config);
        let state = SelectionState::default();
        let ranking = Ranking {
            category: Category::Aggregate,
            lambda: state.lambda,
            terms: Vec::new(),
        };

        Self {
            data,
            lambda: LambdaHistory::new(state.lambda),
            state,
            ranking,
            ranking_revision: 0,
            term_pinned: false,
            preview: None,
            sync,
        }
    }

    /// Default view: aggregate ranking and marginal circles.
    pub fn initialize(&mut self) -> Projection {
        self.restore(SelectionState::default())
    }

    /// Jumps straight to `state` without animating, as when loading a shared fragment.
    pub fn restore(&mut self, state: SelectionState) -> Projection {
        let topic_count = self.data.topic_count();
        self.state = SelectionState {
            topic: state.topic.min(topic_count),
            lambda: clamp_lambda(state.lambda),
            term: state.term,
        };
        self.lambda = LambdaHistory::new(self.state.lambda);
        self.preview = None;
        self.term_pinned = self.state.has_term();
        debug!("restoring selection {:?}", self.state);

        self.recompute_ranking();
        let mut projection = self.project_bars(false);
        projection.push(ViewCommand::EmphasizeTopic(self.selected_topic()));
        if self.state.has_term() {
            projection.extend(self.term_projection());
        } else {
            projection.push(ViewCommand::HighlightTerm(None));
            projection.push(ViewCommand::ResizeCircles(
                self.sync.marginal_circles(&self.data),
            ));
        }
        projection
    }

    /// Selects topic `id`, clamped to `[0, K]`; 0 returns to the aggregate view.
    pub fn select_topic(&mut self, id: i64) -> Projection {
        let mut projection = self.clear_term();
        let topic = clamp_topic(id, self.data.topic_count());
        debug!("select topic {topic} (requested {id})");

        self.state.topic = topic;
        self.preview = None;
        self.recompute_ranking();
        projection.extend(self.project_bars(true));
        projection.push(ViewCommand::EmphasizeTopic(self.selected_topic()));
        projection
    }

    pub fn adjust_lambda(&mut self, value: f64) -> Projection {
        let lambda = clamp_lambda(value);
        if lambda == self.state.lambda {
            return Projection::default();
        }
        debug!("lambda {} -> {lambda}", self.state.lambda);

        self.lambda.record(lambda);
        self.state.lambda = lambda;
        let previewing = self.preview.take().is_some();
        if !self.state.has_topic() {
            // Without a topic the bars only change when a preview is undone.
            if !previewing {
                return Projection::default();
            }
            let mut projection = self.project_bars(false);
            projection.push(ViewCommand::EmphasizeTopic(None));
            return projection;
        }

        self.recompute_ranking();
        let mut projection = self.project_bars(true);
        if previewing {
            projection.push(ViewCommand::EmphasizeTopic(self.selected_topic()));
        }
        projection
    }

    /// Activates `term` and keeps it after the pointer leaves.
    pub fn select_term(&mut self, term: &str) -> Projection {
        let projection = self.activate_term(term);
        self.term_pinned = self.state.has_term();
        projection
    }

    /// Activates `term` until [`release_hover`](Self::release_hover) or another selection.
    pub fn hover_term(&mut self, term: &str) -> Projection {
        let projection = self.activate_term(term);
        self.term_pinned = false;
        projection
    }

    /// Clears a hovered term. A clicked term stays active.
    pub fn release_hover(&mut self) -> Projection {
        if self.term_pinned {
            Projection::default()
        } else {
            self.clear_term()
        }
    }

    pub fn clear_term(&mut self) -> Projection {
        self.term_pinned = false;
        if !self.state.has_term() {
            return Projection::default();
        }
        debug!("clear term {}", self.state.term);

        self.state.term.clear();
        let mut projection = Projection::default();
        projection.push(ViewCommand::HighlightTerm(None));
        projection.push(ViewCommand::ResizeCircles(
            self.sync.marginal_circles(&self.data),
        ));
        projection
    }

    pub fn reset(&mut self) -> Projection {
        let mut projection = self.clear_term();
        projection.extend(self.select_topic(0));
        projection
    }

    pub fn next_topic(&mut self) -> Projection {
        let next = (self.state.topic + 1).min(self.data.topic_count());
        self.select_topic(next as i64)
    }

    pub fn previous_topic(&mut self) -> Projection {
        self.select_topic(self.state.topic.saturating_sub(1) as i64)
    }

    /// Typed topic entry. Clears the term; a positive number selects that topic (clamped to
    /// `[1, K]`) and anything else leaves the topic as it is.
    pub fn enter_topic(&mut self, text: &str) -> Projection {
        let mut projection = self.clear_term();
        let Ok(value) = text.trim().parse::<f64>() else {
            return projection;
        };
        if !value.is_finite() || value <= 0.0 {
            return projection;
        }

        let topic = (value.round() as i64).clamp(1, self.data.topic_count().max(1) as i64);
        projection.extend(self.select_topic(topic));
        projection
    }

    /// Shows topic `id` in both panels without touching the selection.
    pub fn preview_topic(&mut self, id: usize) -> Projection {
        if id == 0 || id > self.data.topic_count() {
            return Projection::default();
        }
        if self.preview == Some(id) || (self.preview.is_none() && id == self.state.topic) {
            return Projection::default();
        }

        self.preview = Some(id);
        let ranking = rank_terms(&self.data, Category::Topic(id), self.state.lambda);
        let update = self.sync.project_ranking(
            &self.data,
            &ranking,
            ReorderDirection::Decreasing,
            false,
        );

        let mut projection = Projection::default();
        projection.push(ViewCommand::UpdateBars(update));
        projection.push(ViewCommand::EmphasizeTopic(Some(id)));
        projection
    }

    /// Returns both panels to the selected topic after a preview.
    pub fn end_preview(&mut self) -> Projection {
        if self.preview.take().is_none() {
            return Projection::default();
        }

        let mut projection = self.project_bars(false);
        projection.push(ViewCommand::EmphasizeTopic(self.selected_topic()));
        projection
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn data(&self) -> &TopicModelData {
        &self.data
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    /// Incremented on every recomputation of the selected ranking.
    #[cfg(test)]
    pub fn ranking_revision(&self) -> u64 {
        self.ranking_revision
    }

    pub fn displayed_topic(&self) -> usize {
        self.preview.unwrap_or(self.state.topic)
    }

    #[cfg(test)]
    pub fn term_pinned(&self) -> bool {
        self.term_pinned
    }

    pub fn synchronizer(&self) -> &ViewSynchronizer {
        &self.sync
    }

    fn selected_topic(&self) -> Option<usize> {
        self.state.has_topic().then_some(self.state.topic)
    }

    fn activate_term(&mut self, term: &str) -> Projection {
        if term.is_empty() {
            return self.clear_term();
        }
        debug!("activate term {term}");

        self.state.term = term.to_owned();
        self.term_projection()
    }

    fn term_projection(&self) -> Projection {
        let mut projection = Projection::default();
        projection.push(ViewCommand::HighlightTerm(Some(self.state.term.clone())));
        projection.push(ViewCommand::ResizeCircles(
            self.sync.conditioned_circles(&self.data, &self.state.term),
        ));
        projection
    }

    fn recompute_ranking(&mut self) {
        let category = Category::for_topic(self.state.topic);
        self.ranking = rank_terms(&self.data, category, self.state.lambda);
        self.ranking_revision += 1;
        debug!(
            "ranking #{} for {category} at lambda {}: {} terms",
            self.ranking_revision,
            self.state.lambda,
            self.ranking.terms.len()
        );
    }

    fn project_bars(&mut self, animate: bool) -> Projection {
        let update = self.sync.project_ranking(
            &self.data,
            &self.ranking,
            self.lambda.direction(),
            animate,
        );
        let mut projection = Projection::default();
        projection.push(ViewCommand::UpdateBars(update));
        projection
    }
}

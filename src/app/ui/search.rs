use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::{SearchMatchCache, ViewModel};

const MAX_SEARCH_ROWS: usize = 200;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Terms matching `query`, best score first, ties in alphabetical order.
fn rank_matches(terms: &[String], query: &str) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored = terms
        .iter()
        .filter_map(|term| fuzzy_match_score(&matcher, term, query).map(|score| (score, term)))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SEARCH_ROWS)
        .map(|(_, term)| term.clone())
        .collect()
}

impl ViewModel {
    fn cached_term_matches(&mut self) -> Option<Arc<Vec<String>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(rank_matches(&self.known_terms, query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_term_search(&mut self, ui: &mut Ui) {
        ui.heading("Terms");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Find term")
            .on_hover_text("Fuzzy search over every term in the model.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Click a match to highlight its topic distribution.");

        let active_term = self.machine.state().term.clone();
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if active_term.is_empty() {
                ui.label("No term selected.");
            } else {
                ui.label(RichText::new(format!("Selected: {active_term}")).strong());
            }
        });
        if ui
            .add_enabled(!active_term.is_empty(), egui::Button::new("Clear term"))
            .clicked()
        {
            let projection = self.machine.clear_term();
            self.dispatch(projection);
        }

        ui.separator();

        let Some(matches) = self.cached_term_matches() else {
            ui.label(format!("{} terms in the model.", self.known_terms.len()));
            return;
        };
        if matches.is_empty() {
            ui.label("No matching terms.");
            return;
        }

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("term_search_results")
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, matches.len(), |ui, row_range| {
                for index in row_range {
                    let Some(term) = matches.get(index) else {
                        continue;
                    };
                    let is_selected = *term == active_term;
                    if ui.selectable_label(is_selected, term.as_str()).clicked() {
                        picked = Some(term.clone());
                    }
                }
            });

        if let Some(term) = picked {
            let projection = self.machine.select_term(&term);
            self.dispatch(projection);
        }
    }
}

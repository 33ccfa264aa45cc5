use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::model::TopicModelData;
use crate::util::format_percent;

use super::ranking::Ranking;
use super::scales::{AreaRadiusScale, BarScales, PositionScale};

/// Vertical spacing between bars parked below the chart after they leave it.
const EXIT_STACK_SPACING: f64 = 18.0;
const EXIT_STACK_GAP: f64 = 6.0;

const GUIDE_SHARES: [(f64, &str); 3] = [(0.02, "2%"), (0.05, "5%"), (0.10, "10%")];

pub const MARGINAL_GUIDE_TITLE: &str = "Marginal topic distribution";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationPhase {
    Resize,
    Move,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderDirection {
    Increasing,
    Decreasing,
}

impl ReorderDirection {
    pub fn from_lambda_change(previous: f64, current: f64) -> Self {
        if previous < current {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }

    /// Increasing lambda resizes bars first and then moves them; decreasing does the reverse.
    pub fn phases(self) -> [AnimationPhase; 2] {
        match self {
            Self::Increasing => [AnimationPhase::Resize, AnimationPhase::Move],
            Self::Decreasing => [AnimationPhase::Move, AnimationPhase::Resize],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarLayer {
    /// Overall term frequency, drawn first.
    Totals,
    /// Frequency within the selected topic, drawn on top.
    Overlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarChange {
    Entering,
    Persisting,
    Exiting,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarTarget {
    pub term: String,
    pub change: BarChange,
    /// Start row for entering bars. Other bars continue from wherever they currently are.
    pub enter_from: Option<f64>,
    pub y: f64,
    pub height: f64,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarLayerUpdate {
    pub layer: BarLayer,
    pub bars: Vec<BarTarget>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartView {
    Aggregate,
    Topic(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub x: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarChartUpdate {
    pub view: ChartView,
    pub title: String,
    pub direction: ReorderDirection,
    pub animate: bool,
    /// Back to front.
    pub layers: Vec<BarLayerUpdate>,
    pub ticks: Vec<AxisTick>,
}

impl BarChartUpdate {
    pub fn layer(&self, layer: BarLayer) -> Option<&BarLayerUpdate> {
        self.layers.iter().find(|update| update.layer == layer)
    }

    /// Terms that remain on the chart after this update, in rank order.
    pub fn visible_terms(&self) -> Vec<&str> {
        self.layer(BarLayer::Totals)
            .map(|update| {
                update
                    .bars
                    .iter()
                    .filter(|bar| bar.change != BarChange::Exiting)
                    .map(|bar| bar.term.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CircleUpdate {
    /// One radius per topic, indexed by `topic id - 1`.
    pub radii: Vec<f64>,
    pub label_sizes: Vec<f32>,
    pub guide_title: String,
    pub term: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewCommand {
    EmphasizeTopic(Option<usize>),
    HighlightTerm(Option<String>),
    ResizeCircles(CircleUpdate),
    UpdateBars(BarChartUpdate),
}

/// Draw commands produced by one state transition, in the order they should be applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    pub commands: Vec<ViewCommand>,
}

impl Projection {
    pub fn push(&mut self, command: ViewCommand) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, other: Projection) {
        self.commands.extend(other.commands);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn bar_update(&self) -> Option<&BarChartUpdate> {
        self.commands.iter().rev().find_map(|command| match command {
            ViewCommand::UpdateBars(update) => Some(update),
            _ => None,
        })
    }

    pub fn circle_update(&self) -> Option<&CircleUpdate> {
        self.commands.iter().rev().find_map(|command| match command {
            ViewCommand::ResizeCircles(update) => Some(update),
            _ => None,
        })
    }
}

pub trait RenderSurface {
    fn apply(&mut self, projection: &Projection);
}

#[derive(Clone, Debug, PartialEq)]
pub struct CirclePlacement {
    pub topic: usize,
    pub label: String,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuideCircle {
    pub label: &'static str,
    pub share: f64,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
struct ShownBar {
    term: String,
    total: f64,
    freq: f64,
}

/// Turns rankings and term selections into draw commands, remembering which bars are on the
/// chart so the next update can be diffed against them.
#[derive(Clone, Debug)]
pub struct ViewSynchronizer {
    config: LayoutConfig,
    positions: PositionScale,
    marginal: AreaRadiusScale,
    conditional: AreaRadiusScale,
    shown: Vec<ShownBar>,
}

impl ViewSynchronizer {
    pub fn new(data: &TopicModelData, config: LayoutConfig) -> Self {
        let positions =
            PositionScale::from_topics(&data.topics, config.mds_width, config.mds_height);
        let marginal = AreaRadiusScale {
            plot_area: config.mds_area(),
            proportion: config.circle_proportion,
        };
        let conditional = AreaRadiusScale {
            plot_area: config.mds_area(),
            proportion: config.term_proportion,
        };

        Self {
            config,
            positions,
            marginal,
            conditional,
            shown: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn shown_terms(&self) -> Vec<&str> {
        self.shown.iter().map(|bar| bar.term.as_str()).collect()
    }

    pub fn scatter_layout(&self, data: &TopicModelData) -> Vec<CirclePlacement> {
        data.topics
            .iter()
            .map(|topic| {
                let (cx, cy) = self.positions.apply(topic.x, topic.y);
                CirclePlacement {
                    topic: topic.id,
                    label: topic.label.clone(),
                    cx,
                    cy,
                    radius: self.marginal.radius(topic.share()),
                }
            })
            .collect()
    }

    pub fn guide_circles(&self) -> [GuideCircle; 3] {
        GUIDE_SHARES.map(|(share, label)| GuideCircle {
            label,
            share,
            radius: self.marginal.radius(share),
        })
    }

    pub fn marginal_circles(&self, data: &TopicModelData) -> CircleUpdate {
        CircleUpdate {
            radii: data
                .topics
                .iter()
                .map(|topic| self.marginal.radius(topic.share()))
                .collect(),
            label_sizes: vec![self.config.label_font_size; data.topic_count()],
            guide_title: MARGINAL_GUIDE_TITLE.to_owned(),
            term: None,
        }
    }

    /// Circles sized by each topic's share of `term`. Topics without a membership row get
    /// radius 0.
    pub fn conditioned_circles(&self, data: &TopicModelData, term: &str) -> CircleUpdate {
        let frequencies = data.conditional_frequencies(term);
        CircleUpdate {
            radii: frequencies
                .iter()
                .map(|&freq| self.conditional.radius(freq))
                .collect(),
            label_sizes: frequencies
                .iter()
                .map(|&freq| self.label_size(freq))
                .collect(),
            guide_title: format!("Conditional topic distribution given term = '{term}'"),
            term: Some(term.to_owned()),
        }
    }

    // Labels keep one size whatever the term frequency.
    fn label_size(&self, _freq: f64) -> f32 {
        self.config.label_font_size
    }

    pub fn title(data: &TopicModelData, view: ChartView) -> String {
        let count = data.relevant_terms;
        match view {
            ChartView::Aggregate => format!("Top-{count} Most Salient Terms"),
            ChartView::Topic(id) => {
                let share = data.topic(id).map(|topic| topic.freq).unwrap_or(0.0);
                format!(
                    "Top-{count} Most Relevant Terms for Topic {id} ({}% of tokens)",
                    format_percent(share)
                )
            }
        }
    }

    /// Diffs `ranking` against the bars currently shown and records it as the new layout.
    pub fn project_ranking(
        &mut self,
        data: &TopicModelData,
        ranking: &Ranking,
        direction: ReorderDirection,
        animate: bool,
    ) -> BarChartUpdate {
        let view = match ranking.category.topic() {
            Some(id) => ChartView::Topic(id),
            None => ChartView::Aggregate,
        };
        let scales = BarScales::for_ranking(ranking, &self.config);
        let band = scales.rows.band_width();
        let offscreen = self.config.offscreen_offset();

        let previous = self
            .shown
            .iter()
            .map(|bar| bar.term.as_str())
            .collect::<HashSet<_>>();
        let next = ranking
            .terms
            .iter()
            .map(|entry| entry.term.as_str())
            .collect::<HashSet<_>>();

        let layer_bars = |value: fn(f64, f64) -> f64| {
            let mut bars = ranking
                .terms
                .iter()
                .map(|entry| {
                    let y = scales.rows.position(&entry.term).unwrap_or(0.0);
                    let entering = !previous.contains(entry.term.as_str());
                    BarTarget {
                        term: entry.term.clone(),
                        change: if entering {
                            BarChange::Entering
                        } else {
                            BarChange::Persisting
                        },
                        enter_from: entering.then_some(y + offscreen),
                        y,
                        height: band,
                        width: scales.width(value(entry.total, entry.freq)),
                    }
                })
                .collect::<Vec<_>>();

            let exiting = self
                .shown
                .iter()
                .filter(|bar| !next.contains(bar.term.as_str()))
                .enumerate()
                .map(|(slot, bar)| BarTarget {
                    term: bar.term.clone(),
                    change: BarChange::Exiting,
                    enter_from: None,
                    y: offscreen + EXIT_STACK_GAP + slot as f64 * EXIT_STACK_SPACING,
                    height: band,
                    width: scales.width(value(bar.total, bar.freq)),
                });
            bars.extend(exiting);
            bars
        };

        let mut layers = vec![BarLayerUpdate {
            layer: BarLayer::Totals,
            bars: layer_bars(|total, _| total),
        }];
        if view != ChartView::Aggregate {
            layers.push(BarLayerUpdate {
                layer: BarLayer::Overlay,
                bars: layer_bars(|_, freq| freq),
            });
        }

        let ticks = scales
            .ticks
            .iter()
            .map(|&value| AxisTick {
                value,
                x: scales.length.apply(value),
            })
            .collect();

        self.shown = ranking
            .terms
            .iter()
            .map(|entry| ShownBar {
                term: entry.term.clone(),
                total: entry.total,
                freq: entry.freq,
            })
            .collect();

        BarChartUpdate {
            view,
            title: Self::title(data, view),
            direction,
            animate,
            layers,
            ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ranking::rank_terms;
    use crate::model::Category;
    use crate::model::fixtures::sample_model;

    fn synchronizer() -> (TopicModelData, ViewSynchronizer) {
        let data = sample_model();
        let sync = ViewSynchronizer::new(&data, LayoutConfig::default());
        (data, sync)
    }

    fn changes(update: &BarChartUpdate, layer: BarLayer) -> Vec<(&str, BarChange)> {
        update
            .layer(layer)
            .map(|layer| {
                layer
                    .bars
                    .iter()
                    .map(|bar| (bar.term.as_str(), bar.change))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn direction_orders_phases() {
        assert_eq!(
            ReorderDirection::from_lambda_change(0.3, 0.6),
            ReorderDirection::Increasing
        );
        assert_eq!(
            ReorderDirection::from_lambda_change(0.6, 0.3),
            ReorderDirection::Decreasing
        );
        assert_eq!(
            ReorderDirection::Increasing.phases(),
            [AnimationPhase::Resize, AnimationPhase::Move]
        );
        assert_eq!(
            ReorderDirection::Decreasing.phases(),
            [AnimationPhase::Move, AnimationPhase::Resize]
        );
    }

    #[test]
    fn first_projection_enters_every_bar_from_below() {
        let (data, mut sync) = synchronizer();
        let ranking = rank_terms(&data, Category::Aggregate, 1.0);
        let update = sync.project_ranking(&data, &ranking, ReorderDirection::Decreasing, false);

        assert_eq!(update.view, ChartView::Aggregate);
        assert_eq!(update.title, "Top-5 Most Salient Terms");
        assert_eq!(update.layers.len(), 1);

        let offscreen = LayoutConfig::default().offscreen_offset();
        let totals = update.layer(BarLayer::Totals).expect("totals layer");
        for bar in &totals.bars {
            assert_eq!(bar.change, BarChange::Entering);
            assert_eq!(bar.enter_from, Some(bar.y + offscreen));
        }
        assert_eq!(sync.shown_terms(), ["loan", "bank", "river", "apple", "water"]);
    }

    #[test]
    fn reorder_diffs_by_term() {
        let (data, mut sync) = synchronizer();
        let first = rank_terms(&data, Category::Topic(2), 1.0);
        sync.project_ranking(&data, &first, ReorderDirection::Decreasing, true);

        let second = rank_terms(&data, Category::Topic(2), 0.0);
        let update = sync.project_ranking(&data, &second, ReorderDirection::Decreasing, true);

        assert_eq!(
            changes(&update, BarLayer::Totals),
            [
                ("shore", BarChange::Entering),
                ("boat", BarChange::Persisting),
                ("water", BarChange::Persisting),
                ("fish", BarChange::Entering),
                ("bank", BarChange::Persisting),
                ("loan", BarChange::Exiting),
                ("river", BarChange::Exiting),
            ]
        );
        assert_eq!(update.visible_terms(), ["shore", "boat", "water", "fish", "bank"]);
        assert_eq!(
            changes(&update, BarLayer::Totals),
            changes(&update, BarLayer::Overlay)
        );
    }

    #[test]
    fn exiting_bars_stack_below_the_chart() {
        let (data, mut sync) = synchronizer();
        let first = rank_terms(&data, Category::Topic(2), 1.0);
        sync.project_ranking(&data, &first, ReorderDirection::Decreasing, true);
        let update = sync.project_ranking(
            &data,
            &rank_terms(&data, Category::Topic(3), 1.0),
            ReorderDirection::Decreasing,
            true,
        );

        let offscreen = LayoutConfig::default().offscreen_offset();
        let totals = update.layer(BarLayer::Totals).expect("totals layer");
        assert_eq!(totals.bars.len(), 5);
        assert_eq!(totals.bars[0].y, offscreen + 6.0);
        assert_eq!(totals.bars[1].y, offscreen + 24.0);
        assert!(update.visible_terms().is_empty());
        assert!(sync.shown_terms().is_empty());
    }

    #[test]
    fn overlay_is_drawn_after_totals() {
        let (data, mut sync) = synchronizer();
        let ranking = rank_terms(&data, Category::Topic(2), 1.0);
        let update = sync.project_ranking(&data, &ranking, ReorderDirection::Increasing, true);

        let order = update.layers.iter().map(|layer| layer.layer).collect::<Vec<_>>();
        assert_eq!(order, [BarLayer::Totals, BarLayer::Overlay]);
        assert_eq!(
            update.title,
            "Top-5 Most Relevant Terms for Topic 2 (30% of tokens)"
        );

        let totals = update.layer(BarLayer::Totals).expect("totals layer");
        let overlay = update.layer(BarLayer::Overlay).expect("overlay layer");
        for (total, topic) in totals.bars.iter().zip(&overlay.bars) {
            assert!(topic.width <= total.width);
        }
    }

    #[test]
    fn ticks_follow_length_scale() {
        let (data, mut sync) = synchronizer();
        let ranking = rank_terms(&data, Category::Topic(2), 1.0);
        let update = sync.project_ranking(&data, &ranking, ReorderDirection::Increasing, false);

        let values = update.ticks.iter().map(|tick| tick.value).collect::<Vec<_>>();
        assert_eq!(values, [0.0, 50.0, 100.0, 150.0, 200.0]);
        assert_eq!(update.ticks.last().map(|tick| tick.x), Some(530.0));
    }

    #[test]
    fn conditioned_circles_use_term_share() {
        let (data, sync) = synchronizer();
        let update = sync.conditioned_circles(&data, "bank");

        assert_eq!(update.radii.len(), 3);
        assert!(update.radii[1] > update.radii[0]);
        assert_eq!(update.radii[2], 0.0);
        assert_eq!(update.label_sizes, [11.0; 3]);
        assert_eq!(
            update.guide_title,
            "Conditional topic distribution given term = 'bank'"
        );
    }

    #[test]
    fn unknown_term_collapses_every_circle() {
        let (data, sync) = synchronizer();
        let update = sync.conditioned_circles(&data, "zeppelin");
        assert!(update.radii.iter().all(|&radius| radius == 0.0));
    }

    #[test]
    fn marginal_circles_match_scatter_layout() {
        let (data, sync) = synchronizer();
        let update = sync.marginal_circles(&data);
        let layout = sync.scatter_layout(&data);

        assert_eq!(update.guide_title, MARGINAL_GUIDE_TITLE);
        assert_eq!(
            update.radii,
            layout.iter().map(|circle| circle.radius).collect::<Vec<_>>()
        );
        assert!(layout[0].radius > layout[1].radius);

        let guides = sync.guide_circles();
        assert!(guides[0].radius < guides[1].radius && guides[1].radius < guides[2].radius);
    }
}

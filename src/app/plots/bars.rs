use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Stroke};

use crate::engine::{BarLayer, ChartView};

use super::super::render_utils::{
    LayoutTransform, MUTED_TEXT_COLOR, TEXT_COLOR, TOPIC_COLOR, TOTALS_COLOR, with_opacity,
};
use super::super::{CanvasEvent, ViewModel};
use super::{TITLE_FONT_SIZE, panel_title_origin};

const TOTALS_OPACITY: f32 = 0.4;
const OVERLAY_OPACITY: f32 = 0.8;
const HIGHLIGHTED_TERM_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

const FOOTNOTES: [&str; 2] = [
    "1. saliency(term w) = frequency(w) * [sum_t p(t | w) * log(p(t | w)/p(t))] for topics t",
    "2. relevance(term w | topic t) = \u{3bb} * p(w | t) + (1 - \u{3bb}) * p(w | t)/p(w)",
];

impl ViewModel {
    /// Draws the ranked term bars with their axis and legend. Returns the hovered term.
    pub(in crate::app) fn draw_bars(
        &mut self,
        painter: &Painter,
        transform: LayoutTransform,
        pointer: Option<Pos2>,
        clicked: bool,
        events: &mut Vec<CanvasEvent>,
    ) -> Option<String> {
        let layout = &self.layout;
        let left = layout.margin.left + layout.mds_width + layout.term_width;
        let top = 2.0 * layout.margin.top;
        let now = self.canvas.now();
        let label_font = FontId::proportional(transform.font_size(layout.label_font_size));

        let (title_x, title_y) = panel_title_origin(layout, left);
        painter.text(
            transform.point(title_x, title_y),
            Align2::LEFT_BOTTOM,
            &self.canvas.title,
            FontId::proportional(transform.font_size(TITLE_FONT_SIZE)),
            TEXT_COLOR,
        );

        let grid_stroke = Stroke::new(1.0, with_opacity(MUTED_TEXT_COLOR, 0.25));
        for tick in &self.canvas.ticks {
            let x = left + tick.x;
            painter.line_segment(
                [
                    transform.point(x, top),
                    transform.point(x, top + layout.bar_height),
                ],
                grid_stroke,
            );
            painter.text(
                transform.point(x, top - 4.0),
                Align2::CENTER_BOTTOM,
                format!("{}", tick.value),
                label_font.clone(),
                MUTED_TEXT_COLOR,
            );
        }

        let mut hovered = None;
        for sprite in self.canvas.layer_sprites(BarLayer::Totals) {
            let y = top + sprite.y.value(now);
            let width = sprite.width.value(now);
            painter.rect_filled(
                transform.rect(left, y, width, sprite.height),
                0.0,
                with_opacity(TOTALS_COLOR, TOTALS_OPACITY),
            );

            let highlighted =
                self.canvas.highlighted_term.as_deref() == Some(sprite.term.as_str());
            painter.text(
                transform.point(left - 5.0, y + sprite.height / 2.0),
                Align2::RIGHT_CENTER,
                &sprite.term,
                label_font.clone(),
                if highlighted {
                    HIGHLIGHTED_TERM_COLOR
                } else {
                    TEXT_COLOR
                },
            );

            let row = transform.rect(
                left - layout.term_width,
                y,
                layout.term_width + width,
                sprite.height,
            );
            if !sprite.exiting && pointer.is_some_and(|pointer| row.contains(pointer)) {
                hovered = Some(sprite.term.clone());
            }
        }

        for sprite in self.canvas.layer_sprites(BarLayer::Overlay) {
            painter.rect_filled(
                transform.rect(
                    left,
                    top + sprite.y.value(now),
                    sprite.width.value(now),
                    sprite.height,
                ),
                0.0,
                with_opacity(TOPIC_COLOR, OVERLAY_OPACITY),
            );
        }

        let legend_top = top + layout.bar_height + 18.0;
        let mut entries = vec![(TOTALS_COLOR, TOTALS_OPACITY, "Overall term frequency")];
        if self.canvas.view != ChartView::Aggregate {
            entries.push((
                TOPIC_COLOR,
                OVERLAY_OPACITY,
                "Estimated term frequency within the selected topic",
            ));
        }
        for (row, (color, opacity, text)) in entries.into_iter().enumerate() {
            let y = legend_top + row as f64 * 18.0;
            painter.rect_filled(
                transform.rect(left, y, 14.0, 10.0),
                0.0,
                with_opacity(color, opacity),
            );
            painter.text(
                transform.point(left + 20.0, y + 5.0),
                Align2::LEFT_CENTER,
                text,
                label_font.clone(),
                TEXT_COLOR,
            );
        }
        for (row, note) in FOOTNOTES.iter().enumerate() {
            painter.text(
                transform.point(left, legend_top + 44.0 + row as f64 * 14.0),
                Align2::LEFT_TOP,
                *note,
                FontId::proportional(transform.font_size(layout.label_font_size - 2.0)),
                MUTED_TEXT_COLOR,
            );
        }

        Self::track_hover(
            &mut self.hovered_term,
            hovered.clone(),
            CanvasEvent::HoverTerm,
            CanvasEvent::ReleaseTerm,
            events,
        );
        if clicked && let Some(term) = &hovered {
            events.push(CanvasEvent::SelectTerm(term.clone()));
        }

        hovered
    }
}

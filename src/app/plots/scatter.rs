use eframe::egui::{Align2, FontId, Painter, Pos2, Stroke, vec2};

use super::super::render_utils::{
    LayoutTransform, MUTED_TEXT_COLOR, TEXT_COLOR, TOPIC_COLOR, TOTALS_COLOR, dashed_line,
    hovered_circle, with_opacity,
};
use super::super::{CanvasEvent, ViewModel};
use super::{TITLE_FONT_SIZE, panel_title_origin};

const GUIDE_FONT_SIZE: f32 = 10.0;
const MAP_TITLE: &str = "Intertopic Distance Map (via multidimensional scaling)";

impl ViewModel {
    /// Draws the topic map and its size guide. Returns the hovered topic id.
    pub(in crate::app) fn draw_scatter(
        &mut self,
        painter: &Painter,
        transform: LayoutTransform,
        pointer: Option<Pos2>,
        clicked: bool,
        events: &mut Vec<CanvasEvent>,
    ) -> Option<usize> {
        let left = self.layout.margin.left;
        let top = 2.0 * self.layout.margin.top;
        let width = self.layout.mds_width;
        let height = self.layout.mds_height;
        let panel = transform.rect(left, top, width, height);

        let (title_x, title_y) = panel_title_origin(&self.layout, left);
        painter.text(
            transform.point(title_x, title_y),
            Align2::LEFT_BOTTOM,
            MAP_TITLE,
            FontId::proportional(transform.font_size(TITLE_FONT_SIZE)),
            TEXT_COLOR,
        );

        let axis_stroke = Stroke::new(1.0, with_opacity(MUTED_TEXT_COLOR, 0.6));
        dashed_line(
            painter,
            transform.point(left, top + height / 2.0),
            transform.point(left + width, top + height / 2.0),
            axis_stroke,
            4.0,
        );
        dashed_line(
            painter,
            transform.point(left + width / 2.0, top),
            transform.point(left + width / 2.0, top + height),
            axis_stroke,
            4.0,
        );

        let axis_font = FontId::proportional(transform.font_size(self.layout.label_font_size));
        let labels = &self.machine.data().labels;
        painter.text(
            transform.point(left + width, top + height / 2.0 + 4.0),
            Align2::RIGHT_TOP,
            &labels.x,
            axis_font.clone(),
            MUTED_TEXT_COLOR,
        );
        painter.text(
            transform.point(left + width / 2.0 + 4.0, top),
            Align2::LEFT_TOP,
            &labels.y,
            axis_font,
            MUTED_TEXT_COLOR,
        );

        let centers = self
            .scatter
            .iter()
            .map(|circle| transform.point(left + circle.cx, top + circle.cy))
            .collect::<Vec<_>>();
        let radii = (0..self.scatter.len())
            .map(|index| transform.length(self.canvas.radius(index)))
            .collect::<Vec<_>>();

        let emphasized = self.canvas.emphasized;
        let mut draw_order = (0..self.scatter.len()).collect::<Vec<_>>();
        draw_order.sort_by_key(|&index| emphasized == Some(self.scatter[index].topic));

        for index in draw_order {
            let circle = &self.scatter[index];
            let (fill, opacity) = if emphasized == Some(circle.topic) {
                (TOPIC_COLOR, self.layout.highlight_opacity)
            } else {
                (TOTALS_COLOR, self.layout.base_opacity)
            };

            painter.circle_filled(centers[index], radii[index], with_opacity(fill, opacity));
            painter.circle_stroke(
                centers[index],
                radii[index],
                Stroke::new(1.0, with_opacity(TEXT_COLOR, 0.35)),
            );

            let label_size = self
                .canvas
                .label_sizes
                .get(index)
                .copied()
                .unwrap_or(self.layout.label_font_size);
            if label_size > 0.0 {
                painter.text(
                    centers[index],
                    Align2::CENTER_CENTER,
                    &circle.label,
                    FontId::proportional(transform.font_size(label_size)),
                    TEXT_COLOR,
                );
            }
        }

        self.draw_size_guide(painter, transform, left, top + height);

        let hovered = hovered_circle(pointer, &centers, &radii)
            .and_then(|(index, _)| self.scatter.get(index))
            .map(|circle| circle.topic);

        Self::track_hover(
            &mut self.hovered_topic,
            hovered,
            CanvasEvent::PreviewTopic,
            CanvasEvent::EndPreview,
            events,
        );

        if clicked && pointer.is_some_and(|pointer| panel.contains(pointer)) {
            events.push(match hovered {
                Some(topic) => CanvasEvent::SelectTopic(topic),
                None => CanvasEvent::Reset,
            });
        }

        hovered
    }

    /// Reference circles for 2%, 5% and 10% of tokens, stacked on a common baseline.
    fn draw_size_guide(&self, painter: &Painter, transform: LayoutTransform, left: f64, top: f64) {
        let largest = self
            .guides
            .iter()
            .map(|guide| guide.radius)
            .fold(0.0, f64::max);
        let center_x = left + 10.0 + largest;
        let baseline = top + 10.0 + 2.0 * largest;
        let label_x = center_x + 1.5 * largest + 10.0;
        let stroke = Stroke::new(1.0, with_opacity(MUTED_TEXT_COLOR, 0.8));
        let font = FontId::proportional(transform.font_size(GUIDE_FONT_SIZE));

        for guide in &self.guides {
            let center = transform.point(center_x, baseline - guide.radius);
            painter.circle_stroke(center, transform.length(guide.radius), stroke);

            let crown = baseline - 2.0 * guide.radius;
            dashed_line(
                painter,
                transform.point(center_x, crown),
                transform.point(label_x, crown),
                stroke,
                2.0,
            );
            painter.text(
                transform.point(label_x, crown) + vec2(4.0, 0.0),
                Align2::LEFT_CENTER,
                guide.label,
                font.clone(),
                MUTED_TEXT_COLOR,
            );
        }

        painter.text(
            transform.point(left + 10.0, baseline + 6.0),
            Align2::LEFT_TOP,
            &self.canvas.guide_title,
            font,
            TEXT_COLOR,
        );
    }
}

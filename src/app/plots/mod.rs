use eframe::egui::{self, Align2, FontId, Sense, Ui, vec2};

use crate::config::LayoutConfig;
use crate::model::{Topic, TopicModelData};
use crate::util::format_percent;

use super::render_utils::{LayoutTransform, TEXT_COLOR, draw_background};
use super::{CanvasEvent, ViewModel};

mod bars;
mod scatter;

const TITLE_FONT_SIZE: f32 = 13.0;
const TITLE_RISE: f64 = 18.0;

/// Baseline-left corner of the heading above a panel whose left edge is `left`.
fn panel_title_origin(layout: &LayoutConfig, left: f64) -> (f64, f64) {
    (left, 2.0 * layout.margin.top - TITLE_RISE)
}

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let now = ui.ctx().input(|input| input.time);
        self.canvas.set_time(now);

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        let layout_size = vec2(
            self.layout.total_width() as f32,
            self.layout.total_height() as f32,
        );
        let transform = LayoutTransform::fit(rect, layout_size);
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));
        let clicked = response.clicked_by(egui::PointerButton::Primary);

        let mut events = Vec::new();
        let hovered_topic = self.draw_scatter(&painter, transform, pointer, clicked, &mut events);
        let hovered_term = self.draw_bars(&painter, transform, pointer, clicked, &mut events);

        if hovered_topic.is_some() || hovered_term.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if let Some(topic) = hovered_topic.and_then(|id| self.machine.data().topic(id)) {
            painter.text(
                rect.left_bottom() + vec2(10.0, -10.0),
                Align2::LEFT_BOTTOM,
                topic_summary(self.machine.data(), topic),
                FontId::proportional(13.0),
                TEXT_COLOR,
            );
        }

        for event in events {
            self.handle_canvas_event(event);
        }

        if self.canvas.is_animating() {
            ui.ctx().request_repaint();
        }
    }

    /// Turns a change of the hovered item into enter/leave events.
    fn track_hover<T: Clone + PartialEq>(
        previous: &mut Option<T>,
        current: Option<T>,
        enter: impl FnOnce(T) -> CanvasEvent,
        leave: CanvasEvent,
        events: &mut Vec<CanvasEvent>,
    ) {
        if *previous == current {
            return;
        }
        events.push(match current.clone() {
            Some(item) => enter(item),
            None => leave,
        });
        *previous = current;
    }
}

fn topic_summary(data: &TopicModelData, topic: &Topic) -> String {
    let source = data
        .source_topic(topic.id)
        .map(|source| format!(" (model topic {source})"))
        .unwrap_or_default();
    format!(
        "Topic {}{source}  |  cluster {}  |  {}% of tokens",
        topic.label,
        topic.cluster,
        format_percent(topic.freq)
    )
}

use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

pub(super) const TOTALS_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
pub(super) const TOPIC_COLOR: Color32 = Color32::from_rgb(214, 39, 40);
pub(super) const TEXT_COLOR: Color32 = Color32::from_gray(225);
pub(super) const MUTED_TEXT_COLOR: Color32 = Color32::from_gray(150);

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
}

pub(super) fn dashed_line(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke, dash: f32) {
    let length = start.distance(end);
    if length <= f32::EPSILON || dash <= 0.0 {
        return;
    }

    let direction = (end - start) / length;
    let mut offset = 0.0;
    while offset < length {
        let stop = (offset + dash).min(length);
        painter.line_segment([start + direction * offset, start + direction * stop], stroke);
        offset += dash * 2.0;
    }
}

/// Uniform scale from layout coordinates into the central panel, centred in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LayoutTransform {
    origin: Pos2,
    scale: f32,
}

impl LayoutTransform {
    pub(super) fn fit(rect: Rect, layout_size: Vec2) -> Self {
        let scale = (rect.width() / layout_size.x)
            .min(rect.height() / layout_size.y)
            .max(0.05);
        let used = layout_size * scale;
        let origin = rect.min + (rect.size() - used) * 0.5;
        Self { origin, scale }
    }

    pub(super) fn point(&self, x: f64, y: f64) -> Pos2 {
        self.origin + vec2(x as f32, y as f32) * self.scale
    }

    pub(super) fn length(&self, value: f64) -> f32 {
        value as f32 * self.scale
    }

    pub(super) fn rect(&self, x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect::from_min_size(
            self.point(x, y),
            vec2(self.length(width), self.length(height)),
        )
    }

    pub(super) fn font_size(&self, layout_size: f32) -> f32 {
        (layout_size * self.scale).max(6.0)
    }
}

/// Index and distance of the circle nearest to `pointer` that contains it.
pub(super) fn hovered_circle(
    pointer: Option<Pos2>,
    centers: &[Pos2],
    radii: &[f32],
) -> Option<(usize, f32)> {
    pointer.and_then(|pointer| {
        centers
            .iter()
            .zip(radii)
            .enumerate()
            .filter_map(|(index, (center, radius))| {
                let distance = center.distance(pointer);
                if distance <= *radius {
                    Some((index, distance))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    })
}

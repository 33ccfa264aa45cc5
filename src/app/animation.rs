use crate::config::LayoutConfig;
use crate::engine::{
    AnimationPhase, AxisTick, BarChange, BarChartUpdate, BarLayer, ChartView, CircleUpdate,
    Projection, RenderSurface, ViewCommand,
};

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// One animated scalar. Retargeting starts from the currently interpolated value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Tween {
    from: f64,
    to: f64,
    start: f64,
    duration: f64,
}

impl Tween {
    pub(super) fn fixed(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
        }
    }

    pub(super) fn value(&self, now: f64) -> f64 {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = (now - self.start) / self.duration;
        self.from + (self.to - self.from) * ease_cubic_in_out(t)
    }

    pub(super) fn retarget(&mut self, now: f64, to: f64, delay: f64, duration: f64) {
        self.from = self.value(now);
        self.to = to;
        self.start = now + delay;
        self.duration = duration;
    }

    pub(super) fn finished(&self, now: f64) -> bool {
        self.duration <= 0.0 || now >= self.start + self.duration
    }
}

#[derive(Clone, Debug)]
pub(super) struct BarSprite {
    pub(super) term: String,
    pub(super) layer: BarLayer,
    pub(super) y: Tween,
    pub(super) width: Tween,
    pub(super) height: f64,
    pub(super) exiting: bool,
}

/// Animated state of both panels. Applying a projection retargets sprites toward the new layout
/// from wherever they currently are; there is no queue.
pub(super) struct Canvas {
    now: f64,
    bar_duration: f64,
    circle_duration: f64,
    pub(super) bars: Vec<BarSprite>,
    pub(super) radii: Vec<Tween>,
    pub(super) label_sizes: Vec<f32>,
    pub(super) emphasized: Option<usize>,
    pub(super) highlighted_term: Option<String>,
    pub(super) view: ChartView,
    pub(super) title: String,
    pub(super) guide_title: String,
    pub(super) ticks: Vec<AxisTick>,
}

impl Canvas {
    pub(super) fn new(config: &LayoutConfig, topic_count: usize) -> Self {
        Self {
            now: 0.0,
            bar_duration: config.transition_secs(),
            circle_duration: config.circle_transition_secs(),
            bars: Vec::new(),
            radii: vec![Tween::fixed(0.0); topic_count],
            label_sizes: vec![config.label_font_size; topic_count],
            emphasized: None,
            highlighted_term: None,
            view: ChartView::Aggregate,
            title: String::new(),
            guide_title: String::new(),
            ticks: Vec::new(),
        }
    }

    pub(super) fn set_time(&mut self, now: f64) {
        self.now = now;
        self.bars
            .retain(|sprite| !(sprite.exiting && sprite.y.finished(now)));
    }

    pub(super) fn now(&self) -> f64 {
        self.now
    }

    pub(super) fn is_animating(&self) -> bool {
        let now = self.now;
        self.bars
            .iter()
            .any(|sprite| !sprite.y.finished(now) || !sprite.width.finished(now))
            || self.radii.iter().any(|radius| !radius.finished(now))
    }

    pub(super) fn radius(&self, index: usize) -> f64 {
        self.radii
            .get(index)
            .map(|radius| radius.value(self.now))
            .unwrap_or(0.0)
    }

    /// Sprites of `layer` in draw order.
    pub(super) fn layer_sprites(&self, layer: BarLayer) -> impl Iterator<Item = &BarSprite> {
        self.bars.iter().filter(move |sprite| sprite.layer == layer)
    }

    fn update_bars(&mut self, update: &BarChartUpdate) {
        let now = self.now;
        let duration = if update.animate { self.bar_duration } else { 0.0 };
        let [first, _] = update.direction.phases();
        let (move_delay, resize_delay) = match first {
            AnimationPhase::Move => (0.0, duration),
            AnimationPhase::Resize => (duration, 0.0),
        };

        let mut next = Vec::with_capacity(self.bars.len());
        for layer in &update.layers {
            for target in &layer.bars {
                let existing = self
                    .bars
                    .iter()
                    .position(|sprite| sprite.layer == layer.layer && sprite.term == target.term)
                    .map(|index| self.bars.swap_remove(index));

                let sprite = match existing {
                    Some(mut sprite) => {
                        sprite.y.retarget(now, target.y, move_delay, duration);
                        sprite.width.retarget(now, target.width, resize_delay, duration);
                        sprite.height = target.height;
                        sprite.exiting = target.change == BarChange::Exiting;
                        sprite
                    }
                    None if target.change == BarChange::Exiting || !update.animate => {
                        if target.change == BarChange::Exiting {
                            continue;
                        }
                        BarSprite {
                            term: target.term.clone(),
                            layer: layer.layer,
                            y: Tween::fixed(target.y),
                            width: Tween::fixed(target.width),
                            height: target.height,
                            exiting: false,
                        }
                    }
                    None => {
                        let (start_y, start_width) = match target.enter_from {
                            Some(start_y) => (start_y, target.width),
                            None => (target.y, 0.0),
                        };
                        let mut y = Tween::fixed(start_y);
                        y.retarget(now, target.y, move_delay, duration);
                        let mut width = Tween::fixed(start_width);
                        width.retarget(now, target.width, resize_delay, duration);
                        BarSprite {
                            term: target.term.clone(),
                            layer: layer.layer,
                            y,
                            width,
                            height: target.height,
                            exiting: false,
                        }
                    }
                };

                if sprite.exiting && !update.animate {
                    continue;
                }
                next.push(sprite);
            }
        }

        // Sprites the update no longer mentions, such as the overlay layer of a topic view
        // replaced by the aggregate view, are dropped here.
        self.bars = next;
        self.view = update.view;
        self.title = update.title.clone();
        self.ticks = update.ticks.clone();
    }

    fn resize_circles(&mut self, update: &CircleUpdate) {
        let now = self.now;
        self.radii.resize(update.radii.len(), Tween::fixed(0.0));
        for (tween, &radius) in self.radii.iter_mut().zip(&update.radii) {
            tween.retarget(now, radius, 0.0, self.circle_duration);
        }
        self.label_sizes = update.label_sizes.clone();
        self.guide_title = update.guide_title.clone();
    }
}

impl RenderSurface for Canvas {
    fn apply(&mut self, projection: &Projection) {
        for command in &projection.commands {
            match command {
                ViewCommand::UpdateBars(update) => self.update_bars(update),
                ViewCommand::ResizeCircles(update) => self.resize_circles(update),
                ViewCommand::EmphasizeTopic(topic) => self.emphasized = *topic,
                ViewCommand::HighlightTerm(term) => self.highlighted_term = term.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::SelectionMachine;
    use crate::model::fixtures::sample_model;

    fn setup() -> (SelectionMachine, Canvas) {
        let config = LayoutConfig::default();
        let mut machine = SelectionMachine::new(Arc::new(sample_model()), config.clone());
        let mut canvas = Canvas::new(&config, 3);
        canvas.apply(&machine.initialize());
        (machine, canvas)
    }

    #[test]
    fn tween_eases_between_endpoints() {
        let mut tween = Tween::fixed(0.0);
        tween.retarget(1.0, 10.0, 0.5, 1.0);

        assert_eq!(tween.value(1.2), 0.0);
        assert_eq!(tween.value(2.0), 5.0);
        assert_eq!(tween.value(3.0), 10.0);
        assert!(!tween.finished(2.0));
        assert!(tween.finished(2.5));
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut tween = Tween::fixed(0.0);
        tween.retarget(0.0, 10.0, 0.0, 1.0);
        tween.retarget(0.5, 0.0, 0.0, 1.0);
        assert_eq!(tween.value(0.5), 5.0);
        assert_eq!(tween.value(1.5), 0.0);
    }

    #[test]
    fn initial_projection_places_bars_without_animation() {
        let (_, mut canvas) = setup();
        assert_eq!(canvas.bars.len(), 5);
        assert!(canvas.bars.iter().all(|sprite| sprite.y.finished(0.0)));

        // circles grow in from zero
        assert!(canvas.is_animating());
        canvas.set_time(1.0);
        assert!(!canvas.is_animating());
        assert_eq!(canvas.title, "Top-5 Most Salient Terms");
    }

    #[test]
    fn exiting_bars_are_removed_after_their_transition() {
        let (mut machine, mut canvas) = setup();
        canvas.set_time(10.0);
        canvas.apply(&machine.select_topic(2));
        assert!(canvas.is_animating());
        assert!(canvas.bars.iter().any(|sprite| sprite.exiting));

        canvas.set_time(20.0);
        assert!(canvas.bars.iter().all(|sprite| !sprite.exiting));
        assert_eq!(canvas.layer_sprites(BarLayer::Totals).count(), 5);
        assert_eq!(canvas.layer_sprites(BarLayer::Overlay).count(), 5);
    }

    #[test]
    fn aggregate_view_drops_overlay() {
        let (mut machine, mut canvas) = setup();
        canvas.apply(&machine.select_topic(2));
        canvas.set_time(5.0);
        canvas.apply(&machine.reset());
        assert_eq!(canvas.layer_sprites(BarLayer::Overlay).count(), 0);
        assert_eq!(canvas.view, ChartView::Aggregate);
    }

    #[test]
    fn term_highlight_resizes_circles() {
        let (mut machine, mut canvas) = setup();
        canvas.set_time(1.0);
        canvas.apply(&machine.select_term("water"));
        canvas.set_time(5.0);

        assert_eq!(canvas.highlighted_term.as_deref(), Some("water"));
        assert_eq!(canvas.radius(0), 0.0);
        assert!(canvas.radius(1) > 0.0);
        assert_eq!(canvas.radius(2), 0.0);
    }
}

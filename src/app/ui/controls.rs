use eframe::egui::{self, Key, Response, RichText, Ui};

use crate::util::format_lambda;

use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f64 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f64 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f64 = 40.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f64,
    negative_secs: f64,
}

fn slider_key_accel_multiplier(hold_secs: f64) -> f64 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

/// Moves a focused slider with held arrow keys, faster the longer a key is held.
fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f64,
    min: f64,
    max: f64,
    step: f64,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        hold_state = SliderKeyHoldState::default();
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, hold_state));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            f64::from(input.stable_dt.min(0.1)),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    if increase_down {
        hold_state.positive_secs += delta_time;
    } else {
        hold_state.positive_secs = 0.0;
    }

    if decrease_down {
        hold_state.negative_secs += delta_time;
    } else {
        hold_state.negative_secs = 0.0;
    }

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, hold_state));
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    let delta = f64::from(direction) * step * speed * delta_time;

    let old_value = *value;
    *value = (*value + delta).clamp(min, max);
    let changed = (*value - old_value).abs() > f64::EPSILON;

    ui.ctx().request_repaint();
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));
    changed
}

impl ViewModel {
    pub(in crate::app) fn draw_topic_controls(&mut self, ui: &mut Ui) {
        let topic_count = self.machine.data().topic_count();

        ui.label("Selected topic:");
        let topic_edit = ui.add(
            egui::TextEdit::singleline(&mut self.topic_input)
                .desired_width(36.0)
                .hint_text("0"),
        );
        if topic_edit.changed() {
            let text = self.topic_input.clone();
            let projection = self.machine.enter_topic(&text);
            self.dispatch(projection);
        } else if !topic_edit.has_focus() {
            self.topic_input = self.machine.state().topic.to_string();
        }
        topic_edit.on_hover_text(format!("Type a topic number between 1 and {topic_count}."));

        if ui.button("Previous Topic").clicked() {
            let projection = self.machine.previous_topic();
            self.dispatch(projection);
        }
        if ui.button("Next Topic").clicked() {
            let projection = self.machine.next_topic();
            self.dispatch(projection);
        }
        if ui
            .button("Clear Topic")
            .on_hover_text("Return to the overall term ranking.")
            .clicked()
        {
            let projection = self.machine.reset();
            self.dispatch(projection);
        }
    }

    pub(in crate::app) fn draw_lambda_slider(&mut self, ui: &mut Ui) {
        let step = self.machine.data().lambda_step;
        let slider = ui
            .add(
                egui::Slider::new(&mut self.lambda_input, 0.0..=1.0)
                    .step_by(step)
                    .text("\u{3bb}")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text(
                "Slide to adjust the relevance metric: 1 ranks by probability within the topic, \
                 0 by lift.",
            );
        if slider.hovered() {
            slider.request_focus();
        }

        let mut commit = slider.drag_stopped() || (slider.changed() && !slider.dragged());
        commit |= apply_slider_arrow_acceleration(
            ui,
            &slider,
            &mut self.lambda_input,
            0.0,
            1.0,
            step,
        );

        if commit {
            let projection = self.machine.adjust_lambda(self.lambda_input);
            self.dispatch(projection);
        }
    }

    pub(in crate::app) fn draw_share_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new(format!("#{}", self.fragment)).monospace())
            .on_hover_text("Fragment describing the current view.");
        if ui.button("Copy").clicked() {
            ui.ctx().copy_text(format!("#{}", self.fragment));
        }
        if ui
            .button("Bookmark")
            .on_hover_text("Keep this view in the session history.")
            .clicked()
        {
            self.bookmark();
        }

        let can_go_back = self.history.can_go_back();
        if ui.add_enabled(can_go_back, egui::Button::new("Back")).clicked() {
            self.go_back();
        }
        let can_go_forward = self.history.can_go_forward();
        if ui
            .add_enabled(can_go_forward, egui::Button::new("Forward"))
            .clicked()
        {
            self.go_forward();
        }
    }

    pub(in crate::app) fn selection_summary(&self) -> String {
        let state = self.machine.state();
        let topic = match state.topic {
            0 => "all topics".to_owned(),
            topic => format!("topic {topic}"),
        };
        let term = if state.has_term() {
            format!(", term '{}'", state.term)
        } else {
            String::new()
        };
        format!("{topic}, \u{3bb} = {}{term}", format_lambda(state.lambda))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceleration_ramps_up_and_caps() {
        assert_eq!(slider_key_accel_multiplier(0.0), 1.0);
        assert!(slider_key_accel_multiplier(0.5) > slider_key_accel_multiplier(0.1));
        assert_eq!(slider_key_accel_multiplier(60.0), SLIDER_KEY_ACCEL_MAX);
    }
}

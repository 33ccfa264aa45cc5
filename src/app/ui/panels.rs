use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        payload_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("topic-atlas");
                    ui.separator();
                    ui.label(format!("payload: {payload_path}"));
                    ui.label(format!("topics: {}", self.machine.data().topic_count()));
                    ui.label(format!("terms: {}", self.known_terms.len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload payload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.selection_summary());
                    });
                });
                ui.horizontal_wrapped(|ui| {
                    self.draw_topic_controls(ui);
                    ui.separator();
                    self.draw_lambda_slider(ui);
                });
                ui.horizontal_wrapped(|ui| self.draw_share_controls(ui));
            });

        egui::SidePanel::left("terms")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| self.draw_term_search(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading topic model...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_canvas(ui);
            }
        });
    }
}

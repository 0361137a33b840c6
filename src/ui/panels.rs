use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection controls
// ---------------------------------------------------------------------------

/// Render the site selector, payload range sliders and a short summary.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // ---- Site selector ----
    ui.strong("Launch Site");
    let current = state.selection.site.clone();
    let options = state.site_options();
    let mut picked = None;
    egui::ComboBox::from_id_salt("site_dropdown")
        .selected_text(current.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in &options {
                if ui
                    .selectable_label(*option == current, option.label())
                    .clicked()
                {
                    picked = Some(option.clone());
                }
            }
        });
    if let Some(site) = picked {
        state.set_site(site);
    }

    ui.add_space(8.0);

    // ---- Payload range ----
    ui.strong("Payload range (kg)");
    let bounds = state.slider;
    let mut range = state.selection.payload;
    let lower = ui.add(
        egui::Slider::new(&mut range.lower, bounds.min..=bounds.max)
            .step_by(bounds.step)
            .text("min"),
    );
    let upper = ui.add(
        egui::Slider::new(&mut range.upper, bounds.min..=bounds.max)
            .step_by(bounds.step)
            .text("max"),
    );
    if lower.changed() || upper.changed() {
        state.set_payload_range(range);
    }
    if ui.small_button("Reset range").clicked() {
        state.reset_payload_range();
    }
    if state.selection.payload.is_inverted() {
        ui.label(RichText::new("Lower bound is above upper bound").color(Color32::YELLOW));
    }

    ui.separator();
    summary(ui, state);
}

fn summary(ui: &mut Ui, state: &AppState) {
    ui.strong("Summary");
    ui.label(format!("{} launches loaded", state.dataset.len()));
    if state.scatter.is_empty() {
        ui.label(RichText::new("No launches in payload range").italics());
    } else {
        ui.label(format!("{} in payload range", state.scatter.len()));
    }
    match state.pie.counts.success_rate() {
        Some(rate) => ui.label(format!(
            "Success rate: {:.1}%  ({} of {})",
            rate * 100.0,
            state.pie.counts.success,
            state.pie.total()
        )),
        None => ui.label(RichText::new("No launches for this site").italics()),
    };
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the dashboard title.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(
            RichText::new("SpaceX Launch Records Dashboard")
                .size(28.0)
                .color(Color32::from_rgb(0x50, 0x3D, 0x36)),
        );
    });
    if state.dataset.is_empty() {
        ui.label(RichText::new("The dataset contains no launches.").color(Color32::RED));
    }
}

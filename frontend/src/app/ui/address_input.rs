use egui::{Order, RichText, Vec2};
use routing::{AddressAutocomplete, AutocompleteState, ScreenRect};

pub fn screen_rect(rect: egui::Rect) -> ScreenRect {
    ScreenRect {
        min_x: rect.min.x,
        min_y: rect.min.y,
        max_x: rect.max.x,
        max_y: rect.max.y,
    }
}

/// A labelled single line input for an address with a suggestion list below it.
///
/// `value` is owned by the caller and only written when the user edits the text or picks a
/// suggestion. Pointer-downs dispatched last frame are handled first, so a press on a suggestion
/// row is already guarded when the global dismiss logic sees it.
pub fn address_input(
    ui: &mut egui::Ui,
    label: &str,
    placeholder: &str,
    value: &mut String,
    autocomplete: &mut AddressAutocomplete,
) {
    autocomplete.handle_pointer_events();

    ui.label(RichText::new(label).strong());

    let mut text = value.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut text)
            .hint_text(placeholder)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        *value = text;
    }

    autocomplete.set_input_rect(screen_rect(response.rect));
    autocomplete.update(value);

    if autocomplete.state() == AutocompleteState::Idle || !ui.is_enabled() {
        return;
    }

    let mut pressed = None;
    let mut selected = None;

    egui::Area::new(response.id.with("suggestions"))
        .order(Order::Foreground)
        .fixed_pos(response.rect.left_bottom() + Vec2::new(0.0, 4.0))
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(response.rect.width());
                let primary_pressed = ui.input(|i| i.pointer.primary_pressed());

                for (index, suggestion) in autocomplete.suggestions().iter().enumerate() {
                    let row = ui.add(egui::SelectableLabel::new(false, suggestion.as_str()));
                    if primary_pressed && row.hovered() {
                        pressed = Some(index);
                    }
                    if row.clicked() {
                        selected = Some(index);
                    }
                }
            });
        });

    if let Some(index) = pressed {
        autocomplete.press_suggestion(index);
    }
    if let Some(index) = selected {
        if let Some(suggestion) = autocomplete.select_suggestion(index) {
            *value = suggestion;
        }
    }
}

use std::rc::Rc;
use std::time::Duration;

use eframe::glow;
use routing::{
    AddressAutocomplete, Config, Dispatcher, GooglePlaces, HttpPathService, MapView,
    PageController, PointerDown, SuggestionService,
};

mod ui;

use self::ui::{address_input::address_input, map_panel::map_panel, tile_cache::TileCache};

const SOURCE_URL: &str = "https://github.com/jggreen3/algorithms-project-dijkstra";

/// How often to look for settled requests while any are in flight
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct App {
    page: PageController,
    start_input: AddressAutocomplete,
    end_input: AddressAutocomplete,
    /// Global pointer-down listeners of the address inputs
    pointer: Dispatcher<PointerDown>,
    map: MapView,
    tiles: TileCache,
}

impl App {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let suggestions = config.google_api_key.as_ref().map(|key| {
            Rc::new(GooglePlaces::new(config.places_url.clone(), key.clone()))
                as Rc<dyn SuggestionService>
        });

        let pointer = Dispatcher::new();
        App {
            page: PageController::new(Rc::new(HttpPathService::new(config.api_url.clone()))),
            start_input: AddressAutocomplete::mount(suggestions.clone(), &pointer),
            end_input: AddressAutocomplete::mount(suggestions, &pointer),
            pointer,
            map: MapView::new(config.map_options()),
            tiles: TileCache::new(),
        }
    }

    fn is_waiting(&self) -> bool {
        self.page.is_loading()
            || self.start_input.has_pending()
            || self.end_input.has_pending()
            || self.tiles.has_pending()
    }

    fn address_entry(&mut self, ui: &mut egui::Ui) {
        address_input(
            ui,
            "Start Address",
            "Enter start address",
            &mut self.page.start_address,
            &mut self.start_input,
        );
        ui.add_space(8.0);
        address_input(
            ui,
            "End Address",
            "Enter end address",
            &mut self.page.end_address,
            &mut self.end_input,
        );
        ui.add_space(16.0);

        let loading = self.page.is_loading();
        let label = if loading { "Loading..." } else { "Find Path" };
        let button = egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 28.0));
        if ui.add_enabled(!loading, button).clicked() {
            self.page.find_path();
        }
        if loading {
            ui.spinner();
        }

        if !self.page.directions().is_empty() {
            ui.add_space(16.0);
            for direction in self.page.directions() {
                ui.label(direction.as_str());
            }
        }
    }

    /// Blocks the rest of the page until acknowledged
    fn alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.page.alert() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                ui.vertical_centered(|ui| {
                    dismissed = ui.button("OK").clicked();
                });
            });
        if dismissed {
            self.page.dismiss_alert();
        }
    }
}

impl eframe::App for App {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.page.poll();
        self.tiles.begin_frame(ctx);
        let blocked = self.page.alert().is_some();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.set_enabled(!blocked);
            egui::menu::bar(ui, |ui| {
                // NOTE: no File->Quit on web pages!
                let is_web = cfg!(target_arch = "wasm32");
                if !is_web {
                    ui.menu_button("File", |ui| {
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.add_space(16.0);
                }

                egui::widgets::global_dark_light_mode_buttons(ui);
            });

            ui.vertical_centered(|ui| {
                ui.heading("SF Shortest Path Finder");
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    ui.label(
                        "This app uses Dijkstra's algorithm to find the shortest path between \
                         two addresses. Input two addresses in San Francisco to find the \
                         shortest route between them! The source code can be found on GitHub ",
                    );
                    ui.hyperlink_to("here", SOURCE_URL);
                    ui.label(".");
                });
            });
            ui.add_space(4.0);
        });

        egui::SidePanel::left("side_panel")
            .min_width(280.0)
            .show(ctx, |ui| {
                ui.set_enabled(!blocked);
                ui.add_space(8.0);
                self.address_entry(ui);

                ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                    powered_by_egui_and_eframe(ui);
                    egui::warn_if_debug_build(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_enabled(!blocked);
            map_panel(
                ui,
                &mut self.map,
                &mut self.tiles,
                self.page.path(),
                self.page.path_revision(),
            );
        });

        self.alert(ctx);

        // the global listener of the address inputs sees every press, after the widgets did
        let pressed = ctx.input(|i| {
            if i.pointer.any_pressed() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        if let Some(pos) = pressed {
            self.pointer.dispatch(PointerDown { x: pos.x, y: pos.y });
            ctx.request_repaint();
        }

        if self.is_waiting() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }

    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        self.map.unmount();
        self.tiles.clear();
    }
}

fn powered_by_egui_and_eframe(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.label("Powered by ");
        ui.hyperlink_to("egui", "https://github.com/emilk/egui");
        ui.label(" and ");
        ui.hyperlink_to(
            "eframe",
            "https://github.com/emilk/egui/tree/master/crates/eframe",
        );
        ui.label(".");
    });
}

use egui::{pos2, Align2, Color32, FontId, Rect, Sense, Shape, Stroke, Vec2};
use nalgebra::{Point2, Vector2};
use routing::{LatLng, MapView};

use super::tile_cache::TileCache;

const ROUTE_COLOR: Color32 = Color32::from_rgb(0, 0, 255);
const ROUTE_WIDTH: f32 = 4.0;
const BACKGROUND: Color32 = Color32::from_gray(221);

/// Draws the map into all remaining space of `ui` and lets the user pan and zoom it. The route
/// is re-fitted whenever `revision` changes.
pub fn map_panel(
    ui: &mut egui::Ui,
    map: &mut MapView,
    tiles: &mut TileCache,
    path: Option<&[LatLng]>,
    revision: u64,
) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::drag());
    let size = Vector2::new(rect.width() as f64, rect.height() as f64);

    map.mount(size).viewport_mut().resize(size);
    map.set_path(path, revision);

    let Some(surface) = map.surface_mut() else {
        return;
    };

    // pan by dragging
    let drag = response.drag_delta();
    if drag != Vec2::ZERO {
        surface
            .viewport_mut()
            .pan_pixels(drag.x as f64, drag.y as f64);
    }

    // combine the zoom_delta and the scroll amount to support multitouch gestures as well as
    // normal scroll zoom
    if ui.rect_contains_pointer(rect) {
        let (scroll_delta, zoom_delta, hover) = ui
            .ctx()
            .input(|i| (i.smooth_scroll_delta.y, i.zoom_delta(), i.pointer.hover_pos()));
        let factor = zoom_delta as f64 * (scroll_delta as f64 / 200.0).exp2();

        if let Some(pos) = hover {
            if (factor - 1.0).abs() > f64::EPSILON {
                let pos = pos - rect.min;
                surface
                    .viewport_mut()
                    .zoom_at(Point2::new(pos.x as f64, pos.y as f64), factor);
            }
        }
    }

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let viewport = surface.viewport();
    let layer = surface.base_layer();
    let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    for tile in layer.visible_tiles(viewport) {
        if let Some(texture) = tiles.get(layer, tile.id) {
            let min = rect.min + Vec2::new(tile.min.x as f32, tile.min.y as f32);
            let tile_rect = Rect::from_min_size(min, Vec2::splat(tile.size as f32));
            painter.image(texture.id(), tile_rect, uv, Color32::WHITE);
        }
    }

    if let Some(route) = surface.route() {
        let points = route
            .screen_points(viewport)
            .into_iter()
            .map(|p| rect.min + Vec2::new(p.x as f32, p.y as f32))
            .collect();
        painter.add(Shape::line(points, Stroke::new(ROUTE_WIDTH, ROUTE_COLOR)));
    }

    // backdrop is sized after the text is laid out, but must be painted below it
    let backdrop = painter.add(Shape::Noop);
    let text_rect = painter.text(
        rect.right_bottom() - Vec2::new(4.0, 2.0),
        Align2::RIGHT_BOTTOM,
        &layer.attribution,
        FontId::proportional(11.0),
        Color32::from_gray(40),
    );
    painter.set(
        backdrop,
        Shape::rect_filled(text_rect.expand(2.0), 0.0, Color32::from_white_alpha(200)),
    );
}

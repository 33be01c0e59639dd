use log::debug;
use nalgebra::{Point2, Vector2};

use crate::geo::{Bounds, LatLng};

/// Edge length of one map tile in pixels
pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;

/// The visible part of the map: what is in the middle, how far we are zoomed in and how many
/// pixels there are to fill
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    center: LatLng,
    zoom: f64,
    size: Vector2<f64>,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Vector2<f64>) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> Vector2<f64> {
        self.size
    }

    /// Size of the whole world in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Converts a geographic position into a pixel position relative to the top-left corner
    pub fn to_screen(&self, p: LatLng) -> Point2<f64> {
        let offset = (p.project() - self.center.project()) * self.world_size();
        Point2::from(offset + self.size / 2.0)
    }

    /// Converts a pixel position relative to the top-left corner into a geographic position
    pub fn from_screen(&self, p: Point2<f64>) -> LatLng {
        let offset = (p.coords - self.size / 2.0) / self.world_size();
        LatLng::unproject(self.center.project() + offset)
    }

    /// Pans the view by the given amount in pixels, content follows the pointer
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        let mut c = self.center.project() - Vector2::new(dx, dy) / self.world_size();
        c.y = c.y.clamp(0.0, 1.0);
        self.center = LatLng::unproject(c);
    }

    /// Zooms by `factor` while keeping the location under `pos` in place
    pub fn zoom_at(&mut self, pos: Point2<f64>, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        // pos needs to be the location on the screen, not in the world
        let anchor = self.from_screen(pos).project();

        self.zoom = (self.zoom + factor.log2()).clamp(MIN_ZOOM, MAX_ZOOM);

        let offset = (pos.coords - self.size / 2.0) / self.world_size();
        self.center = LatLng::unproject(anchor - offset);
    }

    pub fn resize(&mut self, size: Vector2<f64>) {
        self.size = size;
    }

    /// Geographic area currently on screen
    pub fn visible_bounds(&self) -> Bounds {
        let nw = self.from_screen(Point2::origin());
        let se = self.from_screen(Point2::from(self.size));
        Bounds {
            south_west: LatLng::new(se.lat, nw.lng),
            north_east: LatLng::new(nw.lat, se.lng),
        }
    }

    /// Centers on `bounds` and picks the largest whole zoom level at which all of it is visible
    pub fn fit_bounds(&mut self, bounds: &Bounds) {
        let (nw, se) = bounds.projected();
        let extent = (se - nw) * TILE_SIZE;

        let zoom = if extent.x <= f64::EPSILON && extent.y <= f64::EPSILON {
            MAX_ZOOM
        } else {
            // a zero extent on one axis gives infinity there, the other axis decides
            let scale = (self.size.x / extent.x).min(self.size.y / extent.y);
            scale.log2().floor()
        };

        self.zoom = if zoom.is_nan() {
            MIN_ZOOM
        } else {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        };
        self.center = bounds.center();

        debug!("fitted viewport to {:?}: center = {}, zoom = {}", bounds, self.center, self.zoom);
    }
}

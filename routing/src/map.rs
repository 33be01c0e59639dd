use log::debug;
use nalgebra::{Point2, Vector2};

use crate::geo::{Bounds, LatLng};
use crate::path::Path;
use crate::tiles::TileLayer;
use crate::viewport::Viewport;

/// San Francisco
pub const DEFAULT_CENTER: LatLng = LatLng::new(37.7749, -122.4194);
pub const DEFAULT_ZOOM: f64 = 13.0;

/// How a fresh map surface is set up
#[derive(Clone, Debug, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub tile_layer: TileLayer,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_layer: TileLayer::openstreetmap(),
        }
    }
}

/// The line drawn for a computed path
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOverlay {
    points: Path,
    bounds: Bounds,
}

impl RouteOverlay {
    /// `None` for an empty path, there is nothing to draw or fit to
    pub fn new(points: Path) -> Option<Self> {
        let bounds = Bounds::from_points(&points)?;
        Some(Self { points, bounds })
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn screen_points(&self, viewport: &Viewport) -> Vec<Point2<f64>> {
        self.points.iter().map(|p| viewport.to_screen(*p)).collect()
    }
}

/// A live map: the viewport, its base tiles and at most one route
#[derive(Debug)]
pub struct MapSurface {
    viewport: Viewport,
    base_layer: TileLayer,
    route: Option<RouteOverlay>,
}

impl MapSurface {
    fn new(options: &MapOptions, size: Vector2<f64>) -> Self {
        Self {
            viewport: Viewport::new(options.center, options.zoom, size),
            base_layer: options.tile_layer.clone(),
            route: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn base_layer(&self) -> &TileLayer {
        &self.base_layer
    }

    pub fn route(&self) -> Option<&RouteOverlay> {
        self.route.as_ref()
    }

    /// Number of layers on the surface, the base tiles plus the route if there is one
    pub fn layer_count(&self) -> usize {
        1 + self.route.iter().count()
    }

    fn replace_route(&mut self, route: Option<RouteOverlay>) {
        self.route = route;
        if let Some(route) = &self.route {
            self.viewport.fit_bounds(route.bounds());
        }
    }
}

/// Owns the map surface and keeps its route in sync with the path handed in each frame
pub struct MapView {
    options: MapOptions,
    surface: Option<MapSurface>,
    applied: Option<u64>,
}

impl MapView {
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            surface: None,
            applied: None,
        }
    }

    /// Create the surface on first use; later calls return the existing one untouched
    pub fn mount(&mut self, size: Vector2<f64>) -> &mut MapSurface {
        let options = &self.options;
        self.surface.get_or_insert_with(|| {
            debug!(
                "creating map surface at {} zoom {}",
                options.center, options.zoom
            );
            MapSurface::new(options, size)
        })
    }

    pub fn unmount(&mut self) {
        if self.surface.take().is_some() {
            debug!("map surface disposed");
        }
        self.applied = None;
    }

    pub fn surface(&self) -> Option<&MapSurface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut MapSurface> {
        self.surface.as_mut()
    }

    /// Show `path` as the only route. `revision` identifies the path value and changes whenever
    /// a new one is set, even with the same points; nothing happens while it stays the same.
    /// A new route re-fits the viewport, `None` removes the route and leaves the viewport.
    pub fn set_path(&mut self, path: Option<&[LatLng]>, revision: u64) {
        let Some(surface) = &mut self.surface else {
            return;
        };
        if self.applied == Some(revision) {
            return;
        }

        self.applied = Some(revision);
        let route = path.and_then(|p| RouteOverlay::new(p.to_vec()));
        debug!(
            "applying path revision {}, new route has {} points",
            revision,
            route.as_ref().map_or(0, |r| r.points().len())
        );
        surface.replace_route(route);
    }
}

use std::fmt::Display;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::viewport::{Viewport, MAX_ZOOM, MIN_ZOOM};

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Slippy map tile coordinates
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A tile that should be drawn, with its top-left screen position and edge length in pixels
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedTile {
    pub id: TileId,
    pub min: Point2<f64>,
    pub size: f64,
}

/// A raster tile source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

impl TileLayer {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_owned(),
            subdomains: ["a", "b", "c"].iter().map(|s| s.to_string()).collect(),
            attribution: OSM_ATTRIBUTION.to_owned(),
            max_zoom: MAX_ZOOM as u8,
        }
    }

    pub fn url(&self, tile: TileId) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let i = (tile.x as usize + tile.y as usize) % self.subdomains.len();
            self.subdomains[i].as_str()
        };
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    /// Zoom level of the tiles used for a (possibly fractional) viewport zoom
    pub fn tile_zoom(&self, viewport: &Viewport) -> u8 {
        viewport
            .zoom()
            .round()
            .clamp(MIN_ZOOM, self.max_zoom as f64) as u8
    }

    /// All tiles needed to cover the viewport, row by row from the top-left
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<PlacedTile> {
        let zoom = self.tile_zoom(viewport);
        let count = 1u32 << zoom;
        // tiles are scaled when the viewport sits between two zoom levels
        let size = viewport.world_size() / count as f64;

        // screen position of the north-west corner of the world
        let world_origin = Point2::from(
            viewport.size() / 2.0 - viewport.center().project().coords * viewport.world_size(),
        );
        let first = ((Point2::origin() - world_origin) / size).map(f64::floor);
        let last = ((Point2::from(viewport.size()) - world_origin) / size).map(|v| v.ceil() - 1.0);

        let mut tiles = Vec::new();
        if first.x > last.x || first.y > last.y {
            return tiles;
        }

        for ty in first.y as i64..=last.y as i64 {
            // nothing north or south of the world
            if ty < 0 || ty >= count as i64 {
                continue;
            }
            for tx in first.x as i64..=last.x as i64 {
                let min = world_origin + Vector2::new(tx as f64, ty as f64) * size;
                tiles.push(PlacedTile {
                    id: TileId {
                        zoom,
                        x: tx.rem_euclid(count as i64) as u32,
                        y: ty as u32,
                    },
                    min,
                    size,
                });
            }
        }
        tiles
    }
}

use std::f64::consts::PI;
use std::fmt::Display;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Latitude limit of the square Web Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A geographic coordinate in degrees.
///
/// On the wire this is a `[lat, lng]` pair, which is the format the path-finding
/// API uses for every point of a route.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Project onto the normalized Web Mercator square, `(0, 0)` is the north-west corner and
    /// `(1, 1)` the south-east corner
    pub fn project(&self) -> Point2<f64> {
        let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (self.lng + 180.0) / 360.0;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
        Point2::new(x, y)
    }

    /// Inverse of [`LatLng::project`]
    pub fn unproject(p: Point2<f64>) -> Self {
        let lng = p.x * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * p.y);
        let lat = n.sinh().atan().to_degrees();
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

impl Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// An axis aligned geographic rectangle
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// The smallest bounds enclosing all points, `None` for an empty sequence
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(*points.next()?);
        for p in points {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(other.south_west) && self.contains(other.north_east)
    }

    /// Center in projected space, which is what a map view centers on
    pub fn center(&self) -> LatLng {
        let (nw, se) = self.projected();
        LatLng::unproject(nalgebra::center(&nw, &se))
    }

    /// Projected north-west and south-east corners
    pub fn projected(&self) -> (Point2<f64>, Point2<f64>) {
        let nw = LatLng::new(self.north_east.lat, self.south_west.lng).project();
        let se = LatLng::new(self.south_west.lat, self.north_east.lng).project();
        (nw, se)
    }
}

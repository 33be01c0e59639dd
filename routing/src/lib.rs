//! UI independent core of the route finder: the state behind the address inputs, the map and
//! the page, plus the services they talk to.

pub mod autocomplete;
pub mod config;
pub mod event;
pub mod fetch;
pub mod geo;
pub mod map;
pub mod page;
pub mod path;
pub mod suggest;
pub mod tiles;
pub mod viewport;

pub use autocomplete::{AddressAutocomplete, AutocompleteState, SelectionGuard};
pub use config::Config;
pub use event::{Dispatcher, Listener, PointerDown, ScreenRect};
pub use geo::{Bounds, LatLng};
pub use map::{MapOptions, MapSurface, MapView, RouteOverlay};
pub use page::PageController;
pub use path::{HttpPathService, Path, PathError, PathRequest, PathResponse, PathService};
pub use suggest::{GooglePlaces, Lookup, PlacesStatus, SuggestionService};
pub use tiles::{PlacedTile, TileId, TileLayer};
pub use viewport::Viewport;

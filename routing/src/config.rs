use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::map::{MapOptions, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::path::DEFAULT_PATH_URL;
use crate::suggest::PLACES_AUTOCOMPLETE_URL;
use crate::tiles::{TileLayer, OSM_TILE_URL};

pub const ENV_API_URL: &str = "ROUTE_FINDER_API_URL";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_PLACES_URL: &str = "ROUTE_FINDER_PLACES_URL";
pub const ENV_TILE_URL: &str = "ROUTE_FINDER_TILE_URL";
pub const ENV_DEFAULT_ZOOM: &str = "ROUTE_FINDER_DEFAULT_ZOOM";

/// Everything the application needs to know about the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old config
pub struct Config {
    pub api_url: String,
    /// Without a key place suggestions are disabled
    pub google_api_key: Option<String>,
    pub places_url: String,
    pub tile_layer: TileLayer,
    pub default_center: LatLng,
    pub default_zoom: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PATH_URL.to_owned(),
            google_api_key: None,
            places_url: PLACES_AUTOCOMPLETE_URL.to_owned(),
            tile_layer: TileLayer::openstreetmap(),
            default_center: DEFAULT_CENTER,
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

impl Config {
    /// Build from the process environment. On the web there is no environment, the values are
    /// taken from the build environment instead.
    pub fn from_env() -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::from_lookup(|key| std::env::var(key).ok())
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::from_lookup(|key| {
                match key {
                    ENV_API_URL => option_env!("ROUTE_FINDER_API_URL"),
                    ENV_GOOGLE_API_KEY => option_env!("GOOGLE_API_KEY"),
                    ENV_PLACES_URL => option_env!("ROUTE_FINDER_PLACES_URL"),
                    ENV_TILE_URL => option_env!("ROUTE_FINDER_TILE_URL"),
                    ENV_DEFAULT_ZOOM => option_env!("ROUTE_FINDER_DEFAULT_ZOOM"),
                    _ => None,
                }
                .map(str::to_owned)
            })
        }
    }

    /// Build from any key-value source, unset or empty keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        config.google_api_key = get(ENV_GOOGLE_API_KEY);
        if let Some(url) = get(ENV_PLACES_URL) {
            config.places_url = url;
        }
        if let Some(url) = get(ENV_TILE_URL) {
            config.tile_layer.url_template = url;
        }
        if let Some(zoom) = get(ENV_DEFAULT_ZOOM) {
            let parsed: f64 = zoom
                .trim()
                .parse()
                .with_context(|| format!("{ENV_DEFAULT_ZOOM} is not a number: {zoom:?}"))?;
            anyhow::ensure!(
                parsed.is_finite(),
                "{ENV_DEFAULT_ZOOM} is not a finite number: {zoom:?}"
            );
            config.default_zoom = parsed;
        }

        Ok(config)
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            center: self.default_center,
            zoom: self.default_zoom,
            tile_layer: self.tile_layer.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, DEFAULT_PATH_URL);
        assert!(config.google_api_key.is_none());
        assert_eq!(config.tile_layer.url_template, OSM_TILE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_URL, "https://example.com/api/py/shortest-path"),
            (ENV_GOOGLE_API_KEY, "secret"),
            (ENV_TILE_URL, "https://tiles.example.com/{z}/{x}/{y}.png"),
            (ENV_DEFAULT_ZOOM, " 12 "),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://example.com/api/py/shortest-path");
        assert_eq!(config.google_api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.tile_layer.url_template,
            "https://tiles.example.com/{z}/{x}/{y}.png"
        );
        assert_eq!(config.map_options().zoom, 12.0);
    }

    #[test]
    fn test_empty_key_means_no_key() {
        let config = Config::from_lookup(lookup(&[(ENV_GOOGLE_API_KEY, "  ")])).unwrap();
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_bad_zoom() {
        let err = Config::from_lookup(lookup(&[(ENV_DEFAULT_ZOOM, "close")])).unwrap_err();
        assert!(err.to_string().contains(ENV_DEFAULT_ZOOM));
    }

    #[test]
    fn test_non_finite_zoom() {
        for value in ["NaN", "inf", "-infinity"] {
            let err = Config::from_lookup(lookup(&[(ENV_DEFAULT_ZOOM, value)])).unwrap_err();
            assert!(err.to_string().contains(ENV_DEFAULT_ZOOM), "{value}: {err}");
        }
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"google_api_key": "k"}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_PATH_URL);
        assert_eq!(config.google_api_key.as_deref(), Some("k"));
    }
}

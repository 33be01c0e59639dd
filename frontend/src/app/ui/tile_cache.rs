use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

use egui::{ColorImage, TextureHandle, TextureOptions};
use log::warn;
use routing::fetch::{self, FetchError, Request};
use routing::{TileId, TileLayer};

/// Upper bound on cached tiles before the ones not drawn recently are evicted
const MAX_TILES: usize = 512;
/// Frames to wait before asking again for a tile that failed to load
const RETRY_AFTER_FRAMES: u64 = 120;

enum TileState {
    Pending,
    Ready(TextureHandle),
    Failed { retry_at: u64 },
}

impl TileState {
    fn failed(frame: u64) -> Self {
        TileState::Failed {
            retry_at: frame + RETRY_AFTER_FRAMES,
        }
    }

    fn needs_request(&self, frame: u64) -> bool {
        matches!(self, TileState::Failed { retry_at } if *retry_at <= frame)
    }
}

struct Entry {
    state: TileState,
    last_used: u64,
}

type TileResult = (TileId, Result<Vec<u8>, FetchError>);

/// Downloads base map tiles and keeps them around as textures
pub struct TileCache {
    tiles: HashMap<TileId, Entry>,
    frame: u64,
    pending: usize,
    results_tx: Sender<TileResult>,
    results_rx: Receiver<TileResult>,
}

impl TileCache {
    pub fn new() -> Self {
        let (results_tx, results_rx) = channel();
        Self {
            tiles: HashMap::new(),
            frame: 0,
            pending: 0,
            results_tx,
            results_rx,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Turn downloaded tiles into textures and forget tiles that have not been drawn in a while
    pub fn begin_frame(&mut self, ctx: &egui::Context) {
        self.frame += 1;

        while let Ok((id, result)) = self.results_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            let state = match result.map_err(anyhow::Error::from).and_then(|bytes| {
                load_image_from_memory(&bytes).map_err(anyhow::Error::from)
            }) {
                Ok(image) => TileState::Ready(ctx.load_texture(
                    format!("tile-{id}"),
                    image,
                    TextureOptions::LINEAR,
                )),
                Err(e) => {
                    warn!("failed to load tile {}: {}", id, e);
                    TileState::failed(self.frame)
                }
            };
            if let Some(entry) = self.tiles.get_mut(&id) {
                entry.state = state;
            }
        }

        if self.tiles.len() > MAX_TILES {
            let frame = self.frame;
            self.tiles.retain(|_, entry| {
                matches!(entry.state, TileState::Pending) || entry.last_used + 1 >= frame
            });
        }
    }

    /// The texture for a tile, starting the download the first time it is asked for and again
    /// some frames after a failure
    pub fn get(&mut self, layer: &TileLayer, id: TileId) -> Option<&TextureHandle> {
        let frame = self.frame;
        let needs_request = self
            .tiles
            .get(&id)
            .map_or(true, |entry| entry.state.needs_request(frame));
        if needs_request {
            let state = self.request(layer, id);
            self.tiles.insert(
                id,
                Entry {
                    state,
                    last_used: frame,
                },
            );
        }

        let entry = self.tiles.get_mut(&id)?;
        entry.last_used = frame;
        match &entry.state {
            TileState::Ready(texture) => Some(texture),
            TileState::Pending | TileState::Failed { .. } => None,
        }
    }

    fn request(&mut self, layer: &TileLayer, id: TileId) -> TileState {
        let url = match fetch::parse_url(&layer.url(id)) {
            Ok(url) => url,
            Err(e) => {
                warn!("cannot request tile {}: {}", id, e);
                return TileState::failed(self.frame);
            }
        };

        let tx = self.results_tx.clone();
        self.pending += 1;
        fetch::fetch_bytes(Request::get(url), move |result| {
            let _ = tx.send((id, result));
        });
        TileState::Pending
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

fn load_image_from_memory(image_data: &[u8]) -> Result<ColorImage, image::ImageError> {
    let image = image::load_from_memory(image_data)?;
    let size = [image.width() as _, image.height() as _];
    let image_buffer = image.to_rgba8();
    let pixels = image_buffer.as_flat_samples();
    Ok(ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_failed_tile_is_requested_again_later() {
        let state = TileState::failed(10);
        assert!(!state.needs_request(10));
        assert!(!state.needs_request(10 + RETRY_AFTER_FRAMES - 1));
        assert!(state.needs_request(10 + RETRY_AFTER_FRAMES));
        assert!(state.needs_request(10 + 5 * RETRY_AFTER_FRAMES));
    }

    #[test]
    fn test_pending_tile_is_not_requested_again() {
        assert!(!TileState::Pending.needs_request(u64::MAX));
    }
}

pub mod address_input;
pub mod map_panel;
pub mod tile_cache;

mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use projection::Viewport;
pub use renderer::{AltitudeBands, LineString, MapLayers, MapRenderer, BAND_COUNT};
pub use spatial::SpatialGrid;

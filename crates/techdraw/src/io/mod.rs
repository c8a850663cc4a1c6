pub mod raster;
pub mod svg;

pub use raster::*;

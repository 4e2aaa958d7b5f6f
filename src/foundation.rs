pub mod error;
pub mod fsio;
pub mod raster;

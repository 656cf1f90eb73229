// Main module declarations for gpsound

#[macro_use]
extern crate lazy_static;

// Configuration and coordinate math
pub mod config {
    pub mod constants;
    pub mod const_funcs;
    pub mod session_config;
}

// Coordinate types and loaders
pub mod data {
    pub mod coords;
    pub mod shapes_loader;
}

// Model definitions
pub mod models {
    pub mod shape;
    pub mod instrument;
}

// Session state
pub mod core {
    pub mod shape_layer;
}

// Collision and planar analysis
pub mod analysis {
    pub mod primitives;
    pub mod collision;
    pub mod scratchpad;
}

// Sound playback
pub mod audio {
    pub mod backend;
    pub mod error;
    pub mod playback;
}

// Utility functions
pub mod utils {
    pub mod spatial_index;
    pub mod logging;
    pub mod csv_export;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export commonly used items
pub use crate::analysis::collision::{find_collisions, Collision, ContainingShape};
pub use crate::config::const_funcs::project_to_plane;
pub use crate::core::shape_layer::ShapeLayer;
pub use crate::data::coords::{Coordinate, LatLng};
pub use crate::models::shape::{Shape, ShapeGeometry, ShapeId};

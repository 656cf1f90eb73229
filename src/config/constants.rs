// Projection Constants
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;         // Mean Earth radius

// Default session origin (drawing map's initial view)
pub const DEFAULT_REFERENCE_LAT: f64 = 42.308606;
pub const DEFAULT_REFERENCE_LNG: f64 = -83.747036;

// Playback Constants
pub const SOUND_CLEANUP_DELAY_SECS: f64 = 8.0;       // One-shot voices are disposed after this
pub const PLAYBACK_LEAD_SECS: f64 = 0.1;             // Shared start offset for play_many
pub const DEFAULT_NOTE_LENGTH: &str = "8n";
pub const FALLBACK_NOTE: &str = "C4";

// Polygon faces need at least a triangle
pub const MIN_POLYGON_VERTICES: usize = 3;

// Scratchpad Constants
pub const SCRATCHPAD_WIDTH: f64 = 400.0;
pub const SCRATCHPAD_HEIGHT: f64 = 300.0;
pub const SCRATCHPAD_POINT_RADIUS: f64 = 5.0;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Geographic sound zones: projection, collisions and playback", long_about = None)]
pub struct Args {
    #[arg(short, long, global = true, help = "Session config (JSON)")]
    config: Option<String>,

    #[arg(long, global = true, default_value_t = false)]
    enable_timing: bool,

    #[arg(short, long, global = true, default_value_t = false)]
    debug_logging: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Project a lat/lng into planar meters around the reference point
    Project {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[command(flatten)]
        reference: ReferenceArgs,
    },
    /// Print which zones contain each marker
    Collide {
        #[arg(short, long)]
        shapes: String,
        #[command(flatten)]
        reference: ReferenceArgs,
        #[arg(long, help = "Directory for a timestamped CSV export")]
        csv: Option<String>,
    },
    /// Print the sounds active for one marker
    Sounds {
        #[arg(short, long)]
        shapes: String,
        #[arg(short, long)]
        marker: i64,
        #[command(flatten)]
        reference: ReferenceArgs,
        #[arg(long, default_value_t = false, help = "Send the sounds to the playback service")]
        play: bool,
    },
    /// Run the planar circle scratchpad
    Scratchpad {
        #[arg(long)]
        svg: Option<String>,
    },
    /// List the instrument catalog
    Instruments,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReferenceArgs {
    #[arg(long, allow_hyphen_values = true, help = "Reference latitude (overrides config)")]
    pub ref_lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Reference longitude (overrides config)")]
    pub ref_lng: Option<f64>,
}

impl Args {
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collide_with_negative_reference() {
        let args = Args::try_parse_from([
            "gpsound", "collide", "--shapes", "zones.json", "--ref-lat", "42.3", "--ref-lng", "-83.7",
        ])
        .unwrap();

        match args.command() {
            Command::Collide { shapes, reference, csv } => {
                assert_eq!(shapes, "zones.json");
                assert_eq!(reference.ref_lat, Some(42.3));
                assert_eq!(reference.ref_lng, Some(-83.7));
                assert!(csv.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["gpsound", "instruments", "--enable-timing", "-d"]).unwrap();
        assert!(args.enable_timing());
        assert!(args.debug_logging());
        assert!(args.config().is_none());
    }

    #[test]
    fn test_sounds_requires_marker() {
        assert!(Args::try_parse_from(["gpsound", "sounds", "--shapes", "zones.json"]).is_err());
    }
}

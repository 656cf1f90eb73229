use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use gpsound::analysis::collision::active_sounds;
use gpsound::analysis::scratchpad::{default_scene, run_scratchpad, write_svg};
use gpsound::audio::backend::TracingBackend;
use gpsound::audio::playback::{PlaybackService, SoundCue};
use gpsound::cli::cli::{Args, Command, ReferenceArgs};
use gpsound::config::const_funcs::project_latlng;
use gpsound::config::session_config::SessionConfig;
use gpsound::data::coords::LatLng;
use gpsound::data::shapes_loader::load_shapes;
use gpsound::models::instrument::INSTRUMENT_DEFINITIONS;
use gpsound::models::shape::ShapeId;
use gpsound::utils::csv_export::CsvExporter;
use gpsound::utils::logging::{self, OperationCategory};
use gpsound::ShapeLayer;

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging())
        .context("failed to install tracing subscriber")?;

    let config = match args.config() {
        Some(path) => SessionConfig::load(path).with_context(|| format!("loading config {}", path))?,
        None => SessionConfig::default(),
    };

    let result = run(args.command(), config);

    if logging::is_timing_enabled() {
        logging::print_timing_report();
    }

    result
}

fn run(command: &Command, config: SessionConfig) -> Result<()> {
    let _timing = logging::start_timing("run_command", OperationCategory::Other);

    match command {
        Command::Project { lat, lng, reference } => {
            let config = apply_reference(config, reference)?;
            let position = LatLng::new(*lat, *lng);
            if !position.is_finite() {
                bail!("position must be finite, got {:?}", position);
            }
            let projected = project_latlng(&position, &config.reference);
            println!("{}", serde_json::to_string_pretty(&projected)?);
        }
        Command::Collide { shapes, reference, csv } => {
            let config = apply_reference(config, reference)?;
            let layer = ShapeLayer::from_import(load_shapes(shapes)?);
            info!(reference = ?config.reference, shapes = layer.len(), "Running collision query");

            let collisions = layer.collisions(&config.reference);
            println!("{}", serde_json::to_string_pretty(&collisions)?);

            if let Some(dir) = csv {
                let exporter = CsvExporter::new(dir)?;
                let path = exporter.export_collisions(collisions.as_deref().unwrap_or_default())?;
                info!(path = %path.display(), "CSV written");
            }
        }
        Command::Sounds { shapes, marker, reference, play } => {
            let config = apply_reference(config, reference)?;
            let layer = ShapeLayer::from_import(load_shapes(shapes)?);
            let marker = ShapeId(*marker);
            if layer.get(marker).is_none() {
                bail!("no shape with id {} in {}", marker, shapes);
            }

            let collisions = layer.collisions(&config.reference).unwrap_or_default();
            let sounds = active_sounds(&collisions, marker);
            println!("{}", serde_json::to_string_pretty(&sounds)?);

            if *play {
                let playback = PlaybackService::new(TracingBackend::new(), config.playback.clone());
                let cues: Vec<SoundCue> = sounds.iter().map(|s| SoundCue::for_sound(s)).collect();
                if cues.is_empty() {
                    warn!(marker = %marker, "Marker is not inside any sounding zone");
                }
                let voices = playback.play_many(&cues)?;
                info!(voices = voices.len(), active = playback.active_count(), "Sounds started");
            }
        }
        Command::Scratchpad { svg } => {
            let (circles, query) = default_scene();
            let report = run_scratchpad(&circles, query);
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let Some(path) = svg {
                write_svg(path, &report).with_context(|| format!("writing {}", path))?;
                info!(path = %path, "SVG written");
            }
        }
        Command::Instruments => {
            for def in INSTRUMENT_DEFINITIONS {
                println!("{:<12} {:<12} {}", def.id, def.name, def.default_note);
            }
        }
    }

    Ok(())
}

fn apply_reference(config: SessionConfig, reference: &ReferenceArgs) -> Result<SessionConfig> {
    let config = config.with_reference(reference.ref_lat, reference.ref_lng);
    config.validate()?;
    Ok(config)
}

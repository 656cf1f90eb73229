use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};
use tracing_timing::{Builder, Histogram};

const HISTOGRAM_MAX_NS: u64 = 60_000_000_000;

// Categories for timed operations
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum OperationCategory {
    Collision { stage: CollisionStage },
    Playback { action: PlaybackAction },
    FileIO { subcategory: FileIOType },
    Other,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum CollisionStage {
    Projection,
    IndexBuild,
    Query,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum PlaybackAction {
    Trigger,
    Dispose,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum FileIOType {
    ConfigLoad,
    ShapesLoad,
    CsvExport,
    SvgExport,
}

impl OperationCategory {
    pub fn as_str(&self) -> String {
        match self {
            OperationCategory::Collision { stage } => {
                format!("Collision - {}", match stage {
                    CollisionStage::Projection => "Projection",
                    CollisionStage::IndexBuild => "Index Build",
                    CollisionStage::Query => "Query",
                })
            },
            OperationCategory::Playback { action } => {
                format!("Playback - {}", match action {
                    PlaybackAction::Trigger => "Trigger",
                    PlaybackAction::Dispose => "Dispose",
                })
            },
            OperationCategory::FileIO { subcategory } => {
                format!("File I/O - {}", match subcategory {
                    FileIOType::ConfigLoad => "Config Load",
                    FileIOType::ShapesLoad => "Shapes Load",
                    FileIOType::CsvExport => "CSV Export",
                    FileIOType::SvgExport => "SVG Export",
                })
            },
            OperationCategory::Other => "Other Operations".to_string(),
        }
    }
}

thread_local! {
    static TIMING_STACK: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

lazy_static! {
    static ref TIMING_ENABLED: AtomicBool = AtomicBool::new(false);
    static ref FUNCTION_TIMINGS: Arc<RwLock<HashMap<String, Histogram<u64>>>> = Arc::new(RwLock::new(HashMap::new()));
    static ref CATEGORY_TIMINGS: Arc<RwLock<HashMap<OperationCategory, Histogram<u64>>>> = Arc::new(RwLock::new(HashMap::new()));
    static ref HIERARCHICAL_TIMINGS: Arc<RwLock<HashMap<String, (Duration, usize, Vec<String>)>>> = Arc::new(RwLock::new(HashMap::new()));
}

fn new_histogram() -> Option<Histogram<u64>> {
    Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_NS, 3).ok()
}

pub struct TimingGuard {
    function_name: String,
    category: OperationCategory,
    start: Instant,
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        record_timing_end(&self.function_name, duration, &self.category);
    }
}

/// Start timing `function_name`; the sample is recorded when the guard drops.
pub fn start_timing(function_name: &str, category: OperationCategory) -> TimingGuard {
    TIMING_STACK.with(|stack| {
        stack.borrow_mut().push(function_name.to_string());
    });

    TimingGuard {
        function_name: function_name.to_string(),
        category,
        start: Instant::now(),
    }
}

fn record_timing_end(function_name: &str, duration: Duration, category: &OperationCategory) {
    // The stack is kept balanced even when timing is off.
    let parent = TIMING_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.pop();
        stack.last().cloned()
    });

    if !is_timing_enabled() {
        return;
    }

    let duration_ns = duration.as_nanos() as u64;

    {
        let mut hierarchical = HIERARCHICAL_TIMINGS.write();
        let entry = hierarchical
            .entry(function_name.to_string())
            .or_insert((Duration::from_nanos(0), 0, Vec::new()));

        entry.0 += duration;
        entry.1 += 1;

        if let Some(parent_name) = parent {
            if !entry.2.contains(&parent_name) {
                entry.2.push(parent_name);
            }
        }
    }

    {
        let mut timings = FUNCTION_TIMINGS.write();
        if !timings.contains_key(function_name) {
            if let Some(histogram) = new_histogram() {
                timings.insert(function_name.to_string(), histogram);
            }
        }
        if let Some(histogram) = timings.get_mut(function_name) {
            let _ = histogram.record(duration_ns);
        }
    }

    {
        let mut category_timings = CATEGORY_TIMINGS.write();
        if !category_timings.contains_key(category) {
            if let Some(histogram) = new_histogram() {
                category_timings.insert(category.clone(), histogram);
            }
        }
        if let Some(histogram) = category_timings.get_mut(category) {
            let _ = histogram.record(duration_ns);
        }
    }
}

pub fn init_logging(enable_timing: bool, debug_logging: bool) -> Result<(), SetGlobalDefaultError> {
    TIMING_ENABLED.store(enable_timing, Ordering::SeqCst);

    let crate_level = if debug_logging { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive(format!("gpsound={}", crate_level).parse().unwrap_or_else(|_| Level::INFO.into()));

    if enable_timing {
        let timing_layer = Builder::default().layer(|| {
            Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_NS, 3)
                .expect("constant histogram bounds are valid")
        });

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .with(timing_layer.boxed());

        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr));

        tracing::subscriber::set_global_default(subscriber)
    }
}

pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::SeqCst)
}

/// Timing report on stderr, so stdout stays free for command output.
pub fn print_timing_report() {
    if !is_timing_enabled() {
        return;
    }

    let stderr = std::io::stderr();
    if let Err(e) = write_timing_report(&mut stderr.lock()) {
        tracing::warn!(error = %e, "Failed to write timing report");
    }
}

pub fn write_timing_report<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\nPerformance Report")?;
    writeln!(out, "==================")?;

    writeln!(out, "\nHierarchical Timing Analysis:")?;
    writeln!(out, "-----------------------------")?;
    let hierarchical = HIERARCHICAL_TIMINGS.read();
    let mut entries: Vec<_> = hierarchical.iter().collect();
    entries.sort_by(|a, b| b.1.0.cmp(&a.1.0));

    for (function_name, (total_duration, count, parents)) in entries {
        let avg_duration = total_duration.div_f64(*count as f64);
        writeln!(
            out,
            "{}: total={:.3}ms, count={}, avg={:.3}ms{}",
            function_name,
            total_duration.as_secs_f64() * 1000.0,
            count,
            avg_duration.as_secs_f64() * 1000.0,
            if !parents.is_empty() {
                format!("\n  Called by: {}", parents.join(", "))
            } else {
                String::new()
            }
        )?;
    }

    writeln!(out, "\nPerformance by Category:")?;
    writeln!(out, "------------------------")?;
    let category_timings = CATEGORY_TIMINGS.read();
    let mut category_vec: Vec<_> = category_timings.iter().collect();
    category_vec.sort_by(|a, b| {
        b.1.mean()
            .partial_cmp(&a.1.mean())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (category, histogram) in category_vec {
        writeln!(
            out,
            "{}: mean={:.3}ms, p95={:.3}ms, count={}",
            category.as_str(),
            histogram.mean() / 1_000_000.0,
            histogram.value_at_quantile(0.95) as f64 / 1_000_000.0,
            histogram.len(),
        )?;
    }

    writeln!(out, "==================\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        let category = OperationCategory::Collision { stage: CollisionStage::IndexBuild };
        assert_eq!(category.as_str(), "Collision - Index Build");
        let category = OperationCategory::FileIO { subcategory: FileIOType::ShapesLoad };
        assert_eq!(category.as_str(), "File I/O - Shapes Load");
    }

    #[test]
    fn test_report_goes_to_given_writer() {
        let mut out = Vec::new();
        write_timing_report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Performance Report"));
        assert!(text.contains("Performance by Category:"));
    }

    #[test]
    fn test_guard_keeps_stack_balanced() {
        {
            let _outer = start_timing("outer", OperationCategory::Other);
            {
                let _inner = start_timing("inner", OperationCategory::Other);
                TIMING_STACK.with(|stack| assert_eq!(stack.borrow().len(), 2));
            }
            TIMING_STACK.with(|stack| assert_eq!(stack.borrow().len(), 1));
        }
        TIMING_STACK.with(|stack| assert!(stack.borrow().is_empty()));
    }
}

// Planar scratchpad: circles and a query point on a small canvas, run through
// the same index and containment test as the map collision query.
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::analysis::primitives::{PlanarPrimitive, PrimitiveKind};
use crate::config::constants::{SCRATCHPAD_HEIGHT, SCRATCHPAD_POINT_RADIUS, SCRATCHPAD_WIDTH};
use crate::data::coords::Coordinate;
use crate::utils::logging::{self, FileIOType, OperationCategory};
use crate::utils::spatial_index::{IndexedArea, SpatialIndex};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScratchCircle {
    pub center: Coordinate,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScratchShape {
    #[serde(rename = "type")]
    pub kind: PrimitiveKind,
    pub center: Coordinate,
    pub radius: f64,
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScratchHit {
    pub shape_id: usize,
    pub shape: PrimitiveKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScratchpadReport {
    pub shapes: Vec<ScratchShape>,
    pub query_point: Coordinate,
    pub hit_results: Vec<ScratchHit>,
}

impl ScratchpadReport {
    pub fn is_hit(&self, shape_id: usize) -> bool {
        self.hit_results.iter().any(|h| h.shape_id == shape_id)
    }
}

/// The two-circle scene the playground starts with.
pub fn default_scene() -> (Vec<ScratchCircle>, Coordinate) {
    (
        vec![
            ScratchCircle { center: Coordinate::new(200.0, 110.0), radius: 50.0 },
            ScratchCircle { center: Coordinate::new(250.0, 160.0), radius: 80.0 },
        ],
        Coordinate::new(255.0, 180.0),
    )
}

/// Hit-test `query` against `circles`. Shape ids are 1-based positions.
pub fn run_scratchpad(circles: &[ScratchCircle], query: Coordinate) -> ScratchpadReport {
    let primitives: Vec<PlanarPrimitive> = circles
        .iter()
        .map(|c| PlanarPrimitive::Circle { center: c.center, radius: c.radius })
        .collect();

    let index = SpatialIndex::bulk_load(
        primitives
            .iter()
            .enumerate()
            .filter_map(|(slot, p)| p.bounds().map(|(min, max)| IndexedArea::new(slot, min, max)))
            .collect(),
    );

    let mut hit_results: Vec<ScratchHit> = index
        .candidates_at(&query)
        .filter(|slot| primitives[*slot].contains(&query))
        .map(|slot| ScratchHit {
            shape_id: slot + 1,
            shape: primitives[slot].kind(),
        })
        .collect();
    hit_results.sort_by_key(|h| h.shape_id);

    ScratchpadReport {
        shapes: circles
            .iter()
            .enumerate()
            .map(|(i, c)| ScratchShape {
                kind: PrimitiveKind::Circle,
                center: c.center,
                radius: c.radius,
                id: i + 1,
            })
            .collect(),
        query_point: query,
        hit_results,
    }
}

/// SVG picture of a report: hit circles red, others blue, query point green.
pub fn render_svg(report: &ScratchpadReport) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = SCRATCHPAD_WIDTH,
        h = SCRATCHPAD_HEIGHT
    );

    for shape in &report.shapes {
        let (stroke, fill) = if report.is_hit(shape.id) {
            ("red", "rgba(255,0,0,0.1)")
        } else {
            ("blue", "rgba(0,0,255,0.1)")
        };
        let _ = writeln!(
            svg,
            r#"  <circle cx="{}" cy="{}" r="{}" stroke="{}" fill="{}" stroke-width="2"/>"#,
            shape.center.x, shape.center.y, shape.radius, stroke, fill
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" font-family="Arial" font-size="12" fill="black">Circle {}</text>"#,
            shape.center.x - 20.0,
            shape.center.y - shape.radius - 10.0,
            shape.id
        );
    }

    let q = report.query_point;
    let _ = writeln!(
        svg,
        r#"  <circle cx="{}" cy="{}" r="{}" fill="green" stroke="darkgreen" stroke-width="2"/>"#,
        q.x, q.y, SCRATCHPAD_POINT_RADIUS
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{}" y="{}" font-family="Arial" font-size="12" fill="black">Query Point</text>"#,
        q.x + 10.0,
        q.y - 10.0
    );
    svg.push_str("</svg>\n");
    svg
}

pub fn write_svg(path: impl AsRef<Path>, report: &ScratchpadReport) -> std::io::Result<()> {
    let _timing = logging::start_timing(
        "write_svg",
        OperationCategory::FileIO { subcategory: FileIOType::SvgExport },
    );
    fs::write(path, render_svg(report))
}

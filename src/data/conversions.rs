//! UFO to snapshot conversion
//!
//! Turns a norad [`Font`] into the [`FontSnapshot`] the matching engine
//! reads. Right margins are measured on the real curve bounds of the
//! outline, components included, the same way a font editor reports them.

use crate::features::classes::sort_names;
use crate::font_source::{FontSnapshot, GlyphMetrics};
use kurbo::{Affine, BezPath, Point, Shape};
use norad::{Contour, ContourPoint, Font, Glyph, Layer, PointType};
use tracing::warn;

/// Nested components deeper than this are treated as a cycle.
const MAX_COMPONENT_DEPTH: usize = 32;

const GLYPH_ORDER_KEY: &str = "public.glyphOrder";

impl FontSnapshot {
    /// Snapshot the default layer, groups, and glyph order of a norad font
    pub fn from_norad_font(font: &Font) -> Self {
        let layer = font.default_layer();
        let mut snapshot = FontSnapshot::new();

        for glyph in layer.iter() {
            snapshot.insert_glyph(GlyphMetrics::from_norad_glyph(glyph, layer));
        }

        if let Some(order) = glyph_order_from_lib(font) {
            snapshot.glyph_order = sort_names(&snapshot.glyph_order, &order);
        }

        for (name, members) in font.groups.iter() {
            snapshot.groups.insert(
                name.to_string(),
                members.iter().map(|m| m.to_string()).collect(),
            );
        }

        snapshot
    }
}

impl GlyphMetrics {
    /// Measure a norad glyph. `layer` resolves component references.
    pub fn from_norad_glyph(glyph: &Glyph, layer: &Layer) -> Self {
        let mut outline = BezPath::new();
        collect_outline(glyph, layer, Affine::IDENTITY, 0, &mut outline);

        let right_margin = if outline.elements().is_empty() {
            None
        } else {
            Some(glyph.width - outline.bounding_box().x1)
        };

        Self {
            name: glyph.name().to_string(),
            width: glyph.width,
            right_margin,
            anchors: glyph
                .anchors
                .iter()
                .filter_map(|anchor| anchor.name.as_ref().map(|n| (n.to_string(), anchor.x)))
                .collect(),
        }
    }
}

fn glyph_order_from_lib(font: &Font) -> Option<Vec<String>> {
    let order = font.lib.get(GLYPH_ORDER_KEY)?.as_array()?;
    Some(
        order
            .iter()
            .filter_map(|value| value.as_string().map(str::to_string))
            .collect(),
    )
}

fn collect_outline(
    glyph: &Glyph,
    layer: &Layer,
    transform: Affine,
    depth: usize,
    outline: &mut BezPath,
) {
    for contour in &glyph.contours {
        let mut path = contour_to_bezpath(contour);
        path.apply_affine(transform);
        outline.extend(path.iter());
    }

    for component in &glyph.components {
        if depth >= MAX_COMPONENT_DEPTH {
            warn!(
                "Component nesting too deep in '{}', ignoring '{}'",
                glyph.name(),
                component.base
            );
            continue;
        }
        let Some(base) = layer.get_glyph(component.base.as_str()) else {
            warn!(
                "Glyph '{}' references missing component '{}'",
                glyph.name(),
                component.base
            );
            continue;
        };
        let t = &component.transform;
        let local = Affine::new([
            t.x_scale, t.xy_scale, t.yx_scale, t.y_scale, t.x_offset, t.y_offset,
        ]);
        collect_outline(base, layer, transform * local, depth + 1, outline);
    }
}

/// Build a kurbo path from a UFO contour.
///
/// Closed contours may list their points starting anywhere, including on
/// an off-curve point, so the path starts at the first on-curve point and
/// wraps around. That point's type decides how the contour closes back
/// onto it. A contour of only off-curve points is a quadratic loop whose
/// on-curve points are all implied.
fn contour_to_bezpath(contour: &Contour) -> BezPath {
    let points = &contour.points;
    let Some(start) = points
        .iter()
        .position(|p| !matches!(p.typ, PointType::OffCurve))
    else {
        return implied_quadratic_loop(points);
    };

    let mut path = BezPath::new();
    let mut pending: Vec<Point> = Vec::new();
    let first = &points[start];
    let first_pt = Point::new(first.x, first.y);
    path.move_to(first_pt);

    for point in points[start + 1..].iter().chain(&points[..start]) {
        let pt = Point::new(point.x, point.y);
        match &point.typ {
            PointType::OffCurve => pending.push(pt),
            PointType::Move => {
                pending.clear();
                path.move_to(pt);
            }
            typ => push_segment(&mut path, &mut pending, typ, pt),
        }
    }

    // an open contour ends at its last point
    if !matches!(first.typ, PointType::Move) {
        push_segment(&mut path, &mut pending, &first.typ, first_pt);
        path.close_path();
    }

    path
}

fn implied_quadratic_loop(points: &[ContourPoint]) -> BezPath {
    let mut path = BezPath::new();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return path;
    };
    let start = Point::new(last.x, last.y).midpoint(Point::new(first.x, first.y));
    let mut pending: Vec<Point> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
    path.move_to(start);
    push_segment(&mut path, &mut pending, &PointType::QCurve, start);
    path.close_path();
    path
}

fn push_segment(path: &mut BezPath, pending: &mut Vec<Point>, typ: &PointType, pt: Point) {
    match (typ, pending.len()) {
        (_, 0) => path.line_to(pt),
        (PointType::Curve, 1) => path.quad_to(pending[0], pt),
        (PointType::Curve, n) => path.curve_to(pending[n - 2], pending[n - 1], pt),
        (PointType::QCurve, n) => {
            // implied on-curve points sit halfway between off-curves
            for i in 0..n {
                let cp = pending[i];
                let end = if i == n - 1 {
                    pt
                } else {
                    cp.midpoint(pending[i + 1])
                };
                path.quad_to(cp, end);
            }
        }
        _ => path.line_to(pt),
    }
    pending.clear();
}

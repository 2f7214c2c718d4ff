//! Bounding boxes of document elements in root user units.

use kurbo::{Affine, BezPath, Point, Rect, Shape};
use roxmltree::Node;
use tracing::warn;

use super::units::{first_number, number_list, parse_length};

/// Parse an SVG `transform` list, composing left to right.
pub fn parse_transform(value: &str) -> Affine {
    let mut total = Affine::IDENTITY;
    let mut rest = value.trim();
    while let Some(open) = rest.find('(') {
        let name = rest[..open].trim().trim_start_matches(',').trim();
        let Some(close) = rest[open..].find(')') else { break };
        let args = number_list(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];

        let t = match (name, args.as_slice()) {
            ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
            ("translate", [tx]) => Affine::translate((*tx, 0.0)),
            ("translate", [tx, ty]) => Affine::translate((*tx, *ty)),
            ("scale", [s]) => Affine::scale(*s),
            ("scale", [sx, sy]) => Affine::scale_non_uniform(*sx, *sy),
            ("rotate", [a]) => Affine::rotate(a.to_radians()),
            ("rotate", [a, cx, cy]) => {
                Affine::translate((*cx, *cy)) * Affine::rotate(a.to_radians()) * Affine::translate((-cx, -cy))
            }
            ("skewX", [a]) => Affine::new([1.0, 0.0, a.to_radians().tan(), 1.0, 0.0, 0.0]),
            ("skewY", [a]) => Affine::new([1.0, a.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]),
            _ => {
                warn!("Ignoring unsupported transform: {}({:?})", name, args);
                Affine::IDENTITY
            }
        };
        total = total * t;
    }
    total
}

fn own_transform(node: Node) -> Affine {
    node.attribute("transform").map(parse_transform).unwrap_or(Affine::IDENTITY)
}

fn num(node: Node, name: &str) -> Option<f64> {
    node.attribute(name).and_then(first_number)
}

fn num_or_zero(node: Node, name: &str) -> f64 {
    num(node, name).unwrap_or(0.0)
}

/// Bounding box in the parent's coordinate system (own transform applied).
pub fn local_bbox(node: Node) -> Option<Rect> {
    if !node.is_element() {
        return None;
    }
    let shape = match node.tag_name().name() {
        "rect" | "image" | "foreignObject" | "use" => {
            let width = node.attribute("width").and_then(parse_length)?;
            let height = node.attribute("height").and_then(parse_length)?;
            Some(Rect::from_origin_size(
                (num_or_zero(node, "x"), num_or_zero(node, "y")),
                (width, height),
            ))
        }
        "circle" => {
            let r = num(node, "r")?;
            let (cx, cy) = (num_or_zero(node, "cx"), num_or_zero(node, "cy"));
            Some(Rect::new(cx - r, cy - r, cx + r, cy + r))
        }
        "ellipse" => {
            let (rx, ry) = (num(node, "rx")?, num(node, "ry")?);
            let (cx, cy) = (num_or_zero(node, "cx"), num_or_zero(node, "cy"));
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        "line" => Some(Rect::from_points(
            Point::new(num_or_zero(node, "x1"), num_or_zero(node, "y1")),
            Point::new(num_or_zero(node, "x2"), num_or_zero(node, "y2")),
        )),
        "polyline" | "polygon" => {
            let coords = number_list(node.attribute("points")?);
            points_bbox(coords.chunks_exact(2).map(|p| Point::new(p[0], p[1])))
        }
        "path" => {
            let path = BezPath::from_svg(node.attribute("d")?).ok()?;
            if path.elements().is_empty() {
                None
            } else {
                Some(path.bounding_box())
            }
        }
        "text" => {
            let at = Point::new(num_or_zero(node, "x"), num_or_zero(node, "y"));
            Some(Rect::from_points(at, at))
        }
        "g" | "a" | "switch" | "svg" => node
            .children()
            .filter_map(local_bbox)
            .reduce(|acc, r| acc.union(r)),
        _ => None,
    }?;
    Some(own_transform(node).transform_rect_bbox(shape))
}

fn points_bbox(mut points: impl Iterator<Item = Point>) -> Option<Rect> {
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p)))
}

/// Bounding box in root user units: the element's own box mapped through
/// every ancestor transform below the root element.
pub fn document_bbox(node: Node) -> Option<Rect> {
    let local = local_bbox(node)?;
    let mut to_root = Affine::IDENTITY;
    for ancestor in node.ancestors().skip(1) {
        if !ancestor.is_element() || ancestor.parent_element().is_none() {
            break;
        }
        to_root = own_transform(ancestor) * to_root;
    }
    Some(to_root.transform_rect_bbox(local))
}

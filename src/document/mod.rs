//! The host Inkscape document: size, unit scale, active layer, selection,
//! and append-only insertion.
//!
//! The document is kept as source text. New markup is spliced in just before
//! the active layer's closing tag, so existing content is never rewritten.

use std::collections::{HashMap, HashSet};

use kurbo::{Point, Rect};
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

use crate::error::{PlotError, PlotResult};

pub mod geometry;
pub mod units;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
pub const SODIPODI_NS: &str = "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd";

/// Size used when the root has neither `viewBox` nor absolute dimensions.
const FALLBACK_SIZE: (f64, f64) = (300.0, 150.0);

/// What placement needs to know about the document.
pub trait DocumentMetrics {
    /// Document size in user units.
    fn size(&self) -> (f64, f64);
    /// Convert CSS pixels to user units.
    fn px_to_user(&self, px: f64) -> f64;
    /// Center of the first selected element that has a bounding box.
    fn selection_center(&self) -> Option<Point>;
}

pub(crate) fn parse_svg(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    // matplotlib writes a DOCTYPE
    let opts = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
    Document::parse_with_options(text, opts)
}

#[derive(Debug, Clone)]
enum LayerEnd {
    /// Byte offset of the layer's `</...>` tag.
    Closing(usize),
    /// Layer written as `<g .../>`: offset of `/>` and the qualified name.
    SelfClosing { slash: usize, qname: String },
}

#[derive(Debug, Clone)]
pub struct HostDocument {
    source: String,
    size: (f64, f64),
    px_per_user: f64,
    layer_id: Option<String>,
    layer_end: LayerEnd,
    ids: HashSet<String>,
    /// Namespace URI → prefix, as declared on the root element.
    root_namespaces: HashMap<String, String>,
    selection: Vec<Rect>,
}

impl HostDocument {
    /// Parse the document and measure the selected elements (`--id` values).
    pub fn parse(source: String, selected: &[String]) -> PlotResult<Self> {
        let (size, px_per_user, layer_id, layer_end, ids, root_namespaces, selection) = {
            let doc = parse_svg(&source).map_err(|e| PlotError::document(e.to_string()))?;
            let root = doc.root_element();

            let (size, px_per_user) = measure(root);
            debug!(?size, px_per_user, "document geometry");

            let ids: HashSet<String> = doc
                .descendants()
                .filter_map(|n| n.attribute("id"))
                .map(str::to_string)
                .collect();

            let root_namespaces: HashMap<String, String> = root
                .namespaces()
                .filter_map(|ns| ns.name().map(|prefix| (ns.uri().to_string(), prefix.to_string())))
                .collect();

            let layer = active_layer(&doc);
            let layer_id = layer.attribute("id").map(str::to_string);
            let end = find_layer_end(&source, layer).map_err(PlotError::document)?;
            debug!(layer = ?layer_id, "active layer");

            let selection: Vec<Rect> = selected
                .iter()
                .filter_map(|id| {
                    let node = doc.descendants().find(|n| n.attribute("id") == Some(id.as_str()));
                    if node.is_none() {
                        warn!("Selected id not found in document: {}", id);
                    }
                    node.and_then(geometry::document_bbox)
                })
                .collect();

            (size, px_per_user, layer_id, end, ids, root_namespaces, selection)
        };

        Ok(Self { source, size, px_per_user, layer_id, layer_end, ids, root_namespaces, selection })
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    /// Prefix the root binds to `uri`, if any.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.root_namespaces.get(uri).map(String::as_str)
    }

    /// An id not yet used in the document, `<prefix><n>`; reserved on return.
    pub fn unique_id(&mut self, prefix: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", prefix, n);
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Append markup as the last child of the active layer.
    pub fn append_to_layer(&mut self, markup: &str) {
        match self.layer_end.clone() {
            LayerEnd::Closing(at) => {
                self.source.insert_str(at, markup);
                self.layer_end = LayerEnd::Closing(at + markup.len());
            }
            LayerEnd::SelfClosing { slash, qname } => {
                let replacement = format!(">{}</{}>", markup, qname);
                self.source.replace_range(slash..slash + 2, &replacement);
                self.layer_end = LayerEnd::Closing(slash + 1 + markup.len());
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }
}

impl DocumentMetrics for HostDocument {
    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn px_to_user(&self, px: f64) -> f64 {
        px / self.px_per_user
    }

    fn selection_center(&self) -> Option<Point> {
        self.selection.first().map(|r| r.center())
    }
}

/// Size in user units and how many px one user unit spans.
fn measure(root: Node) -> ((f64, f64), f64) {
    let width = root.attribute("width").and_then(units::parse_length);
    let height = root.attribute("height").and_then(units::parse_length);
    let view_box = root
        .attribute("viewBox")
        .map(units::number_list)
        .filter(|v| v.len() == 4 && v[2] > 0.0 && v[3] > 0.0);

    match (view_box, width) {
        (Some(vb), Some(w)) => ((vb[2], vb[3]), w / vb[2]),
        (Some(vb), None) => ((vb[2], vb[3]), 1.0),
        (None, _) => {
            let size = (width.unwrap_or(FALLBACK_SIZE.0), height.unwrap_or(FALLBACK_SIZE.1));
            (size, 1.0)
        }
    }
}

fn is_layer(node: Node) -> bool {
    node.is_element()
        && node.has_tag_name((SVG_NS, "g"))
        && node.attribute((INKSCAPE_NS, "groupmode")) == Some("layer")
}

/// `sodipodi:namedview/@inkscape:current-layer`, else the last top-level
/// layer, else the root.
fn active_layer<'a, 'input>(doc: &'a Document<'input>) -> Node<'a, 'input> {
    let root = doc.root_element();
    let current = doc
        .descendants()
        .find(|n| n.has_tag_name((SODIPODI_NS, "namedview")))
        .and_then(|nv| nv.attribute((INKSCAPE_NS, "current-layer")))
        .and_then(|id| doc.descendants().find(|n| n.attribute("id") == Some(id)))
        .filter(|n| n.has_tag_name((SVG_NS, "g")));

    current
        .or_else(|| root.children().filter(|n| is_layer(*n)).last())
        .unwrap_or(root)
}

fn find_layer_end(source: &str, layer: Node) -> Result<LayerEnd, String> {
    let range = layer.range();
    let text = &source[range.clone()];
    if text.ends_with("/>") && !layer.has_children() {
        let qname: String = text[1..]
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
            .collect();
        return Ok(LayerEnd::SelfClosing { slash: range.end - 2, qname });
    }
    text.rfind("</")
        .map(|at| LayerEnd::Closing(range.start + at))
        .ok_or_else(|| "active layer has no closing tag".to_string())
}

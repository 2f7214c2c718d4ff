//! Figure insertion: vector artifacts become a group of their elements,
//! everything else an `<image>`.

use std::{fmt::Write as _, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info, warn};

use crate::{
    document::{parse_svg, HostDocument, XLINK_NS},
    error::{PlotError, PlotResult},
    settings::{OutputFormat, RenderConfig},
};

mod placement;

pub use placement::{calculate_position, calculate_size, place, Placement};

/// What was appended to the active layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Inserted {
    /// Vector import: a group holding `elements` copied children.
    Group { elements: usize },
    /// Raster (or fallback) image, embedded as a data URI or linked.
    Image { embedded: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertReport {
    pub id: String,
    pub inserted: Inserted,
    pub placement: Placement,
}

impl InsertReport {
    /// True when the document points at the artifact on disk.
    pub fn links_artifact(&self) -> bool {
        self.inserted == Inserted::Image { embedded: false }
    }
}

/// Read the artifact and append it to the document's active layer.
pub fn insert_figure(doc: &mut HostDocument, artifact: &Path, cfg: &RenderConfig) -> PlotResult<InsertReport> {
    info!("Inserting figure from: {}", artifact.display());
    let bytes = std::fs::read(artifact).map_err(|e| {
        PlotError::artifact_read(format!("Failed to read figure file: {}", e))
    })?;
    debug!("Read {} bytes from figure file", bytes.len());

    let format = cfg.figure.output_format;
    match sniff_format(&bytes) {
        Some(found) if found != format => {
            warn!("Figure file looks like {} but {} was requested", found, format)
        }
        None => warn!("Could not recognise figure file contents"),
        _ => {}
    }

    let placement = place(&cfg.figure, &cfg.placement, &*doc);
    let (w, h) = (placement.size.width, placement.size.height);
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(PlotError::insertion(format!(
            "Invalid figure size {} x {}",
            w, h
        )));
    }

    if format == OutputFormat::Svg {
        match vector_group(doc, &bytes, &placement, cfg.placement.scale_factor) {
            Ok((markup, id, elements)) => {
                doc.append_to_layer(&markup);
                info!("Imported {} elements from SVG into group {}", elements, id);
                return Ok(InsertReport { id, inserted: Inserted::Group { elements }, placement });
            }
            Err(e) => warn!("Failed to import SVG directly: {}", e),
        }
    }

    let embedded = cfg.placement.embed_image;
    let href = if embedded {
        info!("Embedding image as data URI ({})", format.mime_type());
        format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(&bytes))
    } else {
        info!("Linking to external file: {}", artifact.display());
        artifact.to_string_lossy().into_owned()
    };

    let id = doc.unique_id("matplotlib-figure");
    let markup = image_element(doc, &id, &href, &placement);
    doc.append_to_layer(&markup);
    info!("Image element added to current layer");
    Ok(InsertReport { id, inserted: Inserted::Image { embedded }, placement })
}

/// Wrap the artifact root's element children in a translated group.
///
/// Only the translate and scale are in host user units. The copied children
/// keep the artifact's own user space (pt for matplotlib output) with no
/// viewBox or unit conversion, so on documents whose user unit is not the
/// pt the drawn figure size differs from the computed placement size.
fn vector_group(
    doc: &mut HostDocument,
    bytes: &[u8],
    placement: &Placement,
    scale: f64,
) -> Result<(String, String, usize), String> {
    let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
    let artifact = parse_svg(text).map_err(|e| e.to_string())?;
    let root = artifact.root_element();
    if root.tag_name().name() != "svg" {
        return Err(format!("root element is <{}>, not <svg>", root.tag_name().name()));
    }

    let id = doc.unique_id("matplotlib-svg");
    let mut transform = format!("translate({}, {})", placement.origin.x, placement.origin.y);
    if scale != 1.0 {
        let _ = write!(transform, " scale({})", scale);
    }

    let mut markup = format!(r#"<g id="{}" transform="{}""#, escape_attr(&id), escape_attr(&transform));
    for ns in root.namespaces() {
        let (Some(prefix), uri) = (ns.name(), ns.uri()) else { continue };
        if prefix == "xml" || doc.prefix_for(uri) == Some(prefix) {
            continue;
        }
        let _ = write!(markup, r#" xmlns:{}="{}""#, prefix, escape_attr(uri));
    }
    markup.push('>');

    let mut elements = 0;
    for child in root.children().filter(|n| n.is_element()) {
        markup.push_str(&text[child.range()]);
        elements += 1;
    }
    markup.push_str("</g>");
    Ok((markup, id, elements))
}

fn image_element(doc: &HostDocument, id: &str, href: &str, placement: &Placement) -> String {
    let (href_attr, declare) = match doc.prefix_for(XLINK_NS) {
        Some(prefix) => (format!("{}:href", prefix), String::new()),
        None => ("xlink:href".to_string(), format!(r#" xmlns:xlink="{}""#, XLINK_NS)),
    };
    format!(
        r#"<image id="{}"{} {}="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet"/>"#,
        escape_attr(id),
        declare,
        href_attr,
        escape_attr(href),
        placement.origin.x,
        placement.origin.y,
        placement.size.width,
        placement.size.height,
    )
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

/// Guess the artifact format from its leading bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<OutputFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(OutputFormat::Png);
    }
    if bytes.starts_with(b"%PDF") {
        return Some(OutputFormat::Pdf);
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(OutputFormat::Jpg);
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    if head.contains("<svg") {
        return Some(OutputFormat::Svg);
    }
    None
}

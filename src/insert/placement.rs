use kurbo::{Point, Size};
use tracing::{debug, info};

use crate::{
    document::DocumentMetrics,
    settings::{FigureOptions, PlacementOptions, PositionMode},
};

/// Where the figure lands, in document user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub origin: Point,
    pub size: Size,
}

/// Figure inches × DPI × scale, converted from px to user units.
pub fn calculate_size(figure: &FigureOptions, scale: f64, doc: &impl DocumentMetrics) -> Size {
    let dpi = f64::from(figure.dpi);
    let width_px = figure.width * dpi * scale;
    let height_px = figure.height * dpi * scale;
    let size = Size::new(doc.px_to_user(width_px), doc.px_to_user(height_px));

    info!(
        "Figure size: {}\" x {}\" @ {} DPI (scale: {})",
        figure.width, figure.height, figure.dpi, scale
    );
    debug!("Pixel size: {} x {} px, document units: {} x {}", width_px, height_px, size.width, size.height);
    size
}

pub fn calculate_position(opts: &PlacementOptions, size: Size, doc: &impl DocumentMetrics) -> Point {
    let (doc_w, doc_h) = doc.size();
    let center_x = (doc_w - size.width) / 2.0;
    let center_y = (doc_h - size.height) / 2.0;
    let right = doc_w - size.width;
    let bottom = doc_h - size.height;

    let (x, y) = match opts.mode {
        PositionMode::Custom => (opts.custom_x, opts.custom_y),
        PositionMode::Center => (center_x, center_y),
        PositionMode::TopLeft => (0.0, 0.0),
        PositionMode::TopCenter => (center_x, 0.0),
        PositionMode::TopRight => (right, 0.0),
        PositionMode::MiddleLeft => (0.0, center_y),
        PositionMode::MiddleRight => (right, center_y),
        PositionMode::BottomLeft => (0.0, bottom),
        PositionMode::BottomCenter => (center_x, bottom),
        PositionMode::BottomRight => (right, bottom),
        PositionMode::Cursor => match doc.selection_center() {
            Some(c) => {
                info!("Using selected object position");
                debug!(x = c.x, y = c.y, "bbox center");
                (c.x - size.width / 2.0, c.y - size.height / 2.0)
            }
            None => (center_x, center_y),
        },
    };
    Point::new(x, y)
}

pub fn place(figure: &FigureOptions, opts: &PlacementOptions, doc: &impl DocumentMetrics) -> Placement {
    let size = calculate_size(figure, opts.scale_factor, doc);
    let origin = calculate_position(opts, size, doc);
    debug!(x = origin.x, y = origin.y, w = size.width, h = size.height, "placement");
    Placement { origin, size }
}

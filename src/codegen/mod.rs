//! Program generation: configuration + user code → one runnable Python file.
//!
//! Everything here is pure text generation; nothing is executed. The only
//! input that changes between otherwise identical runs is the artifact path,
//! which callers pass in.

use std::path::Path;

use tracing::debug;

use crate::{
    error::{PlotError, PlotResult},
    settings::RenderConfig,
};

pub mod columns;
pub mod data;
pub mod postamble;
pub mod preamble;
pub mod source;

pub use columns::{parse_column_indices, render_column_indices};
pub use postamble::temp_output_path;
pub use preamble::creates_own_figure;
pub use source::resolve_user_code;

/// The generated program, kept as its ordered sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub preamble: Vec<String>,
    pub data: Vec<String>,
    pub user: Vec<String>,
    pub postamble: Vec<String>,
}

impl Program {
    pub fn text(&self) -> String {
        self.preamble
            .iter()
            .chain(&self.data)
            .chain(&self.user)
            .chain(&self.postamble)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Assemble the program. `include_data` gates the data-loading section so
/// the caller decides whether the data file is actually present.
pub fn assemble(
    cfg: &RenderConfig,
    user_code: &str,
    include_data: bool,
    output_path: &Path,
) -> PlotResult<Program> {
    if user_code.trim().is_empty() {
        return Err(PlotError::resolution("No code provided."));
    }

    let preamble = if cfg.preamble.use_preamble {
        preamble::preamble(cfg, user_code)
    } else {
        let mut minimal = if cfg.preamble.auto_imports { preamble::minimal_imports() } else { Vec::new() };
        minimal.push(String::new());
        minimal
    };

    let data = match (&cfg.data, include_data) {
        (Some(source), true) => {
            debug!("Loading data from: {}", source.path.display());
            let mut section = vec!["# Load data".to_string()];
            // minimal mode has no pandas/json imports of its own
            if !cfg.preamble.use_preamble {
                section.extend(data::data_imports(source));
            }
            section.push(data::data_loading_code(source));
            section.push(String::new());
            section
        }
        _ => Vec::new(),
    };

    let user = vec!["# User code".to_string(), user_code.to_string(), String::new()];

    Ok(Program { preamble, data, user, postamble: postamble::postamble(cfg, output_path) })
}

#[cfg(test)]
pub(crate) fn test_config() -> RenderConfig {
    use crate::settings::*;

    RenderConfig {
        python_path: "python".into(),
        script: ScriptSource::Inline(String::new()),
        preamble: PreambleOptions {
            use_preamble: true,
            auto_imports: true,
            custom_preamble: String::new(),
            additional_imports: String::new(),
        },
        figure: FigureOptions {
            output_format: OutputFormat::Svg,
            width: 8.0,
            height: 6.0,
            dpi: 96,
            transparent: false,
            tight_layout: true,
            constrained_layout: false,
            auto_create_figure: true,
            subplot_rows: 1,
            subplot_cols: 1,
            share_x: false,
            share_y: false,
        },
        style: StyleOptions {
            plot_style: "default".into(),
            color_map: "viridis".into(),
            grid: true,
            legend: true,
            legend_position: "best".into(),
            font_family: "sans-serif".into(),
            font_size: 10,
            title_size: 14,
            label_size: 12,
            line_width: 1.5,
            marker_size: 6.0,
            use_latex: false,
            color_cycle: "default".into(),
            background_color: "white".into(),
            grid_style: "--".into(),
            grid_alpha: 0.3,
            auto_despine: false,
        },
        placement: PlacementOptions {
            mode: PositionMode::Center,
            custom_x: 0.0,
            custom_y: 0.0,
            embed_image: true,
            scale_factor: 1.0,
        },
        data: None,
        error_mode: ErrorMode::Stop,
        show_warnings: true,
        save_script: None,
        keep_temp_files: false,
    }
}

#[cfg(test)]
pub(crate) fn test_data_source() -> crate::settings::DataSource {
    use crate::settings::*;

    DataSource {
        path: "/data/values.csv".into(),
        format: DataFormat::Csv,
        delimiter: ",".into(),
        header_row: Some(0),
        x_columns: "0".into(),
        y_columns: "1".into(),
        column_names: Vec::new(),
        load_all_columns: false,
        date_columns: String::new(),
        date_format: "%Y-%m-%d".into(),
    }
}

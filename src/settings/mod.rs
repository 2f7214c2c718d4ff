//! The render configuration: every form option for one invocation, typed.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::Serialize;
use tracing::warn;

use crate::{cli::Cli, config::Config};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScriptSource {
    Inline(String),
    File(PathBuf),
    Bank { category: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
    Jpg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Jpg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
            Self::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            other => Err(format!("unsupported output format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Excel,
    Json,
    Text,
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" | "xls" => Ok(Self::Excel),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unsupported data format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    Custom,
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Cursor,
}

impl PositionMode {
    /// Unknown names place the figure at the document center.
    pub fn parse_or_center(s: &str) -> Self {
        match s.trim() {
            "custom" => Self::Custom,
            "center" => Self::Center,
            "top_left" => Self::TopLeft,
            "top_center" => Self::TopCenter,
            "top_right" => Self::TopRight,
            "middle_left" => Self::MiddleLeft,
            "middle_right" => Self::MiddleRight,
            "bottom_left" => Self::BottomLeft,
            "bottom_center" => Self::BottomCenter,
            "bottom_right" => Self::BottomRight,
            "cursor" => Self::Cursor,
            other => {
                warn!("Unknown position mode '{}', using center", other);
                Self::Center
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    Stop,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreambleOptions {
    pub use_preamble: bool,
    pub auto_imports: bool,
    pub custom_preamble: String,
    pub additional_imports: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureOptions {
    pub output_format: OutputFormat,
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
    pub transparent: bool,
    pub tight_layout: bool,
    pub constrained_layout: bool,
    pub auto_create_figure: bool,
    pub subplot_rows: u32,
    pub subplot_cols: u32,
    pub share_x: bool,
    pub share_y: bool,
}

impl FigureOptions {
    /// `tight_layout` is skipped whenever constrained layout owns the figure.
    pub fn uses_tight_layout(&self) -> bool {
        self.tight_layout && !self.constrained_layout
    }

    pub fn is_grid(&self) -> bool {
        self.subplot_rows > 1 || self.subplot_cols > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleOptions {
    pub plot_style: String,
    pub color_map: String,
    pub grid: bool,
    pub legend: bool,
    pub legend_position: String,
    pub font_family: String,
    pub font_size: u32,
    pub title_size: u32,
    pub label_size: u32,
    pub line_width: f64,
    pub marker_size: f64,
    pub use_latex: bool,
    pub color_cycle: String,
    pub background_color: String,
    pub grid_style: String,
    pub grid_alpha: f64,
    pub auto_despine: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementOptions {
    pub mode: PositionMode,
    pub custom_x: f64,
    pub custom_y: f64,
    pub embed_image: bool,
    pub scale_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSource {
    pub path: PathBuf,
    pub format: DataFormat,
    pub delimiter: String,
    /// `Some(row)` when the file has a header at that row.
    pub header_row: Option<u32>,
    pub x_columns: String,
    pub y_columns: String,
    pub column_names: Vec<String>,
    pub load_all_columns: bool,
    pub date_columns: String,
    pub date_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderConfig {
    pub python_path: String,
    pub script: ScriptSource,
    pub preamble: PreambleOptions,
    pub figure: FigureOptions,
    pub style: StyleOptions,
    pub placement: PlacementOptions,
    pub data: Option<DataSource>,
    pub error_mode: ErrorMode,
    pub show_warnings: bool,
    pub save_script: Option<PathBuf>,
    pub keep_temp_files: bool,
}

impl RenderConfig {
    pub fn from_cli(cli: &Cli, cfg: &Config) -> anyhow::Result<Self> {
        for (name, value) in [
            ("figure_width", cli.figure_width),
            ("figure_height", cli.figure_height),
            ("line_width", cli.line_width),
            ("marker_size", cli.marker_size),
            ("grid_alpha", cli.grid_alpha),
            ("custom_x", cli.custom_x),
            ("custom_y", cli.custom_y),
            ("scale_factor", cli.scale_factor),
        ] {
            anyhow::ensure!(value.is_finite(), "{} must be a finite number, got {}", name, value);
        }

        let script = match cli.script_source.trim() {
            "file" => ScriptSource::File(PathBuf::from(&cli.script_file)),
            "bank" => ScriptSource::Bank {
                category: cli.bank_category.clone(),
                name: cli.bank_script.clone(),
            },
            _ => ScriptSource::Inline(cli.script_code.clone()),
        };

        let output_format = cli
            .output_format
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)?;

        let data = if cli.use_data_file {
            let format = cli.data_format.parse::<DataFormat>().unwrap_or_else(|e| {
                warn!("{}, treating as text", e);
                DataFormat::Text
            });
            Some(DataSource {
                path: PathBuf::from(&cli.data_file_path),
                format,
                delimiter: cli.csv_delimiter.clone(),
                header_row: cli.skip_header.then_some(cli.header_row),
                x_columns: cli.x_columns.clone(),
                y_columns: cli.y_columns.clone(),
                column_names: split_names(&cli.column_names),
                load_all_columns: cli.load_all_columns,
                date_columns: cli.date_columns.clone(),
                date_format: cli.date_format.clone(),
            })
        } else {
            None
        };

        let error_mode = if cli.error_handling.trim() == "warn" { ErrorMode::Warn } else { ErrorMode::Stop };

        let save_script = (cli.save_script && !cli.script_save_path.trim().is_empty())
            .then(|| PathBuf::from(&cli.script_save_path));

        Ok(Self {
            python_path: cli.python_path.clone().unwrap_or_else(|| cfg.python()),
            script,
            preamble: PreambleOptions {
                use_preamble: cli.use_preamble,
                auto_imports: cli.auto_imports,
                custom_preamble: cli.custom_preamble.clone(),
                additional_imports: cli.additional_imports.clone(),
            },
            figure: FigureOptions {
                output_format,
                width: cli.figure_width,
                height: cli.figure_height,
                dpi: cli.dpi,
                transparent: cli.transparent,
                tight_layout: cli.tight_layout,
                constrained_layout: cli.constrained_layout,
                auto_create_figure: cli.auto_create_figure,
                subplot_rows: cli.subplot_rows,
                subplot_cols: cli.subplot_cols,
                share_x: cli.share_x,
                share_y: cli.share_y,
            },
            style: StyleOptions {
                plot_style: cli.plot_style.clone(),
                color_map: cli.color_map.clone(),
                grid: cli.grid,
                legend: cli.legend,
                legend_position: cli.legend_position.clone(),
                font_family: cli.font_family.clone(),
                font_size: cli.font_size,
                title_size: cli.title_size,
                label_size: cli.label_size,
                line_width: cli.line_width,
                marker_size: cli.marker_size,
                use_latex: cli.use_latex,
                color_cycle: cli.color_cycle.clone(),
                background_color: cli.background_color.clone(),
                grid_style: cli.grid_style.clone(),
                grid_alpha: cli.grid_alpha,
                auto_despine: cli.auto_despine,
            },
            placement: PlacementOptions {
                mode: PositionMode::parse_or_center(&cli.position_mode),
                custom_x: cli.custom_x,
                custom_y: cli.custom_y,
                embed_image: cli.embed_image,
                scale_factor: cli.scale_factor,
            },
            data,
            error_mode,
            show_warnings: cli.show_warnings,
            save_script,
            keep_temp_files: cli.keep_temp_files,
        })
    }
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

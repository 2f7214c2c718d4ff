use std::path::PathBuf;

use clap::{builder::BoolishValueParser, ArgAction, Parser};

/// Inkscape passes every form field as `--name=value`; booleans arrive as
/// the strings `true`/`false`.
#[derive(Parser, Debug, Clone)]
#[command(name = "plt-ink", about = "Render a matplotlib figure into an Inkscape document", version)]
pub struct Cli {
    /// SVG document to modify; read from stdin when omitted.
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: Option<PathBuf>,

    /// Write the resulting document here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Ids of the selected objects (repeatable).
    #[arg(long = "id", action = ArgAction::Append)]
    pub ids: Vec<String>,

    /// Active notebook tab (ignored).
    #[arg(long, default_value = "script")]
    pub tab: String,

    /// List the script bank and exit.
    #[arg(long = "list_bank")]
    pub list_bank: bool,

    /// Print the assembled program and exit without running it.
    #[arg(long = "dry_run")]
    pub dry_run: bool,

    // Script
    /// Python executable path.
    #[arg(long = "python_path")]
    pub python_path: Option<String>,
    /// Script source: inline, file or bank.
    #[arg(long = "script_source", default_value = "inline")]
    pub script_source: String,
    #[arg(long = "script_code", default_value = "")]
    pub script_code: String,
    #[arg(long = "script_file", default_value = "")]
    pub script_file: String,
    #[arg(long = "bank_category", default_value = "line_plots")]
    pub bank_category: String,
    #[arg(long = "bank_script", default_value = "basic_line")]
    pub bank_script: String,

    // Preamble
    #[arg(long = "use_preamble", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub use_preamble: bool,
    #[arg(long = "custom_preamble", default_value = "")]
    pub custom_preamble: String,
    #[arg(long = "auto_imports", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub auto_imports: bool,
    #[arg(long = "additional_imports", default_value = "")]
    pub additional_imports: String,

    // Format
    #[arg(long = "output_format", default_value = "svg")]
    pub output_format: String,
    /// Figure width in inches.
    #[arg(long = "figure_width", default_value_t = 8.0)]
    pub figure_width: f64,
    /// Figure height in inches.
    #[arg(long = "figure_height", default_value_t = 6.0)]
    pub figure_height: f64,
    #[arg(long, default_value_t = 96)]
    pub dpi: u32,
    #[arg(long, default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub transparent: bool,
    #[arg(long = "tight_layout", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub tight_layout: bool,

    // Style
    #[arg(long = "plot_style", default_value = "default")]
    pub plot_style: String,
    #[arg(long = "color_map", default_value = "viridis")]
    pub color_map: String,
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub grid: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub legend: bool,
    #[arg(long = "legend_position", default_value = "best")]
    pub legend_position: String,

    // Placement
    #[arg(long = "position_mode", default_value = "center")]
    pub position_mode: String,
    #[arg(long = "custom_x", default_value_t = 0.0, allow_negative_numbers = true)]
    pub custom_x: f64,
    #[arg(long = "custom_y", default_value_t = 0.0, allow_negative_numbers = true)]
    pub custom_y: f64,
    #[arg(long = "embed_image", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub embed_image: bool,
    #[arg(long = "scale_factor", default_value_t = 1.0)]
    pub scale_factor: f64,

    // Advanced
    #[arg(long = "font_family", default_value = "sans-serif")]
    pub font_family: String,
    #[arg(long = "font_size", default_value_t = 10)]
    pub font_size: u32,
    #[arg(long = "title_size", default_value_t = 14)]
    pub title_size: u32,
    #[arg(long = "label_size", default_value_t = 12)]
    pub label_size: u32,
    #[arg(long = "line_width", default_value_t = 1.5)]
    pub line_width: f64,
    #[arg(long = "marker_size", default_value_t = 6.0)]
    pub marker_size: f64,
    #[arg(long = "use_latex", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub use_latex: bool,
    #[arg(long = "save_script", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub save_script: bool,
    #[arg(long = "script_save_path", default_value = "")]
    pub script_save_path: String,
    #[arg(long = "keep_temp_files", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub keep_temp_files: bool,

    // Figure creation
    #[arg(long = "auto_create_figure", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub auto_create_figure: bool,
    #[arg(long = "subplot_rows", default_value_t = 1)]
    pub subplot_rows: u32,
    #[arg(long = "subplot_cols", default_value_t = 1)]
    pub subplot_cols: u32,
    #[arg(long = "share_x", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub share_x: bool,
    #[arg(long = "share_y", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub share_y: bool,

    // Data import
    #[arg(long = "use_data_file", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub use_data_file: bool,
    #[arg(long = "data_file_path", default_value = "")]
    pub data_file_path: String,
    /// csv, excel, json or text.
    #[arg(long = "data_format", default_value = "csv")]
    pub data_format: String,
    #[arg(long = "csv_delimiter", default_value = ",")]
    pub csv_delimiter: String,
    #[arg(long = "skip_header", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub skip_header: bool,
    /// Header row number (0-indexed).
    #[arg(long = "header_row", default_value_t = 0)]
    pub header_row: u32,
    /// X column indices, e.g. `0,2-4`.
    #[arg(long = "x_columns", default_value = "0")]
    pub x_columns: String,
    /// Y column indices, e.g. `1`.
    #[arg(long = "y_columns", default_value = "1")]
    pub y_columns: String,
    /// Column names to bind (comma-separated).
    #[arg(long = "column_names", default_value = "")]
    pub column_names: String,
    #[arg(long = "load_all_columns", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub load_all_columns: bool,
    #[arg(long = "date_columns", default_value = "")]
    pub date_columns: String,
    #[arg(long = "date_format", default_value = "%Y-%m-%d")]
    pub date_format: String,

    // Colour and style presets
    #[arg(long = "color_cycle", default_value = "default")]
    pub color_cycle: String,
    #[arg(long = "background_color", default_value = "white")]
    pub background_color: String,
    #[arg(long = "grid_style", default_value = "--", allow_hyphen_values = true)]
    pub grid_style: String,
    #[arg(long = "grid_alpha", default_value_t = 0.3)]
    pub grid_alpha: f64,

    // Error handling
    /// stop or warn.
    #[arg(long = "error_handling", default_value = "stop")]
    pub error_handling: String,
    #[arg(long = "show_warnings", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub show_warnings: bool,

    // Post-processing
    #[arg(long = "auto_despine", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub auto_despine: bool,
    #[arg(long = "constrained_layout", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub constrained_layout: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

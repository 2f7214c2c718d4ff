//! Leading program section: imports, rcParams, configuration variables,
//! helper functions and the automatic figure.

use tracing::{debug, info};

use crate::{
    settings::{DataFormat, ErrorMode, RenderConfig},
    utils::{py_bool, py_float, py_quote},
};

/// The six named colour cycles; other names leave the style's cycle alone.
const COLOR_CYCLES: &[(&str, &str)] = &[
    ("tab10", "tab10"),
    ("tab20", "tab20"),
    ("set1", "Set1"),
    ("set2", "Set2"),
    ("paired", "Paired"),
    ("dark2", "Dark2"),
];

/// Substring test for user code that builds its own figure.
///
/// This is a plain text search, not a parse: a match inside a comment or a
/// string literal still counts.
pub fn creates_own_figure(user_code: &str) -> bool {
    user_code.contains("plt.figure") || user_code.contains("plt.subplots")
}

/// Imports used when the preamble is disabled.
pub fn minimal_imports() -> Vec<String> {
    [
        "import matplotlib",
        "matplotlib.use('Agg')",
        "import matplotlib.pyplot as plt",
        "import numpy as np",
        "import random",
        "import scipy",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn preamble(cfg: &RenderConfig, user_code: &str) -> Vec<String> {
    let style = &cfg.style;
    let fig = &cfg.figure;
    let mut out: Vec<String> = Vec::new();

    if cfg.error_mode == ErrorMode::Warn {
        out.push("import warnings".into());
        if !cfg.show_warnings {
            out.push("warnings.filterwarnings('ignore')".into());
        }
        out.push(String::new());
    }

    if cfg.preamble.auto_imports {
        out.push("import matplotlib".into());
        out.push("matplotlib.use('Agg')  # Non-interactive backend".into());
        out.push("import matplotlib.pyplot as plt".into());
        out.push("import numpy as np".into());
        out.push("import os".into());
        out.push("from matplotlib import cm".into());
        out.push("from matplotlib.colors import Normalize".into());
    }

    if !cfg.preamble.additional_imports.is_empty() {
        out.push(String::new());
        out.push("# Additional imports".into());
        let additional = cfg.preamble.additional_imports.replace("\\n", "\n");
        out.extend(
            additional
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }

    if let Some(data) = &cfg.data {
        debug!("Adding data import libraries");
        out.push("import pandas as pd".into());
        if data.format == DataFormat::Json {
            out.push("import json".into());
        }
        if !data.date_columns.is_empty() {
            out.push("from datetime import datetime".into());
        }
    }

    out.push(String::new());

    if !cfg.preamble.custom_preamble.is_empty() {
        out.push("# Custom preamble".into());
        let custom = cfg.preamble.custom_preamble.replace("\\n", "\n");
        out.extend(custom.split('\n').map(str::to_string));
        out.push(String::new());
    }

    if style.plot_style != "default" {
        info!("Applying plot style: {}", style.plot_style);
        out.push(format!("plt.style.use('{}')", py_quote(&style.plot_style)));
    }

    out.push("# Configure matplotlib".into());
    out.push(format!("plt.rcParams['font.family'] = '{}'", py_quote(&style.font_family)));
    out.push(format!("plt.rcParams['font.size'] = {}", style.font_size));
    out.push(format!("plt.rcParams['axes.titlesize'] = {}", style.title_size));
    out.push(format!("plt.rcParams['axes.labelsize'] = {}", style.label_size));
    out.push(format!("plt.rcParams['lines.linewidth'] = {}", py_float(style.line_width)));
    out.push(format!("plt.rcParams['lines.markersize'] = {}", py_float(style.marker_size)));

    if style.background_color != "white" {
        let bg = py_quote(&style.background_color);
        out.push(format!("plt.rcParams['axes.facecolor'] = '{}'", bg));
        out.push(format!("plt.rcParams['figure.facecolor'] = '{}'", bg));
    }

    out.push(format!("plt.rcParams['grid.linestyle'] = '{}'", py_quote(&style.grid_style)));
    out.push(format!("plt.rcParams['grid.alpha'] = {}", py_float(style.grid_alpha)));

    if let Some((_, palette)) = COLOR_CYCLES.iter().find(|(name, _)| *name == style.color_cycle) {
        out.push(format!(
            "plt.rcParams['axes.prop_cycle'] = plt.cycler(color=plt.cm.{}.colors)",
            palette
        ));
    }

    if style.use_latex {
        out.push("plt.rcParams['text.usetex'] = True".into());
    }

    out.push(String::new());

    out.push("# Extension configuration (available to user scripts)".into());
    out.push(format!("_fig_width = {}", py_float(fig.width)));
    out.push(format!("_fig_height = {}", py_float(fig.height)));
    out.push(format!("_dpi = {}", fig.dpi));
    out.push(format!("_show_grid = {}", py_bool(style.grid)));
    out.push(format!("_show_legend = {}", py_bool(style.legend)));
    out.push(format!("_legend_position = '{}'", py_quote(&style.legend_position)));
    out.push(format!("_colormap = '{}'", py_quote(&style.color_map)));
    out.push(format!("_transparent = {}", py_bool(fig.transparent)));
    out.push(format!("_subplot_rows = {}", fig.subplot_rows));
    out.push(format!("_subplot_cols = {}", fig.subplot_cols));
    out.push(String::new());

    out.push("# Helper functions".into());
    out.push("def apply_style(ax=None):".into());
    out.push("    '''Apply common styling to axis.'''".into());
    out.push("    if ax is None:".into());
    out.push("        ax = plt.gca()".into());
    out.push(format!("    if {}:", py_bool(style.grid)));
    out.push(format!(
        "        ax.grid(True, alpha={}, linestyle='{}')",
        py_float(style.grid_alpha),
        py_quote(&style.grid_style)
    ));
    if style.auto_despine {
        out.push("    ax.spines['top'].set_visible(False)".into());
        out.push("    ax.spines['right'].set_visible(False)".into());
    }
    out.push(String::new());

    out.push("def get_cmap(name=None):".into());
    out.push("    '''Get colormap by name or default.'''".into());
    out.push(format!("    return plt.cm.get_cmap(name or '{}')", py_quote(&style.color_map)));
    out.push(String::new());

    if fig.auto_create_figure && !creates_own_figure(user_code) {
        debug!("Creating figure (user code doesn't create figure)");
        out.extend(figure_creation(cfg));
        out.push(String::new());
    }

    out
}

fn figure_creation(cfg: &RenderConfig) -> Vec<String> {
    let fig = &cfg.figure;
    let figsize = format!("figsize=({}, {})", py_float(fig.width), py_float(fig.height));
    let mut out = vec!["# Create figure".to_string()];

    if fig.is_grid() {
        let layout = if fig.constrained_layout { "'constrained'" } else { "None" };
        out.push(format!(
            "fig, axes = plt.subplots({}, {}, {}, sharex={}, sharey={}, layout={})",
            fig.subplot_rows,
            fig.subplot_cols,
            figsize,
            py_bool(fig.share_x),
            py_bool(fig.share_y),
            layout
        ));
        out.push("# Make 'ax' point to first axis for convenience".into());
        out.push("ax = axes.flat[0] if hasattr(axes, 'flat') else axes".into());
    } else {
        let layout = if fig.constrained_layout { ", layout='constrained'" } else { "" };
        out.push(format!("fig, ax = plt.subplots({}{})", figsize, layout));
    }
    out
}

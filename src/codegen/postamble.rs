//! Trailing program section: axis post-processing, save and sentinel.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::{
    execution::SENTINEL,
    settings::{OutputFormat, RenderConfig},
    utils::{py_bool, py_float, py_quote},
};

/// Fresh artifact path in the temp directory, unique per microsecond.
pub fn temp_output_path(format: OutputFormat) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
    std::env::temp_dir().join(format!("matplotlib_output_{}.{}", timestamp, format.extension()))
}

pub fn postamble(cfg: &RenderConfig, output_path: &Path) -> Vec<String> {
    let style = &cfg.style;
    let fig = &cfg.figure;
    let mut out: Vec<String> = Vec::new();

    if style.auto_despine {
        out.push("# Apply despine to all axes".into());
        out.push("for ax in plt.gcf().get_axes():".into());
        out.push("    ax.spines['top'].set_visible(False)".into());
        out.push("    ax.spines['right'].set_visible(False)".into());
        out.push(String::new());
    }

    if style.grid {
        out.push("# Apply grid to all axes".into());
        out.push("for ax in plt.gcf().get_axes():".into());
        out.push(format!(
            "    ax.grid(True, alpha={}, linestyle='{}')",
            py_float(style.grid_alpha),
            py_quote(&style.grid_style)
        ));
        out.push(String::new());
    }

    if fig.uses_tight_layout() {
        out.push("try:".into());
        out.push("    plt.tight_layout()".into());
        out.push("except Exception:".into());
        out.push("    pass  # tight_layout may fail with some configurations".into());
    }

    out.push(String::new());
    out.push("# Save figure".into());

    let mut save_params = vec![
        format!("format='{}'", fig.output_format),
        format!("dpi={}", fig.dpi),
        format!("transparent={}", py_bool(fig.transparent)),
    ];
    if fig.uses_tight_layout() {
        save_params.push("bbox_inches='tight'".into());
    }
    let save_params = save_params.join(", ");
    debug!(%save_params, output = %output_path.display(), "save step");

    out.push(format!("output_file = r'{}'", output_path.display()));
    out.push(format!("plt.savefig(output_file, {})", save_params));
    out.push("plt.close()".into());
    out.push(format!("print(f'{}{{output_file}}')", SENTINEL));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::test_config;

    #[test]
    fn save_step_ends_with_sentinel() {
        let cfg = test_config();
        let out = postamble(&cfg, Path::new("/tmp/fig.svg"));
        let n = out.len();
        assert_eq!(out[n - 4], "output_file = r'/tmp/fig.svg'");
        assert_eq!(
            out[n - 3],
            "plt.savefig(output_file, format='svg', dpi=96, transparent=False, bbox_inches='tight')"
        );
        assert_eq!(out[n - 2], "plt.close()");
        assert_eq!(out[n - 1], "print(f'SUCCESS:{output_file}')");
    }

    #[test]
    fn sections_keep_their_order() {
        let mut cfg = test_config();
        cfg.style.auto_despine = true;
        let text = postamble(&cfg, Path::new("/tmp/a.png")).join("\n");
        let despine = text.find("# Apply despine").unwrap();
        let grid = text.find("# Apply grid").unwrap();
        let layout = text.find("plt.tight_layout()").unwrap();
        let save = text.find("plt.savefig").unwrap();
        assert!(despine < grid && grid < layout && layout < save);
    }

    #[test]
    fn constrained_layout_skips_tight_layout() {
        let mut cfg = test_config();
        cfg.figure.constrained_layout = true;
        cfg.style.grid = false;
        cfg.figure.transparent = true;
        let text = postamble(&cfg, Path::new("/tmp/a.png")).join("\n");
        assert!(!text.contains("tight_layout"));
        assert!(!text.contains("bbox_inches"));
        assert!(!text.contains("ax.grid"));
        assert!(text.contains("transparent=True"));
    }

    #[test]
    fn temp_path_encodes_format() {
        let path = temp_output_path(OutputFormat::Png);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("matplotlib_output_"));
        assert!(name.ends_with(".png"));
        assert!(path.starts_with(std::env::temp_dir()));
    }
}

use std::io::Write;

use anyhow::Result;

use crate::bank::{BankCategory, ScriptBank};
use crate::config::Config;

pub struct BankHandler;

impl BankHandler {
    /// Print every category and its scripts, as `--bank_category`/`--bank_script` values.
    pub fn run(cfg: &Config, out: &mut impl Write) -> Result<()> {
        let bank = ScriptBank::from_config(cfg);
        let categories = bank.list()?;
        writeln!(out, "Script bank: {}", bank.root().display())?;
        write_listing(&categories, out)
    }
}

fn write_listing(categories: &[BankCategory], out: &mut impl Write) -> Result<()> {
    if categories.is_empty() {
        writeln!(out, "(empty)")?;
    }
    for cat in categories {
        writeln!(out, "\n{} [{}]", cat.display_name, cat.key)?;
        for name in &cat.scripts {
            writeln!(out, "  {}", name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_shows_keys_and_scripts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("line_plots")).unwrap();
        std::fs::write(dir.path().join("line_plots/basic_line.py"), "plt.plot([1])").unwrap();

        let mut cfg = Config::defaults();
        cfg.set("PLT_INK_SCRIPT_BANK", dir.path().to_string_lossy());
        let mut out = Vec::new();
        BankHandler::run(&cfg, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Line Plots [line_plots]\n  basic_line\n"));
    }

    #[test]
    fn empty_bank() {
        let mut out = Vec::new();
        write_listing(&[], &mut out).unwrap();
        assert_eq!(out, b"(empty)\n");
    }
}

use std::{fs, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::Result;
use clap::Parser;
use plt_ink::{
    cli::Cli,
    config::Config,
    document::HostDocument,
    error::PlotError,
    handlers::{RenderHandler, Rendered},
    insert::Inserted,
    process::{ProcessError, ProcessOutput, ProcessRunner},
    settings::RenderConfig,
};

const HOST: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd" width="210mm" height="297mm" viewBox="0 0 210 297">
  <sodipodi:namedview id="base" inkscape:current-layer="layer1"/>
  <g inkscape:groupmode="layer" id="layer1"><rect id="rect1" x="10" y="10" width="20" height="20"/></g>
</svg>"#;

const FIGURE_SVG: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns:xlink="http://www.w3.org/1999/xlink" width="460.8pt" height="345.6pt" viewBox="0 0 460.8 345.6" xmlns="http://www.w3.org/2000/svg" version="1.1">
 <defs><style type="text/css">*{stroke-linejoin: round}</style></defs>
 <g id="figure_1"><g id="patch_1"><path d="M 0 345.6 L 460.8 345.6 L 460.8 0 L 0 0 z"/></g></g>
</svg>
"#;

enum Behaviour {
    /// Write these bytes to the program's output file and report success.
    Draw(Vec<u8>),
    /// Exit 1 with this on stderr.
    Fail(&'static str),
}

/// Stands in for the interpreter: answers the environment checks and
/// "executes" programs by writing the file named in their save step.
struct FakePython {
    behaviour: Behaviour,
    calls: Mutex<Vec<Vec<String>>>,
    programs: Mutex<Vec<String>>,
}

impl FakePython {
    fn new(behaviour: Behaviour) -> Self {
        Self { behaviour, calls: Mutex::new(Vec::new()), programs: Mutex::new(Vec::new()) }
    }
}

fn reply(code: i32, stdout: &str, stderr: &str) -> ProcessOutput {
    ProcessOutput { code: Some(code), stdout: stdout.into(), stderr: stderr.into() }
}

fn output_file(program: &str) -> Option<PathBuf> {
    program
        .lines()
        .find_map(|l| l.strip_prefix("output_file = r'"))
        .and_then(|rest| rest.strip_suffix('\''))
        .map(PathBuf::from)
}

impl ProcessRunner for &FakePython {
    async fn run(&self, _program: &str, args: &[String], _limit: Duration) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(args.to_vec());
        match args.first().map(String::as_str) {
            Some("--version") => Ok(reply(0, "Python 3.11.4\n", "")),
            Some("-c") => Ok(reply(0, "3.8.0\n", "")),
            Some(script) => {
                let program = fs::read_to_string(script)?;
                self.programs.lock().unwrap().push(program.clone());
                match &self.behaviour {
                    Behaviour::Draw(bytes) => {
                        let path = output_file(&program).expect("program names its output file");
                        fs::write(&path, bytes)?;
                        Ok(reply(0, &format!("Loaded\nSUCCESS:{}\n", path.display()), ""))
                    }
                    Behaviour::Fail(stderr) => Ok(reply(1, "", stderr)),
                }
            }
            None => Ok(reply(2, "", "no arguments")),
        }
    }
}

fn options(args: &[&str]) -> RenderConfig {
    let mut argv = vec!["plt-ink"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    RenderConfig::from_cli(&cli, &Config::defaults()).unwrap()
}

fn host() -> HostDocument {
    HostDocument::parse(HOST.to_string(), &["rect1".to_string()]).unwrap()
}

#[tokio::test]
async fn svg_figure_is_imported_as_a_group() -> Result<()> {
    let python = FakePython::new(Behaviour::Draw(FIGURE_SVG.as_bytes().to_vec()));
    let render = options(&["--script_code=plt.plot([1, 2, 3])", "--position_mode=top_left"]);
    let mut doc = host();

    let outcome = RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, false).await?;
    let Rendered::Inserted(report) = outcome.rendered else { panic!("expected an insertion") };
    assert_eq!(report.inserted, Inserted::Group { elements: 2 });
    assert!(outcome.warnings.is_empty());

    let out = doc.into_string();
    let parsed = roxmltree::Document::parse(&out)?;
    let group = parsed.descendants().find(|n| n.attribute("id") == Some(report.id.as_str())).unwrap();
    assert_eq!(group.parent_element().and_then(|p| p.attribute("id")), Some("layer1"));
    assert_eq!(group.attribute("transform"), Some("translate(0, 0)"));
    assert!(out.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));

    // checks first, then exactly one program run
    let calls = python.calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], vec!["--version".to_string()]);

    let programs = python.programs.lock().unwrap();
    let program = &programs[0];
    assert!(program.contains("# User code\nplt.plot([1, 2, 3])"));
    assert!(program.trim_end().ends_with("print(f'SUCCESS:{output_file}')"));

    // the artifact is cleaned up after insertion
    let artifact = output_file(program).unwrap();
    assert!(!artifact.exists());
    Ok(())
}

#[tokio::test]
async fn png_is_embedded_and_centered_on_the_selection() -> Result<()> {
    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    let python = FakePython::new(Behaviour::Draw(png));
    let render = options(&[
        "--output_format=png",
        "--position_mode=cursor",
        "--figure_width=1",
        "--figure_height=1",
        "--dpi=96",
        "--script_code=plt.bar([1], [2])",
    ]);
    let mut doc = host();

    let outcome = RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, false).await?;
    let Rendered::Inserted(report) = outcome.rendered else { panic!("expected an insertion") };
    assert_eq!(report.inserted, Inserted::Image { embedded: true });

    let out = doc.into_string();
    let parsed = roxmltree::Document::parse(&out)?;
    let image = parsed.descendants().find(|n| n.has_tag_name("image")).unwrap();
    // one inch is 25.4 user units here; rect1 is centered on (20, 20)
    let x: f64 = image.attribute("x").unwrap().parse()?;
    let w: f64 = image.attribute("width").unwrap().parse()?;
    assert!((w - 25.4).abs() < 1e-9);
    assert!((x - (20.0 - 12.7)).abs() < 1e-9);
    assert!(image
        .attribute(("http://www.w3.org/1999/xlink", "href"))
        .unwrap()
        .starts_with("data:image/png;base64,iVBORw0KGgo"));
    Ok(())
}

#[tokio::test]
async fn script_error_in_warn_mode_is_a_warning() -> Result<()> {
    let python = FakePython::new(Behaviour::Fail("NameError: name 'undefined_thing' is not defined"));
    let render = options(&["--script_code=undefined_thing()", "--error_handling=warn"]);
    let mut doc = host();

    let err = RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, false).await.unwrap_err();
    assert!(err.is_warning());
    assert!(err.to_string().contains("NameError"));
    assert_eq!(doc.as_str(), HOST);
    Ok(())
}

#[tokio::test]
async fn script_error_in_stop_mode_is_terminal() -> Result<()> {
    let python = FakePython::new(Behaviour::Fail("Traceback: boom"));
    let render = options(&["--script_code=raise SystemExit(1)"]);
    let mut doc = host();

    let err = RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, false).await.unwrap_err();
    assert!(!err.is_warning());
    assert_eq!(err.to_string(), "Script execution failed:\nTraceback: boom");
    Ok(())
}

#[tokio::test]
async fn dry_run_prints_without_running_anything() -> Result<()> {
    let python = FakePython::new(Behaviour::Fail("should not run"));
    let render = options(&["--script_code=plt.plot([1])\\nplt.title('t')", "--use_preamble=false"]);
    let mut doc = host();

    let outcome = RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, true).await?;
    let Rendered::Program(program) = outcome.rendered else { panic!("expected the program") };
    assert!(program.starts_with("import matplotlib\nmatplotlib.use('Agg')"));
    assert!(program.contains("plt.plot([1])\nplt.title('t')"));
    assert!(python.calls.lock().unwrap().is_empty());
    assert_eq!(doc.as_str(), HOST);
    Ok(())
}

#[tokio::test]
async fn unwritable_save_path_warns_but_still_inserts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let python = FakePython::new(Behaviour::Draw(FIGURE_SVG.as_bytes().to_vec()));

    let saved = dir.path().join("figure.py");
    let render = options(&[
        "--script_code=plt.plot([3, 1])",
        "--save_script=true",
        &format!("--script_save_path={}", saved.display()),
    ]);
    let mut doc = host();
    RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, false).await?;
    assert!(fs::read_to_string(&saved)?.contains("plt.plot([3, 1])"));

    let missing = dir.path().join("no/such/dir/figure.py");
    let render = options(&[
        "--script_code=plt.plot([3, 1])",
        "--save_script=true",
        &format!("--script_save_path={}", missing.display()),
    ]);
    let mut doc = host();
    let outcome = RenderHandler::run(&python, &render, &Config::defaults(), &mut doc, false).await?;
    assert!(matches!(outcome.warnings.as_slice(), [PlotError::ScriptSave(_)]));
    assert!(matches!(outcome.rendered, Rendered::Inserted(_)));
    Ok(())
}

#[tokio::test]
async fn bank_scripts_resolve_through_the_configured_root() -> Result<()> {
    let bank = tempfile::tempdir()?;
    fs::create_dir_all(bank.path().join("line_plots"))?;
    fs::write(bank.path().join("line_plots/basic_line.py"), "plt.plot([5, 6])\n")?;
    let mut cfg = Config::defaults();
    cfg.set("PLT_INK_SCRIPT_BANK", bank.path().to_string_lossy());

    let python = FakePython::new(Behaviour::Draw(FIGURE_SVG.as_bytes().to_vec()));
    let render = options(&["--script_source=bank", "--bank_category=line_plots", "--bank_script=basic_line"]);
    let mut doc = host();
    RenderHandler::run(&python, &render, &cfg, &mut doc, false).await?;
    assert!(python.programs.lock().unwrap()[0].contains("plt.plot([5, 6])"));

    let render = options(&["--script_source=bank", "--bank_category=line_plots", "--bank_script=nope"]);
    let err = RenderHandler::run(&python, &render, &cfg, &mut host(), false).await.unwrap_err();
    assert!(matches!(err, PlotError::ScriptResolution(ref m) if m.starts_with("Bank script not found:")));
    Ok(())
}

#[tokio::test]
async fn data_file_feeds_the_data_section() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let csv = dir.path().join("points.csv");
    fs::write(&csv, "x,y\n1,2\n2,4\n")?;

    let python = FakePython::new(Behaviour::Draw(FIGURE_SVG.as_bytes().to_vec()));
    let render = options(&[
        "--script_code=plt.plot(x_data, y_data)",
        "--use_data_file=true",
        &format!("--data_file_path={}", csv.display()),
    ]);
    RenderHandler::run(&python, &render, &Config::defaults(), &mut host(), false).await?;
    let programs = python.programs.lock().unwrap();
    assert!(programs[0].contains("# Load data"));
    assert!(programs[0].contains("pd.read_csv"));

    // a missing file only drops the section
    let render = options(&[
        "--script_code=plt.plot([1])",
        "--use_data_file=true",
        "--data_file_path=/nonexistent/points.csv",
    ]);
    drop(programs);
    RenderHandler::run(&python, &render, &Config::defaults(), &mut host(), false).await?;
    assert!(!python.programs.lock().unwrap()[1].contains("# Load data"));
    Ok(())
}

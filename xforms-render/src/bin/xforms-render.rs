use std::env;
use std::fs;
use std::process;

use xforms_render::{render_to_string, ControlSnapshot, RenderConfig, RenderError};

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: xforms-render <template.xhtml> <snapshot.yaml> [config.yaml]");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  xforms-render form.xhtml state.yaml");
        eprintln!("  RUST_LOG=xforms_render=debug xforms-render form.xhtml state.yaml noscript.yaml");
        process::exit(1);
    }

    match run(&args[1], &args[2], args.get(3).map(String::as_str)) {
        Ok(xhtml) => println!("{}", xhtml),
        Err(e) => {
            eprintln!("✗ {} failed to render:", args[1]);
            print_error(&e);
            process::exit(1);
        }
    }
}

fn read(path: &str) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|e| RenderError::Config(format!("Failed to read {}: {}", path, e)))
}

fn run(template_path: &str, snapshot_path: &str, config_path: Option<&str>) -> Result<String, RenderError> {
    let template = read(template_path)?;
    let snapshot = ControlSnapshot::from_yaml(&read(snapshot_path)?)?;
    let config = match config_path {
        Some(path) => RenderConfig::from_yaml(&read(path)?)?,
        None => RenderConfig::default(),
    };
    render_to_string(&template, &snapshot, &config)
}

fn print_error(error: &RenderError) {
    match error {
        RenderError::Located { location, source } => {
            eprintln!("  At line {}, column {}:", location.line, location.column);
            eprintln!("    {}", source);
        }
        other => eprintln!("  {}", other),
    }
}

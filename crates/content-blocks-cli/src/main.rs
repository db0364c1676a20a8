use anyhow::{Context, Result, bail};
use content_blocks_config::Config;
use content_blocks_engine::schema::AttrSource;
use content_blocks_engine::{FallbackPolicy, Registry, io, parse_document, render_document};
use relative_path::RelativePathBuf;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, process};

mod counter;

const USAGE: &str = "\
Usage:
  content-blocks render <file>            render a stored document to HTML
  content-blocks check <file>             report fragments that fail to load
  content-blocks list                     list documents under the configured content path
  content-blocks inspect <component>      show a component's attributes and controls
  content-blocks counter <file> [ordinal] interactive counter in the terminal";

#[derive(Debug, PartialEq)]
enum Command {
    Render(PathBuf),
    Check(PathBuf),
    List,
    Inspect(String),
    Counter { file: PathBuf, ordinal: usize },
}

fn parse_args(args: &[String]) -> Result<Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    Ok(match args.as_slice() {
        ["render", file] => Command::Render(PathBuf::from(file)),
        ["check", file] => Command::Check(PathBuf::from(file)),
        ["list"] => Command::List,
        ["inspect", component] => Command::Inspect(component.to_string()),
        ["counter", file] => Command::Counter {
            file: PathBuf::from(file),
            ordinal: 0,
        },
        ["counter", file, ordinal] => Command::Counter {
            file: PathBuf::from(file),
            ordinal: ordinal
                .parse()
                .with_context(|| format!("ordinal must be a number, got `{ordinal}`"))?,
        },
        _ => bail!("{USAGE}"),
    })
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ignoring config: {e}");
            None
        }
    };
    let registry = Registry::with_blocks()?;

    match command {
        Command::Render(file) => {
            let policy = config.map(|c| c.on_malformed).unwrap_or_default();
            render(&file, &registry, policy)
        }
        Command::Check(file) => {
            if !check(&file, &registry)? {
                process::exit(1);
            }
            Ok(())
        }
        Command::List => {
            let Some(config) = config else {
                bail!(
                    "no config file found; create {} with `content_path = \"...\"`",
                    Config::config_path().display()
                );
            };
            list(&config, &registry)
        }
        Command::Inspect(name) => inspect(&name, &registry),
        Command::Counter { file, ordinal } => {
            let tick = config.map(|c| c.tick_ms).unwrap_or(50);
            let app = counter::CounterApp::load(&read(&file)?, ordinal)?;
            counter::run(app, Duration::from_millis(tick.max(1)))
        }
    }
}

/// Split a command-line path into a content root and a relative document path.
fn locate(path: &Path) -> Result<(PathBuf, RelativePathBuf)> {
    if path.is_absolute() {
        let name = path
            .file_name()
            .with_context(|| format!("{} is not a file", path.display()))?;
        let root = path.parent().unwrap_or(Path::new("/"));
        Ok((root.to_path_buf(), RelativePathBuf::from_path(name)?))
    } else {
        Ok((PathBuf::from("."), RelativePathBuf::from_path(path)?))
    }
}

fn read(path: &Path) -> Result<String> {
    let (root, relative) = locate(path)?;
    io::read_document(&relative, &root).with_context(|| format!("reading {}", path.display()))
}

fn render(file: &Path, registry: &Registry, policy: FallbackPolicy) -> Result<()> {
    let rendered = render_document(&read(file)?, registry, policy);
    println!("{}", rendered.html);
    for quarantined in &rendered.quarantined {
        eprintln!("quarantined fragment {}:\n{}", quarantined.location, quarantined.text);
    }
    if !rendered.failures.is_empty() {
        eprintln!("{} fragment(s) could not be loaded", rendered.failures.len());
    }
    Ok(())
}

/// Print one line per fragment. Returns whether every fragment loaded.
fn check(file: &Path, registry: &Registry) -> Result<bool> {
    let results = parse_document(&read(file)?, registry);
    let mut ok = true;
    for (ordinal, result) in results.iter().enumerate() {
        match result {
            Ok(instance) => println!("ok    #{ordinal} {}", instance.name()),
            Err(e) => {
                ok = false;
                println!("FAIL  {e}");
            }
        }
    }
    if results.is_empty() {
        println!("no fragments in {}", file.display());
    }
    Ok(ok)
}

fn list(config: &Config, registry: &Registry) -> Result<()> {
    io::validate_content_dir(&config.content_path)?;
    for path in config.content_files()? {
        let relative = path.strip_prefix(&config.content_path).unwrap_or(&path);
        let relative = RelativePathBuf::from_path(relative)?;
        let results = io::load_instances(&relative, &config.content_path, registry)?;
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed == 0 {
            println!("{relative}  {} fragment(s)", results.len());
        } else {
            println!("{relative}  {} fragment(s), {failed} malformed", results.len());
        }
    }
    Ok(())
}

fn inspect(name: &str, registry: &Registry) -> Result<()> {
    let Some(component) = registry.get(name) else {
        let known: Vec<_> = registry.names().collect();
        bail!("unknown component `{name}`; known: {}", known.join(", "));
    };

    println!("{} ({})", component.title(), component.name());
    if let Some(namespace) = component.interactive() {
        println!("interactive store: {namespace}");
    }
    if let Some(slot) = component.children_slot() {
        println!("children in .{slot}: {}", component.allowed_children().join(", "));
    }

    println!("\nAttributes:");
    for field in component.schema().fields() {
        let default = field
            .default_value()
            .map(|v| v.to_json().to_string())
            .unwrap_or_else(|| "(required)".to_string());
        let source = match field.source() {
            AttrSource::Metadata => "metadata".to_string(),
            AttrSource::Context(key) => format!("context `{key}`"),
            AttrSource::Markup(class) => format!("markup .{class}"),
        };
        println!("  {:<24} {:<10} {:<24} {source}", field.name(), format!("{:?}", field.kind()), default);
    }

    let inspector = component.inspector(&component.schema().defaults().map_err(|errors| {
        anyhow::anyhow!("defaults of `{name}` do not validate: {} error(s)", errors.len())
    })?);
    println!("\nToolbar:");
    for control in &inspector.toolbar {
        println!("  {} [{}]", control.label, control.field);
    }
    for panel in &inspector.panels {
        let state = if panel.initial_open { "" } else { " (collapsed)" };
        println!("\n{}{state}:", panel.title);
        for control in &panel.controls {
            println!("  {} [{}] {:?}", control.label, control.field, control.widget);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_args(&args(&["list"])).unwrap(), Command::List);
        assert_eq!(
            parse_args(&args(&["counter", "page.html", "2"])).unwrap(),
            Command::Counter {
                file: PathBuf::from("page.html"),
                ordinal: 2
            }
        );
        assert_eq!(
            parse_args(&args(&["inspect", "advanced-card"])).unwrap(),
            Command::Inspect("advanced-card".to_string())
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["render"])).is_err());
        assert!(parse_args(&args(&["counter", "page.html", "two"])).is_err());
    }

    #[test]
    fn locates_relative_and_absolute_paths() {
        let (root, relative) = locate(Path::new("pages/home.html")).unwrap();
        assert_eq!(root, PathBuf::from("."));
        assert_eq!(relative.as_str(), "pages/home.html");

        let (root, relative) = locate(Path::new("/srv/site/home.html")).unwrap();
        assert_eq!(root, PathBuf::from("/srv/site"));
        assert_eq!(relative.as_str(), "home.html");
    }
}

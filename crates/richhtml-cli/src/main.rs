use richhtml::{Converter, ImportOptions, MarkupConfig, RawContentState};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Convert(richhtml::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Convert(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<richhtml::Error> for CliError {
    fn from(value: richhtml::Error) -> Self {
        Self::Convert(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    ToHtml,
    FromHtml,
    RoundTrip,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    configs: Vec<String>,
    flat: bool,
    pretty: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "richhtml-cli\n\
\n\
USAGE:\n\
  richhtml-cli [to-html] [--config <path>]... [--out <path>] [<path>|-]\n\
  richhtml-cli from-html [--flat] [--pretty] [--out <path>] [<path>|-]\n\
  richhtml-cli round-trip [--flat] [--config <path>]... [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - to-html reads raw content JSON and prints HTML.\n\
  - from-html reads HTML and prints raw content JSON.\n\
  - round-trip parses HTML and renders it again with the same tables.\n\
  - --config may be repeated; later files override earlier entries.\n\
  - --flat turns every <br> into a block boundary.\n\
  - Set RICHHTML_LOG (e.g. RICHHTML_LOG=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "to-html" => args.command = Command::ToHtml,
            "from-html" => args.command = Command::FromHtml,
            "round-trip" => args.command = Command::RoundTrip,
            "--flat" => args.flat = true,
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.configs.push(path.clone());
            }
            "--out" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(path.clone());
            }
            "-" => args.input = Some(a.clone()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            other => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(other.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(paths: &[String]) -> Result<MarkupConfig, CliError> {
    let mut config = MarkupConfig::default();
    for path in paths {
        let text = std::fs::read_to_string(path)?;
        config.merge(MarkupConfig::from_json_str(&text)?);
        tracing::debug!(path = %path, "loaded markup config");
    }
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    write_text(&text, out)
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RICHHTML_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let import = if args.flat {
        ImportOptions::flat()
    } else {
        ImportOptions::nested()
    };

    let mut converter = Converter::new().with_import_options(import);
    if !args.configs.is_empty() {
        converter = converter.with_markup_config(&load_config(&args.configs)?);
    }

    match args.command {
        Command::ToHtml => {
            let content: RawContentState = serde_json::from_str(&text)?;
            let html = converter.export_html(&content)?;
            write_text(&html, args.out.as_deref())
        }
        Command::FromHtml => {
            let content = converter.import_html(&text)?;
            tracing::info!(
                blocks = content.blocks.len(),
                entities = content.entity_map.len(),
                "parsed html"
            );
            write_json(&content, args.pretty, args.out.as_deref())
        }
        Command::RoundTrip => {
            let html = converter.normalize_html(&text)?;
            write_text(&html, args.out.as_deref())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

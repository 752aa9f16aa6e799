//! Mobiledoc CLI - Build and validate Mobiledoc documents
//!
//! Usage:
//!   mdoc [OPTIONS] [COMMAND] <FILE>
//!
//! Commands:
//!   build     Build a document from a JSON op script (default)
//!   text      Build a document from a plain text file
//!   validate  Check the inline markup of a plain text file

use std::env;
use std::fs;
use std::process;

use flexi_logger::{Logger, LoggerHandle};
use log::{debug, info};
use mobiledoc_core::{FileCard, Mobiledoc, TextInput};
use serde::Deserialize;
use serde_json::{json, Map, Value};

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;
    let _logger = init_logging(config.verbose);

    let input = fs::read_to_string(&config.file)
        .map_err(|e| format!("failed to read '{}': {}", config.file, e))?;
    info!("read {} bytes from {}", input.len(), config.file);

    match config.command {
        Command::Build => cmd_build(&input, &config),
        Command::Text => cmd_text(&input, &config),
        Command::Validate => cmd_validate(&input, &config),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    output: Option<String>,
    compact: bool,
    json: bool,
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Build,
    Text,
    Validate,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Build;
    let mut output = None;
    let mut compact = false;
    let mut json = false;
    let mut verbose = false;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("mdoc {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-c" | "--compact" => compact = true,
            "-j" | "--json" => json = true,
            "-o" | "--output" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a file argument", arg))?;
                output = Some(path.clone());
            }
            "build" => command = Command::Build,
            "text" => command = Command::Text,
            "validate" => command = Command::Validate,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        output,
        compact,
        json,
        verbose,
    })
}

fn print_help() {
    eprintln!(
        r#"mdoc - Mobiledoc document builder

USAGE:
    mdoc [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    build       Build a document from a JSON op script (default)
    text        Build a document from plain text paragraphs
    validate    Check inline markup of a plain text file without output

OPTIONS:
    -o, --output <FILE>  Write the document to FILE instead of stdout
    -c, --compact        Emit compact JSON
    -j, --json           Report validation results as JSON
    -v, --verbose        Log builder activity to stderr
    -h, --help           Print help information
    -V, --version        Print version information

OP SCRIPT:
    A JSON array of objects with an "op" field, for example
    [{{"op": "formatted", "text": "Some **bold** text"}}, {{"op": "divider"}}]
    Ops: paragraph, formatted, divider, image, button, html, markdown,
         markdown_from_html, file, callout, card, custom

EXAMPLES:
    mdoc script.json            Build from an op script
    mdoc text post.txt          Build from plain text
    mdoc -o doc.json text a.txt Write the result to doc.json
    mdoc validate post.txt      Report markup errors
    mdoc -j validate post.txt   Report markup errors as JSON
"#
    );
}

fn init_logging(verbose: bool) -> Option<LoggerHandle> {
    let level = if verbose { "debug" } else { "warn" };
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    }
}

fn emit(doc: &Mobiledoc, config: &Config) -> Result<(), String> {
    let json = if config.compact {
        doc.to_json()
    } else {
        doc.to_json_pretty()
    };

    match &config.output {
        Some(path) => {
            fs::write(path, json + "\n")
                .map_err(|e| format!("failed to write '{}': {}", path, e))?;
            info!("wrote {} sections to {}", doc.sections().len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

// =============================================================================
// Build Command
// =============================================================================

/// One builder call in an op script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    Paragraph {
        text: Value,
    },
    Formatted {
        text: Value,
    },
    Divider,
    Image {
        src: String,
        caption: Option<String>,
    },
    Button {
        text: String,
        url: String,
        alignment: Option<String>,
    },
    Html {
        html: String,
    },
    Markdown {
        markdown: String,
    },
    MarkdownFromHtml {
        html: String,
    },
    #[serde(rename_all = "camelCase")]
    File {
        src: String,
        file_name: String,
        file_title: String,
        file_size: u64,
        #[serde(default)]
        file_caption: String,
    },
    Callout {
        text: String,
        emoji: Option<String>,
        color: Option<String>,
    },
    Card {
        name: String,
        #[serde(default)]
        payload: Map<String, Value>,
    },
    Custom {
        name: String,
        value: Value,
    },
}

fn cmd_build(input: &str, config: &Config) -> Result<(), String> {
    let ops: Vec<Op> =
        serde_json::from_str(input).map_err(|e| format!("invalid op script: {}", e))?;
    info!("applying {} ops", ops.len());

    let mut doc = Mobiledoc::new();
    for (i, op) in ops.into_iter().enumerate() {
        apply_op(&mut doc, op).map_err(|e| format!("op {}: {}", i + 1, e))?;
    }

    emit(&doc, config)
}

fn apply_op(doc: &mut Mobiledoc, op: Op) -> Result<(), mobiledoc_core::Error> {
    debug!("op {:?}", op);
    match op {
        Op::Paragraph { text } => doc.add_paragraph(TextInput::try_from(text)?),
        Op::Formatted { text } => doc.add_formatted_paragraph(TextInput::try_from(text)?)?,
        Op::Divider => {
            doc.add_divider();
        }
        Op::Image { src, caption } => {
            doc.add_image(&src, caption.as_deref());
        }
        Op::Button {
            text,
            url,
            alignment,
        } => {
            doc.add_button(&text, &url, alignment.as_deref());
        }
        Op::Html { html } => {
            doc.add_html(&html);
        }
        Op::Markdown { markdown } => {
            doc.add_markdown(&markdown);
        }
        Op::MarkdownFromHtml { html } => {
            doc.add_markdown_from_html(&html);
        }
        Op::File {
            src,
            file_name,
            file_title,
            file_size,
            file_caption,
        } => {
            doc.add_file(
                FileCard::new(src, file_name, file_title, file_size).with_caption(file_caption),
            );
        }
        Op::Callout { text, emoji, color } => {
            doc.add_callout(&text, emoji.as_deref(), color.as_deref());
        }
        Op::Card { name, payload } => {
            doc.add_card_with(&name, payload);
        }
        Op::Custom { name, value } => doc.set_custom(name, value)?,
    }
    Ok(())
}

// =============================================================================
// Text Command
// =============================================================================

/// A blank-line separated block of a plain text file.
#[derive(Debug, PartialEq)]
struct TextBlock {
    /// 1-based line the block starts on.
    line: usize,
    text: String,
}

impl TextBlock {
    fn is_divider(&self) -> bool {
        self.text == "---"
    }
}

/// Split plain text into blocks; lines of a block are joined with a space.
fn text_blocks(input: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<TextBlock> = None;

    for (n, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            blocks.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(block) => {
                block.text.push(' ');
                block.text.push_str(line);
            }
            None => {
                current = Some(TextBlock {
                    line: n + 1,
                    text: line.to_string(),
                })
            }
        }
    }
    blocks.extend(current);
    blocks
}

fn cmd_text(input: &str, config: &Config) -> Result<(), String> {
    let mut doc = Mobiledoc::new();

    for block in text_blocks(input) {
        if block.is_divider() {
            doc.add_divider();
            continue;
        }
        doc.add_formatted_paragraph(block.text.as_str())
            .map_err(|e| format!("line {}: {}", block.line, e))?;
    }

    emit(&doc, config)
}

// =============================================================================
// Validate Command
// =============================================================================

fn cmd_validate(input: &str, config: &Config) -> Result<(), String> {
    let blocks = text_blocks(input);
    let errors: Vec<(usize, mobiledoc_core::Error)> = blocks
        .iter()
        .filter(|block| !block.is_divider())
        .filter_map(|block| {
            mobiledoc_core::inline::validate(&block.text)
                .err()
                .map(|e| (block.line, e))
        })
        .collect();

    if config.json {
        let report: Vec<Value> = errors
            .iter()
            .map(|(line, e)| {
                json!({
                    "line": line,
                    "kind": format!("{:?}", e.kind()),
                    "message": e.to_string(),
                    "span": e.span().map(|s| json!({"start": s.start, "end": s.end})),
                })
            })
            .collect();
        println!("{}", json!({"valid": errors.is_empty(), "errors": report}));
    } else if errors.is_empty() {
        println!("Valid: {} blocks, no errors found", blocks.len());
    } else {
        eprintln!("Invalid: {} error(s) found", errors.len());
        for (line, error) in &errors {
            eprintln!("  - line {}: {}", line, error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} error(s) found", errors.len()))
    }
}

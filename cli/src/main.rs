mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assembler::source::read_location;
use assembler::{Deck, DeckOptions, SlideEntity, SlideShow};
use slidemark::parser::ParseError;

const SUBCOMMANDS: &[&str] = &["build", "test", "help"];

#[derive(Parser)]
#[command(name = "slidemark", version, about = "Markdown slide deck assembler")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a deck and print its slides
    Build(BuildArgs),

    /// Run .test.md deck fixtures
    Test(TestArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Markdown deck file, or an http(s) URL to fetch it from
    source: String,

    /// TOML options file
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Leave out slides carrying this class. Repeatable.
    #[arg(short = 'x', long)]
    exclude: Vec<String>,

    /// Continuation slides without their own `count` share the previous number
    #[arg(long)]
    no_count_incremental: bool,

    /// Macro definition NAME=VALUE. Repeatable.
    #[arg(short = 'm', long = "macro", value_parser = parse_macro)]
    macros: Vec<(String, String)>,

    /// Parse only, don't assemble (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the assembled deck
    #[arg(long)]
    ast: bool,

    /// List the names of all named slides
    #[arg(long)]
    list_names: bool,

    /// Print the deck's link table
    #[arg(long)]
    links: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // `slidemark talk.md` means `slidemark build talk.md`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().skip(1).position(|a| !a.starts_with('-')) {
        let pos = pos + 1;
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "build".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Build(build_args) => do_build(build_args, cli.no_color).await,
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

async fn do_build(args: BuildArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let mut options = match &args.options {
        Some(path) => match DeckOptions::from_file(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => DeckOptions::default(),
    };
    options.excluded_classes.extend(args.exclude.iter().cloned());
    if args.no_count_incremental {
        options.count_incremental_slides = false;
    }
    options.macros.extend(args.macros.iter().cloned());

    let text = match read_location(&args.source).await {
        Ok(text) => text.replace("\r\n", "\n"),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.source.clone(), text.clone());

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let parsed = match slidemark::parser::Parser::new(text, file_id).parse() {
        Ok(parsed) => parsed,
        Err(errors) => {
            emit_diagnostics(&writer, &config, &files, &errors);
            process::exit(1);
        }
    };
    emit_diagnostics(&writer, &config, &files, &parsed.warnings);

    if args.check {
        eprintln!(
            "ok: {} parsed successfully ({} slide records)",
            args.source,
            parsed.records.len()
        );
        return;
    }

    let number_format = options.slide_number_format.clone();
    let show = SlideShow::new(options);
    show.load_from_records(parsed.records);
    let deck = show.deck();

    if args.ast {
        println!("{:#?}", deck);
        return;
    }

    if args.list_names {
        for slide in deck.slides() {
            if let Some(name) = slide.name() {
                println!("{}", name);
            }
        }
        return;
    }

    if args.links {
        for (id, url) in deck.links() {
            println!("[{}]: {}", id, url);
        }
        return;
    }

    print_deck(&deck, &number_format);
}

fn print_deck(deck: &Deck, number_format: &str) {
    let total = deck.numbers().last().unwrap_or(0);
    for (position, slide) in deck.slides().enumerate() {
        let number = match slide.display_number() {
            0 => "-".to_string(),
            n => format_number(number_format, n, total),
        };
        println!(
            "{:>3}  {:<10} {:<16} template: {}",
            position,
            number,
            slide.name().unwrap_or("-"),
            template_label(deck, slide)
        );
    }
    eprintln!("{} slide(s)", deck.slide_count());
}

/// A slide's template by name, or `#<entity id>` when unnamed, or `-`.
fn template_label(deck: &Deck, slide: &SlideEntity) -> String {
    match deck.template_of(slide) {
        Some(template) => template
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", template.id())),
        None => "-".to_string(),
    }
}

/// Fill `%current%` and `%total%` in a slide number format.
fn format_number(format: &str, current: usize, total: usize) -> String {
    format
        .replace("%current%", &current.to_string())
        .replace("%total%", &total.to_string())
}

fn emit_diagnostics(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    errors: &[ParseError],
) {
    for error in errors {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    }
}

/// Parse a `--macro NAME=VALUE` argument.
fn parse_macro(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use story_markup_cli::{story_path_from_words, ConfigReport, ShellError, ShellOptions};

#[derive(Parser, Debug)]
#[command(name = "story-markup")]
#[command(version)]
#[command(about = "Render a plain-text story into tagged markup, one file per configured section")]
struct Cli {
    /// Story file; unquoted words are joined with spaces
    #[arg(value_name = "STORY")]
    story: Vec<String>,

    /// Configuration file (default: StoryFormatter.ini beside the story or above it)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// TrueType/OpenType font used to measure text
    #[arg(long, value_name = "PATH")]
    font_file: Option<PathBuf>,

    /// Only render these sections (repeatable)
    #[arg(long = "section", value_name = "NAME")]
    sections: Vec<String>,

    /// Print the markup instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), ShellError> {
    let opts = ShellOptions {
        story: story_path_from_words(&cli.story)?,
        config: cli.config,
        font_file: cli.font_file,
        sections: cli.sections,
        dry_run: cli.stdout,
    };

    if cli.print_config {
        println!("{}", ConfigReport::build(&opts)?.to_json()?);
        return Ok(());
    }

    let rendered = story_markup_cli::run(&opts)?;
    if cli.stdout {
        for section in &rendered {
            print!("{}", section.markup);
        }
        return Ok(());
    }
    for section in &rendered {
        println!(
            "[{}] {} ({} lines, {} sub-lines)",
            section.section,
            section.output.display(),
            section.stats.lines_in,
            section.stats.sub_lines
        );
    }
    println!("rendered {} section(s)", rendered.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

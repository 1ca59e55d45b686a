use std::path::PathBuf;

use clap::{ArgAction, Parser};
use env_logger::Env;
use svg_export::{ExportOptions, InkscapeRenderer, run_export};

#[derive(Parser)]
#[command(name = "svg-export")]
#[command(about = "Export the drawings under each Export-layer rectangle to individual files", long_about = None)]
#[command(version)]
struct Cli {
    /// The input SVG file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    filename: PathBuf,

    /// The output file type
    #[arg(long, default_value = "pdf")]
    filetype: String,

    /// SVG used as the base of every exported document
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    template: Option<PathBuf>,

    /// Directory for the exported files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Inkscape executable used for conversion
    #[arg(long, default_value = "inkscape")]
    inkscape: String,

    /// Keep the intermediate SVG files
    #[arg(long)]
    keep_svg: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level from -v, overridden by RUST_LOG
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let options = ExportOptions {
        input: cli.filename,
        filetype: cli.filetype,
        template: cli.template,
        output_dir: cli.output_dir,
        inkscape: cli.inkscape,
        keep_svg: cli.keep_svg,
    };
    let renderer = InkscapeRenderer::new(options.inkscape.clone());

    let produced = run_export(&options, &renderer)?;
    for path in &produced {
        println!("{}", path.display());
    }

    Ok(())
}

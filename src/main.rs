use albummer::{config, generate, output, parse, synth};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "albummer")]
#[command(about = "Single-file HTML photo albums from plain-text templates")]
#[command(long_about = "\
Single-file HTML photo albums from plain-text templates

A template interleaves media filenames, Markdown prose, and directives:

  :folder photos/summer        # files below are looked up here
  :show_filenames              # caption every image and video
  :use default.css             # stylesheet inlined into the page

  # Summer 2024                # anything else is Markdown

  beach.jpg   dunes.jpg        # a row: first word is a file in the folder
  swim.mp4

'albummer make-template' writes a starting template for a folder, ordered
by modification time. 'albummer generate' turns a template into one HTML
file with every image, video, and the stylesheet embedded.

Run 'albummer gen-config' to generate a documented album.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing album.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Print the parsed document after generating
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a template listing every photo and video in a folder
    MakeTemplate {
        /// Folder to scan
        folder: PathBuf,
        /// Template file to write
        output: PathBuf,
        /// Images per row [default: layout.columns]
        cols: Option<usize>,
        /// "asc" for oldest first, anything else for newest first [default: layout.order]
        order: Option<String>,
        /// Stylesheet for the :use line [default: bundled default.css]
        css: Option<String>,
    },
    /// Render a template into a single HTML file next to it
    Generate {
        /// Template file
        template: PathBuf,
    },
    /// Parse a template and show its blocks without rendering
    Check {
        /// Template file
        template: PathBuf,
        /// Print the parsed document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock album.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::MakeTemplate {
            folder,
            output: template,
            cols,
            order,
            css,
        } => {
            let album_config = config::load_config(&cli.config_dir)?;
            let options = synth::SynthOptions {
                columns: cols.unwrap_or(album_config.layout.columns),
                order: synth::SortOrder::from_token(
                    order.as_deref().unwrap_or(&album_config.layout.order),
                ),
                stylesheet: css.or(album_config.layout.stylesheet.clone()),
            };
            let result = synth::make_template(&folder, &template, &options, &album_config.media)?;
            output::print_synth_output(&result);
        }
        Command::Generate { template } => {
            let album_config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&album_config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_generate_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::generate(&template, &album_config, Path::new(""), Some(tx));
            printer
                .join()
                .map_err(|_| "output thread panicked")?;
            let result = result?;
            if cli.verbose {
                output::print_document(&result.document);
            }
        }
        Command::Check { template, json } => {
            let album_config = config::load_config(&cli.config_dir)?;
            let document = parse::parse_file(&template, &album_config.media, Path::new(""))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                println!("==> Checking {}", template.display());
                output::print_document(&document);
                println!("==> Template is valid");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use treepress::{compile, config, output};

#[derive(Parser)]
#[command(name = "treepress")]
#[command(about = "Compile a tree of templated pages into a static site")]
#[command(long_about = "\
Compile a tree of templated pages into a static site

Each root file is compiled together with every page it pulls in through
subfile and subglob markers. Page kinds come from the base templates pages
extend, so a post is any file extending a template marked as a post.

Content file layout:

  {% extends \"_post.html\" %}
  {% block file_metadata %}
  <meta name=\"post_id\" content=\"5239\" />
  <meta name=\"title\" content=\"Pelican Guts\" />
  <meta name=\"post_date\" content=\"2012-11-01\" />
  {% endblock file_metadata %}
  {% block content %}
  <p>...</p>
  {% endblock content %}

Base template:

  <!-- pagekind: post -->
  {% extends \"_page.html\" %}

Run 'treepress gen-config' to generate a documented site config file.")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by commands that construct page trees.
#[derive(clap::Args, Clone)]
struct TreeArgs {
    /// Root content files, relative to the source root
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Source root that stored page paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Template search path directory (repeatable, searched in order)
    #[arg(short = 'p', long = "search-path", required = true)]
    search_path: Vec<PathBuf>,

    /// JSON table translating metadata aliases to display values
    #[arg(short = 'm', long = "metadata")]
    translations: Option<PathBuf>,

    /// Site configuration file (TOML), layered over the stock defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Construct, render and syndicate
    Build {
        #[command(flatten)]
        tree: TreeArgs,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Site base URL, used for feed links and the `site` field
        #[arg(short, long)]
        site: String,

        /// Value of the `today` field, for reproducible output
        #[arg(short = 'd', long)]
        today: Option<String>,

        /// Write the item feed (RSS) to this path
        #[arg(short = 'r', long = "rss")]
        item_feed: Option<PathBuf>,

        /// Write the calendar feed (iCalendar) to this path
        #[arg(short, long)]
        calendar: Option<PathBuf>,
    },
    /// Construct every page tree and list it without writing anything
    Check {
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Print a stock site config file with all options documented
    GenConfig,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn options(tree: TreeArgs) -> compile::Options {
    compile::Options {
        root: tree.root,
        files: tree.files,
        search_path: tree.search_path,
        translations: tree.translations,
        config: tree.config,
        ..compile::Options::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build {
            tree,
            output: output_dir,
            site,
            today,
            item_feed,
            calendar,
        } => {
            let options = compile::Options {
                output_dir,
                site,
                today,
                item_feed,
                calendar,
                ..options(tree)
            };
            println!("==> Building into {}", options.output_dir.display());
            let report = compile::compile(&options)?;
            output::print_build_summary(&report, &options.output_dir);
            println!("==> Build complete");
        }
        Command::Check { tree } => {
            let options = options(tree);
            println!("==> Checking {}", options.root.display());
            let inventory = compile::check(&options)?;
            output::print_inventory(&inventory);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

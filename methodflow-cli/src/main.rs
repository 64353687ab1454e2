//! Command-line interface entry point for `methodflow`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use methodflow::ast::Program;
use methodflow::config::Config;
use methodflow::extract::extract;
use methodflow::options::ExtractOptions;
use methodflow::render::{render, Direction, RenderOptions};

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.methodflow.toml):
  Create this file in your project root (or any parent of the input file)
  to set defaults. Command-line flags override it.

  [methodflow]
  # Inlining budgets (negative = unlimited)
  call-depth = 1               # Project callee inlining depth
  jdk-api-depth = 0            # Platform callee inlining depth
  ternary-expand-level = -1    # Ternary expansion depth

  # Folding
  fold-fluent-calls = true     # Keep fluent chains as one node
  fold-nested-calls = true     # Merge nested same-receiver calls
  fold-sequential-calls = true # Merge adjacent trivial statements
  fold-sequential-setters = true
  fold-sequential-getters = true
  fold-sequential-ctors = true

  # Labels
  use-doc-labels = true        # Prefer doc-comment summaries
  label-max-length = 80        # negative = unlimited

  # Rendering
  direction = \"td\"             # td, lr, bt or rl
  merge-calls = true           # Reuse one subgraph per distinct callee

  # Skip patterns (replace the built-in defaults)
  skip-patterns = [\"^.*[.#]log\\\\w*\\\\(.*$\"]
";

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "methodflow - Render a method's control flow as a Mermaid flowchart",
    long_about = None,
    after_help = CONFIG_HELP
)]
struct Cli {
    /// JSON file describing the program (methods, bodies, source text).
    input: PathBuf,

    /// Name of the method to chart. Defaults to the only method in the
    /// program; required when the program has more than one.
    #[arg(short, long)]
    method: Option<String>,

    /// Flowchart layout direction.
    #[arg(long, value_parser = ["td", "lr", "bt", "rl"])]
    direction: Option<String>,

    /// Inlining budget for project callees (negative = unlimited).
    #[arg(long)]
    call_depth: Option<i32>,

    /// Inlining budget for platform-package callees.
    #[arg(long)]
    jdk_api_depth: Option<i32>,

    /// Ternary expansion depth (negative = unlimited).
    #[arg(long)]
    ternary_expand: Option<i32>,

    /// Maximum label length in characters (negative = unlimited).
    #[arg(long)]
    label_max: Option<i32>,

    /// Split fluent chains into one node per segment.
    #[arg(long)]
    no_fold_fluent: bool,

    /// Keep nested same-receiver calls as separate nodes.
    #[arg(long)]
    no_fold_nested: bool,

    /// Keep adjacent trivial statements as separate nodes.
    #[arg(long)]
    no_fold_sequential: bool,

    /// Render every call site as its own subgraph instead of reusing one
    /// per distinct callee.
    #[arg(long)]
    no_merge_calls: bool,

    /// Regex matched against qualified callee signatures; matching callees
    /// are never inlined. Repeatable; replaces the built-in defaults.
    #[arg(long = "skip-regex")]
    skip_regexes: Vec<String>,

    /// Write the flowchart here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(&Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load_from_path(&cli.input);
    let extract_opts = apply_extract_flags(cli, config.methodflow.extract_options(ExtractOptions::default()));
    let render_opts = apply_render_flags(cli, config.methodflow.render_options(RenderOptions::default()))?;

    let content = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let program: Program = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", cli.input.display()))?;

    let method = match &cli.method {
        Some(name) => program
            .method_by_name(name)
            .with_context(|| format!("no method named `{name}` in the program"))?,
        None => match program.methods.as_slice() {
            [only] => only,
            [] => bail!("the program contains no methods"),
            many => bail!(
                "the program contains {} methods; pick one with --method ({})",
                many.len(),
                many.iter().map(|m| m.name.as_str()).collect::<Vec<_>>().join(", ")
            ),
        },
    };

    let graph = extract(method, &extract_opts, &program);
    let chart = render(&graph, &render_opts);

    match &cli.output {
        Some(path) => fs::write(path, chart)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{chart}"),
    }
    Ok(())
}

fn apply_extract_flags(cli: &Cli, mut opts: ExtractOptions) -> ExtractOptions {
    if let Some(v) = cli.call_depth {
        opts.call_depth = v;
    }
    if let Some(v) = cli.jdk_api_depth {
        opts.jdk_api_depth = v;
    }
    if let Some(v) = cli.ternary_expand {
        opts.ternary_expand_level = v;
    }
    if let Some(v) = cli.label_max {
        opts.label_max_length = v;
    }
    if cli.no_fold_fluent {
        opts.fold_fluent_calls = false;
    }
    if cli.no_fold_nested {
        opts.fold_nested_calls = false;
    }
    if cli.no_fold_sequential {
        opts.fold_sequential_calls = false;
    }
    if !cli.skip_regexes.is_empty() {
        opts.skip_patterns.clone_from(&cli.skip_regexes);
    }
    opts.normalized()
}

fn apply_render_flags(cli: &Cli, mut opts: RenderOptions) -> Result<RenderOptions> {
    if let Some(direction) = cli.direction.as_deref() {
        opts.direction = match direction {
            "td" => Direction::Td,
            "lr" => Direction::Lr,
            "bt" => Direction::Bt,
            "rl" => Direction::Rl,
            other => bail!("unsupported direction `{other}`"),
        };
    }
    if cli.no_merge_calls {
        opts.merge_calls = false;
    }
    Ok(opts)
}

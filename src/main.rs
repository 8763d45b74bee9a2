use clap::{ArgGroup, Parser};
use mdma::config::{self, AssemblerConfig};
use mdma::markdown::Dialect;
use mdma::output::{self, Verbosity};
use mdma::{AssembleEvent, assemble, framework};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "mdma")]
#[command(about = "MarkDown Monolith Assembler")]
#[command(long_about = "\
MarkDown Monolith Assembler

Merges a Markdown document into an HTML framework and writes one
navigable page: every top-level heading becomes a tab, and a generated
agenda links to every heading. Tabs and agenda highlighting work with
CSS alone.

A framework is any HTML page with two reserved containers:

  <div id=\"MDMA-CONTENT\"></div>
  <nav class=\"menu\">
    <div class=\"options\" id=\"MDMA-AGENDA\"></div>
  </nav>

The output is itself a valid framework; assembling it again replaces the
previous content instead of adding to it.

Settings are read from ./mdma.toml (or --config) and overridden by flags.
Run 'mdma --gen-config' for a documented config file.")]
#[command(version = version_string())]
#[command(group(ArgGroup::new("dialect").args(["commonmark", "github"])))]
#[command(group(ArgGroup::new("verbosity").args(["brief", "verbose", "debug"])))]
struct Cli {
    /// Markdown input (stdin when absent)
    file: Option<PathBuf>,

    /// Framework HTML (built-in default when absent)
    #[arg(short, long)]
    framework: Option<PathBuf>,

    /// Output file (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image preview shrink factor (0 or 1 disables previews)
    #[arg(short, long, value_name = "N")]
    preview: Option<u8>,

    /// No indentation and no line wrapping
    #[arg(long)]
    minify: bool,

    /// Embed images, stylesheets and icons as data URIs
    #[arg(long)]
    monolith: bool,

    /// Plain CommonMark, no extensions
    #[arg(long)]
    commonmark: bool,

    /// GitHub-flavored Markdown (default)
    #[arg(long)]
    github: bool,

    /// Report asset failures only (default)
    #[arg(long)]
    brief: bool,

    /// Also report inlined assets, previews and videos
    #[arg(long)]
    verbose: bool,

    /// Also report every stage and the heading outline
    #[arg(long)]
    debug: bool,

    /// Config file (default: ./mdma.toml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a stock mdma.toml with all options documented
    #[arg(long)]
    gen_config: bool,

    /// Print the heading registry as JSON instead of HTML
    #[arg(long)]
    headings: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.debug {
            Verbosity::Debug
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Brief
        }
    }

    /// Apply command-line overrides on top of the file config.
    fn apply(&self, config: &mut AssemblerConfig) {
        if self.minify {
            config.output.minify = true;
        }
        if self.monolith {
            config.media.monolith = true;
        }
        if let Some(preview) = self.preview {
            config.media.preview = preview;
        }
        if self.commonmark {
            config.markdown.dialect = Dialect::CommonMark;
        } else if self.github {
            config.markdown.dialect = Dialect::Github;
        }
        if config.media.base_dir.is_empty() {
            config.media.base_dir = default_base_dir(self.file.as_deref());
        }
    }
}

/// The Markdown file's directory, or the working directory for stdin.
fn default_base_dir(file: Option<&Path>) -> String {
    file.and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            config::load_config(path)?
        }
        None => config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?,
    };
    cli.apply(&mut config);

    let markdown = match &cli.file {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };
    let framework = match &cli.framework {
        Some(path) => std::fs::read(path)?,
        None => framework::default_framework_bytes(),
    };

    let verbosity = cli.verbosity();
    let (tx, rx) = std::sync::mpsc::channel::<AssembleEvent>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_event(&event, verbosity) {
                eprintln!("{}", line);
            }
        }
    });
    let result = assemble(&framework, &markdown, &config, Some(tx));
    printer.join().ok();
    let assembly = result?;

    if verbosity == Verbosity::Debug {
        for line in output::format_headings(&assembly.headings) {
            eprintln!("{}", line);
        }
    }

    let document = if cli.headings {
        let mut json = serde_json::to_string_pretty(&assembly.headings)?;
        json.push('\n');
        json
    } else {
        assembly.html
    };

    match &cli.output {
        Some(path) => std::fs::write(path, document)?,
        None => std::io::stdout().write_all(document.as_bytes())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "mdma", "--minify", "--monolith", "-p", "3", "--commonmark", "docs/readme.md",
        ]);
        let mut config = AssemblerConfig::default();
        cli.apply(&mut config);
        assert!(config.output.minify);
        assert!(config.media.monolith);
        assert_eq!(config.media.preview, 3);
        assert_eq!(config.markdown.dialect, Dialect::CommonMark);
        assert_eq!(config.media.base_dir, "docs");
    }

    #[test]
    fn configured_base_dir_wins() {
        let cli = Cli::parse_from(["mdma", "docs/readme.md"]);
        let mut config = AssemblerConfig::default();
        config.media.base_dir = "assets".into();
        cli.apply(&mut config);
        assert_eq!(config.media.base_dir, "assets");
    }

    #[test]
    fn stdin_uses_working_directory() {
        assert_eq!(default_base_dir(None), ".");
        assert_eq!(default_base_dir(Some(Path::new("readme.md"))), ".");
    }

    #[test]
    fn conflicting_dialects_are_rejected() {
        assert!(Cli::try_parse_from(["mdma", "--commonmark", "--github"]).is_err());
        assert!(Cli::try_parse_from(["mdma", "--brief", "--debug"]).is_err());
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(Cli::parse_from(["mdma"]).verbosity(), Verbosity::Brief);
        assert_eq!(Cli::parse_from(["mdma", "--verbose"]).verbosity(), Verbosity::Verbose);
        assert_eq!(Cli::parse_from(["mdma", "--debug"]).verbosity(), Verbosity::Debug);
    }
}

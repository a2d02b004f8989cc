use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glob::Pattern;
use log::warn;

use crate::comment::{CommentKind, RemovalPolicy};
use crate::error::{Error, Result};

/// Extensions the tool has historically treated as markup.
pub const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "php", "asp", "aspx", "jsp", "tpl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    All,
    Plain,
    Conditional,
    ServerDirective,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Removes HTML comments from files or directories", long_about = None)]
pub struct Args {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Comment kinds to remove (can be repeated or comma separated)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub scope: Vec<ScopeArg>,

    /// Remove all HTML comments (default; wins over --scope)
    #[arg(short, long)]
    pub all: bool,

    /// Output directory; files are overwritten in place when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Glob patterns to skip during traversal (can be repeated or comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Only remove comments containing this string (case-sensitive)
    #[arg(short, long)]
    pub contains: Option<String>,

    /// Only process these file extensions inside directories
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub ext: Vec<String>,

    /// Only process common markup files inside directories (html, htm, php, asp, aspx, jsp, tpl)
    #[arg(short, long)]
    pub markup_only: bool,

    /// Do not write anything; only report what would change
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// With --dry-run, print a unified diff for every changed file
    #[arg(short, long)]
    pub diff: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log exclusion decisions and other details
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub policy: RemovalPolicy,
    pub recursive: bool,
    pub output_dir: Option<PathBuf>,
    pub exclude_patterns: Vec<Pattern>,
    /// Lowercase, without the leading dot. Empty means every file.
    pub extensions: Vec<String>,
    pub dry_run: bool,
    pub show_diff: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            policy: RemovalPolicy::all(),
            recursive: false,
            output_dir: None,
            exclude_patterns: Vec::new(),
            extensions: Vec::new(),
            dry_run: false,
            show_diff: false,
        }
    }
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// `-a` always wins; `-s all` means the same thing.
pub fn resolve_policy(args: &Args) -> RemovalPolicy {
    let wants_all = args.scope.is_empty() || args.scope.contains(&ScopeArg::All);
    if args.all && !args.scope.is_empty() {
        warn!("both --all and --scope given; removing all comments");
    }

    let policy = if args.all || wants_all {
        RemovalPolicy::all()
    } else {
        RemovalPolicy::only(args.scope.iter().filter_map(|s| match s {
            ScopeArg::All => None,
            ScopeArg::Plain => Some(CommentKind::Plain),
            ScopeArg::Conditional => Some(CommentKind::Conditional),
            ScopeArg::ServerDirective => Some(CommentKind::ServerDirective),
        }))
    };

    match &args.contains {
        Some(needle) => policy.with_contains(needle.clone()),
        None => policy,
    }
}

/// `.bak` is shorthand for `*.bak`; everything else is a glob.
fn exclusion_pattern(raw: &str) -> Result<Pattern> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::usage("empty exclusion pattern"));
    }
    let glob = match raw.strip_prefix('.') {
        Some(ext) if !ext.is_empty() && !ext.contains(|c| "*?[/".contains(c)) => {
            format!("*.{ext}")
        }
        _ => raw.to_string(),
    };
    Pattern::new(&glob).map_err(|e| Error::usage(format!("invalid exclusion pattern {raw:?}: {e}")))
}

pub fn build_options(args: &Args) -> Result<Options> {
    for path in &args.paths {
        if !path.exists() {
            return Err(Error::usage(format!(
                "path '{}' does not exist",
                path.display()
            )));
        }
    }
    if let Some(out) = &args.output {
        if out.exists() && !out.is_dir() {
            return Err(Error::usage(format!(
                "output '{}' exists and is not a directory",
                out.display()
            )));
        }
    }
    if args.diff && !args.dry_run {
        return Err(Error::usage("--diff requires --dry-run"));
    }
    if matches!(&args.contains, Some(needle) if needle.is_empty()) {
        return Err(Error::usage("--contains needs a non-empty string"));
    }

    let exclude_patterns = args
        .exclude
        .iter()
        .map(|s| exclusion_pattern(s))
        .collect::<Result<Vec<_>>>()?;

    let mut extensions: Vec<String> = args
        .ext
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    if args.markup_only {
        extensions.extend(MARKUP_EXTENSIONS.iter().map(|e| e.to_string()));
    }
    extensions.sort();
    extensions.dedup();

    Ok(Options {
        policy: resolve_policy(args),
        recursive: args.recursive,
        output_dir: args.output.clone(),
        exclude_patterns,
        extensions,
        dry_run: args.dry_run,
        show_diff: args.diff,
    })
}

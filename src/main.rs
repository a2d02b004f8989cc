use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use html_comment_remover::{build_options, run, Args, Error, Options, Summary};

fn print_summary(summary: &Summary, dry_run: bool) {
    let suffix = if dry_run { " (dry run)" } else { "" };
    println!("== html-comment-remover: Summary{suffix} ==");
    println!("Processed:           {}", summary.processed);
    println!("Changed:             {}", summary.files_changed);
    println!("Comments removed:    {}", summary.comments_removed);
    println!("Comments kept:       {}", summary.comments_kept);
    println!("Skipped:             {}", summary.skipped);
    println!("Failed:              {}", summary.failed);
}

/// Everything that must succeed before a single file is touched.
fn prepare(args: &Args) -> Result<Options> {
    let opts = build_options(args)?;

    if let Some(out) = &opts.output_dir {
        if !out.exists() && !opts.dry_run {
            fs::create_dir_all(out)
                .map_err(|e| Error::usage(e.to_string()))
                .with_context(|| format!("Error creating output directory {}", out.display()))?;
            info!("Created output directory: {}", out.display());
        }
    }
    Ok(opts)
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let opts = match prepare(&args) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<Error>().map_or(2, Error::exit_code);
            return ExitCode::from(code as u8);
        }
    };

    info!("Removing comments: {}", opts.policy);
    if opts.dry_run {
        warn!("Dry run: no files will be written");
    }

    let summary = run(&args.paths, &opts, Summary::default());
    print_summary(&summary, opts.dry_run);

    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

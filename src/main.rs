//! Main entry point for modinfo
use anyhow::Context;
use clap::Parser;
use log::{debug, warn};
use std::io::{self, BufWriter};

use modinfo::cli::args::Cli;
use modinfo::core::release::running_release;
use modinfo::formats::text::TextWriter;
use modinfo::resolver::ModuleResolver;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let selection = cli.selection();
    let layout = cli.layout();
    let release = match &cli.kernel_release {
        Some(release) => release.clone(),
        None => running_release().unwrap_or_else(|e| {
            warn!("{}", e);
            String::new()
        }),
    };
    debug!(
        "release '{}', modules under {}, {} tag(s) selected",
        release,
        layout.base_dir.display(),
        selection.len()
    );

    let stdout = io::stdout();
    let mut writer = TextWriter::new(BufWriter::new(stdout.lock()), cli.output_mode());
    let summary = ModuleResolver::new(&layout, &selection)
        .resolve_and_scan(&cli.modules, &release, &mut writer)
        .context("failed to write module information")?;
    writer
        .flush()
        .context("failed to write module information")?;

    debug!(
        "{} module(s) scanned, {} unreadable",
        summary.scanned,
        summary.failures.len()
    );
    Ok(())
}

fn init_logging(debug: bool) {
    let env = env_logger::Env::default().filter_or("MODINFO_LOG", "warn");
    let mut builder = env_logger::Builder::from_env(env);
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

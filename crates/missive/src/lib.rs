//! # Missive - Bulk Message Preview
//!
//! Renders a message template once per recipient and prints the result.
//!
//! ```text
//! $ missive -t welcome.tmpl -d team.yaml
//! alice
//! Hello Alice!<br>Your order #12345 is ready.
//!
//! bob
//! Hello Bob!<br>Your order #67890 is ready.
//! ```
//!
//! The rendering itself lives in [`missive_render`]; this crate adds argument
//! parsing, logging, file handling and output formatting. Delivery is modeled
//! by [`sink::MessageSink`]; the CLI only ever uses the printing
//! [`sink::WriterSink`].

pub mod cli;
pub mod logging;
pub mod output;
pub mod sink;

use std::fs::File;
use std::io::{BufReader, Write};

use anyhow::{bail, Context};
use missive_render::{DecoderRegistry, Pipeline, RenderOptions};

pub use cli::Cli;
pub use output::OutputMode;
pub use sink::{deliver, DeliveryOutcome, DeliveryReport, MessageSink, SinkError, WriterSink};

/// Runs the CLI, writing everything except logs to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<()> {
    let registry = DecoderRegistry::new();

    if cli.list_formats {
        for format in registry.supported_formats() {
            writeln!(out, "{}", format)?;
        }
        return Ok(());
    }

    let template_path = cli.template.as_deref().context("no template file given")?;
    let data_path = cli.data.as_deref().context("no data file given")?;

    let decoder = registry
        .lookup(&data_path.to_string_lossy())
        .with_context(|| format!("cannot read recipients from {}", data_path.display()))?;

    let template = File::open(template_path)
        .with_context(|| format!("failed to open template {}", template_path.display()))?;
    let data = File::open(data_path)
        .with_context(|| format!("failed to open data file {}", data_path.display()))?;

    let options = RenderOptions::new()
        .with_syntax(cli.syntax)
        .with_normalize(!cli.raw);

    let batch = Pipeline::with_options(options)
        .prepare(BufReader::new(template), BufReader::new(data), decoder.as_ref())
        .with_context(|| {
            format!(
                "failed to load {} and {}",
                template_path.display(),
                data_path.display()
            )
        })?;

    tracing::info!(
        recipient_count = batch.recipient_count(),
        placeholders = ?batch.placeholders(),
        syntax = %cli.syntax,
        "prepared message batch"
    );

    // --recipient filters output only; every recipient is rendered.
    let mut messages = batch.render().context("failed to render messages")?;

    if !cli.recipients.is_empty() {
        for id in &cli.recipients {
            if !messages.contains_key(id) {
                bail!("unknown recipient '{}' (not in {})", id, data_path.display());
            }
        }
        messages.retain(|recipient, _| cli.recipients.contains(recipient));
    }

    let mut sink = WriterSink::new(&mut *out, cli.output);
    let report = deliver(&mut sink, &messages);
    sink.finish().context("failed to write output")?;

    if let Some(failure) = report.failures().next() {
        bail!(
            "{} of {} messages failed, first for '{}'",
            report.failed(),
            report.total(),
            failure.recipient
        );
    }

    Ok(())
}

use std::fmt;

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::print::PRINT_TARGET;

pub struct HostsFormatter;

impl<S, N> FormatEvent<S, N> for HostsFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        // Printed text carries its own colors; write it untouched.
        if meta.target() == PRINT_TARGET {
            let mut visitor: MessageVisitor = MessageVisitor::default();
            event.record(&mut visitor);
            return writeln!(writer, "{}", visitor.message);
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("[ ]", |s| s.dimmed()),
            Level::DEBUG => ("[?]", |s| s.blue()),
            Level::INFO => ("[+]", |s| s.green().bold()),
            Level::WARN => ("[*]", |s| s.yellow().bold()),
            Level::ERROR => ("[-]", |s| s.red().bold()),
        };
        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// Warnings and errors go to stderr, everything else to stdout.
pub fn init(verbose: bool) {
    let env: Option<String> = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter: EnvFilter = build_filter(verbose, env.as_deref());
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .event_format(HostsFormatter)
        .with_env_filter(filter)
        .with_writer(writer)
        .init();
}

/// `RUST_LOG` (or the verbosity default) for diagnostics; printed output is always on.
fn build_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    let default_level: &str = if verbose { "debug" } else { "info" };
    let filter: EnvFilter = env
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    match format!("{PRINT_TARGET}=info").parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

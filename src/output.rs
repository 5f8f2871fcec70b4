//! Result formatting
//!
//! Plain output is one entry per line; JSON output is a single array.

use std::fmt::Display;
use std::io::{self, Write};

use serde::Serialize;

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// Write each item on its own line, or as a pretty-printed JSON array.
pub fn write_items<'a, T, I, W>(out: &mut W, items: I, format: OutputFormat) -> io::Result<()>
where
    T: Display + Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    W: Write,
{
    match format {
        OutputFormat::Plain => {
            for item in items {
                writeln!(out, "{}", item)?;
            }
        }
        OutputFormat::Json => {
            let items: Vec<&T> = items.into_iter().collect();
            serde_json::to_writer_pretty(&mut *out, &items).map_err(io::Error::other)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write items to stdout.
pub fn print_items<'a, T, I>(items: I, format: OutputFormat) -> io::Result<()>
where
    T: Display + Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_items(&mut out, items, format)?;
    out.flush()
}

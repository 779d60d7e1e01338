//! Feature rendering for the command line.
//!
//! Substrings are arbitrary bytes, so the default rendering escapes
//! everything below space C-style (named escapes where they exist, octal
//! otherwise). Tagged streams produced by the `tag` subcommand are rendered
//! with one terminal color per class letter; JSON mode emits one object per
//! feature for downstream tooling.

use anyhow::Result;
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One feature, as serialized in `--json` mode.
#[derive(Serialize)]
struct FeatureRecord<'a> {
    log_odds: f64,
    input0_hits: usize,
    input1_hits: usize,
    substring: Cow<'a, str>,
}

/// Writes admitted features to standard output.
pub struct FeaturePrinter {
    stream: StandardStream,
    color_pairs: bool,
    json: bool,
    is_tty: bool,
}

impl FeaturePrinter {
    pub fn new(color_pairs: bool, json: bool) -> Self {
        let is_tty = io::stdout().is_terminal();
        let choice = if is_tty {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };

        Self {
            stream: StandardStream::stdout(choice),
            color_pairs,
            json,
            is_tty,
        }
    }

    /// Print one feature record.
    pub fn print(
        &mut self,
        input0_hits: usize,
        input1_hits: usize,
        log_odds: f64,
        substring: &[u8],
    ) -> Result<()> {
        if self.json {
            let record = FeatureRecord {
                log_odds,
                input0_hits,
                input1_hits,
                substring: String::from_utf8_lossy(substring),
            };
            serde_json::to_writer(&mut self.stream, &record)?;
            writeln!(self.stream)?;
            return Ok(());
        }

        write!(self.stream, "{log_odds:.3}\t{input0_hits}\t{input1_hits}\t")?;

        if self.color_pairs {
            self.write_tagged(substring)?;
        } else {
            write_escaped(&mut self.stream, substring)?;
        }

        writeln!(self.stream)?;
        Ok(())
    }

    /// Render a (class, byte) pair stream.
    ///
    /// On a terminal the class byte selects the color and only the data byte
    /// is shown; elsewhere the class byte is passed through so the output
    /// stays machine-parseable.
    fn write_tagged(&mut self, substring: &[u8]) -> Result<()> {
        for pair in substring.chunks(2) {
            if pair.len() == 2 && self.is_tty {
                self.stream
                    .set_color(ColorSpec::new().set_fg(Some(class_color(pair[0]))).set_bold(true))?;
                write_escaped(&mut self.stream, &pair[1..])?;
            } else {
                write_escaped(&mut self.stream, pair)?;
            }
        }

        if self.is_tty {
            self.stream.reset()?;
        }

        Ok(())
    }
}

/// Terminal color for a class tag byte (`b'A' + class`).
fn class_color(class: u8) -> Color {
    match class.wrapping_sub(b'A') {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::White,
    }
}

/// Write `bytes` with control characters escaped C-style.
///
/// Bytes at or above space pass through untouched (including non-ASCII);
/// backslash is doubled; the rest use named escapes or three-digit octal.
pub fn write_escaped<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    for &byte in bytes {
        if byte >= b' ' && byte != b'\\' {
            out.write_all(&[byte])?;
            continue;
        }

        out.write_all(b"\\")?;
        match byte {
            0x07 => out.write_all(b"a")?,
            0x08 => out.write_all(b"b")?,
            b'\t' => out.write_all(b"t")?,
            b'\n' => out.write_all(b"n")?,
            0x0b => out.write_all(b"v")?,
            0x0c => out.write_all(b"f")?,
            b'\r' => out.write_all(b"r")?,
            b'\\' => out.write_all(b"\\")?,
            _ => write!(out, "{byte:03o}")?,
        }
    }

    Ok(())
}

// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Text serialization of weight matrices and injection vectors.
//!
//! Both formats are read by the network simulator: one line per row, every
//! value followed by a comma, no header. Files whose name ends in `.gz` are
//! gzip compressed.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::{Error, InjectionVector, WeightMatrix};

/// Format a weight the way the simulator's input files spell it: shortest
/// round-trip digits, `.0` on integral values, and a signed two-digit
/// exponent for very small or very large magnitudes (`1e-05`, `1e+16`).
pub fn format_value(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

fn format_line(values: impl Iterator<Item = f64>) -> String {
    let mut line = values.map(|v| format_value(v) + ",").collect::<String>();
    line.push('\n');
    line
}

/// The text lines of `matrix`, one per source node, newline included.
pub fn matrix_lines(matrix: &WeightMatrix) -> impl Iterator<Item = String> + '_ {
    matrix.rows().map(|row| format_line(row.iter().copied()))
}

/// The text lines of `injection`, one per node, newline included.
pub fn injection_lines(injection: &InjectionVector) -> impl Iterator<Item = String> + '_ {
    injection.values().map(|v| format_line(std::iter::once(v)))
}

pub fn serialize_matrix<W: Write>(matrix: &WeightMatrix, out: &mut W) -> io::Result<()> {
    for line in matrix_lines(matrix) {
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

pub fn serialize_injection<W: Write>(injection: &InjectionVector, out: &mut W) -> io::Result<()> {
    for line in injection_lines(injection) {
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

pub(crate) fn is_compressed(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// An output file, compressed or not depending on its name.
enum Output {
    Plain(BufWriter<File>),
    // GzEncoder::new writes a zero mtime, so output is reproducible.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(if is_compressed(path) {
            Self::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Self::Plain(file)
        })
    }

    fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut file) => file.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(file) => file.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(file) => file.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

fn write_file<F>(path: &Path, serialize: F) -> Result<(), Error>
where
    F: FnOnce(&mut Output) -> io::Result<()>,
{
    let result = Output::create(path).and_then(|mut out| {
        serialize(&mut out)?;
        out.finish()
    });
    result.map_err(|e| Error::io(path, e))
}

pub fn write_matrix(matrix: &WeightMatrix, path: &Path) -> Result<(), Error> {
    log::debug!(
        "writing {}x{} matrix to {}",
        matrix.nodes(),
        matrix.nodes(),
        path.display()
    );
    write_file(path, |out| serialize_matrix(matrix, out))
}

pub fn write_injection(injection: &InjectionVector, path: &Path) -> Result<(), Error> {
    log::debug!(
        "writing {} node injection vector to {}",
        injection.nodes(),
        path.display()
    );
    write_file(path, |out| serialize_injection(injection, out))
}

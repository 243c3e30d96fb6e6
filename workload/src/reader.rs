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

//! Parsers for the files produced by the writer.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::writer::is_compressed;
use crate::{Error, InjectionVector, WeightMatrix};

fn parse_error(line: usize, reason: impl Into<String>) -> Error {
    Error::Parse {
        line,
        reason: reason.into(),
    }
}

/// Split one comma-terminated line into its values.
fn parse_line(number: usize, line: &str) -> Result<Vec<f64>, Error> {
    let body = line
        .strip_suffix(',')
        .ok_or_else(|| parse_error(number, "missing trailing comma"))?;
    body.split(',')
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|e| parse_error(number, format!("bad value '{}': {}", field, e)))
        })
        .collect()
}

fn parse_lines<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>, Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line.map_err(|e| parse_error(i + 1, e.to_string()))?;
            parse_line(i + 1, &line)
        })
        .collect()
}

pub fn parse_matrix<R: BufRead>(reader: R) -> Result<WeightMatrix, Error> {
    let rows = parse_lines(reader)?;
    let nodes = rows.len();
    let mut weights = Vec::with_capacity(nodes * nodes);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != nodes {
            return Err(parse_error(
                i + 1,
                format!("expected {} values, got {}", nodes, row.len()),
            ));
        }
        weights.extend(row);
    }
    Ok(WeightMatrix::from_rows(nodes, weights))
}

pub fn parse_injection<R: BufRead>(reader: R) -> Result<InjectionVector, Error> {
    parse_lines(reader)?
        .into_iter()
        .enumerate()
        .map(|(i, values)| match values[..] {
            [v] if v == 1.0 => Ok(true),
            [v] if v == 0.0 => Ok(false),
            _ => Err(parse_error(i + 1, "expected a single 0.0 or 1.0")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(InjectionVector::from_members)
}

fn open(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(if is_compressed(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

/// Read a matrix file, decompressing it if its name ends in `.gz`.
pub fn read_matrix(path: &Path) -> Result<WeightMatrix, Error> {
    parse_matrix(open(path)?)
}

/// Read an injection file, decompressing it if its name ends in `.gz`.
pub fn read_injection(path: &Path) -> Result<InjectionVector, Error> {
    parse_injection(open(path)?)
}

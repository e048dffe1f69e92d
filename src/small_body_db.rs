//! # JPL small-body element tables
//!
//! Reader for the fixed-width comet table published by JPL as
//! `ELEMENTS.COMET`. Fetching and caching the file is left to the caller;
//! this module only parses a local copy (or any [`BufRead`]).
//!
//! ## Format
//!
//! Two header lines (column names and dashes), then one comet per line:
//!
//! | Columns   | Field                                  |
//! |-----------|----------------------------------------|
//! | 0..43     | Designation and name                   |
//! | 44..51    | Epoch of the elements (MJD, TDB)       |
//! | 52..63    | Perihelion distance `q` (AU)           |
//! | 64..74    | Eccentricity `e`                       |
//! | 75..84    | Inclination `i` (deg, J2000 ecliptic)  |
//! | 85..94    | Argument of perihelion `ω` (deg)       |
//! | 95..104   | Longitude of ascending node `Ω` (deg)  |
//! | 105..119  | Perihelion time `YYYYMMDD.dddd` (TDB)  |
//!
//! Anything after column 119 (the orbit solution reference) is ignored.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    ops::Range,
    str::FromStr,
};

use camino::Utf8Path;
use hifitime::{Epoch, TimeScale};
use log::warn;

use crate::{
    bodies::Body,
    constants::{JulianDate, JDTOMJD, RADEG},
    ephem_errors::EphemError,
    orbit_type::OrbitalElements,
};

const NAME: Range<usize> = 0..43;
const EPOCH: Range<usize> = 44..51;
const PERIHELION_DISTANCE: Range<usize> = 52..63;
const ECCENTRICITY: Range<usize> = 64..74;
const INCLINATION: Range<usize> = 75..84;
const PERIAPSIS_ARGUMENT: Range<usize> = 85..94;
const ASCENDING_NODE: Range<usize> = 95..104;
const PERIHELION_TIME: Range<usize> = 105..119;

/// One comet of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct CometRecord {
    pub name: String,
    pub elements: OrbitalElements,
}

impl CometRecord {
    pub fn into_body(self) -> Body {
        Body::from_elements(self.name, self.elements)
    }
}

fn field<'a>(line: &'a str, columns: Range<usize>, what: &str, line_no: usize) -> Result<&'a str, EphemError> {
    line.get(columns.clone())
        .map(str::trim)
        .ok_or_else(|| EphemError::ElementParsing {
            line: line_no,
            reason: format!("missing {what} (columns {}..{})", columns.start, columns.end),
        })
}

fn number<T: FromStr>(line: &str, columns: Range<usize>, what: &str, line_no: usize) -> Result<T, EphemError> {
    let raw = field(line, columns, what, line_no)?;
    raw.parse().map_err(|_| EphemError::ElementParsing {
        line: line_no,
        reason: format!("invalid {what} {raw:?}"),
    })
}

/// Julian date (TDB) of a `YYYYMMDD.dddd` calendar date.
fn parse_perihelion_time(raw: &str, line_no: usize) -> Result<JulianDate, EphemError> {
    let invalid = || EphemError::ElementParsing {
        line: line_no,
        reason: format!("invalid perihelion time {raw:?}"),
    };

    let (date, fraction) = raw.split_at(raw.find('.').unwrap_or(raw.len()));
    if date.len() != 8 || !date.is_ascii() {
        return Err(invalid());
    }
    let digits = |columns: Range<usize>| date.get(columns).ok_or_else(invalid);
    let year: i32 = digits(0..4)?.parse().map_err(|_| invalid())?;
    let month: u8 = digits(4..6)?.parse().map_err(|_| invalid())?;
    let day: u8 = digits(6..8)?.parse().map_err(|_| invalid())?;
    let fraction: f64 = if fraction.is_empty() {
        0.0
    } else {
        format!("0{fraction}").parse().map_err(|_| invalid())?
    };

    let midnight = Epoch::maybe_from_gregorian(year, month, day, 0, 0, 0, 0, TimeScale::TDB)
        .map_err(|_| invalid())?;
    Ok(midnight.to_jde_tdb_days() + fraction)
}

/// Parse a single data line of `ELEMENTS.COMET`.
///
/// Arguments
/// -----------------
/// * `line` – The raw line.
/// * `line_no` – 1-based line number, used in error messages.
///
/// Errors
/// -----------------
/// * [`EphemError::ElementParsing`] for a short line or an unparsable field.
/// * [`EphemError::InvalidElements`] if the parsed values do not form a valid orbit.
pub fn parse_comet_line(line: &str, line_no: usize) -> Result<CometRecord, EphemError> {
    let name = field(line, NAME, "name", line_no)?.to_string();
    let epoch_mjd: f64 = number(line, EPOCH, "epoch", line_no)?;
    let q: f64 = number(line, PERIHELION_DISTANCE, "perihelion distance", line_no)?;
    let e: f64 = number(line, ECCENTRICITY, "eccentricity", line_no)?;
    let i: f64 = number(line, INCLINATION, "inclination", line_no)?;
    let peri: f64 = number(line, PERIAPSIS_ARGUMENT, "argument of perihelion", line_no)?;
    let node: f64 = number(line, ASCENDING_NODE, "ascending node", line_no)?;
    let tp = parse_perihelion_time(field(line, PERIHELION_TIME, "perihelion time", line_no)?, line_no)?;

    let elements = OrbitalElements::comet_jd(
        epoch_mjd + JDTOMJD,
        q,
        e,
        i * RADEG,
        peri * RADEG,
        node * RADEG,
        tp,
    )?;
    Ok(CometRecord { name, elements })
}

fn is_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("Num") || trimmed.starts_with("---")
}

/// In-memory comet table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CometTable {
    records: Vec<CometRecord>,
}

impl CometTable {
    /// Read every comet of `reader`.
    ///
    /// Header and blank lines are ignored; lines that fail to parse are
    /// skipped with a warning.
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::IoError`] if reading fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, EphemError> {
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || is_header(&line) {
                continue;
            }
            match parse_comet_line(&line, idx + 1) {
                Ok(record) => records.push(record),
                Err(err) => warn!("skipping comet element line: {err}"),
            }
        }
        Ok(CometTable { records })
    }

    /// Read a local copy of `ELEMENTS.COMET`.
    pub fn from_file(path: &Utf8Path) -> Result<Self, EphemError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CometRecord] {
        &self.records
    }

    /// First comet whose name contains `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<&CometRecord> {
        let needle = name.trim().to_lowercase();
        self.records
            .iter()
            .find(|r| r.name.to_lowercase().contains(&needle))
    }
}

/// Search a comet by name directly in a table stream, parsing only the match.
///
/// Errors
/// -----------------
/// * [`EphemError::BodyNotFound`] if no line matches.
/// * [`EphemError::ElementParsing`] if the matching line is malformed.
pub fn find_comet<R: BufRead>(reader: R, name: &str) -> Result<CometRecord, EphemError> {
    let needle = name.trim().to_lowercase();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_header(&line) {
            continue;
        }
        let matches = line
            .get(NAME)
            .or_else(|| line.get(NAME.start..line.len().min(NAME.end)))
            .is_some_and(|n| n.to_lowercase().contains(&needle));
        if matches {
            return parse_comet_line(&line, idx + 1);
        }
    }
    Err(EphemError::BodyNotFound(name.to_string()))
}

//! Event pages (workshops, boot camps).
//!
//! An event page declares its venue and dates in markers:
//!
//! ```text
//! <meta name="venue" content="Paris" />
//! <meta name="latlng" content="48.8566,2.3522" />
//! <meta name="startdate" content="2013-06-30" />
//! <meta name="enddate" content="2013-07-01" />
//! ```
//!
//! The two dates are merged into one display string, picking the shortest
//! unambiguous form:
//!
//! | Dates | Display |
//! |-------|---------|
//! | no end date | `Jun 1, 2013` |
//! | different years | `Dec 30, 2013 - Jan 2, 2014` |
//! | different months | `Jun 30 - Jul 1, 2013` |
//! | same month | `Jun 1-2, 2013` |
//!
//! Events sort by start date, then venue.

use super::PageError;
use crate::metadata::Metadata;
use crate::naming;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    pub slug: String,
    pub venue: String,
    /// Merged human-readable date range.
    pub date: String,
    #[serde(skip)]
    pub start: NaiveDate,
    #[serde(skip)]
    pub end: Option<NaiveDate>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

pub fn finalize(path: &Path, metadata: &Metadata) -> Result<EventDetails, PageError> {
    let venue = required(metadata, "venue", path)?;
    let start = parse_date("startdate", required(metadata, "startdate", path)?, path)?;
    let end = metadata
        .single("enddate")
        .map(|value| parse_date("enddate", value, path))
        .transpose()?;
    let date = merge_dates(start, end).ok_or_else(|| PageError::BadDateRange {
        start: start.to_string(),
        end: end.map(|d| d.to_string()).unwrap_or_default(),
        path: path.to_path_buf(),
    })?;
    let coordinates = metadata
        .single("latlng")
        .map(|value| parse_coordinates(value, path))
        .transpose()?;

    Ok(EventDetails {
        slug: naming::file_slug(path),
        venue: venue.to_string(),
        date,
        start,
        end,
        coordinates,
    })
}

/// Merge start and end dates into display form.
///
/// Returns `None` when the end date falls before the start date. An end date
/// equal to the start date reads as a single day.
pub fn merge_dates(start: NaiveDate, end: Option<NaiveDate>) -> Option<String> {
    let end = match end {
        None => return Some(start.format("%b %-d, %Y").to_string()),
        Some(end) if end < start => return None,
        Some(end) if end == start => return Some(start.format("%b %-d, %Y").to_string()),
        Some(end) => end,
    };

    let merged = if start.year() != end.year() {
        format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
    } else if start.month() != end.month() {
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
    } else {
        format!("{}-{}", start.format("%b %-d"), end.format("%-d, %Y"))
    };
    Some(merged)
}

fn required<'m>(metadata: &'m Metadata, field: &'static str, path: &Path) -> Result<&'m str, PageError> {
    metadata.single(field).ok_or_else(|| PageError::MissingField {
        field,
        path: path.to_path_buf(),
    })
}

fn parse_date(field: &'static str, value: &str, path: &Path) -> Result<NaiveDate, PageError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| PageError::BadValue {
        field,
        value: value.to_string(),
        path: path.to_path_buf(),
    })
}

fn parse_coordinates(value: &str, path: &Path) -> Result<Coordinates, PageError> {
    let bad = || PageError::BadValue {
        field: "latlng",
        value: value.to_string(),
        path: path.to_path_buf(),
    };
    let (lat, lng) = value.split_once(',').ok_or_else(bad)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| bad())?;
    let longitude: f64 = lng.trim().parse().map_err(|_| bad())?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(bad());
    }
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

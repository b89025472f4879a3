//! Trip records and the station graph built from them.
//!
//! # Overview
//!
//! Input is JSON Lines, one trip per line, in the layout bike-share
//! operators publish:
//!
//! ```json
//! {"ride_id":"A1","rideable_type":"classic_bike","started_at":"2023-01-05 08:10:00",
//!  "ended_at":"2023-01-05 08:25:30","start_station_id":"13022.0","end_station_id":13300,
//!  "member_casual":"member"}
//! ```
//!
//! [`TripGraphBuilder`] turns those into a [`StationGraph`]:
//!
//! 1. Station ids are trimmed, and integral numeric ids lose their decimal
//!    tail (`"13022.0"` → `"13022"`) so the same station is not split in two.
//! 2. Records without both station ids or with unparsable timestamps are
//!    dropped and logged.
//! 3. Every `(start, end)` pair becomes one route whose weight is the trip
//!    count, with rider-type counts, summed travel time and the timestamps of
//!    the first trip seen.
//! 4. Station attributes come from the first record mentioning the station.

use std::collections::BTreeMap;
use std::io::BufRead;

use chrono::{DateTime, Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument, warn};

use crate::error::GraphError;
use crate::graph::{GraphAdapter, Route, Station, StationGraph};

// ---------------------------------------------------------------------------
// TripRecord
// ---------------------------------------------------------------------------

/// One trip as published by the operator. Every field may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripRecord {
    pub ride_id: Option<String>,
    pub rideable_type: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    /// Station ids appear as strings or bare numbers depending on the export.
    #[serde(deserialize_with = "station_id")]
    pub start_station_id: Option<String>,
    pub start_station_name: Option<String>,
    #[serde(deserialize_with = "station_id")]
    pub end_station_id: Option<String>,
    pub end_station_name: Option<String>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    /// `"member"` or `"casual"`, any case.
    pub member_casual: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn station_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

/// Read JSON Lines trip records. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`GraphError::Io`] if reading fails and
/// [`GraphError::TripRecord`] (with the 1-based line number) for a line that
/// is not a trip object.
pub fn read_trips<R: BufRead>(reader: R) -> Result<Vec<TripRecord>, GraphError> {
    let mut trips = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let trip = serde_json::from_str(&line).map_err(|e| GraphError::TripRecord {
            line: i + 1,
            reason: e.to_string(),
        })?;
        trips.push(trip);
    }
    Ok(trips)
}

/// Normalise a raw station id.
///
/// Returns `None` for blank ids. Numeric ids with an integral value are
/// rewritten as plain integers; anything else is kept as trimmed text.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn normalize_station_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    if id.is_empty() {
        return None;
    }
    match id.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract().abs() < f64::EPSILON && v.abs() < 9.0e15 => {
            Some(format!("{}", v as i64))
        }
        _ => Some(id.to_string()),
    }
}

/// Parse an operator timestamp: `YYYY-MM-DD HH:MM:SS` with optional
/// fractional seconds, the same with a `T` separator, or RFC 3339.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Counts from one graph build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BuildReport {
    /// Records handed to the builder.
    pub trips_read: usize,
    /// Records dropped for missing ids or bad timestamps.
    pub trips_dropped: usize,
    /// Stations in the built graph.
    pub stations: usize,
    /// Routes in the built graph.
    pub routes: usize,
}

/// Builds a [`StationGraph`] from trip records.
#[derive(Debug, Clone, Copy)]
pub struct TripGraphBuilder {
    directed: bool,
}

impl Default for TripGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A trip that survived cleaning.
struct CleanTrip {
    start: String,
    end: String,
    started_at: NaiveDateTime,
    ended_at: NaiveDateTime,
}

impl TripGraphBuilder {
    /// A builder for directed graphs.
    #[must_use]
    pub const fn new() -> Self {
        Self { directed: true }
    }

    /// Whether the built graph respects route direction.
    #[must_use]
    pub const fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Aggregate `trips` into a station graph.
    #[must_use]
    #[instrument(skip_all, fields(directed = self.directed))]
    pub fn build<I>(&self, trips: I) -> (StationGraph, BuildReport)
    where
        I: IntoIterator<Item = TripRecord>,
    {
        let mut graph = StationGraph::new(self.directed);
        let mut routes: BTreeMap<(String, String), Route> = BTreeMap::new();
        let mut report = BuildReport::default();

        for trip in trips {
            report.trips_read += 1;
            let clean = match clean(&trip) {
                Ok(clean) => clean,
                Err(reason) => {
                    report.trips_dropped += 1;
                    warn!(ride_id = trip.ride_id.as_deref().unwrap_or("?"), reason, "dropping trip");
                    continue;
                }
            };

            graph.add_station(Station {
                id: clean.start.clone(),
                name: trip.start_station_name.clone(),
                lat: trip.start_lat,
                lng: trip.start_lng,
            });
            graph.add_station(Station {
                id: clean.end.clone(),
                name: trip.end_station_name.clone(),
                lat: trip.end_lat,
                lng: trip.end_lng,
            });

            let route = routes
                .entry((clean.start.clone(), clean.end.clone()))
                .or_insert_with(|| Route {
                    first_started_at: Some(clean.started_at),
                    first_ended_at: Some(clean.ended_at),
                    start_year: Some(clean.started_at.year()),
                    end_year: Some(clean.ended_at.year()),
                    ..Route::new(format!("{}-{}", clean.start, clean.end), 0.0)
                });
            accumulate(route, &trip, &clean);
        }

        for ((start, end), route) in routes {
            graph.add_route(&start, &end, route);
        }

        report.stations = graph.vertex_count();
        report.routes = graph.edge_count();
        info!(
            trips_read = report.trips_read,
            trips_dropped = report.trips_dropped,
            stations = report.stations,
            routes = report.routes,
            "built station graph"
        );
        (graph, report)
    }
}

fn clean(trip: &TripRecord) -> Result<CleanTrip, &'static str> {
    let start = trip
        .start_station_id
        .as_deref()
        .and_then(normalize_station_id)
        .ok_or("missing start station id")?;
    let end = trip
        .end_station_id
        .as_deref()
        .and_then(normalize_station_id)
        .ok_or("missing end station id")?;
    let started_at = trip
        .started_at
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or("missing or unparsable started_at")?;
    let ended_at = trip
        .ended_at
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or("missing or unparsable ended_at")?;
    Ok(CleanTrip {
        start,
        end,
        started_at,
        ended_at,
    })
}

#[allow(clippy::cast_precision_loss)]
fn accumulate(route: &mut Route, trip: &TripRecord, clean: &CleanTrip) {
    route.weight += 1.0;
    route.travel_time_secs +=
        (clean.ended_at - clean.started_at).num_milliseconds() as f64 / 1000.0;
    match trip
        .member_casual
        .as_deref()
        .map(|s| s.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("casual") => route.casual_count += 1,
        Some("member") => route.member_count += 1,
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Feature reconstruction for the price model.
//!
//! Turns raw itinerary fields into the exact column vector the model was
//! trained on. Pure functions only; the schema is the single source of
//! column order.

use chrono::{Datelike, NaiveDateTime, Timelike};
use ndarray::Array2;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{PredictorError, Result};
use crate::models::ItineraryInput;
use crate::schema::{Category, ColumnSchema, FixedField};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

const MINUTES_PER_DAY: i64 = 24 * 60;

pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| {
        PredictorError::MalformedTimestamp {
            field,
            value: raw.to_string(),
            source,
        }
    })
}

/// Minutes from departure to arrival, both naive local times.
///
/// A negative difference gets one day added (overnight flight). This only
/// holds for flights crossing a single midnight; an arrival more than a day
/// before departure stays negative, and no multi-day correction is attempted.
pub fn duration_minutes(departure: NaiveDateTime, arrival: NaiveDateTime) -> i64 {
    let minutes = (arrival - departure).num_minutes();
    if minutes < 0 {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    }
}

/// Date and time components derived from one itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItineraryTimes {
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub duration_minutes: i64,
}

impl ItineraryTimes {
    pub fn parse(input: &ItineraryInput) -> Result<Self> {
        let departure = parse_timestamp("departure_datetime", &input.departure_datetime)?;
        let arrival = parse_timestamp("arrival_datetime", &input.arrival_datetime)?;

        Ok(Self {
            departure,
            arrival,
            duration_minutes: duration_minutes(departure, arrival),
        })
    }
}

fn fixed_value(field: FixedField, input: &ItineraryInput, times: &ItineraryTimes) -> f64 {
    match field {
        FixedField::TotalStops => f64::from(input.total_stops),
        FixedField::Date => f64::from(times.departure.day()),
        FixedField::Month => f64::from(times.departure.month()),
        FixedField::DeptHour => f64::from(times.departure.hour()),
        FixedField::DeptMin => f64::from(times.departure.minute()),
        FixedField::ArrivalHour => f64::from(times.arrival.hour()),
        FixedField::ArrivalMin => f64::from(times.arrival.minute()),
        FixedField::DurationMinutes => times.duration_minutes as f64,
    }
}

/// Builds the model input for `input`, keyed and ordered exactly as `schema`.
///
/// Category values the schema does not know leave their whole group at 0,
/// which the model reads as the baseline category. `Additional_Info_*` is
/// always 0 since no form field feeds it.
pub fn build_features(input: &ItineraryInput, schema: &ColumnSchema) -> Result<FeatureVector> {
    let times = ItineraryTimes::parse(input)?;
    let mut values = vec![0.0; schema.len()];

    for &(index, field) in schema.fixed_positions() {
        values[index] = fixed_value(field, input, &times);
    }

    let selected = [
        (Category::Airline, input.airline.as_str()),
        (Category::Source, input.source.as_str()),
        (Category::Destination, input.destination.as_str()),
    ];
    for (category, value) in selected {
        match schema.one_hot_index(category, value) {
            Some(index) => values[index] = 1.0,
            None => tracing::debug!("{} '{}' not in schema, using baseline", category, value),
        }
    }

    let entries = schema.names().map(str::to_string).zip(values).collect();

    Ok(FeatureVector { entries })
}

/// Ordered column name to value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Single-row `[1, n]` matrix in column order.
    pub fn to_array(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, self.entries.len()), |(_, col)| self.entries[col].1 as f32)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp("departure_datetime", raw).unwrap()
    }

    fn schema(list: &[&str]) -> ColumnSchema {
        ColumnSchema::from_columns(list.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn itinerary(airline: &str, source: &str, destination: &str) -> ItineraryInput {
        ItineraryInput {
            airline: airline.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            total_stops: 1,
            departure_datetime: "2024-03-05T10:15".to_string(),
            arrival_datetime: "2024-03-05T13:45".to_string(),
        }
    }

    const REFERENCE_COLUMNS: [&str; 11] = [
        "Total_Stops",
        "Date",
        "Month",
        "Dept_hour",
        "Dept_min",
        "Arrival_hour",
        "Arrival_min",
        "Duration_minutes",
        "Airline_Jet Airways",
        "Source_Delhi",
        "Destination_Cochin",
    ];

    #[test]
    fn same_day_duration_is_clock_difference() {
        assert_eq!(duration_minutes(ts("2024-03-05T10:15"), ts("2024-03-05T13:45")), 210);
        assert_eq!(duration_minutes(ts("2024-03-05T00:00"), ts("2024-03-05T23:59")), 1439);
        assert_eq!(duration_minutes(ts("2024-03-05T08:30"), ts("2024-03-05T08:30")), 0);
    }

    #[test]
    fn overnight_flight_spans_midnight() {
        assert_eq!(duration_minutes(ts("2024-01-01T23:00"), ts("2024-01-02T01:00")), 120);
    }

    #[test]
    fn arrival_date_left_on_departure_day_is_corrected() {
        // Arrival clock earlier than departure on the same date.
        assert_eq!(duration_minutes(ts("2024-01-01T23:00"), ts("2024-01-01T01:00")), 120);
    }

    #[test]
    fn multi_day_gap_is_not_generalised() {
        assert_eq!(duration_minutes(ts("2024-01-03T10:00"), ts("2024-01-01T10:00")), -1440);
        assert_eq!(duration_minutes(ts("2024-01-01T10:00"), ts("2024-01-03T11:00")), 2940);
    }

    #[test]
    fn malformed_timestamp_names_the_field() {
        let err = parse_timestamp("arrival_datetime", "2024-03-05 13:45").unwrap_err();
        assert!(matches!(
            err,
            PredictorError::MalformedTimestamp { field: "arrival_datetime", .. }
        ));
    }

    #[test]
    fn builds_reference_vector() {
        let schema = schema(&REFERENCE_COLUMNS);
        let features =
            build_features(&itinerary("Jet Airways", "Delhi", "Mumbai"), &schema).unwrap();

        let expected = [
            ("Total_Stops", 1.0),
            ("Date", 5.0),
            ("Month", 3.0),
            ("Dept_hour", 10.0),
            ("Dept_min", 15.0),
            ("Arrival_hour", 13.0),
            ("Arrival_min", 45.0),
            ("Duration_minutes", 210.0),
            ("Airline_Jet Airways", 1.0),
            ("Source_Delhi", 1.0),
            ("Destination_Cochin", 0.0),
        ];
        assert_eq!(features.iter().collect::<Vec<_>>(), expected.to_vec());
    }

    #[test]
    fn output_follows_schema_order_exactly() {
        let columns = [
            "Airline_IndiGo",
            "Duration_minutes",
            "Additional_Info_In-flight meal not included",
            "Source_Banglore",
            "Total_Stops",
            "Destination_Delhi",
            "Mystery",
        ];
        let schema = schema(&columns);
        let features = build_features(&itinerary("IndiGo", "Banglore", "Delhi"), &schema).unwrap();

        assert_eq!(features.names().collect::<Vec<_>>(), columns.to_vec());
        assert_eq!(
            features.values().collect::<Vec<_>>(),
            vec![1.0, 210.0, 0.0, 1.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn unknown_airline_zeroes_whole_group() {
        let schema = schema(&["Airline_IndiGo", "Airline_Vistara", "Source_Delhi"]);
        let features = build_features(&itinerary("Trujet", "Delhi", "Cochin"), &schema).unwrap();

        assert_eq!(features.get("Airline_IndiGo"), Some(0.0));
        assert_eq!(features.get("Airline_Vistara"), Some(0.0));
        assert_eq!(features.get("Source_Delhi"), Some(1.0));
    }

    #[test]
    fn matching_is_exact() {
        let schema = schema(&["Airline_Jet Airways", "Airline_Jet Airways Business"]);
        let features = build_features(&itinerary("Jet Airways", "", ""), &schema).unwrap();

        assert_eq!(features.values().collect::<Vec<_>>(), vec![1.0, 0.0]);
    }

    #[test]
    fn building_twice_gives_identical_vectors() {
        let schema = schema(&REFERENCE_COLUMNS);
        let input = itinerary("Jet Airways", "Delhi", "Cochin");

        let first = build_features(&input, &schema).unwrap();
        let second = build_features(&input, &schema).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_departure_fails_the_build() {
        let schema = schema(&REFERENCE_COLUMNS);
        let mut input = itinerary("Jet Airways", "Delhi", "Cochin");
        input.departure_datetime = "05/03/2024 10:15".to_string();

        assert!(build_features(&input, &schema).is_err());
    }

    #[test]
    fn array_is_single_row_in_column_order() {
        let schema = schema(&REFERENCE_COLUMNS);
        let features =
            build_features(&itinerary("Jet Airways", "Delhi", "Cochin"), &schema).unwrap();
        let array = features.to_array();

        assert_eq!(array.shape(), &[1, 11]);
        assert_eq!(array[[0, 7]], 210.0);
        assert_eq!(array[[0, 10]], 1.0);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let schema = schema(&["Month", "Date"]);
        let features = build_features(&itinerary("", "", ""), &schema).unwrap();

        assert_eq!(
            serde_json::to_string(&features).unwrap(),
            r#"{"Month":3.0,"Date":5.0}"#
        );
    }
}

//! Column schema of the trained model.
//!
//! The training pipeline writes its feature columns as an ordered JSON array.
//! Each name is classified once at load time so that building a feature
//! vector never has to scan the column list.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::error::{PredictorError, Result};

/// Numeric columns derived directly from the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedField {
    TotalStops,
    Date,
    Month,
    DeptHour,
    DeptMin,
    ArrivalHour,
    ArrivalMin,
    DurationMinutes,
}

impl FixedField {
    pub const ALL: [FixedField; 8] = [
        FixedField::TotalStops,
        FixedField::Date,
        FixedField::Month,
        FixedField::DeptHour,
        FixedField::DeptMin,
        FixedField::ArrivalHour,
        FixedField::ArrivalMin,
        FixedField::DurationMinutes,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            FixedField::TotalStops => "Total_Stops",
            FixedField::Date => "Date",
            FixedField::Month => "Month",
            FixedField::DeptHour => "Dept_hour",
            FixedField::DeptMin => "Dept_min",
            FixedField::ArrivalHour => "Arrival_hour",
            FixedField::ArrivalMin => "Arrival_min",
            FixedField::DurationMinutes => "Duration_minutes",
        }
    }

    fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column_name() == name)
    }
}

/// One-hot encoded categorical groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Airline,
    Source,
    Destination,
    /// No form field feeds this group; its columns are always 0.
    AdditionalInfo,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Airline,
        Category::Source,
        Category::Destination,
        Category::AdditionalInfo,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Category::Airline => "Airline_",
            Category::Source => "Source_",
            Category::Destination => "Destination_",
            Category::AdditionalInfo => "Additional_Info_",
        }
    }

    fn split(name: &str) -> Option<(Self, &str)> {
        Self::ALL
            .into_iter()
            .find_map(|category| name.strip_prefix(category.prefix()).map(|v| (category, v)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('_'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Fixed(FixedField),
    OneHot { category: Category, value: String },
    /// Recognised by neither rule; always emitted as 0.
    Unmapped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Vec<Column>,
    fixed: Vec<(usize, FixedField)>,
    one_hot: HashMap<Category, HashMap<String, usize>>,
}

impl ColumnSchema {
    pub fn from_columns(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(PredictorError::schema("schema contains no columns"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        let mut fixed = Vec::new();
        let mut one_hot: HashMap<Category, HashMap<String, usize>> = HashMap::new();

        for (index, name) in names.into_iter().enumerate() {
            if !seen.insert(name.clone()) {
                return Err(PredictorError::schema(format!(
                    "duplicate column '{}' at position {}",
                    name, index
                )));
            }

            let kind = if let Some(field) = FixedField::from_column(&name) {
                fixed.push((index, field));
                ColumnKind::Fixed(field)
            } else if let Some((category, value)) = Category::split(&name) {
                one_hot
                    .entry(category)
                    .or_default()
                    .insert(value.to_string(), index);
                ColumnKind::OneHot {
                    category,
                    value: value.to_string(),
                }
            } else {
                tracing::warn!("Column '{}' has no known encoding, it will always be 0", name);
                ColumnKind::Unmapped
            };

            columns.push(Column { name, kind });
        }

        for field in FixedField::ALL {
            if !fixed.iter().any(|(_, f)| *f == field) {
                tracing::debug!("Schema has no '{}' column", field.column_name());
            }
        }

        Ok(Self {
            columns,
            fixed,
            one_hot,
        })
    }

    /// Reads the JSON array written by the training pipeline.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let names: Vec<String> = serde_json::from_str(&raw)?;
        let schema = Self::from_columns(names)?;

        let unmapped = schema
            .columns()
            .iter()
            .filter(|c| c.kind == ColumnKind::Unmapped)
            .count();
        tracing::info!(
            "Loaded column schema from {} ({} columns, {} unmapped)",
            path.display(),
            schema.len(),
            unmapped
        );
        for category in Category::ALL {
            tracing::debug!("{} values: {:?}", category, schema.one_hot_values(category));
        }
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub(crate) fn fixed_positions(&self) -> &[(usize, FixedField)] {
        &self.fixed
    }

    /// Column index of `Category_value`, if the training data had it.
    pub fn one_hot_index(&self, category: Category, value: &str) -> Option<usize> {
        self.one_hot.get(&category)?.get(value).copied()
    }

    /// Category values known to the schema, in column order.
    pub fn one_hot_values(&self, category: Category) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| match &c.kind {
                ColumnKind::OneHot { category: cat, value } if *cat == category => {
                    Some(value.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

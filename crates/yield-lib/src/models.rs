//! Core data models for crop yield prediction

use crate::error::{DeriveError, RangeError};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The five features consumed by the yield model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RainfallMm,
    TemperatureCelsius,
    FertilizerUsed,
    IrrigationUsed,
    DaysToHarvest,
}

impl Field {
    /// Canonical column order, also used for tensor input
    pub const ALL: [Field; 5] = [
        Field::RainfallMm,
        Field::TemperatureCelsius,
        Field::FertilizerUsed,
        Field::IrrigationUsed,
        Field::DaysToHarvest,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::RainfallMm => "rainfall_mm",
            Field::TemperatureCelsius => "temperature_celsius",
            Field::FertilizerUsed => "fertilizer_used",
            Field::IrrigationUsed => "irrigation_used",
            Field::DaysToHarvest => "days_to_harvest",
        }
    }

    /// Column name used by the trained pipeline's tabular input
    pub fn column(&self) -> &'static str {
        match self {
            Field::RainfallMm => "Rainfall_mm",
            Field::TemperatureCelsius => "Temperature_Celsius",
            Field::FertilizerUsed => "Fertilizer_Used",
            Field::IrrigationUsed => "Irrigation_Used",
            Field::DaysToHarvest => "Days_to_Harvest",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Field::RainfallMm | Field::TemperatureCelsius => ValueKind::Float,
            Field::FertilizerUsed | Field::IrrigationUsed => ValueKind::Bool,
            Field::DaysToHarvest => ValueKind::Int,
        }
    }

    /// Inclusive bounds accepted by the input form, `None` for booleans
    pub fn domain(&self) -> Option<(f64, f64)> {
        match self {
            Field::RainfallMm => Some((0.0, 2000.0)),
            Field::TemperatureCelsius => Some((-5.0, 50.0)),
            Field::DaysToHarvest => Some((30.0, 300.0)),
            Field::FertilizerUsed | Field::IrrigationUsed => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = DeriveError;

    /// Accepts either the snake_case name or the column name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s) || field.column().eq_ignore_ascii_case(s))
            .ok_or_else(|| DeriveError::InvalidField {
                field: s.to_string(),
            })
    }
}

/// Declared type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Int,
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Float => f.write_str("float"),
            ValueKind::Int => f.write_str("integer"),
            ValueKind::Bool => f.write_str("boolean"),
        }
    }
}

/// A dynamically typed value used in scenario overrides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Int(_) => ValueKind::Int,
            FieldValue::Float(_) => ValueKind::Float,
        }
    }

    /// Numeric value as `f64`, `None` for booleans
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Bool(_) => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// Field overrides keyed by field name, applied in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    entries: Vec<(String, FieldValue)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace the value for `name`
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Effective value for `field`, accepting either naming style
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name.parse::<Field>().ok() == Some(field))
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Overrides::new();
        for (name, value) in iter {
            overrides.set(name, value);
        }
        overrides
    }
}

impl Serialize for Overrides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// One input field outside the accepted domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeViolation {
    pub field: Field,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

/// A single, immutable row of model input.
///
/// Scenario variants are produced with [`InputRow::derive`], which always
/// returns a fresh row and leaves the receiver untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
    rainfall_mm: f64,
    temperature_celsius: f64,
    fertilizer_used: bool,
    irrigation_used: bool,
    days_to_harvest: i64,
}

impl Default for InputRow {
    fn default() -> Self {
        Self {
            rainfall_mm: 550.0,
            temperature_celsius: 27.5,
            fertilizer_used: true,
            irrigation_used: true,
            days_to_harvest: 105,
        }
    }
}

impl InputRow {
    pub fn new(
        rainfall_mm: f64,
        temperature_celsius: f64,
        fertilizer_used: bool,
        irrigation_used: bool,
        days_to_harvest: i64,
    ) -> Self {
        Self {
            rainfall_mm,
            temperature_celsius,
            fertilizer_used,
            irrigation_used,
            days_to_harvest,
        }
    }

    pub fn builder() -> InputRowBuilder {
        InputRowBuilder::default()
    }

    pub fn rainfall_mm(&self) -> f64 {
        self.rainfall_mm
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn fertilizer_used(&self) -> bool {
        self.fertilizer_used
    }

    pub fn irrigation_used(&self) -> bool {
        self.irrigation_used
    }

    pub fn days_to_harvest(&self) -> i64 {
        self.days_to_harvest
    }

    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::RainfallMm => FieldValue::Float(self.rainfall_mm),
            Field::TemperatureCelsius => FieldValue::Float(self.temperature_celsius),
            Field::FertilizerUsed => FieldValue::Bool(self.fertilizer_used),
            Field::IrrigationUsed => FieldValue::Bool(self.irrigation_used),
            Field::DaysToHarvest => FieldValue::Int(self.days_to_harvest),
        }
    }

    /// Return a copy of this row with `overrides` applied.
    ///
    /// Integers are widened for float fields. Ranges are not checked here;
    /// programmatic sweeps may legitimately query outside the form bounds.
    pub fn derive(&self, overrides: &Overrides) -> Result<InputRow, DeriveError> {
        let mut row = *self;
        for (name, value) in overrides.iter() {
            let field: Field = name.parse()?;
            row.apply(field, *value)?;
        }
        Ok(row)
    }

    fn apply(&mut self, field: Field, value: FieldValue) -> Result<(), DeriveError> {
        match (field, value) {
            (Field::RainfallMm, FieldValue::Float(v)) => self.rainfall_mm = v,
            (Field::RainfallMm, FieldValue::Int(v)) => self.rainfall_mm = v as f64,
            (Field::TemperatureCelsius, FieldValue::Float(v)) => self.temperature_celsius = v,
            (Field::TemperatureCelsius, FieldValue::Int(v)) => self.temperature_celsius = v as f64,
            (Field::FertilizerUsed, FieldValue::Bool(v)) => self.fertilizer_used = v,
            (Field::IrrigationUsed, FieldValue::Bool(v)) => self.irrigation_used = v,
            (Field::DaysToHarvest, FieldValue::Int(v)) => self.days_to_harvest = v,
            (field, value) => {
                return Err(DeriveError::InvalidValue {
                    field: field.name().to_string(),
                    expected: field.kind(),
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Every numeric field outside the input form's bounds
    pub fn check_ranges(&self) -> Vec<RangeViolation> {
        Field::ALL
            .into_iter()
            .filter_map(|field| {
                let (min, max) = field.domain()?;
                let value = match self.get(field) {
                    FieldValue::Float(v) => v,
                    FieldValue::Int(v) => v as f64,
                    FieldValue::Bool(_) => return None,
                };
                // NaN fails both comparisons, so test containment explicitly
                if (min..=max).contains(&value) {
                    None
                } else {
                    Some(RangeViolation {
                        field,
                        value,
                        min,
                        max,
                    })
                }
            })
            .collect()
    }

    /// Features in canonical column order, booleans encoded as 0/1
    pub fn to_features(&self) -> [f32; 5] {
        [
            self.rainfall_mm as f32,
            self.temperature_celsius as f32,
            if self.fertilizer_used { 1.0 } else { 0.0 },
            if self.irrigation_used { 1.0 } else { 0.0 },
            self.days_to_harvest as f32,
        ]
    }
}

/// Builder for [`InputRow`], starting from the form defaults
#[derive(Debug, Clone, Default)]
pub struct InputRowBuilder {
    row: InputRow,
}

impl InputRowBuilder {
    pub fn rainfall_mm(mut self, value: f64) -> Self {
        self.row.rainfall_mm = value;
        self
    }

    pub fn temperature_celsius(mut self, value: f64) -> Self {
        self.row.temperature_celsius = value;
        self
    }

    pub fn fertilizer_used(mut self, value: bool) -> Self {
        self.row.fertilizer_used = value;
        self
    }

    pub fn irrigation_used(mut self, value: bool) -> Self {
        self.row.irrigation_used = value;
        self
    }

    pub fn days_to_harvest(mut self, value: i64) -> Self {
        self.row.days_to_harvest = value;
        self
    }

    pub fn build(self) -> InputRow {
        self.row
    }

    /// Build, rejecting values outside the input form's bounds
    pub fn build_validated(self) -> Result<InputRow, RangeError> {
        let violations = self.row.check_ranges();
        if violations.is_empty() {
            Ok(self.row)
        } else {
            Err(RangeError { violations })
        }
    }
}

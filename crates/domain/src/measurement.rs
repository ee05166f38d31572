use derive_more::{Display, Into};

/// Repetitions performed in a single set.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..=500).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 500")]
    OutOfRange,
    #[error("Reps must be a whole number")]
    ParseError,
}

/// Weight moved in a single set, at a resolution of 0.01.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    pub fn new(value: f64) -> Result<Self, WeightError> {
        if !(0.0..=9999.99).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if ((value * 100.0).round() - value * 100.0).abs() > 1e-6 {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f64>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0 to 9999.99")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.01")]
    InvalidResolution,
    #[error("Weight must be a number")]
    ParseError,
}

/// Duration of a time-based set, up to 24 hours.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct DurationSeconds(u32);

impl DurationSeconds {
    pub fn new(value: u32) -> Result<Self, DurationSecondsError> {
        if !(1..=86400).contains(&value) {
            return Err(DurationSecondsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for DurationSeconds {
    type Error = DurationSecondsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => DurationSeconds::new(parsed_value),
            Err(_) => Err(DurationSecondsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DurationSecondsError {
    #[error("Duration must be in the range 1 to 86400 seconds")]
    OutOfRange,
    #[error("Duration must be a whole number of seconds")]
    ParseError,
}

/// Distance covered in a single set, at a resolution of 0.01.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    pub fn new(value: f64) -> Result<Self, DistanceError> {
        if !(0.0..=9999.99).contains(&value) {
            return Err(DistanceError::OutOfRange);
        }

        if ((value * 100.0).round() - value * 100.0).abs() > 1e-6 {
            return Err(DistanceError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Distance {
    type Error = DistanceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f64>() {
            Ok(parsed_value) => Distance::new(parsed_value),
            Err(_) => Err(DistanceError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DistanceError {
    #[error("Distance must be in the range 0 to 9999.99")]
    OutOfRange,
    #[error("Distance must be a multiple of 0.01")]
    InvalidResolution,
    #[error("Distance must be a number")]
    ParseError,
}

/// Observed rest before a set, up to one hour.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct RestSeconds(u32);

impl RestSeconds {
    pub fn new(value: u32) -> Result<Self, RestSecondsError> {
        if value > 3600 {
            return Err(RestSecondsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for RestSeconds {
    type Error = RestSecondsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => RestSeconds::new(parsed_value),
            Err(_) => Err(RestSecondsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RestSecondsError {
    #[error("Rest time must be in the range 0 to 3600 seconds")]
    OutOfRange,
    #[error("Rest time must be a whole number of seconds")]
    ParseError,
}

/// Suggested number of sets on a template exercise.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct DefaultSets(u32);

impl DefaultSets {
    pub fn new(value: u32) -> Result<Self, DefaultSetsError> {
        if !(1..=20).contains(&value) {
            return Err(DefaultSetsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DefaultSetsError {
    #[error("Default sets must be in the range 1 to 20")]
    OutOfRange,
}

/// Suggested rest on a template exercise, up to ten minutes.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct DefaultRestSeconds(u32);

impl DefaultRestSeconds {
    pub const DEFAULT: DefaultRestSeconds = DefaultRestSeconds(90);

    pub fn new(value: u32) -> Result<Self, DefaultRestSecondsError> {
        if value > 600 {
            return Err(DefaultRestSecondsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl Default for DefaultRestSeconds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DefaultRestSecondsError {
    #[error("Default rest must be in the range 0 to 600 seconds")]
    OutOfRange,
}

/// Volume of a single set.
#[must_use]
pub fn volume(reps: Reps, weight: Weight) -> f64 {
    f64::from(reps.0) * weight.0
}

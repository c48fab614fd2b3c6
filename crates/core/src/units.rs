//! Human-readable byte sizes and durations used in configuration.
//!
//! Both types deserialize from either a bare integer (bytes / seconds) or a
//! string such as `"50GiB"`, `"1.5 TB"`, `"3d"` or `"12h"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const KIB: f64 = 1024.0;

/// Errors produced when parsing a size or duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitParseError {
    #[error("Empty value")]
    Empty,

    #[error("Invalid number in '{0}'")]
    InvalidNumber(String),

    #[error("Unknown unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },

    #[error("Value out of range: '{0}'")]
    OutOfRange(String),
}

/// A number of bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub const fn bytes(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ByteSize {
    /// Formats with the largest binary unit that keeps the value >= 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= KIB && unit < UNITS.len() - 1 {
            value /= KIB;
            unit += 1;
        }
        if unit == 0 {
            write!(f, "{} B", self.0)
        } else {
            write!(f, "{:.2} {}", value, UNITS[unit])
        }
    }
}

impl FromStr for ByteSize {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, unit) = split_number(s)?;
        let multiplier: f64 = match unit.to_ascii_lowercase().as_str() {
            "" | "b" => 1.0,
            "k" | "kb" => 1e3,
            "m" | "mb" => 1e6,
            "g" | "gb" => 1e9,
            "t" | "tb" => 1e12,
            "ki" | "kib" => KIB,
            "mi" | "mib" => KIB * KIB,
            "gi" | "gib" => KIB * KIB * KIB,
            "ti" | "tib" => KIB * KIB * KIB * KIB,
            _ => {
                return Err(UnitParseError::UnknownUnit {
                    input: s.to_string(),
                    unit: unit.to_string(),
                })
            }
        };
        to_u64(number * multiplier, s).map(ByteSize)
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IntOrString::deserialize(deserializer)? {
            IntOrString::Int(n) => Ok(ByteSize(n)),
            IntOrString::Float(n) => to_u64(n, &n.to_string())
                .map(ByteSize)
                .map_err(serde::de::Error::custom),
            IntOrString::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A duration with whole-second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seconds(pub u64);

impl Seconds {
    pub const fn secs(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> std::time::Duration {
        std::time::Duration::from_secs(self.0)
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        if s >= 86_400 && s % 86_400 == 0 {
            write!(f, "{}d", s / 86_400)
        } else if s >= 3_600 && s % 3_600 == 0 {
            write!(f, "{}h", s / 3_600)
        } else if s >= 60 && s % 60 == 0 {
            write!(f, "{}m", s / 60)
        } else {
            write!(f, "{}s", s)
        }
    }
}

impl FromStr for Seconds {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, unit) = split_number(s)?;
        let multiplier: f64 = match unit.to_ascii_lowercase().as_str() {
            "" | "s" | "sec" | "secs" => 1.0,
            "m" | "min" | "mins" => 60.0,
            "h" | "hr" | "hrs" => 3_600.0,
            "d" | "day" | "days" => 86_400.0,
            "w" | "week" | "weeks" => 604_800.0,
            _ => {
                return Err(UnitParseError::UnknownUnit {
                    input: s.to_string(),
                    unit: unit.to_string(),
                })
            }
        };
        to_u64(number * multiplier, s).map(Seconds)
    }
}

impl Serialize for Seconds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for Seconds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IntOrString::deserialize(deserializer)? {
            IntOrString::Int(n) => Ok(Seconds(n)),
            IntOrString::Float(n) => to_u64(n, &n.to_string())
                .map(Seconds)
                .map_err(serde::de::Error::custom),
            IntOrString::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(u64),
    Float(f64),
    Str(String),
}

/// Split `"1.5 GiB"` into `(1.5, "GiB")`.
fn split_number(input: &str) -> Result<(f64, &str), UnitParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UnitParseError::Empty);
    }
    let split_at = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);
    let number: f64 = number
        .parse()
        .map_err(|_| UnitParseError::InvalidNumber(input.to_string()))?;
    Ok((number, unit.trim()))
}

fn to_u64(value: f64, input: &str) -> Result<u64, UnitParseError> {
    if !value.is_finite() || value < 0.0 || value > u64::MAX as f64 {
        return Err(UnitParseError::OutOfRange(input.to_string()));
    }
    Ok(value.round() as u64)
}

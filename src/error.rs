//! Unified error types for the bridge.
//!
//! A single `Error` enum that every subsystem converts into, so task
//! bodies can log any failure the same way and move on to the next cycle.
//! All variants are `Copy`; none of them allocate.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// An inbound command payload could not be decoded.
    Decode(DecodeError),
    /// A property or node was misused (wrong datatype, duplicate id, ...).
    Property(PropertyError),
    /// An actuator output could not be driven.
    Actuator(ActuatorError),
    /// Configuration is invalid. Fatal at construction time.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Property(e) => write!(f, "property: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Bus or peripheral read returned an error.
    ReadFailed,
    /// Frame checksum did not match its payload.
    Checksum,
    /// The sensor did not answer within its protocol timing.
    Timeout,
    /// The raw reading cannot be transformed (e.g. a zero divisor).
    InvalidReading,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Timeout => write!(f, "timed out"),
            Self::InvalidReading => write!(f, "invalid raw reading"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Decode errors (inbound commands)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not `true` or `false`.
    Boolean,
    /// Payload is not a finite number.
    Number,
    /// Number parsed but lies outside the declared format range.
    OutOfRange,
    /// Payload is not one of the declared enum members.
    NotInEnum,
    /// Payload does not fit the property's value buffer.
    TooLong,
    /// The property does not accept commands.
    NotSettable,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "expected `true` or `false`"),
            Self::Number => write!(f, "expected a finite number"),
            Self::OutOfRange => write!(f, "value outside format range"),
            Self::NotInEnum => write!(f, "value not in enum format"),
            Self::TooLong => write!(f, "payload too long"),
            Self::NotSettable => write!(f, "property is not settable"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Property / registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// Value datatype differs from the declared datatype.
    DatatypeMismatch,
    /// Identifier is empty or too long.
    InvalidId,
    /// A sibling with the same identifier is already registered.
    DuplicateId,
    /// No node or property with that identifier.
    NotFound,
    /// Fixed-capacity registry is full.
    CapacityExceeded,
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatatypeMismatch => write!(f, "datatype mismatch"),
            Self::InvalidId => write!(f, "invalid identifier"),
            Self::DuplicateId => write!(f, "duplicate identifier"),
            Self::NotFound => write!(f, "not found"),
            Self::CapacityExceeded => write!(f, "capacity exceeded"),
        }
    }
}

impl From<PropertyError> for Error {
    fn from(e: PropertyError) -> Self {
        Self::Property(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let e: Error = SensorError::Checksum.into();
        assert_eq!(e.to_string(), "sensor: checksum mismatch");

        let e: Error = DecodeError::Boolean.into();
        assert_eq!(e.to_string(), "decode: expected `true` or `false`");

        assert_eq!(Error::Config("bad pin").to_string(), "config: bad pin");
    }
}

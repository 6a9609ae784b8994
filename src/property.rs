//! Property cells: the last-known value of one measurable or controllable
//! quantity, plus the metadata the convention layer advertises for it.
//!
//! A cell has exactly one outbound writer (its node's task) and at most
//! one inbound path (its command handler). Both run as single,
//! non-suspending steps on the cooperative executor, so interior
//! mutability through `Cell`/`RefCell` is sufficient. `Property` is
//! `!Send`, so it stays on the executor thread.
//!
//! ```text
//!   task ──set()──▶ ┌──────────┐ ──payload()──▶ publisher
//!                   │ Property │
//!   inbound ──on_command()──▶ handler ──▶ hardware
//! ```

use core::cell::{Cell, RefCell};
use core::fmt::{self, Write as _};

use log::warn;

use crate::error::{DecodeError, Error, PropertyError, Result};

/// Maximum identifier length (node and property ids).
pub const ID_LEN: usize = 32;
/// Maximum length of display names and text values.
pub const TEXT_LEN: usize = 64;

pub type Id = heapless::String<ID_LEN>;
pub type Text = heapless::String<TEXT_LEN>;

/// Copy `s` into a fixed-capacity string, failing if it does not fit.
pub(crate) fn bounded<const N: usize>(s: &str) -> Option<heapless::String<N>> {
    let mut out = heapless::String::new();
    out.push_str(s).ok()?;
    Some(out)
}

/// Validate and copy an identifier: lowercase ASCII letters, digits and
/// hyphens, not starting with a hyphen.
pub fn parse_id(s: &str) -> Result<Id> {
    let valid = !s.is_empty()
        && !s.starts_with('-')
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid {
        return Err(PropertyError::InvalidId.into());
    }
    bounded(s).ok_or_else(|| PropertyError::InvalidId.into())
}

// ───────────────────────────────────────────────────────────────
// Datatype / format / value
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    Boolean,
    Integer,
    Float,
    String,
    Enum,
}

impl Datatype {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed format attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    /// Inclusive numeric range, advertised as `"min:max"`.
    Range { min: f64, max: f64 },
    /// Comma-separated list of allowed enum members.
    Members(Text),
}

impl Format {
    /// Parse a format string for the given datatype.
    pub fn parse(datatype: Datatype, spec: &str) -> Result<Self> {
        match datatype {
            Datatype::Integer | Datatype::Float => {
                let (min, max) = spec
                    .split_once(':')
                    .ok_or(Error::Config("range format must be `min:max`"))?;
                let min: f64 = min
                    .parse()
                    .map_err(|_| Error::Config("range minimum is not a number"))?;
                let max: f64 = max
                    .parse()
                    .map_err(|_| Error::Config("range maximum is not a number"))?;
                if !(min.is_finite() && max.is_finite()) || min > max {
                    return Err(Error::Config("range format has min > max"));
                }
                Ok(Self::Range { min, max })
            }
            Datatype::Enum => {
                if spec.is_empty() || spec.split(',').any(str::is_empty) {
                    return Err(Error::Config("enum format has an empty member"));
                }
                bounded(spec)
                    .map(Self::Members)
                    .ok_or(Error::Config("enum format too long"))
            }
            Datatype::Boolean | Datatype::String => {
                Err(Error::Config("datatype does not take a format"))
            }
        }
    }

    fn contains(&self, n: f64) -> bool {
        match self {
            Self::Range { min, max } => (*min..=*max).contains(&n),
            Self::Members(_) => false,
        }
    }

    fn has_member(&self, s: &str) -> bool {
        match self {
            Self::Members(list) => list.split(',').any(|m| m == s),
            Self::Range { .. } => false,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { min, max } => write!(f, "{min}:{max}"),
            Self::Members(list) => f.write_str(list),
        }
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f32),
    String(Text),
    Enum(Text),
}

impl PropertyValue {
    pub const fn datatype(&self) -> Datatype {
        match self {
            Self::Boolean(_) => Datatype::Boolean,
            Self::Integer(_) => Datatype::Integer,
            Self::Float(_) => Datatype::Float,
            Self::String(_) => Datatype::String,
            Self::Enum(_) => Datatype::Enum,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text encoding for transports that only carry strings.
    ///
    /// Floats use the shortest decimal representation that parses back to
    /// the same `f32`, so the encoding is lossless.
    pub fn encode(&self) -> Text {
        let mut out = Text::new();
        // Every variant fits: i64 is at most 20 chars, f32 at most 48.
        let _ = match self {
            Self::Boolean(b) => out.push_str(if *b { "true" } else { "false" }).map_err(|_| fmt::Error),
            Self::Integer(i) => write!(out, "{i}"),
            Self::Float(f) => write!(out, "{f}"),
            Self::String(s) | Self::Enum(s) => out.push_str(s).map_err(|_| fmt::Error),
        };
        out
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f32> for PropertyValue {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

// ───────────────────────────────────────────────────────────────
// Property
// ───────────────────────────────────────────────────────────────

/// Inbound command callback. Drives the hardware for a decoded value;
/// the property stores the value only if the callback succeeds.
pub type CommandHandler = Box<dyn FnMut(&PropertyValue) -> Result<()>>;

pub struct Property {
    id: Id,
    name: Text,
    datatype: Datatype,
    format: Option<Format>,
    unit: Option<&'static str>,
    settable: bool,
    retained: bool,
    restore: bool,
    default: Option<PropertyValue>,

    value: RefCell<Option<PropertyValue>>,
    writes: Cell<u32>,
    pending: Cell<bool>,
    handler: RefCell<Option<CommandHandler>>,
}

impl Property {
    pub fn new(id: &str, name: &str, datatype: Datatype) -> Result<Self> {
        Ok(Self {
            id: parse_id(id)?,
            name: bounded(name).ok_or(PropertyError::InvalidId)?,
            datatype,
            format: None,
            unit: None,
            settable: false,
            retained: true,
            restore: false,
            default: None,
            value: RefCell::new(None),
            writes: Cell::new(0),
            pending: Cell::new(false),
            handler: RefCell::new(None),
        })
    }

    pub fn with_format(mut self, spec: &str) -> Result<Self> {
        self.format = Some(Format::parse(self.datatype, spec)?);
        Ok(self)
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn settable(mut self) -> Self {
        self.settable = true;
        self
    }

    pub fn with_retained(mut self, retained: bool) -> Self {
        self.retained = retained;
        self
    }

    /// Ask the external property store to restore the last value on boot.
    pub fn restore(mut self) -> Self {
        self.restore = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Result<Self> {
        self.default = Some(self.coerce(value.into())?);
        Ok(self)
    }

    /// Bind the inbound command callback.
    pub fn bind_handler(&self, handler: impl FnMut(&PropertyValue) -> Result<()> + 'static) {
        *self.handler.borrow_mut() = Some(Box::new(handler));
    }

    // ── Metadata ──────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    pub fn unit(&self) -> Option<&'static str> {
        self.unit
    }

    pub fn is_settable(&self) -> bool {
        self.settable
    }

    pub fn is_retained(&self) -> bool {
        self.retained
    }

    pub fn restores(&self) -> bool {
        self.restore
    }

    pub fn default_value(&self) -> Option<&PropertyValue> {
        self.default.as_ref()
    }

    // ── Value slot ────────────────────────────────────────────

    /// Store a new current value. Fails without writing if the value does
    /// not match the declared datatype.
    pub fn set(&self, value: impl Into<PropertyValue>) -> Result<()> {
        let value = self.coerce(value.into())?;
        self.store(value);
        Ok(())
    }

    /// Last stored value, `None` before the first write.
    pub fn get(&self) -> Option<PropertyValue> {
        self.value.borrow().clone()
    }

    /// Text encoding of the current value.
    pub fn payload(&self) -> Option<Text> {
        self.value.borrow().as_ref().map(PropertyValue::encode)
    }

    /// Number of successful writes since construction.
    pub fn write_count(&self) -> u32 {
        self.writes.get()
    }

    /// Returns `true` once per write that has not been published yet.
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    // ── Inbound path ──────────────────────────────────────────

    /// Decode `payload` and apply it through the bound handler.
    ///
    /// On any failure the property and the hardware are left untouched.
    pub fn on_command(&self, payload: &str) -> Result<()> {
        if !self.settable {
            warn!("{}: command rejected, property not settable", self.id);
            return Err(DecodeError::NotSettable.into());
        }

        let value = match self.decode(payload) {
            Ok(v) => v,
            Err(e) => {
                warn!("{}: dropping command {:?}: {}", self.id, payload, e);
                return Err(e);
            }
        };

        if let Some(handler) = self.handler.borrow_mut().as_mut() {
            if let Err(e) = handler(&value) {
                warn!("{}: command handler failed: {}", self.id, e);
                return Err(e);
            }
        }

        self.store(value);
        Ok(())
    }

    /// Decode a raw payload into this property's domain.
    pub fn decode(&self, payload: &str) -> Result<PropertyValue> {
        let value = match self.datatype {
            Datatype::Boolean => match payload {
                "true" => PropertyValue::Boolean(true),
                "false" => PropertyValue::Boolean(false),
                _ => return Err(DecodeError::Boolean.into()),
            },
            Datatype::Integer => {
                let i: i64 = payload.parse().map_err(|_| DecodeError::Number)?;
                self.check_range(i as f64)?;
                PropertyValue::Integer(i)
            }
            Datatype::Float => {
                let f: f32 = payload.parse().map_err(|_| DecodeError::Number)?;
                if !f.is_finite() {
                    return Err(DecodeError::Number.into());
                }
                self.check_range(f64::from(f))?;
                PropertyValue::Float(f)
            }
            Datatype::String => {
                PropertyValue::String(bounded(payload).ok_or(DecodeError::TooLong)?)
            }
            Datatype::Enum => {
                if !self.format.as_ref().is_some_and(|f| f.has_member(payload)) {
                    return Err(DecodeError::NotInEnum.into());
                }
                PropertyValue::Enum(bounded(payload).ok_or(DecodeError::TooLong)?)
            }
        };
        Ok(value)
    }

    fn check_range(&self, n: f64) -> Result<()> {
        match &self.format {
            Some(f) if !f.contains(n) => Err(DecodeError::OutOfRange.into()),
            _ => Ok(()),
        }
    }

    /// Datatype check, widening integers written to float cells.
    fn coerce(&self, value: PropertyValue) -> Result<PropertyValue> {
        match (self.datatype, value) {
            (Datatype::Float, PropertyValue::Integer(i)) => Ok(PropertyValue::Float(i as f32)),
            (Datatype::Enum, PropertyValue::Enum(s)) => {
                if self.format.as_ref().is_some_and(|f| f.has_member(&s)) {
                    Ok(PropertyValue::Enum(s))
                } else {
                    Err(DecodeError::NotInEnum.into())
                }
            }
            (dt, v) if v.datatype() == dt => Ok(v),
            _ => Err(PropertyError::DatatypeMismatch.into()),
        }
    }

    fn store(&self, value: PropertyValue) {
        *self.value.borrow_mut() = Some(value);
        self.writes.set(self.writes.get().wrapping_add(1));
        self.pending.set(true);
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("datatype", &self.datatype)
            .field("format", &self.format)
            .field("unit", &self.unit)
            .field("settable", &self.settable)
            .field("value", &self.value.borrow())
            .field("writes", &self.writes.get())
            .finish_non_exhaustive()
    }
}

//! Device color settings and the glue that keeps them in step with a
//! widget group.
//!
//! The device stores each named color as `{"hue": 0..=360, "brightness":
//! 0..=100}` and always renders it fully saturated. Older documents hold a
//! `#rrggbb` string instead; those are converted on read.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::color::{hex_to_hsv, hsv_to_hex};
use crate::document::{Document, EventKind, NodeId};

/// Errors from loading or saving the device configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("configuration transport failed: {0}")]
    Transport(String),
}

/// Hue and brightness of one device color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSetting {
    /// Degrees, 0–360.
    pub hue: u16,
    /// Percent, 0–100.
    pub brightness: u8,
}

impl ColorSetting {
    pub const fn new(hue: u16, brightness: u8) -> Self {
        Self { hue, brightness }
    }

    /// Fully saturated `#rrggbb` for this setting.
    pub fn to_hex(&self) -> String {
        hsv_to_hex(self.hue as f64, 1.0, self.brightness as f64 / 100.0)
    }

    /// Hue and brightness of a hex color; saturation is dropped.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hsv = hex_to_hsv(hex)?;
        Some(Self {
            hue: hsv.hue_degrees().clamp(0, 360) as u16,
            brightness: hsv.brightness_percent().clamp(0, 100) as u8,
        })
    }

    /// Read a setting from the configuration document.
    ///
    /// Objects take each missing or non-numeric field from `default`; legacy
    /// strings must be exactly `#rrggbb`. Anything else yields `default`.
    pub fn parse(value: &Value, default: ColorSetting) -> Self {
        match value {
            Value::Object(obj) => {
                let hue = obj
                    .get("hue")
                    .and_then(Value::as_u64)
                    .map_or(default.hue, |h| h.min(360) as u16);
                let brightness = obj
                    .get("brightness")
                    .and_then(Value::as_u64)
                    .map_or(default.brightness, |b| b.min(100) as u8);
                Self { hue, brightness }
            }
            Value::String(s) => Self::from_legacy_hex(s).unwrap_or(default),
            _ => default,
        }
    }

    fn from_legacy_hex(value: &str) -> Option<Self> {
        if value.len() != 7 || !value.starts_with('#') {
            return None;
        }
        Self::from_hex(value)
    }
}

/// Built-in color settings, by configuration key.
pub const COLOR_DEFAULTS: &[(&str, ColorSetting)] = &[
    ("hourColor", ColorSetting::new(0, 100)),
    ("minuteColor", ColorSetting::new(120, 100)),
    ("secondColor", ColorSetting::new(240, 100)),
    ("hourColorDimmed", ColorSetting::new(0, 47)),
    ("minuteColorDimmed", ColorSetting::new(120, 47)),
    ("secondColorDimmed", ColorSetting::new(240, 47)),
    ("hourDotColor", ColorSetting::new(0, 0)),
    ("hourSegmentColor", ColorSetting::new(0, 0)),
    ("hourQuarterColor", ColorSetting::new(240, 0)),
    ("hourDotColorDimmed", ColorSetting::new(0, 0)),
    ("hourSegmentColorDimmed", ColorSetting::new(0, 0)),
    ("hourQuarterColorDimmed", ColorSetting::new(0, 0)),
    ("dayColor", ColorSetting::new(312, 100)),
    ("monthColor", ColorSetting::new(59, 100)),
    ("weekdayColor", ColorSetting::new(167, 100)),
    ("dayColorDimmed", ColorSetting::new(312, 48)),
    ("monthColorDimmed", ColorSetting::new(59, 34)),
    ("weekdayColorDimmed", ColorSetting::new(167, 46)),
    ("bgColor", ColorSetting::new(0, 0)),
    ("bgColorDimmed", ColorSetting::new(0, 0)),
];

/// Default for a color key; unknown keys default to black.
pub fn default_color(name: &str) -> ColorSetting {
    COLOR_DEFAULTS
        .iter()
        .find(|(key, _)| *key == name)
        .map_or(ColorSetting::new(0, 0), |(_, setting)| *setting)
}

/// Request/response access to the device's configuration document.
pub trait ConfigTransport {
    fn fetch(&self) -> Result<Value, ConfigError>;

    /// Store `config`; returns the document as the device now has it.
    fn persist(&self, config: &Value) -> Result<Value, ConfigError>;
}

/// The device configuration document. Keys other than colors pass through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceConfig {
    fields: Map<String, Value>,
}

impl DeviceConfig {
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ConfigError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.fields)?)
    }

    pub fn load(transport: &impl ConfigTransport) -> Result<Self, ConfigError> {
        let config = Self::from_value(transport.fetch()?)?;
        debug!(fields = config.fields.len(), "loaded device configuration");
        Ok(config)
    }

    /// Persist and adopt the document the device sends back.
    pub fn save(&mut self, transport: &impl ConfigTransport) -> Result<(), ConfigError> {
        let stored = transport.persist(&self.to_value())?;
        *self = Self::from_value(stored)?;
        Ok(())
    }

    /// Color setting under `name`, falling back to the built-in default.
    pub fn color(&self, name: &str) -> ColorSetting {
        let default = default_color(name);
        match self.fields.get(name) {
            Some(value) => ColorSetting::parse(value, default),
            None => default,
        }
    }

    pub fn set_color(&mut self, name: impl Into<String>, setting: ColorSetting) {
        let value = serde_json::json!({
            "hue": setting.hue,
            "brightness": setting.brightness,
        });
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Keep the color control `color` bound to the setting `name`.
///
/// The control starts at the setting's color; every committed edit (a
/// `change`, whether typed or produced by the sliders) is stored back.
pub fn bind_color_setting(
    doc: &Document,
    color: NodeId,
    config: Rc<RefCell<DeviceConfig>>,
    name: impl Into<String>,
) {
    let name = name.into();
    let initial = config.borrow().color(&name).to_hex();
    doc.set_value(color, initial);

    doc.add_event_listener(color, EventKind::Change, move |doc, _| {
        let hex = doc.value(color);
        match ColorSetting::from_hex(&hex) {
            Some(setting) => config.borrow_mut().set_color(name.clone(), setting),
            None => warn!(setting = %name, value = %hex, "not storing invalid color"),
        }
    });
}

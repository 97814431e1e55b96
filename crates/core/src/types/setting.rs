//! Typed key/value settings.
//!
//! Settings are persisted as strings next to a [`SettingType`] tag and
//! decoded into a [`SettingValue`] exactly once, on read. Decoding never
//! fails: malformed JSON degrades to the raw text and malformed numbers
//! become `NaN`, matching what the public site has always received.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Category used when a setting is saved without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Categories readable without authentication.
pub const PUBLIC_CATEGORIES: [&str; 6] = ["general", "social", "contact", "branding", "seo", "page_seo"];

/// Decoded settings keyed by setting key, in ascending key order.
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// Returns `true` if settings in `category` may be served publicly.
#[must_use]
pub fn is_public_category(category: &str) -> bool {
    PUBLIC_CATEGORIES.contains(&category)
}

/// Declared storage type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    #[default]
    Text,
    Json,
    Boolean,
    Number,
}

impl SettingType {
    /// The storage / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Boolean => "boolean",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            _ => Err(format!("invalid setting type: {s}")),
        }
    }
}

/// A setting value decoded according to its [`SettingType`].
///
/// Serializes to the bare JSON value. Non-finite numbers serialize as
/// `null`, the same as `JSON.stringify` on the frontend.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Json(Value),
    Bool(bool),
    Number(f64),
}

impl SettingValue {
    /// Decode a stored string.
    ///
    /// - `json`: parsed, or [`SettingValue::Text`] with the raw string when
    ///   it is not valid JSON
    /// - `boolean`: `true` iff the raw string is exactly `"true"`
    /// - `number`: [`parse_float`] of the raw string (may be `NaN`)
    /// - `text`: the raw string
    #[must_use]
    pub fn decode(kind: SettingType, raw: &str) -> Self {
        match kind {
            SettingType::Text => Self::Text(raw.to_owned()),
            SettingType::Json => serde_json::from_str(raw)
                .map_or_else(|_| Self::Text(raw.to_owned()), Self::Json),
            SettingType::Boolean => Self::Bool(raw == "true"),
            SettingType::Number => Self::Number(parse_float(raw)),
        }
    }

    /// Encode back into storage form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
            Self::Bool(flag) => flag.to_string(),
            Self::Number(number) => format_number(*number),
        }
    }

    /// The storage type this value encodes to.
    #[must_use]
    pub const fn kind(&self) -> SettingType {
        match self {
            Self::Text(_) => SettingType::Text,
            Self::Json(_) => SettingType::Json,
            Self::Bool(_) => SettingType::Boolean,
            Self::Number(_) => SettingType::Number,
        }
    }
}

impl Serialize for SettingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Json(value) => value.serialize(serializer),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Number(number) if number.is_finite() => serializer.serialize_f64(*number),
            Self::Number(_) => serializer.serialize_none(),
        }
    }
}

/// Convert an arbitrary JSON input into the storage string for `kind`.
///
/// Used by the admin settings endpoint, where clients send loosely typed
/// values:
///
/// - `json`: the serialized JSON text of the value
/// - `boolean`: `"true"` if the value is truthy, else `"false"`
/// - `number`: strings are stored verbatim, other values in their textual
///   form, so that decoding yields [`parse_float`] of the input
/// - `text`: strings verbatim, other values as JSON text
#[must_use]
pub fn encode_input(kind: SettingType, input: &Value) -> String {
    match (kind, input) {
        (SettingType::Json, value) => value.to_string(),
        (SettingType::Boolean, value) => is_truthy(value).to_string(),
        (SettingType::Number | SettingType::Text, Value::String(text)) => text.clone(),
        (SettingType::Number | SettingType::Text, value) => value.to_string(),
    }
}

/// JavaScript truthiness of a JSON value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse the longest leading decimal literal of `raw`, like JavaScript's
/// `parseFloat`.
///
/// Leading whitespace is skipped and trailing garbage ignored. `Infinity`
/// (optionally signed) is recognised. Input with no numeric prefix yields
/// `NaN`.
///
/// ```
/// use techmorpho_core::parse_float;
///
/// assert_eq!(parse_float(" 42px"), 42.0);
/// assert_eq!(parse_float("-1.5e3rest"), -1500.0);
/// assert!(parse_float("abc").is_nan());
/// ```
#[must_use]
pub fn parse_float(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s.get(end..).is_some_and(|rest| rest.starts_with("Infinity")) {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let mut saw_digit = false;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        saw_digit = true;
    }

    if bytes.get(end) == Some(&b'.') {
        let mut frac = end + 1;
        while bytes.get(frac).is_some_and(u8::is_ascii_digit) {
            frac += 1;
            saw_digit = true;
        }
        if saw_digit {
            end = frac;
        }
    }

    if !saw_digit {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }

    s.get(..end)
        .and_then(|literal| literal.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_owned()
    } else if number.is_infinite() {
        if number.is_sign_negative() {
            "-Infinity".to_owned()
        } else {
            "Infinity".to_owned()
        }
    } else {
        number.to_string()
    }
}

/// A persisted setting row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    /// Raw storage form.
    pub value: String,
    #[serde(rename = "type")]
    pub kind: SettingType,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    /// Decode the raw value according to the declared type.
    #[must_use]
    pub fn decoded(&self) -> SettingValue {
        SettingValue::decode(self.kind, &self.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_json_falls_back_to_raw_text() {
        assert_eq!(
            SettingValue::decode(SettingType::Json, r#"{"a":1}"#),
            SettingValue::Json(json!({"a": 1}))
        );
        assert_eq!(
            SettingValue::decode(SettingType::Json, "{not json"),
            SettingValue::Text("{not json".to_owned())
        );
    }

    #[test]
    fn test_decode_boolean_is_exact_true_only() {
        assert_eq!(SettingValue::decode(SettingType::Boolean, "true"), SettingValue::Bool(true));
        for raw in ["TRUE", "True", "1", "yes", " true", ""] {
            assert_eq!(SettingValue::decode(SettingType::Boolean, raw), SettingValue::Bool(false));
        }
    }

    #[test]
    fn test_decode_number_uses_parse_float() {
        assert_eq!(SettingValue::decode(SettingType::Number, "3.25"), SettingValue::Number(3.25));
        let SettingValue::Number(n) = SettingValue::decode(SettingType::Number, "n/a") else {
            panic!("expected a number");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(parse_float("10"), 10.0);
        assert_eq!(parse_float("  7.5 apples"), 7.5);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("1."), 1.0);
        assert_eq!(parse_float("+2e2"), 200.0);
        assert_eq!(parse_float("2e"), 2.0);
        assert_eq!(parse_float("2e+"), 2.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_float("Infinityx"), f64::INFINITY);
        assert!(parse_float("").is_nan());
        assert!(parse_float(".").is_nan());
        assert!(parse_float("-").is_nan());
        assert!(parse_float("x1").is_nan());
    }

    #[test]
    fn test_number_input_decodes_to_parse_float_of_input() {
        for input in ["12", "0.1", "  4kg", "1e3", "abc"] {
            let stored = encode_input(SettingType::Number, &json!(input));
            let decoded = SettingValue::decode(SettingType::Number, &stored);
            let expected = parse_float(input);
            match decoded {
                SettingValue::Number(n) if expected.is_nan() => assert!(n.is_nan()),
                SettingValue::Number(n) => assert_eq!(n, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(encode_input(SettingType::Number, &json!(42)), "42");
    }

    #[test]
    fn test_boolean_input_uses_truthiness() {
        assert_eq!(encode_input(SettingType::Boolean, &json!(true)), "true");
        assert_eq!(encode_input(SettingType::Boolean, &json!("false")), "true");
        assert_eq!(encode_input(SettingType::Boolean, &json!("")), "false");
        assert_eq!(encode_input(SettingType::Boolean, &json!(0)), "false");
        assert_eq!(encode_input(SettingType::Boolean, &json!(null)), "false");
        assert_eq!(encode_input(SettingType::Boolean, &json!([])), "true");
    }

    #[test]
    fn test_json_input_is_serialized() {
        let stored = encode_input(SettingType::Json, &json!({"twitter": "@tm"}));
        assert_eq!(stored, r#"{"twitter":"@tm"}"#);
        assert_eq!(encode_input(SettingType::Json, &json!("hi")), "\"hi\"");
    }

    #[test]
    fn test_encode_round_trips() {
        for value in [
            SettingValue::Text("hello".to_owned()),
            SettingValue::Json(json!([1, 2])),
            SettingValue::Bool(false),
            SettingValue::Number(2.5),
            SettingValue::Number(f64::INFINITY),
        ] {
            assert_eq!(SettingValue::decode(value.kind(), &value.encode()), value);
        }
        assert_eq!(SettingValue::Number(f64::NAN).encode(), "NaN");
    }

    #[test]
    fn test_serialize_nan_as_null() {
        let map: SettingsMap = [
            ("a".to_owned(), SettingValue::Number(f64::NAN)),
            ("b".to_owned(), SettingValue::Bool(true)),
        ]
        .into_iter()
        .collect();
        assert_eq!(serde_json::to_value(&map).unwrap(), json!({"a": null, "b": true}));
    }

    #[test]
    fn test_public_categories() {
        assert!(is_public_category("branding"));
        assert!(is_public_category("page_seo"));
        assert!(!is_public_category("internal"));
    }

    #[test]
    fn test_setting_serializes_type_field() {
        let now = Utc::now();
        let setting = Setting {
            key: "site_name".to_owned(),
            value: "TechMorpho".to_owned(),
            kind: SettingType::Text,
            category: DEFAULT_CATEGORY.to_owned(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&setting).unwrap();
        assert_eq!(json["type"], "text");
        assert!(json.get("updatedAt").is_some());
        assert_eq!(setting.decoded(), SettingValue::Text("TechMorpho".to_owned()));
    }
}

//! Normalized catalog field variants.
//!
//! Historical product documents stored colors and badges in three shapes for
//! the same field: a bare string, a JSON-encoded string, or an array of
//! structured objects. All three deserialize into the tagged unions here and
//! are converted to the canonical structured form exactly once, at the
//! data-access boundary. Business logic only ever sees [`ColorSpec`] and
//! [`Badge`].

use serde::{Deserialize, Serialize};

/// Canonical color entry: a display name plus a CSS-usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    /// Display name, e.g. "Forest Green".
    pub name: String,
    /// Swatch value, e.g. "#228b22" or a plain color keyword.
    pub value: String,
}

/// A product color field as it may appear in stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorField {
    /// Structured entries - the canonical shape.
    Structured(Vec<ColorSpec>),
    /// Legacy shape: a list of plain color names.
    Legacy(Vec<String>),
    /// Oldest shape: a single string, possibly JSON-encoded.
    Raw(String),
}

impl ColorField {
    /// Convert any accepted shape into canonical [`ColorSpec`] entries.
    ///
    /// A `Raw` string that itself parses as one of the other shapes is
    /// unwrapped first; otherwise it is treated as a single color name.
    #[must_use]
    pub fn normalize(self) -> Vec<ColorSpec> {
        match self {
            Self::Structured(specs) => specs,
            Self::Legacy(names) => names.into_iter().map(spec_from_name).collect(),
            Self::Raw(raw) => {
                if let Ok(inner) = serde_json::from_str::<Self>(&raw) {
                    // One level of unwrapping is enough: a JSON-encoded string
                    // containing another JSON-encoded string has never been
                    // observed in stored data.
                    match inner {
                        Self::Raw(s) => vec![spec_from_name(s)],
                        other => other.normalize(),
                    }
                } else if raw.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![spec_from_name(raw)]
                }
            }
        }
    }
}

fn spec_from_name(name: String) -> ColorSpec {
    ColorSpec {
        value: name.clone(),
        name,
    }
}

/// Canonical badge entry shown on product cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Badge text, e.g. "New" or "Bestseller".
    pub label: String,
    /// Optional accent color for rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A product badge field as it may appear in stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BadgeField {
    /// Structured entries - the canonical shape.
    Structured(Vec<Badge>),
    /// Legacy shape: a list of plain labels.
    Legacy(Vec<String>),
    /// Oldest shape: a single label, possibly JSON-encoded.
    Raw(String),
}

impl BadgeField {
    /// Convert any accepted shape into canonical [`Badge`] entries.
    #[must_use]
    pub fn normalize(self) -> Vec<Badge> {
        match self {
            Self::Structured(badges) => badges,
            Self::Legacy(labels) => labels.into_iter().map(badge_from_label).collect(),
            Self::Raw(raw) => {
                if let Ok(inner) = serde_json::from_str::<Self>(&raw) {
                    match inner {
                        Self::Raw(s) => vec![badge_from_label(s)],
                        other => other.normalize(),
                    }
                } else if raw.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![badge_from_label(raw)]
                }
            }
        }
    }
}

fn badge_from_label(label: String) -> Badge {
    Badge { label, color: None }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_passes_through() {
        let field: ColorField =
            serde_json::from_str(r##"[{"name":"Forest Green","value":"#228b22"}]"##).unwrap();
        let specs = field.normalize();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "Forest Green");
        assert_eq!(specs[0].value, "#228b22");
    }

    #[test]
    fn test_legacy_string_array() {
        let field: ColorField = serde_json::from_str(r#"["Black","Ivory"]"#).unwrap();
        let specs = field.normalize();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "Black");
        assert_eq!(specs[0].value, "Black");
    }

    #[test]
    fn test_raw_plain_string() {
        let field: ColorField = serde_json::from_str(r#""Navy""#).unwrap();
        assert_eq!(
            field.normalize(),
            vec![ColorSpec {
                name: "Navy".into(),
                value: "Navy".into()
            }]
        );
    }

    #[test]
    fn test_raw_json_encoded_array() {
        // A JSON array that was itself stored as a string.
        let field = ColorField::Raw(r##"[{"name":"Rust","value":"#b7410e"}]"##.to_owned());
        let specs = field.normalize();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].value, "#b7410e");
    }

    #[test]
    fn test_raw_empty_string_is_no_colors() {
        assert!(ColorField::Raw(String::new()).normalize().is_empty());
        assert!(ColorField::Raw("  ".into()).normalize().is_empty());
    }

    #[test]
    fn test_badges_normalize() {
        let field: BadgeField = serde_json::from_str(r#"["New","Sale"]"#).unwrap();
        let badges = field.normalize();
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[1].label, "Sale");
        assert!(badges[1].color.is_none());

        let field: BadgeField =
            serde_json::from_str(r#"[{"label":"Limited","color":"gold"}]"#).unwrap();
        assert_eq!(field.normalize()[0].color.as_deref(), Some("gold"));
    }
}

// src/metadata.rs

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One object of the array exiftool prints in `-j` mode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ExifMetadata {
    pub source_file: String,
    pub file_name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub lens_model: String,
    #[serde(rename = "FNumber", default, deserialize_with = "number_or_numeric_string")]
    pub f_number: Option<f64>,
    #[serde(rename = "ISO", default, deserialize_with = "number_or_numeric_string")]
    pub iso: Option<u32>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub exposure_time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub focal_length: String,
    #[serde(default)]
    pub date_time_original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

/// Suggestions returned by the vision model. Every field is empty when the call failed.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct VisionAIResult {
    #[serde(default)]
    pub title_ideas: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VisionAIResult {
    pub fn is_empty(&self) -> bool {
        self.title_ideas.is_empty() && self.description.is_empty() && self.tags.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExifSummary {
    pub camera: String,
    pub lens: String,
    pub aperture: String,
    pub iso: String,
    pub focal_length: String,
    pub shutter_speed: String,
}

/// The sidecar record written next to each photo as `<id>.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageMetadataSuggestion {
    pub id: String,
    pub title: Vec<String>,
    pub image: String,
    pub alt: String,
    pub location: String,
    pub date: String,
    pub tags: Vec<String>,
    pub exif: ExifSummary,
}

// exiftool emits values like `ExposureTime: 2` or `FocalLength: 50` as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(Visitor)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

// Some files carry `FNumber: "2.8"` or `ISO: "125"`. Text that is not a number reads as missing.
fn number_or_numeric_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    Ok(
        match Option::<NumberOrText<T>>::deserialize(deserializer)? {
            Some(NumberOrText::Number(value)) => Some(value),
            Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
            None => None,
        },
    )
}

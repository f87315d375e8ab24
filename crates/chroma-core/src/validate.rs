//! Write-path checks. Everything here runs before the datastore is touched.

use chroma_types::api::{NewScanRequest, NewTipRequest, SavePaletteRequest};

use crate::error::CoreError;

pub const DEFAULT_TIP_CATEGORY: &str = "Basic Theory";
pub const DEFAULT_RGB_VALUE: &str = "N/A";

/// Accept `#RRGGBB` in either case and return it upper-cased.
pub fn normalize_hex_color(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(CoreError::Validation(format!(
            "'{}' is not a hex color (expected #RRGGBB)",
            input
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Validate every color, drop repeats, keep first-seen order.
pub fn normalize_palette(colors: &[String]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(colors.len());
    for color in colors {
        let color = normalize_hex_color(color)?;
        if !out.contains(&color) {
            out.push(color);
        }
    }
    Ok(out)
}

/// Trimmed, non-blank text.
pub fn require_text(field: &str, value: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    pub tone_result: String,
    pub confidence: f64,
    pub rgb_value: String,
}

pub fn validate_scan(req: &NewScanRequest) -> Result<NewScan, CoreError> {
    let tone_result = require_text("tone_result", &req.tone_result)?;
    if !req.confidence.is_finite() || !(0.0..=100.0).contains(&req.confidence) {
        return Err(CoreError::Validation(format!(
            "confidence must be between 0 and 100, got {}",
            req.confidence
        )));
    }

    let rgb_value = req
        .rgb_value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_RGB_VALUE)
        .to_string();

    Ok(NewScan {
        tone_result,
        confidence: req.confidence,
        rgb_value,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPalette {
    pub season_name: String,
    pub colors: Vec<String>,
}

pub fn validate_palette(req: &SavePaletteRequest) -> Result<NewPalette, CoreError> {
    let season_name = require_text("season_name", &req.season_name)?;
    let colors = normalize_palette(&req.colors)?;
    if colors.is_empty() {
        return Err(CoreError::Validation("a palette needs at least one color".into()));
    }
    Ok(NewPalette {
        season_name,
        colors,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTip {
    pub title: String,
    pub category: String,
    pub description: String,
}

pub fn validate_tip(req: &NewTipRequest) -> Result<NewTip, CoreError> {
    let title = require_text("title", &req.title)?;
    let description = require_text("description", &req.description)?;
    let category = req
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_TIP_CATEGORY)
        .to_string();

    Ok(NewTip {
        title,
        category,
        description,
    })
}

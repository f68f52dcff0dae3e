//! Field rules for report and image payloads.
//!
//! Each check returns every violation it finds; callers decide how to
//! surface them.

use crate::models::report::{ImagePayload, ReportPayload};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Canonical identifier length: 8-4-4-4-12 hex digits plus hyphens.
const CANONICAL_ID_LEN: usize = 36;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email pattern")
});

static COORDINATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?[0-9]+(\.[0-9]+)?$").expect("valid coordinate pattern")
});

/// Date layouts accepted in addition to RFC 3339 and RFC 2822.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse `id` only if it is in hyphenated 8-4-4-4-12 form.
pub fn parse_canonical_id(id: &str) -> Option<Uuid> {
    if id.len() != CANONICAL_ID_LEN {
        return None;
    }
    Uuid::try_parse(id).ok()
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    value.is_ascii() && EMAIL_RE.is_match(value)
}

pub fn is_valid_coordinate(value: &str) -> bool {
    COORDINATE_RE.is_match(value)
}

/// True when `value` names a real calendar day in one of the accepted layouts.
pub fn is_valid_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(value).is_ok() || DateTime::parse_from_rfc2822(value).is_ok()
    {
        return true;
    }
    DATE_FORMATS.iter().any(|fmt| {
        NaiveDate::parse_from_str(value, fmt).is_ok()
            || NaiveDateTime::parse_from_str(value, fmt).is_ok()
    })
}

fn empty(field: &str, value: &str) -> String {
    format!("{field}='{value}' cannot be empty.")
}

fn malformed(field: &str, value: &str) -> String {
    format!("{field}='{value}' is not in the valid format.")
}

/// Collect every violation in a create/update payload.
pub fn validate_report(payload: &ReportPayload) -> Vec<String> {
    let mut errors = Vec::new();

    let required = [
        ("reporterName", &payload.reporter_name),
        ("contact", &payload.contact),
        ("disasterType", &payload.disaster_type),
        ("imgUrl", &payload.img_url),
        ("city", &payload.city),
        ("state", &payload.state),
        ("severity", &payload.severity),
        ("impact", &payload.impact),
    ];
    for (field, value) in required {
        if is_blank(value) {
            errors.push(empty(field, value));
        }
    }

    if !is_valid_email(&payload.email) {
        errors.push(malformed("email", &payload.email));
    }
    if !is_valid_date(&payload.date) {
        errors.push(malformed("date", &payload.date));
    }
    if !is_valid_coordinate(&payload.latitude) {
        errors.push(malformed("latitude", &payload.latitude));
    }
    if !is_valid_coordinate(&payload.longitude) {
        errors.push(malformed("longitude", &payload.longitude));
    }

    errors
}

/// Collect empty-field violations in an image payload.
pub fn validate_image(payload: &ImagePayload) -> Vec<String> {
    [
        ("disasterId", &payload.disaster_id),
        ("timestamp", &payload.timestamp),
        ("disasterImageUrl", &payload.disaster_image_url),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(field, value)| empty(field, value))
    .collect()
}

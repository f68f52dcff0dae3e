//! Represents a disaster report and the images attached to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::CallerId;

/// A single disaster incident record.
///
/// `disaster_id` and `reporter_id` are assigned on creation and never change.
/// Every other field is replaced wholesale by an update.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisasterReport {
    /// Server-generated identifier, serialized in hyphenated form.
    pub disaster_id: Uuid,

    /// Identity of the caller that created the report.
    pub reporter_id: CallerId,

    pub reporter_name: String,
    pub contact: String,
    pub email: String,
    pub disaster_type: String,
    pub img_url: String,
    pub latitude: String,
    pub longitude: String,
    pub city: String,
    pub state: String,
    pub date: String,
    pub severity: String,
    pub impact: String,

    /// Attached images in insertion order.
    pub disaster_images: Vec<DisasterImage>,
}

/// An image attached to a report. Not addressable on its own.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisasterImage {
    /// Copy of the owning report's identifier.
    pub disaster_id: Uuid,
    pub timestamp: String,
    pub disaster_image_url: String,
}

/// Caller-supplied fields for create and update.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub reporter_name: String,
    pub contact: String,
    pub email: String,
    pub disaster_type: String,
    pub img_url: String,
    pub latitude: String,
    pub longitude: String,
    pub city: String,
    pub state: String,
    pub date: String,
    pub severity: String,
    pub impact: String,
}

/// Caller-supplied image reference for attach and detach.
///
/// `disaster_id` stays a raw string here; it is checked for the canonical
/// shape before any lookup.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub disaster_id: String,
    pub timestamp: String,
    pub disaster_image_url: String,
}

impl DisasterReport {
    /// Build a fresh report owned by `reporter` with no images.
    pub fn new(disaster_id: Uuid, reporter: CallerId, payload: ReportPayload) -> Self {
        let mut report = Self {
            disaster_id,
            reporter_id: reporter,
            reporter_name: String::new(),
            contact: String::new(),
            email: String::new(),
            disaster_type: String::new(),
            img_url: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            city: String::new(),
            state: String::new(),
            date: String::new(),
            severity: String::new(),
            impact: String::new(),
            disaster_images: Vec::new(),
        };
        report.apply(payload);
        report
    }

    /// Replace every payload-covered field, keeping identity and images.
    pub fn apply(&mut self, payload: ReportPayload) {
        let ReportPayload {
            reporter_name,
            contact,
            email,
            disaster_type,
            img_url,
            latitude,
            longitude,
            city,
            state,
            date,
            severity,
            impact,
        } = payload;

        self.reporter_name = reporter_name;
        self.contact = contact;
        self.email = email;
        self.disaster_type = disaster_type;
        self.img_url = img_url;
        self.latitude = latitude;
        self.longitude = longitude;
        self.city = city;
        self.state = state;
        self.date = date;
        self.severity = severity;
        self.impact = impact;
    }

    /// Index of the first image matching both `timestamp` and `url`.
    pub fn find_image(&self, timestamp: &str, url: &str) -> Option<usize> {
        self.disaster_images
            .iter()
            .position(|img| img.timestamp == timestamp && img.disaster_image_url == url)
    }
}

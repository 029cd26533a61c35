//! Wire types for the Graph API.
//!
//! Field names follow the Graph JSON conventions (camelCase) via serde
//! renames.  Inbound types are lenient: fields the workflow core does not
//! consume are simply ignored during deserialization.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Drive
// ---------------------------------------------------------------------------

/// A file node in the user's drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Opaque item identifier.
    pub id: String,
    /// File name including extension.
    pub name: String,
    /// Browser URL for the item, when the API provides one.
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A worksheet inside a workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    /// Opaque worksheet identifier.
    pub id: String,
    /// Display name (e.g. "Sheet1").
    pub name: String,
}

/// A rectangular cell range read from a worksheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookRange {
    /// The address the API resolved (e.g. "Sheet1!A1:Z100").
    #[serde(default)]
    pub address: Option<String>,
    /// Row-major cell values.  Empty when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl WorkbookRange {
    /// Number of rows in the range.
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Number of columns, taken from the first row.
    pub fn column_count(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// Mail
// ---------------------------------------------------------------------------

/// A message body with an explicit content type ("Text" or "HTML").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

impl ItemBody {
    /// Plain-text body.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content_type: "Text".into(),
            content: content.into(),
        }
    }

    /// HTML body.
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content_type: "HTML".into(),
            content: content.into(),
        }
    }
}

/// A mail recipient wrapper as the API expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress {
                address: address.into(),
            },
        }
    }
}

/// An outbound mail message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub subject: String,
    pub body: ItemBody,
    pub to_recipients: Vec<Recipient>,
}

impl MailMessage {
    /// Build a plain-text message for a single recipient.
    pub fn text_to(
        address: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: ItemBody::text(body),
            to_recipients: vec![Recipient::new(address)],
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// A date-time paired with its time zone, as the events API expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    /// A UTC timestamp in the API's ISO-8601 format.
    pub fn utc(date_time: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: "UTC".into(),
        }
    }
}

/// An outbound calendar event with an online-meeting flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub subject: String,
    pub body: ItemBody,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub is_online_meeting: bool,
    pub online_meeting_provider: String,
}

/// The subset of a created event the workflow core reports on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub subject: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

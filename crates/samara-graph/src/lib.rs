//! Graph API client for the Samara workflow core.
//!
//! This crate provides:
//!
//! - **Transport**: a generic authenticated request/response path over
//!   HTTPS via [`client::GraphClient`], with error shaping from the
//!   API's structured error bodies.
//! - **Typed endpoints**: the drive, workbook, mail, and calendar
//!   operations the workflow pipeline uses.
//! - **Service seam**: the [`service::OfficeService`] trait that
//!   decouples pipeline sequencing from the concrete backend.

pub mod client;
pub mod error;
pub mod service;
pub mod types;

pub use client::GraphClient;
pub use error::{GraphError, Result};
pub use service::OfficeService;
pub use types::{
    CalendarEvent, CreatedEvent, DateTimeTimeZone, DriveItem, EmailAddress, ItemBody,
    MailMessage, Recipient, WorkbookRange, Worksheet,
};

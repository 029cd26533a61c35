//! The service seam between the workflow core and the remote API.
//!
//! The workflow pipeline never talks to [`crate::GraphClient`] directly;
//! it goes through [`OfficeService`], so tests can substitute an
//! in-memory double and the client can be swapped for another backend
//! without touching pipeline sequencing.

use async_trait::async_trait;

use crate::client::GraphClient;
use crate::error::Result;
use crate::types::{
    CalendarEvent, CreatedEvent, DriveItem, MailMessage, WorkbookRange, Worksheet,
};

/// The remote operations the workflow pipeline consumes.
///
/// Every method is a suspension point; implementations perform real I/O.
/// Credentials are passed per call as bearer tokens.
#[async_trait]
pub trait OfficeService: Send + Sync {
    /// List spreadsheet files (name suffix `.xlsx`) at the drive root.
    async fn list_spreadsheets(&self, token: &str) -> Result<Vec<DriveItem>>;

    /// List the worksheets of a workbook file.
    async fn list_worksheets(&self, token: &str, item_id: &str) -> Result<Vec<Worksheet>>;

    /// Read a bounded cell range from a worksheet.
    async fn read_range(
        &self,
        token: &str,
        item_id: &str,
        worksheet_id: &str,
        address: &str,
    ) -> Result<WorkbookRange>;

    /// Create an empty file node at the drive root.
    async fn create_file(
        &self,
        token: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<DriveItem>;

    /// Upload plain-text content to a file node.
    async fn upload_text(&self, token: &str, item_id: &str, content: &str) -> Result<()>;

    /// Send one mail message.
    async fn send_mail(&self, token: &str, message: &MailMessage) -> Result<()>;

    /// Create a calendar event.
    async fn create_event(&self, token: &str, event: &CalendarEvent) -> Result<CreatedEvent>;
}

#[async_trait]
impl OfficeService for GraphClient {
    async fn list_spreadsheets(&self, token: &str) -> Result<Vec<DriveItem>> {
        GraphClient::list_spreadsheets(self, token).await
    }

    async fn list_worksheets(&self, token: &str, item_id: &str) -> Result<Vec<Worksheet>> {
        GraphClient::list_worksheets(self, token, item_id).await
    }

    async fn read_range(
        &self,
        token: &str,
        item_id: &str,
        worksheet_id: &str,
        address: &str,
    ) -> Result<WorkbookRange> {
        GraphClient::read_range(self, token, item_id, worksheet_id, address).await
    }

    async fn create_file(
        &self,
        token: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<DriveItem> {
        GraphClient::create_file(self, token, name, mime_type).await
    }

    async fn upload_text(&self, token: &str, item_id: &str, content: &str) -> Result<()> {
        GraphClient::upload_text(self, token, item_id, content).await
    }

    async fn send_mail(&self, token: &str, message: &MailMessage) -> Result<()> {
        GraphClient::send_mail(self, token, message).await
    }

    async fn create_event(&self, token: &str, event: &CalendarEvent) -> Result<CreatedEvent> {
        GraphClient::create_event(self, token, event).await
    }
}

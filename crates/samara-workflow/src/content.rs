//! Deterministic text generation for workflow artifacts.
//!
//! Everything here is pure string templating: report bodies, mail
//! bodies, meeting agendas, recipient derivation, and the run summary.
//! Keeping it out of the runner keeps the pipeline about sequencing and
//! makes the wording unit-testable.

use chrono::{DateTime, NaiveDate, Utc};

use crate::classifier::Intent;
use crate::runner::GatheredData;

/// Estimated characters per document page.
const PAGE_SIZE_CHARS: usize = 3000;

/// Recipient groups added when their keyword appears in the prompt.
const RECIPIENT_RULES: &[(&str, &str)] = &[
    ("finance", "finance@company.com"),
    ("sales", "sales@company.com"),
];

/// Fallback recipients for every notification run.
const DEFAULT_RECIPIENTS: &[&str] = &["operations@company.com", "manager@company.com"];

// ---------------------------------------------------------------------------
// File names and subjects
// ---------------------------------------------------------------------------

/// Name for a generated report document.
pub fn document_file_name(date: NaiveDate) -> String {
    format!("Samara Report - {}.docx", date.format("%Y-%m-%d"))
}

/// Name for a generated presentation.
pub fn presentation_file_name(date: NaiveDate) -> String {
    format!("Samara Presentation - {}.pptx", date.format("%Y-%m-%d"))
}

/// Mail subject derived from the prompt.
pub fn mail_subject(prompt: &str) -> String {
    format!("Workflow completed: {}", truncate(prompt, 50))
}

/// Meeting subject derived from the prompt.
pub fn meeting_subject(prompt: &str) -> String {
    format!("Review: {}", truncate(prompt, 40))
}

/// Truncate to `max` characters, appending an ellipsis when shortened.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Plain-text report body built from the prompt and any gathered data.
pub fn document_body(
    prompt: &str,
    gathered: Option<&GatheredData>,
    generated_at: DateTime<Utc>,
) -> String {
    let mut body = format!(
        "AUTOMATED WORKFLOW REPORT\n\
         Generated: {}\n\
         Request: {prompt}\n\
         \n\
         EXECUTIVE SUMMARY\n\
         This report was generated automatically in response to the workflow \
         request above. The system processed the available data sources and \
         produced a consolidated analysis.\n",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
    );

    if let Some(data) = gathered {
        body.push_str(&format!(
            "\nDATA ANALYSIS\n\
             Processed {} spreadsheet files containing {} rows of data.\n\
             \n\
             File details:\n",
            data.files_found(),
            data.total_rows,
        ));
        for file in &data.files {
            body.push_str(&format!(
                "- {}: {} rows, {} columns\n",
                file.name, file.rows, file.columns
            ));
        }
    }

    body.push_str(
        "\nNEXT STEPS\n\
         1. Review the generated files and data\n\
         2. Validate the automated analysis\n\
         3. Schedule follow-up reviews as needed\n\
         \n\
         ---\n\
         Generated by the Samara assistant via the Graph API.\n",
    );
    body
}

/// Estimated page count for a document body.
pub fn page_count(body: &str) -> usize {
    body.len().div_ceil(PAGE_SIZE_CHARS)
}

/// Section count, taken as the number of paragraph blocks.
pub fn section_count(body: &str) -> usize {
    body.split("\n\n").count()
}

/// Plain-text notification body listing the files a run created.
pub fn mail_body(prompt: &str, files_created: &[String]) -> String {
    let file_lines = if files_created.is_empty() {
        "(no new files were created for this request)".to_string()
    } else {
        files_created
            .iter()
            .map(|name| format!("- {name}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Hi team,\n\
         \n\
         The workflow you requested has completed: \"{prompt}\"\n\
         \n\
         The following files are ready for review:\n\
         {file_lines}\n\
         \n\
         All files are available in the shared drive.\n\
         \n\
         Best regards,\n\
         Samara\n"
    )
}

/// HTML meeting agenda listing the files a run created.
pub fn meeting_agenda_html(prompt: &str, files_created: &[String]) -> String {
    let items = files_created
        .iter()
        .map(|name| format!("<li>{name}</li>"))
        .collect::<String>();
    format!(
        "<p>Meeting to review the completed workflow.</p>\
         <p><strong>Request:</strong> {prompt}</p>\
         <p><strong>Files created:</strong></p>\
         <ul>{items}</ul>\
         <p>All files are available in the shared drive ahead of the meeting.</p>"
    )
}

// ---------------------------------------------------------------------------
// Recipients and summary
// ---------------------------------------------------------------------------

/// Derive notification recipients from keyword rules plus the defaults.
pub fn recipients(prompt: &str) -> Vec<String> {
    let lowered = prompt.to_lowercase();
    let mut recipients: Vec<String> = RECIPIENT_RULES
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, address)| (*address).to_string())
        .collect();
    recipients.extend(DEFAULT_RECIPIENTS.iter().map(|a| (*a).to_string()));
    recipients
}

/// One-line human summary of a completed run.
///
/// The hours/minutes phrasing clamps negative savings to zero; the raw
/// signed figure stays available on the run result.
pub fn summary_text(
    intent: &Intent,
    files_created: usize,
    time_saved_ms: i64,
    total_elapsed_ms: u64,
) -> String {
    let saved_ms = time_saved_ms.max(0) as u64;
    let hours = saved_ms / 3_600_000;
    let minutes = (saved_ms % 3_600_000) / 60_000;
    let elapsed_secs = total_elapsed_ms.div_ceil(1000);

    format!(
        "Workflow completed successfully! Created {files_created} files and \
         automated {} tasks across {} applications. This automation saved \
         approximately {hours}h {minutes}m of manual work, completing in \
         {elapsed_secs}s what would typically take {hours}h {minutes}m by hand.",
        intent.actions.count(),
        intent.app_count(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

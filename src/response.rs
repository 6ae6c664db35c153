//! Interpretation of parsed gateway responses.
//!
//! Every status-bearing element carries a `(statusSeverity, statusCode,
//! statusMessage)` triple. The comparison is ASCII-case-insensitive because
//! the live gateway mixes `ERROR` (signon) with `Error` (business messages).

use roxmltree::{Document, Node};

use crate::error::{Error, Result};
use crate::utils::xml;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Severity {
    Info,
    Warn,
    Error,
}

pub(crate) fn severity(node: Node) -> Option<Severity> {
    let raw = node.attribute("statusSeverity")?;
    if raw.eq_ignore_ascii_case("error") {
        Some(Severity::Error)
    } else if raw.eq_ignore_ascii_case("warn") {
        Some(Severity::Warn)
    } else if raw.eq_ignore_ascii_case("info") {
        Some(Severity::Info)
    } else {
        None
    }
}

fn status_attributes(node: Node) -> (i32, String) {
    let code = node
        .attribute("statusCode")
        .and_then(|code| code.parse().ok())
        .unwrap_or(-1);
    let message = node.attribute("statusMessage").unwrap_or_default().to_owned();
    (code, message)
}

/// Raise if the element reports an ERROR severity.
pub(crate) fn require_ok(node: Node) -> Result<()> {
    if severity(node) == Some(Severity::Error) {
        let (code, message) = status_attributes(node);
        return Err(Error::Status { code, message });
    }
    Ok(())
}

/// Evaluate a sign-in response: the session ticket on success, the reported
/// error otherwise. A response with neither is a protocol contract violation
/// and never passes silently.
pub(crate) fn extract_session_ticket(body: &str) -> Result<String> {
    let doc = Document::parse(body)?;
    let mut ticket = None;
    for msg in doc.descendants().filter(|node| {
        node.has_tag_name("SignonAppCertRs") || node.has_tag_name("SignonTicketRs")
    }) {
        require_ok(msg)?;
        if let Some(value) = xml::child_text(msg, "SessionTicket") {
            ticket = Some(value);
        }
    }
    ticket.ok_or(Error::MissingTicket)
}

#[derive(Clone, Debug)]
pub(crate) struct InvoiceAddStatus {
    pub(crate) request_id: String,
    pub(crate) outcome: InvoiceAddOutcome,
}

#[derive(Clone, Debug)]
pub(crate) enum InvoiceAddOutcome {
    Added { ref_number: String },
    Failed { code: i32, message: String },
}

/// Collect the per-invoice outcomes of a batched `InvoiceAddRq` submission.
/// Failures are returned as data, not raised: the coordinator decides which
/// of them it can repair.
pub(crate) fn invoice_add_statuses(body: &str) -> Result<Vec<InvoiceAddStatus>> {
    let doc = Document::parse(body)?;
    let mut statuses = Vec::new();
    for msg in doc
        .descendants()
        .filter(|node| node.has_tag_name("InvoiceAddRs"))
    {
        let request_id = msg.attribute("requestID").unwrap_or_default().to_owned();
        let outcome = if severity(msg) == Some(Severity::Error) {
            let (code, message) = status_attributes(msg);
            InvoiceAddOutcome::Failed { code, message }
        } else {
            let ref_number =
                xml::nested_text(msg, &["InvoiceRet", "RefNumber"]).ok_or_else(|| {
                    Error::UnexpectedResponse(format!(
                        "accepted InvoiceAddRs for request `{request_id}` carries no RefNumber"
                    ))
                })?;
            InvoiceAddOutcome::Added { ref_number }
        };
        statuses.push(InvoiceAddStatus { request_id, outcome });
    }
    Ok(statuses)
}

/// Check the status element of a non-batched mutation such as
/// `ItemServiceAddRs`; success carries no payload worth extracting.
pub(crate) fn check_mutation(body: &str, tag: &str) -> Result<()> {
    let doc = Document::parse(body)?;
    for msg in doc.descendants().filter(|node| node.has_tag_name(tag)) {
        require_ok(msg)?;
    }
    Ok(())
}

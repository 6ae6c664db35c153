//! The authentication envelope every request travels in.
//!
//! A request document is an XML declaration, a `qbxml` processing
//! instruction, and a `QBXML` root holding one signon block and (for business
//! calls) one batch of request messages. Building one is a pure
//! transformation; nothing here touches the network or the session state.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesPI, BytesText, Event};
use time::OffsetDateTime;

use crate::config::AppIdentity;
use crate::error::Result;
use crate::utils::date_format;

/// qbXML vocabulary version declared in every request's processing instruction.
pub const QBXML_VERSION: &str = "6.0";

const LANGUAGE: &str = "English";

pub(crate) type XmlResult = std::result::Result<(), quick_xml::Error>;

pub(crate) fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> XmlResult {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn begin_document(writer: &mut Writer<Vec<u8>>) -> XmlResult {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    let instruction = format!("qbxml version=\"{QBXML_VERSION}\"");
    writer.write_event(Event::PI(BytesPI::new(&instruction)))?;
    Ok(())
}

/// Build the sign-in request document (`SignonAppCertRq`). It carries no
/// business payload; the whole document is the signon block.
pub(crate) fn sign_in(identity: &AppIdentity, stamp: OffsetDateTime) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    begin_document(&mut writer)?;
    writer.create_element("QBXML").write_inner_content(|w| {
        w.create_element("SignonMsgsRq").write_inner_content(|w| {
            w.create_element("SignonAppCertRq")
                .write_inner_content(|w| {
                    write_text_element(w, "ClientDateTime", &date_format::client_datetime(stamp))?;
                    write_text_element(w, "ApplicationLogin", &identity.application_login)?;
                    write_text_element(w, "ConnectionTicket", &identity.connection_ticket)?;
                    write_text_element(w, "Language", LANGUAGE)?;
                    write_text_element(w, "AppID", &identity.app_id)?;
                    write_text_element(w, "AppVer", &identity.app_version)?;
                    Ok::<(), quick_xml::Error>(())
                })?;
            Ok::<(), quick_xml::Error>(())
        })?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(writer.into_inner())
}

/// Wrap a business payload in the ticket-bearing envelope
/// (`SignonTicketRq` + the payload the closure writes).
pub(crate) fn authenticated<F>(
    ticket: &str,
    identity: &AppIdentity,
    stamp: OffsetDateTime,
    payload: F,
) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> XmlResult,
{
    let mut writer = Writer::new(Vec::new());
    begin_document(&mut writer)?;
    writer.create_element("QBXML").write_inner_content(|w| {
        w.create_element("SignonMsgsRq").write_inner_content(|w| {
            w.create_element("SignonTicketRq").write_inner_content(|w| {
                write_text_element(w, "ClientDateTime", &date_format::client_datetime(stamp))?;
                write_text_element(w, "SessionTicket", ticket)?;
                write_text_element(w, "Language", LANGUAGE)?;
                write_text_element(w, "AppID", &identity.app_id)?;
                write_text_element(w, "AppVer", &identity.app_version)?;
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
        payload(w)?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(writer.into_inner())
}

/// Wrap request elements in the batch container every message set uses.
/// `continueOnError` keeps one failing request from aborting its siblings.
pub(crate) fn write_messages<F>(writer: &mut Writer<Vec<u8>>, body: F) -> XmlResult
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> XmlResult,
{
    writer
        .create_element("QBXMLMsgsRq")
        .with_attribute(("onError", "continueOnError"))
        .write_inner_content(body)?;
    Ok(())
}

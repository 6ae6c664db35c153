use quick_xml::Writer;
use roxmltree::Document;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, PrimitiveDateTime};
use uuid::Uuid;

use crate::entities::line_item::{self, LineItem};
use crate::envelope::{XmlResult, write_text_element};
use crate::error::{Error, Result};
use crate::response;
use crate::utils::{date_format, xml};

/// Payment terms applied when the caller does not choose any.
pub const DEFAULT_TERMS: &str = "Net 30";

const NET_DAYS: i64 = 30;

/// An invoice being prepared for submission.
#[derive(Clone, Debug)]
pub struct Builder {
    /// Correlates this draft with its response element within a batch.
    /// Must be unique within any single submission call.
    pub request_id: String,
    pub customer_id: String,
    pub txn_date: Date,
    pub due_date: Date,
    pub terms: String,
    pub memo: Option<String>,
    /// Opt in to creating catalog items the gateway reports as missing and
    /// resubmitting this invoice.
    pub auto_create_items: bool,
    lines: Vec<LineItem>,
}

impl Builder {
    /// A draft with a generated request id, `Net 30` terms, and a due date
    /// thirty days after the transaction date.
    #[must_use]
    pub fn new(customer_id: impl Into<String>, txn_date: Date) -> Self {
        Self {
            request_id: Uuid::new_v4().simple().to_string(),
            customer_id: customer_id.into(),
            txn_date,
            due_date: txn_date + Duration::days(NET_DAYS),
            terms: DEFAULT_TERMS.to_owned(),
            memo: None,
            auto_create_items: false,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = terms.into();
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: Date) -> Self {
        self.due_date = due_date;
        self
    }

    #[must_use]
    pub fn auto_create_items(mut self, enabled: bool) -> Self {
        self.auto_create_items = enabled;
        self
    }

    /// Append a line. With auto-creation enabled every line must declare its
    /// catalog type and posting account up front.
    pub fn add_line_item(&mut self, line: LineItem) -> Result<()> {
        if self.auto_create_items && line.item_type.is_none() {
            return Err(Error::Item(format!(
                "line item `{}` must declare an item type when item auto-creation is enabled",
                line.full_name
            )));
        }
        if self.auto_create_items && line.account.is_none() {
            return Err(Error::Item(format!(
                "line item `{}` must declare a posting account when item auto-creation is enabled",
                line.full_name
            )));
        }
        self.lines.push(line);
        Ok(())
    }

    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        &self.lines
    }

    /// Find a line by its full catalog name.
    #[must_use]
    pub fn line_item_named(&self, full_name: &str) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.full_name == full_name)
    }

    /// Serialize as an `InvoiceAddRq` element tagged with the request id.
    pub(crate) fn write_add_request(&self, writer: &mut Writer<Vec<u8>>) -> XmlResult {
        writer
            .create_element("InvoiceAddRq")
            .with_attribute(("requestID", self.request_id.as_str()))
            .write_inner_content(|w| {
                w.create_element("InvoiceAdd").write_inner_content(|w| {
                    w.create_element("CustomerRef")
                        .write_inner_content(|w| write_text_element(w, "ListID", &self.customer_id))?;
                    write_text_element(w, "TxnDate", &date_format::format_qb_date(self.txn_date))?;
                    w.create_element("TermsRef")
                        .write_inner_content(|w| write_text_element(w, "FullName", &self.terms))?;
                    write_text_element(w, "DueDate", &date_format::format_qb_date(self.due_date))?;
                    if let Some(memo) = &self.memo {
                        write_text_element(w, "Memo", memo)?;
                    }
                    for line in &self.lines {
                        w.create_element("InvoiceLineAdd").write_inner_content(|w| {
                            w.create_element("ItemRef").write_inner_content(|w| {
                                write_text_element(w, "FullName", &line.full_name)
                            })?;
                            write_text_element(w, "Desc", &line.description)?;
                            write_text_element(
                                w,
                                "Quantity",
                                &line_item::wire_quantity(line.quantity),
                            )?;
                            write_text_element(w, "Rate", &line_item::wire_amount(line.rate))?;
                            Ok::<(), quick_xml::Error>(())
                        })?;
                    }
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }
}

/// An invoice as returned by the gateway's query path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub customer_id: String,
    pub customer_name: Option<String>,
    #[serde(with = "crate::utils::date_format::qb_date_format")]
    pub txn_date: Date,
    #[serde(default, with = "crate::utils::date_format::qb_datetime_format_option")]
    pub time_created: Option<PrimitiveDateTime>,
    #[serde(default, with = "crate::utils::date_format::qb_datetime_format_option")]
    pub time_modified: Option<PrimitiveDateTime>,
    pub is_paid: Option<bool>,
    pub lines: Vec<Line>,
}

/// One returned invoice line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Line {
    pub item: String,
    pub description: Option<String>,
    pub rate: Option<Decimal>,
    pub quantity: Option<Decimal>,
}

/// Map an `InvoiceQueryRs` response to invoice records. Returned elements
/// without a transaction date or customer reference are skipped.
pub(crate) fn parse_query(body: &str) -> Result<Vec<Invoice>> {
    let doc = Document::parse(body)?;
    let mut invoices = Vec::new();
    for rs in doc
        .descendants()
        .filter(|node| node.has_tag_name("InvoiceQueryRs"))
    {
        response::require_ok(rs)?;
        for ret in rs.children().filter(|node| node.has_tag_name("InvoiceRet")) {
            let (Some(txn_date), Some(customer_id)) = (
                xml::child_date(ret, "TxnDate"),
                xml::nested_text(ret, &["CustomerRef", "ListID"]),
            ) else {
                continue;
            };
            let lines = ret
                .children()
                .filter(|node| node.has_tag_name("InvoiceLineRet"))
                .filter_map(|node| {
                    let item = xml::nested_text(node, &["ItemRef", "FullName"])?;
                    Some(Line {
                        item,
                        description: xml::child_text(node, "Desc"),
                        rate: xml::child_decimal(node, "Rate"),
                        quantity: xml::child_decimal(node, "Quantity"),
                    })
                })
                .collect();
            invoices.push(Invoice {
                customer_id,
                customer_name: xml::nested_text(ret, &["CustomerRef", "FullName"]),
                txn_date,
                time_created: xml::child_datetime(ret, "TimeCreated"),
                time_modified: xml::child_datetime(ret, "TimeModified"),
                is_paid: xml::child_bool(ret, "IsPaid"),
                lines,
            });
        }
    }
    Ok(invoices)
}

#[cfg(test)]
mod tests {
    use quick_xml::Writer;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use super::*;
    use crate::entities::line_item::ItemType;

    fn render(builder: &Builder) -> String {
        let mut writer = Writer::new(Vec::new());
        builder.write_add_request(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn defaults_follow_the_transaction_date() {
        let draft = Builder::new("80000001-123", date!(2026 - 08 - 07));
        assert_eq!(draft.terms, DEFAULT_TERMS);
        assert_eq!(draft.due_date, date!(2026 - 09 - 06));
        assert!(!draft.request_id.is_empty());
    }

    #[test]
    fn add_request_element_order_matches_the_wire_schema() {
        let mut draft = Builder::new("80000001-123", date!(2026 - 08 - 07))
            .with_request_id("inv-1")
            .with_memo("August retainer");
        draft
            .add_line_item(LineItem::new(dec!(2), "Consulting", "Two hours", dec!(150)))
            .unwrap();

        let doc = render(&draft);
        assert_eq!(
            doc,
            "<InvoiceAddRq requestID=\"inv-1\"><InvoiceAdd>\
             <CustomerRef><ListID>80000001-123</ListID></CustomerRef>\
             <TxnDate>2026-08-07</TxnDate>\
             <TermsRef><FullName>Net 30</FullName></TermsRef>\
             <DueDate>2026-09-06</DueDate>\
             <Memo>August retainer</Memo>\
             <InvoiceLineAdd><ItemRef><FullName>Consulting</FullName></ItemRef>\
             <Desc>Two hours</Desc><Quantity>2</Quantity><Rate>150.00</Rate></InvoiceLineAdd>\
             </InvoiceAdd></InvoiceAddRq>"
        );
    }

    #[test]
    fn zero_line_invoices_serialize_without_lines() {
        let draft = Builder::new("80000001-123", date!(2026 - 08 - 07)).with_request_id("inv-1");
        let doc = render(&draft);
        assert!(!doc.contains("InvoiceLineAdd"));
        assert!(doc.contains("<DueDate>"));
    }

    #[test]
    fn auto_creation_requires_type_and_account_per_line() {
        let mut draft = Builder::new("80000001-123", date!(2026 - 08 - 07)).auto_create_items(true);
        let untyped = LineItem::new(dec!(1), "Widget", "One widget", dec!(10));
        assert!(matches!(
            draft.add_line_item(untyped),
            Err(Error::Item(_))
        ));
        let typed = LineItem::new(dec!(1), "Widget", "One widget", dec!(10))
            .with_item(ItemType::Service, "Sales:Consulting");
        draft.add_line_item(typed).unwrap();
        assert_eq!(draft.line_items().len(), 1);
    }

    #[test]
    fn query_mapping_skips_incomplete_elements() {
        let body = "<QBXML><QBXMLMsgsRs>\
            <InvoiceQueryRs statusSeverity=\"Info\" statusCode=\"0\">\
            <InvoiceRet>\
              <TimeCreated>2026-08-01T08:00:00</TimeCreated>\
              <TxnDate>2026-08-07</TxnDate>\
              <IsPaid>false</IsPaid>\
              <CustomerRef><ListID>80000001-123</ListID><FullName>Acme Corp</FullName></CustomerRef>\
              <InvoiceLineRet>\
                <ItemRef><FullName>Consulting</FullName></ItemRef>\
                <Desc>Two hours</Desc><Quantity>2</Quantity><Rate>150.00</Rate>\
              </InvoiceLineRet>\
              <InvoiceLineRet><Desc>no item ref</Desc></InvoiceLineRet>\
            </InvoiceRet>\
            <InvoiceRet><TxnDate>2026-08-08</TxnDate></InvoiceRet>\
            </InvoiceQueryRs></QBXMLMsgsRs></QBXML>";

        let invoices = parse_query(body).unwrap();
        assert_eq!(invoices.len(), 1);
        let invoice = &invoices[0];
        assert_eq!(invoice.customer_id, "80000001-123");
        assert_eq!(invoice.customer_name.as_deref(), Some("Acme Corp"));
        assert_eq!(invoice.is_paid, Some(false));
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].quantity, Some(dec!(2)));
    }
}

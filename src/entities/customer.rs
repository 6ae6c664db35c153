use roxmltree::Document;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::error::Result;
use crate::response;
use crate::utils::xml;

/// A billing address as returned by the customer query.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Address {
    pub addr1: Option<String>,
    pub addr2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// A customer record as returned by the gateway's query path. Read-only;
/// drafts reference customers by `list_id` alone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub list_id: String,
    pub name: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub print_as: Option<String>,
    pub edit_sequence: Option<String>,
    pub sublevel: Option<u32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub delivery_method: Option<String>,
    pub balance: Decimal,
    pub total_balance: Decimal,
    pub is_statement_with_parent: Option<bool>,
    #[serde(default)]
    pub bill_address: Address,
    #[serde(default, with = "crate::utils::date_format::qb_datetime_format_option")]
    pub time_created: Option<PrimitiveDateTime>,
    #[serde(default, with = "crate::utils::date_format::qb_datetime_format_option")]
    pub time_modified: Option<PrimitiveDateTime>,
}

/// Map a `CustomerQueryRs` response to customer records. Returned elements
/// without a name or list id are skipped.
pub(crate) fn parse_query(body: &str) -> Result<Vec<Customer>> {
    let doc = Document::parse(body)?;
    let mut customers = Vec::new();
    for rs in doc
        .descendants()
        .filter(|node| node.has_tag_name("CustomerQueryRs"))
    {
        response::require_ok(rs)?;
        for ret in rs.children().filter(|node| node.has_tag_name("CustomerRet")) {
            let (Some(list_id), Some(name)) = (
                xml::child_text(ret, "ListID"),
                xml::child_text(ret, "Name"),
            ) else {
                continue;
            };
            let bill_address = xml::child(ret, "BillAddress")
                .map(|node| Address {
                    addr1: xml::child_text(node, "Addr1"),
                    addr2: xml::child_text(node, "Addr2"),
                    city: xml::child_text(node, "City"),
                    state: xml::child_text(node, "State"),
                    postal_code: xml::child_text(node, "PostalCode"),
                })
                .unwrap_or_default();
            customers.push(Customer {
                list_id,
                name,
                full_name: xml::child_text(ret, "FullName"),
                company_name: xml::child_text(ret, "CompanyName"),
                first_name: xml::child_text(ret, "FirstName"),
                last_name: xml::child_text(ret, "LastName"),
                print_as: xml::child_text(ret, "PrintAs"),
                edit_sequence: xml::child_text(ret, "EditSequence"),
                sublevel: xml::child_text(ret, "Sublevel").and_then(|s| s.parse().ok()),
                phone: xml::child_text(ret, "Phone"),
                email: xml::child_text(ret, "Email"),
                delivery_method: xml::child_text(ret, "DeliveryMethod"),
                balance: xml::child_decimal(ret, "Balance").unwrap_or(Decimal::ZERO),
                total_balance: xml::child_decimal(ret, "TotalBalance").unwrap_or(Decimal::ZERO),
                is_statement_with_parent: xml::child_bool(ret, "IsStatementWithParent"),
                bill_address,
                time_created: xml::child_datetime(ret, "TimeCreated"),
                time_modified: xml::child_datetime(ret, "TimeModified"),
            });
        }
    }
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn maps_the_full_field_set() {
        let body = "<QBXML><QBXMLMsgsRs>\
            <CustomerQueryRs requestID=\"q1\" statusSeverity=\"Info\" statusCode=\"0\">\
            <CustomerRet>\
              <ListID>80000001-123</ListID>\
              <TimeCreated>2024-03-01T12:00:00</TimeCreated>\
              <Name>Acme</Name>\
              <FullName>Acme Corp</FullName>\
              <CompanyName>Acme Corporation</CompanyName>\
              <Sublevel>0</Sublevel>\
              <Phone>555-0100</Phone>\
              <Email>billing@acme.example</Email>\
              <Balance>150.25</Balance>\
              <TotalBalance>150.25</TotalBalance>\
              <IsStatementWithParent>false</IsStatementWithParent>\
              <BillAddress>\
                <Addr1>1 Desert Rd</Addr1><City>Tucson</City>\
                <State>AZ</State><PostalCode>85701</PostalCode>\
              </BillAddress>\
            </CustomerRet>\
            <CustomerRet><Name>No list id</Name></CustomerRet>\
            </CustomerQueryRs></QBXMLMsgsRs></QBXML>";

        let customers = parse_query(body).unwrap();
        assert_eq!(customers.len(), 1);
        let customer = &customers[0];
        assert_eq!(customer.list_id, "80000001-123");
        assert_eq!(customer.full_name.as_deref(), Some("Acme Corp"));
        assert_eq!(customer.sublevel, Some(0));
        assert_eq!(customer.balance, dec!(150.25));
        assert_eq!(customer.is_statement_with_parent, Some(false));
        assert_eq!(customer.bill_address.city.as_deref(), Some("Tucson"));
        assert!(customer.time_created.is_some());
        assert_eq!(customer.delivery_method, None);
    }

    #[test]
    fn missing_balance_defaults_to_zero() {
        let body = "<QBXML><QBXMLMsgsRs>\
            <CustomerQueryRs statusSeverity=\"Info\" statusCode=\"0\">\
            <CustomerRet><ListID>1</ListID><Name>Minimal</Name></CustomerRet>\
            </CustomerQueryRs></QBXMLMsgsRs></QBXML>";
        let customers = parse_query(body).unwrap();
        assert_eq!(customers[0].balance, Decimal::ZERO);
    }
}

use quick_xml::Writer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::line_item;
use crate::envelope::{XmlResult, write_text_element};

/// A service-type catalog item to be created on the gateway.
///
/// The hosted service's qbXML subset only supports creating Service items;
/// the other catalog types must be provisioned out of band.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceItem {
    pub name: String,
    pub description: String,
    pub rate: Decimal,
    /// Posting account, referenced by full name.
    pub account: String,
}

impl ServiceItem {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        rate: Decimal,
        account: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rate,
            account: account.into(),
        }
    }

    /// Serialize as an `ItemServiceAddRq` element.
    pub(crate) fn write_add_request(&self, writer: &mut Writer<Vec<u8>>) -> XmlResult {
        writer
            .create_element("ItemServiceAddRq")
            .with_attribute(("requestID", ""))
            .write_inner_content(|w| {
                w.create_element("ItemServiceAdd").write_inner_content(|w| {
                    write_text_element(w, "Name", &self.name)?;
                    w.create_element("SalesOrPurchase").write_inner_content(|w| {
                        write_text_element(w, "Desc", &self.description)?;
                        write_text_element(w, "Price", &line_item::wire_amount(self.rate))?;
                        w.create_element("AccountRef").write_inner_content(|w| {
                            write_text_element(w, "FullName", &self.account)
                        })?;
                        Ok::<(), quick_xml::Error>(())
                    })?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn add_request_nests_sales_details() {
        let item = ServiceItem::new("Consulting", "Hourly consulting", dec!(150), "Sales:Services");
        let mut writer = Writer::new(Vec::new());
        item.write_add_request(&mut writer).unwrap();
        let doc = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(
            doc,
            "<ItemServiceAddRq requestID=\"\"><ItemServiceAdd>\
             <Name>Consulting</Name>\
             <SalesOrPurchase><Desc>Hourly consulting</Desc><Price>150.00</Price>\
             <AccountRef><FullName>Sales:Services</FullName></AccountRef></SalesOrPurchase>\
             </ItemServiceAdd></ItemServiceAddRq>"
        );
    }
}

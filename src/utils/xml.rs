//! Small extraction helpers over parsed response documents.

use roxmltree::Node;
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime};

use super::date_format;

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

/// Text of a direct child element, trimmed; empty text counts as absent.
pub(crate) fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name)?
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Text at the end of a nested element path, e.g. `CustomerRef/ListID`.
pub(crate) fn nested_text(node: Node, path: &[&str]) -> Option<String> {
    let (last, parents) = path.split_last()?;
    let mut current = node;
    for name in parents {
        current = child(current, name)?;
    }
    child_text(current, last)
}

pub(crate) fn child_decimal(node: Node, name: &str) -> Option<Decimal> {
    child_text(node, name)?.parse().ok()
}

pub(crate) fn child_bool(node: Node, name: &str) -> Option<bool> {
    let text = child_text(node, name)?;
    Some(text.eq_ignore_ascii_case("true"))
}

pub(crate) fn child_date(node: Node, name: &str) -> Option<Date> {
    date_format::parse_qb_date(&child_text(node, name)?).ok()
}

pub(crate) fn child_datetime(node: Node, name: &str) -> Option<PrimitiveDateTime> {
    date_format::parse_qb_datetime(&child_text(node, name)?).ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use super::*;

    #[test]
    fn extracts_nested_and_typed_children() {
        let doc = roxmltree::Document::parse(
            "<CustomerRet>\
               <ListID>80000001-123</ListID>\
               <CustomerRef><FullName>Acme Corp</FullName></CustomerRef>\
               <Balance>150.25</Balance>\
               <IsPaid>true</IsPaid>\
               <TxnDate>2026-08-07</TxnDate>\
               <Empty></Empty>\
             </CustomerRet>",
        )
        .unwrap();
        let root = doc.root_element();

        assert_eq!(child_text(root, "ListID").as_deref(), Some("80000001-123"));
        assert_eq!(
            nested_text(root, &["CustomerRef", "FullName"]).as_deref(),
            Some("Acme Corp")
        );
        assert_eq!(child_decimal(root, "Balance"), Some(dec!(150.25)));
        assert_eq!(child_bool(root, "IsPaid"), Some(true));
        assert_eq!(child_date(root, "TxnDate"), Some(date!(2026 - 08 - 07)));
        assert_eq!(child_text(root, "Empty"), None);
        assert_eq!(child_text(root, "Absent"), None);
    }
}

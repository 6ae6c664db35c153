//! Batched invoice submission and the missing-item recovery protocol.
//!
//! A batch is posted as one envelope. Invoices whose only failure is a
//! reference to a catalog item the gateway does not know yet are repaired:
//! the item is created and the affected invoices (only those) are resubmitted
//! as the next round. Every other failure is fatal and surfaces unchanged.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::client::Client;
use crate::entities::invoice::Builder;
use crate::entities::item::ServiceItem;
use crate::entities::line_item::{ItemType, LineItem};
use crate::envelope;
use crate::error::{Error, Result};
use crate::response::{self, InvoiceAddOutcome};

/// Gateway status code for an invoice line referencing a catalog item that
/// does not exist.
pub(crate) const STATUS_INVALID_ITEM_REF: i32 = 3140;

/// Hard ceiling on submit/classify rounds; reached only if the per-item
/// progress tracking is somehow defeated.
const MAX_ROUNDS: usize = 16;

// The item name only appears in the message prose; the status code alone
// identifies the failure but cannot carry the name.
static MISSING_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Invalid reference to ItemList: (.+) in ItemRef").expect("pattern is valid")
});

/// Mapping from request id to the gateway-assigned invoice ref-number.
pub type SubmissionResult = BTreeMap<String, String>;

pub(crate) async fn put_invoices(client: &Client, invoices: &[Builder]) -> Result<SubmissionResult> {
    validate_batch(invoices)?;

    let mut results = SubmissionResult::new();
    let mut pending: Vec<&Builder> = invoices.iter().collect();
    let mut created: HashSet<String> = HashSet::new();
    let mut round = 0usize;

    while !pending.is_empty() {
        round += 1;
        if round > MAX_ROUNDS {
            return Err(Error::RecoveryStalled {
                rounds: round - 1,
                detail: format!("{} invoice(s) still unresolved", pending.len()),
            });
        }
        debug!(round, invoices = pending.len(), "submitting invoice batch");
        let body = client
            .request(|w| {
                envelope::write_messages(w, |w| {
                    for invoice in &pending {
                        invoice.write_add_request(w)?;
                    }
                    Ok(())
                })
            })
            .await?;
        let statuses = response::invoice_add_statuses(&body)?;

        let mut queued: HashSet<String> = HashSet::new();
        let mut to_create: Vec<ServiceItem> = Vec::new();
        let mut resubmit_ids: Vec<String> = Vec::new();
        for status in &statuses {
            let InvoiceAddOutcome::Failed { code, message } = &status.outcome else {
                continue;
            };
            if *code != STATUS_INVALID_ITEM_REF {
                return Err(Error::Status {
                    code: *code,
                    message: message.clone(),
                });
            }
            let invoice = pending
                .iter()
                .find(|invoice| invoice.request_id == status.request_id)
                .copied()
                .ok_or_else(|| {
                    Error::UnexpectedResponse(format!(
                        "error response for unknown request id `{}`",
                        status.request_id
                    ))
                })?;
            if !invoice.auto_create_items {
                return Err(Error::Item(format!(
                    "invoice `{}` references at least one line item that does not exist in the \
                     catalog (hint: enable auto_create_items to create missing items on the fly)",
                    status.request_id
                )));
            }
            let item_name = missing_item_name(message)?;
            if created.contains(&item_name) {
                return Err(Error::RecoveryStalled {
                    rounds: round,
                    detail: format!(
                        "item `{item_name}` was created but invoice `{}` still reports it missing",
                        status.request_id
                    ),
                });
            }
            if queued.insert(item_name.clone()) {
                let line = invoice.line_item_named(&item_name).ok_or_else(|| {
                    Error::Item(format!(
                        "the gateway reported item `{item_name}` missing but invoice `{}` has no \
                         such line",
                        status.request_id
                    ))
                })?;
                to_create.push(service_item(line)?);
            }
            if !resubmit_ids.contains(&status.request_id) {
                resubmit_ids.push(status.request_id.clone());
            }
        }

        for status in statuses {
            if let InvoiceAddOutcome::Added { ref_number } = status.outcome {
                if !status.request_id.is_empty() && !results.contains_key(&status.request_id) {
                    results.insert(status.request_id, ref_number);
                }
            }
        }

        for item in &to_create {
            warn!(item = %item.name, "creating catalog item missing from the remote service");
            client.items().create_service(item).await?;
        }
        created.extend(queued);
        pending.retain(|invoice| resubmit_ids.contains(&invoice.request_id));
    }

    Ok(results)
}

fn validate_batch(invoices: &[Builder]) -> Result<()> {
    let mut seen = HashSet::new();
    for invoice in invoices {
        if !seen.insert(invoice.request_id.as_str()) {
            return Err(Error::Item(format!(
                "request id `{}` is used by more than one invoice in this batch",
                invoice.request_id
            )));
        }
        if invoice.auto_create_items {
            for line in invoice.line_items() {
                if line.item_type.is_none() || line.account.is_none() {
                    return Err(Error::Item(format!(
                        "line item `{}` on invoice `{}` must declare an item type and posting \
                         account when item auto-creation is enabled",
                        line.full_name, invoice.request_id
                    )));
                }
            }
        }
    }
    Ok(())
}

fn missing_item_name(message: &str) -> Result<String> {
    let name = MISSING_ITEM_PATTERN
        .captures(message)
        .map(|caps| caps[1].trim().to_owned());
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(Error::Item(
            "cannot create a line item with an empty item name".to_owned(),
        )),
    }
}

fn service_item(line: &LineItem) -> Result<ServiceItem> {
    match (line.item_type, line.account.as_deref()) {
        (Some(ItemType::Service), Some(account)) => Ok(ServiceItem::new(
            &line.full_name,
            &line.description,
            line.rate,
            account,
        )),
        (None, _) | (_, None) => Err(Error::Item(format!(
            "line item `{}` is missing the item type or posting account required for \
             auto-creation",
            line.full_name
        ))),
        (Some(other), _) => Err(Error::Item(format!(
            "only Service items can be created through the gateway; `{}` is declared as \
             {other:?} (a limitation of the hosted service's qbXML subset)",
            line.full_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use super::*;

    #[test]
    fn extracts_the_item_name_from_the_status_message() {
        assert_eq!(
            missing_item_name("Invalid reference to ItemList: Rocket Sled in ItemRef").unwrap(),
            "Rocket Sled"
        );
        // greedy: names containing " in " survive up to the last marker
        assert_eq!(
            missing_item_name("Invalid reference to ItemList: Work in Progress in ItemRef")
                .unwrap(),
            "Work in Progress"
        );
    }

    #[test]
    fn empty_or_unrecognized_messages_are_item_errors() {
        assert!(matches!(
            missing_item_name("Invalid reference to ItemList:  in ItemRef"),
            Err(Error::Item(_))
        ));
        assert!(matches!(
            missing_item_name("Object not found"),
            Err(Error::Item(_))
        ));
    }

    #[test]
    fn duplicate_request_ids_fail_validation() {
        let a = Builder::new("1", date!(2026 - 08 - 07)).with_request_id("dup");
        let b = Builder::new("2", date!(2026 - 08 - 07)).with_request_id("dup");
        assert!(matches!(
            validate_batch(&[a, b]),
            Err(Error::Item(_))
        ));
    }

    #[test]
    fn only_service_items_are_creatable() {
        let service = LineItem::new(dec!(1), "Consulting", "Hourly", dec!(150))
            .with_item(ItemType::Service, "Sales:Services");
        assert!(service_item(&service).is_ok());

        let inventory = LineItem::new(dec!(1), "Widget", "One widget", dec!(10))
            .with_item(ItemType::Inventory, "Sales:Goods");
        assert!(matches!(service_item(&inventory), Err(Error::Item(_))));

        let untyped = LineItem::new(dec!(1), "Widget", "One widget", dec!(10));
        assert!(matches!(service_item(&untyped), Err(Error::Item(_))));
    }
}

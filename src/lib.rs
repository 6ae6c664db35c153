//! # qboe-rs
//!
//! A Rust client library for the QuickBooks Online Edition qbXML gateway.
//!
//! The gateway speaks an XML vocabulary ("qbXML") over mutually-authenticated
//! HTTPS. This crate covers signing on and reusing the session ticket,
//! building and interpreting the authentication envelope around every
//! request, diagnosing transport/TLS failures into actionable errors, posting
//! invoice batches with transparent creation of missing catalog items, and
//! the customer/invoice read queries.
//!
//! ## Quick start
//!
//! ```no_run
//! # async fn run() -> qboe_rs::Result<()> {
//! use qboe_rs::{AppIdentity, Client, Connection, InvoiceBuilder, LineItem};
//! use time::macros::date;
//!
//! let connection = Connection::new(
//!     qboe_rs::GATEWAY_URL,
//!     AppIdentity::new("myapp.example.com", "112734952", "1", "TGT-104-abcdef"),
//! )?
//! .with_credentials("./my_key.pem", "./my_cert.crt");
//! let client = Client::new(connection)?;
//!
//! let mut invoice = InvoiceBuilder::new("80000001-1234", date!(2026 - 08 - 07));
//! invoice.add_line_item(LineItem::new(
//!     "1".parse().unwrap(),
//!     "Consulting",
//!     "Two-hour consult",
//!     "150.00".parse().unwrap(),
//! ))?;
//!
//! let assigned = client.invoices().put(&[invoice]).await?;
//! for (request_id, ref_number) in &assigned {
//!     println!("{request_id} -> invoice {ref_number}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Missing-item recovery
//!
//! When the gateway rejects an invoice because a referenced catalog item does
//! not exist yet, drafts built with `auto_create_items(true)` (and whose
//! lines declare an item type and posting account) have the item created and
//! are resubmitted automatically — only the affected invoices, and only while
//! each round makes progress. Everything else in the error taxonomy is fatal
//! and surfaces unchanged; this crate never retries transport failures.
//!
//! ## Diagnostics
//!
//! Errors implement [`miette::Diagnostic`]. For span traces in error reports,
//! install `tracing_error::ErrorLayer` alongside your `tracing` subscriber.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod utils;

mod envelope;
mod response;
mod session;
mod submission;
mod transport;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::{Client, CustomersApi, InvoicesApi, ItemsApi};
pub use config::{AppIdentity, Connection, Credentials, DEFAULT_TIMEOUT, GATEWAY_URL};
pub use entities::{Address, Customer, Invoice, ItemType, LineItem, ServiceItem};
pub use envelope::QBXML_VERSION;
pub use error::{Error, Result};
pub use submission::SubmissionResult;

// Re-export the invoice draft under a less anonymous name
pub use entities::invoice::Builder as InvoiceBuilder;

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;

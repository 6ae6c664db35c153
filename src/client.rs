use quick_xml::Writer;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::Connection;
use crate::entities::{
    customer::{self, Customer},
    invoice::{self, Invoice},
    item::ServiceItem,
};
use crate::envelope::{self, XmlResult};
use crate::error::Result;
use crate::response;
use crate::session::Session;
use crate::submission::{self, SubmissionResult};
use crate::transport::Transport;

/// This is the client that is used for interacting with the gateway. It owns
/// the transport and the process-wide session ticket, and signs in lazily on
/// the first authenticated request.
#[derive(Debug)]
pub struct Client {
    transport: Transport,
    session: Session,
}

impl Client {
    /// Build a client from connection settings. Credential files are read and
    /// preflighted here, before any request is made.
    pub fn new(connection: Connection) -> Result<Self> {
        let transport = Transport::new(&connection)?;
        let session = Session::new(connection.identity);
        Ok(Self { transport, session })
    }

    /// Post one authenticated business request and return the raw response
    /// text, signing in first when the process holds no ticket yet.
    pub(crate) async fn request<F>(&self, payload: F) -> Result<String>
    where
        F: FnOnce(&mut Writer<Vec<u8>>) -> XmlResult,
    {
        let ticket = self.session.ticket(&self.transport).await?;
        let document = envelope::authenticated(
            &ticket,
            self.session.identity(),
            OffsetDateTime::now_utc(),
            payload,
        )?;
        self.transport.post(document).await
    }

    /// Access the invoices API
    #[must_use]
    pub fn invoices(&self) -> InvoicesApi<'_> {
        InvoicesApi { client: self }
    }

    /// Access the customers API
    #[must_use]
    pub fn customers(&self) -> CustomersApi<'_> {
        CustomersApi { client: self }
    }

    /// Access the catalog items API
    #[must_use]
    pub fn items(&self) -> ItemsApi<'_> {
        ItemsApi { client: self }
    }
}

/// API handler for invoice submission and queries
#[derive(Debug)]
pub struct InvoicesApi<'a> {
    client: &'a Client,
}

impl InvoicesApi<'_> {
    /// Submit a batch of invoice drafts and return a mapping from request id
    /// to the gateway-assigned invoice ref-number.
    ///
    /// Drafts that opted in via `auto_create_items` have their missing
    /// catalog items created on the fly and are resubmitted transparently;
    /// see the crate docs for the recovery protocol.
    #[instrument(skip(self, invoices), fields(count = invoices.len()))]
    pub async fn put(&self, invoices: &[invoice::Builder]) -> Result<SubmissionResult> {
        submission::put_invoices(self.client, invoices).await
    }

    /// Retrieve the list of invoices.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Invoice>> {
        let body = self
            .client
            .request(|w| {
                envelope::write_messages(w, |w| {
                    w.create_element("InvoiceQueryRq").write_empty()?;
                    Ok(())
                })
            })
            .await?;
        invoice::parse_query(&body)
    }
}

/// API handler for customer queries
#[derive(Debug)]
pub struct CustomersApi<'a> {
    client: &'a Client,
}

impl CustomersApi<'_> {
    /// Retrieve the list of customers.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Customer>> {
        let request_id = Uuid::new_v4().simple().to_string();
        let body = self
            .client
            .request(move |w| {
                envelope::write_messages(w, |w| {
                    w.create_element("CustomerQueryRq")
                        .with_attribute(("requestID", request_id.as_str()))
                        .write_empty()?;
                    Ok(())
                })
            })
            .await?;
        customer::parse_query(&body)
    }
}

/// API handler for catalog item creation
#[derive(Debug)]
pub struct ItemsApi<'a> {
    client: &'a Client,
}

impl ItemsApi<'_> {
    /// Create one service-type catalog item. Success carries no payload
    /// beyond the gateway's confirmation.
    #[instrument(skip(self, item), fields(item = %item.name))]
    pub async fn create_service(&self, item: &ServiceItem) -> Result<()> {
        let body = self
            .client
            .request(|w| envelope::write_messages(w, |w| item.write_add_request(w)))
            .await?;
        response::check_mutation(&body, "ItemServiceAddRs")
    }
}

use anyhow::Result;
use rust_decimal_macros::dec;
use time::macros::date;

use qboe_rs::Client;

use test_utils::{MockGateway, customer_query_rs, do_setup, signon_ok, wrap_msgs};

#[tokio::test]
async fn customer_query_maps_records_and_addresses() -> Result<()> {
    do_setup();
    let gateway = MockGateway::start(vec![
        signon_ok("SESSION-1"),
        customer_query_rs(
            "<CustomerRet>\
               <ListID>80000001-1234</ListID>\
               <TimeCreated>2024-03-01T12:00:00</TimeCreated>\
               <TimeModified>2026-08-01T08:30:00</TimeModified>\
               <Name>Acme</Name>\
               <FullName>Acme Corp</FullName>\
               <CompanyName>Acme Corporation</CompanyName>\
               <Sublevel>0</Sublevel>\
               <Phone>555-0100</Phone>\
               <Email>billing@acme.example</Email>\
               <Balance>150.25</Balance>\
               <TotalBalance>220.75</TotalBalance>\
               <BillAddress>\
                 <Addr1>1 Desert Rd</Addr1><Addr2>Suite 9</Addr2>\
                 <City>Tucson</City><State>AZ</State><PostalCode>85701</PostalCode>\
               </BillAddress>\
             </CustomerRet>\
             <CustomerRet><Name>Missing list id, skipped</Name></CustomerRet>",
        ),
    ])
    .await;
    let client = Client::new(gateway.connection())?;

    let customers = client.customers().list().await?;
    assert_eq!(customers.len(), 1);
    let customer = &customers[0];
    assert_eq!(customer.list_id, "80000001-1234");
    assert_eq!(customer.name, "Acme");
    assert_eq!(customer.full_name.as_deref(), Some("Acme Corp"));
    assert_eq!(customer.company_name.as_deref(), Some("Acme Corporation"));
    assert_eq!(customer.phone.as_deref(), Some("555-0100"));
    assert_eq!(customer.balance, dec!(150.25));
    assert_eq!(customer.total_balance, dec!(220.75));
    assert_eq!(customer.bill_address.addr2.as_deref(), Some("Suite 9"));
    assert_eq!(customer.bill_address.postal_code.as_deref(), Some("85701"));
    assert!(customer.time_created.is_some());
    assert!(customer.time_modified.is_some());

    // the query element carries the requestID echo
    let requests = gateway.requests();
    assert!(requests[1].contains("<CustomerQueryRq requestID="));
    Ok(())
}

#[tokio::test]
async fn invoice_query_maps_records_and_lines() -> Result<()> {
    do_setup();
    let gateway = MockGateway::start(vec![
        signon_ok("SESSION-1"),
        wrap_msgs(
            "<InvoiceQueryRs statusSeverity=\"Info\" statusCode=\"0\">\
             <InvoiceRet>\
               <TimeCreated>2026-08-01T08:00:00</TimeCreated>\
               <TxnDate>2026-08-07</TxnDate>\
               <IsPaid>true</IsPaid>\
               <CustomerRef>\
                 <ListID>80000001-1234</ListID><FullName>Acme Corp</FullName>\
               </CustomerRef>\
               <InvoiceLineRet>\
                 <ItemRef><FullName>Consulting</FullName></ItemRef>\
                 <Desc>Two hours</Desc><Rate>150.00</Rate><Quantity>2</Quantity>\
               </InvoiceLineRet>\
               <InvoiceLineRet>\
                 <ItemRef><FullName>Travel</FullName></ItemRef>\
                 <Rate>0.55</Rate><Quantity>120.50</Quantity>\
               </InvoiceLineRet>\
             </InvoiceRet>\
             <InvoiceRet><CustomerRef><ListID>x</ListID></CustomerRef></InvoiceRet>\
             </InvoiceQueryRs>",
        ),
    ])
    .await;
    let client = Client::new(gateway.connection())?;

    let invoices = client.invoices().list().await?;
    assert_eq!(invoices.len(), 1, "the element without TxnDate is skipped");
    let invoice = &invoices[0];
    assert_eq!(invoice.txn_date, date!(2026 - 08 - 07));
    assert_eq!(invoice.customer_id, "80000001-1234");
    assert_eq!(invoice.customer_name.as_deref(), Some("Acme Corp"));
    assert_eq!(invoice.is_paid, Some(true));
    assert_eq!(invoice.lines.len(), 2);
    assert_eq!(invoice.lines[0].item, "Consulting");
    assert_eq!(invoice.lines[0].rate, Some(dec!(150.00)));
    assert_eq!(invoice.lines[1].quantity, Some(dec!(120.50)));
    assert_eq!(invoice.lines[1].description, None);
    Ok(())
}

#[tokio::test]
async fn query_level_errors_surface_as_status_errors() -> Result<()> {
    do_setup();
    let gateway = MockGateway::start(vec![
        signon_ok("SESSION-1"),
        wrap_msgs(
            "<InvoiceQueryRs statusSeverity=\"Error\" statusCode=\"500\" \
             statusMessage=\"Query processing failed\"/>",
        ),
    ])
    .await;
    let client = Client::new(gateway.connection())?;

    let error = client.invoices().list().await.unwrap_err();
    match error {
        qboe_rs::Error::Status { code, .. } => assert_eq!(code, 500),
        other => panic!("expected a status error, got {other:?}"),
    }
    Ok(())
}

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

async fn setup(app: &TestApp) -> Result<(String, String, String)> {
    let owner = app.owner_token().await?;
    let (_, admin) = app.admin(&owner, "alice@depot.uz", "Alice").await?;
    let depot = app.warehouse(&admin, "Chilonzor").await?;
    let tenant = app.tenant(&admin, &depot, "Sardor", 1000).await?;
    Ok((owner, admin, tenant))
}

fn amounts(row: &Value) -> (i64, i64, i64) {
    (
        row["expected_amount"].as_i64().unwrap(),
        row["paid_amount"].as_i64().unwrap(),
        row["carry_over_debt"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn record_creates_then_overwrites_a_single_row() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    let first = app.pay(&admin, &tenant, 3, 2024, 400).await?;
    assert_eq!(amounts(&first), (1000, 400, 0));
    assert_eq!(first["status"], "partial");
    assert_eq!(first["remaining"], 600);
    assert!(first["payment_date"].is_string());

    let second = app.pay(&admin, &tenant, 3, 2024, 1000).await?;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["status"], "paid");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn unpaid_row_has_no_payment_date() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    let row = app.pay(&admin, &tenant, 5, 2024, 0).await?;
    assert_eq!(row["status"], "unpaid");
    assert!(row["payment_date"].is_null());
    Ok(())
}

#[tokio::test]
async fn shortfall_carries_into_next_month_and_stays_put() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    app.pay(&admin, &tenant, 1, 2024, 600).await?;
    let feb = app.pay(&admin, &tenant, 2, 2024, 1000).await?;
    assert_eq!(amounts(&feb), (1000, 1000, 400));
    assert_eq!(feb["total_due"], 1400);
    assert_eq!(feb["status"], "partial");

    // Settling January afterwards does not rewrite February
    app.pay(&admin, &tenant, 1, 2024, 1000).await?;
    let (_, body) = app.get(&format!("/api/tenants/{}/payments", tenant), &admin).await?;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["month"], 2, "latest month first");
    assert_eq!(history[0]["carry_over_debt"], 400);
    Ok(())
}

#[tokio::test]
async fn january_takes_carry_over_from_previous_december() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    app.pay(&admin, &tenant, 12, 2023, 250).await?;
    let jan = app.pay(&admin, &tenant, 1, 2024, 0).await?;
    assert_eq!(amounts(&jan), (1000, 0, 750));
    Ok(())
}

#[tokio::test]
async fn advance_splits_evenly_with_remainder_on_last_month() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    let (status, body) = app
        .post(
            "/api/payments/advance",
            &admin,
            json!({ "tenant_id": tenant, "start_month": 11, "start_year": 2024, "months": 3, "amount": 1000 }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let rows = body["data"].as_array().unwrap();
    let periods: Vec<_> = rows.iter().map(|r| (r["month"].as_i64().unwrap(), r["year"].as_i64().unwrap())).collect();
    assert_eq!(periods, vec![(11, 2024), (12, 2024), (1, 2025)]);

    // Each new month picks up the shortfall of the month created just before it
    assert_eq!(amounts(&rows[0]), (1000, 333, 0));
    assert_eq!(amounts(&rows[1]), (1000, 333, 667));
    assert_eq!(amounts(&rows[2]), (1000, 334, 1334));

    let total: i64 = rows.iter().map(|r| r["paid_amount"].as_i64().unwrap()).sum();
    assert_eq!(total, 1000);
    Ok(())
}

#[tokio::test]
async fn advance_adds_to_existing_rows() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    app.pay(&admin, &tenant, 3, 2024, 200).await?;
    let (status, body) = app
        .post(
            "/api/payments/advance",
            &admin,
            json!({ "tenant_id": tenant, "start_month": 3, "start_year": 2024, "months": 2, "amount": 600, "notes": "prepaid" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let rows = body["data"].as_array().unwrap();
    assert_eq!(amounts(&rows[0]), (1000, 500, 0));
    assert_eq!(amounts(&rows[1]), (1000, 300, 500));
    assert_eq!(rows[1]["notes"], "prepaid");
    Ok(())
}

#[tokio::test]
async fn invalid_ledger_input_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    let (status, _) = app
        .post("/api/payments", &admin, json!({ "tenant_id": tenant, "month": 13, "year": 2024, "paid_amount": 1 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/payments", &admin, json!({ "tenant_id": tenant, "month": 1, "year": 2024, "paid_amount": -1 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/payments/advance",
            &admin,
            json!({ "tenant_id": tenant, "start_month": 1, "start_year": 2024, "months": 0, "amount": 100 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was written by the failed attempts
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn period_listing_summarizes_and_is_scoped() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (owner, admin, tenant) = setup(&app).await?;
    let (_, bob) = app.admin(&owner, "bob@depot.uz", "Bob").await?;
    let bobs_depot = app.warehouse(&bob, "Yunusobod").await?;
    let bobs_tenant = app.tenant(&bob, &bobs_depot, "Bobur", 500).await?;

    app.pay(&admin, &tenant, 6, 2024, 700).await?;
    app.pay(&bob, &bobs_tenant, 6, 2024, 500).await?;

    let (status, body) = app.get("/api/payments?month=6&year=2024", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["payments"].as_array().unwrap().len(), 1);
    assert_eq!(data["payments"][0]["tenant_name"], "Sardor");
    assert_eq!(data["summary"], json!({ "total_due": 1000, "total_paid": 700, "remaining": 300 }));

    // Bob cannot record against Alice's tenant
    let (status, _) = app
        .post("/api/payments", &bob, json!({ "tenant_id": tenant, "month": 6, "year": 2024, "paid_amount": 1 }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn payment_rows_can_be_fetched_and_deleted() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;
    let row = app.pay(&admin, &tenant, 8, 2024, 1000).await?;
    let id = row["id"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/payments/{}", id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tenant_name"], "Sardor");

    let (status, _) = app.delete(&format!("/api/payments/{}", id), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/payments/{}", id), &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn oversized_amounts_are_rejected_before_anything_is_written() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, admin, tenant) = setup(&app).await?;

    let (status, body) = app
        .post(
            "/api/payments",
            &admin,
            json!({ "tenant_id": tenant, "month": 1, "year": 2024, "paid_amount": 0, "expected_amount": i64::MAX }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["expected_amount"].is_string());

    let (status, body) = app
        .post("/api/payments", &admin, json!({ "tenant_id": tenant, "month": 1, "year": 2024, "paid_amount": i64::MAX }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["paid_amount"].is_string());

    let (status, _) = app
        .post(
            "/api/payments/advance",
            &admin,
            json!({ "tenant_id": tenant, "start_month": 1, "start_year": 2024, "months": 2, "amount": i64::MAX }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(count, 0);

    // The following months still read normally
    app.pay(&admin, &tenant, 1, 2024, 0).await?;
    let feb = app.pay(&admin, &tenant, 2, 2024, 0).await?;
    assert_eq!(feb["total_due"], 2000);
    let (status, _) = app.get("/api/payments?month=2&year=2024", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

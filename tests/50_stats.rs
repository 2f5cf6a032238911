mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestApp;

/// Two tenants in March 2024: one fully paid, one partially
async fn seed_march(app: &TestApp, admin: &str) -> Result<(String, String)> {
    let depot = app.warehouse(admin, "Chilonzor").await?;
    let full = app.tenant(admin, &depot, "Sardor", 1000).await?;
    let partial = app.tenant(admin, &depot, "Dilnoza", 500).await?;
    app.pay(admin, &full, 3, 2024, 1000).await?;
    app.pay(admin, &partial, 3, 2024, 200).await?;
    Ok((full, partial))
}

#[tokio::test]
async fn admin_overview_counts_paid_and_unpaid_tenants() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.owner_token().await?;
    let (_, admin) = app.admin(&owner, "alice@depot.uz", "Alice").await?;
    seed_march(&app, &admin).await?;

    let (status, body) = app.get("/api/stats/overview?month=3&year=2024", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "view": "admin",
            "total_income": 1200,
            "total_tenants": 2,
            "paid_tenants": 1,
            "unpaid_tenants": 1,
            "total_warehouses": 1
        })
    );

    let (_, body) = app.get("/api/stats/payment-summary?month=3&year=2024", &admin).await?;
    assert_eq!(
        body["data"],
        json!({ "expected": 1500, "paid": 1200, "unpaid": 300, "percentage": 80.0 })
    );
    Ok(())
}

#[tokio::test]
async fn carry_over_keeps_a_fully_paid_month_unpaid() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.owner_token().await?;
    let (_, admin) = app.admin(&owner, "alice@depot.uz", "Alice").await?;
    let depot = app.warehouse(&admin, "Chilonzor").await?;
    let tenant = app.tenant(&admin, &depot, "Sardor", 1000).await?;
    app.pay(&admin, &tenant, 1, 2024, 500).await?;
    app.pay(&admin, &tenant, 2, 2024, 1000).await?;

    let (_, body) = app.get("/api/stats/overview?month=2&year=2024", &admin).await?;
    assert_eq!(body["data"]["paid_tenants"], 0);
    assert_eq!(body["data"]["unpaid_tenants"], 1);

    // The collection rate ignores carry-over
    let (_, body) = app.get("/api/stats/payment-summary?month=2&year=2024", &admin).await?;
    assert_eq!(body["data"]["percentage"], 100.0);
    Ok(())
}

#[tokio::test]
async fn owner_overview_and_admin_performance() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.owner_token().await?;
    let (_, alice) = app.admin(&owner, "alice@depot.uz", "Alice").await?;
    let (bob_id, bob) = app.admin(&owner, "bob@depot.uz", "Bob").await?;
    seed_march(&app, &alice).await?;

    let bobs_depot = app.warehouse(&bob, "Yunusobod").await?;
    let bobs_tenant = app.tenant(&bob, &bobs_depot, "Bobur", 3000).await?;
    app.pay(&bob, &bobs_tenant, 3, 2024, 3000).await?;
    app.put(&format!("/api/admins/{}/block", bob_id), &owner, json!({ "blocked": true }))
        .await?;

    let (status, body) = app.get("/api/stats/overview?month=3&year=2024", &owner).await?;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["view"], "owner");
    assert_eq!(data["total_income"], 4200);
    assert_eq!(data["total_admins"], 2);
    assert_eq!(data["blocked_admins"], 1);
    assert_eq!(data["active_admins"], 1);
    assert_eq!(data["total_warehouses"], 2);
    assert_eq!(data["total_tenants"], 3);
    assert_eq!(data["paid_tenants"], 2);
    assert_eq!(data["unpaid_tenants"], 1);

    let (status, body) = app.get("/api/stats/admin-performance?month=3&year=2024", &owner).await?;
    assert_eq!(status, StatusCode::OK);
    let top = body["data"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["name"], "Bob");
    assert_eq!(top[0]["income"], 3000);
    assert_eq!(top[1]["name"], "Alice");
    assert_eq!(top[1]["tenants"], 2);

    let (status, _) = app.get("/api/stats/admin-performance", &alice).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn monthly_series_use_requested_language_and_length() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.owner_token().await?;
    let (_, admin) = app.admin(&owner, "alice@depot.uz", "Alice").await?;
    seed_march(&app, &admin).await?;

    let (status, body) = app
        .get("/api/stats/monthly-trend?year=2024&months=4&lang=en", &admin)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            { "month": "Jan", "expected": 0, "paid": 0 },
            { "month": "Feb", "expected": 0, "paid": 0 },
            { "month": "Mar", "expected": 1500, "paid": 1200 },
            { "month": "Apr", "expected": 0, "paid": 0 }
        ])
    );

    let (_, body) = app.get("/api/stats/monthly-income?year=2024", &admin).await?;
    let series = body["data"].as_array().unwrap();
    assert_eq!(series.len(), 6);
    assert_eq!(series[2], json!({ "month": "Mar", "income": 1200 }));

    let (_, body) = app.get("/api/stats/monthly-income?year=2024&months=40&lang=ru", &admin).await?;
    let series = body["data"].as_array().unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series[0]["month"], "Янв");

    let (status, body) = app.get("/api/stats/monthly-income?lang=de", &admin).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["lang"].is_string());
    Ok(())
}

#[tokio::test]
async fn product_types_are_counted_largest_first() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.owner_token().await?;
    let (_, admin) = app.admin(&owner, "alice@depot.uz", "Alice").await?;
    let depot = app.warehouse(&admin, "Chilonzor").await?;

    for (name, product) in [("A", "Texnika"), ("B", "Mebel"), ("C", "Texnika"), ("D", "Kiyim")] {
        let (status, _) = app
            .post(
                "/api/tenants",
                &admin,
                json!({ "warehouse_id": depot, "full_name": name, "product_type": product, "monthly_rent": 100 }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get("/api/stats/product-types", &admin).await?;
    assert_eq!(
        body["data"],
        json!([
            { "name": "Texnika", "value": 2 },
            { "name": "Kiyim", "value": 1 },
            { "name": "Mebel", "value": 1 }
        ])
    );
    Ok(())
}

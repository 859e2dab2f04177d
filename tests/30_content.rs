mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use bionic_cms::middleware::DEGRADED_MESSAGE;
use bionic_cms::types::Role;

#[tokio::test]
async fn product_slugs_are_derived_and_deduplicated() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Editor).await?;

    let res = app
        .post_auth("/api/v1/products", &token, &common::product_payload("Bionic Hand Pro"))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = common::body(res).await?;
    assert_eq!(first["message"], "Product created successfully");
    assert_eq!(first["data"]["slug"], "bionic-hand-pro");
    assert!(first["data"]["createdBy"].is_string());

    let res = app
        .post_auth("/api/v1/products", &token, &common::product_payload("Bionic Hand Pro"))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(common::body(res).await?["data"]["slug"], "bionic-hand-pro-1");

    let res = app.get("/api/v1/products/slug/bionic-hand-pro-1").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["data"]["translations"][0]["name"], "Bionic Hand Pro");
    Ok(())
}

#[tokio::test]
async fn translations_follow_the_requested_language() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Admin).await?;

    let payload = json!({
        "type": "lower_limb",
        "translations": [
            { "language": "en", "name": "Knee Module" },
            { "language": "ru", "name": "Коленный модуль", "shortDescription": "Модуль" }
        ],
        "specs": [
            { "specKey": "weight", "specValue": "1.2 kg", "displayOrder": 2 },
            { "specKey": "battery", "specValue": "18 h", "displayOrder": 1 }
        ]
    });
    let res = app.post_auth("/api/v1/products", &token, &payload).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = common::body(res).await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(created["data"]["translations"].as_array().map(Vec::len), Some(2));

    let res = app.get(&format!("/api/v1/products/{}?language=ru", id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    let translations = body["data"]["translations"].as_array().cloned().unwrap_or_default();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0]["language"], "ru");
    assert_eq!(translations[0]["name"], "Коленный модуль");
    assert_eq!(translations[0]["shortDescription"], "Модуль");
    assert_eq!(body["data"]["specs"][0]["specKey"], "battery");
    assert_eq!(body["data"]["specs"][1]["specKey"], "weight");

    let res = app.get(&format!("/api/v1/products/{}?language=arm", id)).await?;
    let body = common::body(res).await?;
    assert_eq!(body["data"]["translations"], json!([]));

    let res = app.get(&format!("/api/v1/products/{}?language=de", id)).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["error"]["errors"][0]["field"], "language");
    Ok(())
}

#[tokio::test]
async fn translation_updates_upsert_per_language() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Editor).await?;

    let res = app
        .post_auth("/api/v1/products", &token, &common::product_payload("Grip Hand"))
        .await?;
    let id = common::body(res).await?["data"]["id"].as_str().unwrap_or_default().to_string();

    let patch = json!({ "translations": [{ "language": "ru", "name": "Хват" }] });
    for _ in 0..2 {
        let res = app.put_auth(&format!("/api/v1/products/{}", id), &token, &patch).await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = app
        .put_auth(
            &format!("/api/v1/products/{}", id),
            &token,
            &json!({ "sku": "GH-01", "translations": [{ "language": "en", "description": null }] }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["data"]["sku"], "GH-01");
    assert_eq!(body["data"]["slug"], "grip-hand");

    let translations = body["data"]["translations"].as_array().cloned().unwrap_or_default();
    assert_eq!(translations.len(), 2);
    let en = translations.iter().find(|t| t["language"] == "en").cloned().unwrap_or_default();
    assert_eq!(en["name"], "Grip Hand");
    assert!(en["description"].is_null());
    let ru = translations.iter().find(|t| t["language"] == "ru").cloned().unwrap_or_default();
    assert_eq!(ru["name"], "Хват");
    Ok(())
}

#[tokio::test]
async fn writes_require_staff_roles() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app.post("/api/v1/products", &common::product_payload("Anon")).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = app.token_for(Role::User).await?;
    let res = app
        .post_auth("/api/v1/products", &token, &common::product_payload("Member"))
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        common::body(res).await?["message"],
        "Insufficient permissions. Required roles: admin, editor"
    );
    Ok(())
}

#[tokio::test]
async fn list_filters_searches_and_pages() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Admin).await?;

    for name in ["Alpha Hand", "Beta Hand", "Gamma Foot"] {
        let res = app.post_auth("/api/v1/products", &token, &common::product_payload(name)).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    let mut lower = common::product_payload("Delta Knee");
    lower["type"] = json!("lower_limb");
    app.post_auth("/api/v1/products", &token, &lower).await?;

    let res = app.get("/api/v1/products?limit=2&page=2").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["message"], "Products retrieved successfully");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"], json!({ "page": 2, "limit": 2, "total": 4, "totalPages": 2 }));

    let res = app.get("/api/v1/products?type=lower_limb").await?;
    let body = common::body(res).await?;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["slug"], "delta-knee");

    let res = app.get("/api/v1/products?search=hand&sortBy=slug&sortOrder=asc").await?;
    let body = common::body(res).await?;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["data"][0]["slug"], "alpha-hand");
    assert_eq!(body["data"][1]["slug"], "beta-hand");

    let res = app.get("/api/v1/products?sortBy=password").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn lists_degrade_when_the_store_is_down() -> Result<()> {
    let app = common::spawn_app().await?;
    app.set_store_available(false);

    let res = app.get("/api/v1/news?page=3&limit=5").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["message"], DEGRADED_MESSAGE);
    assert_eq!(body["pagination"], json!({ "page": 3, "limit": 5, "total": 0, "totalPages": 0 }));
    Ok(())
}

#[tokio::test]
async fn published_news_counts_views() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Editor).await?;

    let payload = json!({
        "status": "published",
        "translations": [{ "language": "en", "title": "Clinic Opening", "content": "We opened." }]
    });
    let res = app.post_auth("/api/v1/news", &token, &payload).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = common::body(res).await?;
    assert_eq!(created["data"]["slug"], "clinic-opening");
    assert_eq!(created["data"]["viewsCount"], 0);

    let res = app.get("/api/v1/news/slug/clinic-opening?language=arm").await?;
    let body = common::body(res).await?;
    assert_eq!(body["data"]["viewsCount"], 1);
    assert_eq!(body["data"]["translations"], json!([]));

    let res = app.get("/api/v1/news/slug/clinic-opening").await?;
    let body = common::body(res).await?;
    assert_eq!(body["data"]["viewsCount"], 2);
    assert_eq!(body["data"]["translations"][0]["title"], "Clinic Opening");
    Ok(())
}

#[tokio::test]
async fn delete_then_missing() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Admin).await?;

    let payload = json!({
        "name": "Ottobock",
        "websiteUrl": "https://example.com",
        "translations": [{ "language": "en", "description": "Components" }]
    });
    let res = app.post_auth("/api/v1/partners", &token, &payload).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = common::body(res).await?["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = app.delete_auth(&format!("/api/v1/partners/{}", id), &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["message"], "Partner deleted successfully");
    assert!(body["data"].is_null());

    let res = app.get(&format!("/api/v1/partners/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body(res).await?["message"], "Partner not found");

    let res = app.delete_auth(&format!("/api/v1/partners/{}", id), &token).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.get("/api/v1/partners/not-a-uuid").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_requires_a_translation() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Editor).await?;

    let res = app
        .post_auth("/api/v1/products", &token, &json!({ "type": "upper_limb", "translations": [] }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body(res).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["error"]["errors"][0]["field"], "translations");
    Ok(())
}

#[tokio::test]
async fn partners_and_contacts_need_a_translation() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Admin).await?;

    let res = app
        .post_auth("/api/v1/partners", &token, &json!({ "name": "Ottobock", "translations": [] }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["error"]["errors"][0]["field"], "translations");

    let res = app
        .post_auth("/api/v1/contacts", &token, &json!({ "type": "email", "value": "info@bionic.am" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["error"]["errors"][0]["field"], "translations");

    let res = app.get("/api/v1/partners").await?;
    assert_eq!(common::body(res).await?["pagination"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn partners_list_in_display_order_by_default() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Editor).await?;

    for (name, order) in [("Second", 2), ("First", 1), ("Third", 3)] {
        let payload = json!({
            "name": name,
            "displayOrder": order,
            "translations": [{ "language": "en", "description": name }]
        });
        let res = app.post_auth("/api/v1/partners", &token, &payload).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let names = |body: &serde_json::Value| -> Vec<String> {
        body["data"]
            .as_array()
            .map(|rows| rows.iter().map(|r| r["name"].as_str().unwrap_or_default().to_string()).collect())
            .unwrap_or_default()
    };

    let body = common::body(app.get("/api/v1/partners").await?).await?;
    assert_eq!(names(&body), vec!["First", "Second", "Third"]);

    let body = common::body(app.get("/api/v1/partners?sortOrder=desc").await?).await?;
    assert_eq!(names(&body), vec!["Third", "Second", "First"]);
    Ok(())
}

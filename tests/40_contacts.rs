mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use bionic_cms::types::Role;

#[tokio::test]
async fn contact_form_lands_in_the_staff_inbox() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .post(
            "/api/v1/contacts/submit",
            &json!({ "name": "Aram", "email": "aram@example.com", "phone": "", "message": "Need a fitting" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = common::body(res).await?;
    assert_eq!(body["data"]["status"], "new");
    assert!(body["data"]["phone"].is_null());
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    app.post(
        "/api/v1/contacts/submit",
        &json!({ "name": "Lilit", "email": "lilit@example.com", "subject": "Pricing", "message": "How much?" }),
    )
    .await?;

    let res = app.get("/api/v1/contacts/submissions/list").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = app.token_for(Role::Editor).await?;
    let res = app.get_auth("/api/v1/contacts/submissions/list", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body(res).await?;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["data"][0]["name"], "Lilit");

    let res = app
        .patch_auth(&format!("/api/v1/contacts/submissions/{}", id), &token, &json!({ "status": "handled" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body(res).await?["data"]["status"], "handled");

    let res = app.get_auth("/api/v1/contacts/submissions/list?status=handled", &token).await?;
    let body = common::body(res).await?;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Aram");

    let res = app.get_auth("/api/v1/contacts/submissions/list?status=archived", &token).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn contact_form_is_validated() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .post("/api/v1/contacts/submit", &json!({ "name": "", "email": "nope", "message": "" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body(res).await?;
    let fields: Vec<&str> = body["error"]["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(fields, vec!["email", "message", "name"]);
    Ok(())
}

#[tokio::test]
async fn contact_entries_are_managed_by_staff() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for(Role::Admin).await?;

    let payload = json!({
        "type": "phone",
        "value": "+374 10 000000",
        "translations": [{ "language": "en", "label": "Reception" }, { "language": "arm", "label": "Ընդունարան" }]
    });
    let res = app.post_auth("/api/v1/contacts", &token, &payload).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.get("/api/v1/contacts?language=arm").await?;
    let body = common::body(res).await?;
    assert_eq!(body["message"], "Contacts retrieved successfully");
    assert_eq!(body["data"][0]["translations"][0]["label"], "Ընդունարան");
    Ok(())
}

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_requires_admin() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let company = json!({ "handle": "c-new", "name": "New" });

    let res = client.post(server.url("/companies")).json(&company).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/companies"))
        .bearer_auth(common::token("u1", false))
        .json(&company)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn empty_patch_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .patch(server.url("/companies/c1"))
        .bearer_auth(common::token("admin", true))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "No data");
    Ok(())
}

#[tokio::test]
async fn inverted_employee_range_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/companies?minEmployees=4&maxEmployees=2")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("min value"));
    Ok(())
}

#[tokio::test]
async fn unknown_filter_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/companies?size=big")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn company_lifecycle() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let admin = common::token("admin", true);
    let handle = common::unique("co");

    let res = client
        .post(server.url("/companies"))
        .bearer_auth(&admin)
        .json(&json!({
            "handle": handle,
            "name": format!("Name {}", handle),
            "description": "Desc",
            "numEmployees": 3,
            "logoUrl": "http://c.img"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["numEmployees"], 3);

    // Same handle again
    let res = client
        .post(server.url("/companies"))
        .bearer_auth(&admin)
        .json(&json!({ "handle": handle, "name": "Other" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Filtered search finds it by case-insensitive name fragment
    let res = client
        .get(server.url("/companies"))
        .query(&[("name", handle.to_uppercase()), ("minEmployees", "3".into()), ("maxEmployees", "3".into())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let found = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["handle"], handle.as_str());

    // Explicit null clears a nullable column
    let res = client
        .patch(server.url(&format!("/companies/{}", handle)))
        .bearer_auth(&admin)
        .json(&json!({ "numEmployees": 10, "logoUrl": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["numEmployees"], 10);
    assert_eq!(body["data"]["logoUrl"], Value::Null);
    assert_eq!(body["data"]["description"], "Desc");

    let res = client.get(server.url(&format!("/companies/{}", handle))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["jobs"], json!([]));

    let res = client
        .delete(server.url(&format!("/companies/{}", handle)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["deleted"], handle.as_str());

    let res = client.get(server.url(&format!("/companies/{}", handle))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .patch(server.url(&format!("/companies/{}", handle)))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Gone" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn non_numeric_salary_filter_is_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/jobs?minSalary=plenty")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn job_id_is_not_patchable() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin = common::token("admin", true);

    let res = client
        .patch(server.url("/jobs/anything"))
        .bearer_auth(&admin)
        .json(&json!({ "id": 7 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn apply_requires_self_or_admin() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/users/u2/jobs/1"))
        .bearer_auth(common::token("u1", false))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn job_lifecycle_and_applications() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let admin = common::token("admin", true);
    let handle = common::unique("jc");
    let title = common::unique("job");
    let username = common::unique("ap");

    let res = client
        .post(server.url("/companies"))
        .bearer_auth(&admin)
        .json(&json!({ "handle": handle, "name": format!("Name {}", handle) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Unknown company is a bad reference
    let res = client
        .post(server.url("/jobs"))
        .bearer_auth(&admin)
        .json(&json!({ "title": title, "salary": 100, "equity": 0.1, "companyHandle": "missing-co" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/jobs"))
        .bearer_auth(&admin)
        .json(&json!({ "title": title, "salary": 100, "equity": 0.1, "companyHandle": handle }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let job_id = body["data"]["id"].as_i64().unwrap_or_default();
    assert_eq!(body["data"]["equity"], 0.1);

    let res = client
        .get(server.url("/jobs"))
        .query(&[("title", title.as_str()), ("minSalary", "100"), ("hasEquity", "true")])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let res = client
        .get(server.url(&format!("/companies/{}/jobs", handle)))
        .query(&[("minSalary", "101")])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"], json!([]));

    let res = client
        .patch(server.url(&format!("/jobs/{}", title)))
        .bearer_auth(&admin)
        .json(&json!({ "salary": 200, "equity": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["salary"], 200);
    assert_eq!(body["data"]["equity"], Value::Null);

    let res = client
        .post(server.url("/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "username": username,
            "password": "password",
            "firstName": "App",
            "lastName": "Licant",
            "email": "app@example.com"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let user_token = body["data"]["token"].as_str().unwrap_or_default().to_string();

    let apply_url = server.url(&format!("/users/{}/jobs/{}", username, job_id));
    let res = client.post(&apply_url).bearer_auth(&user_token).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.post(&apply_url).bearer_auth(&user_token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(server.url(&format!("/users/{}", username)))
        .bearer_auth(&user_token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["jobs"], json!([job_id]));

    // Deleting the company cascades to its jobs
    let res = client
        .delete(server.url(&format!("/companies/{}", handle)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url(&format!("/jobs/{}", title))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(server.url(&format!("/users/{}", username)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn job_titles_are_unique_even_under_concurrent_creates() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let admin = common::token("admin", true);
    let handle = common::unique("ju");
    let title = common::unique("dup");

    let res = client
        .post(server.url("/companies"))
        .bearer_auth(&admin)
        .json(&json!({ "handle": handle, "name": format!("Name {}", handle) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let job = json!({ "title": title, "salary": 10, "companyHandle": handle });
    let create = || client.post(server.url("/jobs")).bearer_auth(&admin).json(&job).send();
    let (a, b) = tokio::join!(create(), create());
    let mut statuses = vec![a?.status(), b?.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    // A later duplicate is rejected too
    let res = create().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(server.url("/jobs"))
        .query(&[("title", title.as_str())])
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let res = client
        .delete(server.url(&format!("/companies/{}", handle)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

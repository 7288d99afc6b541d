mod common;

use serde_json::{Value, json};
use shop_management::error::error_codes;

use common::{PASSWORD, PHONE, cookie_client, error_code, login, register, spawn_app};

#[tokio::test]
async fn add_list_and_delete_sub_users() {
    let app = spawn_app().await;
    let owner = cookie_client();
    register(&owner, &app, "Alice", PHONE).await;
    register(&owner, &app, "Bobby", "13900000001").await;
    register(&owner, &app, "Carol", "13900000002").await;
    login(&owner, &app, PHONE, PASSWORD).await;

    for phone in ["13900000001", "13900000002"] {
        let body: Value = owner
            .post(app.url("/v1/api/user_team/add_sub_user"))
            .json(&json!({ "phone": phone }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({}));
    }

    let body: Value = owner
        .get(app.url(
            "/v1/api/user_team/sub_user_list?pager.page=1&pager.page_size=1",
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pager"]["page"], 1);
    assert_eq!(body["pager"]["page_size"], 1);
    assert_eq!(body["pager"]["total_rows"], 2);
    assert_eq!(body["pager"]["total_pages"], 2);
    assert_eq!(body["list"].as_array().map(Vec::len), Some(1));

    let body: Value = owner
        .get(app.url("/v1/api/user_team/sub_user_list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = body["list"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    let mut names: Vec<&str> = list.iter().filter_map(|s| s["name"].as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Bobby", "Carol"]);

    let id = list[0]["id"].as_str().unwrap().to_string();
    let body: Value = owner
        .post(app.url("/v1/api/user_team/del_sub_user"))
        .json(&json!({ "id": id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({}));

    let body: Value = owner
        .get(app.url("/v1/api/user_team/sub_user_list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pager"]["total_rows"], 1);
    assert_eq!(app.db.open_connections(), 0);
}

#[tokio::test]
async fn add_sub_user_with_unknown_phone() {
    let app = spawn_app().await;
    let owner = cookie_client();
    register(&owner, &app, "Alice", PHONE).await;
    login(&owner, &app, PHONE, PASSWORD).await;

    let body: Value = owner
        .post(app.url("/v1/api/user_team/add_sub_user"))
        .json(&json!({ "phone": "13999999999" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(error_code(&body), Some(error_codes::USER_NOT_EXISTS as i64));
}

#[tokio::test]
async fn relations_of_other_owners_are_untouched() {
    let app = spawn_app().await;
    let alice = cookie_client();
    let bob = cookie_client();
    register(&alice, &app, "Alice", PHONE).await;
    register(&bob, &app, "Bobby", "13900000001").await;
    register(&bob, &app, "Carol", "13900000002").await;
    login(&alice, &app, PHONE, PASSWORD).await;
    login(&bob, &app, "13900000001", PASSWORD).await;

    alice
        .post(app.url("/v1/api/user_team/add_sub_user"))
        .json(&json!({ "phone": "13900000002" }))
        .send()
        .await
        .unwrap();
    let body: Value = alice
        .get(app.url("/v1/api/user_team/sub_user_list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["list"][0]["id"].as_str().unwrap().to_string();

    // bob 不能删除 alice 的关系
    bob.post(app.url("/v1/api/user_team/del_sub_user"))
        .json(&json!({ "id": id }))
        .send()
        .await
        .unwrap();

    let body: Value = alice
        .get(app.url("/v1/api/user_team/sub_user_list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pager"]["total_rows"], 1);

    let body: Value = bob
        .get(app.url("/v1/api/user_team/sub_user_list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pager"]["total_rows"], 0);
    assert_eq!(body["list"], json!([]));
}

#[tokio::test]
async fn huge_page_number_returns_empty_page() {
    let app = spawn_app().await;
    let owner = cookie_client();
    register(&owner, &app, "Alice", PHONE).await;
    login(&owner, &app, PHONE, PASSWORD).await;

    let body: Value = owner
        .get(app.url(
            "/v1/api/user_team/sub_user_list?pager.page=9223372036854775807&pager.page_size=100",
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(error_code(&body), None);
    assert_eq!(body["pager"]["total_rows"], 0);
    assert_eq!(body["list"], json!([]));
}

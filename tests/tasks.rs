mod common;

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use common::{bearer, context, init_app, signup};
use pretty_assertions::assert_eq;
use serde_json::json;
use taskflow::auth::AuthMiddleware;
use taskflow::models::Task;
use taskflow::routes::{self, health};

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let ctx = context();
    let app = init_app(&ctx.state).await;
    let user = signup(&app, "crud@example.com").await;

    // Create
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(&user.token))
        .set_json(json!({
            "title": "Write integration tests",
            "description": "cover the task routes"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.title, "Write integration tests");
    assert_eq!(created.description.as_deref(), Some("cover the task routes"));
    assert!(!created.completed);
    assert_eq!(created.user_id, user.user_id);

    // A second task lists first.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(&user.token))
        .set_json(json!({ "title": "Ship it", "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let second: Task = test::read_body_json(resp).await;
    assert!(second.completed);

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(bearer(&user.token))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, created.id]);

    // Read
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(bearer(&user.token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // Update keeps `completed` when omitted.
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", second.id))
        .insert_header(bearer(&user.token))
        .set_json(json!({ "title": "Ship it today" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(updated.title, "Ship it today");
    assert!(updated.completed);
    assert!(updated.updated_at >= second.updated_at);
    assert_eq!(updated.created_at, second.created_at);

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(bearer(&user.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(bearer(&user.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_tasks_are_scoped_to_owner() {
    let ctx = context();
    let app = init_app(&ctx.state).await;
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(&alice.token))
        .set_json(json!({ "title": "Alice's task" }))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(bearer(&bob.token))
        .to_request();
    let bobs: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(bobs.is_empty());

    let uri = format!("/api/tasks/{}", task.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&bob.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&bob.token))
        .set_json(json!({ "title": "Hijacked", "completed": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&bob.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Untouched for the owner.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&alice.token))
        .to_request();
    let still: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(still, task);
}

#[actix_rt::test]
async fn test_invalid_task_inputs() {
    let ctx = context();
    let app = init_app(&ctx.state).await;
    let user = signup(&app, "validation@example.com").await;

    let test_cases = vec![
        (json!({ "description": "no title" }), StatusCode::BAD_REQUEST, "missing title"),
        (json!({ "title": "" }), StatusCode::UNPROCESSABLE_ENTITY, "empty title"),
        (
            json!({ "title": "a".repeat(201) }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "title too long",
        ),
        (
            json!({ "title": "ok", "description": "d".repeat(1001) }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "description too long",
        ),
        (
            json!({ "title": "ok", "completed": "yes" }),
            StatusCode::BAD_REQUEST,
            "completed not a bool",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .insert_header(bearer(&user.token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "Test case failed: {}", description);
    }
}

#[actix_rt::test]
async fn test_unknown_task_id_is_not_found() {
    let ctx = context();
    let app = init_app(&ctx.state).await;
    let user = signup(&app, "missing@example.com").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&user.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/tasks/not-a-uuid")
        .insert_header(bearer(&user.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let ctx = context();
    let state = ctx.state.clone();
    let authenticator = Arc::new(state.authenticator("/api/auth/"));

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(AuthMiddleware::new(Arc::clone(&authenticator)))
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client
        .post(format!("{}/api/tasks", base))
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{}/api/tasks", base))
        .header("Authorization", "Bearer forged.token.value")
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    handle.stop(true).await;
}

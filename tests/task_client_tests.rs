mod common;

use chrono::{TimeZone, Utc};
use common::{make_token, session, task_json, EMAIL, USER_ID};
use pretty_assertions::assert_eq;
use serde_json::json;
use taskflow::models::{Priority, TaskDraft, TaskPatch};
use taskflow::tasks::TaskClient;
use taskflow::{api::ApiClient, config::Config};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> TaskClient {
    let config = Config {
        api_url: server.uri(),
        ..Config::default()
    };
    TaskClient::new(ApiClient::new(&config))
}

fn bearer() -> String {
    format!("Bearer {}", make_token(USER_ID, EMAIL))
}

#[tokio::test]
async fn list_sends_bearer_token_to_user_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{}/tasks", USER_ID)))
        .and(header("authorization", bearer().as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([task_json(1, "a", false), task_json(2, "b", true)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client(&server).list(&session()).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(
        tasks[0].due_date,
        Some(Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap())
    );
    assert!(tasks[1].completed);
}

#[tokio::test]
async fn get_fetches_one_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{}/tasks/42", USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(42, "answer", false)))
        .mount(&server)
        .await;

    let task = client(&server).get(&session(), 42).await.unwrap();
    assert_eq!(task.id, 42);
    assert_eq!(task.title, "answer");
}

#[tokio::test]
async fn missing_task_reports_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Task not found" })))
        .mount(&server)
        .await;

    let err = client(&server).get(&session(), 9).await.unwrap_err();
    assert_eq!(err.to_string(), "Task not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn create_posts_draft() {
    let server = MockServer::start().await;
    let due = Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap();
    Mock::given(method("POST"))
        .and(path(format!("/api/{}/tasks", USER_ID)))
        .and(body_json(json!({
            "title": "Write report",
            "description": "quarterly",
            "completed": false,
            "priority": "high",
            "due_date": "2030-05-01T12:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json(3, "Write report", false)))
        .expect(1)
        .mount(&server)
        .await;

    let draft = TaskDraft {
        title: "Write report".into(),
        description: "quarterly".into(),
        completed: false,
        priority: Priority::High,
        due_date: Some(due),
    };
    let task = client(&server).create(&session(), &draft).await.unwrap();
    assert_eq!(task.id, 3);
}

#[tokio::test]
async fn update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/api/{}/tasks/3", USER_ID)))
        .and(body_json(json!({ "title": "Renamed", "due_date": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(3, "Renamed", false)))
        .expect(1)
        .mount(&server)
        .await;

    let patch = TaskPatch {
        title: Some("Renamed".into()),
        due_date: Some(None),
        ..TaskPatch::default()
    };
    let task = client(&server).update(&session(), 3, &patch).await.unwrap();
    assert_eq!(task.title, "Renamed");
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/{}/tasks/3", USER_ID)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete(&session(), 3).await.unwrap();
}

#[tokio::test]
async fn delete_failure_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).delete(&session(), 3).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to delete task");
}

#[tokio::test]
async fn toggle_returns_server_state() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/{}/tasks/3/complete", USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(3, "x", true)))
        .expect(1)
        .mount(&server)
        .await;

    let task = client(&server).toggle_completion(&session(), 3).await.unwrap();
    assert!(task.completed);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tasks": [] })))
        .mount(&server)
        .await;

    let err = client(&server).list(&session()).await.unwrap_err();
    assert!(matches!(err, taskflow::Error::Decode(_)));
}

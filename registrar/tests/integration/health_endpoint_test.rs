//! /health over a real listener
//!
//! サーバーを起動したまま Consul と同じように `/health` を叩き、
//! シャットダウン後に登録解除されることを確認する。

use crate::support::{deregistered_ids, free_port, registered_payloads, write_configs};
use llm_consul::cli::serve::build_manager;
use llm_consul::shutdown::ShutdownController;
use llm_consul::{api, lifecycle, server, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 起動直後は接続拒否になり得るので数回やり直す
async fn get_with_retry(url: &str) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..50 {
        match client.get(url).send().await {
            Ok(response) => return response,
            Err(e) => {
                last_err = Some(e);
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }
    }
    panic!("server at {url} never answered: {last_err:?}");
}

#[tokio::test]
async fn health_is_served_while_registered() {
    let consul = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/agent/service/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&consul)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/v1/agent/service/deregister/.+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&consul)
        .await;

    let port = free_port();
    let config = write_configs(
        *consul.address(),
        true,
        port,
        json!([{ "model": "/models/qwen", "model_alias": "qwen2.5" }]),
    );
    let manager = Arc::new(
        build_manager(Some(&config.consul_config), Some(&config.model_config)).unwrap(),
    );

    let shutdown = ShutdownController::default();
    let app = api::create_app(AppState {
        manager: manager.clone(),
        shutdown: shutdown.clone(),
    });
    let bind_addr = format!("127.0.0.1:{port}");

    let serving = tokio::spawn({
        let manager = manager.clone();
        let shutdown = shutdown.clone();
        let bind_addr = bind_addr.clone();
        async move { lifecycle::run_registered(&manager, server::run(app, &bind_addr, shutdown)).await }
    });

    let response = get_with_retry(&format!("http://{bind_addr}/health")).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "OK" }));

    // Consul に渡したヘルスチェックURLが実際に応答しているURLと一致する
    let payloads = registered_payloads(&consul).await;
    assert_eq!(
        payloads[0]["Check"]["HTTP"],
        format!("http://127.0.0.1:{port}/health")
    );

    shutdown.request_shutdown();
    serving.await.unwrap().unwrap();

    let registered = payloads[0]["ID"].as_str().unwrap().to_string();
    assert_eq!(deregistered_ids(&consul).await, vec![registered]);
}

#[tokio::test]
async fn health_route_is_absent_when_disabled() {
    let consul = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&consul)
        .await;

    let port = free_port();
    let config = write_configs(
        *consul.address(),
        false,
        port,
        json!([{ "model": "/models/qwen", "model_alias": "qwen2.5" }]),
    );
    let manager = Arc::new(
        build_manager(Some(&config.consul_config), Some(&config.model_config)).unwrap(),
    );

    let shutdown = ShutdownController::default();
    let app = api::create_app(AppState {
        manager: manager.clone(),
        shutdown: shutdown.clone(),
    });
    let bind_addr = format!("127.0.0.1:{port}");

    let serving = tokio::spawn({
        let manager = manager.clone();
        let shutdown = shutdown.clone();
        let bind_addr = bind_addr.clone();
        async move { lifecycle::run_registered(&manager, server::run(app, &bind_addr, shutdown)).await }
    });

    let response = get_with_retry(&format!("http://{bind_addr}/health")).await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    shutdown.request_shutdown();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn bind_failure_still_deregisters() {
    let consul = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/agent/service/register"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&consul)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/v1/agent/service/deregister/.+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&consul)
        .await;

    // ポートを先に塞いでおく
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let config = write_configs(
        *consul.address(),
        true,
        port,
        json!([{ "model": "/models/qwen", "model_alias": "qwen2.5" }]),
    );
    let manager = Arc::new(
        build_manager(Some(&config.consul_config), Some(&config.model_config)).unwrap(),
    );
    let app = api::create_app(AppState {
        manager: manager.clone(),
        shutdown: ShutdownController::default(),
    });

    let result = lifecycle::run_registered(
        &manager,
        server::run(app, &format!("127.0.0.1:{port}"), ShutdownController::default()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(deregistered_ids(&consul).await.len(), 1);
}

//! 統合テスト用ユーティリティ
//!
//! Consul agent を wiremock で立て、設定ファイルを一時ディレクトリに書き出す。

#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::{MockServer, Request};

/// 一時ディレクトリに置いた設定ファイル一式
pub struct TestConfig {
    _dir: TempDir,
    pub consul_config: PathBuf,
    pub model_config: PathBuf,
}

/// Consul設定とモデル設定を書き出す
pub fn write_configs(
    consul: SocketAddr,
    enabled: bool,
    advertise_port: u16,
    models: Value,
) -> TestConfig {
    let dir = tempfile::tempdir().expect("create temp dir");
    let consul_config = dir.path().join("config_consul.json");
    let model_config = dir.path().join("config_models.json");

    std::fs::write(
        &consul_config,
        json!({
            "is_register": enabled,
            "consul_host": consul.ip().to_string(),
            "consul_port": consul.port(),
            "bind_service_host": "127.0.0.1",
            "bind_service_port": advertise_port
        })
        .to_string(),
    )
    .expect("write consul config");
    std::fs::write(&model_config, json!({ "models": models }).to_string())
        .expect("write model config");

    TestConfig {
        _dir: dir,
        consul_config,
        model_config,
    }
}

/// 空いているローカルポートを1つ確保する
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("reserve port")
}

/// Consulが受け取った登録ペイロード（順序どおり）
pub async fn registered_payloads(server: &MockServer) -> Vec<Value> {
    received(server)
        .await
        .into_iter()
        .filter(|r| r.url.path() == "/v1/agent/service/register")
        .map(|r| serde_json::from_slice(&r.body).expect("register body is JSON"))
        .collect()
}

/// Consulが受け取った登録解除のインスタンスID（順序どおり）
pub async fn deregistered_ids(server: &MockServer) -> Vec<String> {
    received(server)
        .await
        .into_iter()
        .filter_map(|r| {
            r.url
                .path()
                .strip_prefix("/v1/agent/service/deregister/")
                .map(str::to_string)
        })
        .collect()
}

async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}


//! llm-consul common types
//!
//! 登録サービスとバイナリで共有する設定・型・エラー

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// 共通型定義
pub mod types;

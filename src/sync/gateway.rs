//! 远端同步网关
//!
//! 封装所有与服务端交互的 HTTP 调用。引擎其余部分只依赖
//! [`SyncGateway`] trait，测试用内存假网关替换真实实现。
//!
//! 服务端响应采用 `{ success, payload }` 信封格式，
//! `success: false` 是软失败（业务拒绝），与传输层错误区分。

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::model::{UserProfile, Word, WordProgress};
use crate::storage::outbox::SessionType;
use crate::sync::SyncConfig;

// ============================================================
// 响应信封
// ============================================================

/// 每日测验词表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub success: bool,
    #[serde(default)]
    pub payload: Vec<Word>,
}

/// 通用确认响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// 个人资料响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(default)]
    pub payload: Option<UserProfile>,
}

// ============================================================
// SyncGateway - 网关抽象
// ============================================================

/// 远端网关抽象
///
/// 方法与出箱变更一一对应，外加会话启动用的词表拉取与
/// 资料刷新。实现必须幂等友好：同一变更重放多次不应报错。
#[allow(async_fn_in_trait)]
pub trait SyncGateway {
    /// 拉取今日测验词表
    async fn fetch_daily_quiz(&self) -> EngineResult<Vec<Word>>;

    /// 上载单词学习进度
    async fn put_word_progress(&self, word_id: &str, progress: &WordProgress) -> EngineResult<()>;

    /// 增加钻石（正增量）
    async fn add_diamonds(&self, amount: u32) -> EngineResult<()>;

    /// 触发服务端重算连胜
    async fn update_streak(&self) -> EngineResult<()>;

    /// 记录练习会话时长
    async fn record_practice_session(
        &self,
        minutes: u32,
        session_type: SessionType,
    ) -> EngineResult<()>;

    /// 覆写平均正确率
    async fn put_accuracy(&self, average_accuracy: f64) -> EngineResult<()>;

    /// 刷新个人资料
    async fn fetch_profile(&self) -> EngineResult<UserProfile>;
}

// ============================================================
// HttpSyncGateway - HTTP 实现
// ============================================================

/// 基于 reqwest 的网关实现
pub struct HttpSyncGateway {
    client: Client,
    config: SyncConfig,
    auth_token: String,
}

impl HttpSyncGateway {
    /// 创建 HTTP 网关
    pub fn new(config: SyncConfig, auth_token: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            auth_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// 检查确认响应，软失败转为 Gateway 错误
    fn check_ack(ack: AckResponse) -> EngineResult<()> {
        if ack.success {
            Ok(())
        } else {
            Err(EngineError::Gateway(
                ack.message.unwrap_or_else(|| "未知错误".to_string()),
            ))
        }
    }
}

impl SyncGateway for HttpSyncGateway {
    async fn fetch_daily_quiz(&self) -> EngineResult<Vec<Word>> {
        let response = self
            .client
            .get(self.url("/daily-quiz"))
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let body: QuizResponse = response.json().await?;
        // 软失败与空词表都意味着今天无可练习内容
        if !body.success || body.payload.is_empty() {
            return Err(EngineError::NoEligibleWords);
        }
        Ok(body.payload)
    }

    async fn put_word_progress(&self, word_id: &str, progress: &WordProgress) -> EngineResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/progress/words/{}", word_id)))
            .bearer_auth(&self.auth_token)
            .json(progress)
            .send()
            .await?;

        Self::check_ack(response.json().await?)
    }

    async fn add_diamonds(&self, amount: u32) -> EngineResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/stats/diamonds/{}", amount)))
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        Self::check_ack(response.json().await?)
    }

    async fn update_streak(&self) -> EngineResult<()> {
        let response = self
            .client
            .put(self.url("/stats/streak/update"))
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        Self::check_ack(response.json().await?)
    }

    async fn record_practice_session(
        &self,
        minutes: u32,
        session_type: SessionType,
    ) -> EngineResult<()> {
        let response = self
            .client
            .post(self.url(&format!(
                "/practice-session?practice_time={}&session_type={}",
                minutes,
                session_type.as_str()
            )))
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        Self::check_ack(response.json().await?)
    }

    async fn put_accuracy(&self, average_accuracy: f64) -> EngineResult<()> {
        let response = self
            .client
            .put(self.url("/stats"))
            .bearer_auth(&self.auth_token)
            .json(&serde_json::json!({ "averageAccuracy": average_accuracy }))
            .send()
            .await?;

        Self::check_ack(response.json().await?)
    }

    async fn fetch_profile(&self) -> EngineResult<UserProfile> {
        let response = self
            .client
            .get(self.url("/me"))
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let body: ProfileResponse = response.json().await?;
        if !body.success {
            return Err(EngineError::Gateway("资料刷新被拒绝".to_string()));
        }
        body.payload
            .ok_or_else(|| EngineError::Gateway("资料响应缺少载荷".to_string()))
    }
}

// ============================================================
// 单元测试
// ============================================================

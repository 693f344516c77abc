//! 题目后端接口
//!
//! 会话层只依赖这个 trait，具体是 HTTP 还是模拟后端由调用方决定

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{ProblemSource, SubmissionItem, SubmitAck};

/// 题目拉取/提交接口
#[async_trait]
pub trait ProblemApi: Send + Sync {
    /// 拉取一整批题目，凭证无效时返回 `ApiError::Unauthorized`
    async fn fetch_problems(&self, api_key: &str) -> AppResult<Vec<ProblemSource>>;

    /// 提交整批审核结果，要么全部成功要么失败
    async fn submit_batch(&self, api_key: &str, items: &[SubmissionItem]) -> AppResult<SubmitAck>;
}

//! 批次会话管理器 - 编排层
//!
//! ## 职责
//!
//! 持有一次拉取得到的全部题目记录，负责拉取、单题更新、整体提交三件事。
//!
//! ## 状态发布
//!
//! 会话状态保存在 `tokio::sync::watch` 中，每次修改都会通知订阅者，
//! UI 只读取快照，不直接修改状态。修改从不跨越 `.await`，
//! 因此拉取/提交进行中仍然可以更新单题。
//!
//! ## 并发说明
//!
//! - 重复调用 `load_batch` 不去重，哪个请求最后返回就以哪个为准
//! - 不支持取消进行中的请求，超时由后端客户端负责

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::clients::ProblemApi;
use crate::config::SessionConfig;
use crate::error::AppResult;
use crate::models::{ProblemKey, ProblemRecord, RecordUpdate, SubmissionItem, VerificationStatus};
use crate::services::Confirmer;
use crate::utils::logging;

/// 拉取失败且错误没有消息时的提示
pub const FETCH_FAILED_MESSAGE: &str = "获取题目失败";
/// 提交失败且错误没有消息时的提示
pub const SUBMIT_FAILED_MESSAGE: &str = "提交失败";
/// 提交成功提示
pub const SUBMIT_SUCCESS_MESSAGE: &str = "所有题目验证已提交成功！";

/// 会话状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub records: Vec<ProblemRecord>,
    pub is_loading: bool,
    pub is_submitting: bool,
    pub last_error: Option<String>,
    pub last_success_message: Option<String>,
}

impl SessionState {
    /// 已处理（非待验证）数量
    pub fn completed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_pending()).count()
    }

    /// 待验证数量
    pub fn unverified_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_pending()).count()
    }

    pub fn modified_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == VerificationStatus::Modified)
            .count()
    }

    /// 完成百分比，空批次为 0
    pub fn progress_percent(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.records.len() as f64 * 100.0
    }

    pub fn find(&self, key: &ProblemKey) -> Option<&ProblemRecord> {
        self.records
            .iter()
            .find(|r| r.matches(&key.id, key.question_number))
    }
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 已提交
    Submitted { count: usize, message: String },
    /// 审核人员取消了提交
    Declined { unverified: usize },
    /// 批次为空，无需提交
    NothingToSubmit,
}

/// 离开作用域时清除标志位，无论是正常返回、出错还是 future 被丢弃
struct FlagGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    clear: fn(&mut SessionState),
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(self.clear);
    }
}

/// 批次会话管理器
pub struct BatchSession {
    config: SessionConfig,
    api: Arc<dyn ProblemApi>,
    confirmer: Arc<dyn Confirmer>,
    state: watch::Sender<SessionState>,
}

impl BatchSession {
    pub fn new(
        config: SessionConfig,
        api: Arc<dyn ProblemApi>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            config,
            api,
            confirmer,
            state,
        }
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn records(&self) -> Vec<ProblemRecord> {
        self.state.borrow().records.clone()
    }

    pub fn record(&self, key: &ProblemKey) -> Option<ProblemRecord> {
        self.state.borrow().find(key).cloned()
    }

    pub fn completed_count(&self) -> usize {
        self.state.borrow().completed_count()
    }

    pub fn progress_percent(&self) -> f64 {
        self.state.borrow().progress_percent()
    }

    /// 拉取新批次，成功时整体替换当前记录
    ///
    /// 失败时保留原有记录并写入 `last_error`。返回新批次的题目数量。
    pub async fn load_batch(&self) -> AppResult<usize> {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.last_error = None;
            s.last_success_message = None;
        });
        let _loading = FlagGuard {
            state: &self.state,
            clear: |s| s.is_loading = false,
        };

        info!("\n📥 正在获取新的题目批次...");

        match self.api.fetch_problems(&self.config.api_key).await {
            Ok(sources) => {
                let records: Vec<ProblemRecord> =
                    sources.into_iter().map(ProblemRecord::from_source).collect();
                warn_duplicate_keys(&records);

                let total = records.len();
                self.state.send_modify(|s| s.records = records);
                logging::log_batch_loaded(total);
                Ok(total)
            }
            Err(e) => {
                let message = e.user_message(FETCH_FAILED_MESSAGE);
                error!("❌ 获取题目失败: {}", e);
                self.state.send_modify(|s| s.last_error = Some(message));
                Err(e)
            }
        }
    }

    /// 按（试卷ID, 题号）更新单条记录
    ///
    /// 找不到对应记录时不做任何修改，返回 false。
    pub fn update_record(&self, id: &str, question_number: u32, updates: RecordUpdate) -> bool {
        let updated = self.state.send_if_modified(|s| {
            match s.records.iter_mut().find(|r| r.matches(id, question_number)) {
                Some(record) => {
                    record.apply(updates);
                    true
                }
                None => false,
            }
        });

        if updated {
            debug!("已更新 [试卷 {} 题目#{}]", id, question_number);
        } else {
            debug!("未找到 [试卷 {} 题目#{}]，忽略更新", id, question_number);
        }
        updated
    }

    pub fn apply(&self, key: &ProblemKey, updates: RecordUpdate) -> bool {
        self.update_record(&key.id, key.question_number, updates)
    }

    /// 提交整个批次
    ///
    /// 还有待验证题目时先请求确认，确认之前不会发起任何请求。
    /// 成功后清空批次；失败时保留记录，可以直接重试。
    pub async fn submit_batch(&self) -> AppResult<SubmitOutcome> {
        let (total, unverified) = {
            let state = self.state.borrow();
            (state.records.len(), state.unverified_count())
        };

        if total == 0 {
            debug!("批次为空，跳过提交");
            return Ok(SubmitOutcome::NothingToSubmit);
        }

        if unverified > 0 && !self.confirmer.confirm_submit(unverified).await {
            info!("已取消提交，仍有 {} 道题目未验证", unverified);
            return Ok(SubmitOutcome::Declined { unverified });
        }

        let (payload, completed, modified) = {
            let state = self.state.borrow();
            let payload: Vec<SubmissionItem> =
                state.records.iter().map(ProblemRecord::to_submission).collect();
            (payload, state.completed_count(), state.modified_count())
        };

        if payload.is_empty() {
            return Ok(SubmitOutcome::NothingToSubmit);
        }

        self.state.send_modify(|s| {
            s.is_submitting = true;
            s.last_error = None;
        });
        let _submitting = FlagGuard {
            state: &self.state,
            clear: |s| s.is_submitting = false,
        };

        logging::log_submit_start(completed, payload.len(), modified);

        match self.api.submit_batch(&self.config.api_key, &payload).await {
            Ok(ack) => {
                logging::log_submit_complete(payload.len(), &ack.message);
                self.state.send_modify(|s| {
                    s.last_success_message = Some(SUBMIT_SUCCESS_MESSAGE.to_string());
                    s.records.clear();
                });
                Ok(SubmitOutcome::Submitted {
                    count: payload.len(),
                    message: ack.message,
                })
            }
            Err(e) => {
                let message = e.user_message(SUBMIT_FAILED_MESSAGE);
                error!("❌ 提交失败: {}", e);
                self.state.send_modify(|s| s.last_error = Some(message));
                Err(e)
            }
        }
    }
}

/// 同一批次中（试卷ID, 题号）应唯一，重复时只记录警告
fn warn_duplicate_keys(records: &[ProblemRecord]) {
    let mut seen = HashSet::new();
    for record in records {
        let key = record.key();
        if !seen.insert(key.clone()) {
            warn!("⚠️ 批次中存在重复的题目 {}", key);
        }
    }
}

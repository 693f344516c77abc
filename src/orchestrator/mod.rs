//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 管理一个批次从拉取到提交的完整生命周期，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::BatchSession (处理 Vec<ProblemRecord>)
//!     ↓
//! workflow::ReviewItem (单题状态机，产出 RecordUpdate)
//!     ↓
//! services (能力层：renderer / confirmer)
//!     ↓
//! clients (后端：HTTP / 模拟)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一数据源**：所有记录只存在于会话状态中
//! 2. **显式配置**：凭证通过 `SessionConfig` 注入
//! 3. **只读消费**：UI 通过订阅或快照读取状态

pub mod batch_session;

pub use batch_session::{
    BatchSession, SessionState, SubmitOutcome, FETCH_FAILED_MESSAGE, SUBMIT_FAILED_MESSAGE,
    SUBMIT_SUCCESS_MESSAGE,
};

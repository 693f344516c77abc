//! # Math Verify
//!
//! 数学题目知识点/解题方法的人工验证工作台
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 后端层（Clients）
//! - `clients/` - 题目拉取与提交，只暴露 `ProblemApi` 能力
//! - `HttpProblemApi` - 真实后端（HTTP）
//! - `MockProblemApi` - 模拟后端（校验凭证、模拟延迟）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有批次状态
//! - `Renderer` - 题干渲染（Markdown + LaTeX）
//! - `Confirmer` - 提交前确认
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的审核流程
//! - `ReviewItem` - 单题状态机（验证 / 编辑 / 重置）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_session` - 批次会话，管理拉取、更新、提交和进度
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{HttpProblemApi, MockProblemApi, ProblemApi};
pub use config::{Config, SessionConfig};
pub use error::{AppError, AppResult};
pub use models::{ProblemKey, ProblemRecord, ProblemSource, RecordUpdate, SubmissionItem, VerificationStatus};
pub use orchestrator::{BatchSession, SessionState, SubmitOutcome};
pub use services::{AutoConfirmer, Confirmer, Renderer, TerminalRenderer};
pub use workflow::{EditDraft, ReviewItem};

//! 单题审核状态机 - 流程层
//!
//! 状态流转：
//!
//! ```text
//! PENDING ──verify──▶ VERIFIED ──reset──▶ PENDING
//!    │                   │
//!    └────save_edit──▶ MODIFIED ◀──save_edit──┐
//!                        │  └─────────────────┘
//!                        └──reset──▶ PENDING
//! ```
//!
//! 编辑模式只存在于 `ReviewItem` 中，不属于持久化的状态。
//! 每个操作都返回一个 `RecordUpdate`，交给会话层合并到记录上。

use crate::models::{ProblemKey, ProblemRecord, RecordUpdate, VerificationStatus};

/// 编辑缓冲区的分隔符
const JOIN_DELIMITER: &str = ", ";

/// 编辑中的文本缓冲
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    /// 知识点（逗号分隔）
    pub knowledge_text: String,
    /// 方法（逗号分隔）
    pub methods_text: String,
}

/// 单题审核
#[derive(Debug, Clone)]
pub struct ReviewItem {
    key: ProblemKey,
    draft: Option<EditDraft>,
}

impl ReviewItem {
    pub fn new(key: ProblemKey) -> Self {
        Self { key, draft: None }
    }

    pub fn for_record(record: &ProblemRecord) -> Self {
        Self::new(record.key())
    }

    pub fn key(&self) -> &ProblemKey {
        &self.key
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.draft.as_mut()
    }

    /// 确认无误，不改动知识点和方法
    pub fn verify(&self) -> RecordUpdate {
        RecordUpdate::status(VerificationStatus::Verified)
    }

    /// 进入编辑模式，用当前值填充缓冲区
    pub fn begin_edit(&mut self, record: &ProblemRecord) -> &mut EditDraft {
        self.draft.insert(EditDraft {
            knowledge_text: record.knowledge_points.join(JOIN_DELIMITER),
            methods_text: record.methods.join(JOIN_DELIMITER),
        })
    }

    /// 保存编辑结果并退出编辑模式
    ///
    /// 即使内容没有变化，状态也会变为 `Modified`。
    pub fn save_edit(&mut self, knowledge_text: &str, methods_text: &str) -> RecordUpdate {
        self.draft = None;
        RecordUpdate {
            status: Some(VerificationStatus::Modified),
            knowledge_points: Some(parse_tag_list(knowledge_text)),
            methods: Some(parse_tag_list(methods_text)),
        }
    }

    /// 用当前缓冲区内容保存；不在编辑模式时返回 None
    pub fn save_draft(&mut self) -> Option<RecordUpdate> {
        let draft = self.draft.take()?;
        Some(self.save_edit(&draft.knowledge_text, &draft.methods_text))
    }

    /// 放弃编辑
    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    /// 状态回到待验证，已编辑的内容保留
    pub fn reset(&self) -> RecordUpdate {
        RecordUpdate::status(VerificationStatus::Pending)
    }
}

/// 按中英文逗号拆分，去除首尾空白并丢弃空项
///
/// 保留原有顺序，不去重。
pub fn parse_tag_list(text: &str) -> Vec<String> {
    text.split([',', '，'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

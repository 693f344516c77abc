use serde::{Deserialize, Serialize};

/// 题目验证状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// 待验证
    #[default]
    Pending,
    /// 已确认无误
    Verified,
    /// 已修改
    Modified,
}

impl VerificationStatus {
    pub fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "待验证",
            VerificationStatus::Verified => "已验证",
            VerificationStatus::Modified => "已修改",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 题目在批次中的唯一标识（试卷ID + 题号）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProblemKey {
    pub id: String,
    pub question_number: u32,
}

impl ProblemKey {
    pub fn new(id: impl Into<String>, question_number: u32) -> Self {
        Self {
            id: id.into(),
            question_number,
        }
    }
}

impl std::fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[试卷 {} 题目#{}]", self.id, self.question_number)
    }
}

/// 后端返回的题目数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSource {
    /// 试卷ID
    pub id: String,
    pub question_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    /// 题干（Markdown + LaTeX）
    pub markdown: String,
    #[serde(default)]
    pub knowledge_points: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

/// 审核中的题目记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemRecord {
    pub id: String,
    pub question_number: u32,
    pub image_ref: Option<String>,
    content: String,
    pub knowledge_points: Vec<String>,
    pub methods: Vec<String>,
    original_knowledge_points: Vec<String>,
    original_methods: Vec<String>,
    pub status: VerificationStatus,
}

impl ProblemRecord {
    /// 从后端数据创建记录
    ///
    /// 状态一律为 `Pending`，并深拷贝一份原始知识点/方法作为快照。
    pub fn from_source(source: ProblemSource) -> Self {
        let image_ref = source.img_url.filter(|url| !url.trim().is_empty());
        Self {
            id: source.id,
            question_number: source.question_number,
            image_ref,
            content: source.markdown,
            original_knowledge_points: source.knowledge_points.clone(),
            original_methods: source.methods.clone(),
            knowledge_points: source.knowledge_points,
            methods: source.methods,
            status: VerificationStatus::Pending,
        }
    }

    pub fn key(&self) -> ProblemKey {
        ProblemKey::new(self.id.clone(), self.question_number)
    }

    pub fn matches(&self, id: &str, question_number: u32) -> bool {
        self.id == id && self.question_number == question_number
    }

    /// 题干（Markdown + LaTeX）
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn original_knowledge_points(&self) -> &[String] {
        &self.original_knowledge_points
    }

    pub fn original_methods(&self) -> &[String] {
        &self.original_methods
    }

    pub fn is_pending(&self) -> bool {
        self.status == VerificationStatus::Pending
    }

    /// 合并部分更新，未设置的字段保持不变
    pub fn apply(&mut self, update: RecordUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(knowledge_points) = update.knowledge_points {
            self.knowledge_points = knowledge_points;
        }
        if let Some(methods) = update.methods {
            self.methods = methods;
        }
    }

    /// 生成提交条目
    pub fn to_submission(&self) -> SubmissionItem {
        SubmissionItem {
            id: self.id.clone(),
            question_number: self.question_number,
            modified: self.status == VerificationStatus::Modified,
            final_knowledge_points: self.knowledge_points.clone(),
            final_methods: self.methods.clone(),
        }
    }
}

/// 记录的部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub status: Option<VerificationStatus>,
    pub knowledge_points: Option<Vec<String>>,
    pub methods: Option<Vec<String>>,
}

impl RecordUpdate {
    pub fn status(status: VerificationStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.knowledge_points.is_none() && self.methods.is_none()
    }
}

/// 提交给后端的单条结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionItem {
    pub id: String,
    pub question_number: u32,
    pub modified: bool,
    pub final_knowledge_points: Vec<String>,
    pub final_methods: Vec<String>,
}

/// 后端提交回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

//! 模拟后端
//!
//! 在没有真实服务时使用：校验凭证、模拟网络延迟、返回固定题目

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::clients::api::ProblemApi;
use crate::error::{AppError, AppResult};
use crate::models::{ProblemSource, SubmissionItem, SubmitAck};

/// 默认凭证
pub const DEFAULT_MOCK_KEY: &str = "12345abc";
/// 每批生成的题目数
const BATCH_SIZE: usize = 10;
/// 同一张试卷的题目数
const QUESTIONS_PER_PAPER: usize = 10;

/// 模拟后端
pub struct MockProblemApi {
    expected_key: String,
    templates: Vec<ProblemSource>,
    fetch_delay: Duration,
    submit_delay: Duration,
}

impl MockProblemApi {
    /// 使用内置题目模板和默认延迟
    pub fn new() -> Self {
        Self {
            expected_key: DEFAULT_MOCK_KEY.to_string(),
            templates: builtin_templates(),
            fetch_delay: Duration::from_millis(800),
            submit_delay: Duration::from_millis(1500),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.expected_key = key.into();
        self
    }

    /// 使用自定义题目模板（例如从 TOML 文件加载）
    pub fn with_templates(mut self, templates: Vec<ProblemSource>) -> Self {
        if !templates.is_empty() {
            self.templates = templates;
        }
        self
    }

    /// 拉取和提交使用同一个延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.fetch_delay = latency;
        self.submit_delay = latency;
        self
    }

    fn check_key(&self, api_key: &str) -> AppResult<()> {
        if api_key != self.expected_key {
            return Err(AppError::unauthorized("Invalid API Key"));
        }
        Ok(())
    }

    /// 由模板循环生成一批题目，题号从 1 开始
    fn generate_batch(&self) -> Vec<ProblemSource> {
        (0..BATCH_SIZE)
            .map(|i| {
                let template = &self.templates[i % self.templates.len()];
                let mut problem = template.clone();
                problem.question_number = (i + 1) as u32;
                problem.id = format!("PAPER_2023_{}", i / QUESTIONS_PER_PAPER + 1);
                if i > 2 {
                    problem.markdown = format!("{} (变式 {})", template.markdown, i);
                }
                problem
            })
            .collect()
    }
}

impl Default for MockProblemApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProblemApi for MockProblemApi {
    async fn fetch_problems(&self, api_key: &str) -> AppResult<Vec<ProblemSource>> {
        info!("[API] Fetching problems with key: {}", api_key);
        sleep(self.fetch_delay).await;

        self.check_key(api_key)?;
        Ok(self.generate_batch())
    }

    async fn submit_batch(&self, api_key: &str, items: &[SubmissionItem]) -> AppResult<SubmitAck> {
        info!("[API] Submitting batch with key: {}", api_key);
        debug!("[API] Payload: {}", serde_json::to_string_pretty(items)?);
        sleep(self.submit_delay).await;

        self.check_key(api_key)?;
        Ok(SubmitAck {
            success: true,
            message: "Batch processed successfully".to_string(),
        })
    }
}

fn builtin_templates() -> Vec<ProblemSource> {
    let tags = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        ProblemSource {
            id: "PAPER_2023_001".to_string(),
            question_number: 1,
            img_url: Some("https://picsum.photos/400/200?random=1".to_string()),
            markdown: "已知函数 $$ f(x) = \\ln(x^2 + 1) $$，求导数 $$ f'(x) $$。".to_string(),
            knowledge_points: tags(&["导数", "链式法则"]),
            methods: tags(&["直接计算法"]),
        },
        ProblemSource {
            id: "PAPER_2023_001".to_string(),
            question_number: 2,
            img_url: Some(String::new()),
            markdown: "解方程 $$ x^2 - 5x + 6 = 0 $$，求 $$ x $$ 的值。".to_string(),
            knowledge_points: tags(&["一元二次方程"]),
            methods: tags(&["因式分解法", "公式法"]),
        },
        ProblemSource {
            id: "PAPER_2023_001".to_string(),
            question_number: 3,
            img_url: None,
            markdown: "在 $$ \\triangle ABC $$ 中，若 $$ A = 30^\\circ $$，$$ b = 4 $$，$$ c = 5 $$，求三角形面积 $$ S = \\frac{1}{2}bc\\sin A $$。".to_string(),
            knowledge_points: tags(&["三角函数", "三角形面积"]),
            methods: tags(&["公式代入法"]),
        },
    ]
}

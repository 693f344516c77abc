//! 提交确认 - 业务能力层
//!
//! 还有未验证题目时，提交前需要审核人员确认

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

/// 共享的标准输入行读取器，命令循环和确认提示共用一个缓冲区
pub type SharedInput = Arc<Mutex<Lines<BufReader<Stdin>>>>;

pub fn stdin_lines() -> SharedInput {
    Arc::new(Mutex::new(BufReader::new(io::stdin()).lines()))
}

/// 提交确认
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// 返回 true 表示继续提交
    async fn confirm_submit(&self, unverified: usize) -> bool;
}

/// 提示文本
pub fn confirm_prompt(unverified: usize) -> String {
    format!("您还有 {} 道题目未验证。确定要提交吗？", unverified)
}

/// 固定应答（非交互模式、测试）
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirmer(pub bool);

#[async_trait]
impl Confirmer for AutoConfirmer {
    async fn confirm_submit(&self, _unverified: usize) -> bool {
        self.0
    }
}

/// 从标准输入读取 y/N
pub struct StdinConfirmer {
    input: SharedInput,
}

impl StdinConfirmer {
    pub fn new(input: SharedInput) -> Self {
        Self { input }
    }
}

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm_submit(&self, unverified: usize) -> bool {
        let mut stdout = io::stdout();
        let prompt = format!("{} (y/N) ", confirm_prompt(unverified));
        if let Err(e) = stdout.write_all(prompt.as_bytes()).await {
            warn!("无法输出确认提示: {}", e);
            return false;
        }
        let _ = stdout.flush().await;

        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(Some(line)) => is_yes(&line),
            Ok(None) => false,
            Err(e) => {
                warn!("读取确认输入失败: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "是" | "确定"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(is_yes("是"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }

    #[test]
    fn test_confirm_prompt_mentions_count() {
        assert_eq!(confirm_prompt(2), "您还有 2 道题目未验证。确定要提交吗？");
    }

    #[test]
    fn test_auto_confirmer() {
        assert!(tokio_test::block_on(AutoConfirmer(true).confirm_submit(3)));
        assert!(!tokio_test::block_on(AutoConfirmer(false).confirm_submit(3)));
    }
}

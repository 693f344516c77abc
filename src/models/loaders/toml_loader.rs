use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::problem::ProblemSource;

/// TOML 题目文件结构
///
/// ```toml
/// [[problems]]
/// id = "PAPER_2023_1"
/// question_number = 1
/// markdown = "已知函数 $$ f(x) = \\ln(x^2 + 1) $$，求导数。"
/// knowledge_points = ["导数", "链式法则"]
/// methods = ["直接计算法"]
/// ```
#[derive(Debug, Deserialize)]
struct ProblemFile {
    #[serde(default)]
    problems: Vec<ProblemSource>,
}

/// 解析 TOML 文本为题目列表
pub fn parse_problem_toml(content: &str, path: &str) -> AppResult<Vec<ProblemSource>> {
    let file: ProblemFile = toml::from_str(content).map_err(|e| FileError::TomlParseFailed {
        path: path.to_string(),
        source: Box::new(e),
    })?;
    Ok(file.problems)
}

/// 从 TOML 文件加载题目列表
pub async fn load_problem_file(toml_file_path: &Path) -> AppResult<Vec<ProblemSource>> {
    let path_display = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(path_display.clone(), e))?;

    let problems = parse_problem_toml(&content, &path_display)?;
    tracing::info!(
        "从 {} 加载了 {} 道题目",
        toml_file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        problems.len()
    );

    Ok(problems)
}

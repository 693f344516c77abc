//! 题干渲染 - 业务能力层
//!
//! 只负责把 Markdown + LaTeX 文本变成可显示的内容，无副作用

use std::sync::OnceLock;

use regex::Regex;

/// 题干渲染器
pub trait Renderer: Send + Sync {
    /// 同样的输入总是得到同样的输出
    fn render(&self, markdown: &str) -> String;
}

/// 题干中的片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// 普通文本
    Text(&'a str),
    /// 行内公式 `$…$`
    InlineMath(&'a str),
    /// 独立公式 `$$…$$`
    DisplayMath(&'a str),
}

fn math_regex() -> &'static Regex {
    static MATH_RE: OnceLock<Regex> = OnceLock::new();
    MATH_RE.get_or_init(|| {
        Regex::new(r"(?s)\$\$(.+?)\$\$|\$([^$]+?)\$").expect("公式正则无效")
    })
}

/// 把题干拆分为文本和公式片段，保持原有顺序
pub fn split_segments(markdown: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in math_regex().captures_iter(markdown) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(&markdown[last..whole.start()]));
        }
        if let Some(display) = caps.get(1) {
            segments.push(Segment::DisplayMath(display.as_str().trim()));
        } else if let Some(inline) = caps.get(2) {
            segments.push(Segment::InlineMath(inline.as_str().trim()));
        }
        last = whole.end();
    }

    if last < markdown.len() {
        segments.push(Segment::Text(&markdown[last..]));
    }

    segments
}

/// 终端渲染：公式用 `⟦…⟧` 标出，文本中的连续空白压缩为一个空格
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut output = String::with_capacity(markdown.len());
        for segment in split_segments(markdown) {
            match segment {
                Segment::Text(text) => output.push_str(&collapse_whitespace(text)),
                Segment::InlineMath(math) | Segment::DisplayMath(math) => {
                    output.push('⟦');
                    output.push_str(math);
                    output.push('⟧');
                }
            }
        }
        output.trim().to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }
    collapsed
}

//! 终端审核界面
//!
//! 会话状态的只读消费者：展示题目、转发审核操作、触发拉取和提交

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{self, AsyncWriteExt};
use tracing::{info, warn};

use crate::clients::{HttpProblemApi, MockProblemApi, ProblemApi};
use crate::config::Config;
use crate::models::{load_problem_file, ProblemRecord};
use crate::orchestrator::{BatchSession, SubmitOutcome};
use crate::services::{stdin_lines, Renderer, SharedInput, StdinConfirmer, TerminalRenderer};
use crate::utils::{logging, truncate_text};
use crate::workflow::ReviewItem;

/// 编辑时输入该内容表示放弃编辑
const CANCEL_INPUT: &str = ":q";

/// 终端命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Show(usize),
    Verify(usize),
    Edit(usize),
    Reset(usize),
    Submit,
    Reload,
    Help,
    Quit,
}

/// 解析一行输入，题目序号从 1 开始
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?.to_lowercase();
    let index = parts.next().and_then(|v| v.parse::<usize>().ok());

    let command = match (name.as_str(), index) {
        ("list" | "ls" | "l", _) => Command::List,
        ("show" | "s", Some(n)) => Command::Show(n),
        ("verify" | "v", Some(n)) => Command::Verify(n),
        ("edit" | "e", Some(n)) => Command::Edit(n),
        ("reset" | "r", Some(n)) => Command::Reset(n),
        ("submit", _) => Command::Submit,
        ("reload" | "refresh", _) => Command::Reload,
        ("help" | "h" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// 应用主结构
pub struct App {
    session: Arc<BatchSession>,
    renderer: TerminalRenderer,
    input: SharedInput,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config.api_base_url, config.use_mock_api);

        let api = build_api(&config).await?;
        let input = stdin_lines();
        let confirmer = Arc::new(StdinConfirmer::new(input.clone()));
        let session = Arc::new(BatchSession::new(config.session_config(), api, confirmer));

        Ok(Self {
            session,
            renderer: TerminalRenderer,
            input,
        })
    }

    /// 运行审核主循环
    pub async fn run(&self) -> Result<()> {
        self.reload().await;
        print_help();

        loop {
            let Some(line) = self.read_line("> ").await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Some(Command::Quit) => break,
                Some(command) => self.dispatch(command).await?,
                None => println!("无法识别的命令，输入 help 查看帮助"),
            }
        }

        info!("👋 已退出");
        Ok(())
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::List => self.print_batch(),
            Command::Show(n) => {
                if let Some(record) = self.record_at(n) {
                    self.print_record(n, &record);
                }
            }
            Command::Verify(n) => {
                if let Some(record) = self.record_at(n) {
                    self.session.apply(&record.key(), ReviewItem::for_record(&record).verify());
                    self.print_progress();
                }
            }
            Command::Reset(n) => {
                if let Some(record) = self.record_at(n) {
                    self.session.apply(&record.key(), ReviewItem::for_record(&record).reset());
                    self.print_progress();
                }
            }
            Command::Edit(n) => {
                if let Some(record) = self.record_at(n) {
                    self.edit(&record).await?;
                }
            }
            Command::Submit => self.submit().await,
            Command::Reload => self.reload().await,
            Command::Help => print_help(),
            Command::Quit => {}
        }
        Ok(())
    }

    async fn reload(&self) {
        if self.session.snapshot().is_loading {
            println!("正在加载中，请稍候");
            return;
        }
        match self.session.load_batch().await {
            Ok(_) => self.print_batch(),
            Err(_) => self.print_error(),
        }
    }

    async fn submit(&self) {
        let state = self.session.snapshot();
        if state.records.is_empty() {
            println!("当前没有题目，输入 reload 获取新题目");
            return;
        }
        if state.is_submitting {
            println!("正在提交...");
            return;
        }

        match self.session.submit_batch().await {
            Ok(SubmitOutcome::Submitted { .. }) => {
                let state = self.session.snapshot();
                println!(
                    "✅ 提交完成：{}",
                    state.last_success_message.unwrap_or_default()
                );
                println!("输入 reload 获取新的一批题目");
            }
            Ok(SubmitOutcome::Declined { unverified }) => {
                println!("已取消提交，还有 {} 道题目未验证", unverified);
            }
            Ok(SubmitOutcome::NothingToSubmit) => println!("当前没有题目"),
            Err(_) => {
                self.print_error();
                println!("输入 submit 重试");
            }
        }
    }

    /// 编辑一道题目的知识点和方法
    async fn edit(&self, record: &ProblemRecord) -> Result<()> {
        let mut item = ReviewItem::for_record(record);
        let draft = item.begin_edit(record).clone();

        println!("编辑 {}（直接回车保留原值，输入 {} 放弃编辑）", record.key(), CANCEL_INPUT);
        println!("支持中文或英文逗号分隔");

        let Some(knowledge) = self
            .read_edit_field("知识点", &draft.knowledge_text)
            .await?
        else {
            item.cancel_edit();
            println!("已放弃编辑");
            return Ok(());
        };
        let Some(methods) = self.read_edit_field("方法", &draft.methods_text).await? else {
            item.cancel_edit();
            println!("已放弃编辑");
            return Ok(());
        };

        if let Some(buffers) = item.draft_mut() {
            buffers.knowledge_text = knowledge;
            buffers.methods_text = methods;
        }
        if let Some(update) = item.save_draft() {
            if !self.session.apply(&record.key(), update) {
                warn!("⚠️ 题目 {} 已不在当前批次中，编辑未保存", record.key());
            }
        }
        self.print_progress();
        Ok(())
    }

    /// 读取一个编辑字段，返回 None 表示放弃编辑
    async fn read_edit_field(&self, label: &str, current: &str) -> Result<Option<String>> {
        let prompt = format!("{} [{}]: ", label, current);
        let Some(line) = self.read_line(&prompt).await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line == CANCEL_INPUT {
            return Ok(None);
        }
        if line.is_empty() {
            return Ok(Some(current.to_string()));
        }
        Ok(Some(line.to_string()))
    }

    async fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let mut input = self.input.lock().await;
        Ok(input.next_line().await?)
    }

    fn record_at(&self, n: usize) -> Option<ProblemRecord> {
        let records = self.session.records();
        let record = n.checked_sub(1).and_then(|i| records.get(i)).cloned();
        if record.is_none() {
            println!("序号 {} 超出范围 (共 {} 道题目)", n, records.len());
        }
        record
    }

    // ========== 输出辅助方法 ==========

    fn print_batch(&self) {
        let state = self.session.snapshot();
        if state.records.is_empty() {
            println!("准备开始：输入 reload 获取新的一批题目");
            return;
        }

        println!("\n{}", "=".repeat(60));
        for (i, record) in state.records.iter().enumerate() {
            println!(
                "{:>2}. {} [{}] {}",
                i + 1,
                record.key(),
                record.status,
                truncate_text(&self.renderer.render(record.content()), 40)
            );
        }
        println!("{}", "=".repeat(60));
        self.print_progress();
    }

    fn print_record(&self, n: usize, record: &ProblemRecord) {
        println!("\n{}", "─".repeat(60));
        println!("{}. {} [{}]", n, record.key(), record.status);
        if let Some(image) = &record.image_ref {
            println!("图片: {}", image);
        }
        println!("{}", self.renderer.render(record.content()));
        println!("知识点: {}", format_tags(&record.knowledge_points));
        println!("方法:   {}", format_tags(&record.methods));
        println!("{}", "─".repeat(60));
    }

    fn print_progress(&self) {
        let state = self.session.snapshot();
        println!(
            "当前进度: {}/{} ({:.0}%)",
            state.completed_count(),
            state.records.len(),
            state.progress_percent()
        );
    }

    fn print_error(&self) {
        if let Some(message) = self.session.snapshot().last_error {
            println!("错误: {}", message);
        }
    }
}

/// 按配置创建后端：模拟后端或 HTTP
async fn build_api(config: &Config) -> Result<Arc<dyn ProblemApi>> {
    if !config.use_mock_api {
        return Ok(Arc::new(HttpProblemApi::new(config)?));
    }

    let mut api = MockProblemApi::new().with_key(config.api_key.clone());
    if let Some(path) = &config.mock_fixture_file {
        api = api.with_templates(load_problem_file(Path::new(path)).await?);
    }
    if let Some(latency) = config.mock_latency_ms {
        api = api.with_latency(Duration::from_millis(latency));
    }
    Ok(Arc::new(api))
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "（无）".to_string()
    } else {
        tags.join(" | ")
    }
}

fn print_help() {
    println!("命令:");
    println!("  list           查看本批题目");
    println!("  show N         查看第 N 题");
    println!("  v N            确认第 N 题无误");
    println!("  e N            编辑第 N 题的知识点和方法");
    println!("  r N            将第 N 题重置为待验证");
    println!("  submit         提交本次验证");
    println!("  reload         获取新题目（未提交的修改会丢失）");
    println!("  quit           退出");
}

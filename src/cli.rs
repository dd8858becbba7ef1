//! 命令行参数定义

use std::path::PathBuf;

use clap::Parser;

use crate::services::SelectionPolicy;
use crate::workflow::FlowOptions;

/// Canvas 测验助手：提取题目、获取答案、自动填写并提交
#[derive(Parser, Debug)]
#[command(name = "quiz_helper", version)]
#[command(about = "Extract Canvas quiz questions, fetch answers and optionally auto-fill them")]
pub struct Cli {
    /// 课程 ID
    #[arg(long = "course-id")]
    pub course_id: String,

    /// 测验 ID
    #[arg(long = "quiz-id")]
    pub quiz_id: String,

    /// 配置文件路径（默认读取当前目录下的 quiz_helper.toml）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 从保存的 HTML 文件提取题目，不打开浏览器
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// 以 JSON 输出面板
    #[arg(long)]
    pub json: bool,

    /// 只提取题目，不取答案
    #[arg(long)]
    pub no_answers: bool,

    /// 不自动填写
    #[arg(long)]
    pub no_fill: bool,

    /// 填写后不提交
    #[arg(long)]
    pub no_submit: bool,

    /// 忽略答案，每题选第一个选项
    #[arg(long)]
    pub first_option: bool,

    /// 覆盖答案服务地址
    #[arg(long)]
    pub endpoint: Option<String>,

    /// 显示详细日志
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    pub fn flow_options(&self) -> FlowOptions {
        // 离线页面只读
        let offline = self.html.is_some();
        FlowOptions {
            fetch_answers: !self.no_answers,
            fill: !self.no_fill && !offline,
            submit: !self.no_submit && !offline,
            policy: if self.first_option {
                SelectionPolicy::FirstAvailable
            } else {
                SelectionPolicy::Supplied
            },
            json: self.json,
        }
    }
}

//! 程序配置
//!
//! 三层叠加：默认值 → TOML 配置文件（可选）→ 环境变量（含 `.env`）。
//! 命令行参数在 main 里最后覆盖。

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::Markers;

/// 没有指定 `--config` 时尝试读取的文件
pub const DEFAULT_CONFIG_FILE: &str = "quiz_helper.toml";

/// 取答案的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerBackend {
    /// 走答案服务（`POST answer_endpoint_url`）
    #[default]
    Http,
    /// 直接调用 LLM
    Llm,
}

impl FromStr for AnswerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(AnswerBackend::Http),
            "llm" => Ok(AnswerBackend::Llm),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- Canvas 登录 ---
    pub canvas_url: String,
    pub canvas_username: String,
    pub canvas_password: String,
    // --- 答案服务 ---
    /// 答案服务地址
    pub answer_endpoint_url: String,
    /// 单次请求超时（秒）
    pub answer_timeout_secs: u64,
    /// 同时在途的请求数
    pub answer_concurrency: usize,
    pub answer_backend: AnswerBackend,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 浏览器 ---
    /// 设置后连接已打开的浏览器，否则启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 无头浏览器的可执行文件路径，不设置则自动查找
    pub chrome_executable: Option<String>,
    /// 等待页面元素的超时（毫秒）
    pub wait_timeout_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 页面结构标记
    pub markers: Markers,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_url: String::new(),
            canvas_username: String::new(),
            canvas_password: String::new(),
            answer_endpoint_url: "http://localhost:3001/getAnswer".to_string(),
            answer_timeout_secs: 30,
            answer_concurrency: 1,
            answer_backend: AnswerBackend::Http,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            wait_timeout_ms: 10_000,
            verbose_logging: false,
            markers: Markers::default(),
        }
    }
}

/// Canvas 登录凭据
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasCredentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

fn parse_var<T: FromStr>(name: &str, value: String, expected: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: name.to_string(),
            value,
            expected_type: expected.to_string(),
        })
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 完整加载：配置文件（如有）+ 环境变量
    ///
    /// # 参数
    /// - `path`: `--config` 指定的文件；为 None 时尝试当前目录下的 `quiz_helper.toml`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 读取 TOML 配置文件，缺省字段取默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("读取配置文件: {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: origin.to_string(),
            source,
        })
    }

    /// 用环境变量覆盖已有的值
    ///
    /// `lookup` 按变量名取值，方便测试时不碰进程环境。
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("CANVAS_URL") {
            self.canvas_url = v;
        }
        if let Some(v) = lookup("CANVAS_USERNAME") {
            self.canvas_username = v;
        }
        if let Some(v) = lookup("CANVAS_PASSWORD") {
            self.canvas_password = v;
        }
        if let Some(v) = lookup("ANSWER_ENDPOINT_URL") {
            self.answer_endpoint_url = v;
        }
        if let Some(v) = lookup("ANSWER_TIMEOUT_SECS") {
            self.answer_timeout_secs = parse_var("ANSWER_TIMEOUT_SECS", v, "u64")?;
        }
        if let Some(v) = lookup("ANSWER_CONCURRENCY") {
            self.answer_concurrency = parse_var("ANSWER_CONCURRENCY", v, "usize")?;
        }
        if let Some(v) = lookup("ANSWER_BACKEND") {
            self.answer_backend = v.parse()?;
        }
        if let Some(v) = lookup("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = lookup("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = Some(parse_var("BROWSER_DEBUG_PORT", v, "u16")?);
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("WAIT_TIMEOUT_MS") {
            self.wait_timeout_ms = parse_var("WAIT_TIMEOUT_MS", v, "u64")?;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", v, "bool")?;
        }
        Ok(())
    }

    /// 登录需要的三个值，缺哪个报哪个
    pub fn credentials(&self) -> Result<CanvasCredentials, ConfigError> {
        let missing: Vec<String> = [
            ("CANVAS_URL", &self.canvas_url),
            ("CANVAS_USERNAME", &self.canvas_username),
            ("CANVAS_PASSWORD", &self.canvas_password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials { missing });
        }

        Ok(CanvasCredentials {
            base_url: self.canvas_url.trim_end_matches('/').to_string(),
            username: self.canvas_username.clone(),
            password: self.canvas_password.clone(),
        })
    }
}

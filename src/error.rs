use thiserror::Error;

/// 应用程序错误类型
///
/// 只有"致命"错误会走到这里：浏览器、登录、配置、自动填写。
/// 单道题的取答案失败是数据（`AnswerOutcome`），不是错误。
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 登录 / 会话错误
    #[error("登录错误: {0}")]
    Auth(#[from] AuthError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 自动填写错误
    #[error("自动填写错误: {0}")]
    Fill(#[from] FillError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {message}")]
    LaunchFailed { message: String },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面上的节点已失效（页面刷新或节点被移除）
    #[error("页面节点 #{node} 已不存在")]
    StaleNode { node: u64 },
    /// 等待元素超时
    #[error("等待元素 {selector} 超时 ({timeout_ms} ms)")]
    WaitTimeout { selector: String, timeout_ms: u64 },
    /// 选择器无法解析
    #[error("无效的选择器: {selector}")]
    InvalidSelector { selector: String },
}

/// 登录 / 会话错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 找不到登录表单
    #[error("未找到登录表单: {selector}")]
    LoginFormMissing { selector: String },
    /// 登录后仍停留在登录页
    #[error("登录失败，请检查用户名和密码 (当前页面: {url})")]
    Rejected { url: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少登录所需的环境变量
    #[error("缺少环境变量: {}，请设置 CANVAS_URL、CANVAS_USERNAME 和 CANVAS_PASSWORD", .missing.join(", "))]
    MissingCredentials { missing: Vec<String> },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 未知的答案后端
    #[error("未知的答案后端: {0} (可选: http, llm)")]
    UnknownBackend(String),
}

/// 自动填写错误
///
/// 任何一个都会终止本次填写，不会继续处理后面的题目。
#[derive(Debug, Error)]
pub enum FillError {
    /// 选择题没有选项
    #[error("第 {question} 题 (选择题) 没有可用选项")]
    NoOptions { question: usize },
    /// 连线题没有配对
    #[error("第 {question} 题 (连线题) 没有可用配对")]
    NoMatchingPairs { question: usize },
    /// 题目没有关联的页面元素
    #[error("第 {question} 题没有关联的页面元素")]
    MissingSource { question: usize },
    /// 找不到控件
    #[error("第 {question} 题找不到控件: {control}")]
    MissingControl { question: usize, control: String },
    /// 无法获取控件位置
    #[error("第 {question} 题无法获取控件位置: {control}")]
    MissingPosition { question: usize, control: String },
    /// 下拉框中没有对应选项
    #[error("第 {question} 题的下拉框中没有选项 '{answer}'")]
    OptionNotFound { question: usize, answer: String },
    /// 找不到提交按钮
    #[error("找不到提交按钮: {selector}")]
    MissingSubmit { selector: String },
    /// 页面操作失败
    #[error(transparent)]
    Page(#[from] anyhow::Error),
}

// ========== 便捷构造函数 ==========

impl BrowserError {
    /// 创建浏览器连接错误
    pub fn connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        }
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        }
    }
}

impl FillError {
    /// 创建"找不到控件"错误
    pub fn missing_control(question: usize, control: impl Into<String>) -> Self {
        FillError::MissingControl {
            question,
            control: control.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

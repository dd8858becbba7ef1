//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use anyhow::{Context, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::trace;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() / call() 能力
/// - 不认识 Question / 测验
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（鼠标事件等 CDP 命令要直接用）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 表达式并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let js_code = js_code.into();
        trace!("执行脚本: {}", js_code);
        let result = self
            .page
            .evaluate(js_code)
            .await
            .context("页面脚本执行失败")?;
        let json_value = result.into_value().context("页面脚本没有返回值")?;
        Ok(json_value)
    }

    /// 调用一个 JS 函数，参数以 JSON 形式传入
    ///
    /// `function` 形如 `(args) => { ... }`，参数经过 `serde_json` 序列化，
    /// 不需要手动转义选择器里的引号。
    pub async fn call<T: DeserializeOwned>(&self, function: &str, args: &JsonValue) -> Result<T> {
        let js_code = format!("({})({})", function, serde_json::to_string(args)?);
        let json_value = self.eval(js_code).await?;
        let typed_value =
            serde_json::from_value(json_value).context("页面脚本返回值格式不符合预期")?;
        Ok(typed_value)
    }
}

//! Canvas 会话
//!
//! 负责浏览器的生命周期：打开、登录、进入测验、关闭。
//! 页面交互本身交给 `ChromePage`。

use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use tracing::{debug, info, warn};

use crate::browser::{connect_to_browser_and_page, launch_headless_browser};
use crate::config::{CanvasCredentials, Config};
use crate::error::{AppResult, AuthError, BrowserError};
use crate::infrastructure::{ChromePage, JsExecutor, QuizPage};

const USERNAME_INPUT: &str = "input[name=\"pseudonym_session[unique_id]\"]";
const PASSWORD_INPUT: &str = "input[name=\"pseudonym_session[password]\"]";
const LOGIN_SUBMIT: &str = "button[type=\"submit\"]";

/// 测验页面地址
pub fn quiz_url(base_url: &str, course_id: &str, quiz_id: &str) -> String {
    format!(
        "{}/courses/{}/quizzes/{}/take",
        base_url.trim_end_matches('/'),
        course_id,
        quiz_id
    )
}

/// Canvas 会话
pub struct CanvasSession {
    browser: Browser,
    page: Page,
    /// 是否是本程序启动的浏览器（连接来的浏览器不关闭）
    launched: bool,
    wait_timeout: Duration,
}

impl CanvasSession {
    /// 打开浏览器
    ///
    /// 配置了 `browser_debug_port` 时连接已有浏览器，否则启动无头浏览器。
    pub async fn open(config: &Config) -> Result<Self> {
        let wait_timeout = Duration::from_millis(config.wait_timeout_ms);

        let (browser, page, launched) = match config.browser_debug_port {
            Some(port) => {
                let (browser, page) =
                    connect_to_browser_and_page(port, None, Some("/quizzes/")).await?;
                (browser, page, false)
            }
            None => {
                let (browser, page) =
                    launch_headless_browser("about:blank", config.chrome_executable.as_deref())
                        .await?;
                (browser, page, true)
            }
        };

        Ok(Self {
            browser,
            page,
            launched,
            wait_timeout,
        })
    }

    /// 是否是本程序启动的浏览器
    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// 用于提取和填写的页面
    pub fn quiz_page(&self) -> ChromePage {
        ChromePage::new(JsExecutor::new(self.page.clone()))
    }

    async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::navigation_failed(url, e))?;
        Ok(())
    }

    /// 登录 Canvas
    ///
    /// 登录后仍停留在 `/login` 视为用户名或密码错误。
    pub async fn login(&self, credentials: &CanvasCredentials) -> AppResult<()> {
        let login_url = format!("{}/login", credentials.base_url);
        info!("🔐 正在登录 Canvas: {}", credentials.base_url);
        self.goto(&login_url).await?;

        let page = self.quiz_page();
        if let Err(e) = page.wait_for(USERNAME_INPUT, self.wait_timeout).await {
            debug!("等待登录表单失败: {}", e);
            return Err(AuthError::LoginFormMissing {
                selector: USERNAME_INPUT.to_string(),
            }
            .into());
        }

        self.type_into(USERNAME_INPUT, &credentials.username).await?;
        self.type_into(PASSWORD_INPUT, &credentials.password).await?;

        self.page
            .find_element(LOGIN_SUBMIT)
            .await
            .map_err(BrowserError::from)?
            .click()
            .await
            .map_err(BrowserError::from)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(BrowserError::from)?;

        let current = self
            .page
            .url()
            .await
            .map_err(BrowserError::from)?
            .unwrap_or_default();
        if current.contains("/login") {
            return Err(AuthError::Rejected { url: current }.into());
        }

        info!("✅ 登录成功");
        Ok(())
    }

    async fn type_into(&self, selector: &str, text: &str) -> AppResult<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(BrowserError::from)?
            .click()
            .await
            .map_err(BrowserError::from)?
            .type_str(text)
            .await
            .map_err(BrowserError::from)?;
        Ok(())
    }

    /// 进入测验页面并等待题目出现
    pub async fn navigate_to_quiz(
        &self,
        base_url: &str,
        course_id: &str,
        quiz_id: &str,
        question_marker: &str,
    ) -> Result<()> {
        let url = quiz_url(base_url, course_id, quiz_id);
        info!("📄 打开测验: {}", url);
        self.goto(&url).await?;

        self.quiz_page()
            .wait_for(question_marker, self.wait_timeout)
            .await
            .with_context(|| format!("测验页面上没有找到题目: {}", url))?;
        Ok(())
    }

    /// 关闭会话；连接来的浏览器只断开，不关闭
    pub async fn close(mut self) -> Result<()> {
        if !self.launched {
            debug!("断开浏览器连接");
            return Ok(());
        }
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
            return Ok(());
        }
        let _ = self.browser.wait().await;
        debug!("浏览器已关闭");
        Ok(())
    }
}

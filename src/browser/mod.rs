//! 浏览器会话（外部协作者）
//!
//! 启动或连接浏览器、登录 Canvas、打开测验页面。

pub mod canvas;
pub mod connection;
pub mod headless;

pub use canvas::{quiz_url, CanvasSession};
pub use connection::connect_to_browser_and_page;
pub use headless::launch_headless_browser;

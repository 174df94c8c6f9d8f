//! 浏览器环境小工具。

/// 把 panic 信息转发到浏览器控制台（带可读堆栈）。
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}

/// 输出一行日志到浏览器控制台。
pub fn console_log(message: &str) {
    web_sys::console::log_1(&message.into());
}

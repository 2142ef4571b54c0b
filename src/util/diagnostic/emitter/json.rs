//! JSON 渲染器
//!
//! 输出一个数组，每个文件一项：
//!
//! ```json
//! [{"file": "main.json", "bindings": {"x": "Number"}, "errors": [...]}]
//! ```

use crate::util::diagnostic::FileReport;

pub struct JsonEmitter;

impl JsonEmitter {
    /// 渲染所有文件的结果
    pub fn render_all(reports: &[FileReport]) -> String {
        serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
    }
}

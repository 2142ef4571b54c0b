//! 文本渲染器
//!
//! ```text
//! add: Function([Number, Number], Number)
//! error[UndefinedIdentifier] 40-43: Undefined identifier: foo
//! ```

use owo_colors::OwoColorize;

use crate::frontend::typecheck::ErrorReport;
use crate::util::diagnostic::FileReport;

/// 渲染器配置
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// 是否启用颜色输出
    pub use_colors: bool,
    /// 是否输出绑定
    pub show_bindings: bool,
    /// 是否在每个文件前输出文件名
    pub show_file: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_bindings: true,
            show_file: false,
        }
    }
}

/// 文本渲染器
#[derive(Debug, Clone, Default)]
pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义配置创建渲染器
    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// 渲染一个文件的结果
    pub fn render(
        &self,
        report: &FileReport,
    ) -> String {
        let mut output = String::new();
        if self.config.show_file {
            let header = format!("==> {}", report.file.display());
            output.push_str(&self.bold(&header));
            output.push('\n');
        }
        if self.config.show_bindings {
            for (name, ty) in &report.bindings {
                output.push_str(&format!("{}: {}\n", self.bold(name), ty));
            }
        }
        for error in &report.errors {
            output.push_str(&self.render_error(error));
            output.push('\n');
        }
        output
    }

    /// `error[Kind] start-end: message`
    pub fn render_error(
        &self,
        error: &ErrorReport,
    ) -> String {
        let head = format!("error[{}]", error.kind);
        let head = if self.config.use_colors {
            head.red().bold().to_string()
        } else {
            head
        };
        format!(
            "{} {}-{}: {}",
            head, error.span.start, error.span.end, error.message
        )
    }

    fn bold(
        &self,
        text: &str,
    ) -> String {
        if self.config.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

//! 模块路径解析器
//!
//! 将 `require` 的参数（如 "./util"、"../lib/math"）解析为文件系统路径。
//!
//! # 搜索顺序
//!
//! 1. 原样路径（已带扩展名时）
//! 2. 依次追加配置的扩展名：`x.json`、`x.js.json`
//!
//! 相对路径以导入方文件所在目录为基准；没有导入方时以根目录为基准。

use std::path::{Component, Path, PathBuf};

use super::ModuleError;

/// 模块路径解析器
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// 没有导入方时的基准目录
    root: PathBuf,
    /// 追加的扩展名（不带点）
    extensions: Vec<String>,
}

impl ModuleResolver {
    pub fn new(
        root: PathBuf,
        extensions: Vec<String>,
    ) -> Self {
        Self { root, extensions }
    }

    /// 是否是相对或绝对路径
    pub fn is_path_specifier(specifier: &str) -> bool {
        specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier.starts_with('/')
    }

    /// 解析模块路径
    ///
    /// # 示例
    ///
    /// - "./util"（导入方 /p/main.json）-> /p/util.json 或 /p/util.js.json
    /// - "lodash" -> InvalidPath
    pub fn resolve(
        &self,
        specifier: &str,
        importer: Option<&Path>,
    ) -> Result<PathBuf, ModuleError> {
        let candidates = self.candidates(specifier, importer)?;
        candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| ModuleError::NotFound {
                path: specifier.to_string(),
                searched_paths: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            })
    }

    /// 按搜索顺序列出候选路径
    pub fn candidates(
        &self,
        specifier: &str,
        importer: Option<&Path>,
    ) -> Result<Vec<PathBuf>, ModuleError> {
        if !Self::is_path_specifier(specifier) {
            return Err(ModuleError::InvalidPath {
                path: specifier.to_string(),
            });
        }

        let base = importer
            .and_then(Path::parent)
            .unwrap_or(self.root.as_path());
        let target = normalize(&base.join(specifier));

        let mut paths = Vec::with_capacity(self.extensions.len() + 1);
        if target.extension().is_some() {
            paths.push(target.clone());
        }
        for ext in &self.extensions {
            let mut name = target.clone().into_os_string();
            name.push(".");
            name.push(ext);
            paths.push(PathBuf::from(name));
        }
        Ok(paths)
    }
}

/// 去掉路径中的 `.` 和 `..`（不访问文件系统）
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

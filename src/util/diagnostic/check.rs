//! Check command implementation
//!
//! Provides the `tinfer check` command with support for:
//! - Multiple files and directories (checked in parallel)
//! - Text or JSON output

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::frontend::module::FsModuleLoader;
use crate::frontend::typecheck::ErrorReport;
use crate::frontend::Checker;
use crate::util::config::Config;

/// ESTree 文件的扩展名
const SOURCE_EXTENSION: &str = "json";

/// 一个文件的检查结果
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    /// 程序顶层绑定及其打印后的类型
    pub bindings: IndexMap<String, String>,
    pub errors: Vec<ErrorReport>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// 检查单个 ESTree JSON 文件
///
/// 相对 `require` 以文件所在目录为基准解析。
pub fn check_file(
    file: &Path,
    config: &Config,
) -> Result<FileReport> {
    let program = FsModuleLoader::read_program(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let path = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let key = path.display().to_string();

    let loader = FsModuleLoader::new(root, config.modules.extensions.clone());
    let mut checker = Checker::new(config.check.clone()).with_loader(loader);
    tracing::debug!("checking {}", key);

    let report = match checker.check_unit(&program, &key) {
        Ok(inference) => FileReport {
            file: file.to_path_buf(),
            bindings: inference
                .program_bindings()
                .iter()
                .map(|(name, ty)| (name.clone(), ty.to_string()))
                .collect(),
            errors: inference.errors.iter().map(|e| e.report()).collect(),
        },
        // 遇错即停或致命错误：只报告这一个错误
        Err(err) => FileReport {
            file: file.to_path_buf(),
            bindings: IndexMap::new(),
            errors: vec![err.report()],
        },
    };
    Ok(report)
}

/// 检查多个路径（文件或目录），结果按文件路径排序
pub fn check_paths(
    paths: &[PathBuf],
    config: &Config,
) -> Result<Vec<FileReport>> {
    let files = collect_source_files(paths)?;
    tracing::debug!("checking {} file(s)", files.len());
    files
        .par_iter()
        .map(|file| check_file(file, config))
        .collect()
}

/// Collect all ESTree JSON files from the given paths
///
/// 显式给出的文件不看扩展名；目录中只收集 `.json` 文件。
pub fn collect_source_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(anyhow::anyhow!("Path does not exist: {}", path.display()));
        }

        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in {}", path.display())
                })?;
                if entry.file_type().is_file()
                    && entry.path().extension().and_then(|s| s.to_str()) == Some(SOURCE_EXTENSION)
                {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EMPTY_PROGRAM: &str = r#"{"type":"Program","body":[],"start":0,"end":0}"#;

    /// `var x = 1;`
    const NUMBER_PROGRAM: &str = r#"{
        "type": "Program", "start": 0, "end": 10,
        "body": [{
            "type": "VariableDeclaration", "kind": "var", "start": 0, "end": 10,
            "declarations": [{
                "type": "VariableDeclarator", "start": 4, "end": 9,
                "id": {"type": "Identifier", "name": "x", "start": 4, "end": 5},
                "init": {"type": "Literal", "value": 1, "raw": "1", "start": 8, "end": 9}
            }]
        }]
    }"#;

    /// `y;`
    const UNDEFINED_PROGRAM: &str = r#"{
        "type": "Program", "start": 0, "end": 2,
        "body": [{
            "type": "ExpressionStatement", "start": 0, "end": 2,
            "expression": {"type": "Identifier", "name": "y", "start": 0, "end": 1}
        }]
    }"#;

    #[test]
    fn test_collect_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("main.estree");
        fs::write(&file_path, EMPTY_PROGRAM).unwrap();

        let files = collect_source_files(&[file_path.clone()]).unwrap();
        assert_eq!(files, vec![file_path]);
    }

    #[test]
    fn test_collect_directory() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("lib");
        fs::create_dir(&subdir).unwrap();
        fs::write(temp_dir.path().join("a.json"), EMPTY_PROGRAM).unwrap();
        fs::write(subdir.join("b.json"), EMPTY_PROGRAM).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a program").unwrap();

        let files = collect_source_files(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_missing_path() {
        let result = collect_source_files(&[PathBuf::from("/definitely/not/here")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("main.json");
        fs::write(&file_path, NUMBER_PROGRAM).unwrap();

        let report = check_file(&file_path, &Config::default()).unwrap();
        assert!(!report.has_errors());
        assert_eq!(report.bindings.get("x").map(String::as_str), Some("Number"));
    }

    #[test]
    fn test_check_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("main.json");
        fs::write(&file_path, UNDEFINED_PROGRAM).unwrap();

        let report = check_file(&file_path, &Config::default()).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, "UndefinedIdentifier");
    }

    #[test]
    fn test_check_paths_in_parallel() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json"), NUMBER_PROGRAM).unwrap();
        fs::write(temp_dir.path().join("b.json"), UNDEFINED_PROGRAM).unwrap();

        let reports = check_paths(&[temp_dir.path().to_path_buf()], &Config::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].has_errors());
        assert!(reports[1].has_errors());
    }
}

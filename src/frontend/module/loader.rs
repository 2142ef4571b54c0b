//! 模块加载器
//!
//! - [`FsModuleLoader`]：从文件系统读取 ESTree JSON
//! - [`MemoryModuleLoader`]：名字到程序的映射，用于嵌入和测试

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::frontend::ast::{parse_program, Program};

use super::resolver::{normalize, ModuleResolver};
use super::{LoadedModule, ModuleError, ModuleLoader};

/// 文件系统加载器
#[derive(Debug, Clone)]
pub struct FsModuleLoader {
    resolver: ModuleResolver,
}

impl FsModuleLoader {
    /// `root` 是没有导入方时的基准目录
    pub fn new(
        root: impl Into<PathBuf>,
        extensions: Vec<String>,
    ) -> Self {
        Self {
            resolver: ModuleResolver::new(root.into(), extensions),
        }
    }

    /// 读取并解析一个文件
    pub fn read_program(path: &Path) -> Result<Program, ModuleError> {
        let source = std::fs::read_to_string(path).map_err(|source| ModuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_program(&source).map_err(|source| ModuleError::Parse {
            key: path.display().to_string(),
            source,
        })
    }
}

impl ModuleLoader for FsModuleLoader {
    fn load(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> Result<LoadedModule, ModuleError> {
        let path = self.resolver.resolve(specifier, importer.map(Path::new))?;
        // 同一文件的不同写法（`./a`、`../x/a`）共享缓存
        let path = path.canonicalize().unwrap_or(path);
        tracing::debug!("loading module {}", path.display());
        let program = Self::read_program(&path)?;
        Ok(LoadedModule {
            key: path.display().to_string(),
            program,
        })
    }
}

/// 内存加载器
///
/// 模块名形如 `main`、`lib/math`；`require("./math")` 相对导入方所在目录解析。
#[derive(Debug, Clone, Default)]
pub struct MemoryModuleLoader {
    modules: HashMap<String, Program>,
}

impl MemoryModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模块
    pub fn insert(
        &mut self,
        name: impl AsRef<str>,
        program: Program,
    ) {
        self.modules.insert(normalize_name(name.as_ref()), program);
    }

    /// 链式注册
    pub fn with_module(
        mut self,
        name: impl AsRef<str>,
        program: Program,
    ) -> Self {
        self.insert(name, program);
        self
    }

    /// 注册 ESTree JSON 文本
    pub fn insert_json(
        &mut self,
        name: impl AsRef<str>,
        json: &str,
    ) -> Result<(), ModuleError> {
        let name = name.as_ref();
        let program = parse_program(json).map_err(|source| ModuleError::Parse {
            key: name.to_string(),
            source,
        })?;
        self.insert(name, program);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for MemoryModuleLoader {
    fn load(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> Result<LoadedModule, ModuleError> {
        if !ModuleResolver::is_path_specifier(specifier) {
            return Err(ModuleError::InvalidPath {
                path: specifier.to_string(),
            });
        }
        let base = importer
            .map(Path::new)
            .and_then(Path::parent)
            .unwrap_or(Path::new(""));
        let key = normalize_name(&base.join(specifier).to_string_lossy());
        match self.modules.get(&key) {
            Some(program) => Ok(LoadedModule {
                key,
                program: program.clone(),
            }),
            None => Err(ModuleError::NotFound {
                path: specifier.to_string(),
                searched_paths: vec![key],
            }),
        }
    }
}

/// 统一模块名：去掉 `./`、折叠 `..`，使用 `/` 分隔
fn normalize_name(name: &str) -> String {
    let path = normalize(Path::new(name));
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            std::path::Component::RootDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();
    parts.join("/")
}

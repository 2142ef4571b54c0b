//! 作用域
//!
//! 作用域是一个帧栈：每一帧是一个名字到类型的有序表，查找从最内层开始。
//! 整个栈按值克隆，函数声明时捕获的快照不受后续修改影响。

use indexmap::IndexMap;

use crate::frontend::core::type_system::{ClosureMemo, Type, TypeVar};

/// 作用域
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    frames: Vec<IndexMap<String, Type>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// 只有一帧的空作用域
    pub fn new() -> Self {
        Self {
            frames: vec![IndexMap::new()],
        }
    }

    /// 以给定绑定作为最外层帧
    pub fn with_bindings(bindings: IndexMap<String, Type>) -> Self {
        Self {
            frames: vec![bindings],
        }
    }

    /// 在当前作用域之上压入一帧，`extra` 作为新帧的初始绑定
    pub fn child<I>(
        &self,
        extra: I,
    ) -> Self
    where
        I: IntoIterator<Item = (String, Type)>,
    {
        let mut frames = self.frames.clone();
        frames.push(extra.into_iter().collect());
        Self { frames }
    }

    /// 进入新帧
    pub fn enter(&mut self) {
        self.frames.push(IndexMap::new());
    }

    /// 退出当前帧（最外层帧保留）
    pub fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// 帧数
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// 查找绑定（从最内层开始）
    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// 只在最内层帧查找
    pub fn lookup_local(
        &self,
        name: &str,
    ) -> Option<&Type> {
        self.frames.last().and_then(|frame| frame.get(name))
    }

    /// 拥有该名字的帧的深度（1 为最外层）
    pub fn depth_of(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.frames
            .iter()
            .rposition(|frame| frame.contains_key(name))
            .map(|index| index + 1)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.lookup(name).is_some()
    }

    /// 在最内层帧绑定（遮蔽外层同名绑定）
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        ty: Type,
    ) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), ty);
        }
    }

    /// 改写拥有该名字的帧中的绑定；名字不存在时返回 false
    pub fn assign(
        &mut self,
        name: &str,
        ty: Type,
    ) -> bool {
        match self.frames.iter_mut().rev().find_map(|frame| frame.get_mut(name)) {
            Some(slot) => {
                *slot = ty;
                true
            }
            None => false,
        }
    }

    /// 把所有帧中自由出现的类型变量替换为 `replacement`（包括闭包捕获的环境）
    pub fn substitute(
        &mut self,
        var: TypeVar,
        replacement: &Type,
    ) {
        self.substitute_in(var, replacement, &mut ClosureMemo::new());
    }

    pub(crate) fn substitute_in(
        &mut self,
        var: TypeVar,
        replacement: &Type,
        memo: &mut ClosureMemo,
    ) {
        for frame in &mut self.frames {
            for ty in frame.values_mut() {
                if ty.mentions(var) {
                    *ty = ty.substitute_in(var, replacement, memo);
                }
            }
        }
    }

    /// 所有帧中的类型
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.frames.iter().flat_map(|frame| frame.values())
    }

    /// 自由出现的变量编号的上界（不含）；新函数从这里开始编号
    pub fn free_var_ceiling(&self) -> u32 {
        self.types().map(Type::free_var_ceiling).max().unwrap_or(0)
    }

    /// 最内层帧的绑定
    pub fn local_bindings(&self) -> &IndexMap<String, Type> {
        // 帧栈至少有一帧
        &self.frames[self.frames.len() - 1]
    }

    /// 所有可见绑定：外层在前，内层遮蔽外层
    pub fn visible_bindings(&self) -> IndexMap<String, Type> {
        let mut result = IndexMap::new();
        for frame in &self.frames {
            for (name, ty) in frame {
                result.insert(name.clone(), ty.clone());
            }
        }
        result
    }
}

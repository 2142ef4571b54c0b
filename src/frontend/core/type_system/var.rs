//! 类型变量定义
//!
//! 类型变量按函数推断过程递增编号，打印为 `a`、`b` … `z`、`a1`、`b1` …

use std::fmt;

/// 类型变量（用于类型推断）
///
/// 编号只在所属函数的推断过程中唯一，不同函数之间可以重复
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar(u32);

/// 占位变量从这里往上编号，`VarGen` 不会分配到这个区间
const RESERVED: u32 = u32::MAX - 0xFFFF;

impl TypeVar {
    /// 普通变量编号的上界（不含）
    pub const RESERVED: u32 = RESERVED;

    /// 创建新类型变量
    pub fn new(index: u32) -> Self {
        TypeVar(index)
    }

    /// 函数体内对自身名字的占位变量，按函数嵌套深度区分
    ///
    /// 不属于任何函数的编号区间，函数推断结束前总会被替换掉。
    pub fn placeholder(depth: usize) -> Self {
        let depth = u32::try_from(depth).unwrap_or(u32::MAX).min(u32::MAX - RESERVED - 1);
        TypeVar(u32::MAX - depth)
    }

    /// 是否是占位变量
    pub fn is_placeholder(&self) -> bool {
        self.0 > RESERVED
    }

    /// 获取变量的索引
    pub fn index(&self) -> u32 {
        self.0
    }

    /// 从打印形式解析类型变量（`a` → 0，`b1` → 27）
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let letter = chars.next().filter(|c| c.is_ascii_lowercase())?;
        let rest = chars.as_str();
        let round = if rest.is_empty() {
            0
        } else if rest.chars().all(|c| c.is_ascii_digit()) && !rest.starts_with('0') {
            rest.parse::<u32>().ok()?
        } else {
            return None;
        };
        let index = round.checked_mul(26)?.checked_add(letter as u32 - 'a' as u32)?;
        Some(TypeVar(index))
    }
}

impl fmt::Display for TypeVar {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let letter = (b'a' + (self.0 % 26) as u8) as char;
        match self.0 / 26 {
            0 => write!(f, "{}", letter),
            round => write!(f, "{}{}", letter, round),
        }
    }
}

/// 类型变量生成器
///
/// 从给定的基数开始递增；每个函数从它捕获的变量之后开始编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarGen {
    next: u32,
}

impl VarGen {
    /// 从指定基数开始
    pub fn starting_at(base: u32) -> Self {
        Self { next: base }
    }

    /// 分配一个新变量
    pub fn fresh(&mut self) -> TypeVar {
        let var = TypeVar(self.next);
        self.next += 1;
        var
    }

    /// 下一个将要分配的编号
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// 前移到至少 `next`（调用点实例化后同步计数）
    pub fn advance_to(
        &mut self,
        next: u32,
    ) {
        self.next = self.next.max(next);
    }
}

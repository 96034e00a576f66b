//! 过滤谓词

use crate::common::HtyError;
use crate::field_type::Cell;

/// `==` / `!=` 的绝对容差
pub const EQ_TOLERANCE: f64 = 1e-6;

/// 比较运算符，编码 0..=5 与文件工具的约定一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn code(self) -> i32 {
        match self {
            Self::Gt => 0,
            Self::Ge => 1,
            Self::Lt => 2,
            Self::Le => 3,
            Self::Eq => 4,
            Self::Ne => 5,
        }
    }

    /// 对一个 Cell 求值；`FloatBits` 先重解释为 f32，`Int` 按数值转为 f32
    pub fn matches(self, cell: Cell, threshold: f32) -> bool {
        let v = cell.as_f32();
        match self {
            Self::Gt => v > threshold,
            Self::Ge => v >= threshold,
            Self::Lt => v < threshold,
            Self::Le => v <= threshold,
            Self::Eq => f64::from((v - threshold).abs()) < EQ_TOLERANCE,
            Self::Ne => f64::from((v - threshold).abs()) >= EQ_TOLERANCE,
        }
    }
}

impl TryFrom<i32> for CompareOp {
    type Error = HtyError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Gt),
            1 => Ok(Self::Ge),
            2 => Ok(Self::Lt),
            3 => Ok(Self::Le),
            4 => Ok(Self::Eq),
            5 => Ok(Self::Ne),
            _ => Err(HtyError::InvalidOperator(code)),
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ne => "!=",
        };
        f.write_str(s)
    }
}

//! 候选地址处理上下文
//!
//! 封装"我正在处理第几个周边地址"这一信息

use std::fmt::Display;

use crate::utils::logging::truncate_text;

/// 候选地址处理上下文
#[derive(Debug, Clone)]
pub struct CandidateCtx {
    /// 候选地址（缓冲区结果里显示的文本）
    pub address: String,

    /// 候选序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 候选总数
    pub total: usize,
}

impl CandidateCtx {
    /// 创建新的候选上下文
    pub fn new(address: impl Into<String>, index: usize, total: usize) -> Self {
        Self {
            address: address.into(),
            index,
            total,
        }
    }
}

impl Display for CandidateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[候选 {}/{} {}]",
            self.index,
            self.total,
            truncate_text(&self.address, 40)
        )
    }
}

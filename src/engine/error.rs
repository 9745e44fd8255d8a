// ==========================================
// 卫星过境排程系统 - 引擎层错误类型
// ==========================================
// 校验不通过、找不到时段都是正常结果，不在此列
// ==========================================

use crate::domain::types::PassId;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("仓储错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("排程索引锁已失效: {0}")]
    LockPoisoned(String),

    #[error("过境不存在: pass_id={0}")]
    PassNotFound(PassId),
}

pub type EngineResult<T> = Result<T, EngineError>;

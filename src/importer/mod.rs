// ==========================================
// 卫星过境排程系统 - 导入层
// ==========================================
// 职责: 读取外部计算出的候选过境
// 红线: 只做解析，不做冲突校验（交给引擎）
// ==========================================

pub mod error;
pub mod pass_csv;

pub use error::{ImportError, ImportResult};
pub use pass_csv::{parse_utc_timestamp, PassCsvParser};

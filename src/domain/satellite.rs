// ==========================================
// 卫星过境排程系统 - 卫星目录模型
// ==========================================

use crate::domain::types::NoradId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satellite {
    pub norad_id: NoradId,           // NORAD 编号
    pub name: String,                // 名称
    pub description: Option<String>, // 描述
}

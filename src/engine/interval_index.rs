// ==========================================
// 卫星过境排程系统 - 区间索引
// ==========================================
// 职责: 内存中维护全部已登记过境，回答“哪些过境与区间 R 重叠”
// 结构: 按 (start, id) 排序的数组 + 结束时间前缀最大值
// 红线: 查询结果必须与全量线性扫描一致，顺序为 start 升序、id 升序
// ==========================================

use crate::domain::pass::{PassSchedule, TimeWindow};
use crate::domain::types::{PassId, PassStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    // 按 (start_time, pass_id) 升序
    entries: Vec<PassSchedule>,
    // prefix_max_end[i] = max(entries[0..=i].end_time)
    prefix_max_end: Vec<DateTime<Utc>>,
    // pass_id -> start_time，用于定位
    starts: HashMap<PassId, DateTime<Utc>>,
}

impl IntervalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从过境列表批量构建
    pub fn from_passes(passes: Vec<PassSchedule>) -> Self {
        // 同一ID出现多次时只保留第一条
        let mut seen = HashSet::new();
        let mut entries: Vec<PassSchedule> = passes
            .into_iter()
            .filter(|p| seen.insert(p.pass_id))
            .collect();
        entries.sort_by(|a, b| (a.start_time, a.pass_id).cmp(&(b.start_time, b.pass_id)));

        let mut index = Self {
            starts: entries.iter().map(|p| (p.pass_id, p.start_time)).collect(),
            entries,
            prefix_max_end: Vec::new(),
        };
        index.rebuild_prefix_from(0);
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pass_id: PassId) -> bool {
        self.starts.contains_key(&pass_id)
    }

    /// 按 (start, id) 顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &PassSchedule> {
        self.entries.iter()
    }

    pub fn get(&self, pass_id: PassId) -> Option<&PassSchedule> {
        let pos = self.position_of(pass_id)?;
        self.entries.get(pos)
    }

    /// 插入过境；同ID已存在时先移除旧记录
    pub fn insert(&mut self, pass: PassSchedule) {
        self.remove(pass.pass_id);

        let key = (pass.start_time, pass.pass_id);
        let pos = self
            .entries
            .partition_point(|e| (e.start_time, e.pass_id) < key);
        self.starts.insert(pass.pass_id, pass.start_time);
        self.entries.insert(pos, pass);
        self.prefix_max_end.insert(pos, DateTime::<Utc>::MIN_UTC);
        self.rebuild_prefix_from(pos);
    }

    /// 移除过境，返回被移除的记录
    pub fn remove(&mut self, pass_id: PassId) -> Option<PassSchedule> {
        let pos = self.position_of(pass_id)?;
        self.starts.remove(&pass_id);
        self.prefix_max_end.remove(pos);
        let removed = self.entries.remove(pos);
        self.rebuild_prefix_from(pos);
        Some(removed)
    }

    /// 更新时间窗口，返回更新后的记录
    pub fn update(&mut self, pass_id: PassId, window: TimeWindow) -> Option<&PassSchedule> {
        let mut pass = self.remove(pass_id)?;
        pass.start_time = window.start;
        pass.end_time = window.end;
        self.insert(pass);
        self.get(pass_id)
    }

    /// 更新状态（不影响排序）
    pub fn set_status(&mut self, pass_id: PassId, status: PassStatus) -> Option<&PassSchedule> {
        let pos = self.position_of(pass_id)?;
        let entry = self.entries.get_mut(pos)?;
        entry.status = status;
        Some(entry)
    }

    /// 查询与 `window` 两端各扩展 `buffer` 后重叠的过境
    ///
    /// 半开区间判定: `s1 < e2 && s2 < e1`。
    /// `exclude` 用于重新校验已存在过境时排除其自身。
    pub fn overlapping(
        &self,
        window: &TimeWindow,
        buffer: Duration,
        exclude: Option<PassId>,
    ) -> Vec<PassSchedule> {
        let query = window.widened(buffer);

        // start < query.end 的条目都在 [0, upper) 内
        let upper = self.entries.partition_point(|e| e.start_time < query.end);

        let mut hits = Vec::new();
        for i in (0..upper).rev() {
            // 之前所有条目的 end 都不超过 query.start，不可能再命中
            if self.prefix_max_end[i] <= query.start {
                break;
            }
            let entry = &self.entries[i];
            if entry.end_time > query.start && Some(entry.pass_id) != exclude {
                hits.push(entry.clone());
            }
        }
        hits.reverse();
        hits
    }

    fn position_of(&self, pass_id: PassId) -> Option<usize> {
        let start = *self.starts.get(&pass_id)?;
        let key = (start, pass_id);
        self.entries
            .binary_search_by(|e| (e.start_time, e.pass_id).cmp(&key))
            .ok()
    }

    fn rebuild_prefix_from(&mut self, from: usize) {
        self.prefix_max_end.resize(self.entries.len(), DateTime::<Utc>::MIN_UTC);
        let mut running = if from == 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            self.prefix_max_end[from - 1]
        };
        for i in from..self.entries.len() {
            running = running.max(self.entries[i].end_time);
            self.prefix_max_end[i] = running;
        }
    }
}

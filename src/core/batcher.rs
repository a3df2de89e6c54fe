use crate::core::{Batch, ProjectedRecord};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// 依到達順序把記錄分組成固定大小的批次
#[derive(Debug)]
pub struct Batcher {
    batch_size: usize,
    current: Vec<ProjectedRecord>,
}

impl Batcher {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            current: Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 累積到 `batch_size` 筆時封存並回傳一個完整批次
    pub fn push(&mut self, record: ProjectedRecord) -> Option<Batch> {
        self.current.push(record);
        if self.current.len() >= self.batch_size {
            return Some(self.seal());
        }
        None
    }

    /// 串流結束時封存剩餘的記錄；沒有剩餘時不產生空批次
    pub fn flush(&mut self) -> Option<Batch> {
        if self.current.is_empty() {
            return None;
        }
        Some(self.seal())
    }

    pub fn pending(&self) -> usize {
        self.current.len()
    }

    fn seal(&mut self) -> Batch {
        let records = std::mem::replace(
            &mut self.current,
            Vec::with_capacity(self.batch_size.min(DEFAULT_BATCH_SIZE)),
        );
        Batch { records }
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(i: usize) -> ProjectedRecord {
        let mut record = ProjectedRecord::new();
        record.insert("n", i.to_string());
        record
    }

    #[test]
    fn test_full_batches_are_emitted_on_push() {
        let mut batcher = Batcher::new(3);
        let mut emitted = Vec::new();

        for i in 0..7 {
            if let Some(batch) = batcher.push(numbered(i)) {
                emitted.push(batch);
            }
        }
        assert_eq!(emitted.len(), 2);
        assert!(emitted.iter().all(|b| b.len() == 3));
        assert_eq!(batcher.pending(), 1);

        let last = batcher.flush().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last.records[0].get("n"), Some("6"));
    }

    #[test]
    fn test_flush_on_empty_emits_nothing() {
        let mut batcher = Batcher::new(2);
        assert!(batcher.flush().is_none());

        batcher.push(numbered(0));
        batcher.push(numbered(1));
        assert!(batcher.flush().is_none());
    }

    #[test]
    fn test_order_is_preserved_across_batches() {
        let mut batcher = Batcher::new(2);
        let mut seen = Vec::new();
        for i in 0..5 {
            if let Some(batch) = batcher.push(numbered(i)) {
                seen.extend(batch.records);
            }
        }
        seen.extend(batcher.flush().unwrap().records);

        let order: Vec<_> = seen.iter().map(|r| r.get("n").unwrap().to_string()).collect();
        assert_eq!(order, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let mut batcher = Batcher::new(0);
        assert_eq!(batcher.batch_size(), 1);
        assert!(batcher.push(numbered(0)).is_some());
    }
}

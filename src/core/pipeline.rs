use crate::core::batcher::{Batcher, DEFAULT_BATCH_SIZE};
use crate::core::date_filter::DateRecencyFilter;
use crate::core::parser::RowParser;
use crate::core::projector::Projection;
use crate::core::{Batch, RunSummary};
use crate::utils::error::{ProcessError, Result};
use chrono::NaiveDate;
use std::io::Read;
use tokio_util::sync::CancellationToken;

/// 一次執行所需的全部設定，驗證過後才會建立
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingSettings {
    pub delimiter: u8,
    pub batch_size: usize,
    pub filter: Option<DateRecencyFilter>,
    pub projection: Projection,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            delimiter: b',',
            batch_size: DEFAULT_BATCH_SIZE,
            filter: None,
            projection: Projection::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// 驅動 parser → filter → projector → batcher 的單次執行
///
/// 計數器與批次都屬於這個實例，同時進行的多個執行彼此不共用任何可變狀態。
pub struct PipelineRunner<'a> {
    settings: &'a ProcessingSettings,
    filter: Option<DateRecencyFilter>,
    reference_date: NaiveDate,
    state: RunState,
    total_rows: u64,
    filtered_rows: u64,
    skipped_rows: u64,
    batches: Vec<Batch>,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(settings: &'a ProcessingSettings, reference_date: NaiveDate) -> Self {
        Self {
            settings,
            filter: settings.filter.clone(),
            reference_date,
            state: RunState::Idle,
            total_rows: 0,
            filtered_rows: 0,
            skipped_rows: 0,
            batches: Vec::new(),
        }
    }

    /// 只對這次執行覆寫過濾區間；沒有設定過濾器時不做任何事
    pub fn with_window_override(mut self, window_days: Option<u32>) -> Self {
        if let (Some(days), Some(filter)) = (window_days, self.filter.as_mut()) {
            filter.window_days = days;
        }
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run<R: Read>(&mut self, input: R, cancel: &CancellationToken) -> Result<RunSummary> {
        if self.state != RunState::Idle {
            return Err(ProcessError::ProcessingError {
                message: format!("pipeline runner already used (state: {:?})", self.state),
            });
        }

        self.state = RunState::Running;
        self.total_rows = 0;
        self.filtered_rows = 0;
        self.skipped_rows = 0;
        self.batches.clear();

        match self.consume(input, cancel) {
            Ok(summary) => {
                self.state = RunState::Completed;
                Ok(summary)
            }
            Err(e) => {
                self.state = match e {
                    ProcessError::Cancelled => RunState::Cancelled,
                    _ => RunState::Failed,
                };
                // 已封存的批次不會出現在失敗的回應中
                self.batches.clear();
                Err(e)
            }
        }
    }

    fn consume<R: Read>(&mut self, input: R, cancel: &CancellationToken) -> Result<RunSummary> {
        let settings = self.settings;
        let mut batcher = Batcher::new(settings.batch_size);
        let parser = RowParser::new(input, settings.delimiter);

        if let Some(filter) = &self.filter {
            tracing::info!(
                "📅 Filtering on '{}' within {} days of {}",
                filter.field,
                filter.window_days,
                self.reference_date
            );
        }

        for record in parser {
            if cancel.is_cancelled() {
                tracing::warn!("🛑 Processing cancelled after {} rows", self.total_rows);
                return Err(ProcessError::Cancelled);
            }

            let record = record?;
            self.total_rows += 1;

            if let Some(filter) = &self.filter {
                if !filter.matches_record(&record, self.reference_date) {
                    self.skipped_rows += 1;
                    continue;
                }
            }

            self.filtered_rows += 1;
            if let Some(batch) = batcher.push(settings.projection.project(&record)) {
                self.batches.push(batch);
                tracing::debug!(
                    "📦 Processed {} rows so far ({} batches)",
                    self.total_rows,
                    self.batches.len()
                );
            }
        }

        if let Some(batch) = batcher.flush() {
            self.batches.push(batch);
        }

        let data = std::mem::take(&mut self.batches);
        tracing::info!(
            "✅ CSV processing completed! Total rows: {}, Filtered: {}, Skipped: {}, Batches: {}",
            self.total_rows,
            self.filtered_rows,
            self.skipped_rows,
            data.len()
        );

        Ok(RunSummary {
            total_rows_processed: self.total_rows,
            filtered_rows: self.filtered_rows,
            skipped_rows: self.skipped_rows,
            total_batches: data.len(),
            data,
        })
    }
}

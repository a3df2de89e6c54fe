use crate::core::date_filter;
use crate::core::pipeline::{PipelineRunner, ProcessingSettings};
use crate::core::RunSummary;
use crate::domain::ports::InputSource;
use crate::utils::error::{ProcessError, Result};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// HTTP 層與 CLI 共用的處理入口
///
/// 每次呼叫在 blocking 執行緒上跑一個 `PipelineRunner`。輸入來源會被移進該執行緒，
/// 因此不論成功、失敗或取消，檔案控制代碼與暫存檔都會在執行結束時釋放。
#[derive(Clone)]
pub struct CsvProcessor {
    settings: Arc<ProcessingSettings>,
}

impl CsvProcessor {
    pub fn new(settings: ProcessingSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub async fn process<S: InputSource>(
        &self,
        source: S,
        window_override: Option<u32>,
        cancel: CancellationToken,
    ) -> Result<RunSummary> {
        self.process_at(source, window_override, Self::today(), cancel)
            .await
    }

    /// 以指定的基準日期執行，便於重現結果
    pub async fn process_at<S: InputSource>(
        &self,
        source: S,
        window_override: Option<u32>,
        reference_date: NaiveDate,
        cancel: CancellationToken,
    ) -> Result<RunSummary> {
        let settings = Arc::clone(&self.settings);
        let started = Instant::now();
        let description = source.describe();

        tracing::info!("🚀 Starting CSV processing: {}", description);

        let handle = tokio::task::spawn_blocking(move || -> Result<RunSummary> {
            let result = source.open().and_then(|reader| {
                PipelineRunner::new(&settings, reference_date)
                    .with_window_override(window_override)
                    .run(reader, &cancel)
            });
            source.release();
            result
        });

        let result = handle.await.map_err(|e| ProcessError::ProcessingError {
            message: format!("processing task failed: {}", e),
        })?;

        match &result {
            Ok(summary) => tracing::info!(
                "⏱️ Finished {} in {:?}: {} rows, {} batches",
                description,
                started.elapsed(),
                summary.total_rows_processed,
                summary.total_batches
            ),
            Err(ProcessError::Cancelled) => {
                tracing::warn!("🛑 Processing of {} was cancelled", description)
            }
            Err(e) => tracing::error!("❌ Error reading CSV {}: {}", description, e),
        }

        result
    }

    /// 診斷用：直接以目前的日期檢查一個日期字串
    pub fn test_date(&self, date_string: &str, window_days: u32) -> bool {
        date_filter::matches(date_string, window_days, Self::today())
    }

    /// 未指定區間時使用設定的過濾區間，沒有設定過濾器則為 7 天
    pub fn default_window(&self) -> u32 {
        self.settings
            .filter
            .as_ref()
            .map(|f| f.window_days)
            .unwrap_or(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::source::LocalFileSource;
    use crate::core::date_filter::DateRecencyFilter;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_process_local_file() {
        let file = write_csv("name,email,age\nA,a@b.com,30\nB,b@b.com,\n");
        let processor = CsvProcessor::new(ProcessingSettings::default());

        let summary = processor
            .process(
                LocalFileSource::new(file.path()),
                None,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(summary.total_rows_processed, 2);
        assert_eq!(summary.total_batches, 1);
        assert_eq!(summary.data[0].records[1].get("age"), Some(""));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let processor = CsvProcessor::new(ProcessingSettings::default());
        let result = processor
            .process(
                LocalFileSource::new("/definitely/not/here.csv"),
                None,
                CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(ProcessError::InputNotFound { .. })));
    }

    #[test]
    fn test_default_window_follows_filter() {
        let processor = CsvProcessor::new(ProcessingSettings::default());
        assert_eq!(processor.default_window(), 7);

        let processor = CsvProcessor::new(ProcessingSettings {
            filter: Some(DateRecencyFilter::new("when", 365)),
            ..Default::default()
        });
        assert_eq!(processor.default_window(), 365);
    }

    #[test]
    fn test_test_date_uses_today() {
        let processor = CsvProcessor::new(ProcessingSettings::default());
        let today = CsvProcessor::today().format("%Y-%m-%d").to_string();
        assert!(processor.test_date(&today, 0));
        assert!(!processor.test_date("garbage", 7));
    }
}

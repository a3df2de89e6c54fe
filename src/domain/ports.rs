use crate::utils::error::Result;
use std::io::Read;

/// 管線所需的輸入來源：本機路徑或上傳後的暫存檔
///
/// `open` 必須在檔案不存在時回傳 `InputNotFound`，讓執行在開始前就失敗。
/// 執行結束時（不論結果）會呼叫 `release`，實作在此釋放自己持有的資源。
pub trait InputSource: Send + 'static {
    type Reader: Read + Send;

    fn open(&self) -> Result<Self::Reader>;

    /// 用於日誌與錯誤訊息
    fn describe(&self) -> String;

    fn release(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}


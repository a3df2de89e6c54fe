use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// 一個檔案的標頭，讀取標頭時建立一次，所有記錄共用
///
/// 名稱重複時以最後一個欄位的值為準，輸出位置則維持名稱第一次出現的位置。
#[derive(Debug, Clone, Default)]
pub struct Headers {
    names: Vec<String>,
    columns: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Headers {
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        let mut order = Vec::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if index.insert(name.clone(), idx).is_none() {
                order.push(name.clone());
            }
        }
        let columns = order
            .into_iter()
            .map(|name| {
                let idx = index[&name];
                (name, idx)
            })
            .collect();

        Self {
            names,
            columns,
            index,
        }
    }

    /// 檔案中的原始標頭，包含重複的名稱
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<String> for Headers {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// 一列解析後的 CSV 資料：標頭與欄位值按順序對應
///
/// 列的欄位數少於標頭時，缺少的欄位視為不存在。
#[derive(Debug, Clone)]
pub struct Record {
    headers: Arc<Headers>,
    values: csv::StringRecord,
}

impl Record {
    pub fn new(headers: Arc<Headers>, values: csv::StringRecord) -> Self {
        Self { headers, values }
    }

    /// 以完整的標頭名稱查詢欄位（名稱可包含空白與括號，例如 `cecha (2)`）
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(self.headers.position(name)?)
    }

    /// 依標頭順序走訪不重複的欄位；超出標頭的多餘欄位會被忽略
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.headers
            .columns
            .iter()
            .map(move |(name, idx)| (name.as_str(), self.values.get(*idx)))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value.unwrap_or(""))?;
        }
        map.end()
    }
}

/// 投影後的輸出記錄，鍵的順序即為輸出順序
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectedRecord {
    pub data: Map<String, Value>,
}

impl ProjectedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 後寫入者勝出；已存在的鍵保留原本的位置
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), Value::String(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Batch {
    pub records: Vec<ProjectedRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 一次完整執行的彙總結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_rows_processed: u64,
    pub filtered_rows: u64,
    pub skipped_rows: u64,
    pub total_batches: usize,
    pub data: Vec<Batch>,
}

use crate::core::{ProjectedRecord, Record};
use serde::{Deserialize, Serialize};

/// 單一輸出欄位：輸出名稱、來源欄位名稱、缺值時的預設值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// 省略時與 `name` 相同
    pub source: Option<String>,
    /// 省略時為空字串
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            default: None,
        }
    }

    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    pub fn default_value(&self) -> &str {
        self.default.as_deref().unwrap_or("")
    }

    /// 來源值不存在或為空字串時使用預設值
    fn resolve<'a>(&'a self, record: &'a Record) -> &'a str {
        match record.get(self.source_name()) {
            Some(value) if !value.is_empty() => value,
            _ => self.default_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Projection {
    /// 只輸出指定的欄位，順序與設定相同
    Explicit { fields: Vec<FieldSpec> },
    /// 複製整列資料，並可把一個欄位提到最前面
    PassThrough { hoist: Option<FieldSpec> },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Explicit {
            fields: vec![
                FieldSpec::new("name"),
                FieldSpec::new("email"),
                FieldSpec::new("age"),
            ],
        }
    }
}

impl Projection {
    pub fn project(&self, record: &Record) -> ProjectedRecord {
        let mut out = ProjectedRecord::new();

        match self {
            Projection::Explicit { fields } => {
                for field in fields {
                    out.insert(field.name.as_str(), field.resolve(record));
                }
            }
            Projection::PassThrough { hoist } => {
                if let Some(hoist) = hoist {
                    out.insert(hoist.name.as_str(), hoist.resolve(record));
                }
                for (name, value) in record.iter() {
                    // 名稱相同時保留提前欄位的值
                    if hoist.as_ref().is_some_and(|h| h.name == name) {
                        continue;
                    }
                    out.insert(name, value.unwrap_or(""));
                }
            }
        }

        out
    }

    /// 設定中宣告的輸出欄位名稱（pass-through 模式只有提前欄位）
    pub fn declared_names(&self) -> Vec<&str> {
        match self {
            Projection::Explicit { fields } => fields.iter().map(|f| f.name.as_str()).collect(),
            Projection::PassThrough { hoist } => {
                hoist.iter().map(|h| h.name.as_str()).collect()
            }
        }
    }
}

use crate::domain::model::{Headers, Record};
use crate::utils::error::{ProcessError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::sync::Arc;

const UTF8_BOM: char = '\u{feff}';

/// 把分隔文字串流轉成逐列的 `Record`
///
/// 第一列為標頭。惰性讀取、只能走訪一次；讀取失敗時回傳一次
/// `StreamReadError` 之後就結束，不會產生失敗那一列的部分資料。
pub struct RowParser<R: Read> {
    reader: csv::Reader<R>,
    headers: Option<Arc<Headers>>,
    finished: bool,
}

impl<R: Read> RowParser<R> {
    pub fn new(input: R, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            // 欄位數不一致時照樣讀取，缺少的欄位視為不存在
            .flexible(true)
            .from_reader(input);

        Self {
            reader,
            headers: None,
            finished: false,
        }
    }

    /// 取得標頭，第一次呼叫時才真正讀取
    pub fn headers(&mut self) -> Result<Arc<Headers>> {
        if let Some(headers) = &self.headers {
            return Ok(Arc::clone(headers));
        }

        let raw = self.reader.headers().map_err(ProcessError::stream)?;
        let headers: Headers = raw
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                if idx == 0 {
                    h.trim_start_matches(UTF8_BOM).to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        tracing::debug!("📋 CSV headers: {:?}", headers.names());
        let headers = Arc::new(headers);
        self.headers = Some(Arc::clone(&headers));
        Ok(headers)
    }
}

impl<R: Read> Iterator for RowParser<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let headers = match self.headers() {
            Ok(headers) => headers,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        let mut values = StringRecord::new();
        match self.reader.read_record(&mut values) {
            Ok(true) => Some(Ok(Record::new(headers, values))),
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(ProcessError::stream(e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn parse_all(input: &str, delimiter: u8) -> Vec<Record> {
        RowParser::new(input.as_bytes(), delimiter)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_parses_rows_with_header() {
        let rows = parse_all("name,email\nA,a@b.com\nB,b@b.com\n", b',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("A"));
        assert_eq!(rows[1].get("email"), Some("b@b.com"));
    }

    #[test]
    fn test_custom_delimiter_and_odd_header_names() {
        let rows = parse_all("numer_urzad#cecha (2)\n12#ul.\n", b'#');
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("cecha (2)"), Some("ul."));
    }

    #[test]
    fn test_malformed_rows_are_tolerated() {
        let rows = parse_all("a,b,c\n1\n1,2,3,4\n", b',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b"), None);
        assert_eq!(rows[1].get("c"), Some("3"));
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let rows = parse_all("name,city\n\"Doe, John\",Warszawa\n", b',');
        assert_eq!(rows[0].get("name"), Some("Doe, John"));
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let rows = parse_all("\u{feff}id,name\n1,A\n", b',');
        assert_eq!(rows[0].get("id"), Some("1"));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse_all("", b',').is_empty());
        assert!(parse_all("a,b\n", b',').is_empty());
    }

    /// 讀取到一半就失敗的 reader
    struct FailingReader {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk vanished"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_failure_ends_the_sequence() {
        let reader = FailingReader {
            data: io::Cursor::new(b"a,b\n1,2\n".to_vec()),
        };
        let items: Vec<_> = RowParser::new(reader, b',').collect();

        let last = items.last().unwrap();
        assert!(matches!(last, Err(ProcessError::StreamReadError { .. })));
        assert_eq!(items.iter().filter(|i| i.is_err()).count(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_a_stream_error() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,2\n";
        let items: Vec<_> = RowParser::new(bytes, b',').collect();
        assert!(matches!(
            items.last(),
            Some(Err(ProcessError::StreamReadError { .. }))
        ));
    }
}

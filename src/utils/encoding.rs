//! 编码检测与转换
//!
//! 批量任务 txt 文件可能来自不同平台：UTF-8、带 BOM 的 UTF-16，
//! 或 Windows 下常见的 GBK 等本地编码。这里负责检测编码并提供
//! 统一输出 UTF-8 的读取器。

use chardetng::EncodingDetector as ChardetngDetector;
use encoding_rs::{DecoderResult, Encoding, BIG5, GB18030, GBK, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// 编码检测器
///
/// 检测顺序：BOM → UTF-8 校验 → chardetng → 优先编码列表 → UTF-8 回退
pub struct EncodingDetector {
    /// 检测缓冲区大小
    buffer_size: usize,
    /// 优先检测的编码列表
    priority_encodings: Vec<&'static Encoding>,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            priority_encodings: vec![GBK, GB18030, BIG5, SHIFT_JIS],
        }
    }
}

impl EncodingDetector {
    /// 创建新的编码检测器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置检测缓冲区大小
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// 设置优先检测的编码列表
    pub fn with_priority_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.priority_encodings = encodings;
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// 读取样本并检测编码
    pub fn detect_reader<R: Read>(&self, reader: &mut R) -> std::io::Result<&'static Encoding> {
        let mut buffer = vec![0; self.buffer_size];
        let mut filled = 0;
        while filled < buffer.len() {
            let read = reader.read(&mut buffer[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        Ok(self.detect_bytes(&buffer[..filled]))
    }

    /// 检测字节样本的编码
    pub fn detect_bytes(&self, sample: &[u8]) -> &'static Encoding {
        if sample.is_empty() {
            debug!("样本为空，使用UTF-8编码");
            return UTF_8;
        }

        if let Some(encoding) = detect_bom(sample) {
            debug!("通过BOM检测到编码: {}", encoding.name());
            return encoding;
        }

        // 样本末尾可能截断了一个多字节字符
        match std::str::from_utf8(sample) {
            Ok(_) => return UTF_8,
            Err(e) if e.error_len().is_none() => return UTF_8,
            Err(_) => {}
        }

        let mut detector = ChardetngDetector::new();
        detector.feed(sample, true);
        let guessed = detector.guess(None, false);
        if is_clean_decode(sample, guessed) {
            debug!("通过chardetng检测到编码: {}", guessed.name());
            return guessed;
        }

        for &encoding in &self.priority_encodings {
            if is_clean_decode(sample, encoding) {
                debug!("通过优先编码列表检测到编码: {}", encoding.name());
                return encoding;
            }
        }

        debug!("未能确定编码，回退到UTF-8");
        UTF_8
    }

    /// 创建编码转换读取器，将任意编码的输入转换为UTF-8流
    pub fn create_decode_reader<R: Read + 'static>(
        &self,
        reader: R,
        encoding: &'static Encoding,
    ) -> Box<dyn BufRead + 'static> {
        if encoding == UTF_8 {
            Box::new(BufReader::new(reader))
        } else {
            let decode_reader = DecodeReaderBytesBuilder::new()
                .encoding(Some(encoding))
                .build(reader);
            Box::new(BufReader::new(decode_reader))
        }
    }
}

/// BOM检测
fn detect_bom(data: &[u8]) -> Option<&'static Encoding> {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(UTF_8)
    } else if data.starts_with(&[0xFF, 0xFE]) {
        Some(UTF_16LE)
    } else if data.starts_with(&[0xFE, 0xFF]) {
        Some(UTF_16BE)
    } else {
        None
    }
}

fn is_clean_decode(data: &[u8], encoding: &'static Encoding) -> bool {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = match decoder.max_utf8_buffer_length_without_replacement(data.len()) {
        Some(capacity) => capacity,
        None => return false,
    };
    let mut decoded = String::with_capacity(capacity);
    // 样本可能在多字节字符中间截断，last=false 时末尾残缺不算错误
    let (result, _) = decoder.decode_to_string_without_replacement(data, &mut decoded, false);
    matches!(result, DecoderResult::InputEmpty) && is_reasonable_text(&decoded)
}

/// 检查解码后的文本是否合理
fn is_reasonable_text(text: &str) -> bool {
    let mut total = 0usize;
    let mut control = 0usize;

    for ch in text.chars() {
        total += 1;
        if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            control += 1;
        }
    }

    total > 0 && (control as f64 / total as f64) <= 0.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_utf8_detection() {
        let detector = EncodingDetector::new();
        let content = "第一课,https://example.com/1.m3u8\n".as_bytes();
        assert_eq!(detector.detect_bytes(content), UTF_8);
    }

    #[test]
    fn test_ascii_is_utf8() {
        let detector = EncodingDetector::new();
        assert_eq!(detector.detect_bytes(b"A,http://x/a.m3u8\n"), UTF_8);
    }

    #[test]
    fn test_bom_detection() {
        let detector = EncodingDetector::new();
        assert_eq!(detector.detect_bytes(&[0xEF, 0xBB, 0xBF, b'a']), UTF_8);
        assert_eq!(detector.detect_bytes(&[0xFF, 0xFE, b'a', 0]), UTF_16LE);
        assert_eq!(detector.detect_bytes(&[0xFE, 0xFF, 0, b'a']), UTF_16BE);
    }

    #[test]
    fn test_gbk_detection() {
        let detector = EncodingDetector::new();
        let content = "你好世界，这是一个GBK编码的批量任务文件,https://example.com/a.m3u8\n";
        let (encoded, _, _) = GBK.encode(content);
        let detected = detector.detect_bytes(&encoded);
        assert!(detected == GBK || detected == GB18030);
    }

    #[test]
    fn test_truncated_utf8_sample_is_utf8() {
        let detector = EncodingDetector::new();
        let bytes = "视频".as_bytes();
        assert_eq!(detector.detect_bytes(&bytes[..4]), UTF_8);
    }

    #[test]
    fn test_decode_reader_converts_to_utf8() {
        let detector = EncodingDetector::new();
        let original = "测试,https://example.com/a.m3u8";
        let (encoded, _, _) = GBK.encode(original);
        let mut reader = detector.create_decode_reader(Cursor::new(encoded.into_owned()), GBK);
        let mut converted = String::new();
        reader.read_to_string(&mut converted).unwrap();
        assert_eq!(converted, original);
    }

    #[test]
    fn test_detect_reader_empty() {
        let detector = EncodingDetector::new().with_buffer_size(16);
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert_eq!(detector.detect_reader(&mut empty).unwrap(), UTF_8);
        assert_eq!(detector.buffer_size(), 16);
    }
}

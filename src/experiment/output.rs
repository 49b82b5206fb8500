//! 只追加的输出流
//!
//! 每条记录一行，写入带缓冲的底层 writer；仿真结束时统一 flush。

use crate::error::QdError;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub struct OutputStream {
    name: String,
    inner: Box<dyn Write>,
    lines: u64,
}

impl OutputStream {
    /// 创建（或截断）文件。
    pub fn create(path: &Path) -> Result<Self, QdError> {
        let file = File::create(path)?;
        Ok(Self::from_writer(path.display().to_string(), BufWriter::new(file)))
    }

    pub fn stdout() -> Self {
        Self::from_writer("stdout", BufWriter::new(io::stdout()))
    }

    /// 丢弃所有输出
    pub fn discard() -> Self {
        Self::from_writer("discard", io::sink())
    }

    pub fn from_writer(name: impl Into<String>, w: impl Write + 'static) -> Self {
        Self {
            name: name.into(),
            inner: Box::new(w),
            lines: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 已写入的行数
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn write_line(&mut self, line: impl Display) -> Result<(), QdError> {
        writeln!(self.inner, "{line}")?;
        self.lines += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), QdError> {
        self.inner.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream")
            .field("name", &self.name)
            .field("lines", &self.lines)
            .finish()
    }
}

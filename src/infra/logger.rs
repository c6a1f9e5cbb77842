//! 执行日志记录
//!
//! 每个工具每个自然日一个追加写入的日志文件，并镜像到控制台。
//! 写文件失败时降级为仅控制台输出，绝不向调用方抛错。

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;

/// 日志级别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// 文件落盘状态
struct FileSink {
    /// 当前打开文件对应的日期 (YYYYMMDD)
    date: String,
    file: Option<File>,
    /// 降级后不再重复告警
    degraded: bool,
}

/// 执行审计日志
///
/// 日志路径由 {工具名, 当前日期} 推导，跨日自动切换新文件，
/// 同一天内所有调用共享一个打开的文件。
pub struct ExecutionLogger {
    name: String,
    log_dir: PathBuf,
    sink: Mutex<FileSink>,
}

impl ExecutionLogger {
    /// 创建日志记录器，`name` 为受管工具的逻辑名
    pub fn new(name: &str, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            log_dir: log_dir.into(),
            sink: Mutex::new(FileSink {
                date: String::new(),
                file: None,
                degraded: false,
            }),
        }
    }

    /// 记录 info 级别
    pub fn info(&self, msg: &str) {
        tracing::info!(tool = %self.name, "{}", msg);
        self.append(Level::Info, msg);
    }

    /// 记录 warning 级别
    pub fn warn(&self, msg: &str) {
        tracing::warn!(tool = %self.name, "{}", msg);
        self.append(Level::Warn, msg);
    }

    /// 记录 error 级别
    pub fn error(&self, msg: &str) {
        tracing::error!(tool = %self.name, "{}", msg);
        self.append(Level::Error, msg);
    }

    /// 当前日志文件路径
    pub fn current_path(&self) -> PathBuf {
        let date = Local::now().format("%Y%m%d");
        self.log_dir.join(format!("{}_{}.log", self.name, date))
    }

    /// 追加一行到文件；任何失败都只降级，不向外传播
    fn append(&self, level: Level, msg: &str) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };

        let today = Local::now().format("%Y%m%d").to_string();
        if sink.file.is_none() || sink.date != today {
            match self.open_for(&today) {
                Ok(file) => {
                    sink.file = Some(file);
                    sink.date = today;
                    sink.degraded = false;
                }
                Err(e) => {
                    if !sink.degraded {
                        tracing::warn!(
                            tool = %self.name,
                            error = %e,
                            "log file unavailable, falling back to console-only"
                        );
                        sink.degraded = true;
                    }
                    sink.file = None;
                    return;
                }
            }
        }

        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level.as_str(),
            msg
        );
        if let Some(ref mut file) = sink.file {
            if let Err(e) = file.write_all(line.as_bytes()) {
                if !sink.degraded {
                    tracing::warn!(
                        tool = %self.name,
                        error = %e,
                        "log write failed, falling back to console-only"
                    );
                    sink.degraded = true;
                }
                sink.file = None;
            }
        }
    }

    fn open_for(&self, date: &str) -> std::io::Result<File> {
        fs::create_dir_all(&self.log_dir)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_dir.join(format!("{}_{}.log", self.name, date)))
    }
}

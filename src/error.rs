//! 错误类型
//!
//! 运行期的配置不一致（未注册地址、缺失的通信对）与计数器回退都是致命错误：
//! 处理器返回 `Err` 后世界进入停止状态，仿真立即结束。

use crate::wifi::{MacAddress, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QdError {
    /// 事件里出现了建网时没有登记过的 MAC 地址。
    #[error("unknown MAC address {0}: not registered at setup")]
    UnknownAddress(MacAddress),

    /// 节点关联/去关联时找不到预先安装的通信对。
    #[error("no traffic configuration for node {0}")]
    MissingTrafficConfiguration(NodeId),

    /// SLS 完成事件来自未订阅的设备。
    #[error("device {0} has no beam-training subscription")]
    UnknownSubscription(MacAddress),

    /// 接收端累计字节数在两次采样之间变小。
    #[error("receive counter of pair {pair} went backwards: {previous} -> {current}")]
    CounterRegression { pair: usize, previous: u64, current: u64 },

    /// 配置里出现了无法识别的具名变体（应用类型、TCP 变体、PHY 模式…）。
    #[error("unknown {what}: {value:?}")]
    UnknownVariant { what: &'static str, value: String },

    /// 配置数值不合法。
    #[error("invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QdError {
    pub(crate) fn unknown(what: &'static str, value: impl Into<String>) -> Self {
        QdError::UnknownVariant {
            what,
            value: value.into(),
        }
    }

    pub(crate) fn invalid(what: &'static str, value: impl ToString) -> Self {
        QdError::InvalidValue {
            what,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QdError>;

//! 标识符类型
//!
//! 节点、流量发送端/接收端以及关联 ID。

use serde::Serialize;
use std::fmt;

/// 节点标识符（建网时按创建顺序分配，AP 为 0）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 流量发送应用的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId(pub usize);

/// 接收应用（PacketSink）的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId(pub usize);

/// Association ID，由 AP 在关联成功时分配（从 1 开始）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Aid(pub u16);

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

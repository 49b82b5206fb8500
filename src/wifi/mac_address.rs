//! 48 位 MAC 地址

use crate::error::QdError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// 按序号分配地址：第 n 个设备得到 `00:00:00:00:00:0n`（n 从 1 开始）。
    pub fn allocate(n: u64) -> MacAddress {
        let b = n.to_be_bytes();
        MacAddress([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = QdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.trim().split(':');
        for slot in out.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| QdError::invalid("MAC address", s))?;
            if part.len() != 2 {
                return Err(QdError::invalid("MAC address", s));
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| QdError::invalid("MAC address", s))?;
        }
        if parts.next().is_some() {
            return Err(QdError::invalid("MAC address", s));
        }
        Ok(MacAddress(out))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

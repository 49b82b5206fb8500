//! MAC 地址 → 节点号
//!
//! 建网时通过 builder 一次性登记，`build` 之后只读。

use std::collections::HashMap;

use crate::error::QdError;
use crate::wifi::{MacAddress, NodeId};

#[derive(Debug, Default)]
pub struct AddressRegistryBuilder {
    map: HashMap<MacAddress, NodeId>,
}

impl AddressRegistryBuilder {
    /// 每个地址只能登记一次。
    pub fn register(&mut self, addr: MacAddress, node: NodeId) -> Result<(), QdError> {
        if let Some(prev) = self.map.insert(addr, node) {
            return Err(QdError::invalid(
                "address registration",
                format!("{addr} registered twice (nodes {prev} and {node})"),
            ));
        }
        Ok(())
    }

    pub fn build(self) -> AddressRegistry {
        AddressRegistry { map: self.map }
    }
}

#[derive(Debug, Default)]
pub struct AddressRegistry {
    map: HashMap<MacAddress, NodeId>,
}

impl AddressRegistry {
    pub fn builder() -> AddressRegistryBuilder {
        AddressRegistryBuilder::default()
    }

    pub fn resolve(&self, addr: MacAddress) -> Result<NodeId, QdError> {
        self.map
            .get(&addr)
            .copied()
            .ok_or(QdError::UnknownAddress(addr))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

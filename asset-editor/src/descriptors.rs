//! Lookup tables over the asset model served by the asset service.

use std::collections::HashMap;

use shared_types::{
    AssetModelInfo, AssetTypeInfo, AttributeDescriptor, MetaItemDescriptor, ValueDescriptor,
};

/// Indexed asset model: asset types, meta item descriptors and value descriptors
#[derive(Debug, Clone, Default)]
pub struct AssetModel {
    asset_types: HashMap<String, AssetTypeInfo>,
    meta_items: HashMap<String, MetaItemDescriptor>,
    value_types: HashMap<String, ValueDescriptor>,
}

impl AssetModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_info(info: AssetModelInfo) -> Self {
        Self {
            asset_types: info
                .asset_types
                .into_iter()
                .map(|t| (t.asset_type.clone(), t))
                .collect(),
            meta_items: info
                .meta_item_descriptors
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
            value_types: info
                .value_descriptors
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<AssetModelInfo>(json).map(Self::from_info)
    }

    pub fn asset_type_info(&self, asset_type: &str) -> Option<&AssetTypeInfo> {
        self.asset_types.get(asset_type)
    }

    pub fn attribute_descriptor(&self, asset_type: &str, name: &str) -> Option<&AttributeDescriptor> {
        self.asset_type_info(asset_type)?
            .attribute_descriptors
            .iter()
            .find(|d| d.name == name)
    }

    pub fn meta_item_descriptor(&self, name: &str) -> Option<&MetaItemDescriptor> {
        self.meta_items.get(name)
    }

    pub fn value_descriptor(&self, value_type: &str) -> Option<&ValueDescriptor> {
        self.value_types.get(value_type)
    }

    /// Meta items that may be added to attributes of `asset_type`, sorted.
    ///
    /// Types without their own list allow every known meta item.
    pub fn meta_item_names(&self, asset_type: &str) -> Vec<String> {
        let mut names: Vec<String> = match self.asset_type_info(asset_type) {
            Some(info) if !info.meta_item_descriptors.is_empty() => {
                info.meta_item_descriptors.clone()
            }
            _ => self.meta_items.keys().cloned().collect(),
        };
        names.sort();
        names.dedup();
        names
    }
}

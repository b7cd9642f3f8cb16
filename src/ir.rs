use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// A node identifier as it appears in a dataset. Integer ids are accepted
/// and normalized to their decimal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(val) => val,
            RawId::Int(val) => val.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: RawId,
    #[serde(default, alias = "parents")]
    parent_ids: Vec<RawId>,
    #[serde(default)]
    data: serde_json::Value,
}

/// One input record: an id, the ids of its parents and an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub parent_ids: Vec<String>,
    pub data: serde_json::Value,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, parent_ids: &[&str]) -> Self {
        Self {
            id: id.into(),
            parent_ids: parent_ids.iter().map(|p| p.to_string()).collect(),
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }
}

impl From<RawRecord> for NodeRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            id: raw.id.into_string(),
            parent_ids: raw.parent_ids.into_iter().map(RawId::into_string).collect(),
            data: raw.data,
        }
    }
}

/// Parses a dataset. Strict JSON is tried first, then JSON5 so hand-written
/// files may carry comments and trailing commas.
pub fn parse_dataset(input: &str) -> Result<Vec<NodeRecord>, DatasetError> {
    let raw: Vec<RawRecord> = match serde_json::from_str(input) {
        Ok(records) => records,
        Err(json_err) => json5::from_str(input).map_err(|json5_err| DatasetError::Parse {
            message: format!("{json_err}; as JSON5: {json5_err}"),
        })?,
    };
    Ok(raw.into_iter().map(NodeRecord::from).collect())
}

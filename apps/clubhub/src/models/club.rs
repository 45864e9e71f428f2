use serde::{Deserialize, Serialize};

/// Club metadata as stored in the club data file, keyed by id outside the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubRecord {
    #[serde(alias = "club_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
}

/// A club record together with its id, as served by the directory endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Club {
    pub id: i64,
    #[serde(flatten)]
    pub record: ClubRecord,
}

impl Club {
    pub fn new(id: i64, record: &ClubRecord) -> Self {
        Self {
            id,
            record: record.clone(),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// Player record as served by the remote store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlayerRsp {
    pub id: u32,
    #[serde(default)]
    pub title: Rendered,
}

/// One entry of the top-level match listing, the upstream producer of
/// match ids for everything else.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EventSummary {
    pub id: u32,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub teams: Vec<u32>,
    #[serde(default)]
    pub main_results: Option<Vec<String>>,
}

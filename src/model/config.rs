use serde::{Deserialize, Serialize};

use super::node::NodeDecl;

/// Contents of preftree.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeFile {
    pub tree: TreeInfo,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub nodes: Vec<NodeDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Show nodes flagged `advanced`
    #[serde(default)]
    pub show_advanced: bool,
    /// Where open/closed state is persisted, relative to the definition dir
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            show_advanced: false,
            state_file: default_state_file(),
        }
    }
}

fn default_state_file() -> String {
    ".state.json".to_string()
}

//! Application resource lookup

use serde::{Deserialize, Serialize};

/// Resource category an icon can live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Mipmap,
    Drawable,
}

impl ResourceCategory {
    /// Lookup order for icons.
    pub const ICON_ORDER: [ResourceCategory; 2] = [Self::Mipmap, Self::Drawable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mipmap => "mipmap",
            Self::Drawable => "drawable",
        }
    }
}

/// Resolved resource reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// The host application's main entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchTarget {
    /// Application package
    pub package: String,
    /// Main entry (activity) name
    pub entry: String,
}

/// Resource lookup service.
pub trait ResourceResolver: Send + Sync {
    /// Look up `name` under `category`.
    fn resolve(&self, name: &str, category: ResourceCategory) -> Option<ResourceId>;

    /// Icon that always exists on the platform.
    fn default_icon(&self) -> ResourceId;

    /// Launch entry point of the host application, if it has one.
    fn launch_entry(&self) -> Option<LaunchTarget>;
}

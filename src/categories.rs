// 🏷️ Categories - the known tag set and its display metadata
//
// Categories are free text in storage. Only the tags below get their own
// icon and colour; anything else (or no tag) falls back to the default.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryMeta {
    /// Icon name understood by the front end's icon set
    pub icon: &'static str,
    /// Badge background colour
    pub color: &'static str,
}

pub const DEFAULT_META: CategoryMeta = CategoryMeta {
    icon: "card-outline",
    color: "#9BA1A6",
};

const KNOWN: &[(&str, CategoryMeta)] = &[
    ("music", CategoryMeta { icon: "musical-notes-outline", color: "#7D5FFF" }),
    ("storage", CategoryMeta { icon: "cloud-outline", color: "#2D98DA" }),
    ("video", CategoryMeta { icon: "tv-outline", color: "#EB3B5A" }),
    ("dev", CategoryMeta { icon: "code-slash-outline", color: "#26DE81" }),
    ("design", CategoryMeta { icon: "color-palette-outline", color: "#F7B731" }),
    ("web", CategoryMeta { icon: "globe-outline", color: "#45AAF2" }),
    ("cloud", CategoryMeta { icon: "server-outline", color: "#20BF6B" }),
    ("health", CategoryMeta { icon: "heart-outline", color: "#FC5C65" }),
    ("productivity", CategoryMeta { icon: "document-text-outline", color: "#A55EEA" }),
    ("gaming", CategoryMeta { icon: "game-controller-outline", color: "#8854D0" }),
    ("auto", CategoryMeta { icon: "car-outline", color: "#778CA3" }),
];

/// Names of every known category, in picker order
pub fn known_categories() -> impl Iterator<Item = &'static str> {
    KNOWN.iter().map(|(name, _)| *name)
}

pub fn is_known(category: &str) -> bool {
    KNOWN.iter().any(|(name, _)| *name == category)
}

pub fn category_meta(category: Option<&str>) -> CategoryMeta {
    category
        .and_then(|tag| KNOWN.iter().find(|(name, _)| *name == tag))
        .map_or(DEFAULT_META, |(_, meta)| *meta)
}

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::fmt;

/// Metadata records keyed by asset identifier, in the order they were fetched
pub type MetadataCollection = IndexMap<String, AssetMetadata>;

/// Pixel dimensions, serialized as a `[width, height]` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct Resolution {
    pub width: u64,
    pub height: u64,
}

impl Resolution {
    #[must_use]
    pub const fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width.saturating_mul(self.height)
    }
}

impl From<[u64; 2]> for Resolution {
    fn from([width, height]: [u64; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for [u64; 2] {
    fn from(res: Resolution) -> Self {
        [res.width, res.height]
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Downloadable HDRI file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Hdr,
    Exr,
    Jpg,
}

impl FileFormat {
    pub const ALL: [Self; 3] = [Self::Hdr, Self::Exr, Self::Jpg];

    /// File extension, also used as the download path segment
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Hdr => "hdr",
            Self::Exr => "exr",
            Self::Jpg => "jpg",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Descriptive record for one HDRI, as written to the metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Display name
    pub name: String,
    /// Catalog type tag (0 for HDRIs)
    #[serde(rename = "type")]
    pub asset_type: i64,
    /// Unix timestamp of publication
    pub date_published: i64,
    pub download_count: u64,
    pub files_hash: String,
    /// Author name to credited role
    pub authors: IndexMap<String, String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Largest listed file resolution
    pub max_resolution: Resolution,
    /// Placeholder physical dimensions
    pub dimensions: Resolution,
    pub thumbnail_url: String,
}

/// Title-case an identifier for use as a fallback display name.
///
/// Underscores become spaces; every run of letters starts upper-case and
/// continues lower-case, so `"lonely_road_afternoon_4k"` becomes
/// `"Lonely Road Afternoon 4K"`.
#[must_use]
pub fn display_name_from_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut prev_is_letter = false;

    for ch in id.chars() {
        let ch = if ch == '_' { ' ' } else { ch };

        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}

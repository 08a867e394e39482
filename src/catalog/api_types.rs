use crate::types::Resolution;
use serde::Deserialize;
use serde_json::Value;
use indexmap::IndexMap;

/// Asset type code the catalog uses for HDRIs
pub const ASSET_TYPE_HDRI: i64 = 0;

/// Category key under which `/files/{id}` lists HDRI files
const FILES_HDRI_KEY: &str = "hdri";

/// One entry of the `/assets` listing
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSummary {
    #[serde(rename = "type")]
    pub asset_type: Option<i64>,
}

impl AssetSummary {
    #[must_use]
    pub fn is_hdri(&self) -> bool {
        self.asset_type == Some(ASSET_TYPE_HDRI)
    }
}

/// Detail object returned by `/info/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetInfo {
    pub name: Option<String>,
    pub date_published: Option<i64>,
    pub download_count: Option<u64>,
    pub files_hash: Option<String>,
    pub authors: Option<IndexMap<String, String>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
}

/// Largest resolution, by area, listed under the `hdri` section of a
/// `/files/{id}` response.
///
/// The response is nested `hdri -> resolution -> format -> file info`, where
/// file info may carry a `resolution: [width, height]` pair. Entries that do
/// not follow that shape are ignored. Ties keep the first pair seen.
#[must_use]
pub fn max_file_resolution(files: &Value) -> Option<Resolution> {
    let resolutions = files.get(FILES_HDRI_KEY)?.as_object()?;

    resolutions
        .values()
        .filter_map(Value::as_object)
        .flat_map(|formats| formats.values())
        .filter_map(file_resolution)
        .filter(|res| res.area() > 0)
        .fold(None, |best: Option<Resolution>, res| match best {
            Some(b) if b.area() >= res.area() => Some(b),
            _ => Some(res),
        })
}

fn file_resolution(file_info: &Value) -> Option<Resolution> {
    match file_info.get("resolution")?.as_array()?.as_slice() {
        [w, h] => Some(Resolution::new(w.as_u64()?, h.as_u64()?)),
        _ => None,
    }
}

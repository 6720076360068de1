use common::MediaRecord;
use serde_json::Value;

pub const NO_TAGS: &str = "no tags given";

pub fn replace_tags(record: &mut MediaRecord, tags: Vec<String>) {
    record.tags = Some(tags);
}

/// The `tags` field of a request body, if it is an array of strings.
pub fn tags_from_body(body: &Value) -> Option<Vec<String>> {
    body.get("tags")?
        .as_array()?
        .iter()
        .map(|tag| tag.as_str().map(str::to_string))
        .collect()
}

//! Wire types for the 36kr hot-rank gateway.
//!
//! The gateway is not under our control, so every leaf field is read
//! leniently: a value of the wrong JSON type is treated as absent rather
//! than rejecting the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Serialize)]
pub struct HotRankRequest {
    pub partner_id: &'static str,
    pub timestamp: i64,
    pub param: HotRankParam,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotRankParam {
    pub site_id: u32,
    pub platform_id: u32,
}

impl HotRankRequest {
    pub fn new(timestamp: i64) -> Self {
        Self {
            partner_id: "wap",
            timestamp,
            param: HotRankParam {
                site_id: 1,
                platform_id: 2,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HotRankResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: Option<i64>,
    #[serde(default)]
    pub data: Option<HotRankData>,
}

#[derive(Debug, Deserialize)]
pub struct HotRankData {
    #[serde(rename = "hotRankList", default, deserialize_with = "lenient_list")]
    pub hot_rank_list: Option<Vec<RankedItem>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub item_id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub publish_time: Option<Number>,
    #[serde(default, deserialize_with = "lenient_material")]
    pub template_material: Material,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, deserialize_with = "lenient_string")]
    pub widget_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub publish_time: Option<Number>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub widget_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stat_read: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stat_praise: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stat_comment: Option<Number>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stat_collect: Option<Number>,
}

impl RankedItem {
    pub fn title(&self) -> &str {
        self.template_material.widget_title.as_deref().unwrap_or("")
    }

    /// Publish instant in epoch milliseconds, material-level first.
    pub fn publish_time_ms(&self) -> Option<i64> {
        self.template_material
            .publish_time
            .as_ref()
            .or(self.publish_time.as_ref())
            .and_then(number_to_millis)
    }
}

fn number_to_millis(n: &Number) -> Option<i64> {
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(n),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.and_then(|n| n.as_i64()))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_material<'de, D>(deserializer: D) -> Result<Material, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_object() {
        Material::deserialize(value).map_err(serde::de::Error::custom)
    } else {
        Ok(Material::default())
    }
}

/// A list that is present but not an array is reported as absent.
fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<RankedItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter(Value::is_object)
            .map(|entry| RankedItem::deserialize(entry).map_err(serde::de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(HotRankRequest::new(1_700_000_000)).unwrap();

        assert_eq!(
            body,
            json!({
                "partner_id": "wap",
                "timestamp": 1_700_000_000,
                "param": { "siteId": 1, "platformId": 2 }
            })
        );
    }

    #[test]
    fn test_deserialize_full_item() {
        let item: RankedItem = serde_json::from_value(json!({
            "itemId": 2_987_654_321u64,
            "publishTime": 1_600_000_000_000i64,
            "templateMaterial": {
                "widgetTitle": "标题",
                "authorName": "作者",
                "publishTime": 1_700_000_000_000i64,
                "widgetImage": "https://img.36krcdn.com/a.jpg",
                "statRead": 10,
                "statPraise": 2,
                "statComment": 3,
                "statCollect": 4
            }
        }))
        .unwrap();

        assert_eq!(item.item_id, "2987654321");
        assert_eq!(item.title(), "标题");
        assert_eq!(item.publish_time_ms(), Some(1_700_000_000_000));
        assert_eq!(item.template_material.author_name.as_deref(), Some("作者"));
        assert_eq!(item.template_material.stat_collect, Some(Number::from(4)));
    }

    #[test]
    fn test_string_item_id() {
        let item: RankedItem = serde_json::from_value(json!({ "itemId": "abc" })).unwrap();
        assert_eq!(item.item_id, "abc");
    }

    #[test]
    fn test_wrong_types_become_absent() {
        let item: RankedItem = serde_json::from_value(json!({
            "itemId": null,
            "templateMaterial": {
                "widgetTitle": 12,
                "authorName": ["x"],
                "publishTime": "yesterday",
                "statRead": "10",
                "statPraise": null
            }
        }))
        .unwrap();

        assert_eq!(item.item_id, "");
        assert_eq!(item.title(), "");
        assert_eq!(item.template_material.author_name, None);
        assert_eq!(item.publish_time_ms(), None);
        assert_eq!(item.template_material.stat_read, None);
        assert_eq!(item.template_material.stat_praise, None);
    }

    #[test]
    fn test_publish_time_falls_back_to_item_level() {
        let item: RankedItem = serde_json::from_value(json!({
            "itemId": 1,
            "publishTime": 1_650_000_000_000i64,
            "templateMaterial": { "widgetTitle": "T" }
        }))
        .unwrap();

        assert_eq!(item.publish_time_ms(), Some(1_650_000_000_000));
    }

    #[test]
    fn test_fractional_publish_time_is_floored() {
        let item: RankedItem = serde_json::from_value(json!({
            "templateMaterial": { "publishTime": 1_700_000_000_000.75 }
        }))
        .unwrap();

        assert_eq!(item.publish_time_ms(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_non_object_material_is_empty() {
        let item: RankedItem =
            serde_json::from_value(json!({ "itemId": 5, "templateMaterial": "oops" })).unwrap();
        assert_eq!(item.template_material, Material::default());
    }

    #[test]
    fn test_response_with_list() {
        let response: HotRankResponse = serde_json::from_value(json!({
            "code": 0,
            "data": { "hotRankList": [ { "itemId": 1 }, { "itemId": 2 } ] }
        }))
        .unwrap();

        assert_eq!(response.code, Some(0));
        let list = response.data.unwrap().hot_rank_list.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].item_id, "2");
    }

    #[test]
    fn test_response_list_not_an_array() {
        let response: HotRankResponse = serde_json::from_value(json!({
            "code": 0,
            "data": { "hotRankList": { "oops": true } }
        }))
        .unwrap();

        assert!(response.data.unwrap().hot_rank_list.is_none());
    }

    #[test]
    fn test_response_missing_fields() {
        let response: HotRankResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.code.is_none());
        assert!(response.data.is_none());
    }
}

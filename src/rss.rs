//! RSS 2.0 rendering of the hot ranking.

use askama::Template;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::RankedItem;

/// Only the head of the ranking is published.
pub const MAX_ITEMS: usize = 8;

pub const ARTICLE_BASE_URL: &str = "https://36kr.com/p/";

#[derive(Debug, Error)]
#[error("failed to render RSS document: {0}")]
pub struct RenderError(#[from] askama::Error);

#[derive(Debug, Clone, Copy)]
pub struct Channel {
    pub title: &'static str,
    pub link: &'static str,
    pub description: &'static str,
}

pub const CHANNEL: Channel = Channel {
    title: "36氪热榜",
    link: "https://36kr.com/hot-list/catalog",
    description: "36氪 24 小时热榜，按热度排序的前 8 篇文章",
};

#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: &'static str,
}

/// One `<item>` with every field already derived; escaping happens in the template.
#[derive(Debug, Clone, PartialEq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    pub author: String,
    pub description: String,
    pub enclosure: Option<Enclosure>,
}

impl RssItem {
    /// `now` stands in for a missing or unusable publish time.
    pub fn from_ranked(item: &RankedItem, now: DateTime<Utc>) -> Self {
        let material = &item.template_material;

        let published = item
            .publish_time_ms()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(now);

        let enclosure = material
            .widget_image
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Enclosure {
                url: url.to_string(),
                mime_type: mime_from_url(url),
            });

        Self {
            title: item.title().to_string(),
            link: format!("{}{}", ARTICLE_BASE_URL, item.item_id),
            pub_date: format_rfc1123(published),
            author: material.author_name.clone().unwrap_or_default(),
            description: describe(item),
            enclosure,
        }
    }
}

#[derive(Template)]
#[template(path = "rss.xml", escape = "none")]
struct RssTemplate<'a> {
    channel: &'a Channel,
    last_build_date: String,
    items: Vec<RssItem>,
}

mod filters {
    pub fn xml_escape<T: std::fmt::Display>(s: T) -> ::askama::Result<String> {
        Ok(super::escape_xml(&s.to_string()))
    }

    pub fn cdata<T: std::fmt::Display>(s: T) -> ::askama::Result<String> {
        Ok(super::escape_cdata(&s.to_string()))
    }
}

/// Render the first [`MAX_ITEMS`] items as an RSS 2.0 document.
pub fn build_rss(items: &[RankedItem]) -> Result<String, RenderError> {
    build_rss_at(items, Utc::now())
}

pub fn build_rss_at(items: &[RankedItem], now: DateTime<Utc>) -> Result<String, RenderError> {
    let template = RssTemplate {
        channel: &CHANNEL,
        last_build_date: format_rfc1123(now),
        items: items
            .iter()
            .take(MAX_ITEMS)
            .map(|item| RssItem::from_ranked(item, now))
            .collect(),
    };

    Ok(template.render()?)
}

/// Escape text for an XML element body or attribute value.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Split any `]]>` so the text can sit inside a single CDATA section.
pub fn escape_cdata(s: &str) -> String {
    s.replace("]]>", "]]]]><![CDATA[>")
}

/// RFC 1123 date, e.g. `Wed, 02 Oct 2024 10:00:00 GMT`.
pub fn format_rfc1123(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Guess an image MIME type from the URL's file extension. Defaults to JPEG.
pub fn mime_from_url(url: &str) -> &'static str {
    let path = url.split(&['?', '#'][..]).next().unwrap_or("");
    let file = path.rsplit('/').next().unwrap_or("");

    let ext = match file.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "image/jpeg",
    };

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Pipe-joined author and engagement stats; absent fields are skipped.
pub fn describe(item: &RankedItem) -> String {
    let material = &item.template_material;
    let mut parts = Vec::new();

    if let Some(author) = material
        .author_name
        .as_deref()
        .filter(|a| !a.trim().is_empty())
    {
        parts.push(format!("作者：{}", author));
    }

    let stats = [
        ("阅读", &material.stat_read),
        ("点赞", &material.stat_praise),
        ("评论", &material.stat_comment),
        ("收藏", &material.stat_collect),
    ];
    for (label, value) in stats {
        if let Some(n) = value {
            parts.push(format!("{}：{}", label, n));
        }
    }

    parts.join(" | ")
}

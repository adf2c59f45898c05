// Post page parsing: meta tags, JSON-LD, embedded state and a loose scan
//
// Priority is fixed and applied the same way on every page:
//   1. og:video / og:video:url
//   2. og:video:secure_url
//   3. JSON-LD VideoObject with a contentUrl
//   4. embedded shortcode_media record with is_video and video_url
//   5. loose scan of the raw page for an .mp4 URL (last resort)

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::fields;
use crate::extractor::models::VideoDetails;

const MAX_JSON_DEPTH: usize = 32;
const MAX_TITLE_CHARS: usize = 100;

static NULL: Value = Value::Null;

lazy_static! {
    static ref SHARED_DATA_RE: Regex =
        Regex::new(r"(?s)window\._sharedData\s*=\s*(\{.+\})\s*;?\s*$").unwrap();
    static ref ADDITIONAL_DATA_RE: Regex = Regex::new(
        r#"(?s)window\.__additionalDataLoaded\(\s*['"][^'"]*['"]\s*,\s*(\{.+\})\s*\)\s*;?\s*$"#
    )
    .unwrap();
    // Checked in order; the first candidate containing ".mp4" wins
    static ref LOOSE_VIDEO_RES: Vec<Regex> = vec![
        Regex::new(r#""video_url"\s*:\s*"([^"]+)""#).unwrap(),
        Regex::new(r#""playback_url"\s*:\s*"([^"]+)""#).unwrap(),
        Regex::new(r#""url"\s*:\s*"([^"]*\.mp4[^"]*)""#).unwrap(),
        Regex::new(r#"(https:(?:\\?/){2}[^"'\s<>]*cdninstagram[^"'\s<>]*\.mp4[^"'\s<>]*)"#).unwrap(),
        Regex::new(r#"(https://[^"'\s<>]*\.mp4[^"'\s<>]*)"#).unwrap(),
    ];
    static ref BY_HANDLE_RE: Regex = Regex::new(r"(?i)\bby\s+@([A-Za-z0-9_.]+)").unwrap();
    static ref HANDLE_RE: Regex = Regex::new(r"@([A-Za-z0-9_.]+)").unwrap();
    static ref ISO_DURATION_RE: Regex = Regex::new(
        r"^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$"
    )
    .unwrap();
}

/// Which markup signal produced the video URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupSource {
    OgVideo,
    OgVideoSecure,
    JsonLd,
    EmbeddedState,
    LooseScan,
}

impl MarkupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OgVideo => "og:video",
            Self::OgVideoSecure => "og:video:secure_url",
            Self::JsonLd => "json-ld",
            Self::EmbeddedState => "embedded-state",
            Self::LooseScan => "loose-scan",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    pub source: MarkupSource,
    pub details: VideoDetails,
}

/// Run the priority chain over a post page. `None` when no video URL exists.
pub fn extract_from_html(html: &str) -> Option<PageExtraction> {
    let document = Html::parse_document(html);
    let meta = meta_tags(&document);

    let (source, mut details) = if let Some(url) = meta_value(&meta, &["og:video", "og:video:url"]) {
        (MarkupSource::OgVideo, VideoDetails::with_video_url(url))
    } else if let Some(url) = meta_value(&meta, &["og:video:secure_url"]) {
        (MarkupSource::OgVideoSecure, VideoDetails::with_video_url(url))
    } else if let Some(found) = json_ld_video(&document) {
        (MarkupSource::JsonLd, found)
    } else if let Some(found) = embedded_state_video(&document) {
        (MarkupSource::EmbeddedState, found)
    } else if let Some(url) = find_loose_video_url(html) {
        (MarkupSource::LooseScan, VideoDetails::with_video_url(url))
    } else {
        return None;
    };

    details.fill_from(metadata_from_meta(&meta));
    if details.author.is_none() {
        details.author = details.description.as_deref().and_then(author_from_description);
    }

    Some(PageExtraction { source, details })
}

/// All `<meta>` tags keyed by lowercased `property` / `name`; first one wins.
/// Entities in `content` are already decoded by the HTML parser.
fn meta_tags(document: &Html) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    let Ok(selector) = Selector::parse("meta[property], meta[name]") else {
        return tags;
    };

    for element in document.select(&selector) {
        let element = element.value();
        let key = element.attr("property").or_else(|| element.attr("name"));
        if let (Some(key), Some(content)) = (key, element.attr("content")) {
            tags.entry(key.trim().to_ascii_lowercase())
                .or_insert_with(|| content.to_string());
        }
    }

    tags
}

/// Text of every `<script>` matching `css`, in document order.
fn script_texts(document: &Html, css: &str) -> Vec<String> {
    match Selector::parse(css) {
        Ok(selector) => document
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn meta_value(meta: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| meta.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn metadata_from_meta(meta: &HashMap<String, String>) -> VideoDetails {
    let description = meta_value(meta, &["og:description", "description"]);
    VideoDetails {
        title: meta_value(meta, &["og:title", "twitter:title"]),
        thumbnail_url: meta_value(meta, &["og:image", "og:image:secure_url", "twitter:image"]),
        author: description.as_deref().and_then(author_from_description),
        description,
        width: meta_value(meta, &["og:video:width"]).and_then(|v| v.parse().ok()),
        height: meta_value(meta, &["og:video:height"]).and_then(|v| v.parse().ok()),
        format: meta_value(meta, &["og:video:type"]).and_then(|t| format_from_mime(&t)),
        ..VideoDetails::default()
    }
}

/// `by @handle` first, then the first `@handle` anywhere.
pub fn author_from_description(description: &str) -> Option<String> {
    BY_HANDLE_RE
        .captures(description)
        .or_else(|| HANDLE_RE.captures(description))
        .map(|caps| caps[1].trim_end_matches('.').to_string())
        .filter(|handle| !handle.is_empty())
        .map(|handle| format!("@{}", handle))
}

fn format_from_mime(mime: &str) -> Option<String> {
    mime.trim()
        .strip_prefix("video/")
        .map(|sub| sub.split(';').next().unwrap_or(sub).trim().to_string())
        .filter(|s| !s.is_empty())
}

// ============ JSON-LD ============

pub fn find_json_ld_video(html: &str) -> Option<VideoDetails> {
    json_ld_video(&Html::parse_document(html))
}

fn json_ld_video(document: &Html) -> Option<VideoDetails> {
    script_texts(document, r#"script[type="application/ld+json"]"#)
        .iter()
        .filter_map(|text| serde_json::from_str::<Value>(text.trim()).ok())
        .find_map(|doc| find_video_object(&doc, false, 0).map(video_object_details))
}

fn is_video_object(map: &Map<String, Value>) -> bool {
    match map.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("VideoObject"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("VideoObject")),
        _ => false,
    }
}

/// Depth-first search; `implied` marks objects found under a `videoObject` key.
fn find_video_object(value: &Value, implied: bool, depth: usize) -> Option<&Map<String, Value>> {
    if depth > MAX_JSON_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => {
            if (implied || is_video_object(map)) && map.get("contentUrl").and_then(fields::string).is_some() {
                return Some(map);
            }
            map.iter().find_map(|(key, child)| {
                find_video_object(child, key.eq_ignore_ascii_case("videoObject"), depth + 1)
            })
        }
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_video_object(item, implied, depth + 1)),
        _ => None,
    }
}

fn video_object_details(obj: &Map<String, Value>) -> VideoDetails {
    let get = |key: &str| obj.get(key).unwrap_or(&NULL);

    VideoDetails {
        video_url: fields::string(get("contentUrl")).unwrap_or_default(),
        title: fields::string(get("name")),
        description: fields::string(get("description")),
        thumbnail_url: first_url(get("thumbnailUrl")).or_else(|| first_url(get("thumbnail"))),
        author: ld_author(get("author")),
        duration_seconds: match get("duration") {
            Value::String(s) => parse_iso8601_duration(s).or_else(|| s.trim().parse().ok()),
            other => fields::float(other),
        },
        width: ld_dimension(get("width")),
        height: ld_dimension(get("height")),
        format: fields::string(get("encodingFormat")).and_then(|f| {
            format_from_mime(&f).or(Some(f)).map(|f| f.to_ascii_lowercase())
        }),
        ..VideoDetails::default()
    }
}

/// String, array of strings, or `{ "url": ... }` objects.
fn first_url(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => fields::string(value),
        Value::Array(items) => items.iter().find_map(first_url),
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("contentUrl"))
            .and_then(fields::string),
        _ => None,
    }
}

fn ld_dimension(value: &Value) -> Option<u32> {
    match value {
        Value::Object(map) => map.get("value").and_then(fields::dimension),
        other => fields::dimension(other),
    }
}

fn ld_author(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => fields::string(value),
        Value::Array(items) => items.iter().find_map(ld_author),
        Value::Object(map) => map
            .get("alternateName")
            .and_then(fields::string)
            .or_else(|| map.get("identifier").and_then(|id| id.get("value")).and_then(fields::string))
            .or_else(|| map.get("name").and_then(fields::string))
            .map(|name| {
                if name.starts_with('@') || name.contains(' ') {
                    name
                } else {
                    format!("@{}", name)
                }
            }),
        _ => None,
    }
}

/// `PT1M5.5S` style durations, in seconds.
pub fn parse_iso8601_duration(s: &str) -> Option<f64> {
    let caps = ISO_DURATION_RE.captures(s.trim())?;
    let mut total = 0.0;
    let mut any = false;
    for (index, factor) in [(1, 86_400.0), (2, 3_600.0), (3, 60.0), (4, 1.0)] {
        if let Some(m) = caps.get(index) {
            total += m.as_str().parse::<f64>().ok()? * factor;
            any = true;
        }
    }
    any.then_some(total)
}

// ============ Embedded state ============

pub fn find_embedded_state_video(html: &str) -> Option<VideoDetails> {
    embedded_state_video(&Html::parse_document(html))
}

/// `application/json` blobs as-is; inline scripts through the
/// `_sharedData` / `__additionalDataLoaded` assignments.
fn embedded_state_video(document: &Html) -> Option<VideoDetails> {
    let json_blobs = script_texts(document, r#"script[type="application/json"]"#);
    let inline_blobs = script_texts(document, "script:not([type]), script[type=\"text/javascript\"]")
        .into_iter()
        .filter_map(|text| {
            SHARED_DATA_RE
                .captures(text.trim())
                .or_else(|| ADDITIONAL_DATA_RE.captures(text.trim()))
                .map(|caps| caps[1].to_string())
        });

    inline_blobs
        .chain(json_blobs)
        .filter_map(|blob| serde_json::from_str::<Value>(blob.trim()).ok())
        .find_map(|doc| find_shortcode_media(&doc, 0).map(shortcode_media_details))
}

fn find_shortcode_media(value: &Value, depth: usize) -> Option<&Map<String, Value>> {
    if depth > MAX_JSON_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => {
            for key in ["shortcode_media", "xdt_shortcode_media"] {
                if let Some(Value::Object(media)) = map.get(key) {
                    let is_video = media.get("is_video").and_then(Value::as_bool).unwrap_or(false);
                    if is_video && media.get("video_url").and_then(fields::string).is_some() {
                        return Some(media);
                    }
                }
            }
            map.values().find_map(|child| find_shortcode_media(child, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|item| find_shortcode_media(item, depth + 1)),
        _ => None,
    }
}

fn shortcode_media_details(media: &Map<String, Value>) -> VideoDetails {
    let get = |key: &str| media.get(key).unwrap_or(&NULL);

    let caption = get("edge_media_to_caption")["edges"][0]["node"]["text"]
        .as_str()
        .or_else(|| get("caption")["text"].as_str())
        .map(str::trim)
        .filter(|c| !c.is_empty());

    VideoDetails {
        id: fields::string(get("shortcode")),
        video_url: fields::string(get("video_url")).unwrap_or_default(),
        thumbnail_url: fields::string(get("display_url"))
            .or_else(|| fields::string(get("thumbnail_src"))),
        title: fields::string(get("title"))
            .or_else(|| caption.map(|c| fields::truncate_text(c, MAX_TITLE_CHARS))),
        description: caption.map(str::to_string),
        author: fields::string(&get("owner")["username"]).map(|u| format!("@{}", u)),
        duration_seconds: fields::float(get("video_duration")),
        width: fields::dimension(&get("dimensions")["width"]),
        height: fields::dimension(&get("dimensions")["height"]),
        ..VideoDetails::default()
    }
}

// ============ Loose scan ============

/// Last resort over the raw page: escaped JSON fields first, then bare .mp4 URLs.
pub fn find_loose_video_url(html: &str) -> Option<String> {
    LOOSE_VIDEO_RES.iter().find_map(|re| {
        re.captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|candidate| candidate.contains(".mp4"))
            .map(unescape_js_url)
    })
}

fn unescape_js_url(raw: &str) -> String {
    raw.replace("\\u0026", "&")
        .replace("&amp;", "&")
        .replace('\\', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_META: &str = r#"<meta property="og:video" content="https://scontent.cdninstagram.com/v/meta.mp4?a=1&amp;b=2" />"#;
    const SECURE_META: &str = r#"<meta property="og:video:secure_url" content="https://scontent.cdninstagram.com/v/secure.mp4" />"#;
    const JSON_LD: &str = r#"<script type="application/ld+json">{"@context":"https://schema.org","@type":"VideoObject","name":"LD title","contentUrl":"https://scontent.cdninstagram.com/v/ld.mp4","thumbnailUrl":["https://cdn.example/ld.jpg"],"duration":"PT1M5S","width":"720","height":1280,"author":{"@type":"Person","alternateName":"ld_author"}}</script>"#;
    const SHARED_DATA: &str = r#"<script type="text/javascript">window._sharedData = {"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{"shortcode":"ABC123","is_video":true,"video_url":"https:\/\/scontent.cdninstagram.com\/v\/state.mp4?x=1&y=2","display_url":"https://cdn.example/state.jpg","video_duration":9.5,"dimensions":{"width":640,"height":800},"owner":{"username":"state_user"},"edge_media_to_caption":{"edges":[{"node":{"text":"State caption"}}]}}}}]}};</script>"#;

    fn page(parts: &[&str]) -> String {
        format!("<html><head>{}</head><body></body></html>", parts.join("\n"))
    }

    #[test]
    fn test_meta_tag_beats_json_ld() {
        let html = page(&[JSON_LD, VIDEO_META]);
        let found = extract_from_html(&html).unwrap();
        assert_eq!(found.source, MarkupSource::OgVideo);
        assert_eq!(found.details.video_url, "https://scontent.cdninstagram.com/v/meta.mp4?a=1&b=2");
    }

    #[test]
    fn test_priority_order_is_stable() {
        let all = page(&[SHARED_DATA, JSON_LD, SECURE_META, VIDEO_META]);
        assert_eq!(extract_from_html(&all).unwrap().source, MarkupSource::OgVideo);

        let no_og = page(&[SHARED_DATA, JSON_LD, SECURE_META]);
        assert_eq!(extract_from_html(&no_og).unwrap().source, MarkupSource::OgVideoSecure);

        let no_meta = page(&[SHARED_DATA, JSON_LD]);
        assert_eq!(extract_from_html(&no_meta).unwrap().source, MarkupSource::JsonLd);

        let state_only = page(&[SHARED_DATA]);
        assert_eq!(extract_from_html(&state_only).unwrap().source, MarkupSource::EmbeddedState);
    }

    #[test]
    fn test_meta_attribute_order_does_not_matter() {
        let html = page(&[r#"<meta content='https://cdn.example/rev.mp4' property='og:video'>"#]);
        assert_eq!(
            extract_from_html(&html).unwrap().details.video_url,
            "https://cdn.example/rev.mp4"
        );
    }

    #[test]
    fn test_json_ld_metadata() {
        let found = extract_from_html(&page(&[JSON_LD])).unwrap();
        let d = found.details;
        assert_eq!(d.video_url, "https://scontent.cdninstagram.com/v/ld.mp4");
        assert_eq!(d.title.as_deref(), Some("LD title"));
        assert_eq!(d.thumbnail_url.as_deref(), Some("https://cdn.example/ld.jpg"));
        assert_eq!(d.duration_seconds, Some(65.0));
        assert_eq!(d.width, Some(720));
        assert_eq!(d.height, Some(1280));
        assert_eq!(d.author.as_deref(), Some("@ld_author"));
    }

    #[test]
    fn test_json_ld_nested_under_post() {
        let html = page(&[
            r#"<script type="application/ld+json">[{"@type":"SocialMediaPosting","video":[{"@type":["VideoObject"],"contentUrl":"https://cdn.example/nested.mp4"}]}]</script>"#,
        ]);
        assert_eq!(
            find_json_ld_video(&html).unwrap().video_url,
            "https://cdn.example/nested.mp4"
        );
    }

    #[test]
    fn test_json_ld_video_object_key_without_type() {
        let html = page(&[
            r#"<script type="application/ld+json">{"videoObject":{"name":"Keyed","contentUrl":"https://cdn.example/keyed.mp4"}}</script>"#,
        ]);
        let d = find_json_ld_video(&html).unwrap();
        assert_eq!(d.video_url, "https://cdn.example/keyed.mp4");
        assert_eq!(d.title.as_deref(), Some("Keyed"));
    }

    #[test]
    fn test_json_ld_without_content_url_is_skipped() {
        let html = page(&[
            r#"<script type="application/ld+json">{"@type":"VideoObject","name":"No url"}</script>"#,
            r#"<script type="application/ld+json">not json at all</script>"#,
        ]);
        assert!(find_json_ld_video(&html).is_none());
        assert!(extract_from_html(&html).is_none());
    }

    #[test]
    fn test_embedded_state_metadata() {
        let d = extract_from_html(&page(&[SHARED_DATA])).unwrap().details;
        assert_eq!(d.video_url, "https://scontent.cdninstagram.com/v/state.mp4?x=1&y=2");
        assert_eq!(d.id.as_deref(), Some("ABC123"));
        assert_eq!(d.author.as_deref(), Some("@state_user"));
        assert_eq!(d.title.as_deref(), Some("State caption"));
        assert_eq!(d.duration_seconds, Some(9.5));
        assert_eq!(d.width, Some(640));
        assert_eq!(d.height, Some(800));
    }

    #[test]
    fn test_embedded_state_requires_is_video() {
        let html = page(&[
            r#"<script type="application/json">{"require":[{"shortcode_media":{"is_video":false,"video_url":"https://cdn.example/x.mp4"}}]}</script>"#,
        ]);
        assert!(find_embedded_state_video(&html).is_none());
    }

    #[test]
    fn test_additional_data_and_xdt_record() {
        let html = page(&[
            r#"<script>window.__additionalDataLoaded('/p/ABC123/',{"data":{"xdt_shortcode_media":{"is_video":true,"video_url":"https://cdn.example/xdt.mp4"}}});</script>"#,
        ]);
        assert_eq!(
            find_embedded_state_video(&html).unwrap().video_url,
            "https://cdn.example/xdt.mp4"
        );
    }

    #[test]
    fn test_opportunistic_meta_metadata() {
        let html = page(&[
            VIDEO_META,
            r#"<meta property="og:title" content="Reel &quot;sunset&quot;">"#,
            r#"<meta property="og:image" content="https://cdn.example/thumb.jpg">"#,
            r#"<meta property="og:description" content="1,234 likes - Watch this reel by @some.creator. on Instagram">"#,
            r#"<meta property="og:video:type" content="video/mp4">"#,
        ]);
        let d = extract_from_html(&html).unwrap().details;
        assert_eq!(d.title.as_deref(), Some("Reel \"sunset\""));
        assert_eq!(d.thumbnail_url.as_deref(), Some("https://cdn.example/thumb.jpg"));
        assert_eq!(d.author.as_deref(), Some("@some.creator"));
        assert_eq!(d.format.as_deref(), Some("mp4"));
    }

    #[test]
    fn test_winning_source_metadata_takes_precedence() {
        let html = page(&[
            JSON_LD,
            r#"<meta property="og:title" content="OG title">"#,
            r#"<meta property="og:image" content="https://cdn.example/og.jpg">"#,
        ]);
        let d = extract_from_html(&html).unwrap().details;
        assert_eq!(d.title.as_deref(), Some("LD title"));
        assert_eq!(d.thumbnail_url.as_deref(), Some("https://cdn.example/ld.jpg"));
    }

    #[test]
    fn test_page_without_video() {
        let html = page(&[
            r#"<meta property="og:title" content="Just a photo">"#,
            r#"<meta property="og:image" content="https://cdn.example/photo.jpg">"#,
        ]);
        assert!(extract_from_html(&html).is_none());
    }

    #[test]
    fn test_numeric_entities_are_decoded() {
        let html = page(&[
            VIDEO_META,
            r#"<meta property="og:description" content="Reel by &#064;alice on Instagram &#x2014; &quot;hi&quot;">"#,
        ]);
        let d = extract_from_html(&html).unwrap().details;
        assert_eq!(d.author.as_deref(), Some("@alice"));
        assert_eq!(
            d.description.as_deref(),
            Some("Reel by @alice on Instagram \u{2014} \"hi\"")
        );
    }

    #[test]
    fn test_loose_scan_is_last_resort() {
        let loose = r#"<script>require("Bootloader").handle({"items":[{"video_versions":[{"url":"https:\/\/scontent.cdninstagram.com\/v\/loose.mp4?a=1\u0026b=2"}]}]});</script>"#;

        let found = extract_from_html(&page(&[loose])).unwrap();
        assert_eq!(found.source, MarkupSource::LooseScan);
        assert_eq!(
            found.details.video_url,
            "https://scontent.cdninstagram.com/v/loose.mp4?a=1&b=2"
        );

        let with_meta = page(&[loose, VIDEO_META]);
        assert_eq!(extract_from_html(&with_meta).unwrap().source, MarkupSource::OgVideo);

        let with_state = page(&[loose, SHARED_DATA]);
        assert_eq!(extract_from_html(&with_state).unwrap().source, MarkupSource::EmbeddedState);
    }

    #[test]
    fn test_loose_scan_candidates() {
        assert_eq!(
            find_loose_video_url(r#"{"video_url":"https:\/\/cdn.example\/a.mp4"}"#).as_deref(),
            Some("https://cdn.example/a.mp4")
        );
        // video_url without .mp4 is skipped in favour of a later pattern
        assert_eq!(
            find_loose_video_url(r#"{"video_url":"https://cdn.example/a.m3u8","playback_url":"https://cdn.example/b.mp4"}"#).as_deref(),
            Some("https://cdn.example/b.mp4")
        );
        assert_eq!(
            find_loose_video_url("<a href=\"https://cdn.example/bare.mp4\">").as_deref(),
            Some("https://cdn.example/bare.mp4")
        );
        assert_eq!(find_loose_video_url("https://cdn.example/photo.jpg"), None);
    }

    #[test]
    fn test_author_patterns() {
        assert_eq!(author_from_description("Video by @alice_1"), Some("@alice_1".to_string()));
        assert_eq!(
            author_from_description("thanks @bob, video BY @carol"),
            Some("@carol".to_string())
        );
        assert_eq!(author_from_description("shared with @dave"), Some("@dave".to_string()));
        assert_eq!(author_from_description("no handle here"), None);
    }

    #[test]
    fn test_iso8601_durations() {
        assert_eq!(parse_iso8601_duration("PT15S"), Some(15.0));
        assert_eq!(parse_iso8601_duration("PT1H2M3.5S"), Some(3723.5));
        assert_eq!(parse_iso8601_duration("P1D"), Some(86_400.0));
        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("15"), None);
    }
}

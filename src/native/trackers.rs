// src/native/trackers.rs

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::bid::NativePayload;
use crate::openrtb::native_response::NativeResponse;

const EVENT_IMPRESSION: u64 = 1;
const METHOD_IMG: u64 = 1;
const METHOD_JS: u64 = 2;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackerEvent {
    Impression,
    Click,
}

/// 一次事件需要触发的 tracker
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrackerPlan {
    pub event: TrackerEvent,
    pub pixels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javascript: Option<String>,
}

/// 像素请求与 iframe 注入由宿主实现
pub trait TrackerSink {
    fn trigger_pixel(&self, url: &str);
    fn insert_html_into_iframe(&self, html: &str);
}

/// 选出事件对应的 tracker 列表；旧版字段为空时回退到 OpenRTB 响应
pub fn select_trackers(event: TrackerEvent, native: &NativePayload) -> TrackerPlan {
    let list = |name: &str| native.get(name).map(|v| v.string_list()).unwrap_or_default();

    let (mut pixels, mut javascript) = match event {
        TrackerEvent::Click => (list("clickTrackers"), None),
        TrackerEvent::Impression => {
            let javascript = native
                .get("javascriptTrackers")
                .map(|v| v.string_list().concat())
                .filter(|html| !html.is_empty());
            (list("impressionTrackers"), javascript)
        }
    };

    if let Some(ortb) = native.ortb.as_ref() {
        if pixels.is_empty() {
            pixels = ortb_pixels(event, ortb);
        }
        if event == TrackerEvent::Impression && javascript.is_none() {
            javascript = ortb_javascript(ortb);
        }
    }

    TrackerPlan {
        event,
        pixels,
        javascript,
    }
}

fn ortb_pixels(event: TrackerEvent, ortb: &NativeResponse) -> Vec<String> {
    match event {
        TrackerEvent::Click => ortb
            .link
            .as_ref()
            .map(|link| link.clicktrackers.clone())
            .unwrap_or_default(),
        TrackerEvent::Impression => ortb
            .imptrackers
            .iter()
            .cloned()
            .chain(
                ortb.eventtrackers
                    .iter()
                    .filter(|t| t.is(EVENT_IMPRESSION, METHOD_IMG))
                    .filter_map(|t| t.url.clone()),
            )
            .collect(),
    }
}

fn ortb_javascript(ortb: &NativeResponse) -> Option<String> {
    let scripts: String = ortb
        .eventtrackers
        .iter()
        .filter(|t| t.is(EVENT_IMPRESSION, METHOD_JS))
        .filter_map(|t| t.url.as_deref())
        .map(|url| format!("<script async src=\"{}\"></script>", url))
        .collect();

    let html = format!("{}{}", ortb.jstracker.as_deref().unwrap_or(""), scripts);
    Some(html).filter(|html| !html.is_empty())
}

/// **触发 native tracker**，返回处理的事件
pub fn fire_native_trackers(event: TrackerEvent, native: &NativePayload, sink: &dyn TrackerSink) -> TrackerEvent {
    let plan = select_trackers(event, native);
    debug!(?event, pixels = plan.pixels.len(), "firing native trackers");
    if let Some(html) = plan.javascript.as_deref() {
        sink.insert_html_into_iframe(html);
    }
    for url in &plan.pixels {
        sink.trigger_pixel(url);
    }
    plan.event
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        pixels: RefCell<Vec<String>>,
        html: RefCell<Vec<String>>,
    }

    impl TrackerSink for Recorder {
        fn trigger_pixel(&self, url: &str) {
            self.pixels.borrow_mut().push(url.to_string());
        }

        fn insert_html_into_iframe(&self, html: &str) {
            self.html.borrow_mut().push(html.to_string());
        }
    }

    fn payload(raw: serde_json::Value) -> NativePayload {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn click_fires_click_trackers_only() {
        let native = payload(json!({
            "clickTrackers": ["https://c/1", "https://c/2"],
            "impressionTrackers": ["https://i/1"],
            "javascriptTrackers": "<script src=\"https://j\"></script>"
        }));
        let sink = Recorder::default();

        assert_eq!(fire_native_trackers(TrackerEvent::Click, &native, &sink), TrackerEvent::Click);
        assert_eq!(*sink.pixels.borrow(), vec!["https://c/1", "https://c/2"]);
        assert!(sink.html.borrow().is_empty());
    }

    #[test]
    fn impression_fires_pixels_and_javascript() {
        let native = payload(json!({
            "clickTrackers": ["https://c/1"],
            "impressionTrackers": ["https://i/1"],
            "javascriptTrackers": "<script src=\"https://j\"></script>"
        }));
        let sink = Recorder::default();

        fire_native_trackers(TrackerEvent::Impression, &native, &sink);
        assert_eq!(*sink.pixels.borrow(), vec!["https://i/1"]);
        assert_eq!(*sink.html.borrow(), vec!["<script src=\"https://j\"></script>"]);
    }

    #[test]
    fn ortb_trackers_are_used_when_legacy_lists_are_absent() {
        let native = payload(json!({"ortb": {
            "link": {"url": "https://x", "clicktrackers": ["https://oc"]},
            "assets": [],
            "imptrackers": ["https://oi"],
            "eventtrackers": [
                {"event": 1, "method": 1, "url": "https://ev-img"},
                {"event": 1, "method": 2, "url": "https://ev.js"},
                {"event": 2, "method": 1, "url": "https://viewable"}
            ],
            "jstracker": "<script>t()</script>"
        }}));

        let click = select_trackers(TrackerEvent::Click, &native);
        assert_eq!(click.pixels, vec!["https://oc"]);
        assert_eq!(click.javascript, None);

        let impression = select_trackers(TrackerEvent::Impression, &native);
        assert_eq!(impression.pixels, vec!["https://oi", "https://ev-img"]);
        assert_eq!(
            impression.javascript.as_deref(),
            Some("<script>t()</script><script async src=\"https://ev.js\"></script>")
        );
    }

    #[test]
    fn null_lists_and_custom_event_codes_do_not_break_selection() {
        let native = payload(json!({"ortb": {
            "link": {"url": "https://x"},
            "imptrackers": null,
            "eventtrackers": [
                {"event": 555, "method": 1, "url": "https://custom"},
                {"event": 1, "method": 1, "url": "https://ev-img"}
            ]
        }}));

        let impression = select_trackers(TrackerEvent::Impression, &native);
        assert_eq!(impression.pixels, vec!["https://ev-img"]);
        assert_eq!(impression.javascript, None);
    }

    #[test]
    fn nothing_to_fire_for_empty_payload() {
        let plan = select_trackers(TrackerEvent::Impression, &NativePayload::default());
        assert!(plan.pixels.is_empty());
        assert!(plan.javascript.is_none());
    }
}

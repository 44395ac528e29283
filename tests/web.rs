//! Browser-side tests for the DOM-dependent parts of the behavior layer.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement};

use helios_frontend::app::{handle_card_click, NavOutcome};
use helios_frontend::config::Config;
use helios_frontend::utils::{debounce, is_valid_url, safe_select, safe_select_all, sanitize};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn card_link(label: &str) -> HtmlElement {
    let link = document()
        .create_element("a")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    link.set_text_content(Some(label));
    link
}

fn config_with_urls(urls: HashMap<&'static str, &'static str>) -> Config {
    Config {
        urls,
        ..Config::new()
    }
}

#[wasm_bindgen_test]
fn sanitize_rejects_non_strings() {
    assert_eq!(sanitize(&JsValue::NULL), "");
    assert_eq!(sanitize(&JsValue::UNDEFINED), "");
    assert_eq!(sanitize(&JsValue::from_f64(42.0)), "");
    assert_eq!(sanitize(&JsValue::TRUE), "");
}

#[wasm_bindgen_test]
fn sanitize_neutralizes_markup_in_strings() {
    let out = sanitize(&JsValue::from_str("<img src=x onerror=alert(1)>"));
    assert!(!out.contains('<'));
    assert!(!out.contains('>'));
    assert_eq!(out, "&lt;img src=x onerror=alert(1)&gt;");
}

#[wasm_bindgen_test]
fn url_validation_fails_closed() {
    let allowed = ["example.com"];
    assert!(is_valid_url("https://example.com/x", &allowed));
    assert!(is_valid_url("https://sub.example.com", &allowed));
    assert!(is_valid_url("http://example.com", &allowed));
    assert!(!is_valid_url("https://evil.com", &allowed));
    assert!(!is_valid_url("https://notexample.com", &allowed));
    assert!(!is_valid_url("ftp://example.com", &allowed));
    assert!(!is_valid_url("javascript:alert(1)", &allowed));
    assert!(!is_valid_url("not a url", &allowed));
    assert!(!is_valid_url("/relative/path", &allowed));
    assert!(!is_valid_url("", &allowed));
}

#[wasm_bindgen_test]
fn empty_allow_list_skips_the_host_check() {
    assert!(is_valid_url("https://anywhere.net", &[]));
    assert!(!is_valid_url("ftp://anywhere.net", &[]));
}

#[wasm_bindgen_test]
async fn debounce_collapses_a_burst_to_the_last_call() {
    let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut debounced = debounce(move |n: u32| sink.borrow_mut().push(n), 16);

    for n in 0..10 {
        debounced(n);
    }
    TimeoutFuture::new(50).await;

    assert_eq!(*seen.borrow(), vec![9]);
}

#[wasm_bindgen_test]
async fn debounce_reschedules_across_bursts() {
    let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut debounced = debounce(move |n: u32| sink.borrow_mut().push(n), 16);

    debounced(1);
    TimeoutFuture::new(50).await;
    debounced(2);
    debounced(3);
    TimeoutFuture::new(50).await;

    assert_eq!(*seen.borrow(), vec![1, 3]);
}

#[wasm_bindgen_test]
fn invalid_selectors_degrade_to_absent() {
    assert!(safe_select("??not-a-selector??").is_none());
    assert!(safe_select_all("??not-a-selector??").is_empty());
}

#[wasm_bindgen_test]
fn unmatched_selectors_are_a_quiet_no_op() {
    assert!(safe_select(".definitely-not-on-this-page").is_none());
    assert!(safe_select_all(".definitely-not-on-this-page").is_empty());
}

#[wasm_bindgen_test]
fn safe_select_finds_attached_elements() {
    let doc = document();
    let marker = doc.create_element("div").unwrap();
    marker.set_class_name("web-test-marker");
    doc.body().unwrap().append_child(&marker).unwrap();

    assert!(safe_select(".web-test-marker").is_some());
    assert_eq!(safe_select_all(".web-test-marker").len(), 1);

    marker.remove();
}

#[wasm_bindgen_test]
fn card_click_with_unconfigured_section_aborts() {
    let config = config_with_urls(HashMap::new());
    let link = card_link("Blog");

    assert_eq!(
        handle_card_click(&config, "blog", &link),
        NavOutcome::Unconfigured
    );
    // The link is untouched: no loading label, no dimming.
    assert_eq!(link.text_content().as_deref(), Some("Blog"));
    assert_eq!(link.style().get_property_value("opacity").unwrap(), "");
}

#[wasm_bindgen_test]
fn card_click_with_disallowed_url_is_refused() {
    let config = config_with_urls(HashMap::from([("blog", "https://evil.com/blog")]));
    let link = card_link("Blog");

    assert_eq!(
        handle_card_click(&config, "blog", &link),
        NavOutcome::Rejected
    );
    assert_eq!(link.text_content().as_deref(), Some("Blog"));
    assert_eq!(link.style().get_property_value("opacity").unwrap(), "");
}

#[wasm_bindgen_test]
fn card_click_with_allowed_url_marks_the_link_loading() {
    let mut config = config_with_urls(HashMap::from([("docs", "https://docs.helios.dev")]));
    // Push the scheduled redirect far past the end of the test run.
    config.timing.navigation_delay_ms = 600_000;
    config.max_redirect_delay_ms = 600_000;
    let link = card_link("Docs");

    assert_eq!(
        handle_card_click(&config, "docs", &link),
        NavOutcome::Scheduled
    );
    assert_eq!(link.text_content().as_deref(), Some("Opening..."));
    assert_eq!(link.style().get_property_value("opacity").unwrap(), "0.6");
}

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Url};

/// Escapes markup-significant characters so the result stays inert when
/// inserted as text content. Text-node encoding, not a filter: every
/// character survives, it just can't open a tag or an attribute.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Front door for values of unknown type coming off the page: anything that
/// is not a string sanitizes to the empty string.
pub fn sanitize(value: &JsValue) -> String {
    match value.as_string() {
        Some(text) => escape_text(&text),
        None => String::new(),
    }
}

/// True when `host` is one of the allowed domains or a subdomain of one.
pub fn host_matches_allow_list(host: &str, allowed: &[&str]) -> bool {
    allowed
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

/// Validates a navigation target. Fails closed: anything that does not parse
/// as an absolute http(s) URL is rejected. An empty allow-list skips the host
/// check entirely, so callers validating user-influenced or externally
/// configured targets must always pass a non-empty one.
pub fn is_valid_url(candidate: &str, allowed_domains: &[&str]) -> bool {
    let Ok(url) = Url::new(candidate) else {
        return false;
    };
    let protocol = url.protocol();
    if protocol != "http:" && protocol != "https:" {
        return false;
    }
    if allowed_domains.is_empty() {
        return true;
    }
    host_matches_allow_list(&url.hostname(), allowed_domains)
}

/// Trailing-edge debounce: the wrapped callable runs the underlying function
/// once per `wait_ms` quiet period, with the argument of the last call in the
/// burst. Each call cancels any pending run and reschedules.
pub fn debounce<T, F>(f: F, wait_ms: u32) -> impl FnMut(T)
where
    T: 'static,
    F: FnMut(T) + 'static,
{
    let f = Rc::new(RefCell::new(f));
    let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
    move |arg: T| {
        // A fired timeout may still sit here; cancelling it is a no-op.
        if let Some(previous) = pending.borrow_mut().take() {
            previous.cancel();
        }
        let f = Rc::clone(&f);
        let timeout = Timeout::new(wait_ms, move || {
            (&mut *f.borrow_mut())(arg);
        });
        *pending.borrow_mut() = Some(timeout);
    }
}

/// `document.querySelector` that treats a malformed selector as "nothing
/// matched": the failure is logged and `None` comes back.
pub fn safe_select(selector: &str) -> Option<Element> {
    let document = web_sys::window()?.document()?;
    match document.query_selector(selector) {
        Ok(found) => found,
        Err(err) => {
            warn!("invalid selector '{selector}': {err:?}");
            None
        }
    }
}

/// `document.querySelectorAll` with the same tolerance; a malformed selector
/// yields an empty list.
pub fn safe_select_all(selector: &str) -> Vec<Element> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Vec::new();
    };
    match document.query_selector_all(selector) {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(err) => {
            warn!("invalid selector '{selector}': {err:?}");
            Vec::new()
        }
    }
}

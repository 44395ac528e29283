use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, ErrorEvent, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::config::Config;
use crate::utils::{debounce, is_valid_url, safe_select, safe_select_all};

/// Quiet period for the scroll handler, roughly one frame at 60fps.
const SCROLL_DEBOUNCE_MS: u32 = 16;
/// Offset below which the header is always kept visible.
const HEADER_REVEAL_THRESHOLD: f64 = 100.0;
const CARD_HOVER_TRANSFORM: &str = "translateY(-6px) scale(1.02)";
const CARD_REVEAL_THRESHOLD: f64 = 0.1;
const CARD_REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
const LOADING_LABEL: &str = "Opening...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Bound,
    Running,
}

/// A registered event listener. Dropping the handle removes the listener and
/// releases the closure.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn add(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Self {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .unwrap();
        Self {
            target: target.clone(),
            event,
            callback,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// The card reveal observer plus the closure backing its callback. Dropping
/// the handle disconnects the observer.
struct ObserverHandle {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(web_sys::js_sys::Array, IntersectionObserver)>,
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Page orchestrator. Owns the config, the scroll tracker and every listener
/// and observer it registers, so dropping it tears the whole layer down.
pub struct App {
    config: Rc<Config>,
    last_scroll_top: Rc<Cell<f64>>,
    phase: Phase,
    listeners: Vec<Listener>,
    observer: Option<ObserverHandle>,
}

impl App {
    pub fn new(config: Rc<Config>) -> Self {
        Self {
            config,
            last_scroll_top: Rc::new(Cell::new(0.0)),
            phase: Phase::Uninitialized,
            listeners: Vec::new(),
            observer: None,
        }
    }

    /// Registers all listeners and runs one-time setup. Idempotent: a second
    /// call is a no-op, so listeners are bound exactly once.
    pub fn init(&mut self) {
        if self.phase != Phase::Uninitialized {
            return;
        }
        self.bind_window_events();
        self.phase = Phase::Bound;

        self.setup_nav_links();
        self.setup_cards();
        self.observer = self.observe_cards();
        // Paint the progress bar for the restored scroll position.
        handle_scroll(&self.config, &self.last_scroll_top);
        self.phase = Phase::Running;
        info!("page behavior layer running");
    }

    fn bind_window_events(&mut self) {
        let window = web_sys::window().unwrap();
        let target: &EventTarget = window.as_ref();

        {
            let config = self.config.clone();
            let tracker = self.last_scroll_top.clone();
            let mut on_scroll = debounce(
                move |_event: Event| handle_scroll(&config, &tracker),
                SCROLL_DEBOUNCE_MS,
            );
            self.listeners
                .push(Listener::add(target, "scroll", move |event| on_scroll(event)));
        }

        self.listeners.push(Listener::add(target, "error", |event| {
            match event.dyn_ref::<ErrorEvent>() {
                Some(err) => error!("uncaught script error: {}", err.message()),
                None => error!("uncaught script error"),
            }
        }));

        // The wasm module may start before or after the load event; when it
        // already fired, dismiss the overlay straight away.
        let document = window.document().unwrap();
        if document.ready_state() == "complete" {
            dismiss_loading_overlay(&self.config);
        } else {
            let config = self.config.clone();
            self.listeners.push(Listener::add(target, "load", move |_| {
                dismiss_loading_overlay(&config);
            }));
        }
    }

    fn setup_nav_links(&mut self) {
        for link in safe_select_all(self.config.selectors.nav_links) {
            let config = self.config.clone();
            self.listeners
                .push(Listener::add(link.as_ref(), "click", move |event| {
                    handle_nav_click(&config, &event);
                }));
        }
    }

    fn setup_cards(&mut self) {
        for card in safe_select_all(self.config.selectors.nav_cards) {
            let Some(section) = card.get_attribute(self.config.section_attr) else {
                warn!("navigation card without a {} attribute", self.config.section_attr);
                continue;
            };
            let inner = card
                .query_selector(self.config.selectors.card_link)
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            let Some(link) = inner else {
                warn!("navigation card '{section}' has no inner link");
                continue;
            };

            // Clicks anywhere on the card body navigate like the inner link;
            // clicks on the link itself are handled by its own listener below.
            {
                let config = self.config.clone();
                let section = section.clone();
                let link = link.clone();
                let link_selector = self.config.selectors.card_link;
                self.listeners
                    .push(Listener::add(card.as_ref(), "click", move |event| {
                        let on_link = event
                            .target()
                            .and_then(|t| t.dyn_into::<Element>().ok())
                            .and_then(|el| el.closest(link_selector).ok().flatten())
                            .is_some();
                        if on_link {
                            return;
                        }
                        handle_card_click(&config, &section, &link);
                    }));
            }

            {
                let config = self.config.clone();
                let section = section.clone();
                let link_for_handler = link.clone();
                self.listeners
                    .push(Listener::add(link.as_ref(), "click", move |event| {
                        event.prevent_default();
                        event.stop_propagation();
                        handle_card_click(&config, &section, &link_for_handler);
                    }));
            }

            if let Some(card) = card.dyn_ref::<HtmlElement>() {
                let enter_card = card.clone();
                self.listeners
                    .push(Listener::add(card.as_ref(), "mouseenter", move |_| {
                        let _ = enter_card
                            .style()
                            .set_property("transform", CARD_HOVER_TRANSFORM);
                    }));
                let leave_card = card.clone();
                self.listeners
                    .push(Listener::add(card.as_ref(), "mouseleave", move |_| {
                        let _ = leave_card.style().set_property("transform", "none");
                    }));
            }
        }
    }

    fn observe_cards(&self) -> Option<ObserverHandle> {
        let cards = safe_select_all(self.config.selectors.nav_cards);
        if cards.is_empty() {
            return None;
        }

        let callback = Closure::<dyn FnMut(web_sys::js_sys::Array, IntersectionObserver)>::new(
            move |entries: web_sys::js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    if let Some(card) = entry.target().dyn_ref::<HtmlElement>() {
                        reveal_card(card);
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(CARD_REVEAL_THRESHOLD));
        options.set_root_margin(CARD_REVEAL_ROOT_MARGIN);

        let observer = match IntersectionObserver::new_with_options(
            callback.as_ref().unchecked_ref(),
            &options,
        ) {
            Ok(observer) => observer,
            Err(err) => {
                error!("failed to construct intersection observer: {err:?}");
                return None;
            }
        };
        for card in &cards {
            observer.observe(card);
        }
        Some(ObserverHandle {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for App {
    // Listener and observer handles release themselves when the fields drop.
    fn drop(&mut self) {
        if self.phase == Phase::Running {
            info!("page behavior layer stopped");
        }
    }
}

/// Scroll progress through the page as a percentage. Zero when the content
/// does not overflow the viewport.
pub fn scroll_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let track = scroll_height - client_height;
    if track <= 0.0 {
        return 0.0;
    }
    (scroll_top / track * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMotion {
    Show,
    Hide,
}

/// The header hides while scrolling down past the threshold and comes back
/// on any upward scroll.
pub fn header_motion(last_top: f64, current_top: f64) -> HeaderMotion {
    if current_top > last_top && current_top > HEADER_REVEAL_THRESHOLD {
        HeaderMotion::Hide
    } else {
        HeaderMotion::Show
    }
}

/// Effective delay before a scheduled redirect fires.
pub fn navigation_delay_ms(config: &Config) -> u32 {
    config.timing.navigation_delay_ms.min(config.max_redirect_delay_ms)
}

fn handle_scroll(config: &Config, last_scroll_top: &Rc<Cell<f64>>) {
    let Some(doc_el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    let scroll_top = f64::from(doc_el.scroll_top());

    let progress = scroll_progress(
        scroll_top,
        f64::from(doc_el.scroll_height()),
        f64::from(doc_el.client_height()),
    );
    if let Some(bar) = safe_select(config.selectors.scroll_progress) {
        if let Some(bar) = bar.dyn_ref::<HtmlElement>() {
            let _ = bar.style().set_property("width", &format!("{progress:.2}%"));
        }
    }

    if let Some(header) = safe_select(config.selectors.header) {
        if let Some(header) = header.dyn_ref::<HtmlElement>() {
            let transform = match header_motion(last_scroll_top.get(), scroll_top) {
                HeaderMotion::Hide => "translateY(-100%)",
                HeaderMotion::Show => "translateY(0)",
            };
            let _ = header.style().set_property("transform", transform);
        }
    }

    last_scroll_top.set(scroll_top.max(0.0));
}

fn dismiss_loading_overlay(config: &Config) {
    let config = config.clone();
    Timeout::new(config.timing.loading_dismiss_ms, move || {
        // Absent overlay is fine, some pages render without one.
        if let Some(overlay) = safe_select(config.selectors.loading_overlay) {
            let _ = overlay.class_list().add_1(config.hidden_class);
        }
    })
    .forget();
}

/// In-page nav link handler. Only fragment targets are intercepted: a
/// fragment naming a configured section opens that section's URL in a new
/// browsing context, a fragment naming an element id scrolls to it, and
/// plain links keep their default navigation.
fn handle_nav_click(config: &Config, event: &Event) {
    let Some(link) = event
        .current_target()
        .and_then(|t| t.dyn_into::<Element>().ok())
    else {
        return;
    };
    let Some(href) = link.get_attribute("href") else {
        return;
    };
    let Some(fragment) = href.strip_prefix('#') else {
        return;
    };
    event.prevent_default();

    if let Some(url) = config.section_url(fragment) {
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.open_with_url_and_target(url, "_blank") {
                error!("failed to open {url}: {err:?}");
            }
        }
        return;
    }

    let target = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(fragment));
    if let Some(target) = target {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        target.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

/// What a card click decided to do. Lets callers (and tests) observe the
/// decision without waiting for the scheduled redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The section has no configured URL; nothing happens.
    Unconfigured,
    /// The configured URL failed validation; navigation is refused.
    Rejected,
    /// The link was marked loading and the redirect was scheduled.
    Scheduled,
}

pub fn handle_card_click(config: &Config, section: &str, link: &HtmlElement) -> NavOutcome {
    let Some(url) = config.section_url(section) else {
        warn!("no url configured for section '{section}'");
        return NavOutcome::Unconfigured;
    };
    if !is_valid_url(url, &config.allowed_domains) {
        error!("refusing navigation to disallowed url: {url}");
        return NavOutcome::Rejected;
    }

    let original_opacity = link.style().get_property_value("opacity").unwrap_or_default();
    let original_label = link.text_content();
    let _ = link.style().set_property("opacity", "0.6");
    link.set_text_content(Some(LOADING_LABEL));

    let link = link.clone();
    let url = url.to_string();
    Timeout::new(navigation_delay_ms(config), move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().replace(&url) {
            // Roll the link back to its pre-navigation look.
            if original_opacity.is_empty() {
                let _ = link.style().remove_property("opacity");
            } else {
                let _ = link.style().set_property("opacity", &original_opacity);
            }
            link.set_text_content(original_label.as_deref());
            error!("navigation to {url} failed: {err:?}");
        }
    })
    .forget();
    NavOutcome::Scheduled
}

fn reveal_card(card: &HtmlElement) {
    let style = card.style();
    let _ = style.set_property("transition", "opacity 0.6s ease, transform 0.6s ease");
    let _ = style.set_property("opacity", "1");
    let _ = style.set_property("transform", "translateY(0)");
}

//! Browser host.
//!
//! Wires [`PatchSession`] to the live page: `MutationObserver` for changes,
//! `DOMContentLoaded` for deferred start, `load` for the late sweep. Browsers
//! without `MutationObserver` fall back to a timed re-sweep.
//!
//! The entry points expect to be injected into the pages listed in
//! [`MATCH_PATTERNS`](super::injection::MATCH_PATTERNS) at document start.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlImageElement, MutationObserver, MutationObserverInit};

use super::dom::{Dom, MutationRecord, ObserveOptions, ReadyState};
use super::session::{ObservationMode, PageEvent, PatchSession, DEFAULT_POLL_INTERVAL};
use super::{AssetResolver, ExtensionAssets, FlagPatcher, InlineAssets};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    fn runtime_get_url(path: &str) -> String;
}

/// Live document behind the [`Dom`] trait.
pub struct WebDom {
    document: web_sys::Document,
    observer: Option<MutationObserver>,
}

impl WebDom {
    fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            observer: None,
        }
    }
}

fn elements(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Dom for WebDom {
    type Node = Element;

    fn images(&self) -> Vec<Element> {
        self.document
            .query_selector_all("img")
            .map(elements)
            .unwrap_or_default()
    }

    fn images_within(&self, node: &Element) -> Vec<Element> {
        node.query_selector_all("img").map(elements).unwrap_or_default()
    }

    fn is_element(&self, _node: &Element) -> bool {
        true
    }

    fn is_image(&self, node: &Element) -> bool {
        node.tag_name().eq_ignore_ascii_case("img")
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn src_property(&self, node: &Element) -> Option<String> {
        node.dyn_ref::<HtmlImageElement>().map(HtmlImageElement::src)
    }

    fn set_src_property(&mut self, node: &Element, value: &str) {
        if let Some(img) = node.dyn_ref::<HtmlImageElement>() {
            img.set_src(value);
        }
    }

    fn srcset_property(&self, node: &Element) -> Option<String> {
        node.dyn_ref::<HtmlImageElement>().map(HtmlImageElement::srcset)
    }

    fn set_srcset_property(&mut self, node: &Element, value: &str) {
        if let Some(img) = node.dyn_ref::<HtmlImageElement>() {
            img.set_srcset(value);
        }
    }

    fn observe(&mut self, options: &ObserveOptions) {
        let (Some(observer), Some(root)) = (&self.observer, self.document.document_element()) else {
            return;
        };
        let init = MutationObserverInit::new();
        init.set_child_list(options.child_list);
        init.set_subtree(options.subtree);
        init.set_attributes(options.attributes);
        if !options.attribute_filter.is_empty() {
            let filter: js_sys::Array = options
                .attribute_filter
                .iter()
                .map(|name| JsValue::from_str(name))
                .collect();
            init.set_attribute_filter(&filter);
        }
        let _ = observer.observe_with_options(&root, &init);
    }
}

fn convert_records(records: &js_sys::Array) -> Vec<MutationRecord<Element>> {
    records
        .iter()
        .filter_map(|value| value.dyn_into::<web_sys::MutationRecord>().ok())
        .filter_map(|record| {
            let target = record.target()?.dyn_into::<Element>().ok();
            match record.type_().as_str() {
                "childList" => Some(MutationRecord::ChildList {
                    target: target?,
                    added: elements(record.added_nodes()),
                }),
                "attributes" => Some(MutationRecord::Attributes {
                    target: target?,
                    name: record.attribute_name().unwrap_or_default(),
                }),
                _ => None,
            }
        })
        .collect()
}

struct State<R> {
    session: PatchSession<R>,
    dom: WebDom,
}

impl<R: AssetResolver> State<R> {
    fn event(&mut self, event: PageEvent) {
        self.session.on_event(&mut self.dom, event);
    }
}

fn ready_state(document: &web_sys::Document) -> ReadyState {
    match document.ready_state().as_str() {
        "loading" => ReadyState::Loading,
        "interactive" => ReadyState::Interactive,
        _ => ReadyState::Complete,
    }
}

fn event_listener<R: AssetResolver + 'static>(
    state: &Rc<RefCell<State<R>>>,
    event: PageEvent,
) -> Closure<dyn FnMut()> {
    let state = Rc::clone(state);
    Closure::new(move || state.borrow_mut().event(event))
}

/// Install the patcher on the current page for the lifetime of the page.
pub fn install<R: AssetResolver + 'static>(resolver: R) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let has_observer = js_sys::Reflect::has(&window, &JsValue::from_str("MutationObserver"))?;
    let mode = if has_observer {
        ObservationMode::Mutations
    } else {
        ObservationMode::Polling {
            interval: DEFAULT_POLL_INTERVAL,
        }
    };

    let state = Rc::new(RefCell::new(State {
        session: PatchSession::with_mode(FlagPatcher::new(resolver), mode),
        dom: WebDom::new(document.clone()),
    }));

    match mode {
        ObservationMode::Mutations => {
            let on_mutations = {
                let state = Rc::clone(&state);
                Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
                    move |records: js_sys::Array, _observer: MutationObserver| {
                        let records = convert_records(&records);
                        let mut guard = state.borrow_mut();
                        let State { session, dom } = &mut *guard;
                        session.on_mutations(dom, &records);
                    },
                )
            };
            let observer = MutationObserver::new(on_mutations.as_ref().unchecked_ref())?;
            on_mutations.forget();
            state.borrow_mut().dom.observer = Some(observer);
        }
        ObservationMode::Polling { interval } => {
            let on_tick = {
                let state = Rc::clone(&state);
                Closure::<dyn FnMut()>::new(move || {
                    let mut guard = state.borrow_mut();
                    let State { session, dom } = &mut *guard;
                    session.on_tick(dom);
                })
            };
            window.set_interval_with_callback_and_timeout_and_arguments_0(
                on_tick.as_ref().unchecked_ref(),
                interval.as_millis() as i32,
            )?;
            on_tick.forget();
        }
    }

    let ready = ready_state(&document);
    if ready == ReadyState::Loading {
        let on_ready = event_listener(&state, PageEvent::DomContentLoaded);
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
    }
    let on_load = event_listener(&state, PageEvent::Load);
    window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
    on_load.forget();

    let mut guard = state.borrow_mut();
    let State { session, dom } = &mut *guard;
    session.start(dom, ready);
    Ok(())
}

/// Content script entry: assets packaged with the extension.
#[wasm_bindgen(js_name = startExtension)]
pub fn start_extension() -> Result<(), JsValue> {
    install(ExtensionAssets::new(runtime_get_url("")))
}

/// Userscript entry: assets inlined as data URIs.
#[wasm_bindgen(js_name = startUserscript)]
pub fn start_userscript() -> Result<(), JsValue> {
    install(InlineAssets::bundled())
}

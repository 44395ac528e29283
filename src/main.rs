use std::cell::RefCell;
use std::rc::Rc;

use log::{info, Level};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Event;

use helios_frontend::{App, Config};

thread_local! {
    // The running app lives here so the beforeunload handler can drop it
    // and release its listeners and observer at page teardown.
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting page behavior layer");
    let mut app = App::new(Rc::new(Config::new()));
    app.init();
    APP.with(|slot| *slot.borrow_mut() = Some(app));

    // This closure is leaked on purpose; it has to outlive the app it tears
    // down, and the page is going away when it runs.
    let teardown = Closure::<dyn FnMut(Event)>::new(move |_| {
        APP.with(|slot| slot.borrow_mut().take());
    });
    web_sys::window()
        .unwrap()
        .add_event_listener_with_callback("beforeunload", teardown.as_ref().unchecked_ref())
        .unwrap();
    teardown.forget();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use web_sys::console;

    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    console::log_1(&"Starting BondCRM Frontend: initializing runtime config".into());

    wasm_bindgen_futures::spawn_local(async {
        bondcrm_frontend::config::init().await;
        console::log_1(&"Runtime config initialized".into());
        bondcrm_frontend::start_app();
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("bondcrm-frontend targets wasm32; build with trunk or --target wasm32-unknown-unknown");
}

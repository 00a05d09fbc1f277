//! WASM tests using wasm_bindgen_test
//!
//! Run with: wasm-pack test --headless --chrome --features wasm

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, MouseEvent, MouseEventInit};

wasm_bindgen_test_configure!(run_in_browser);

use skyglow::wasm::{apply_daily_gradient, install_click_hearts, start_uptime, BannerHandle, StarfieldHandle};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

// ============================================================================
// Daily gradient
// ============================================================================

#[wasm_bindgen_test]
fn test_daily_gradient_injected_once() {
    // Whichever call injects first, a repeat call is a no-op.
    apply_daily_gradient().unwrap();
    assert!(!apply_daily_gradient().unwrap());

    let styles = document().query_selector_all("#dynamic-gradient-style").unwrap();
    assert_eq!(styles.length(), 1);
    let css = styles.get(0).unwrap().text_content().unwrap();
    assert!(css.contains("linear-gradient"));
}

// ============================================================================
// Click hearts
// ============================================================================

#[wasm_bindgen_test]
fn test_click_spawns_heart() {
    install_click_hearts().unwrap();

    let init = MouseEventInit::new();
    init.set_client_x(40);
    init.set_client_y(60);
    init.set_bubbles(true);
    let event = MouseEvent::new_with_mouse_event_init_dict("click", &init).unwrap();
    document().body().unwrap().dispatch_event(&event).unwrap();

    let heart = document().query_selector(".click-heart").unwrap().unwrap();
    let heart: HtmlElement = heart.dyn_into().unwrap();
    assert_eq!(heart.text_content().as_deref(), Some("\u{2764}"));
    assert!(document().get_element_by_id("click-effect-style").is_some());
}

// ============================================================================
// Starfield
// ============================================================================

#[wasm_bindgen_test]
fn test_starfield_start_stop() {
    let field = StarfieldHandle::new(Some(7)).unwrap();
    assert!(!field.running());
    assert!(field.particles() >= 200);

    assert!(field.start());
    assert!(!field.start());
    assert!(field.running());

    assert!(field.stop());
    assert!(!field.stop());
    assert!(!field.running());
}

#[wasm_bindgen_test]
fn test_starfield_drop_removes_canvas() {
    let before = document().query_selector_all("canvas").unwrap().length();
    let field = StarfieldHandle::new(Some(1)).unwrap();
    assert_eq!(document().query_selector_all("canvas").unwrap().length(), before + 1);
    drop(field);
    assert_eq!(document().query_selector_all("canvas").unwrap().length(), before);
}

// ============================================================================
// Banner and uptime
// ============================================================================

#[wasm_bindgen_test]
fn test_banner_inactive_without_element() {
    // The test runner page has no banner element.
    let banner = BannerHandle::new(None).unwrap();
    assert!(!banner.active());
    assert!(banner.next_image().is_err());
    assert!(banner.set_image(3).is_err());
}

#[wasm_bindgen_test]
fn test_uptime_fills_element() {
    let doc = document();
    let element = doc.create_element("span").unwrap();
    element.set_id("runtime-count");
    doc.body().unwrap().append_child(&element).unwrap();

    let mut handle = start_uptime(Some("2020-01-01".to_string()), Some("Up".to_string())).unwrap();
    let text = element.text_content().unwrap();
    assert!(text.starts_with("Up "));
    assert!(text.ends_with(" s"));
    handle.stop();
    element.remove();
}

#[wasm_bindgen_test]
fn test_uptime_rejects_bad_date() {
    assert!(start_uptime(Some("not-a-date".to_string()), None).is_err());
}

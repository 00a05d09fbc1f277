//! WASM API module for browser/JS interop
//!
//! Binds the effects to a live page: a canvas-backed [`Surface`], the
//! `requestAnimationFrame` loop, timers, style injection and a
//! console-backed logger. All effect logic lives in the core modules; this
//! module only moves DOM events in and draw calls out.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use image::Rgba;
use js_sys::Date;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement, MouseEvent,
    Window,
};

use crate::banner::{self, BannerBackground, BannerCycler, BannerSurface, HourlyTimer};
use crate::config::{BannerConfig, HeartsConfig, SkyConfig, StarfieldConfig, UptimeConfig};
use crate::hearts::{self, ClickHearts};
use crate::sky::{self, daily_gradient};
use crate::starfield::{FrameLoop, Starfield};
use crate::surface::{GradientStop, LineCap, Paint, Point, Stroke, Surface};
use crate::uptime::Uptime;

/// Inline styles of the starfield canvas: a fixed overlay behind the page.
const CANVAS_STYLE: [(&str, &str); 6] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("pointer-events", "none"),
    ("z-index", "-1"),
    ("mix-blend-mode", "overlay"),
];

/// `log` backend writing to the browser console.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[skyglow] {}", record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Install the panic hook and console logger
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Raise console logging to debug level.
#[wasm_bindgen]
pub fn set_debug_logging(enabled: bool) {
    log::set_max_level(if enabled { log::LevelFilter::Debug } else { log::LevelFilter::Info });
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document() -> Result<Document, JsValue> {
    window()?.document().ok_or_else(|| JsValue::from_str("no document"))
}

/// Append `<style id=...>` to the head unless an element with that id exists.
///
/// Returns whether a new element was added.
fn inject_style(document: &Document, id: &str, css: &str) -> Result<bool, JsValue> {
    if document.get_element_by_id(id).is_some() {
        return Ok(false);
    }
    let style = document.create_element("style")?;
    style.set_id(id);
    style.set_text_content(Some(css));
    let head = document.head().ok_or_else(|| JsValue::from_str("document has no <head>"))?;
    head.append_child(&style)?;
    Ok(true)
}

/// CSS `rgba()` for a color.
fn css_color(c: Rgba<u8>) -> String {
    format!("rgba({}, {}, {}, {})", c[0], c[1], c[2], c[3] as f64 / 255.0)
}

/// Local wall-clock time from the JS `Date`.
fn local_now() -> NaiveDateTime {
    let d = Date::new_0();
    NaiveDate::from_ymd_opt(d.get_full_year() as i32, d.get_month() + 1, d.get_date())
        .and_then(|date| {
            date.and_hms_milli_opt(d.get_hours(), d.get_minutes(), d.get_seconds(), d.get_milliseconds())
        })
        .unwrap_or_default()
}

fn viewport(window: &Window) -> (f64, f64) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (dim(window.inner_width()), dim(window.inner_height()))
}

// ============================================================================
// Canvas surface
// ============================================================================

/// [`Surface`] over a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn trace(&self, points: &[Point]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        true
    }

    #[allow(deprecated)]
    fn set_stroke(&self, stroke: Stroke, paint: Paint) {
        self.ctx.set_line_width(stroke.width);
        self.ctx.set_line_cap(match stroke.cap {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
        });
        self.ctx.set_stroke_style(&JsValue::from_str(&css_color(paint.color)));
        self.ctx.set_global_alpha(paint.alpha);
    }
}

#[allow(deprecated)]
impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn fill_all(&mut self, paint: Paint) {
        let (w, h) = self.size();
        self.ctx.set_global_alpha(paint.alpha);
        self.ctx.set_fill_style(&JsValue::from_str(&css_color(paint.color)));
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke, paint: Paint) {
        if points.len() < 2 || !self.trace(points) {
            return;
        }
        self.set_stroke(stroke, paint);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Point], paint: Paint) {
        if points.len() < 3 || !self.trace(points) {
            return;
        }
        self.ctx.close_path();
        self.ctx.set_global_alpha(paint.alpha);
        self.ctx.set_fill_style(&JsValue::from_str(&css_color(paint.color)));
        self.ctx.fill();
    }

    fn stroke_polygon(&mut self, points: &[Point], stroke: Stroke, paint: Paint) {
        if points.len() < 2 || !self.trace(points) {
            return;
        }
        self.ctx.close_path();
        self.set_stroke(stroke, paint);
        self.ctx.stroke();
    }

    fn radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop], alpha: f64) {
        if radius <= 0.0 || stops.is_empty() {
            return;
        }
        let Ok(gradient) = self.ctx.create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        else {
            return;
        };
        for stop in stops {
            let _ = gradient.add_color_stop(stop.offset as f32, &css_color(stop.color));
        }
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style(&gradient);
        self.ctx.begin_path();
        if self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }
}

// ============================================================================
// Starfield
// ============================================================================

struct StarfieldState {
    frame_loop: FrameLoop,
    surface: CanvasSurface,
    raf_id: Option<i32>,
    on_frame: Option<Closure<dyn FnMut(f64)>>,
    on_resize: Option<Closure<dyn FnMut()>>,
    on_mouse: Option<Closure<dyn FnMut(MouseEvent)>>,
}

impl Drop for StarfieldState {
    fn drop(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(id) = self.raf_id.take() {
            let _ = window.cancel_animation_frame(id);
        }
        if let Some(cb) = &self.on_resize {
            let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
        }
        if let (Some(cb), Some(document)) = (&self.on_mouse, window.document()) {
            let _ = document.remove_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref());
        }
        self.surface.canvas.remove();
    }
}

/// Animated starfield on a fixed full-viewport canvas.
#[wasm_bindgen]
pub struct StarfieldHandle {
    state: Rc<RefCell<StarfieldState>>,
}

#[wasm_bindgen]
impl StarfieldHandle {
    /// Create the canvas and particle set. Call `start()` to animate.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Result<StarfieldHandle, JsValue> {
        let window = window()?;
        let document = document()?;
        let body = document.body().ok_or_else(|| JsValue::from_str("document has no <body>"))?;

        let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
        let style = canvas.style();
        for (name, value) in CANVAS_STYLE {
            style.set_property(name, value)?;
        }
        body.insert_before(&canvas, body.first_child().as_ref())?;

        let surface = CanvasSurface::new(canvas)?;
        let (width, height) = viewport(&window);
        surface.resize(width as u32, height as u32);

        let config = StarfieldConfig { seed, ..Default::default() };
        let state = Rc::new(RefCell::new(StarfieldState {
            frame_loop: FrameLoop::new(Starfield::new(config, width, height)),
            surface,
            raf_id: None,
            on_frame: None,
            on_resize: None,
            on_mouse: None,
        }));

        let weak = Rc::downgrade(&state);
        let on_resize = Closure::<dyn FnMut()>::new(move || {
            let (Some(state), Some(window)) = (weak.upgrade(), web_sys::window()) else {
                return;
            };
            let (width, height) = viewport(&window);
            let mut s = state.borrow_mut();
            s.surface.resize(width as u32, height as u32);
            s.frame_loop.field_mut().resize(width, height);
        });
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

        let weak = Rc::downgrade(&state);
        let on_mouse = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().frame_loop.field_mut().set_mouse(e.client_x() as f64, e.client_y() as f64);
            }
        });
        document.add_event_listener_with_callback("mousemove", on_mouse.as_ref().unchecked_ref())?;

        let weak = Rc::downgrade(&state);
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            if let Some(state) = weak.upgrade() {
                render_frame(&state);
            }
        });

        {
            let mut s = state.borrow_mut();
            s.on_frame = Some(on_frame);
            s.on_resize = Some(on_resize);
            s.on_mouse = Some(on_mouse);
        }
        log::info!("starfield created at {}x{}", width, height);
        Ok(Self { state })
    }

    /// Start animating. Returns false if already running.
    pub fn start(&self) -> bool {
        let started = self.state.borrow_mut().frame_loop.start();
        if started {
            request_frame(&self.state);
        }
        started
    }

    /// Stop animating and cancel the pending frame. Returns false if not running.
    pub fn stop(&self) -> bool {
        let mut s = self.state.borrow_mut();
        if let (Some(id), Some(window)) = (s.raf_id.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        s.frame_loop.stop()
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.state.borrow().frame_loop.is_running()
    }

    /// Frames rendered so far
    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.state.borrow().frame_loop.frames() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn particles(&self) -> usize {
        self.state.borrow().frame_loop.field().particles().len()
    }
}

fn render_frame(state: &Rc<RefCell<StarfieldState>>) {
    {
        let mut s = state.borrow_mut();
        s.raf_id = None;
        let StarfieldState { frame_loop, surface, .. } = &mut *s;
        if frame_loop.tick(surface, Date::now()).is_none() {
            return;
        }
    }
    request_frame(state);
}

fn request_frame(state: &Rc<RefCell<StarfieldState>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let mut s = state.borrow_mut();
    let id = s.on_frame.as_ref().and_then(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    s.raf_id = id;
}

// ============================================================================
// Click hearts and daily gradient
// ============================================================================

/// Spawn a floating heart at every click on the page.
#[wasm_bindgen]
pub fn install_click_hearts() -> Result<(), JsValue> {
    let document = document()?;
    inject_style(&document, hearts::STYLE_ID, hearts::STYLESHEET)?;

    let config = HeartsConfig::default();
    let registry = Rc::new(RefCell::new(ClickHearts::new(&config)));
    let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
        if let Err(err) = spawn_heart(&registry, &config, e.client_x() as f64, e.client_y() as f64) {
            log::warn!("click heart failed: {:?}", err);
        }
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    // Lives as long as the page
    on_click.forget();
    Ok(())
}

fn spawn_heart(registry: &Rc<RefCell<ClickHearts>>, config: &HeartsConfig, x: f64, y: f64) -> Result<(), JsValue> {
    let document = document()?;
    let body = document.body().ok_or_else(|| JsValue::from_str("document has no <body>"))?;

    let marker = registry.borrow_mut().click(x, y, Date::now());
    let element = document.create_element("div")?;
    element.set_class_name(hearts::MARKER_CLASS);
    element.set_text_content(Some(hearts::GLYPH));
    element.set_attribute("style", &marker.inline_style(config))?;
    body.append_child(&element)?;

    let weak = Rc::downgrade(registry);
    let id = marker.id;
    let remove = Closure::once_into_js(move || {
        element.remove();
        if let Some(registry) = weak.upgrade() {
            registry.borrow_mut().remove(id);
        }
    });
    window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        remove.unchecked_ref(),
        marker.lifetime_ms as i32,
    )?;
    Ok(())
}

/// Inject today's gradient background. Returns false if already present.
#[wasm_bindgen]
pub fn apply_daily_gradient() -> Result<bool, JsValue> {
    let document = document()?;
    let gradient = daily_gradient(local_now().date());
    let injected = inject_style(&document, sky::STYLE_ID, &gradient.stylesheet(&SkyConfig::default()))?;
    if injected {
        log::info!("daily gradient set: {}, {}", gradient.start, gradient.end);
    }
    Ok(injected)
}

// ============================================================================
// Banner
// ============================================================================

/// Banner element driven through its inline style.
struct DomBanner {
    element: HtmlElement,
}

impl BannerSurface for DomBanner {
    fn apply_background(&mut self, background: &BannerBackground) {
        let style = self.element.style();
        for (name, value) in background.declarations() {
            if let Err(e) = style.set_property(name, &value) {
                log::warn!("failed to set {}: {:?}", name, e);
            }
        }
    }

    fn preload(&mut self, url: &str) {
        match HtmlImageElement::new() {
            Ok(img) => {
                img.set_src(url);
                log::debug!("preloading {}", url);
            }
            Err(e) => log::warn!("failed to preload {}: {:?}", url, e),
        }
    }
}

struct BannerState {
    cycler: BannerCycler<DomBanner>,
    timeout: Option<i32>,
}

/// Hourly banner image cycling on the home page.
#[wasm_bindgen]
pub struct BannerHandle {
    state: Rc<RefCell<BannerState>>,
}

#[wasm_bindgen]
impl BannerHandle {
    /// Locate the banner and start cycling. Off the home page, or without a
    /// banner element, the handle stays inactive.
    #[wasm_bindgen(constructor)]
    pub fn new(base_path: Option<String>) -> Result<BannerHandle, JsValue> {
        let window = window()?;
        let document = document()?;

        let mut config = BannerConfig::default();
        if let Some(base_path) = base_path {
            config.base_path = base_path;
        }

        let path = window.location().pathname()?;
        let has_home_class =
            document.body().map(|b| b.class_list().contains(banner::HOME_PAGE_CLASS)).unwrap_or(false);
        let on_home_page = banner::is_home_page(&path, has_home_class);

        let element = if on_home_page {
            banner::locate(&config.selectors, |selector| {
                document.query_selector(selector).ok().flatten().and_then(|e| e.dyn_into::<HtmlElement>().ok())
            })
        } else {
            None
        };

        let state = Rc::new(RefCell::new(BannerState { cycler: BannerCycler::new(config), timeout: None }));
        if on_home_page {
            let timer = state.borrow_mut().cycler.activate(element.map(|element| DomBanner { element }), local_now());
            if let Some(timer) = timer {
                arm(&state, timer);
            }
        }
        Ok(Self { state })
    }

    /// Advance to the next image
    pub fn next_image(&self) -> Result<u32, JsValue> {
        self.state.borrow_mut().cycler.next_image().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Jump to image `index` (1-based)
    pub fn set_image(&self, index: u32) -> Result<(), JsValue> {
        self.state.borrow_mut().cycler.set_image(index).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Cancel the pending hourly switch
    pub fn stop(&self) {
        let mut s = self.state.borrow_mut();
        s.cycler.stop();
        if let (Some(id), Some(window)) = (s.timeout.take(), web_sys::window()) {
            window.clear_timeout_with_handle(id);
        }
    }

    /// Re-arm the hourly switch if none is pending
    pub fn resume(&self) {
        let timer = self.state.borrow_mut().cycler.resume(local_now());
        if let Some(timer) = timer {
            arm(&self.state, timer);
        }
    }

    #[wasm_bindgen(getter)]
    pub fn current_index(&self) -> u32 {
        self.state.borrow().cycler.current_index()
    }

    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.state.borrow().cycler.state() == banner::CycleState::Active
    }
}

/// Schedule a JS timeout for `timer`, replacing any pending one.
fn arm(state: &Rc<RefCell<BannerState>>, timer: HourlyTimer) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = Rc::downgrade(state);
    let callback = Closure::once_into_js(move || {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let next = {
            let mut s = state.borrow_mut();
            s.timeout = None;
            s.cycler.fire(timer.id, local_now())
        };
        if let Some(next) = next {
            arm(&state, next);
        }
    });

    let delay = i32::try_from(timer.delay_ms).unwrap_or(i32::MAX);
    let mut s = state.borrow_mut();
    if let Some(old) = s.timeout.take() {
        window.clear_timeout_with_handle(old);
    }
    s.timeout = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay).ok();
}

// ============================================================================
// Uptime
// ============================================================================

/// Once-a-second uptime refresh.
#[wasm_bindgen]
pub struct UptimeHandle {
    interval: Option<i32>,
    _tick: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl UptimeHandle {
    pub fn stop(&mut self) {
        if let (Some(id), Some(window)) = (self.interval.take(), web_sys::window()) {
            window.clear_interval_with_handle(id);
        }
    }
}

impl Drop for UptimeHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start refreshing the uptime element every second.
///
/// `start_date` is `YYYY-MM-DD`; both arguments fall back to the defaults.
#[wasm_bindgen]
pub fn start_uptime(start_date: Option<String>, label: Option<String>) -> Result<UptimeHandle, JsValue> {
    let mut config = UptimeConfig::default();
    if let Some(date) = start_date {
        config.start_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| JsValue::from_str(&format!("invalid start date '{}': {}", date, e)))?;
    }
    if let Some(label) = label {
        config.label = label;
    }

    let mut warned = !refresh_uptime(&config);
    if warned {
        log::warn!("uptime element #{} not found", config.element_id);
    }
    let tick = Closure::<dyn FnMut()>::new(move || {
        if !refresh_uptime(&config) && !warned {
            log::warn!("uptime element #{} not found", config.element_id);
            warned = true;
        }
    });
    let interval =
        window()?.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), 1000)?;
    Ok(UptimeHandle { interval: Some(interval), _tick: tick })
}

/// Write the uptime text into its element. Returns false if it is missing.
fn refresh_uptime(config: &UptimeConfig) -> bool {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&config.element_id));
    let Some(element) = element else {
        return false;
    };
    let text = Uptime::since(config.start_date, local_now()).labelled(&config.label).to_string();
    element.set_text_content(Some(&text));
    true
}

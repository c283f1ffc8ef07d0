//! WebAssembly bindings for Advanced Blocking
//!
//! The host (extension background page, native app bridge) loads a JSON rule
//! list once and then asks for the page data of each URL. Reloading swaps the
//! rule set atomically; queries in flight finish on the rules they started with.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use ab_compiler::{load_into, CompileOptions, LoadReport, Strictness};
use ab_core::{BlockerData, ContentBlocker};
use wasm_bindgen::prelude::*;

static BLOCKER: OnceLock<ContentBlocker> = OnceLock::new();
static LOADED: AtomicBool = AtomicBool::new(false);

fn blocker() -> &'static ContentBlocker {
    BLOCKER.get_or_init(ContentBlocker::new)
}

fn load_rules(rules_json: &str, strict: bool) -> Result<LoadReport, String> {
    let options = CompileOptions {
        strictness: if strict { Strictness::Strict } else { Strictness::Lenient },
        ..CompileOptions::default()
    };

    let report = load_into(blocker(), rules_json, &options).map_err(|e| e.to_string())?;
    LOADED.store(true, Ordering::Release);
    Ok(report)
}

fn data_for(url: &str) -> String {
    if !LOADED.load(Ordering::Acquire) {
        return BlockerData::new().to_json();
    }
    blocker().get_data(url).to_json()
}

/// Compile a JSON rule list and make it the active one.
///
/// Returns `{ rules, skipped, unsupported, diagnostics }`. On error the
/// previously loaded rules stay active.
#[wasm_bindgen]
pub fn load(rules_json: &str, strict: Option<bool>) -> Result<JsValue, JsValue> {
    let report = load_rules(rules_json, strict.unwrap_or(false))
        .map_err(|e| JsValue::from_str(&format!("Failed to load rules: {}", e)))?;

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"rules".into(), &JsValue::from(report.rules as u32));
    let _ = js_sys::Reflect::set(&result, &"skipped".into(), &JsValue::from(report.skipped() as u32));
    let _ = js_sys::Reflect::set(&result, &"unsupported".into(), &JsValue::from(report.unsupported() as u32));

    let diagnostics = js_sys::Array::new();
    for diagnostic in &report.diagnostics {
        let entry = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&entry, &"index".into(), &JsValue::from(diagnostic.index as u32));
        let _ = js_sys::Reflect::set(&entry, &"message".into(), &JsValue::from_str(&diagnostic.message));
        diagnostics.push(&entry);
    }
    let _ = js_sys::Reflect::set(&result, &"diagnostics".into(), &diagnostics);

    Ok(result.into())
}

#[wasm_bindgen]
pub fn is_loaded() -> bool {
    LOADED.load(Ordering::Acquire)
}

/// Page data for `url` as a JSON string:
/// `{"scripts":[],"css":[],"cssExtended":[],"cssInject":[],"scriptlets":[]}`.
#[wasm_bindgen]
pub fn get_data(url: &str) -> String {
    data_for(url)
}

#[wasm_bindgen]
pub fn get_rule_count() -> u32 {
    if !is_loaded() {
        return 0;
    }
    blocker().rule_count() as u32
}

#[wasm_bindgen]
pub fn get_index_info() -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"loaded".into(), &JsValue::from(is_loaded()));

    if is_loaded() {
        let stats = blocker().snapshot().stats();
        let _ = js_sys::Reflect::set(&result, &"shortcutBuckets".into(), &JsValue::from(stats.shortcut_buckets as u32));
        let _ = js_sys::Reflect::set(&result, &"domainBuckets".into(), &JsValue::from(stats.domain_buckets as u32));
        let _ = js_sys::Reflect::set(&result, &"fallbackRules".into(), &JsValue::from(stats.fallback_rules as u32));
        let _ = js_sys::Reflect::set(&result, &"largestBucket".into(), &JsValue::from(stats.largest_bucket as u32));
    }

    result.into()
}

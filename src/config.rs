use ripple_core::{EffectConfig, Preset};
use wasm_bindgen::JsValue;

/// Effect configuration from whatever the page passed to `attach`.
///
/// `undefined`/`null` give the defaults, a string names a preset, and an
/// object overrides individual fields (camelCase) on top of the defaults.
pub fn resolve(value: &JsValue) -> anyhow::Result<EffectConfig> {
    if value.is_undefined() || value.is_null() {
        return Ok(EffectConfig::default());
    }
    if let Some(name) = value.as_string() {
        return Preset::from_name(&name)
            .map(Preset::config)
            .ok_or_else(|| anyhow::anyhow!("unknown preset '{name}'"));
    }
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .into();
    let config = serde_json::from_str(&json)?;
    Ok(config)
}

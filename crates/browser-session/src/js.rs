//! Injected scripts for descriptor harvesting and cross-frame mutation.
//!
//! Harvest scripts tag every control with a `data-ap-idx` / `data-ap-btn`
//! attribute so later operations can re-resolve the live element within the
//! same page state. Same-origin iframes are included because embedded-widget
//! application forms are common; cross-origin frames throw and are skipped.

/// Collects reachable documents: the main document plus any same-origin
/// iframe documents.
const DOCS_PRELUDE: &str = r#"
  const docs = [document];
  for (const f of document.querySelectorAll('iframe')) {
    try { if (f.contentDocument) docs.push(f.contentDocument); } catch (e) {}
  }
"#;

/// Returns a JSON array of raw field records across all reachable frames.
pub fn harvest_fields() -> String {
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  const out = [];
  let idx = 0;
  for (const doc of docs) {{
    for (const el of doc.querySelectorAll('input, select, textarea')) {{
      const type = (el.getAttribute('type') || '').toLowerCase();
      if (type === 'hidden') continue;
      el.setAttribute('data-ap-idx', String(idx));
      let label = '';
      if (el.id) {{
        const l = doc.querySelector('label[for="' + el.id.replace(/"/g, '\\"') + '"]');
        if (l) label = l.textContent.trim();
      }}
      if (!label) {{
        const wrap = el.closest('label');
        if (wrap) label = wrap.textContent.trim();
      }}
      if (!label) label = el.getAttribute('aria-label') || '';
      out.push({{
        index: idx,
        tag: el.tagName.toLowerCase(),
        type: type,
        name: el.getAttribute('name') || '',
        id: el.id || '',
        placeholder: el.getAttribute('placeholder') || '',
        label: label.slice(0, 200),
        required: el.required === true || el.getAttribute('aria-required') === 'true',
        value: el.value || '',
        visible: !!(el.offsetParent || el.getClientRects().length)
      }});
      idx++;
    }}
  }}
  return out;
}})()"#
    )
}

/// Returns a JSON array of clickable-control records.
pub fn harvest_buttons() -> String {
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  const out = [];
  let idx = 0;
  for (const doc of docs) {{
    const sel = 'button, input[type="submit"], input[type="button"], a[role="button"], [role="button"]';
    for (const el of doc.querySelectorAll(sel)) {{
      el.setAttribute('data-ap-btn', String(idx));
      out.push({{
        handle: idx,
        text: (el.innerText || el.value || '').trim().slice(0, 120),
        id: el.id || '',
        type_attr: (el.getAttribute('type') || '').toLowerCase(),
        aria_label: el.getAttribute('aria-label') || '',
        is_visible: !!(el.offsetParent || el.getClientRects().length)
      }});
      idx++;
    }}
  }}
  return out;
}})()"#
    )
}

fn find_tagged(attr: &str, idx: usize) -> String {
    format!(
        r#"
  let el = null;
  for (const doc of docs) {{
    el = doc.querySelector('[{attr}="{idx}"]');
    if (el) break;
  }}
  if (!el) return false;
"#
    )
}

/// Set a text-like control's value, firing the events client-side
/// validation listens for.
pub fn set_text(idx: usize, text: &str) -> String {
    let literal = js_string(text);
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  {find}
  el.focus();
  el.value = {literal};
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()"#,
        find = find_tagged("data-ap-idx", idx),
    )
}

/// Clear a text-like control before typing.
pub fn clear_value(idx: usize) -> String {
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  {find}
  el.value = '';
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  return true;
}})()"#,
        find = find_tagged("data-ap-idx", idx),
    )
}

/// Choose a select option by value, falling back to matching the visible
/// option label.
pub fn select_option(idx: usize, value: &str) -> String {
    let literal = js_string(value);
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  {find}
  const want = {literal};
  el.value = want;
  if (el.value !== want) {{
    const lower = want.toLowerCase();
    for (const opt of el.options) {{
      if (opt.text.trim().toLowerCase() === lower) {{ el.value = opt.value; break; }}
    }}
  }}
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return el.value !== '';
}})()"#,
        find = find_tagged("data-ap-idx", idx),
    )
}

/// Click a checkbox/radio only when its state differs from the target.
pub fn set_checked(idx: usize, checked: bool) -> String {
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  {find}
  if (el.checked !== {checked}) el.click();
  return true;
}})()"#,
        find = find_tagged("data-ap-idx", idx),
    )
}

/// Click a harvested button by handle.
pub fn click_button(handle: usize) -> String {
    format!(
        r#"(() => {{
  {DOCS_PRELUDE}
  {find}
  el.click();
  return true;
}})()"#,
        find = find_tagged("data-ap-btn", handle),
    )
}

/// Escape an arbitrary string as a JS string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

//! Styles, selectors and scripts used by the interstitial suppressor
//!
//! Scripts are expressions that evaluate to a JSON-serializable value.

/// Elements that look like consent banners or modal overlays
///
/// Attribute matches are case-insensitive. `cookieless` is a common word in
/// analytics class names and is never a banner.
pub const CONSENT_SELECTORS: &[&str] = &[
    r#"[id*="cookie" i]:not([id*="cookieless" i])"#,
    r#"[class*="cookie" i]:not([class*="cookieless" i])"#,
    r#"[id*="consent" i]"#,
    r#"[class*="consent" i]"#,
    r#"[id*="gdpr" i]"#,
    r#"[class*="gdpr" i]"#,
    r#"[aria-modal="true"]"#,
    ".modal-backdrop",
    ".cookie-banner",
    ".consent-banner",
];

/// "Accept"-style buttons, tried in order until one click lands
pub const ACCEPT_BUTTON_SELECTORS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "#accept-recommended-btn-handler",
    "button.fc-cta-consent",
    "#didomi-notice-agree-button",
    r#"[data-testid="uc-accept-all-button"]"#,
    r#"button[aria-label="Accept all" i]"#,
    r#"button[aria-label="Accept" i]"#,
    r#"button[id*="accept" i]"#,
    r#"button[class*="accept" i]"#,
];

/// Zero animation and transition timing, hide embedded media
pub const ANIMATION_KILL_CSS: &str = r"
*, *::before, *::after {
    animation-duration: 0s !important;
    animation-delay: 0s !important;
    animation-iteration-count: 1 !important;
    transition-duration: 0s !important;
    transition-delay: 0s !important;
    scroll-behavior: auto !important;
    caret-color: transparent !important;
}
video, iframe, embed, object {
    display: none !important;
}
";

/// Remove leftover media and force every image to load eagerly
///
/// Reassigning `src` restarts a lazy image's fetch; data URIs and
/// already-complete images are left alone.
pub const MEDIA_CLEANUP_SCRIPT: &str = r"
(() => {
    let removed = 0;
    document.querySelectorAll('video, iframe, embed, object').forEach(el => {
        el.remove();
        removed++;
    });

    let reloaded = 0;
    document.querySelectorAll('img').forEach(img => {
        img.loading = 'eager';
        const src = img.getAttribute('src');
        if (src && !src.startsWith('data:') && !img.complete) {
            img.src = src;
            reloaded++;
        }
    });

    return { removed, reloaded };
})()
";

/// Selector list that never matches the root elements
fn guarded(selector: &str) -> String {
    format!("{selector}:not(html):not(body)")
}

/// Stylesheet hiding every consent-banner match
#[must_use]
pub fn consent_hide_css() -> String {
    let selectors: Vec<String> = CONSENT_SELECTORS.iter().map(|s| guarded(s)).collect();
    format!(
        "{} {{\n    display: none !important;\n    visibility: hidden !important;\n}}\n",
        selectors.join(",\n")
    )
}

/// Script removing consent-banner matches and modal dialogs from the DOM
///
/// Evaluates to the number of removed elements.
pub fn consent_removal_script() -> serde_json::Result<String> {
    let selectors: Vec<String> = CONSENT_SELECTORS.iter().map(|s| guarded(s)).collect();
    let selector_list = serde_json::to_string(&selectors.join(", "))?;
    Ok(format!(
        r"
(() => {{
    let removed = 0;
    document.querySelectorAll({selector_list}).forEach(el => {{
        if (el.isConnected) {{
            el.remove();
            removed++;
        }}
    }});
    document.querySelectorAll('dialog[open], [role=dialog][aria-modal=true]').forEach(el => {{
        el.remove();
        removed++;
    }});
    document.documentElement.style.removeProperty('overflow');
    if (document.body) {{
        document.body.style.removeProperty('overflow');
    }}
    return removed;
}})()
"
    ))
}

//! Assertions for testing renderable configs in downstream crates.

use crate::render::{RenderOptions, Renderable, Renderer};

fn render_or_panic<R: Renderable>(cfg: &mut R, options: &RenderOptions) -> String {
    match Renderer::default().render(cfg, options) {
        Ok(text) => text,
        Err(e) => panic!("rendering failed: {e}"),
    }
}

/// Render `cfg` and assert the output contains `expected`. Returns the output.
pub fn assert_render_in<R: Renderable>(cfg: &mut R, expected: &str) -> String {
    assert_render_in_with(cfg, &RenderOptions::default(), expected)
}

pub fn assert_render_in_with<R: Renderable>(
    cfg: &mut R,
    options: &RenderOptions,
    expected: &str,
) -> String {
    let text = render_or_panic(cfg, options);
    assert!(text.contains(expected), "expected {expected:?} in rendered output:\n{text}");
    text
}

/// Render `cfg` and assert the output equals `expected`.
pub fn assert_render_eq<R: Renderable>(cfg: &mut R, expected: &str) {
    let text = render_or_panic(cfg, &RenderOptions::default());
    assert_eq!(text, expected, "rendered output differs");
}

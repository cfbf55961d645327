//! Renderable configs and the rendering pipeline

use super::context::{ContextBuilder, ContextLayer};
use super::engine::TemplateEngine;
use super::output::{resolve_output_path, write_output, WriteOutcome};
use super::template::TemplateLocator;
use crate::conf::ConfigObject;
use crate::domain::Settings;
use crate::error::{Result, TextconfError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A configuration that knows how to render itself through a template.
///
/// Every hook has a default, so a plain `#[derive(Serialize)]` struct with a
/// `_template_` field is enough to render.
pub trait Renderable: Serialize {
    /// Template name or path. Defaults to the serialized `_template_` field.
    fn template(&self) -> String {
        self.to_config()
            .ok()
            .and_then(|cfg| cfg.template_name().map(str::to_string))
            .unwrap_or_default()
    }

    /// Adjust the config in place before rendering.
    fn update(&mut self) {}

    /// Extra values computed from the config, exposed at the context top level.
    fn template_values(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Register custom filters, functions and testers.
    fn register(&self, _engine: &mut TemplateEngine) {}

    fn to_config(&self) -> Result<ConfigObject> {
        ConfigObject::from_serialize(self)
    }
}

impl Renderable for ConfigObject {
    fn template(&self) -> String {
        self.template_name().unwrap_or_default().to_string()
    }

    fn to_config(&self) -> Result<ConfigObject> {
        Ok(self.clone())
    }
}

/// Per-call inputs: template override, context layers and extra values.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub template: Option<String>,
    pub layers: Vec<ContextLayer>,
    pub extras: Map<String, Value>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn layer(mut self, layer: ContextLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras.extend(extras);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    settings: Settings,
}

impl Renderer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Update `cfg`, locate its template and render it.
    pub fn render<R: Renderable>(&self, cfg: &mut R, options: &RenderOptions) -> Result<String> {
        cfg.update();
        let config = cfg.to_config()?;
        let name = options.template.clone().unwrap_or_else(|| cfg.template());

        let locator = TemplateLocator::from_settings(&self.settings, config.source());
        let path = locator.locate(&name)?;

        let mut engine = self.engine(cfg);
        let template = engine.add_template_file(&path)?;
        let context = self.context(cfg, options).build(&config)?;
        engine.render(&template, &context)
    }

    /// Render an inline template string instead of a template file.
    pub fn render_str<R: Renderable>(
        &self,
        cfg: &mut R,
        source: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        cfg.update();
        let config = cfg.to_config()?;
        let mut engine = self.engine(cfg);
        let context = self.context(cfg, options).build(&config)?;
        engine.render_str(source, &context)
    }

    /// Render and write to `path` (relative paths land in `output_dir`).
    pub fn render_to_file<R: Renderable>(
        &self,
        cfg: &mut R,
        options: &RenderOptions,
        path: &Path,
    ) -> Result<(PathBuf, WriteOutcome)> {
        let text = self.render(cfg, options)?;
        let path = resolve_output_path(&self.settings, path);
        let outcome = write_output(&path, &text)?;
        Ok((path, outcome))
    }

    fn engine<R: Renderable>(&self, cfg: &R) -> TemplateEngine {
        let mut engine = TemplateEngine::new();
        cfg.register(&mut engine);
        engine
    }

    fn context<R: Renderable>(&self, cfg: &R, options: &RenderOptions) -> ContextBuilder {
        ContextBuilder::from_settings(&self.settings)
            .layers(options.layers.iter().cloned())
            .extras(options.extras.clone())
            .derived(cfg.template_values())
    }
}

type RenderFn<C> = Box<dyn Fn(&Renderer, &C, &RenderOptions) -> Result<String> + Send + Sync>;

/// Renderers selected by name at runtime.
pub struct Dispatch<C> {
    renderer: Renderer,
    entries: BTreeMap<String, RenderFn<C>>,
}

impl<C> fmt::Debug for Dispatch<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("renderer", &self.renderer)
            .field("names", &self.names())
            .finish()
    }
}

impl<C> Dispatch<C> {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer, entries: BTreeMap::new() }
    }

    /// Register `name`; `build` turns the shared config into the renderable.
    pub fn register<R, F>(&mut self, name: impl Into<String>, build: F) -> &mut Self
    where
        R: Renderable + 'static,
        F: Fn(&C) -> Result<R> + Send + Sync + 'static,
    {
        let render: RenderFn<C> =
            Box::new(move |renderer: &Renderer, cfg: &C, options: &RenderOptions| {
                let mut target = build(cfg)?;
                renderer.render(&mut target, options)
            });
        self.entries.insert(name.into(), render);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn render(&self, name: &str, cfg: &C) -> Result<String> {
        self.render_with(name, cfg, &RenderOptions::default())
    }

    pub fn render_with(&self, name: &str, cfg: &C, options: &RenderOptions) -> Result<String> {
        let render =
            self.entries.get(name).ok_or_else(|| TextconfError::NoRenderable(name.to_string()))?;
        tracing::debug!("dispatching '{}'", name);
        render(&self.renderer, cfg, options)
    }
}

impl Dispatch<ConfigObject> {
    /// Register a typed renderable deserialized from the config object.
    pub fn register_type<R>(&mut self, name: impl Into<String>) -> &mut Self
    where
        R: Renderable + DeserializeOwned + 'static,
    {
        self.register(name, |cfg: &ConfigObject| {
            serde_json::from_value::<R>(cfg.to_value()).map_err(|e| TextconfError::Convert {
                target: std::any::type_name::<R>().to_string(),
                message: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize)]
    struct Launch {
        #[serde(rename = "_template_", default)]
        template: String,
        nodes: u32,
        gpus: u32,
        #[serde(default)]
        total: u32,
    }

    impl Renderable for Launch {
        fn update(&mut self) {
            self.total = self.nodes * self.gpus;
        }

        fn template_values(&self) -> Map<String, Value> {
            let mut values = Map::new();
            values.insert("label".to_string(), json!(format!("{}x{}", self.nodes, self.gpus)));
            values
        }

        fn register(&self, engine: &mut TemplateEngine) {
            engine.register_filter(
                "twice",
                |v: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
                    Ok(json!(v.as_i64().unwrap_or(0) * 2))
                },
            );
        }
    }

    fn renderer_in(dir: &Path) -> Renderer {
        Renderer::new(Settings { template_dirs: vec![dir.to_path_buf()], ..Settings::default() })
    }

    fn launch() -> Launch {
        Launch { template: "launch.sh".to_string(), nodes: 2, gpus: 4, total: 0 }
    }

    #[test]
    fn renders_struct_with_hooks() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("launch.sh"), "{{ label }} {{ total }} {{ gpus | twice }}")
            .expect("write");

        let mut cfg = launch();
        let out = renderer_in(tmp.path()).render(&mut cfg, &RenderOptions::new()).unwrap();
        assert_eq!(out, "2x4 8 8");
        assert_eq!(cfg.total, 8);
    }

    #[test]
    fn extras_shadow_derived_values() {
        let mut cfg = launch();
        let options = RenderOptions::new().extra("label", json!("custom"));
        let out = Renderer::default().render_str(&mut cfg, "{{ label }}", &options).unwrap();
        assert_eq!(out, "custom");
    }

    #[test]
    fn layers_apply_to_struct_fields() {
        let mut cfg = launch();
        let options = RenderOptions::new().layer(ContextLayer::dotlist(&["nodes=3"]));
        let out = Renderer::default().render_str(&mut cfg, "{{ nodes }}", &options).unwrap();
        assert_eq!(out, "3");
    }

    #[test]
    fn config_object_uses_template_key_and_hides_it() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("t.txt"), "{{ x }}{% if _template_ is defined %}!{% endif %}")
            .expect("write");
        let mut cfg = ConfigObject::from_value(json!({"_template_": "t.txt", "x": 1})).unwrap();
        let out = renderer_in(tmp.path()).render(&mut cfg, &RenderOptions::new()).unwrap();
        assert_eq!(out, "1");
    }

    #[test]
    fn template_next_to_config_file_is_found() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("run.yaml"), "_template_: run.tera\nseed: 7\n").expect("write");
        fs::write(tmp.path().join("run.tera"), "seed={{ seed }}").expect("write");

        let mut cfg = ConfigObject::load(&[tmp.path().join("run.yaml")]).unwrap();
        let out = Renderer::default().render(&mut cfg, &RenderOptions::new()).unwrap();
        assert_eq!(out, "seed=7");
    }

    #[test]
    fn missing_template_is_reported() {
        let mut cfg = ConfigObject::from_value(json!({"x": 1})).unwrap();
        let err = Renderer::default().render(&mut cfg, &RenderOptions::new()).unwrap_err();
        assert!(matches!(err, TextconfError::NoTemplate));
    }

    #[test]
    fn strict_rejects_missing_values() {
        let mut cfg = ConfigObject::from_value(json!({"x": "???"})).unwrap();
        let err = Renderer::default().render_str(&mut cfg, "{{ x }}", &RenderOptions::new());
        assert!(matches!(err, Err(TextconfError::MissingValue(p)) if p == "x"));
    }

    #[test]
    fn render_to_file_writes_under_output_dir() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("launch.sh"), "{{ nodes }}").expect("write");
        let renderer = Renderer::new(Settings {
            template_dirs: vec![tmp.path().to_path_buf()],
            output_dir: Some(tmp.path().join("out")),
            ..Settings::default()
        });

        let mut cfg = launch();
        let (path, outcome) =
            renderer.render_to_file(&mut cfg, &RenderOptions::new(), Path::new("a.sh")).unwrap();
        assert_eq!(path, tmp.path().join("out").join("a.sh"));
        assert_eq!(outcome, WriteOutcome::Created);
        assert_eq!(fs::read_to_string(path).unwrap(), "2");
    }

    #[test]
    fn dispatch_selects_by_name() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("launch.sh"), "{{ total }}").expect("write");
        fs::write(tmp.path().join("plain.txt"), "{{ nodes }}-{{ gpus }}").expect("write");

        let mut dispatch = Dispatch::new(renderer_in(tmp.path()));
        dispatch.register_type::<Launch>("launch").register("plain", |cfg: &ConfigObject| {
            let mut cfg = cfg.clone();
            cfg.set("_template_", json!("plain.txt"))?;
            Ok(cfg)
        });

        let cfg =
            ConfigObject::from_value(json!({"_template_": "launch.sh", "nodes": 3, "gpus": 2}))
                .unwrap();
        assert_eq!(dispatch.names(), vec!["launch", "plain"]);
        assert_eq!(dispatch.render("launch", &cfg).unwrap(), "6");
        assert_eq!(dispatch.render("plain", &cfg).unwrap(), "3-2");
        assert!(matches!(
            dispatch.render("other", &cfg),
            Err(TextconfError::NoRenderable(name)) if name == "other"
        ));
    }

    #[test]
    fn register_type_reports_shape_mismatch() {
        let mut dispatch = Dispatch::new(Renderer::default());
        dispatch.register_type::<Launch>("launch");
        let cfg = ConfigObject::from_value(json!({"nodes": "many"})).unwrap();
        assert!(matches!(dispatch.render("launch", &cfg), Err(TextconfError::Convert { .. })));
    }
}

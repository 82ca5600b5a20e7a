//! A constructed layer and the projection of attributes onto its element.

use super::attribute::{Attribute, ClickAction, Dimension, Extent, Visibility};
use crate::core::StateRegistry;
use crate::effects::{parse_density, ImageError, LoadToken, NaturalSize, PendingImage};
use crate::engine::{EngineConfig, EngineError, FallbackSize};
use crate::platform::{Document, ElementId};
use crate::visibility::ALWAYS_VISIBLE_CLASS;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

const DEBUG_CLASS: &str = "debug";

/// Where a layer's image is in its load.
#[derive(Clone, Debug, PartialEq)]
pub enum ImagePhase {
    NoImage,
    Pending {
        token: LoadToken,
        density: u32,
        requested_at: DateTime<Utc>,
    },
    Loaded(NaturalSize),
    Failed(ImageError),
}

/// What attribute projection needs from the engine.
pub(crate) struct AttributeContext<'a> {
    pub registry: &'a StateRegistry,
    pub config: &'a EngineConfig,
}

/// A positioned node in the layer tree.
#[derive(Debug)]
pub struct Layer {
    id: String,
    element: ElementId,
    parent: Option<String>,
    children: Vec<String>,
    width: Option<Dimension>,
    height: Option<Dimension>,
    top: Option<Dimension>,
    left: Option<Dimension>,
    image: Option<String>,
    image_phase: ImagePhase,
    handlers: Vec<ClickAction>,
    visible: Visibility,
    class_names: Vec<String>,
    classes: Vec<String>,
    template: Option<String>,
    html: Option<String>,
    debug: bool,
}

impl Layer {
    pub(crate) fn new(id: String, element: ElementId, parent: Option<String>) -> Self {
        Self {
            id,
            element,
            parent,
            children: Vec::new(),
            width: None,
            height: None,
            top: None,
            left: None,
            image: None,
            image_phase: ImagePhase::NoImage,
            handlers: Vec::new(),
            visible: Visibility::States(Vec::new()),
            class_names: Vec::new(),
            classes: Vec::new(),
            template: None,
            html: None,
            debug: false,
        }
    }

    /// Element id of the layer.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle of the backing element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Parent layer id; `None` only for the canvas.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether this is the root canvas layer.
    pub fn is_canvas(&self) -> bool {
        self.parent.is_none()
    }

    /// Child layer ids in creation order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Width, or `Unknown` until set or derived from the image.
    pub fn width(&self) -> Extent {
        extent(&self.width)
    }

    /// Height, or `Unknown` until set or derived from the image.
    pub fn height(&self) -> Extent {
        extent(&self.height)
    }

    /// Top offset, if set.
    pub fn top(&self) -> Option<&Dimension> {
        self.top.as_ref()
    }

    /// Left offset, if set.
    pub fn left(&self) -> Option<&Dimension> {
        self.left.as_ref()
    }

    /// Background image source, if set.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Where the background image is in its load.
    pub fn image_phase(&self) -> &ImagePhase {
        &self.image_phase
    }

    /// Whether any click handler is attached.
    pub fn is_clickable(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// States the layer is shown for.
    pub fn visible(&self) -> &Visibility {
        &self.visible
    }

    /// Author classes, in the order they were added.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Every class on the element, engine-owned ones included.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Template id the content came from.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Inline HTML content.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Whether the debug outline is on.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn handlers(&self) -> &[ClickAction] {
        &self.handlers
    }

    pub(crate) fn push_child(&mut self, id: String) {
        self.children.push(id);
    }

    pub(crate) fn add_class<D: Document>(&mut self, doc: &mut D, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
        doc.add_class(self.element, class);
    }

    fn remove_class<D: Document>(&mut self, doc: &mut D, class: &str) {
        self.classes.retain(|c| c != class);
        doc.remove_class(self.element, class);
    }

    /// Project one attribute onto the element.
    pub(crate) fn apply<D: Document>(
        &mut self,
        doc: &mut D,
        ctx: &AttributeContext<'_>,
        attribute: Attribute,
    ) -> Result<(), EngineError> {
        match attribute {
            Attribute::Width(value) => {
                doc.set_style(self.element, "width", &value.to_css());
                self.width = Some(value);
            }
            Attribute::Height(value) => {
                doc.set_style(self.element, "height", &value.to_css());
                self.height = Some(value);
            }
            Attribute::Top(value) => {
                doc.set_style(self.element, "top", &value.to_css());
                self.top = Some(value);
            }
            Attribute::Left(value) => {
                doc.set_style(self.element, "left", &value.to_css());
                self.left = Some(value);
            }
            Attribute::Image(source) => {
                let density = parse_density(&source);
                debug!(layer = %self.id, image = %source, density, "Preload requested");
                self.image = Some(source);
                self.image_phase = ImagePhase::Pending {
                    token: LoadToken::new(),
                    density,
                    requested_at: Utc::now(),
                };
            }
            Attribute::Click(None) => {}
            Attribute::Click(Some(action)) => {
                if let ClickAction::Transition(state) = &action {
                    ctx.registry.require(state)?;
                }
                doc.set_data(self.element, "click", "true");
                self.handlers.push(action);
            }
            Attribute::Visible(visibility) => self.show(doc, ctx, visibility),
            Attribute::ClassName(names) => {
                for class in names.split_whitespace() {
                    self.add_class(doc, class);
                    if !self.class_names.iter().any(|c| c == class) {
                        self.class_names.push(class.to_string());
                    }
                }
            }
            Attribute::Template(template) => {
                if !doc.import_template(self.element, &template) {
                    warn!(layer = %self.id, template = %template, "Template not found");
                }
                self.template = Some(template);
            }
            Attribute::Html(html) => {
                doc.set_inner_html(self.element, &html);
                self.html = Some(html);
            }
            Attribute::Debug(on) => {
                if on {
                    self.add_class(doc, DEBUG_CLASS);
                } else {
                    self.remove_class(doc, DEBUG_CLASS);
                }
                self.debug = on;
            }
            Attribute::Parent(_) => {
                return Err(EngineError::ConstructionOnly {
                    attribute: "parent",
                })
            }
        }
        Ok(())
    }

    /// Add companion classes. Earlier visibility is kept, so lists compose.
    fn show<D: Document>(&mut self, doc: &mut D, ctx: &AttributeContext<'_>, visibility: Visibility) {
        match visibility {
            Visibility::Always => {
                self.add_class(doc, ALWAYS_VISIBLE_CLASS);
                self.visible = Visibility::Always;
            }
            Visibility::States(names) => {
                for name in names {
                    let Some(state) = ctx.registry.get(&name) else {
                        debug!(layer = %self.id, state = %name, "Skipping unknown state in visible list");
                        continue;
                    };
                    let class = state.visible_class(&ctx.config.visible_suffix);
                    self.add_class(doc, &class);
                    if let Visibility::States(current) = &mut self.visible {
                        if !current.contains(&name) {
                            current.push(name);
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn pending_image(&self) -> Option<PendingImage> {
        match (&self.image_phase, &self.image) {
            (
                ImagePhase::Pending {
                    token,
                    requested_at,
                    ..
                },
                Some(image),
            ) => Some(PendingImage {
                layer: self.id.clone(),
                token: *token,
                image: image.clone(),
                requested_at: *requested_at,
            }),
            _ => None,
        }
    }

    fn density_for(&self, token: LoadToken) -> Option<u32> {
        match self.image_phase {
            ImagePhase::Pending {
                token: expected,
                density,
                ..
            } if expected == token => Some(density),
            _ => None,
        }
    }

    /// Apply a finished preload. Returns `false` for stale tokens.
    pub(crate) fn complete_image<D: Document>(
        &mut self,
        doc: &mut D,
        token: LoadToken,
        natural: NaturalSize,
    ) -> bool {
        let Some(density) = self.density_for(token) else {
            return false;
        };
        let (width, height) = natural.scaled(density);
        self.fill_unset_size(doc, width, height);
        if let Some(image) = &self.image {
            doc.set_style(self.element, "background-image", &format!("url({image})"));
        }
        self.image_phase = ImagePhase::Loaded(natural);
        true
    }

    /// Record a failed or expired preload. Returns `false` for stale tokens.
    pub(crate) fn fail_image<D: Document>(
        &mut self,
        doc: &mut D,
        token: LoadToken,
        error: ImageError,
        fallback: FallbackSize,
    ) -> bool {
        if self.density_for(token).is_none() {
            return false;
        }
        warn!(layer = %self.id, error = %error, "Image failed, using fallback size");
        self.fill_unset_size(doc, fallback.width, fallback.height);
        self.image_phase = ImagePhase::Failed(error);
        true
    }

    fn fill_unset_size<D: Document>(&mut self, doc: &mut D, width: f64, height: f64) {
        if self.width.is_none() {
            let value = Dimension::Px(width);
            doc.set_style(self.element, "width", &value.to_css());
            self.width = Some(value);
        }
        if self.height.is_none() {
            let value = Dimension::Px(height);
            doc.set_style(self.element, "height", &value.to_css());
            self.height = Some(value);
        }
    }
}

fn extent(value: &Option<Dimension>) -> Extent {
    value.clone().map_or(Extent::Unknown, Extent::Known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryPlatform;

    struct Fixture {
        platform: MemoryPlatform,
        registry: StateRegistry,
        config: EngineConfig,
        layer: Layer,
    }

    impl Fixture {
        fn new() -> Self {
            let mut platform = MemoryPlatform::new();
            let element = platform.create_element("div");
            let mut registry = StateRegistry::new();
            registry.register("login", Some("screen")).unwrap();
            registry.register("menu", None).unwrap();
            Self {
                platform,
                registry,
                config: EngineConfig::default(),
                layer: Layer::new("Login".into(), element, Some("Canvas".into())),
            }
        }

        fn apply(&mut self, attribute: Attribute) -> Result<(), EngineError> {
            let ctx = AttributeContext {
                registry: &self.registry,
                config: &self.config,
            };
            self.layer.apply(&mut self.platform, &ctx, attribute)
        }

        fn element(&self) -> &crate::platform::MemoryElement {
            self.platform.element(self.layer.element()).unwrap()
        }
    }

    #[test]
    fn geometry_is_written_as_css() {
        let mut f = Fixture::new();
        f.apply(Attribute::Top(Dimension::from(10))).unwrap();
        f.apply(Attribute::Left(Dimension::from("5em"))).unwrap();

        assert_eq!(f.element().style("top"), Some("10px"));
        assert_eq!(f.element().style("left"), Some("5em"));
        assert_eq!(f.layer.width(), Extent::Unknown);
    }

    #[test]
    fn unknown_visible_states_are_skipped() {
        let mut f = Fixture::new();
        f.apply(Attribute::Visible(Visibility::parse("screen:login,screen:ghost")))
            .unwrap();
        f.apply(Attribute::Visible(Visibility::parse("menu"))).unwrap();

        assert!(f.element().has_class("screen-login--visible"));
        assert!(f.element().has_class("menu--visible"));
        assert!(!f.element().has_class("screen-ghost--visible"));
        assert_eq!(
            f.layer.visible(),
            &Visibility::States(vec!["screen:login".into(), "menu".into()])
        );
    }

    #[test]
    fn click_target_must_exist() {
        let mut f = Fixture::new();
        let result = f.apply(Attribute::Click(Some(ClickAction::from("screen:ghost"))));

        assert!(matches!(result, Err(EngineError::InvalidState { .. })));
        assert!(!f.layer.is_clickable());

        f.apply(Attribute::Click(None)).unwrap();
        assert!(!f.layer.is_clickable());

        f.apply(Attribute::Click(Some(ClickAction::from("menu")))).unwrap();
        assert_eq!(f.element().data.get("click").map(String::as_str), Some("true"));
    }

    #[test]
    fn parent_cannot_change_after_construction() {
        let mut f = Fixture::new();
        let result = f.apply(Attribute::Parent("Other".into()));
        assert_eq!(
            result,
            Err(EngineError::ConstructionOnly {
                attribute: "parent"
            })
        );
    }

    #[test]
    fn class_names_accumulate() {
        let mut f = Fixture::new();
        f.apply(Attribute::ClassName("button primary".into())).unwrap();
        f.apply(Attribute::ClassName("primary wide".into())).unwrap();

        assert_eq!(f.layer.class_names(), ["button", "primary", "wide"]);
    }

    #[test]
    fn debug_toggles_class() {
        let mut f = Fixture::new();
        f.apply(Attribute::Debug(true)).unwrap();
        assert!(f.element().has_class("debug"));
        f.apply(Attribute::Debug(false)).unwrap();
        assert!(!f.element().has_class("debug"));
    }

    #[test]
    fn image_sizes_only_unset_dimensions() {
        let mut f = Fixture::new();
        f.apply(Attribute::Width(Dimension::from(100))).unwrap();
        f.apply(Attribute::Image("img/login@2x.png".into())).unwrap();

        let pending = f.layer.pending_image().unwrap();
        assert_eq!(f.layer.height(), Extent::Unknown);

        let applied =
            f.layer
                .complete_image(&mut f.platform, pending.token, NaturalSize::new(640, 1136));
        assert!(applied);
        assert_eq!(f.layer.width().px(), Some(100.0));
        assert_eq!(f.layer.height().px(), Some(568.0));
        assert_eq!(
            f.element().style("background-image"),
            Some("url(img/login@2x.png)")
        );
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut f = Fixture::new();
        f.apply(Attribute::Image("img/a.png".into())).unwrap();
        let first = f.layer.pending_image().unwrap().token;
        f.apply(Attribute::Image("img/b.png".into())).unwrap();

        assert!(!f
            .layer
            .complete_image(&mut f.platform, first, NaturalSize::new(10, 10)));
        assert_eq!(f.layer.width(), Extent::Unknown);
    }

    #[test]
    fn failed_image_uses_fallback() {
        let mut f = Fixture::new();
        f.apply(Attribute::Image("img/missing.png".into())).unwrap();
        let token = f.layer.pending_image().unwrap().token;

        let fallback = FallbackSize {
            width: 320.0,
            height: 480.0,
        };
        let error = ImageError::NotFound {
            image: "img/missing.png".into(),
        };
        assert!(f.layer.fail_image(&mut f.platform, token, error, fallback));
        assert_eq!(f.layer.width().px(), Some(320.0));
        assert!(matches!(f.layer.image_phase(), ImagePhase::Failed(_)));
        assert!(f.element().style("background-image").is_none());
    }
}

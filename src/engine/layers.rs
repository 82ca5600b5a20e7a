//! Layer construction, attribute writes, clicks and image loading.

use super::{Engine, EngineError};
use crate::builder::LayerSpec;
use crate::effects::{preload, ImageError, ImageLoader, LoadToken, NaturalSize, PendingImage};
use crate::layer::{Attribute, AttributeContext, ClickAction, Layer, ParentRef, Visibility};
use crate::platform::{Document, Platform};
use chrono::{DateTime, Utc};
use stillwater::prelude::*;
use tracing::debug;

impl<P: Platform> Engine<P> {
    /// Construct a layer. Returns its id.
    ///
    /// The id and parent are resolved before anything is rendered, so a
    /// failed construction leaves no trace.
    pub fn add_layer(&mut self, spec: LayerSpec) -> Result<String, EngineError> {
        let (id, parent, attributes) = spec.into_parts();
        let id = match id {
            Some(id) => id,
            None => self.next_layer_id(),
        };
        if self.find_layer(&id).is_some() {
            return Err(EngineError::DuplicateLayerId { id });
        }
        let parent = match parent.unwrap_or(ParentRef::Canvas) {
            ParentRef::Canvas => self.canvas.id().to_string(),
            ParentRef::Layer(parent) => {
                if self.find_layer(&parent).is_none() {
                    return Err(EngineError::UnresolvedParent { layer: id, parent });
                }
                parent
            }
        };
        for attribute in &attributes {
            if let Attribute::Click(Some(ClickAction::Transition(state))) = attribute {
                self.registry.require(state)?;
            }
        }

        let element = self.platform.create_element("div");
        self.platform.set_element_id(element, &id);
        let mut layer = Layer::new(id.clone(), element, Some(parent.clone()));
        let layer_class = self.config.layer_class();
        layer.add_class(&mut self.platform, &layer_class);

        if let Some(parent_layer) = self.find_layer_mut(&parent) {
            let parent_element = parent_layer.element();
            parent_layer.push_child(id.clone());
            self.platform.append_child(parent_element, element);
        }

        let (images, mut rest): (Vec<Attribute>, Vec<Attribute>) = attributes
            .into_iter()
            .partition(|attribute| matches!(attribute, Attribute::Image(_)));
        if !rest.iter().any(|a| matches!(a, Attribute::Visible(_))) {
            rest.push(Attribute::Visible(Visibility::Always));
        }

        let ctx = AttributeContext {
            registry: &self.registry,
            config: &self.config,
        };
        for attribute in rest.into_iter().chain(images) {
            layer.apply(&mut self.platform, &ctx, attribute)?;
        }

        debug!(layer = %id, parent = %parent, "Layer created");
        self.layers.insert(id.clone(), layer);
        Ok(id)
    }

    /// Construct a layer under `parent`, whatever parent the `LayerSpec` names.
    pub fn add_child_layer(&mut self, parent: &str, spec: LayerSpec) -> Result<String, EngineError> {
        self.add_layer(spec.parent(parent))
    }

    /// Write one attribute to a constructed layer.
    pub fn set_attribute(&mut self, id: &str, attribute: Attribute) -> Result<(), EngineError> {
        let ctx = AttributeContext {
            registry: &self.registry,
            config: &self.config,
        };
        let layer = if self.canvas.id() == id {
            &mut self.canvas
        } else {
            self.layers
                .get_mut(id)
                .ok_or_else(|| EngineError::UnknownLayer { id: id.to_string() })?
        };
        layer.apply(&mut self.platform, &ctx, attribute)
    }

    /// Look up a layer by id. The canvas is not included.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.find_layer(id)
    }

    /// The root layer every other layer descends from.
    pub fn canvas(&self) -> &Layer {
        &self.canvas
    }

    /// Every layer except the canvas, in no particular order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Dispatch a click on a layer, then bubble it up through its ancestors.
    pub fn click(&mut self, id: &str) -> Result<(), EngineError> {
        let mut actions: Vec<ClickAction> = Vec::new();
        let mut current = Some(id.to_string());
        let mut first = true;
        while let Some(layer_id) = current {
            let Some(layer) = self.find_layer(&layer_id) else {
                if first {
                    return Err(EngineError::UnknownLayer { id: layer_id });
                }
                break;
            };
            actions.extend(layer.handlers().iter().cloned());
            current = layer.parent().map(str::to_string);
            first = false;
        }

        debug!(layer = id, handlers = actions.len(), "Click");
        for action in &actions {
            action.run(self)?;
        }
        Ok(())
    }

    /// Whether the layer and all of its ancestors are displayed.
    pub fn is_layer_visible(&self, id: &str) -> Result<bool, EngineError> {
        let root = self.root_classes();
        let mut current = self
            .find_layer(id)
            .ok_or_else(|| EngineError::UnknownLayer { id: id.to_string() })?;
        loop {
            if current.is_canvas() {
                return Ok(true);
            }
            if !self.rule.shows(root.as_slice(), current.classes()) {
                return Ok(false);
            }
            current = match current.parent().and_then(|parent| self.find_layer(parent)) {
                Some(parent) => parent,
                None => return Ok(true),
            };
        }
    }

    /// Preloads still waiting for a result.
    pub fn pending_images(&self) -> Vec<PendingImage> {
        std::iter::once(&self.canvas)
            .chain(self.layers.values())
            .filter_map(Layer::pending_image)
            .collect()
    }

    /// Apply a finished preload. Returns `false` if the token is stale.
    pub fn complete_image_load(
        &mut self,
        id: &str,
        token: LoadToken,
        natural: NaturalSize,
    ) -> Result<bool, EngineError> {
        let (layer, platform) = self.layer_with_platform(id)?;
        Ok(layer.complete_image(platform, token, natural))
    }

    /// Record a failed preload. Returns `false` if the token is stale.
    pub fn fail_image_load(
        &mut self,
        id: &str,
        token: LoadToken,
        error: ImageError,
    ) -> Result<bool, EngineError> {
        let fallback = self.config.image_fallback;
        let (layer, platform) = self.layer_with_platform(id)?;
        Ok(layer.fail_image(platform, token, error, fallback))
    }

    /// Fail every preload requested more than the configured timeout before
    /// `now`. Returns the ids of the layers that were expired.
    pub fn expire_image_loads(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let timeout = self.config.image_timeout();
        let waited_ms = self.config.image_timeout_ms;
        let mut expired = Vec::new();
        for pending in self.pending_images() {
            let overdue = (now - pending.requested_at)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= timeout);
            if !overdue {
                continue;
            }
            let error = ImageError::TimedOut {
                image: pending.image.clone(),
                waited_ms,
            };
            if let Ok(true) = self.fail_image_load(&pending.layer, pending.token, error) {
                expired.push(pending.layer);
            }
        }
        expired
    }

    /// Run every pending preload against `loader` and apply the results.
    ///
    /// Returns how many preloads were resolved, failed ones included.
    pub async fn load_images<L: ImageLoader>(&mut self, loader: &L) -> usize {
        let mut resolved = 0;
        for pending in self.pending_images() {
            let applied = match preload::<L>(&pending.image).run(loader).await {
                Ok(natural) => self.complete_image_load(&pending.layer, pending.token, natural),
                Err(error) => self.fail_image_load(&pending.layer, pending.token, error),
            };
            if let Ok(true) = applied {
                resolved += 1;
            }
        }
        resolved
    }

    fn next_layer_id(&mut self) -> String {
        loop {
            self.generated_ids += 1;
            let candidate = self.config.generated_id(self.generated_ids);
            if self.find_layer(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn layer_with_platform(&mut self, id: &str) -> Result<(&mut Layer, &mut P), EngineError> {
        let layer = if self.canvas.id() == id {
            &mut self.canvas
        } else {
            self.layers
                .get_mut(id)
                .ok_or_else(|| EngineError::UnknownLayer { id: id.to_string() })?
        };
        Ok((layer, &mut self.platform))
    }

    fn find_layer(&self, id: &str) -> Option<&Layer> {
        if self.canvas.id() == id {
            return Some(&self.canvas);
        }
        self.layers.get(id)
    }

    fn find_layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        if self.canvas.id() == id {
            return Some(&mut self.canvas);
        }
        self.layers.get_mut(id)
    }
}

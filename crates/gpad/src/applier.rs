//! Replays style sheets onto live objects through the host's element
//! protocol.
//!
//! For each object, properties are replayed in sheet order:
//!
//! 1. A property carrying the reset marker is first cleared on the host if
//!    its codec names a [`Resettable`](crate::Resettable). Otherwise its
//!    default attributes (from the [`DefaultStyleCache`]) are laid under
//!    the sheet's attributes.
//! 2. The codec's routes are delivered: elements through `start_element`
//!    (after required-attribute backfill), scripts into script slots, the
//!    random flag directly.
//!
//! Each object ends with `finish`. After all objects the host recomputes
//! once, then re-syncs spreadsheet tracing if a sheet touched it.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::attrs::{self, AttributeMap};
use crate::codec::{CodecRegistry, GenericCodec, PropertyCodec, Route};
use crate::defaults::{self, DefaultStyleCache};
use crate::error::{ParseError, Result};
use crate::host::{ObjectInfo, ScriptSlots, StyleHost};
use crate::stylesheet::StyleSheet;

const SPREADSHEET_TRACE: &str = "spreadsheetTrace";

#[derive(Debug, Clone)]
pub struct Applier {
    registry: Arc<CodecRegistry>,
    cache: Arc<DefaultStyleCache>,
}

impl Default for Applier {
    fn default() -> Self {
        Self::new()
    }
}

impl Applier {
    /// An applier using the global codec registry and default-style cache.
    pub fn new() -> Self {
        Self {
            registry: CodecRegistry::shared(),
            cache: DefaultStyleCache::global(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<CodecRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cache(mut self, cache: Arc<DefaultStyleCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Applies `sheet` to every object in `handles`.
    ///
    /// # Errors
    ///
    /// `Failed to apply style sheet: ...` when an object has no label or the
    /// host rejects an element.
    pub fn apply<H>(&self, host: &mut H, handles: &[H::Handle], sheet: &StyleSheet) -> Result<()>
    where
        H: StyleHost + ScriptSlots,
    {
        if sheet.is_empty() || handles.is_empty() {
            return Ok(());
        }
        let mut touched_trace = false;
        for handle in handles {
            touched_trace |= self.apply_one(host, handle, sheet)?;
        }
        host.recompute();
        if touched_trace {
            host.resync_trace();
        }
        Ok(())
    }

    /// Returns whether the sheet touched spreadsheet tracing.
    fn apply_one<H>(&self, host: &mut H, handle: &H::Handle, sheet: &StyleSheet) -> Result<bool>
    where
        H: StyleHost + ScriptSlots,
    {
        let info = host.object_info(handle);
        let Some(label) = info.label.clone() else {
            return Err(apply_error("object must have a label to apply styles"));
        };
        debug!(%label, properties = sheet.len(), "applying style sheet");

        let mut touched_trace = false;
        for (name, attrs) in sheet.properties() {
            let generic;
            let codec: &dyn PropertyCodec = match self.registry.get(name) {
                Some(codec) => codec,
                None => {
                    generic = GenericCodec::new(name);
                    &generic
                }
            };
            // A cleared trace needs the resync too.
            touched_trace |= name == SPREADSHEET_TRACE;
            let Some(attrs) = self.resolve_reset(host, handle, &info, codec, attrs) else {
                continue;
            };
            for route in codec.routes(&attrs) {
                self.deliver(host, handle, &info, route)?;
            }
        }
        host.finish(handle);
        Ok(touched_trace)
    }

    /// The attributes to replay for one property, or `None` when nothing is
    /// left after a reset.
    fn resolve_reset<H>(
        &self,
        host: &mut H,
        handle: &H::Handle,
        info: &ObjectInfo,
        codec: &dyn PropertyCodec,
        attrs: &AttributeMap,
    ) -> Option<AttributeMap>
    where
        H: StyleHost,
    {
        let normal = attrs::without_reset(attrs);
        if !attrs::has_reset(attrs) {
            return Some(normal);
        }
        let cleared = codec
            .resettable()
            .is_some_and(|property| host.clear_property(handle, property));
        if cleared {
            trace!(property = codec.name(), "cleared on host");
            return (!normal.is_empty()).then_some(normal);
        }
        let defaults = info.default_type.and_then(|default_type| {
            self.cache
                .get_or_load(default_type, || host.default_style_xml(default_type))
        });
        let merged = match defaults.as_ref().and_then(|d| d.get(codec.element())) {
            Some(default_attrs) => attrs::complete(default_attrs, &normal),
            None => normal,
        };
        (!merged.is_empty()).then_some(merged)
    }

    fn deliver<H>(&self, host: &mut H, handle: &H::Handle, info: &ObjectInfo, route: Route) -> Result<()>
    where
        H: StyleHost + ScriptSlots,
    {
        match route {
            Route::Element { name, mut attrs } => {
                defaults::backfill(&name, &mut attrs, info);
                trace!(element = %name, ?attrs, "start_element");
                host.start_element(handle, &name, &attrs)
                    .map_err(|e| apply_error(e.to_string()))
            }
            Route::Script { slot, text } => {
                trace!(?slot, "set_script");
                host.set_script(handle, slot, &text);
                Ok(())
            }
            Route::Random(random) => {
                host.set_random(handle, random);
                Ok(())
            }
        }
    }
}

fn apply_error(message: impl std::fmt::Display) -> ParseError {
    ParseError::new(format!("Failed to apply style sheet: {}", message))
}

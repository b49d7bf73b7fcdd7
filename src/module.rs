//! Page and layout modules
//!
//! The module loader hands back raw [`ModuleExports`]; [`LoadedModule`]
//! turns them into a tagged value the navigator can use without sniffing
//! optional fields. [`compose`] wraps a page in its layouts.

use crate::error::NavigationError;
use crate::page_data::PageProps;
use crate::render_mode::RenderMode;
use crate::warn_log;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Element Tree
// ============================================================================

/// Opaque element tree handed to the renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Element with a tag name
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append an optional child
    pub fn maybe_child(mut self, child: Option<Element>) -> Self {
        self.children.extend(child);
        self
    }

    /// Depth-first search by tag
    pub fn find(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(tag))
    }
}

// ============================================================================
// Components
// ============================================================================

/// Input to a component call
#[derive(Debug, Clone)]
pub struct ComponentProps<'a> {
    /// Page props (params, query, loader data)
    pub page: &'a PageProps,
    /// Wrapped content, set for layouts
    pub children: Option<Element>,
}

/// Callable producing an element tree
pub type Component = Rc<dyn Fn(&ComponentProps<'_>) -> Element>;

/// Which slot a module fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Page,
    Layout,
}

/// Raw exports of an imported module
#[derive(Clone, Default)]
pub struct ModuleExports {
    /// Default export
    pub default: Option<Component>,
    /// Declared render mode, as written in the module
    pub render_mode: Option<String>,
    /// SSR page asks to be hydrated on first load
    pub hydrate: bool,
    /// Stop wrapping in more general layouts
    pub stops_inheritance: bool,
}

impl ModuleExports {
    /// Exports with just a default component
    pub fn component<F>(render: F) -> Self
    where
        F: Fn(&ComponentProps<'_>) -> Element + 'static,
    {
        Self {
            default: Some(Rc::new(render)),
            ..Self::default()
        }
    }

    /// Declare a render mode
    pub fn with_render_mode(mut self, mode: impl Into<String>) -> Self {
        self.render_mode = Some(mode.into());
        self
    }

    /// Opt into hydration
    pub fn with_hydrate(mut self) -> Self {
        self.hydrate = true;
        self
    }

    /// Mark as stopping layout inheritance
    pub fn stopping_inheritance(mut self) -> Self {
        self.stops_inheritance = true;
        self
    }
}

impl fmt::Debug for ModuleExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleExports")
            .field("default", &self.default.as_ref().map(|_| "<component>"))
            .field("render_mode", &self.render_mode)
            .field("hydrate", &self.hydrate)
            .field("stops_inheritance", &self.stops_inheritance)
            .finish()
    }
}

/// A validated module ready for composition
#[derive(Clone)]
pub struct LoadedModule {
    pub id: String,
    pub kind: ModuleKind,
    pub render: Component,
    pub override_mode: Option<RenderMode>,
    pub stops_inheritance: bool,
    pub hydrates: bool,
}

impl LoadedModule {
    /// Validate raw exports.
    ///
    /// Fails when there is no default component. An unknown declared mode is
    /// ignored with a warning.
    pub fn from_exports(
        id: impl Into<String>,
        kind: ModuleKind,
        exports: ModuleExports,
    ) -> Result<Self, NavigationError> {
        let id = id.into();
        let Some(render) = exports.default else {
            return Err(NavigationError::InvalidModule { module: id });
        };

        let override_mode = exports.render_mode.as_deref().and_then(|declared| {
            declared
                .parse::<RenderMode>()
                .map_err(|err| {
                    warn_log!("module '{}': {}", id, err);
                })
                .ok()
        });

        Ok(Self {
            id,
            kind,
            render,
            override_mode,
            stops_inheritance: exports.stops_inheritance,
            hydrates: exports.hydrate,
        })
    }

    /// Call the component
    pub fn call(&self, page: &PageProps, children: Option<Element>) -> Element {
        (self.render)(&ComponentProps { page, children })
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("override_mode", &self.override_mode)
            .field("stops_inheritance", &self.stops_inheritance)
            .field("hydrates", &self.hydrates)
            .finish()
    }
}

/// Build the final tree: call the page, then wrap it through `layouts`
/// (most specific first). Wrapping stops after a layout that stops
/// inheritance; a page that stops inheritance gets no layouts.
pub fn compose(page: &LoadedModule, layouts: &[Rc<LoadedModule>], props: &PageProps) -> Element {
    let mut current = page.call(props, None);
    if page.stops_inheritance {
        return current;
    }

    for layout in layouts {
        current = layout.call(props, Some(current));
        if layout.stops_inheritance {
            break;
        }
    }
    current
}

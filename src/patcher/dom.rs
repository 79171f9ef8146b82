//! DOM host abstraction.
//!
//! The patcher only needs a handful of DOM capabilities. Hosts implement
//! [`Dom`]: the in-memory [`Document`](super::document::Document) used by
//! tooling and tests, and the browser host compiled for `wasm32`.

/// Name of the reference attribute on image elements.
pub const SRC: &str = "src";
/// Responsive-image source-set attribute.
pub const SRCSET: &str = "srcset";

/// Document loading state, as reported by `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Structure is queryable once parsing has finished.
    pub fn is_queryable(self) -> bool {
        !matches!(self, ReadyState::Loading)
    }
}

/// What an observer asks to be notified about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub attributes: bool,
    pub attribute_filter: Vec<String>,
}

impl ObserveOptions {
    /// Inserted nodes anywhere in the document plus `src` changes.
    pub fn image_sources() -> Self {
        Self {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: vec![SRC.to_string()],
        }
    }

    pub fn wants_attribute(&self, name: &str) -> bool {
        self.attributes
            && (self.attribute_filter.is_empty()
                || self.attribute_filter.iter().any(|f| f.eq_ignore_ascii_case(name)))
    }
}

/// One batched mutation, in the order it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord<N> {
    ChildList { target: N, added: Vec<N> },
    Attributes { target: N, name: String },
}

/// DOM capabilities the patcher relies on.
pub trait Dom {
    type Node: Clone;

    /// Every `<img>` currently in the document, in document order.
    fn images(&self) -> Vec<Self::Node>;

    /// `<img>` descendants of `node`, excluding `node` itself.
    fn images_within(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn is_element(&self, node: &Self::Node) -> bool;

    fn is_image(&self, node: &Self::Node) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Live `src` property (frameworks may set it without touching the attribute).
    fn src_property(&self, node: &Self::Node) -> Option<String>;

    fn set_src_property(&mut self, node: &Self::Node, value: &str);

    /// Live `srcset` property.
    fn srcset_property(&self, node: &Self::Node) -> Option<String>;

    fn set_srcset_property(&mut self, node: &Self::Node, value: &str);

    /// Start delivering mutation records for the whole document.
    fn observe(&mut self, options: &ObserveOptions);
}

use crate::error::Result;
use crate::ir::Transition;
use crate::layout::PathAttributes;

/// Vector drawing surface the flow layer draws through.
pub trait DrawingSurface {
    /// Opaque handle to a drawn path.
    type Handle: Clone;

    /// Creates a path from its geometry string.
    fn path(&mut self, d: &str) -> Result<Self::Handle>;

    /// Sets attributes on a freshly created path.
    fn attr(&mut self, handle: &Self::Handle, attrs: &PathAttributes) -> Result<()>;

    /// Applies attributes to an existing path, animated when `transition` is set.
    fn update(
        &mut self,
        handle: &Self::Handle,
        attrs: &PathAttributes,
        transition: Option<&Transition>,
    ) -> Result<()>;
}

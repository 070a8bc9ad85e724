use std::sync::Arc;

use media_native::ResourceKind;

use crate::handle::OwnedHandle;
use crate::list::MediaList;

use super::{MediaContext, MediaRef};

/// Children of a container media (playlist, directory, disc)
///
/// Children usually appear while the parent is parsed or played; listen for
/// `sub_item_added` to learn about them as they arrive.
pub struct MediaSubItems {
    context: Arc<MediaContext>,
}

impl MediaSubItems {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    /// The engine's child list; the returned list owns its own reference
    pub fn list(&self) -> Option<MediaList> {
        let media = self.context.live()?;
        let engine = self.context.engine();
        let list = engine.media_subitems(media)?;
        Some(MediaList::from_owner(
            OwnedHandle::adopt(Arc::clone(engine), list, ResourceKind::MediaList),
            Arc::clone(self.context.config()),
        ))
    }

    pub fn count(&self) -> usize {
        self.list().map_or(0, |list| list.count())
    }

    /// A reference to every child, in list order
    pub fn refs(&self) -> Vec<MediaRef> {
        self.list().map(|list| list.items()).unwrap_or_default()
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use media_native::Meta;
use serde::{Deserialize, Serialize};

use super::MediaContext;

/// Every metadata value a media currently carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    values: BTreeMap<Meta, String>,
}

impl MetaData {
    pub fn get(&self, meta: Meta) -> Option<&str> {
        self.values.get(&meta).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Meta, &str)> {
        self.values.iter().map(|(meta, value)| (*meta, value.as_str()))
    }
}

impl FromIterator<(Meta, String)> for MetaData {
    fn from_iter<I: IntoIterator<Item = (Meta, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Metadata read and write
pub struct MediaMeta {
    context: Arc<MediaContext>,
}

impl MediaMeta {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    pub fn get(&self, meta: Meta) -> Option<String> {
        let media = self.context.live()?;
        self.context.engine().media_meta(media, meta)
    }

    /// Change a value in memory; call [`save`](Self::save) to persist it
    pub fn set(&self, meta: Meta, value: &str) {
        if let Some(media) = self.context.live() {
            self.context.engine().media_set_meta(media, meta, value);
        }
    }

    /// Write changed values back to the source
    pub fn save(&self) -> bool {
        let Some(media) = self.context.live() else {
            return false;
        };
        match self.context.engine().media_save_meta(media) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Saving metadata of {} failed: {}", media, e);
                false
            }
        }
    }

    pub fn all(&self) -> MetaData {
        let Some(media) = self.context.live() else {
            return MetaData::default();
        };
        let engine = self.context.engine();
        Meta::ALL
            .iter()
            .filter_map(|meta| engine.media_meta(media, *meta).map(|value| (*meta, value)))
            .collect()
    }
}

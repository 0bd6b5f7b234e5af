use crate::expression::ExprCache;
use crate::foundation::error::{SplinalError, SplinalResult};
use crate::model::channel::Channel;
use indexmap::IndexMap;

/// A named group of channels, resolved together in insertion order.
#[derive(Clone, Debug)]
pub struct Spline {
    name: String,
    channels: IndexMap<String, Channel>,
    cache: ExprCache,
}

impl Spline {
    /// Empty spline.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: IndexMap::new(),
            cache: ExprCache::new(),
        }
    }

    /// Spline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `channel`. A channel with the same name is a value error.
    pub fn add_channel(&mut self, mut channel: Channel) -> SplinalResult<&mut Channel> {
        if self.channels.contains_key(channel.name()) {
            return Err(SplinalError::value(format!(
                "spline \"{}\" already has a channel \"{}\"",
                self.name,
                channel.name()
            )));
        }
        channel.adopt_cache(&self.cache)?;
        let entry = self.channels.entry(channel.name().to_owned());
        Ok(entry.or_insert(channel))
    }

    /// Remove a channel, keeping the order of the others.
    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        self.channels.shift_remove(name)
    }

    /// Channel by name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Mutable channel by name.
    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(name)
    }

    /// Channels in resolution order.
    pub fn channels(&self) -> impl ExactSizeIterator<Item = &Channel> {
        self.channels.values()
    }

    pub(crate) fn adopt_cache(&mut self, cache: &ExprCache) -> SplinalResult<()> {
        for c in self.channels.values_mut() {
            c.adopt_cache(cache)?;
        }
        self.cache = cache.clone();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/spline.rs"]
mod tests;

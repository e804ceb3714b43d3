//! Which icon each display target is currently waiting for.
//!
//! Every bind hands out a fresh generation. A download result is only
//! applied if its generation is still the target's current one, so
//! results for a row that has since been reused are dropped.

use std::collections::HashMap;

use forecast_icons::CachedImage;

/// Place on the screen an icon is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconTarget {
    Header,
    Row(usize),
}

#[derive(Debug)]
enum IconState {
    Pending,
    Loaded(CachedImage),
    Failed {
        message: &'static str,
        retryable: bool,
    },
}

#[derive(Debug)]
struct IconBinding {
    key: String,
    generation: u64,
    state: IconState,
}

#[derive(Debug, Default)]
pub(crate) struct IconBindings {
    next_generation: u64,
    slots: HashMap<IconTarget, IconBinding>,
}

/// What a target already knows about the icon it is asked to show
#[derive(Debug)]
pub(crate) enum Lookup {
    /// Bound to this key with the image in hand
    Loaded(CachedImage),
    /// Bound to this key, download outstanding
    Pending,
    /// Bound to this key, and the last attempt failed for good
    Failed,
    /// Not bound to this key, or the last attempt may succeed if repeated
    Unbound,
}

impl IconBindings {
    pub(crate) fn lookup(&self, target: IconTarget, key: &str) -> Lookup {
        match self.slots.get(&target) {
            Some(binding) if binding.key == key => match &binding.state {
                IconState::Loaded(image) => Lookup::Loaded(image.clone()),
                IconState::Pending => Lookup::Pending,
                IconState::Failed { retryable: true, .. } => Lookup::Unbound,
                IconState::Failed { retryable: false, .. } => Lookup::Failed,
            },
            _ => Lookup::Unbound,
        }
    }

    /// Point `target` at `key`, waiting for a download. Returns the
    /// generation the download must present.
    pub(crate) fn bind(&mut self, target: IconTarget, key: &str) -> u64 {
        self.insert(target, key, IconState::Pending)
    }

    /// Point `target` at `key` with an image already available.
    pub(crate) fn bind_loaded(&mut self, target: IconTarget, key: &str, image: CachedImage) {
        self.insert(target, key, IconState::Loaded(image));
    }

    pub(crate) fn unbind(&mut self, target: IconTarget) {
        self.slots.remove(&target);
    }

    /// Forget every target, e.g. after new forecast data replaced the rows.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Apply a downloaded image. False if the target moved on.
    pub(crate) fn apply(&mut self, target: IconTarget, generation: u64, image: CachedImage) -> bool {
        match self.slots.get_mut(&target) {
            Some(binding) if binding.generation == generation => {
                binding.state = IconState::Loaded(image);
                true
            }
            _ => false,
        }
    }

    /// Record a failed download with its user-facing message. False if
    /// the target moved on.
    pub(crate) fn mark_failed(
        &mut self,
        target: IconTarget,
        generation: u64,
        message: &'static str,
        retryable: bool,
    ) -> bool {
        match self.slots.get_mut(&target) {
            Some(binding) if binding.generation == generation => {
                binding.state = IconState::Failed { message, retryable };
                true
            }
            _ => false,
        }
    }

    /// Why the icon at `target` is missing, if its download failed.
    pub(crate) fn failure(&self, target: IconTarget) -> Option<&'static str> {
        match self.slots.get(&target).map(|binding| &binding.state) {
            Some(IconState::Failed { message, .. }) => Some(*message),
            _ => None,
        }
    }

    pub(crate) fn image(&self, target: IconTarget) -> Option<CachedImage> {
        match self.slots.get(&target).map(|binding| &binding.state) {
            Some(IconState::Loaded(image)) => Some(image.clone()),
            _ => None,
        }
    }

    fn insert(&mut self, target: IconTarget, key: &str, state: IconState) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots.insert(
            target,
            IconBinding {
                key: key.to_string(),
                generation,
                state,
            },
        );
        generation
    }
}

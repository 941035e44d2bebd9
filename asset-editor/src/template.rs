//! Dirty tracking and the per-attribute template cache.
//!
//! Templates are expensive render descriptions. A template is reused across
//! render passes until its attribute is marked dirty; the visible ordering is
//! recomputed every pass.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Case-insensitive ordering of attribute names with a deterministic tiebreak,
/// so unrelated re-renders never reshuffle rows.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_names(names: &mut [String]) {
    names.sort_by(|a, b| compare_names(a, b));
}

/// Counters for the last render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub visible: usize,
    pub reused: usize,
    pub regenerated: usize,
    pub evicted: usize,
}

#[derive(Debug)]
pub struct TemplateCache<T> {
    templates: HashMap<String, Rc<T>>,
    dirty: HashSet<String>,
    total_regenerated: u64,
}

impl<T> Default for TemplateCache<T> {
    fn default() -> Self {
        Self {
            templates: HashMap::new(),
            dirty: HashSet::new(),
            total_regenerated: 0,
        }
    }
}

impl<T> TemplateCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the cached template for `key`
    pub fn mark_dirty(&mut self, key: &str) {
        self.dirty.insert(key.to_string());
        self.templates.remove(key);
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty.contains(key)
    }

    pub fn get(&self, key: &str) -> Option<&Rc<T>> {
        self.templates.get(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates regenerated since the cache was created
    pub fn total_regenerated(&self) -> u64 {
        self.total_regenerated
    }

    pub fn clear(&mut self) {
        self.templates.clear();
        self.dirty.clear();
    }

    /// Produce templates for `visible` in order, reusing clean cache entries and
    /// regenerating the rest. Entries for keys no longer visible are evicted.
    pub fn render_pass<S>(
        &mut self,
        visible: &[(String, S)],
        mut render: impl FnMut(&str, &S) -> T,
    ) -> (Vec<Rc<T>>, RenderStats) {
        let mut stats = RenderStats {
            visible: visible.len(),
            ..Default::default()
        };
        let mut rows = Vec::with_capacity(visible.len());

        for (key, source) in visible {
            if !self.dirty.contains(key) {
                if let Some(cached) = self.templates.get(key) {
                    rows.push(Rc::clone(cached));
                    stats.reused += 1;
                    continue;
                }
            }

            let template = Rc::new(render(key, source));
            self.templates.insert(key.clone(), Rc::clone(&template));
            self.dirty.remove(key);
            self.total_regenerated += 1;
            stats.regenerated += 1;
            rows.push(template);
        }

        let visible_keys: HashSet<&str> = visible.iter().map(|(key, _)| key.as_str()).collect();
        let before = self.templates.len();
        self.templates.retain(|key, _| visible_keys.contains(key.as_str()));
        self.dirty.retain(|key| visible_keys.contains(key.as_str()));
        stats.evicted = before - self.templates.len();

        (rows, stats)
    }
}

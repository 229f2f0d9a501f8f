//! Flattening a survey tree into the items a respondent currently sees.
//!
//! Traversal is depth-first and left to right. Each node's condition is
//! evaluated against the context; a false condition hides the node and its
//! whole subtree. Groups with a random-subset selection pick their children
//! first and filter the picked children afterwards.
//!
//! [`VisibleItems`] produces items lazily so a renderer can stop once it
//! has a page worth of questions. A condition that fails to evaluate ends
//! the traversal with that error; it is never treated as visible or hidden.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

use crate::evaluator::evaluate;
use crate::types::{EvalError, ItemBody, ResponseContext, SelectionMethod, SurveyItem};

// ──────────────────────────────────────────────
// Subset seeding
// ──────────────────────────────────────────────

/// Source of the seed used for a random-subset group.
///
/// Seeding is a deployment policy. Implementations must be deterministic
/// for a given respondent so the same subset is shown across a session.
pub trait SelectionSeeder {
    fn seed(&self, ctx: &ResponseContext, group_key: &str) -> u64;
}

/// Default seeder: SHA-256 over participant id and group key.
///
/// Contexts without a participant id all share the same subset per group.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSeeder;

impl SelectionSeeder for DigestSeeder {
    fn seed(&self, ctx: &ResponseContext, group_key: &str) -> u64 {
        let participant = ctx.participant_id().unwrap_or_else(|| {
            tracing::debug!(group = %group_key, "no participant id, seeding from group key only");
            ""
        });
        let digest = Sha256::new()
            .chain_update(participant.as_bytes())
            .chain_update([0u8])
            .chain_update(group_key.as_bytes())
            .finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }
}

/// Seeder returning the same seed for every group and respondent.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeeder(pub u64);

impl SelectionSeeder for FixedSeeder {
    fn seed(&self, _ctx: &ResponseContext, _group_key: &str) -> u64 {
        self.0
    }
}

impl<S: SelectionSeeder + ?Sized> SelectionSeeder for &S {
    fn seed(&self, ctx: &ResponseContext, group_key: &str) -> u64 {
        (**self).seed(ctx, group_key)
    }
}

/// Children a group presents before visibility filtering, in definition
/// order.
pub fn choose_children<'a, S: SelectionSeeder>(
    group: &'a SurveyItem,
    ctx: &ResponseContext,
    seeder: &S,
) -> Vec<&'a SurveyItem> {
    let ItemBody::Group { items, selection } = &group.body else {
        return Vec::new();
    };
    match *selection {
        SelectionMethod::Sequential => items.iter().collect(),
        SelectionMethod::RandomSubset(n) if n >= items.len() => items.iter().collect(),
        SelectionMethod::RandomSubset(n) => {
            let seed = seeder.seed(ctx, &group.key);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = rand::seq::index::sample(&mut rng, items.len(), n).into_vec();
            picked.sort_unstable();
            tracing::debug!(group = %group.key, n, ?picked, "selected random subset");
            picked.into_iter().map(|i| &items[i]).collect()
        }
    }
}

/// Evaluate an item's visibility condition. Items without one are visible.
pub fn is_visible(item: &SurveyItem, ctx: &ResponseContext) -> Result<bool, EvalError> {
    let Some(condition) = &item.condition else {
        return Ok(true);
    };
    evaluate(condition, ctx)
        .and_then(|v| v.as_bool("condition"))
        .map_err(|e| e.in_condition(&item.key))
}

// ──────────────────────────────────────────────
// Lazy traversal
// ──────────────────────────────────────────────

/// Lazy depth-first iterator over visible items.
pub struct VisibleItems<'a, S: SelectionSeeder = DigestSeeder> {
    ctx: &'a ResponseContext,
    seeder: S,
    stack: Vec<std::vec::IntoIter<&'a SurveyItem>>,
    include_page_breaks: bool,
    include_groups: bool,
    done: bool,
}

impl<'a> VisibleItems<'a, DigestSeeder> {
    pub fn new(root: &'a SurveyItem, ctx: &'a ResponseContext) -> Self {
        Self::with_seeder(root, ctx, DigestSeeder)
    }
}

impl<'a, S: SelectionSeeder> VisibleItems<'a, S> {
    pub fn with_seeder(root: &'a SurveyItem, ctx: &'a ResponseContext, seeder: S) -> Self {
        VisibleItems {
            ctx,
            seeder,
            stack: vec![vec![root].into_iter()],
            include_page_breaks: false,
            include_groups: false,
            done: false,
        }
    }

    /// Also yield visible page-break items.
    pub fn with_page_breaks(mut self) -> Self {
        self.include_page_breaks = true;
        self
    }

    /// Also yield visible groups, before their children.
    pub fn with_groups(mut self) -> Self {
        self.include_groups = true;
        self
    }
}

impl<'a, S: SelectionSeeder> Iterator for VisibleItems<'a, S> {
    type Item = Result<&'a SurveyItem, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let frame = self.stack.last_mut()?;
            let Some(item) = frame.next() else {
                self.stack.pop();
                continue;
            };

            match is_visible(item, self.ctx) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(item = %item.key, "hidden by condition");
                    continue;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            match &item.body {
                ItemBody::Group { .. } => {
                    let chosen = choose_children(item, self.ctx, &self.seeder);
                    self.stack.push(chosen.into_iter());
                    if self.include_groups {
                        return Some(Ok(item));
                    }
                }
                ItemBody::PageBreak => {
                    if self.include_page_breaks {
                        return Some(Ok(item));
                    }
                }
                ItemBody::Question { .. } => return Some(Ok(item)),
            }
        }
    }
}

// ──────────────────────────────────────────────
// Eager helpers
// ──────────────────────────────────────────────

/// Visible question items in display order.
pub fn flatten<'a>(
    root: &'a SurveyItem,
    ctx: &'a ResponseContext,
) -> Result<Vec<&'a SurveyItem>, EvalError> {
    VisibleItems::new(root, ctx).collect()
}

pub fn flatten_with<'a, S: SelectionSeeder>(
    root: &'a SurveyItem,
    ctx: &'a ResponseContext,
    seeder: S,
) -> Result<Vec<&'a SurveyItem>, EvalError> {
    VisibleItems::with_seeder(root, ctx, seeder).collect()
}

/// Visible items split at visible page breaks. Empty pages are dropped.
pub fn pages<'a>(
    root: &'a SurveyItem,
    ctx: &'a ResponseContext,
) -> Result<Vec<Vec<&'a SurveyItem>>, EvalError> {
    pages_with(root, ctx, DigestSeeder)
}

pub fn pages_with<'a, S: SelectionSeeder>(
    root: &'a SurveyItem,
    ctx: &'a ResponseContext,
    seeder: S,
) -> Result<Vec<Vec<&'a SurveyItem>>, EvalError> {
    let mut pages = Vec::new();
    let mut current = Vec::new();
    for item in VisibleItems::with_seeder(root, ctx, seeder).with_page_breaks() {
        let item = item?;
        if item.is_page_break() {
            if !current.is_empty() {
                pages.push(std::mem::take(&mut current));
            }
        } else {
            current.push(item);
        }
    }
    if !current.is_empty() {
        pages.push(current);
    }
    Ok(pages)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

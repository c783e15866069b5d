// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Homepage feeds: random sampling, tag-based recommendation, and a mixed feed.
//!
//! The selection logic is plain set arithmetic over post ids. Storage only
//! answers "which ids exist", "which ids did this actor react to", and "which
//! ids share a tag with these"; sampling, exclusion, dedup, and shuffling
//! happen here with an injected [`Rng`] so tests can seed it.

use std::collections::HashSet;
use std::hash::Hash;

use rand::Rng;
use rand::seq::{SliceRandom, index};
use tracing::debug;

use crate::error::QappError;
use crate::traits::ForumStore;
use crate::types::{Actor, PostRecord};

/// Maximum number of posts returned by each feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLimits {
    pub random: usize,
    pub recommended: usize,
    pub mixed: usize,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            random: 10,
            recommended: 10,
            mixed: 20,
        }
    }
}

/// Pick `min(amount, ids.len())` distinct ids uniformly at random, in random order.
pub fn sample_ids<R: Rng + ?Sized>(ids: &[i64], amount: usize, rng: &mut R) -> Vec<i64> {
    let amount = amount.min(ids.len());
    index::sample(rng, ids.len(), amount)
        .into_iter()
        .map(|i| ids[i])
        .collect()
}

/// Deduplicate `candidates`, drop anything in `reacted`, shuffle, and keep `amount`.
pub fn pick_recommendations<R: Rng + ?Sized>(
    reacted: &[i64],
    candidates: &[i64],
    amount: usize,
    rng: &mut R,
) -> Vec<i64> {
    let reacted: HashSet<i64> = reacted.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut pool: Vec<i64> = candidates
        .iter()
        .copied()
        .filter(|id| !reacted.contains(id) && seen.insert(*id))
        .collect();
    pool.shuffle(rng);
    pool.truncate(amount);
    pool
}

/// Concatenate two feeds, keep the first occurrence of each key, shuffle, and truncate.
pub fn mix<T, K, F, R>(first: Vec<T>, second: Vec<T>, key: F, limit: usize, rng: &mut R) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
    R: Rng + ?Sized,
{
    let mut seen = HashSet::new();
    let mut mixed: Vec<T> = first
        .into_iter()
        .chain(second)
        .filter(|item| seen.insert(key(item)))
        .collect();
    mixed.shuffle(rng);
    mixed.truncate(limit);
    mixed
}

/// Builds the three feeds on top of a [`ForumStore`].
pub struct FeedEngine<'a> {
    store: &'a dyn ForumStore,
    limits: FeedLimits,
}

impl<'a> FeedEngine<'a> {
    pub fn new(store: &'a dyn ForumStore, limits: FeedLimits) -> Self {
        Self { store, limits }
    }

    /// Up to `limits.random` posts sampled uniformly. Empty when there are no posts.
    pub async fn random<R: Rng + Send + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<PostRecord>, QappError> {
        let ids = self.store.all_post_ids().await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let picked = sample_ids(&ids, self.limits.random, rng);
        debug!(total = ids.len(), picked = picked.len(), "random feed sampled");
        self.store.posts_by_ids(&picked).await
    }

    /// Posts sharing tags with what `actor` reacted to, excluding those posts.
    ///
    /// Falls back to [`FeedEngine::random`] when there is no actor or nothing to recommend.
    pub async fn recommended<R: Rng + Send + ?Sized>(
        &self,
        actor: Option<Actor>,
        rng: &mut R,
    ) -> Result<Vec<PostRecord>, QappError> {
        let Some(actor) = actor else {
            return self.random(rng).await;
        };

        let reacted = self.store.reacted_post_ids(actor).await?;
        let candidates = if reacted.is_empty() {
            Vec::new()
        } else {
            self.store.post_ids_sharing_tags(&reacted).await?
        };
        let picked = pick_recommendations(&reacted, &candidates, self.limits.recommended, rng);
        if picked.is_empty() {
            debug!(?actor, "no recommendations, falling back to random feed");
            return self.random(rng).await;
        }

        debug!(?actor, reacted = reacted.len(), picked = picked.len(), "recommended feed built");
        self.store.posts_by_ids(&picked).await
    }

    /// Random and recommended feeds merged, deduplicated by post id, and shuffled.
    pub async fn mixed<R: Rng + Send + ?Sized>(
        &self,
        actor: Option<Actor>,
        rng: &mut R,
    ) -> Result<Vec<PostRecord>, QappError> {
        let random = self.random(rng).await?;
        let recommended = self.recommended(actor, rng).await?;
        Ok(mix(random, recommended, |post| post.id, self.limits.mixed, rng))
    }
}

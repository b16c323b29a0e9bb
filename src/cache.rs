//! Keyed query cache between the view layer and the store. Results are held
//! per key, concurrent fetches of one key collapse into a single store call,
//! and mutations drop exactly the keys they can affect. Invalidate-and-refetch
//! is the only consistency mechanism; there is no read-your-writes guarantee
//! beyond it.

use std::{collections::HashMap, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{db::Category, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Problem list, per category filter (None = all).
    Problems(Option<Category>),
    /// Home page's most-upvoted problems.
    Featured,
    /// One problem's detail view.
    Problem(Uuid),
    /// A problem's solution list.
    Solutions(Uuid),
    /// A user's upvote rows.
    UserUpvotes(Uuid),
}

/// Everything that can dirty cached queries. The `affects` mapping below is
/// the single place consistency rules live; call sites never pick keys
/// themselves.
#[derive(Debug, Clone, Copy)]
pub enum Mutation {
    ProblemPosted,
    SolutionPosted { problem_id: Uuid },
    UpvoteToggled { problem_id: Uuid, user_id: Uuid },
}

impl Mutation {
    pub fn affects(&self, key: &QueryKey) -> bool {
        match self {
            // New problems show up in every list and can displace featured ones.
            Mutation::ProblemPosted => {
                matches!(key, QueryKey::Problems(_) | QueryKey::Featured)
            }
            // Solution counts are displayed on problem cards, so every list
            // showing this problem goes too.
            Mutation::SolutionPosted { problem_id } => matches!(
                key,
                QueryKey::Problem(id) | QueryKey::Solutions(id) if id == problem_id
            ) || matches!(key, QueryKey::Problems(_) | QueryKey::Featured),
            Mutation::UpvoteToggled { problem_id, user_id } => {
                matches!(
                    key,
                    QueryKey::Problem(id) | QueryKey::Solutions(id) if id == problem_id
                ) || matches!(key, QueryKey::UserUpvotes(id) if id == user_id)
                    || matches!(key, QueryKey::Featured)
            }
        }
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Value>>,
    inflight: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
}

impl QueryCache {
    pub fn new() -> QueryCache {
        QueryCache::default()
    }

    /// Serve `key` from cache, or run `fetch` and remember the result.
    /// Concurrent callers for the same key wait on one per-key guard, so only
    /// the first actually hits the store.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(value) = self.entries.read().await.get(&key) {
            return Ok(serde_json::from_value(value.clone())?);
        }

        let guard = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key).or_default().clone()
        };
        let held = guard.lock().await;

        let result = async {
            // Whoever held the guard first may have filled the entry already.
            if let Some(value) = self.entries.read().await.get(&key) {
                return Ok(serde_json::from_value(value.clone())?);
            }

            let fetched = fetch().await?;
            self.entries
                .write()
                .await
                .insert(key, serde_json::to_value(&fetched)?);
            Ok(fetched)
        }
        .await;

        // Guards are per-fetch, not per-key-forever.
        drop(held);
        self.inflight.lock().await.remove(&key);
        result
    }

    /// Drop every cached key the mutation can affect.
    pub async fn invalidate(&self, mutation: Mutation) {
        self.entries
            .write()
            .await
            .retain(|key, _| !mutation.affects(key));
    }

    #[cfg(test)]
    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    #[cfg(test)]
    pub async fn inflight_len(&self) -> usize {
        self.inflight.lock().await.len()
    }
}

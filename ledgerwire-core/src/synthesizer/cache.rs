// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::meta::{CompositeSchema, Envelope, Fingerprint};
use crate::synthesizer::synthesized::SynthesizedType;
use dashmap::DashMap;
use log::debug;
use once_cell::sync::{Lazy, OnceCell};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static GLOBAL_CACHE: Lazy<Arc<TypeCache>> = Lazy::new(|| Arc::new(TypeCache::new()));

// fingerprints of a schema and of every schema it reaches, root first
type ClosureKey = Vec<Fingerprint>;

/// Synthesized types keyed by the fingerprints of their schema closure.
///
/// Each key owns a once-cell: concurrent requests for the same key block on
/// that cell while one of them synthesizes, and the map shard lock is
/// released before synthesis starts.
#[derive(Default)]
pub struct TypeCache {
    entries: DashMap<ClosureKey, Arc<OnceCell<Arc<SynthesizedType>>>>,
    synthesized: AtomicU64,
}

impl TypeCache {
    pub fn new() -> TypeCache {
        TypeCache::default()
    }

    /// The cache shared by every synthesizer that was not given its own.
    pub fn global() -> Arc<TypeCache> {
        GLOBAL_CACHE.clone()
    }

    /// Cached type for `schema`, synthesizing it on first request. `closure`
    /// holds `schema` first, then every composite schema it reaches. With
    /// `force` a new type always replaces the cached one.
    pub fn get_or_synthesize(
        &self,
        schema: &CompositeSchema,
        closure: &Arc<Envelope>,
        force: bool,
    ) -> Arc<SynthesizedType> {
        let key: ClosureKey = closure.schemas().iter().map(|s| s.fingerprint()).collect();
        if force {
            let ty = self.build(schema, closure);
            self.entries
                .insert(key, Arc::new(OnceCell::with_value(ty.clone())));
            return ty;
        }
        let cell = {
            let entry = self
                .entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()));
            Arc::clone(entry.value())
        };
        cell.get_or_init(|| self.build(schema, closure)).clone()
    }

    fn build(&self, schema: &CompositeSchema, closure: &Arc<Envelope>) -> Arc<SynthesizedType> {
        let generation = self.synthesized.fetch_add(1, Ordering::SeqCst) + 1;
        let ty = Arc::new(SynthesizedType::new(
            schema.clone(),
            closure.clone(),
            generation,
        ));
        debug!("synthesized {} (generation {})", schema, generation);
        ty
    }

    /// Number of syntheses performed since the cache was created.
    pub fn synthesized_count(&self) -> u64 {
        self.synthesized.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

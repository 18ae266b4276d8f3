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

pub const DEFAULT_MAX_DEPTH: u32 = 128;
pub const DEFAULT_MAX_SCHEMAS: usize = 8192;

/// Engine-wide limits.
///
/// This struct is owned by [`crate::engine::LedgerWire`] and copied into every
/// `WriteContext`/`ReadContext` so both directions enforce the same bounds.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum nesting of composite values.
    pub max_depth: u32,
    /// Maximum number of composite schemas accepted in one envelope.
    pub max_schemas: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            max_schemas: DEFAULT_MAX_SCHEMAS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline(always)]
    pub fn max_schemas(&self) -> usize {
        self.max_schemas
    }
}

// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Prioritized lookup of the [Deployment] to use for a chain.
//!
//! A [ResolverChain] holds resolvers in priority order and returns the first deployment any of
//! them produces. A resolver that fails (for example an unreadable deployments file) is logged
//! and skipped.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::deployments::Deployment;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to read deployments file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("failed to parse deployments file {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("no deployment found for chain ID {chain_id} (tried: {tried})")]
    NotFound { chain_id: u64, tried: String },
}

/// A single source of deployment addresses.
pub trait DeploymentResolver: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Return the deployment for `chain_id`, or `None` if this resolver does not know it.
    fn resolve(&self, chain_id: u64) -> Result<Option<Deployment>, ResolveError>;
}

/// Deployment given explicitly on the command line or through the environment.
#[derive(Clone, Debug)]
pub struct ExplicitResolver(pub Option<Deployment>);

impl DeploymentResolver for ExplicitResolver {
    fn name(&self) -> &str {
        "explicit"
    }

    fn resolve(&self, _chain_id: u64) -> Result<Option<Deployment>, ResolveError> {
        Ok(self.0.clone())
    }
}

/// Deployments read from a JSON file mapping chain IDs to deployments.
///
/// ```json
/// { "97": { "nft_feeding_address": "0x…", "stable_staking_address": "0x…" } }
/// ```
#[derive(Clone, Debug)]
pub struct FileResolver {
    path: PathBuf,
}

impl FileResolver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    fn load(&self) -> Result<HashMap<u64, Deployment>, ResolveError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|source| ResolveError::Io { path: self.path.clone(), source })?;
        serde_json::from_str(&contents)
            .map_err(|source| ResolveError::Parse { path: self.path.clone(), source })
    }
}

impl DeploymentResolver for FileResolver {
    fn name(&self) -> &str {
        "file"
    }

    fn resolve(&self, chain_id: u64) -> Result<Option<Deployment>, ResolveError> {
        let mut deployments = self.load()?;
        Ok(deployments.remove(&chain_id).map(|mut deployment| {
            deployment.chain_id.get_or_insert(chain_id);
            deployment
        }))
    }
}

/// The deployments compiled into this crate, see [Deployment::from_chain_id].
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinResolver;

impl DeploymentResolver for BuiltinResolver {
    fn name(&self) -> &str {
        "builtin"
    }

    fn resolve(&self, chain_id: u64) -> Result<Option<Deployment>, ResolveError> {
        Ok(Deployment::from_chain_id(chain_id))
    }
}

/// Resolvers tried in order until one returns a deployment.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn DeploymentResolver>>,
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.resolvers.iter().map(|r| r.name())).finish()
    }
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard order: explicit deployment, then the deployments file if any, then the
    /// built-in table.
    pub fn standard(explicit: Option<Deployment>, deployments_file: Option<&Path>) -> Self {
        let mut chain = Self::new().with(ExplicitResolver(explicit));
        if let Some(path) = deployments_file {
            chain = chain.with(FileResolver::new(path));
        }
        chain.with(BuiltinResolver)
    }

    /// Append a resolver with lower priority than those already in the chain.
    pub fn with(mut self, resolver: impl DeploymentResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn resolve(&self, chain_id: u64) -> Result<Deployment, ResolveError> {
        for resolver in &self.resolvers {
            match resolver.resolve(chain_id) {
                Ok(Some(deployment)) => {
                    tracing::debug!(resolver = resolver.name(), chain_id, "resolved deployment");
                    return Ok(deployment);
                }
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(resolver = resolver.name(), "skipping resolver: {err}");
                }
            }
        }
        let tried = self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ");
        Err(ResolveError::NotFound { chain_id, tried })
    }
}

//! A registered route.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::load_balancer::{Host, LoadBalancer, SelectContext};
use crate::routing::template::{InputTemplate, OutputTemplate};

/// An immutable route snapshot.
///
/// The registry never mutates a `Route` in place; pool and template changes
/// publish a new snapshot. Host flags are shared between snapshots.
#[derive(Clone)]
pub struct Route {
    key: String,
    input: Arc<InputTemplate>,
    output: Arc<OutputTemplate>,
    hosts: Vec<Arc<Host>>,
    balancer: Arc<dyn LoadBalancer>,
}

impl Route {
    pub fn new(
        key: String,
        input: InputTemplate,
        output: OutputTemplate,
        hosts: Vec<Arc<Host>>,
        balancer: Arc<dyn LoadBalancer>,
    ) -> Self {
        Self {
            key,
            input: Arc::new(input),
            output: Arc::new(output),
            hosts,
            balancer,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn input(&self) -> &InputTemplate {
        &self.input
    }

    pub fn output(&self) -> &OutputTemplate {
        &self.output
    }

    pub fn hosts(&self) -> &[Arc<Host>] {
        &self.hosts
    }

    pub fn balancer(&self) -> &Arc<dyn LoadBalancer> {
        &self.balancer
    }

    /// Number of segments a request path needs to match this route.
    pub fn min_path_len(&self) -> usize {
        self.input.min_path_len()
    }

    /// Rewrite a request path into the backend path.
    pub fn rewrite(&self, path: &str) -> Result<String> {
        let params = self.input.extract(path)?;
        self.output.build(&params)
    }

    /// Select a host with this route's balancer.
    pub fn select(&self, ctx: &SelectContext<'_>) -> Result<Arc<Host>> {
        self.balancer.select(self, ctx)
    }

    /// Same route with replaced templates and balancer, keeping the pool.
    pub(crate) fn reconfigured(
        &self,
        input: InputTemplate,
        output: OutputTemplate,
        balancer: Arc<dyn LoadBalancer>,
    ) -> Self {
        Self::new(self.key.clone(), input, output, self.hosts.clone(), balancer)
    }

    /// Same route with one more host appended.
    pub(crate) fn with_host(&self, host: Arc<Host>) -> Self {
        let mut next = self.clone();
        next.hosts.push(host);
        next
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("key", &self.key)
            .field("input", &self.input.pattern())
            .field("output", &self.output.pattern())
            .field("hosts", &self.hosts)
            .field("balancer", &self.balancer.name())
            .finish()
    }
}

//! Construction API for [`Gateway`].

use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use crate::origin::Origin;
use crate::policy::{RequestPolicy, ResponsePolicy};
use crate::routing::Route;

/// Collects routes, a default origin and the global policy chains.
pub struct GatewayBuilder<C: Send + Sync = ()> {
    routes: Vec<Route<C>>,
    default_origin: Option<Arc<dyn Origin<C>>>,
    request_policies: Vec<Arc<dyn RequestPolicy<C>>>,
    response_policies: Vec<Arc<dyn ResponsePolicy<C>>>,
}

impl<C: Send + Sync> Default for GatewayBuilder<C> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            default_origin: None,
            request_policies: Vec::new(),
            response_policies: Vec::new(),
        }
    }
}

impl<C: Send + Sync + 'static> GatewayBuilder<C> {
    /// Replace the route list.
    pub fn routes(mut self, routes: Vec<Route<C>>) -> Self {
        self.routes = routes;
        self
    }

    /// Append one route.
    pub fn route(mut self, route: Route<C>) -> Self {
        self.routes.push(route);
        self
    }

    /// Origin used when no route matches. Required.
    pub fn default_origin(mut self, origin: Arc<dyn Origin<C>>) -> Self {
        self.default_origin = Some(origin);
        self
    }

    /// Append a global request policy.
    pub fn request_policy(mut self, policy: Arc<dyn RequestPolicy<C>>) -> Self {
        self.request_policies.push(policy);
        self
    }

    /// Append a global response policy.
    pub fn response_policy(mut self, policy: Arc<dyn ResponsePolicy<C>>) -> Self {
        self.response_policies.push(policy);
        self
    }

    /// Replace both global chains at once.
    pub fn global_policies(
        mut self,
        request: Vec<Arc<dyn RequestPolicy<C>>>,
        response: Vec<Arc<dyn ResponsePolicy<C>>>,
    ) -> Self {
        self.request_policies = request;
        self.response_policies = response;
        self
    }

    /// Freeze the configuration into an immutable gateway.
    pub fn build(self) -> GatewayResult<Gateway<C>> {
        let default_origin = self.default_origin.ok_or(GatewayError::MissingDefaultOrigin)?;

        let mut routes = self.routes;
        for (index, route) in routes.iter_mut().enumerate() {
            route.name_by_position(index);
        }

        tracing::debug!(
            routes = routes.len(),
            request_policies = self.request_policies.len(),
            response_policies = self.response_policies.len(),
            default_origin = default_origin.name(),
            "Gateway built"
        );

        Ok(Gateway {
            routes,
            default_origin,
            request_policies: self.request_policies,
            response_policies: self.response_policies,
        })
    }
}

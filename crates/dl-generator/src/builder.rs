//! Fluent builder for constructing a [`Generator`].

use tracing::info;

use dl_core::GeneratorConfig;
use dl_spatial::{DijkstraRouter, RoadNetwork, Router};
use dl_trajectory::{KinematicBuilder, TrajectoryBuilder};

use crate::{CancelToken, GenError, GenResult, Generator};

/// Fluent builder for [`Generator<R, B>`].
///
/// # Required inputs
///
/// - [`GeneratorConfig`] — counts, calendar, seed, routing mode, …
/// - [`RoadNetwork`] — the road graph deliveries run on
///
/// # Optional inputs (have defaults)
///
/// | Method                     | Default                                   |
/// |----------------------------|-------------------------------------------|
/// | `.router(r)`               | [`DijkstraRouter`]                        |
/// | `.trajectory_builder(b)`   | [`KinematicBuilder::from_config`]         |
/// | `.cancel_token(t)`         | a fresh, never-cancelled token            |
/// | `.restrict_network(bool)`  | `true`: keep the largest strongly-connected component |
///
/// # Example
///
/// ```rust,ignore
/// let generator = GeneratorBuilder::new(config, network)
///     .cancel_token(token.clone())
///     .build()?;
/// let summary = generator.run(&mut NoopObserver)?;
/// ```
pub struct GeneratorBuilder<R: Router = DijkstraRouter, B: TrajectoryBuilder = KinematicBuilder> {
    config:   GeneratorConfig,
    network:  RoadNetwork,
    router:   R,
    builder:  B,
    cancel:   Option<CancelToken>,
    restrict: bool,
}

impl GeneratorBuilder {
    /// Create a builder with all required inputs and default engines.
    pub fn new(config: GeneratorConfig, network: RoadNetwork) -> Self {
        let builder = KinematicBuilder::from_config(&config);
        Self {
            config,
            network,
            router: DijkstraRouter,
            builder,
            cancel: None,
            restrict: true,
        }
    }
}

impl<R: Router, B: TrajectoryBuilder> GeneratorBuilder<R, B> {
    /// Route with `router` instead of the built-in Dijkstra.
    pub fn router<R2: Router>(self, router: R2) -> GeneratorBuilder<R2, B> {
        GeneratorBuilder {
            config:   self.config,
            network:  self.network,
            router,
            builder:  self.builder,
            cancel:   self.cancel,
            restrict: self.restrict,
        }
    }

    /// Build trajectories with `builder` instead of the kinematic default.
    pub fn trajectory_builder<B2: TrajectoryBuilder>(self, builder: B2) -> GeneratorBuilder<R, B2> {
        GeneratorBuilder {
            config:   self.config,
            network:  self.network,
            router:   self.router,
            builder,
            cancel:   self.cancel,
            restrict: self.restrict,
        }
    }

    /// Share a cancellation token with the caller (e.g. a Ctrl-C handler).
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether to restrict the network to its largest strongly-connected
    /// component before running.  Disable only for networks already
    /// restricted, or in tests that need unreachable pairs.
    pub fn restrict_network(mut self, restrict: bool) -> Self {
        self.restrict = restrict;
        self
    }

    /// Validate inputs and return a ready-to-run [`Generator`].
    pub fn build(self) -> GenResult<Generator<R, B>> {
        self.config.validate()?;
        if self.network.is_empty() {
            return Err(GenError::EmptyNetwork);
        }

        let network = if self.restrict {
            let before = self.network.node_count();
            let restricted = self.network.restrict_to_largest_scc();
            info!(
                nodes = restricted.node_count(),
                edges = restricted.edge_count(),
                removed = before - restricted.node_count(),
                "network restricted to largest strongly-connected component"
            );
            restricted
        } else {
            self.network
        };

        Ok(Generator {
            config:  self.config,
            network,
            router:  self.router,
            builder: self.builder,
            cancel:  self.cancel.unwrap_or_default(),
        })
    }
}

//! Tests for dl-generator.

use chrono::NaiveDate;

use dl_core::{DeliveryId, GeneratorConfig, NodeId, Point, RouteMode};
use dl_spatial::{DijkstraRouter, PathRow, RoadCategory, RoadNetwork, RoadNetworkBuilder, Router, SpatialResult};

use crate::{DeliveryRecord, DropReason, Fleet, GeneratorObserver, RoutePlan, RunSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `n × n` grid of two-way roads with `spacing` metres between nodes.
///
/// Node `r * n + c` sits at `(c * spacing, r * spacing)`.  The bottom row is
/// a primary road, everything else residential.
fn grid(n: u32, spacing: f64) -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    for r in 0..n {
        for c in 0..n {
            b.add_node(Point::new(c as f64 * spacing, r as f64 * spacing));
        }
    }
    for r in 0..n {
        for c in 0..n {
            let id = NodeId(r * n + c);
            let category = if r == 0 { RoadCategory::Primary } else { RoadCategory::Residential };
            if c + 1 < n {
                b.add_road(id, NodeId(id.0 + 1), category, category.default_speed_kmh());
            }
            if r + 1 < n {
                b.add_road(id, NodeId(id.0 + n), RoadCategory::Residential, 30.0);
            }
        }
    }
    b.build()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
}

/// 1 warehouse, `vehicles` vehicles, `days` days from `start`.
fn config(vehicles: u32, days: u32, start: NaiveDate) -> GeneratorConfig {
    GeneratorConfig {
        warehouses: Some(1),
        vehicles: Some(vehicles),
        days: Some(days),
        start_day: start,
        seed: 7,
        batch_size: 5,
        ..GeneratorConfig::default()
    }
}

/// Dijkstra that pretends some pairs are unreachable.
struct SkipRouter {
    skip: Vec<(NodeId, NodeId)>,
}

impl Router for SkipRouter {
    fn route_batch(
        &self,
        network: &RoadNetwork,
        pairs:   &[(NodeId, NodeId)],
        mode:    RouteMode,
    ) -> SpatialResult<Vec<PathRow>> {
        let rows = DijkstraRouter.route_batch(network, pairs, mode)?;
        Ok(rows
            .into_iter()
            .filter(|r| !self.skip.contains(&(r.source, r.target)))
            .collect())
    }
}

/// Observer that keeps everything it is shown.
#[derive(Default)]
struct Recorder {
    fleet:      Option<Fleet>,
    plans:      Vec<RoutePlan>,
    batches:    usize,
    deliveries: Vec<DeliveryRecord>,
    dropped:    Vec<(DeliveryId, DropReason)>,
    summary:    Option<RunSummary>,
}

impl GeneratorObserver for Recorder {
    fn on_fleet(&mut self, fleet: &Fleet) {
        self.fleet = Some(fleet.clone());
    }
    fn on_plans(&mut self, plans: &[RoutePlan], _pairs: usize) {
        self.plans = plans.to_vec();
    }
    fn on_batch(&mut self, _index: usize, _total: usize, _rows: usize) {
        self.batches += 1;
    }
    fn on_delivery(&mut self, delivery: &DeliveryRecord) {
        self.deliveries.push(delivery.clone());
    }
    fn on_dropped(&mut self, id: DeliveryId, reason: &DropReason) {
        self.dropped.push((id, *reason));
    }
    fn on_run_end(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use dl_core::{GeneratorConfig, VehicleId, WarehouseId};

    use super::*;
    use crate::GenError;

    #[test]
    fn counts_and_round_robin() {
        let net = grid(4, 100.0);
        let cfg = GeneratorConfig {
            warehouses: Some(3),
            vehicles: Some(7),
            ..GeneratorConfig::default()
        };
        let fleet = Fleet::create(&net, &cfg).unwrap();
        assert_eq!(fleet.warehouses.len(), 3);
        assert_eq!(fleet.vehicles.len(), 7);
        for (i, v) in fleet.vehicles.iter().enumerate() {
            assert_eq!(v.id, VehicleId(i as u32));
            assert_eq!(v.warehouse, WarehouseId(i as u32 % 3));
        }
        // Distinct anchors on a network with plenty of room.
        assert_ne!(fleet.warehouses[0].node, fleet.warehouses[1].node);
        assert_ne!(fleet.warehouses[1].node, fleet.warehouses[2].node);
        assert_ne!(fleet.warehouses[0].node, fleet.warehouses[2].node);
        for w in &fleet.warehouses {
            assert_eq!(w.position, net.node_pos[w.node.index()]);
        }
    }

    #[test]
    fn licence_plate_format() {
        let net = grid(3, 100.0);
        let fleet = Fleet::create(&net, &config(20, 1, monday())).unwrap();
        for v in &fleet.vehicles {
            let (prefix, number) = v.licence.split_once(' ').unwrap();
            assert_eq!(prefix.len(), 4);
            assert!(prefix.starts_with("B-"));
            assert!(prefix[2..].chars().all(|c| c.is_ascii_uppercase()));
            let n: u32 = number.parse().unwrap();
            assert!((1..=999).contains(&n));
            assert!(!v.brand.is_empty());
            assert!(!v.vehicle_type.is_empty());
        }
    }

    #[test]
    fn same_seed_same_fleet() {
        let net = grid(4, 100.0);
        let a = Fleet::create(&net, &config(5, 1, monday())).unwrap();
        let b = Fleet::create(&net, &config(5, 1, monday())).unwrap();
        assert_eq!(a.warehouses, b.warehouses);
        assert_eq!(a.vehicles, b.vehicles);
    }

    #[test]
    fn empty_network_rejected() {
        let net = RoadNetworkBuilder::new().build();
        assert!(matches!(
            Fleet::create(&net, &config(1, 1, monday())),
            Err(GenError::EmptyNetwork)
        ));
    }
}

// ── Destination planning ──────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use dl_core::{StreamRng, VehicleId};

    use super::*;
    use crate::planner::{plan_stops, MAX_STOPS, MIN_STOPS};
    use crate::{GenError, PairRegistry};

    #[test]
    fn plan_shape() {
        let warehouse = NodeId(5);
        for seed in 0..200 {
            let mut rng = StreamRng::from_seed(seed);
            let stops = plan_stops(16, warehouse, VehicleId(0), 0, 1_000, &mut rng).unwrap();
            let customers = stops.len() as u32 - 2;
            assert!((MIN_STOPS..=MAX_STOPS).contains(&customers));
            assert_eq!(stops.first(), Some(&warehouse));
            assert_eq!(stops.last(), Some(&warehouse));
            for w in stops.windows(2) {
                assert_ne!(w[0], w[1]);
            }
            // No repetition apart from the warehouse at both ends.
            let interior = &stops[1..stops.len() - 1];
            for (i, a) in interior.iter().enumerate() {
                assert_ne!(*a, warehouse);
                assert!(interior[i + 1..].iter().all(|b| b != a));
                assert!(a.index() < 16);
            }
        }
    }

    #[test]
    fn tiny_network_rejected() {
        let mut rng = StreamRng::from_seed(1);
        let result = plan_stops(3, NodeId(0), VehicleId(2), 4, 1_000, &mut rng);
        assert!(matches!(
            result,
            Err(GenError::DestinationExhausted { vehicle: VehicleId(2), day: 4, .. })
        ));
    }

    #[test]
    fn legs_and_customers() {
        let plan = RoutePlan {
            delivery: DeliveryId(1),
            vehicle:  VehicleId(0),
            day:      0,
            date:     monday(),
            stops:    vec![NodeId(0), NodeId(3), NodeId(7), NodeId(2), NodeId(0)],
        };
        assert_eq!(plan.customers(), 3);
        let legs: Vec<_> = plan.legs().collect();
        assert_eq!(legs.len(), 4);
        assert_eq!(legs[0], (NodeId(0), NodeId(3)));
        assert_eq!(legs[3], (NodeId(2), NodeId(0)));
    }

    #[test]
    fn registry_dedupes_in_first_seen_order() {
        let mut reg = PairRegistry::new();
        assert!(reg.insert(NodeId(1), NodeId(2)));
        assert!(reg.insert(NodeId(2), NodeId(1)));
        assert!(!reg.insert(NodeId(1), NodeId(2)));
        assert!(reg.insert(NodeId(3), NodeId(1)));
        assert_eq!(
            reg.pairs(),
            &[(NodeId(1), NodeId(2)), (NodeId(2), NodeId(1)), (NodeId(3), NodeId(1))]
        );
        assert_eq!(reg.len(), 3);
    }
}

// ── Request compilation ───────────────────────────────────────────────────────

#[cfg(test)]
mod compiler {
    use std::sync::Mutex;

    use super::*;
    use crate::compiler::{batches, route_pairs};
    use crate::{CancelToken, GenError};

    /// Records the batches it receives.
    struct CountingRouter {
        calls: Mutex<Vec<Vec<(NodeId, NodeId)>>>,
    }

    impl Router for CountingRouter {
        fn route_batch(
            &self,
            network: &RoadNetwork,
            pairs:   &[(NodeId, NodeId)],
            mode:    RouteMode,
        ) -> SpatialResult<Vec<PathRow>> {
            self.calls.lock().unwrap().push(pairs.to_vec());
            DijkstraRouter.route_batch(network, pairs, mode)
        }
    }

    fn pairs(n: u32) -> Vec<(NodeId, NodeId)> {
        (0..n).map(|i| (NodeId(i), NodeId((i + 1) % n))).collect()
    }

    #[test]
    fn batching_keeps_order() {
        let p = pairs(12);
        let chunks: Vec<_> = batches(&p, 5).unwrap().collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 5);
        assert_eq!(chunks[2].len(), 2);
        let flat: Vec<_> = chunks.concat();
        assert_eq!(flat, p);
        assert!(matches!(batches(&p, 0), Err(GenError::Invariant(_))));
    }

    #[test]
    fn one_router_call_per_batch() {
        let net = grid(4, 100.0);
        let p = pairs(11);
        let router = CountingRouter { calls: Mutex::new(Vec::new()) };
        let mut seen = Vec::new();
        let table = route_pairs(
            &router, &net, &p, RouteMode::Fastest, 4, &CancelToken::new(),
            |i, total, _| seen.push((i, total)),
        )
        .unwrap();

        let calls = router.calls.into_inner().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls.concat(), p);
        assert_eq!(seen, vec![(0, 3), (1, 3), (2, 3)]);
        assert_eq!(table.len(), 11);
        for &(s, t) in &p {
            assert!(table.contains(s, t));
        }
    }

    #[test]
    fn cancelled_before_first_batch() {
        let net = grid(3, 100.0);
        let token = CancelToken::new();
        token.cancel();
        let result = route_pairs(&DijkstraRouter, &net, &pairs(4), RouteMode::Fastest, 2, &token, |_, _, _| {});
        assert!(matches!(result, Err(GenError::Cancelled)));
    }

    #[test]
    fn router_error_is_fatal() {
        let net = grid(3, 100.0);
        let bad = vec![(NodeId(0), NodeId(500))];
        let result = route_pairs(&DijkstraRouter, &net, &bad, RouteMode::Fastest, 2, &CancelToken::new(), |_, _, _| {});
        assert!(matches!(result, Err(GenError::Routing(_))));
    }
}

// ── Path assembly ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod assembler {
    use dl_core::{EdgeId, LineString};
    use dl_spatial::EdgeSpec;

    use super::*;
    use crate::assembler::assemble;
    use crate::GenError;

    /// 0 —(bent two-way)— 1 —(one-way 1→2)— 2
    fn bent() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(100.0, 0.0));
        let n2 = b.add_node(Point::new(200.0, 0.0));
        b.add_edge(EdgeSpec {
            ext_id:    None,
            source:    n0,
            target:    n1,
            category:  RoadCategory::Residential,
            speed_kmh: Some(30.0),
            oneway:    false,
            geometry:  Some(LineString::new(vec![
                Point::new(0.1, 0.0),
                Point::new(50.0, 20.0),
                Point::new(99.9, 0.0),
            ])),
        });
        b.add_oneway(n1, n2, RoadCategory::Primary, 50.0);
        b.build()
    }

    fn row(seq: u32, node: u32, edge: Option<u32>, s: u32, t: u32) -> PathRow {
        PathRow {
            seq,
            node: NodeId(node),
            edge: edge.map(EdgeId),
            source: NodeId(s),
            target: NodeId(t),
            agg_cost: 0,
        }
    }

    #[test]
    fn forward_and_reversed_orientation() {
        let net = bent();
        let rows = DijkstraRouter
            .route_batch(&net, &[(NodeId(0), NodeId(2)), (NodeId(1), NodeId(0))], RouteMode::Fastest)
            .unwrap();
        let table = assemble(&net, &rows).unwrap();

        let forward = table.get(NodeId(0), NodeId(2)).unwrap();
        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0].geometry.points()[1], Point::new(50.0, 20.0));
        // Endpoints pinned to node positions.
        assert_eq!(forward[0].geometry.first(), Some(Point::new(0.0, 0.0)));
        assert_eq!(forward[0].geometry.last(), Some(Point::new(100.0, 0.0)));
        assert_eq!(forward[1].category, RoadCategory::Primary);
        assert_eq!(forward[1].speed_kmh, 50.0);

        let back = table.get(NodeId(1), NodeId(0)).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].geometry.first(), Some(Point::new(100.0, 0.0)));
        assert_eq!(back[0].geometry.last(), Some(Point::new(0.0, 0.0)));
        assert_eq!(back[0].geometry.points()[1], Point::new(50.0, 20.0));
    }

    #[test]
    fn unreachable_pair_absent() {
        let net = bent();
        let rows = DijkstraRouter
            .route_batch(&net, &[(NodeId(2), NodeId(0)), (NodeId(0), NodeId(1))], RouteMode::Fastest)
            .unwrap();
        let table = assemble(&net, &rows).unwrap();
        assert!(table.get(NodeId(2), NodeId(0)).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn hand_written_rows() {
        let net = bent();
        // 1 → 0 over edge 0 (reversed), terminal row without edge.
        let rows = [row(1, 1, Some(0), 1, 0), row(2, 0, None, 1, 0)];
        let table = assemble(&net, &rows).unwrap();
        assert_eq!(table.get(NodeId(1), NodeId(0)).unwrap().len(), 1);
    }

    #[test]
    fn edge_not_leaving_node_is_invalid() {
        let net = bent();
        // Edge 1 joins nodes 1 and 2, not node 0.
        let rows = [row(1, 0, Some(1), 0, 2), row(2, 2, None, 0, 2)];
        assert!(matches!(
            assemble(&net, &rows),
            Err(GenError::InvalidPathRow { seq: 1, .. })
        ));
    }

    #[test]
    fn one_way_against_direction_is_invalid() {
        let net = bent();
        let rows = [row(1, 2, Some(1), 2, 1), row(2, 1, None, 2, 1)];
        assert!(matches!(assemble(&net, &rows), Err(GenError::InvalidPathRow { .. })));
    }

    #[test]
    fn unknown_edge_is_invalid() {
        let net = bent();
        let rows = [row(1, 0, Some(42), 0, 1)];
        assert!(matches!(assemble(&net, &rows), Err(GenError::InvalidPathRow { .. })));
    }
}

// ── Delivery synthesis ────────────────────────────────────────────────────────

#[cfg(test)]
mod synthesizer {
    use chrono::Duration;
    use dl_core::{StreamRng, Timestamp, VehicleId};
    use dl_spatial::PathStep;
    use dl_trajectory::{KinematicBuilder, Trajectory, TrajectoryBuilder};

    use super::*;
    use crate::assembler::{assemble, PathTable};
    use crate::synthesizer::{DeliverySynthesizer, MAX_DWELL_MIN, MIN_DWELL_MIN};
    use crate::{DeliveryOutcome, GenError};

    struct NeverBuilder;

    impl TrajectoryBuilder for NeverBuilder {
        fn build(&self, _: &[PathStep], _: Timestamp, _: bool, _: &mut StreamRng) -> Option<Trajectory> {
            None
        }
    }

    fn plan(stops: &[u32], date: NaiveDate) -> RoutePlan {
        RoutePlan {
            delivery: DeliveryId(9),
            vehicle:  VehicleId(1),
            day:      0,
            date,
            stops:    stops.iter().map(|&n| NodeId(n)).collect(),
        }
    }

    fn paths(net: &RoadNetwork, plan: &RoutePlan) -> PathTable {
        let pairs: Vec<_> = plan.legs().collect();
        let rows = DijkstraRouter.route_batch(net, &pairs, RouteMode::Fastest).unwrap();
        assemble(net, &rows).unwrap()
    }

    #[test]
    fn segments_are_contiguous_and_ordered() {
        let net = grid(4, 200.0);
        let p = plan(&[0, 5, 15, 12, 0], monday());
        let table = paths(&net, &p);
        let builder = KinematicBuilder::default();
        let synth = DeliverySynthesizer::new(&net, &table, &builder, true);

        let outcome = synth.synthesize(&p, &mut StreamRng::from_seed(3)).unwrap();
        let DeliveryOutcome::Delivered(d) = outcome else {
            panic!("expected a delivery, got {outcome:?}");
        };

        assert_eq!(d.id, DeliveryId(9));
        assert_eq!(d.customers, 3);
        assert_eq!(d.segments.len() as u32, d.customers + 1);
        for (i, s) in d.segments.iter().enumerate() {
            assert_eq!(s.seq, i as u32 + 1);
            assert_eq!(s.delivery, d.id);
            assert_eq!(s.source, p.stops[i]);
            assert_eq!(s.target, p.stops[i + 1]);
        }

        // Day starts between 07:00 and 09:00.
        let seven = monday().and_hms_opt(7, 0, 0).unwrap();
        assert!(d.trajectory.start_time() >= seven);
        assert!(d.trajectory.start_time() <= seven + Duration::minutes(120));

        // Each segment starts when the previous one (including dwell) ended.
        for w in d.segments.windows(2) {
            assert_eq!(w[1].trajectory.start_time(), w[0].trajectory.end_time());
            assert_eq!(w[1].trajectory.start_point(), w[0].trajectory.end_point());
        }

        // Dwell: the last two instants of a customer-bound segment sit at the
        // same place, 10–60 minutes apart.
        for s in &d.segments[..d.segments.len() - 1] {
            let inst = s.trajectory.instants();
            let (a, b) = (inst[inst.len() - 2], inst[inst.len() - 1]);
            assert_eq!(a.point, b.point);
            let dwell = b.time - a.time;
            assert!(dwell >= Duration::milliseconds((MIN_DWELL_MIN * 60_000.0) as i64));
            assert!(dwell <= Duration::milliseconds((MAX_DWELL_MIN * 60_000.0) as i64));
        }
        // The return leg ends on arrival at the warehouse.
        assert_eq!(d.segments.last().unwrap().trajectory.end_point(), net.node_pos[0]);

        // The delivery is exactly the merge of its segments.
        let parts: Vec<_> = d.segments.iter().map(|s| s.trajectory.clone()).collect();
        assert_eq!(Trajectory::merge(&parts).unwrap(), d.trajectory);
        let total: usize = d.segments.iter().map(|s| s.trajectory.len()).sum();
        assert_eq!(d.trajectory.len(), total - (d.segments.len() - 1));
    }

    #[test]
    fn missing_path_drops_whole_delivery() {
        let net = grid(4, 200.0);
        let p = plan(&[0, 5, 15, 12, 0], monday());
        let mut table = paths(&net, &p);
        table.remove(NodeId(15), NodeId(12));
        let builder = KinematicBuilder::default();
        let synth = DeliverySynthesizer::new(&net, &table, &builder, false);

        let outcome = synth.synthesize(&p, &mut StreamRng::from_seed(3)).unwrap();
        assert_eq!(
            outcome,
            DeliveryOutcome::Dropped {
                id:      DeliveryId(9),
                vehicle: VehicleId(1),
                day:     0,
                reason:  DropReason::NoPath { source: NodeId(15), target: NodeId(12) },
            }
        );
    }

    #[test]
    fn unbuildable_trajectory_drops_delivery() {
        let net = grid(4, 200.0);
        let p = plan(&[0, 5, 15, 0], monday());
        let table = paths(&net, &p);
        let synth = DeliverySynthesizer::new(&net, &table, &NeverBuilder, false);
        let outcome = synth.synthesize(&p, &mut StreamRng::from_seed(3)).unwrap();
        assert!(matches!(
            outcome,
            DeliveryOutcome::Dropped { reason: DropReason::NoTrajectory { .. }, .. }
        ));
    }

    #[test]
    fn sunday_yields_no_delivery() {
        let net = grid(4, 200.0);
        let sunday = NaiveDate::from_ymd_opt(2020, 6, 7).unwrap();
        let p = plan(&[0, 5, 15, 0], sunday);
        let table = paths(&net, &p);
        let builder = KinematicBuilder::default();
        let synth = DeliverySynthesizer::new(&net, &table, &builder, false);
        assert_eq!(
            synth.synthesize(&p, &mut StreamRng::from_seed(3)).unwrap(),
            DeliveryOutcome::NoDelivery
        );
    }

    #[test]
    fn repeated_stop_is_fatal() {
        let net = grid(4, 200.0);
        let p = plan(&[0, 5, 5, 0], monday());
        let table = PathTable::new();
        let builder = KinematicBuilder::default();
        let synth = DeliverySynthesizer::new(&net, &table, &builder, false);
        assert!(matches!(
            synth.synthesize(&p, &mut StreamRng::from_seed(3)),
            Err(GenError::Invariant(_))
        ));
    }

    #[test]
    fn late_repeated_stop_wins_over_unbuildable_leg() {
        let net = grid(4, 200.0);
        let p = plan(&[0, 5, 6, 6, 0], monday());
        let table = PathTable::new();
        let synth = DeliverySynthesizer::new(&net, &table, &NeverBuilder, false);
        assert!(matches!(
            synth.synthesize(&p, &mut StreamRng::from_seed(3)),
            Err(GenError::Invariant(_))
        ));
    }

    #[test]
    fn unknown_node_is_fatal() {
        let net = grid(4, 200.0);
        let p = plan(&[0, 99, 0], monday());
        let table = PathTable::new();
        let builder = KinematicBuilder::default();
        let synth = DeliverySynthesizer::new(&net, &table, &builder, false);
        assert!(matches!(
            synth.synthesize(&p, &mut StreamRng::from_seed(3)),
            Err(GenError::Invariant(_))
        ));
    }
}

// ── End-to-end generation ─────────────────────────────────────────────────────

#[cfg(test)]
mod generator {
    use std::collections::HashSet;

    use super::*;
    use crate::{CancelToken, GenError, GeneratorBuilder, NoopObserver};

    fn run(cfg: GeneratorConfig) -> Recorder {
        let generator = GeneratorBuilder::new(cfg, grid(5, 150.0)).build().unwrap();
        let mut rec = Recorder::default();
        generator.run(&mut rec).unwrap();
        rec
    }

    #[test]
    fn two_vehicles_two_days() {
        let rec = run(config(2, 2, monday()));
        let summary = rec.summary.unwrap();
        assert_eq!(summary.vehicles, 2);
        assert_eq!(summary.planned_routes, 4);
        assert_eq!(summary.non_working_slots, 0);
        assert_eq!(summary.deliveries, 4);
        assert_eq!(summary.dropped(), 0);
        assert_eq!(summary.routed_pairs, summary.distinct_pairs);

        let ids: Vec<_> = rec.deliveries.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![DeliveryId(1), DeliveryId(2), DeliveryId(3), DeliveryId(4)]);
        // Vehicle-major, then day.
        let order: Vec<_> = rec.deliveries.iter().map(|d| (d.vehicle.0, d.day)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

        let segments: usize = rec.deliveries.iter().map(|d| d.segments.len()).sum();
        assert_eq!(summary.segments, segments);
        for d in &rec.deliveries {
            assert_eq!(d.segments.len() as u32, d.customers + 1);
        }
        // batch_size 5 → ceil(pairs / 5) batches.
        assert_eq!(rec.batches, summary.distinct_pairs.div_ceil(5));
    }

    #[test]
    fn plans_start_and_end_at_home() {
        let rec = run(config(3, 2, monday()));
        let fleet = rec.fleet.unwrap();
        for plan in &rec.plans {
            let vehicle = &fleet.vehicles[plan.vehicle.index()];
            let home = fleet.home_node(vehicle).unwrap();
            assert_eq!(plan.stops.first(), Some(&home));
            assert_eq!(plan.stops.last(), Some(&home));
        }
    }

    #[test]
    fn sunday_yields_nothing() {
        let sunday = NaiveDate::from_ymd_opt(2020, 6, 7).unwrap();
        let rec = run(config(3, 1, sunday));
        let summary = rec.summary.unwrap();
        assert_eq!(summary.non_working_slots, 3);
        assert_eq!(summary.planned_routes, 0);
        assert_eq!(summary.deliveries, 0);
        assert!(rec.deliveries.is_empty());
    }

    #[test]
    fn week_skips_only_sunday() {
        // Mon 2020-06-01 .. Mon 2020-06-08.
        let rec = run(config(1, 8, monday()));
        let summary = rec.summary.unwrap();
        assert_eq!(summary.non_working_slots, 1);
        assert_eq!(summary.planned_routes, 7);
        assert!(rec.deliveries.iter().all(|d| d.day != 6));
    }

    #[test]
    fn same_seed_same_output() {
        let a = run(config(3, 3, monday()));
        let b = run(config(3, 3, monday()));
        assert_eq!(a.plans, b.plans);
        assert_eq!(a.deliveries, b.deliveries);

        let mut other = config(3, 3, monday());
        other.seed = 8;
        let c = run(other);
        assert_ne!(a.plans, c.plans);
    }

    #[test]
    fn absent_pair_drops_exactly_its_deliveries() {
        let cfg = config(4, 2, monday());
        let baseline = run(cfg.clone());
        let missing = baseline.plans[0].legs().next().unwrap();

        let generator = GeneratorBuilder::new(cfg, grid(5, 150.0))
            .router(SkipRouter { skip: vec![missing] })
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let summary = generator.run(&mut rec).unwrap();

        let expected: HashSet<DeliveryId> = baseline
            .plans
            .iter()
            .filter(|p| p.legs().any(|leg| leg == missing))
            .map(|p| p.delivery)
            .collect();
        let dropped: HashSet<DeliveryId> = rec.dropped.iter().map(|(id, _)| *id).collect();
        assert_eq!(dropped, expected);
        assert!(rec.dropped.iter().all(|(_, r)| matches!(r, DropReason::NoPath { .. })));
        assert_eq!(summary.dropped_no_path, expected.len());
        assert_eq!(summary.deliveries + expected.len(), summary.planned_routes);
        assert_eq!(summary.routed_pairs + 1, summary.distinct_pairs);

        // Surviving deliveries are unaffected by the missing pair.
        let kept: Vec<_> = baseline
            .deliveries
            .iter()
            .filter(|d| !expected.contains(&d.id))
            .cloned()
            .collect();
        assert_eq!(rec.deliveries, kept);
        // No partial segments leak from dropped deliveries.
        assert!(rec.deliveries.iter().all(|d| !expected.contains(&d.id)));
    }

    #[test]
    fn cancelled_run() {
        let token = CancelToken::new();
        let generator = GeneratorBuilder::new(config(2, 2, monday()), grid(4, 100.0))
            .cancel_token(token.clone())
            .build()
            .unwrap();
        token.cancel();
        assert!(matches!(generator.run(&mut NoopObserver), Err(GenError::Cancelled)));
    }

    #[test]
    fn empty_network_and_bad_config_rejected() {
        let empty = RoadNetworkBuilder::new().build();
        assert!(matches!(
            GeneratorBuilder::new(config(1, 1, monday()), empty).build(),
            Err(GenError::EmptyNetwork)
        ));

        let mut cfg = config(1, 1, monday());
        cfg.batch_size = 0;
        assert!(matches!(
            GeneratorBuilder::new(cfg, grid(3, 100.0)).build(),
            Err(GenError::Config(_))
        ));
    }

    #[test]
    fn builder_restricts_network() {
        // Grid plus a node with a one-way spur out of the grid.
        let mut b = RoadNetworkBuilder::new();
        for i in 0..9u32 {
            b.add_node(Point::new((i % 3) as f64 * 100.0, (i / 3) as f64 * 100.0));
        }
        for i in 0..9u32 {
            if i % 3 < 2 {
                b.add_road(NodeId(i), NodeId(i + 1), RoadCategory::Residential, 30.0);
            }
            if i < 6 {
                b.add_road(NodeId(i), NodeId(i + 3), RoadCategory::Residential, 30.0);
            }
        }
        let spur = b.add_node(Point::new(500.0, 500.0));
        b.add_oneway(NodeId(8), spur, RoadCategory::Service, 20.0);

        let generator = GeneratorBuilder::new(config(1, 1, monday()), b.build()).build().unwrap();
        assert_eq!(generator.network.node_count(), 9);
    }
}

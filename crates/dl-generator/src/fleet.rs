//! Warehouses and vehicles.
//!
//! Warehouses sit on random network nodes.  Vehicles are assigned to
//! warehouses round-robin, so vehicle `i` belongs to warehouse
//! `i % warehouse_count`.  All draws use their own seed-derived streams, so
//! the fleet does not depend on how many days are later planned.

use dl_core::{GeneratorConfig, NodeId, Point, Stream, StreamRng, VehicleId, WarehouseId};
use dl_spatial::RoadNetwork;

use crate::{GenError, GenResult};

/// Vehicle types and their share of the fleet.
const VEHICLE_TYPES: [(&str, f64); 3] = [
    ("van",         0.75),
    ("light truck", 0.20),
    ("truck",       0.05),
];

const VEHICLE_BRANDS: [&str; 10] = [
    "Citroen", "Fiat", "Ford", "Iveco", "MAN",
    "Mercedes-Benz", "Opel", "Peugeot", "Renault", "Volkswagen",
];

/// Redraws allowed when a warehouse lands on an already used node.
const WAREHOUSE_NODE_RETRIES: u32 = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct Warehouse {
    pub id:       WarehouseId,
    pub node:     NodeId,
    pub position: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id:           VehicleId,
    /// Licence plate, e.g. `B-KQ 417`.
    pub licence:      String,
    pub vehicle_type: &'static str,
    pub brand:        &'static str,
    pub warehouse:    WarehouseId,
}

/// Every warehouse and vehicle of a run.
#[derive(Clone, Debug, Default)]
pub struct Fleet {
    pub warehouses: Vec<Warehouse>,
    pub vehicles:   Vec<Vehicle>,
}

impl Fleet {
    /// Create `config.warehouse_count()` warehouses and
    /// `config.vehicle_count()` vehicles on `network`.
    pub fn create(network: &RoadNetwork, config: &GeneratorConfig) -> GenResult<Fleet> {
        config.validate()?;
        if network.is_empty() {
            return Err(GenError::EmptyNetwork);
        }
        let warehouses = place_warehouses(network, config.warehouse_count(), config.seed);
        let vehicles = (0..config.vehicle_count())
            .map(|i| {
                let id = VehicleId(i);
                let warehouse = WarehouseId(i % warehouses.len() as u32);
                new_vehicle(id, warehouse, &mut StreamRng::new(config.seed, Stream::Vehicle(id)))
            })
            .collect();
        Ok(Fleet { warehouses, vehicles })
    }

    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(id.index())
    }

    /// Home warehouse node of `vehicle`.
    pub fn home_node(&self, vehicle: &Vehicle) -> Option<NodeId> {
        self.warehouse(vehicle.warehouse).map(|w| w.node)
    }
}

/// Draw distinct nodes while the network has room; once redraws run out the
/// last draw is kept even if another warehouse already uses it.
fn place_warehouses(network: &RoadNetwork, count: u32, seed: u64) -> Vec<Warehouse> {
    let mut rng = StreamRng::new(seed, Stream::Warehouses);
    let max_node = network.node_count() as u32 - 1;
    let mut warehouses: Vec<Warehouse> = Vec::with_capacity(count as usize);

    for i in 0..count {
        let mut node = NodeId(rng.uniform_int(0, max_node));
        let mut tries = 0;
        while tries < WAREHOUSE_NODE_RETRIES && warehouses.iter().any(|w| w.node == node) {
            node = NodeId(rng.uniform_int(0, max_node));
            tries += 1;
        }
        warehouses.push(Warehouse {
            id:       WarehouseId(i),
            node,
            position: network.node_pos[node.index()],
        });
    }
    warehouses
}

fn new_vehicle(id: VehicleId, warehouse: WarehouseId, rng: &mut StreamRng) -> Vehicle {
    Vehicle {
        id,
        licence: licence_plate(rng),
        vehicle_type: vehicle_type(rng),
        brand: rng.choose(&VEHICLE_BRANDS).copied().unwrap_or(VEHICLE_BRANDS[0]),
        warehouse,
    }
}

fn licence_plate(rng: &mut StreamRng) -> String {
    let a = (b'A' + rng.uniform_int(0, 25) as u8) as char;
    let b = (b'A' + rng.uniform_int(0, 25) as u8) as char;
    let number = rng.uniform_int(1, 999);
    format!("B-{a}{b} {number}")
}

fn vehicle_type(rng: &mut StreamRng) -> &'static str {
    let u: f64 = rng.random();
    let mut acc = 0.0;
    for (name, share) in VEHICLE_TYPES {
        acc += share;
        if u < acc {
            return name;
        }
    }
    VEHICLE_TYPES[VEHICLE_TYPES.len() - 1].0
}

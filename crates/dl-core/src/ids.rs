//! Typed identifiers.
//!
//! Network ids are dense indices into the `RoadNetwork` arrays; fleet and
//! delivery ids number the generated entities.  External ids from the input
//! files are plain `i64` and never wrapped.
//!
//! Ids print as `<label> <n>` (`node 17`, `delivery 4`) so they read
//! naturally inside log and error messages.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident, $label:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Marks an unset slot, e.g. in remap tables.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id!(
    /// Dense index of a road-network node.
    NodeId, "node"
);

typed_id!(
    /// Dense index of a road-network edge.
    EdgeId, "edge"
);

typed_id!(
    /// Warehouse index, 0-based.
    WarehouseId, "warehouse"
);

typed_id!(
    /// Vehicle index, 0-based.
    VehicleId, "vehicle"
);

typed_id!(
    /// Delivery number, assigned in plan order starting at 1.
    DeliveryId, "delivery"
);

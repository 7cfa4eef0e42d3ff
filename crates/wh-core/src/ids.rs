//! Typed identifiers.
//!
//! Both are `Copy + Ord + Hash` so they key maps and sort without fuss.
//! The inner integer is `pub`; `.index()` is the way to turn one into a
//! `Vec` index.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a vehicle in the fleet.  Ascending `AgentId` is the fixed
    /// per-tick processing order.
    pub struct AgentId(u32) => "agent";
}

typed_id! {
    /// Coarse mutual-exclusion zone: a pallet block or a one-lane column.
    pub struct SectorId(u32) => "sector";
}

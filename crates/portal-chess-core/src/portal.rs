use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::types::{Color, NetworkKind, Square};

pub type PortalExits = ArrayVec<Square, 4>;

/// The portal networks of a game: one fully-connected network per color plus
/// symmetric neutral pairs usable by either side. The three networks are
/// disjoint in the reference configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalConfig {
    pub white_exclusive: ArrayVec<Square, 8>,
    pub black_exclusive: ArrayVec<Square, 8>,
    pub neutral_pairs: ArrayVec<[Square; 2], 4>,
}

fn squares(labels: &[&str]) -> ArrayVec<Square, 8> {
    labels
        .iter()
        .map(|label| Square::parse(label).expect("valid portal square label"))
        .collect()
}

impl PortalConfig {
    /// The reference networks: white {D5, F5, E3, B3}, black {C4, E4, D6, G6},
    /// neutral {B5, G4}.
    pub fn reference() -> Self {
        Self {
            white_exclusive: squares(&["D5", "F5", "E3", "B3"]),
            black_exclusive: squares(&["C4", "E4", "D6", "G6"]),
            neutral_pairs: [[
                Square::parse("B5").expect("valid portal square label"),
                Square::parse("G4").expect("valid portal square label"),
            ]]
            .into_iter()
            .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            white_exclusive: ArrayVec::new(),
            black_exclusive: ArrayVec::new(),
            neutral_pairs: ArrayVec::new(),
        }
    }

    fn exclusive_for(&self, color: Color) -> &[Square] {
        match color {
            Color::White => &self.white_exclusive,
            Color::Black => &self.black_exclusive,
        }
    }

    /// The network at `entry` usable by `color`, with the possible exits in
    /// declaration order. Occupancy and temporal restrictions are the
    /// caller's concern.
    pub fn network_at(&self, entry: Square, color: Color) -> Option<(NetworkKind, PortalExits)> {
        let exclusive = self.exclusive_for(color);
        if exclusive.contains(&entry) {
            let exits = exclusive
                .iter()
                .copied()
                .filter(|&square| square != entry)
                .collect();
            return Some((NetworkKind::Exclusive, exits));
        }

        for pair in &self.neutral_pairs {
            if pair[0] == entry {
                let mut exits = PortalExits::new();
                exits.push(pair[1]);
                return Some((NetworkKind::Neutral, exits));
            }
            if pair[1] == entry {
                let mut exits = PortalExits::new();
                exits.push(pair[0]);
                return Some((NetworkKind::Neutral, exits));
            }
        }

        None
    }

    /// Every portal square a piece of `color` may enter and activate.
    pub fn squares_usable_by(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        self.exclusive_for(color)
            .iter()
            .copied()
            .chain(self.neutral_pairs.iter().flat_map(|pair| pair.iter().copied()))
    }
}

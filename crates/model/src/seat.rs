use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::train::Train;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Seat {
    pub train: Id<Train>,
    pub carriage: i32,
    pub seat_number: i32,
    pub is_available: bool,
}

impl HasId for Seat {
    type IdType = i64;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("a train needs at least one carriage, got {0}")]
    NoCarriages(i32),
    #[error("a carriage needs at least one place, got {0}")]
    NoPlaces(i32),
    #[error("a train has at most {max} carriages, got {0}", max = SeatLayout::MAX_CARRIAGES)]
    TooManyCarriages(i32),
    #[error("a carriage has at most {max} places, got {0}", max = SeatLayout::MAX_PLACES_IN_CARRIAGE)]
    TooManyPlaces(i32),
}

/// The seat grid of a train: carriages `1..=carriages`, each holding seats
/// `1..=places_in_carriage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatLayout {
    carriages: i32,
    places_in_carriage: i32,
}

impl SeatLayout {
    pub const MAX_CARRIAGES: i32 = 100;
    pub const MAX_PLACES_IN_CARRIAGE: i32 = 500;

    pub fn new(carriages: i32, places_in_carriage: i32) -> Result<Self, LayoutError> {
        if carriages < 1 {
            return Err(LayoutError::NoCarriages(carriages));
        }
        if places_in_carriage < 1 {
            return Err(LayoutError::NoPlaces(places_in_carriage));
        }
        if carriages > Self::MAX_CARRIAGES {
            return Err(LayoutError::TooManyCarriages(carriages));
        }
        if places_in_carriage > Self::MAX_PLACES_IN_CARRIAGE {
            return Err(LayoutError::TooManyPlaces(places_in_carriage));
        }
        Ok(Self {
            carriages,
            places_in_carriage,
        })
    }

    pub fn len(&self) -> usize {
        self.carriages as usize * self.places_in_carriage as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(carriage, seat_number)` pairs, carriage major.
    pub fn positions(&self) -> impl Iterator<Item = (i32, i32)> {
        let places = self.places_in_carriage;
        (1..=self.carriages)
            .flat_map(move |carriage| (1..=places).map(move |seat| (carriage, seat)))
    }

    /// Fresh, available seats for every position of the layout.
    pub fn seats(&self, train: Id<Train>) -> impl Iterator<Item = Seat> {
        self.positions().map(move |(carriage, seat_number)| Seat {
            train,
            carriage,
            seat_number,
            is_available: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn two_carriages_of_three() {
        let layout = SeatLayout::new(2, 3).unwrap();
        let positions = layout.positions().collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]
        );
    }

    #[test]
    fn rejects_empty_layouts() {
        assert_eq!(SeatLayout::new(0, 10), Err(LayoutError::NoCarriages(0)));
        assert_eq!(SeatLayout::new(5, -1), Err(LayoutError::NoPlaces(-1)));
    }

    #[test]
    fn rejects_oversized_layouts() {
        assert_eq!(
            SeatLayout::new(100_000, 10),
            Err(LayoutError::TooManyCarriages(100_000))
        );
        assert_eq!(
            SeatLayout::new(10, 100_000),
            Err(LayoutError::TooManyPlaces(100_000))
        );
        let largest = SeatLayout::new(
            SeatLayout::MAX_CARRIAGES,
            SeatLayout::MAX_PLACES_IN_CARRIAGE,
        )
        .unwrap();
        assert_eq!(largest.len(), 50_000);
    }

    #[test]
    fn seats_start_available_on_their_train() {
        let seats = SeatLayout::new(5, 10)
            .unwrap()
            .seats(Id::new(7))
            .collect::<Vec<_>>();
        assert_eq!(seats.len(), 50);
        assert!(seats.iter().all(|seat| seat.is_available));
        assert!(seats.iter().all(|seat| seat.train == Id::new(7)));
    }

    proptest! {
        #[test]
        fn positions_cover_the_grid_exactly_once(carriages in 1i32..30, places in 1i32..60) {
            let layout = SeatLayout::new(carriages, places).unwrap();
            let positions = layout.positions().collect::<Vec<_>>();
            let unique = positions.iter().copied().collect::<HashSet<_>>();

            prop_assert_eq!(positions.len(), layout.len());
            prop_assert_eq!(unique.len(), layout.len());
            let inside = positions
                .iter()
                .all(|(c, s)| (1..=carriages).contains(c) && (1..=places).contains(s));
            prop_assert!(inside);
        }
    }
}

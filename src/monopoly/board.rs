//! Board topology: forty spaces, each one tagged variant with its own payload.
//!
//! The board is immutable once built and is shared between every cloned game state through
//! an `Arc`. Mutable per-space state (owner, mortgage flag, development) lives in
//! [`MonopolyState`](super::MonopolyState).

use monopoly_data::{
    ColourGroup, StationData, StreetData, TaxData, TaxKind, UtilityData, BOARD_SIZE,
    CHANCE_POSITIONS, COMMUNITY_CHEST_POSITIONS, FREE_PARKING_POSITION, GO_INCOME, GO_POSITION,
    GO_TO_JAIL_POSITION, JAIL_FINE, JAIL_POSITION, STATIONS, STREETS, TAXES, UTILITIES,
};

use crate::error::BoardError;

/// Development level that represents a hotel.
pub const HOTEL_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Street {
    pub name: &'static str,
    pub price: i64,
    pub house_price: i64,
    pub rents: [i64; 6],
    pub group: ColourGroup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: &'static str,
    pub price: i64,
    pub rents: [i64; 4],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utility {
    pub name: &'static str,
    pub price: i64,
    pub multipliers: [i64; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tax {
    pub name: &'static str,
    pub amount: i64,
    pub kind: TaxKind,
}

/// One board space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Space {
    Go,
    Street(Street),
    Station(Station),
    Utility(Utility),
    Tax(Tax),
    Chance,
    CommunityChest,
    Jail,
    FreeParking,
    GoToJail,
}

impl Space {
    pub fn name(&self) -> &'static str {
        match self {
            Space::Go => "Go",
            Space::Street(s) => s.name,
            Space::Station(s) => s.name,
            Space::Utility(u) => u.name,
            Space::Tax(t) => t.name,
            Space::Chance => "Chance",
            Space::CommunityChest => "Community Chest",
            Space::Jail => "Jail",
            Space::FreeParking => "Free Parking",
            Space::GoToJail => "Go To Jail",
        }
    }

    /// Purchase price, for the spaces that can be owned.
    pub fn price(&self) -> Option<i64> {
        match self {
            Space::Street(s) => Some(s.price),
            Space::Station(s) => Some(s.price),
            Space::Utility(u) => Some(u.price),
            _ => None,
        }
    }

    pub fn is_property(&self) -> bool {
        self.price().is_some()
    }

    pub fn as_street(&self) -> Option<&Street> {
        match self {
            Space::Street(s) => Some(s),
            _ => None,
        }
    }
}

/// Money raised by mortgaging a property bought at `price`.
pub fn mortgage_value(price: i64) -> i64 {
    price / 2
}

/// Cost of lifting a mortgage: the mortgage value plus ten percent, rounded up.
pub fn unmortgage_price(price: i64) -> i64 {
    let value = mortgage_value(price);
    value + (value + 9) / 10
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    spaces: Vec<Space>,
    groups: Vec<Vec<usize>>,
    stations: Vec<usize>,
    utilities: Vec<usize>,
    go_income: i64,
    jail_fine: i64,
    jail_position: usize,
}

impl Board {
    /// The standard UK board.
    pub fn standard() -> Result<Self, BoardError> {
        Self::from_tables(&STREETS, &STATIONS, &UTILITIES, &TAXES)
    }

    /// Builds a board from property tables. Corner and card spaces are placed at their
    /// fixed positions; every other position must be covered by exactly one table entry.
    pub fn from_tables(
        streets: &[StreetData],
        stations: &[StationData],
        utilities: &[UtilityData],
        taxes: &[TaxData],
    ) -> Result<Self, BoardError> {
        let mut slots: Vec<Option<Space>> = vec![None; BOARD_SIZE];

        let mut place = |position: usize, space: Space| -> Result<(), BoardError> {
            let slot = slots
                .get_mut(position)
                .ok_or(BoardError::OutOfRange(position))?;
            if slot.is_some() {
                return Err(BoardError::Duplicate(position));
            }
            *slot = Some(space);
            Ok(())
        };

        place(GO_POSITION, Space::Go)?;
        place(JAIL_POSITION, Space::Jail)?;
        place(FREE_PARKING_POSITION, Space::FreeParking)?;
        place(GO_TO_JAIL_POSITION, Space::GoToJail)?;
        for position in CHANCE_POSITIONS {
            place(position, Space::Chance)?;
        }
        for position in COMMUNITY_CHEST_POSITIONS {
            place(position, Space::CommunityChest)?;
        }
        for s in streets {
            place(
                s.position,
                Space::Street(Street {
                    name: s.name,
                    price: s.price,
                    house_price: s.house_price,
                    rents: s.rents,
                    group: s.group,
                }),
            )?;
        }
        for s in stations {
            place(
                s.position,
                Space::Station(Station {
                    name: s.name,
                    price: s.price,
                    rents: s.rents,
                }),
            )?;
        }
        for u in utilities {
            place(
                u.position,
                Space::Utility(Utility {
                    name: u.name,
                    price: u.price,
                    multipliers: u.multipliers,
                }),
            )?;
        }
        for t in taxes {
            place(
                t.position,
                Space::Tax(Tax {
                    name: t.name,
                    amount: t.amount,
                    kind: t.kind,
                }),
            )?;
        }

        let spaces = slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| slot.ok_or(BoardError::Missing(position)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups = vec![Vec::new(); ColourGroup::ALL.len()];
        let mut station_positions = Vec::new();
        let mut utility_positions = Vec::new();
        for (position, space) in spaces.iter().enumerate() {
            match space {
                Space::Street(s) => groups[s.group.index()].push(position),
                Space::Station(_) => station_positions.push(position),
                Space::Utility(_) => utility_positions.push(position),
                _ => {}
            }
        }

        Ok(Self {
            spaces,
            groups,
            stations: station_positions,
            utilities: utility_positions,
            go_income: GO_INCOME,
            jail_fine: JAIL_FINE,
            jail_position: JAIL_POSITION,
        })
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn space(&self, position: usize) -> &Space {
        &self.spaces[position % self.spaces.len()]
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn street(&self, position: usize) -> Option<&Street> {
        self.space(position).as_street()
    }

    /// Street positions of a colour group, in board order.
    pub fn group_members(&self, group: ColourGroup) -> &[usize] {
        &self.groups[group.index()]
    }

    pub fn stations(&self) -> &[usize] {
        &self.stations
    }

    pub fn utilities(&self) -> &[usize] {
        &self.utilities
    }

    pub fn go_income(&self) -> i64 {
        self.go_income
    }

    pub fn jail_fine(&self) -> i64 {
        self.jail_fine
    }

    pub fn jail_position(&self) -> usize {
        self.jail_position
    }

    /// Positions of every ownable space, in board order.
    pub fn property_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.spaces
            .iter()
            .enumerate()
            .filter(|(_, space)| space.is_property())
            .map(|(position, _)| position)
    }

    /// Position `steps` spaces ahead of `from`, wrapping past Go.
    pub fn advance(&self, from: usize, steps: usize) -> usize {
        (from + steps) % self.spaces.len()
    }

    /// Position `steps` spaces behind `from`, wrapping backwards past Go.
    pub fn retreat(&self, from: usize, steps: usize) -> usize {
        let len = self.spaces.len();
        (from + len - steps % len) % len
    }

    /// First station strictly ahead of `from`, wrapping around the board.
    pub fn nearest_station(&self, from: usize) -> usize {
        Self::next_in(&self.stations, from)
    }

    /// First utility strictly ahead of `from`, wrapping around the board.
    pub fn nearest_utility(&self, from: usize) -> usize {
        Self::next_in(&self.utilities, from)
    }

    fn next_in(positions: &[usize], from: usize) -> usize {
        positions
            .iter()
            .copied()
            .find(|&p| p > from)
            .or_else(|| positions.first().copied())
            .unwrap_or(from)
    }

    pub fn mortgage_value(&self, position: usize) -> i64 {
        self.space(position).price().map_or(0, mortgage_value)
    }

    pub fn unmortgage_price(&self, position: usize) -> i64 {
        self.space(position).price().map_or(0, unmortgage_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board_layout() {
        let board = Board::standard().unwrap();
        assert_eq!(board.len(), 40);
        assert_eq!(*board.space(0), Space::Go);
        assert_eq!(*board.space(10), Space::Jail);
        assert_eq!(*board.space(30), Space::GoToJail);
        assert_eq!(board.space(39).name(), "Mayfair");
        assert_eq!(board.property_positions().count(), 28);
        assert_eq!(board.group_members(ColourGroup::Orange), &[16, 18, 19]);
    }

    #[test]
    fn test_missing_space_is_rejected() {
        let err = Board::from_tables(&STREETS[1..], &STATIONS, &UTILITIES, &TAXES).unwrap_err();
        assert_eq!(err, BoardError::Missing(1));
    }

    #[test]
    fn test_duplicate_space_is_rejected() {
        let mut streets = STREETS;
        streets[1].position = 1;
        let err = Board::from_tables(&streets, &STATIONS, &UTILITIES, &TAXES).unwrap_err();
        assert_eq!(err, BoardError::Duplicate(1));
    }

    #[test]
    fn test_nearest_station_and_utility() {
        let board = Board::standard().unwrap();
        assert_eq!(board.nearest_station(7), 15);
        assert_eq!(board.nearest_station(22), 25);
        assert_eq!(board.nearest_station(36), 5);
        assert_eq!(board.nearest_utility(7), 12);
        assert_eq!(board.nearest_utility(22), 28);
        assert_eq!(board.nearest_utility(36), 12);
    }

    #[test]
    fn test_mortgage_prices() {
        assert_eq!(mortgage_value(200), 100);
        assert_eq!(unmortgage_price(200), 110);
        // 75 + 7.5 rounds up
        assert_eq!(unmortgage_price(150), 83);
        assert_eq!(unmortgage_price(60), 33);
    }

    #[test]
    fn test_retreat_wraps_backwards() {
        let board = Board::standard().unwrap();
        assert_eq!(board.retreat(7, 3), 4);
        assert_eq!(board.retreat(1, 3), 38);
    }
}

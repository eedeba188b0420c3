#![no_std]

//! Static tables for the standard (UK) Monopoly board.
//!
//! These tables are read once when the engine builds its `Board` and are never
//! mutated. Amounts are whole currency units.

/// Number of spaces around the board.
pub const BOARD_SIZE: usize = 40;

pub const GO_POSITION: usize = 0;
pub const JAIL_POSITION: usize = 10;
pub const FREE_PARKING_POSITION: usize = 20;
pub const GO_TO_JAIL_POSITION: usize = 30;

/// Income credited when a player passes or lands on Go.
pub const GO_INCOME: i64 = 200;
/// Cash every player starts the game with.
pub const STARTING_CASH: i64 = 1500;
/// Price of leaving jail early, or of being forced out on the last jailed turn.
pub const JAIL_FINE: i64 = 50;

pub const CHANCE_POSITIONS: [usize; 3] = [7, 22, 36];
pub const COMMUNITY_CHEST_POSITIONS: [usize; 3] = [2, 17, 33];

/// Colour group of a street. Building is only possible on a complete group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColourGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

impl ColourGroup {
    pub const ALL: [ColourGroup; 8] = [
        ColourGroup::Brown,
        ColourGroup::LightBlue,
        ColourGroup::Pink,
        ColourGroup::Orange,
        ColourGroup::Red,
        ColourGroup::Yellow,
        ColourGroup::Green,
        ColourGroup::DarkBlue,
    ];

    /// Dense index, usable to address per-group tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A colour-group street.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetData {
    pub name: &'static str,
    pub position: usize,
    pub price: i64,
    pub house_price: i64,
    /// Rent at development level 0 (undeveloped) through 5 (hotel).
    pub rents: [i64; 6],
    pub group: ColourGroup,
}

/// A railway station. Rent depends on how many stations the owner holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationData {
    pub name: &'static str,
    pub position: usize,
    pub price: i64,
    pub rents: [i64; 4],
}

/// A utility. Rent is a multiplier of the dice total, by utilities held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilityData {
    pub name: &'static str,
    pub position: usize,
    pub price: i64,
    pub multipliers: [i64; 2],
}

/// How a tax space computes what is owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxKind {
    /// The lesser of the fixed amount and a tenth of the payer's wealth.
    Income,
    /// Always the fixed amount.
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxData {
    pub name: &'static str,
    pub position: usize,
    pub amount: i64,
    pub kind: TaxKind,
}

const fn street(
    name: &'static str,
    position: usize,
    price: i64,
    house_price: i64,
    rents: [i64; 6],
    group: ColourGroup,
) -> StreetData {
    StreetData {
        name,
        position,
        price,
        house_price,
        rents,
        group,
    }
}

pub const STREETS: [StreetData; 22] = [
    street("Old Kent Road", 1, 60, 50, [2, 10, 30, 90, 160, 250], ColourGroup::Brown),
    street("Whitechapel Road", 3, 60, 50, [4, 20, 60, 180, 320, 450], ColourGroup::Brown),
    street("The Angel Islington", 6, 100, 50, [6, 30, 90, 270, 400, 550], ColourGroup::LightBlue),
    street("Euston Road", 8, 100, 50, [6, 30, 90, 270, 400, 550], ColourGroup::LightBlue),
    street("Pentonville Road", 9, 120, 50, [8, 40, 100, 300, 450, 600], ColourGroup::LightBlue),
    street("Pall Mall", 11, 140, 100, [10, 50, 150, 450, 625, 750], ColourGroup::Pink),
    street("Whitehall", 13, 140, 100, [10, 50, 150, 450, 625, 750], ColourGroup::Pink),
    street("Northumberland Avenue", 14, 160, 100, [12, 60, 180, 500, 700, 900], ColourGroup::Pink),
    street("Bow Street", 16, 180, 100, [14, 70, 200, 550, 750, 950], ColourGroup::Orange),
    street("Marlborough Street", 18, 180, 100, [14, 70, 200, 550, 750, 950], ColourGroup::Orange),
    street("Vine Street", 19, 200, 100, [16, 80, 220, 600, 800, 1000], ColourGroup::Orange),
    street("The Strand", 21, 220, 150, [18, 90, 250, 700, 875, 1050], ColourGroup::Red),
    street("Fleet Street", 23, 220, 150, [18, 90, 250, 700, 875, 1050], ColourGroup::Red),
    street("Trafalgar Square", 24, 240, 150, [20, 100, 300, 750, 925, 1100], ColourGroup::Red),
    street("Leicester Square", 26, 260, 150, [22, 110, 330, 800, 975, 1150], ColourGroup::Yellow),
    street("Coventry Street", 27, 260, 150, [22, 110, 330, 800, 975, 1150], ColourGroup::Yellow),
    street("Piccadilly", 29, 280, 150, [24, 120, 360, 850, 1025, 1200], ColourGroup::Yellow),
    street("Regent Street", 31, 300, 200, [26, 130, 390, 900, 1100, 1275], ColourGroup::Green),
    street("Oxford Street", 32, 300, 200, [26, 130, 390, 900, 1100, 1275], ColourGroup::Green),
    street("Bond Street", 34, 320, 200, [28, 150, 450, 1000, 1200, 1400], ColourGroup::Green),
    street("Park Lane", 37, 350, 200, [35, 175, 500, 1100, 1300, 1500], ColourGroup::DarkBlue),
    street("Mayfair", 39, 400, 200, [50, 200, 600, 1400, 1700, 2000], ColourGroup::DarkBlue),
];

pub const STATIONS: [StationData; 4] = [
    StationData { name: "King's Cross Station", position: 5, price: 200, rents: [25, 50, 100, 200] },
    StationData { name: "Marylebone Station", position: 15, price: 200, rents: [25, 50, 100, 200] },
    StationData { name: "Fenchurch St. Station", position: 25, price: 200, rents: [25, 50, 100, 200] },
    StationData { name: "Liverpool St. Station", position: 35, price: 200, rents: [25, 50, 100, 200] },
];

pub const UTILITIES: [UtilityData; 2] = [
    UtilityData { name: "Electric Company", position: 12, price: 150, multipliers: [4, 10] },
    UtilityData { name: "Water Works", position: 28, price: 150, multipliers: [4, 10] },
];

pub const TAXES: [TaxData; 2] = [
    TaxData { name: "Income Tax", position: 4, amount: 200, kind: TaxKind::Income },
    TaxData { name: "Super Tax", position: 38, amount: 100, kind: TaxKind::Flat },
];

/// Finds the street at a board position, if any.
pub fn street_at(position: usize) -> Option<&'static StreetData> {
    STREETS.iter().find(|s| s.position == position)
}

/// Number of streets that make up a colour group.
pub fn group_size(group: ColourGroup) -> usize {
    STREETS.iter().filter(|s| s.group == group).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_sizes() {
        assert_eq!(group_size(ColourGroup::Brown), 2);
        assert_eq!(group_size(ColourGroup::Orange), 3);
        assert_eq!(group_size(ColourGroup::DarkBlue), 2);
        let total: usize = ColourGroup::ALL.iter().map(|g| group_size(*g)).sum();
        assert_eq!(total, STREETS.len());
    }

    #[test]
    fn test_street_rents_increase_with_development() {
        for s in STREETS.iter() {
            for pair in s.rents.windows(2) {
                assert!(pair[0] < pair[1], "{} rent schedule is not increasing", s.name);
            }
        }
    }

    #[test]
    fn test_street_lookup() {
        let vine = street_at(19).unwrap();
        assert_eq!(vine.name, "Vine Street");
        assert_eq!(vine.group, ColourGroup::Orange);
        assert!(street_at(GO_POSITION).is_none());
    }
}

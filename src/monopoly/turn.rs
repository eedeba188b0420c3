//! Turn resolution: dice, jail, movement, space effects, cards and payments.
//!
//! A strategy-driven turn is a loop of rolls that continues while the player rolls doubles,
//! stopping on the third consecutive double (which jails the player) or on any roll that
//! ends in jail. The controlled player resolves one roll at a time instead: its follow-up
//! roll is recorded as pending and taken when it ends its turn.
//!
//! Payments go through [`settle`]. A shortfall of the controlled player during its own roll
//! is written into its debt ledger, to be cleared through actions. Every other shortfall
//! triggers automatic debt raising and, failing that, bankruptcy.

use monopoly_data::ColourGroup;
use rand::Rng;
use tracing::{debug, trace};

use super::board::Space;
use super::cards::{CardEffect, DeckKind};
use super::debt;
use super::player::{JailStatus, PlayerId, Recipient};
use super::state::{DiceRoll, MonopolyState};
use super::strategy::{JailExit, Strategy};

/// Jailed turns after which release is forced.
pub const MAX_JAIL_TURNS: u8 = 3;
/// Consecutive doubles that send a player to jail.
pub const MAX_CONSECUTIVE_DOUBLES: u8 = 3;

/// Who makes the discretionary decisions for the moving player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Strategy,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RollOutcome {
    TurnOver,
    RollAgain,
    /// The controlled player is on its forced jail turn and must get out through an action.
    AwaitingJailExit,
}

#[derive(Debug, Clone, Copy)]
enum RentRule {
    Normal,
    DoubleStation,
    TenTimesDice,
}

#[derive(Debug, Clone, Copy)]
struct Turn {
    player: PlayerId,
    control: Control,
    roll: DiceRoll,
}

impl Turn {
    fn defers(&self, payer: PlayerId) -> bool {
        self.control == Control::Agent && payer == self.player
    }
}

/// Pays `amount` from `payer` to `recipient`, or defers or raises funds when short.
/// Returns whether the payment was made.
pub(crate) fn settle(
    state: &mut MonopolyState,
    payer: PlayerId,
    recipient: Recipient,
    amount: i64,
    defer: bool,
) -> bool {
    if amount <= 0 {
        return true;
    }
    if state.player(payer).bankrupt {
        return false;
    }
    if state.player(payer).cash >= amount {
        state.transfer(payer, recipient, amount);
        return true;
    }
    if defer {
        *state.player_mut(payer).debts.entry(recipient).or_insert(0) += amount;
        debug!(%payer, %recipient, amount, "payment deferred to ledger");
        return false;
    }
    if debt::raise_funds(state, payer, amount) {
        state.transfer(payer, recipient, amount);
        true
    } else {
        state.declare_bankrupt(payer, Some((recipient, amount)));
        false
    }
}

/// Pays every ledger entry the player can now afford, in ledger order.
pub(crate) fn pay_ledger(state: &mut MonopolyState, player: PlayerId) {
    let entries: Vec<(Recipient, i64)> = state
        .player(player)
        .debts
        .iter()
        .map(|(&r, &a)| (r, a))
        .collect();
    for (recipient, amount) in entries {
        if state.player(player).cash >= amount {
            state.transfer(player, recipient, amount);
            state.player_mut(player).debts.remove(&recipient);
            debug!(%player, %recipient, amount, "ledger entry paid");
        }
    }
}

/// Plays a complete strategy-driven turn for `player`, including any doubles re-rolls.
pub fn take_turn<R: Rng + ?Sized>(state: &mut MonopolyState, player: PlayerId, rng: &mut R) {
    loop {
        if state.player(player).bankrupt {
            break;
        }
        pre_turn(state, player, rng);
        try_early_jail_exit(state, player, rng);

        let roll = DiceRoll::roll(rng);
        trace!(%player, first = roll.first, second = roll.second, "rolled");
        if play_roll(state, player, roll, Control::Strategy, rng) != RollOutcome::RollAgain {
            break;
        }
    }
    if !state.player(player).bankrupt {
        state.player_mut(player).consecutive_doubles = 0;
    }
}

/// Rolls and resolves one roll for the controlled player, leaving it at a decision point.
pub fn agent_turn<R: Rng + ?Sized>(state: &mut MonopolyState, rng: &mut R) {
    let agent = state.agent();
    state.extra_turn_pending = false;
    if state.player(agent).bankrupt {
        return;
    }
    let roll = DiceRoll::roll(rng);
    state.last_roll = Some(roll);
    trace!(player = %agent, first = roll.first, second = roll.second, "agent rolled");
    let outcome = play_roll(state, agent, roll, Control::Agent, rng);
    state.extra_turn_pending = outcome == RollOutcome::RollAgain;
}

/// Ends the controlled player's turn: either its pending doubles roll, or a full round of
/// opponent turns followed by its next roll.
pub(crate) fn end_agent_turn<R: Rng + ?Sized>(state: &mut MonopolyState, rng: &mut R) {
    state.rounds += 1;
    if state.extra_turn_pending {
        agent_turn(state, rng);
        return;
    }
    let agent = state.agent();
    state.player_mut(agent).consecutive_doubles = 0;

    let opponents: Vec<PlayerId> = state
        .opponents()
        .filter(|p| p.is_active())
        .map(|p| p.id)
        .collect();
    for opponent in opponents {
        if state.is_terminal() {
            return;
        }
        take_turn(state, opponent, rng);
    }
    if !state.is_terminal() {
        agent_turn(state, rng);
    }
}

/// Moves the controlled player with its stored roll after it bought its way out on the
/// forced jail turn.
pub(crate) fn finish_forced_release<R: Rng + ?Sized>(state: &mut MonopolyState, rng: &mut R) {
    let agent = state.agent();
    let Some(roll) = state.last_roll else {
        return;
    };
    let turn = Turn {
        player: agent,
        control: Control::Agent,
        roll,
    };
    state.move_forward(agent, roll.total());
    resolve_space(state, &turn, rng);
}

fn play_roll<R: Rng + ?Sized>(
    state: &mut MonopolyState,
    player: PlayerId,
    roll: DiceRoll,
    control: Control,
    rng: &mut R,
) -> RollOutcome {
    let turn = Turn {
        player,
        control,
        roll,
    };

    if let JailStatus::Jailed { turns } = state.player(player).jail {
        let turns = turns + 1;
        state.player_mut(player).jail = JailStatus::Jailed { turns };
        if turns < MAX_JAIL_TURNS {
            return RollOutcome::TurnOver;
        }
        if roll.is_double() {
            // Doubles on the last jailed turn stand in for the fine.
            debug!(%player, "rolled doubles on last jailed turn, released");
            state.release_from_jail(player);
        } else {
            if control == Control::Agent {
                return RollOutcome::AwaitingJailExit;
            }
            if !force_release(state, player) {
                return RollOutcome::TurnOver;
            }
        }
        state.player_mut(player).consecutive_doubles = 0;
        state.move_forward(player, roll.total());
        resolve_space(state, &turn, rng);
        return RollOutcome::TurnOver;
    }

    if roll.is_double() {
        let p = state.player_mut(player);
        p.consecutive_doubles += 1;
        if p.consecutive_doubles >= MAX_CONSECUTIVE_DOUBLES {
            debug!(%player, "third consecutive double, sent to jail");
            state.send_to_jail(player);
            return RollOutcome::TurnOver;
        }
    } else {
        state.player_mut(player).consecutive_doubles = 0;
    }

    let position = state.move_forward(player, roll.total());
    debug!(%player, position, space = state.board().space(position).name(), "moved");
    resolve_space(state, &turn, rng);

    let p = state.player(player);
    if roll.is_double() && !p.bankrupt && !p.is_jailed() {
        RollOutcome::RollAgain
    } else {
        RollOutcome::TurnOver
    }
}

/// Forced release on the last jailed turn: pay the fine, else use a card, else raise the
/// fine. Returns false if the player went bankrupt instead.
fn force_release(state: &mut MonopolyState, player: PlayerId) -> bool {
    let fine = state.board().jail_fine();
    let (cash, cards) = {
        let p = state.player(player);
        (p.cash, p.jail_cards)
    };
    let released = if cash >= fine {
        state.transfer(player, Recipient::Bank, fine);
        true
    } else if cards > 0 {
        state.player_mut(player).jail_cards -= 1;
        true
    } else {
        settle(state, player, Recipient::Bank, fine, false)
    };
    if released {
        debug!(%player, "forced out of jail");
        state.release_from_jail(player);
    }
    released
}

fn try_early_jail_exit<R: Rng + ?Sized>(state: &mut MonopolyState, player: PlayerId, rng: &mut R) {
    let p = state.player(player);
    if !p.is_jailed() || p.jailed_turns() + 1 >= MAX_JAIL_TURNS {
        return;
    }
    let strategy = p.strategy;
    match strategy.leave_jail(state, player, rng) {
        Some(JailExit::UseCard) if state.player(player).jail_cards > 0 => {
            state.player_mut(player).jail_cards -= 1;
            state.release_from_jail(player);
            debug!(%player, "left jail with a card");
        }
        Some(JailExit::PayFine) if state.player(player).cash >= state.board().jail_fine() => {
            let fine = state.board().jail_fine();
            state.transfer(player, Recipient::Bank, fine);
            state.release_from_jail(player);
            debug!(%player, "paid to leave jail");
        }
        _ => {}
    }
}

/// Strategy-driven unmortgaging and building before the roll.
fn pre_turn<R: Rng + ?Sized>(state: &mut MonopolyState, player: PlayerId, rng: &mut R) {
    let strategy = state.player(player).strategy;

    let mut mortgaged: Vec<(i64, usize)> = state
        .player(player)
        .properties
        .iter()
        .copied()
        .filter(|&p| state.property(p).mortgaged)
        .map(|p| (state.board().space(p).price().unwrap_or(0), p))
        .collect();
    mortgaged.sort();
    for (_, position) in mortgaged {
        let cost = state.board().unmortgage_price(position);
        if state.player(player).cash < cost {
            break;
        }
        if !strategy.should_unmortgage(state, player, position, rng) {
            continue;
        }
        state.transfer(player, Recipient::Bank, cost);
        state.property_mut(position).mortgaged = false;
        debug!(%player, position, cost, "unmortgaged");
    }

    let board = state.shared_board();
    for group in ColourGroup::ALL {
        if !state.owns_whole_group(player, group) {
            continue;
        }
        for &position in board.group_members(group) {
            let house_price = board.street(position).map_or(0, |s| s.house_price);
            if state.can_add_level(player, position)
                && state.player(player).cash >= house_price
                && strategy.should_build(state, player, position, rng)
            {
                state.transfer(player, Recipient::Bank, house_price);
                state.property_mut(position).development += 1;
                debug!(%player, position, level = state.property(position).development, "built");
            }
        }
    }
}

fn resolve_space<R: Rng + ?Sized>(state: &mut MonopolyState, turn: &Turn, rng: &mut R) {
    let board = state.shared_board();
    let player = turn.player;
    let position = state.player(player).position;
    match board.space(position) {
        Space::Street(_) | Space::Station(_) | Space::Utility(_) => {
            land_on_property(state, turn, position, RentRule::Normal, rng)
        }
        Space::Tax(_) => {
            let due = state.tax_due(player, position);
            settle(state, player, Recipient::Bank, due, turn.defers(player));
        }
        Space::Chance => draw_card(state, turn, DeckKind::Chance, rng),
        Space::CommunityChest => draw_card(state, turn, DeckKind::CommunityChest, rng),
        Space::GoToJail => {
            debug!(%player, "landed on go to jail");
            state.send_to_jail(player);
        }
        Space::Go | Space::Jail | Space::FreeParking => {}
    }
}

fn land_on_property<R: Rng + ?Sized>(
    state: &mut MonopolyState,
    turn: &Turn,
    position: usize,
    rule: RentRule,
    rng: &mut R,
) {
    let player = turn.player;
    match state.property(position).owner {
        Some(owner) if owner != player => {
            let base = state.rent_for(position, turn.roll.total());
            let rent = match rule {
                RentRule::Normal => base,
                RentRule::DoubleStation => base * 2,
                RentRule::TenTimesDice if base > 0 => 10 * turn.roll.total() as i64,
                RentRule::TenTimesDice => 0,
            };
            debug!(%player, %owner, position, rent, "rent due");
            settle(state, player, Recipient::Player(owner), rent, turn.defers(player));
        }
        Some(_) => {}
        None if turn.control == Control::Strategy => {
            let Some(price) = state.board().space(position).price() else {
                return;
            };
            let strategy = state.player(player).strategy;
            if state.player(player).cash >= price && strategy.should_buy(state, player, position, rng) {
                state.transfer(player, Recipient::Bank, price);
                state.grant_property(player, position);
                debug!(%player, position, price, "bought property");
            }
        }
        // The controlled player decides through a purchase action.
        None => {}
    }
}

fn draw_card<R: Rng + ?Sized>(state: &mut MonopolyState, turn: &Turn, kind: DeckKind, rng: &mut R) {
    let Some(card) = state.draw(kind) else {
        return;
    };
    debug!(player = %turn.player, ?kind, ?card, "card drawn");
    apply_card(state, turn, card, rng);
}

fn apply_card<R: Rng + ?Sized>(state: &mut MonopolyState, turn: &Turn, card: CardEffect, rng: &mut R) {
    let player = turn.player;
    let position = state.player(player).position;
    match card {
        CardEffect::AdvanceToGo => {
            state.move_to(player, 0, false);
            let income = state.board().go_income();
            state.collect_from_bank(player, income);
        }
        CardEffect::AdvanceTo { position: target } => {
            state.move_to(player, target, true);
            resolve_space(state, turn, rng);
        }
        CardEffect::AdvanceToNearestStation => {
            let target = state.board().nearest_station(position);
            state.move_to(player, target, false);
            land_on_property(state, turn, target, RentRule::DoubleStation, rng);
        }
        CardEffect::AdvanceToNearestUtility => {
            let target = state.board().nearest_utility(position);
            state.move_to(player, target, false);
            land_on_property(state, turn, target, RentRule::TenTimesDice, rng);
        }
        CardEffect::MoveBack { spaces } => {
            let target = state.board().retreat(position, spaces);
            state.move_to(player, target, false);
            resolve_space(state, turn, rng);
        }
        CardEffect::GoToJail => state.send_to_jail(player),
        CardEffect::Collect { amount } => state.collect_from_bank(player, amount),
        CardEffect::Pay { amount } => {
            settle(state, player, Recipient::Bank, amount, turn.defers(player));
        }
        CardEffect::Repairs {
            per_house,
            per_hotel,
        } => {
            let (houses, hotels) = state.buildings(player);
            let cost = houses * per_house + hotels * per_hotel;
            settle(state, player, Recipient::Bank, cost, turn.defers(player));
        }
        CardEffect::PayEachPlayer { amount } => {
            let others: Vec<PlayerId> = state.active_players().filter(|&p| p != player).collect();
            for other in others {
                settle(state, player, Recipient::Player(other), amount, turn.defers(player));
                if state.player(player).bankrupt {
                    break;
                }
            }
        }
        CardEffect::CollectFromEachPlayer { amount } => {
            let others: Vec<PlayerId> = state.active_players().filter(|&p| p != player).collect();
            for other in others {
                settle(state, other, Recipient::Player(player), amount, false);
            }
        }
        CardEffect::GetOutOfJailFree => state.player_mut(player).jail_cards += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monopoly::board::Board;
    use crate::monopoly::cards::CardDeck;
    use crate::monopoly::strategy::StrategyKind;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::sync::Arc;

    fn fresh_state() -> MonopolyState {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
        MonopolyState::new(
            Arc::new(Board::standard().unwrap()),
            StrategyKind::Base,
            &[StrategyKind::Base, StrategyKind::Base],
            &mut rng,
        )
        .unwrap()
    }

    fn strategy_roll(state: &mut MonopolyState, player: PlayerId, roll: DiceRoll) -> RollOutcome {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        play_roll(state, player, roll, Control::Strategy, &mut rng)
    }

    #[test]
    fn test_pass_go_from_38() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).position = 38;
        strategy_roll(&mut state, me, DiceRoll::new(2, 3));
        assert_eq!(state.player(me).position, 3);
        // Whitechapel Road is bought for 60 after collecting 200.
        assert_eq!(state.player(me).cash, 1500 + 200 - 60);
        assert_eq!(state.property(3).owner, Some(me));
    }

    #[test]
    fn test_go_to_jail_space_pays_no_go_income() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).position = 26;
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(1, 3));
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert_eq!(state.player(me).position, 10);
        assert!(state.player(me).is_jailed());
        assert_eq!(state.player(me).cash, 1500);
    }

    #[test]
    fn test_third_double_goes_to_jail_without_moving() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).position = 0;
        state.player_mut(me).consecutive_doubles = 2;
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(2, 2));
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert_eq!(state.player(me).position, 10);
        assert!(state.player(me).is_jailed());
    }

    #[test]
    fn test_double_grants_another_roll() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(5, 5));
        assert_eq!(outcome, RollOutcome::RollAgain);
        assert_eq!(state.player(me).consecutive_doubles, 1);
    }

    #[test]
    fn test_rent_paid_to_owner() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        let owner = PlayerId(2);
        state.grant_property(owner, 39);
        state.player_mut(me).position = 34;
        strategy_roll(&mut state, me, DiceRoll::new(1, 4));
        assert_eq!(state.player(me).cash, 1450);
        assert_eq!(state.player(owner).cash, 1550);
    }

    #[test]
    fn test_agent_shortfall_goes_to_ledger() {
        let mut state = fresh_state();
        let agent = state.agent();
        let owner = PlayerId(1);
        state.grant_property(owner, 39);
        state.property_mut(39).development = 5;
        state.player_mut(agent).position = 34;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        play_roll(&mut state, agent, DiceRoll::new(1, 4), Control::Agent, &mut rng);
        assert_eq!(state.player(agent).cash, 1500);
        assert_eq!(
            state.player(agent).debts.get(&Recipient::Player(owner)),
            Some(&2000)
        );
        assert!(!state.player(agent).bankrupt);
    }

    #[test]
    fn test_strategy_shortfall_bankrupts_and_writes_off() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        let owner = PlayerId(2);
        state.grant_property(owner, 39);
        state.property_mut(39).development = 5;
        state.player_mut(me).position = 34;
        let supply = state.money_supply();
        strategy_roll(&mut state, me, DiceRoll::new(1, 4));
        assert!(state.player(me).bankrupt);
        assert_eq!(state.player(me).cash, 0);
        assert_eq!(state.player(owner).cash, 1500);
        assert_eq!(state.treasury().written_off, 1500);
        assert_eq!(state.money_supply(), supply - 1500);
    }

    #[test]
    fn test_nearest_station_card_charges_double() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        let owner = PlayerId(2);
        state.grant_property(owner, 15);
        state.set_deck(DeckKind::Chance, CardDeck::in_order(&[CardEffect::AdvanceToNearestStation]));
        state.player_mut(me).position = 4;
        strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(state.player(me).position, 15);
        assert_eq!(state.player(me).cash, 1450);
    }

    #[test]
    fn test_nearest_utility_card_charges_ten_times_dice() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        let owner = PlayerId(2);
        state.grant_property(owner, 28);
        state.set_deck(DeckKind::Chance, CardDeck::in_order(&[CardEffect::AdvanceToNearestUtility]));
        state.player_mut(me).position = 19;
        strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(state.player(me).position, 28);
        assert_eq!(state.player(me).cash, 1470);
    }

    #[test]
    fn test_nearest_station_wrapping_pays_no_go_income() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).cash = 100;
        state.set_deck(DeckKind::Chance, CardDeck::in_order(&[CardEffect::AdvanceToNearestStation]));
        state.player_mut(me).position = 33;
        strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(state.player(me).position, 5);
        assert_eq!(state.player(me).cash, 100);
    }

    #[test]
    fn test_go_back_three_resolves_new_space() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.set_deck(DeckKind::Chance, CardDeck::in_order(&[CardEffect::MoveBack { spaces: 3 }]));
        state.player_mut(me).position = 5;
        strategy_roll(&mut state, me, DiceRoll::new(1, 1));
        // Chance at 7, back to Income Tax at 4: 10% of 1500 wealth.
        assert_eq!(state.player(me).position, 4);
        assert_eq!(state.player(me).cash, 1350);
    }

    #[test]
    fn test_birthday_collects_from_every_active_player() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.declare_bankrupt(PlayerId(2), None);
        state.set_deck(
            DeckKind::CommunityChest,
            CardDeck::in_order(&[CardEffect::CollectFromEachPlayer { amount: 10 }]),
        );
        state.player_mut(me).position = 14;
        strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(state.player(me).cash, 1510);
        assert_eq!(state.player(PlayerId(0)).cash, 1490);
    }

    #[test]
    fn test_repairs_count_houses_and_hotels() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        for position in [1, 3] {
            state.grant_property(me, position);
        }
        state.property_mut(1).development = 5;
        state.property_mut(3).development = 4;
        state.set_deck(
            DeckKind::CommunityChest,
            CardDeck::in_order(&[CardEffect::Repairs { per_house: 40, per_hotel: 115 }]),
        );
        state.player_mut(me).position = 14;
        strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(state.player(me).cash, 1500 - 4 * 40 - 115);
    }

    #[test]
    fn test_forced_jail_release_pays_fine_and_moves() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.send_to_jail(me);
        state.player_mut(me).jail = JailStatus::Jailed { turns: 2 };
        strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert!(!state.player(me).is_jailed());
        assert_eq!(state.player(me).position, 13);
        // 50 fine, then Whitehall bought for 140.
        assert_eq!(state.player(me).cash, 1500 - 50 - 140);
    }

    #[test]
    fn test_forced_jail_release_raises_funds() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.grant_property(me, 39);
        state.player_mut(me).cash = 0;
        state.send_to_jail(me);
        state.player_mut(me).jail = JailStatus::Jailed { turns: 2 };
        strategy_roll(&mut state, me, DiceRoll::new(2, 3));
        assert!(!state.player(me).is_jailed());
        assert!(state.property(39).mortgaged);
        // Marylebone Station costs more than what is left, so nothing is bought.
        assert_eq!(state.player(me).cash, 200 - 50);
        assert_eq!(state.player(me).position, 15);
    }

    #[test]
    fn test_forced_jail_release_bankrupts_when_unraisable() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).cash = 20;
        state.send_to_jail(me);
        state.player_mut(me).jail = JailStatus::Jailed { turns: 2 };
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert!(state.player(me).bankrupt);
        assert_eq!(state.treasury().written_off, 20);
    }

    #[test]
    fn test_agent_waits_on_forced_jail_turn() {
        let mut state = fresh_state();
        let agent = state.agent();
        state.send_to_jail(agent);
        state.player_mut(agent).jail = JailStatus::Jailed { turns: 2 };
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let outcome = play_roll(&mut state, agent, DiceRoll::new(1, 2), Control::Agent, &mut rng);
        assert_eq!(outcome, RollOutcome::AwaitingJailExit);
        assert_eq!(state.player(agent).jailed_turns(), 3);
        assert_eq!(state.player(agent).cash, 1500);
    }

    #[test]
    fn test_jail_without_doubles_stays() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.send_to_jail(me);
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(1, 2));
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert_eq!(state.player(me).position, 10);
        assert_eq!(state.player(me).jailed_turns(), 1);
    }

    #[test]
    fn test_jail_doubles_before_last_turn_do_not_release() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.send_to_jail(me);
        state.player_mut(me).jail = JailStatus::Jailed { turns: 0 };
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(3, 3));
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert_eq!(state.player(me).position, 10);
        assert!(state.player(me).is_jailed());
        assert_eq!(state.player(me).jailed_turns(), 1);
        assert_eq!(state.player(me).cash, 1500);

        let agent = state.agent();
        state.send_to_jail(agent);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let outcome = play_roll(&mut state, agent, DiceRoll::new(5, 5), Control::Agent, &mut rng);
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert_eq!(state.player(agent).position, 10);
        assert!(state.player(agent).is_jailed());
    }

    #[test]
    fn test_jail_doubles_on_last_turn_release_for_free() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.send_to_jail(me);
        state.player_mut(me).jail = JailStatus::Jailed { turns: 2 };
        let outcome = strategy_roll(&mut state, me, DiceRoll::new(2, 2));
        assert_eq!(outcome, RollOutcome::TurnOver);
        assert!(!state.player(me).is_jailed());
        assert_eq!(state.player(me).position, 14);
        // No fine; Northumberland Avenue is bought for 160.
        assert_eq!(state.player(me).cash, 1500 - 160);
    }

    #[test]
    fn test_pre_turn_builds_evenly() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.grant_property(me, 1);
        state.grant_property(me, 3);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        pre_turn(&mut state, me, &mut rng);
        assert_eq!(state.property(1).development, 1);
        assert_eq!(state.property(3).development, 1);
        assert_eq!(state.player(me).cash, 1400);
    }

    #[test]
    fn test_pre_turn_unmortgages_while_affordable() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.grant_property(me, 5);
        state.grant_property(me, 39);
        state.property_mut(5).mortgaged = true;
        state.property_mut(39).mortgaged = true;
        state.player_mut(me).cash = 150;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        pre_turn(&mut state, me, &mut rng);
        assert!(!state.property(5).mortgaged);
        assert!(state.property(39).mortgaged);
        assert_eq!(state.player(me).cash, 40);
    }

    #[test]
    fn test_declined_unmortgage_does_not_stop_the_pass() {
        let me = PlayerId(1);
        let skipped_first = (0..64).any(|seed| {
            let mut state = fresh_state();
            state.player_mut(me).strategy = StrategyKind::Random;
            for position in [5, 15] {
                state.grant_property(me, position);
                state.property_mut(position).mortgaged = true;
            }
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            pre_turn(&mut state, me, &mut rng);
            state.property(5).mortgaged && !state.property(15).mortgaged
        });
        assert!(skipped_first);
    }
}

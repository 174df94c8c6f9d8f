//! 固定字母表与洗牌逻辑。

use rand::seq::SliceRandom;
use rand::Rng;

use super::state::{Board, Card, CardId, Symbol};

/// 固定的 6 符号字母表，每个符号在一轮中恰好出现两次。
pub const SYMBOLS: [Symbol; 6] = ['🐶', '🐱', '🦊', '🐰', '🐼', '🐸'];
/// 每轮的对子数量。
pub const PAIR_COUNT: usize = SYMBOLS.len();
/// 棋盘槽位总数。
pub const BOARD_SIZE: usize = PAIR_COUNT * 2;

/// 把字母表复制成对、均匀洗牌，再按最终顺序给每张卡赋槽位。
pub fn build_board<R: Rng>(rng: &mut R) -> Board {
    let mut cards: Vec<Card> = SYMBOLS
        .iter()
        .enumerate()
        .flat_map(|(index, &value)| {
            let id = (index + 1) as CardId;
            let card = Card {
                id,
                value,
                position: 0,
            };
            [card, card]
        })
        .collect();

    cards.shuffle(rng);
    for (position, card) in cards.iter_mut().enumerate() {
        card.position = position;
    }

    Board { cards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn board_holds_every_symbol_exactly_twice() {
        let mut rng = SmallRng::seed_from_u64(1);
        let board = build_board(&mut rng);

        assert_eq!(board.len(), BOARD_SIZE);
        for &value in SYMBOLS.iter() {
            let count = board.cards.iter().filter(|card| card.value == value).count();
            assert_eq!(count, 2, "symbol {value} should appear exactly twice");
        }
    }

    #[test]
    fn positions_follow_shuffle_order() {
        let mut rng = SmallRng::seed_from_u64(2);
        let board = build_board(&mut rng);

        for (index, card) in board.cards.iter().enumerate() {
            assert_eq!(card.position, index, "slot must match board order");
        }
        for card in &board.cards {
            let twin = board
                .cards
                .iter()
                .find(|other| other.id == card.id && other.position != card.position)
                .expect("every card should have a twin");
            assert_eq!(twin.value, card.value, "twins must share a value");
        }
    }

    #[test]
    fn seeded_shuffles_are_reproducible() {
        let board_a = build_board(&mut SmallRng::seed_from_u64(99));
        let board_b = build_board(&mut SmallRng::seed_from_u64(99));
        assert_eq!(board_a, board_b, "equal seeds should give equal layouts");
    }
}

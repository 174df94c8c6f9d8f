use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::deck::{build_board, BOARD_SIZE, SYMBOLS};

/// 每一轮倒计时的总秒数。
pub const ROUND_SECONDS: u32 = 60;

/// 棋盘槽位索引（0..12）。
pub type Position = usize;
/// 卡牌标识，同一对的两张卡共享同一个 id。
pub type CardId = u8;
/// 卡面符号，取自固定的 6 个 emoji 字母表。
pub type Symbol = char;

/// 棋盘上的一张卡。`position` 在洗牌后一轮内固定不变。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub value: Symbol,
    pub position: Position,
}

/// 一轮洗好的 12 张牌。开局前为空，洗牌后在下次 reset 之前不再变动。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Board {
    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card_at(&self, position: Position) -> Option<&Card> {
        self.cards.get(position)
    }

    /// 某个符号所在的全部槽位（升序）。
    pub fn positions_of(&self, value: Symbol) -> Vec<Position> {
        self.cards
            .iter()
            .filter(|card| card.value == value)
            .map(|card| card.position)
            .collect()
    }
}

/// 回合阶段状态机：Idle →(reset) Playing →(时间耗尽) Over。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Playing,
    Over,
}

impl Default for RoundPhase {
    fn default() -> Self {
        RoundPhase::Idle
    }
}

/// 游戏事件流，供前端做渲染与动画提示。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    RoundStarted,
    CardFlipped {
        position: Position,
    },
    PairMatched {
        positions: [Position; 2],
        value: Symbol,
        score: u32,
    },
    PairMissed {
        positions: [Position; 2],
    },
    AllPairsFound {
        score: u32,
    },
    RevealCleared,
    ClockTicked {
        seconds_remaining: u32,
    },
    TimeExpired {
        score: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    BoardSizeMismatch {
        expected: usize,
        actual: usize,
    },
    SymbolCountMismatch {
        value: Symbol,
        count: usize,
    },
    MisplacedCard {
        expected: Position,
        actual: Position,
    },
    PositionOutOfBoard {
        position: Position,
    },
    TooManyFlipped {
        count: usize,
    },
    DuplicatePosition {
        position: Position,
    },
    ScoreMismatch {
        score: u32,
        matched: usize,
    },
    MismatchedPair {
        positions: [Position; 2],
    },
    ClockPhaseMismatch {
        seconds_remaining: u32,
    },
}

/// 一轮游戏的完整状态，渲染层读取它的快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundState {
    #[serde(default)]
    pub board: Board,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flipped: Vec<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<Position>,
    pub score: u32,
    pub seconds_remaining: u32,
    pub phase: RoundPhase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl RoundState {
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            flipped: Vec::new(),
            matched: Vec::new(),
            score: 0,
            seconds_remaining: ROUND_SECONDS,
            phase: RoundPhase::default(),
            event_log: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    /// 槽位是否已翻开（待定或已配对都算）。
    pub fn is_revealed(&self, position: Position) -> bool {
        self.flipped.contains(&position) || self.matched.contains(&position)
    }

    pub fn is_over(&self) -> bool {
        self.phase == RoundPhase::Over
    }

    /// 两张牌已翻开、等待展示窗口结束。
    pub fn pending_reveal(&self) -> bool {
        self.flipped.len() == 2
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.phase == RoundPhase::Idle
            && self.board.is_empty()
            && self.flipped.is_empty()
            && self.matched.is_empty()
        {
            return Ok(());
        }

        if self.board.len() != BOARD_SIZE {
            return Err(IntegrityError::BoardSizeMismatch {
                expected: BOARD_SIZE,
                actual: self.board.len(),
            });
        }
        for &value in SYMBOLS.iter() {
            let count = self
                .board
                .cards
                .iter()
                .filter(|card| card.value == value)
                .count();
            if count != 2 {
                return Err(IntegrityError::SymbolCountMismatch { value, count });
            }
        }
        for (index, card) in self.board.cards.iter().enumerate() {
            if card.position != index {
                return Err(IntegrityError::MisplacedCard {
                    expected: index,
                    actual: card.position,
                });
            }
        }

        if self.flipped.len() > 2 {
            return Err(IntegrityError::TooManyFlipped {
                count: self.flipped.len(),
            });
        }
        let mut seen = HashSet::new();
        for &position in &self.flipped {
            if position >= BOARD_SIZE {
                return Err(IntegrityError::PositionOutOfBoard { position });
            }
            if !seen.insert(position) {
                return Err(IntegrityError::DuplicatePosition { position });
            }
        }
        let mut seen = HashSet::new();
        for &position in &self.matched {
            if position >= BOARD_SIZE {
                return Err(IntegrityError::PositionOutOfBoard { position });
            }
            if !seen.insert(position) {
                return Err(IntegrityError::DuplicatePosition { position });
            }
        }

        if self.score as usize * 2 != self.matched.len() {
            return Err(IntegrityError::ScoreMismatch {
                score: self.score,
                matched: self.matched.len(),
            });
        }
        // 已配对槽位按配对顺序成对出现，每对必须同值
        for pair in self.matched.chunks_exact(2) {
            if self.board.cards[pair[0]].value != self.board.cards[pair[1]].value {
                return Err(IntegrityError::MismatchedPair {
                    positions: [pair[0], pair[1]],
                });
            }
        }

        if (self.phase == RoundPhase::Over) != (self.seconds_remaining == 0) {
            return Err(IntegrityError::ClockPhaseMismatch {
                seconds_remaining: self.seconds_remaining,
            });
        }

        Ok(())
    }

    /// 返回一个固定种子的进行中回合，方便前端调试或初始化。
    pub fn sample() -> Self {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut state = RoundState {
            board: build_board(&mut rng),
            phase: RoundPhase::Playing,
            ..RoundState::new()
        };
        state.record_event(GameEvent::RoundStarted);
        state
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

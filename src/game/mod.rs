//! 游戏核心逻辑模块（棋盘、状态机、规则）。

pub mod deck;
pub mod rules;
pub mod state;

pub use deck::{build_board, BOARD_SIZE, PAIR_COUNT, SYMBOLS};
pub use rules::{RoundOutcome, RuleEngine, RuleError, RuleResolution};
pub use state::{
    Board, Card, CardId, GameEvent, IntegrityError, Position, RoundPhase, RoundState, Symbol,
    ROUND_SECONDS,
};

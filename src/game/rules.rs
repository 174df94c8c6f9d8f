use rand::Rng;
use serde::{Deserialize, Serialize};

use super::deck::{build_board, BOARD_SIZE, PAIR_COUNT};
use super::state::{
    GameEvent, IntegrityError, Position, RoundPhase, RoundState, ROUND_SECONDS,
};

/// 规则层可恢复错误。可预期的非法操作（重复翻同一张、回合结束后点击等）
/// 是无事件的 no-op，不会走到这里；只有调用方的编程错误才会返回错误。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    PositionOutOfBoard {
        position: Position,
        board_size: usize,
    },
    IntegrityViolation {
        error: IntegrityError,
    },
}

/// 回合结束后的最终战绩。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundOutcome {
    pub score: u32,
}

/// 一次状态迁移的完整结果：新状态、触发的事件，以及本轮若已结束的最终战绩。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: RoundState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RoundOutcome>,
}

impl RuleResolution {
    pub fn new(state: RoundState, events: Vec<GameEvent>) -> Self {
        let outcome = if state.is_over() {
            Some(RoundOutcome { score: state.score })
        } else {
            None
        };

        Self {
            state,
            events,
            outcome,
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        RuleEngine
    }

    fn ensure_integrity(state: &RoundState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    /// 洗新棋盘并把回合带回 Playing。任何阶段都可以调用。
    pub fn start_round<R: Rng>(&mut self, state: &mut RoundState, rng: &mut R) -> Vec<GameEvent> {
        state.board = build_board(rng);
        state.flipped.clear();
        state.matched.clear();
        state.score = 0;
        state.seconds_remaining = ROUND_SECONDS;
        state.phase = RoundPhase::Playing;
        state.event_log.clear();

        let event = GameEvent::RoundStarted;
        state.record_event(event.clone());
        vec![event]
    }

    /// 时钟走一秒。只在 Playing 阶段有效，归零时转入 Over。
    pub fn tick(&mut self, state: &mut RoundState) -> Vec<GameEvent> {
        if state.phase != RoundPhase::Playing {
            return Vec::new();
        }

        state.seconds_remaining = state.seconds_remaining.saturating_sub(1);

        let mut events = Vec::new();
        let tick_event = GameEvent::ClockTicked {
            seconds_remaining: state.seconds_remaining,
        };
        state.record_event(tick_event.clone());
        events.push(tick_event);

        if state.seconds_remaining == 0 {
            state.phase = RoundPhase::Over;
            let expired = GameEvent::TimeExpired { score: state.score };
            state.record_event(expired.clone());
            events.push(expired);
        }

        events
    }

    /// 处理一次点击。第二张牌翻开时立刻判定配对；两张牌保持翻开状态，
    /// 直到调用方在展示窗口结束后执行 `clear_reveal`。
    pub fn flip(
        &mut self,
        state: &mut RoundState,
        position: Position,
    ) -> Result<Vec<GameEvent>, RuleError> {
        if position >= BOARD_SIZE {
            return Err(RuleError::PositionOutOfBoard {
                position,
                board_size: BOARD_SIZE,
            });
        }
        Self::ensure_integrity(state)?;

        if state.phase != RoundPhase::Playing
            || state.pending_reveal()
            || state.flipped.contains(&position)
            || state.matched.contains(&position)
        {
            return Ok(Vec::new());
        }

        state.flipped.push(position);

        let mut events = Vec::new();
        let flip_event = GameEvent::CardFlipped { position };
        state.record_event(flip_event.clone());
        events.push(flip_event);

        if state.pending_reveal() {
            let first = state.flipped[0];
            let second = state.flipped[1];
            let first_value = state.board.cards[first].value;
            let second_value = state.board.cards[second].value;

            if first_value == second_value {
                state.matched.push(first);
                state.matched.push(second);
                state.score += 1;

                let matched = GameEvent::PairMatched {
                    positions: [first, second],
                    value: first_value,
                    score: state.score,
                };
                state.record_event(matched.clone());
                events.push(matched);

                if state.score as usize == PAIR_COUNT {
                    let found_all = GameEvent::AllPairsFound { score: state.score };
                    state.record_event(found_all.clone());
                    events.push(found_all);
                }
            } else {
                let missed = GameEvent::PairMissed {
                    positions: [first, second],
                };
                state.record_event(missed.clone());
                events.push(missed);
            }
        }

        Ok(events)
    }

    /// 关闭展示窗口：清空待定翻牌。已配对的槽位不受影响。
    pub fn clear_reveal(&mut self, state: &mut RoundState) -> Vec<GameEvent> {
        if state.flipped.is_empty() {
            return Vec::new();
        }

        state.flipped.clear();
        let event = GameEvent::RevealCleared;
        state.record_event(event.clone());
        vec![event]
    }
}

pub mod counter;
pub mod game;
pub mod utils;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use gloo_timers::future::TimeoutFuture;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::{Function, Promise};

pub use counter::TapCounter;
pub use game::{
    build_board, Board, Card, CardId, GameEvent, IntegrityError, Position, RoundOutcome,
    RoundPhase, RoundState, RuleEngine, RuleError, RuleResolution, Symbol, BOARD_SIZE, PAIR_COUNT,
    ROUND_SECONDS, SYMBOLS,
};

/// 倒计时步进间隔（毫秒）。
const TICK_INTERVAL_MS: u32 = 1_000;
/// 翻开第二张牌后的展示窗口（毫秒）。
const REVEAL_DELAY_MS: u32 = 1_000;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

#[wasm_bindgen]
pub fn greet(name: &str) -> String {
    let message = format!("Välkommen till FunGame, {name}!");
    web_sys::console::log_1(&message.clone().into());
    message
}

fn make_resolution(state: RoundState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state, events)
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// 把一次迁移的快照推给渲染层注册的回调。调用前必须已释放所有借用，
/// 回调里再同步调用回引擎才不会触发二次借用。
fn notify(on_change: &Rc<RefCell<Option<Function>>>, state: RoundState, events: Vec<GameEvent>) {
    let callback = on_change.borrow().as_ref().cloned();
    if let Some(callback) = callback {
        let resolution = make_resolution(state, events);
        if let Ok(value) = to_value(&resolution) {
            let _ = callback.call1(&JsValue::NULL, &value);
        }
    }
}

/// 有状态的游戏实例：持有棋局、倒计时与翻牌展示两个可取消的定时器句柄。
/// 每个实例各自拥有定时器生命周期，互不干扰；丢弃实例即取消全部定时器。
#[wasm_bindgen]
pub struct MemoryGame {
    state: Rc<RefCell<RoundState>>,
    rng: SmallRng,
    countdown: Rc<RefCell<Option<Interval>>>,
    reveal_clear: Rc<RefCell<Option<Timeout>>>,
    on_change: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl MemoryGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MemoryGame {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// 固定随机种子的实例，便于测试与回放同一副牌面布局。
    pub fn seeded(seed: u32) -> MemoryGame {
        Self::with_rng(SmallRng::seed_from_u64(seed as u64))
    }

    /// 渲染层注册的快照回调；定时器驱动的迁移只能通过它被观察到。
    pub fn set_on_change(&mut self, callback: Option<Function>) {
        *self.on_change.borrow_mut() = callback;
    }

    /// 取消既有定时器，洗新棋盘并重启 1 Hz 倒计时。
    /// 先取消后重建：上一轮的残留回调绝不能落到新回合的状态上。
    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.countdown.borrow_mut().take();
        self.reveal_clear.borrow_mut().take();

        let events = {
            let mut state = self.state.borrow_mut();
            RuleEngine::new().start_round(&mut state, &mut self.rng)
        };
        self.start_countdown();
        utils::console_log(&format!(
            "memory round started: {BOARD_SIZE} cards, {ROUND_SECONDS}s clock"
        ));

        self.notify_and_resolve(events)
    }

    /// 处理渲染层转发的点击。第二张牌翻开时布置一次性的展示清除定时器。
    pub fn flip(&mut self, position: usize) -> Result<JsValue, JsValue> {
        let events = {
            let mut state = self.state.borrow_mut();
            RuleEngine::new()
                .flip(&mut state, position)
                .map_err(to_js_error)?
        };

        if self.state.borrow().pending_reveal() {
            self.schedule_reveal_clear();
        }

        self.notify_and_resolve(events)
    }

    /// 当前状态的结构化快照。
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&*self.state.borrow()).map_err(JsValue::from)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&*self.state.borrow()).map_err(serde_to_js_error)
    }

    /// 导入外部状态（热重载调试用）。先做完整性校验，坏状态直接拒绝。
    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: RoundState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        state
            .integrity_check()
            .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
        *self.state.borrow_mut() = state;
        Ok(())
    }

    pub fn is_revealed(&self, position: usize) -> bool {
        self.state.borrow().is_revealed(position)
    }

    pub fn score(&self) -> u32 {
        self.state.borrow().score
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.state.borrow().seconds_remaining
    }

    pub fn is_over(&self) -> bool {
        self.state.borrow().is_over()
    }
}

impl MemoryGame {
    fn with_rng(rng: SmallRng) -> MemoryGame {
        MemoryGame {
            state: Rc::new(RefCell::new(RoundState::new())),
            rng,
            countdown: Rc::new(RefCell::new(None)),
            reveal_clear: Rc::new(RefCell::new(None)),
            on_change: Rc::new(RefCell::new(None)),
        }
    }

    fn start_countdown(&self) {
        let state = Rc::clone(&self.state);
        let countdown = Rc::clone(&self.countdown);
        let on_change = Rc::clone(&self.on_change);

        let handle = Interval::new(TICK_INTERVAL_MS, move || {
            let events = {
                let mut state = state.borrow_mut();
                RuleEngine::new().tick(&mut state)
            };
            if state.borrow().is_over() {
                // 时钟归零后停表
                countdown.borrow_mut().take();
                utils::console_log("memory round over: clock ran out");
            }
            if !events.is_empty() {
                let snapshot = state.borrow().clone();
                notify(&on_change, snapshot, events);
            }
        });
        *self.countdown.borrow_mut() = Some(handle);
    }

    fn schedule_reveal_clear(&self) {
        let state = Rc::clone(&self.state);
        let slot = Rc::clone(&self.reveal_clear);
        let on_change = Rc::clone(&self.on_change);

        let handle = Timeout::new(REVEAL_DELAY_MS, move || {
            // 一次性句柄，触发即回收
            slot.borrow_mut().take();
            let events = {
                let mut state = state.borrow_mut();
                RuleEngine::new().clear_reveal(&mut state)
            };
            if !events.is_empty() {
                let snapshot = state.borrow().clone();
                notify(&on_change, snapshot, events);
            }
        });
        *self.reveal_clear.borrow_mut() = Some(handle);
    }

    fn notify_and_resolve(&self, events: Vec<GameEvent>) -> Result<JsValue, JsValue> {
        let snapshot = self.state.borrow().clone();
        notify(&self.on_change, snapshot.clone(), events.clone());
        to_value(&make_resolution(snapshot, events)).map_err(JsValue::from)
    }
}

impl Default for MemoryGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Home 屏幕的计分按钮状态。
#[wasm_bindgen]
pub struct ScoreCounter {
    inner: TapCounter,
}

#[wasm_bindgen]
impl ScoreCounter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ScoreCounter {
        ScoreCounter {
            inner: TapCounter::new(),
        }
    }

    pub fn tap(&mut self) -> u32 {
        self.inner.tap()
    }

    pub fn taps(&self) -> u32 {
        self.inner.taps()
    }

    pub fn reset(&mut self) {
        self.inner.reset()
    }
}

impl Default for ScoreCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct AboutInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
}

/// About 屏幕的静态元数据。
#[wasm_bindgen(js_name = "aboutInfo")]
pub fn about_info() -> Result<JsValue, JsValue> {
    to_value(&AboutInfo {
        name: "FunGame",
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
    })
    .map_err(JsValue::from)
}

/// 返回一个示例回合状态，方便前端调试或初始化。
#[wasm_bindgen(js_name = "createRoundState")]
pub fn create_round_state() -> Result<JsValue, JsValue> {
    to_value(&RoundState::sample()).map_err(JsValue::from)
}

/// 无状态入口：开一轮新局并返回完整迁移结果。传种子可复现牌面。
#[wasm_bindgen(js_name = "newRound")]
pub fn new_round(seed: Option<u32>) -> Result<JsValue, JsValue> {
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed as u64),
        None => SmallRng::from_entropy(),
    };
    let mut state = RoundState::new();
    let events = RuleEngine::new().start_round(&mut state, &mut rng);
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "flipCard")]
pub fn flip_card(state: JsValue, position: usize) -> Result<JsValue, JsValue> {
    let mut state: RoundState = from_value(state).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    match engine.flip(&mut state, position) {
        Ok(events) => to_value(&make_resolution(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "tickClock")]
pub fn tick_clock(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: RoundState = from_value(state).map_err(JsValue::from)?;
    let events = RuleEngine::new().tick(&mut state);
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "clearReveal")]
pub fn clear_reveal(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: RoundState = from_value(state).map_err(JsValue::from)?;
    let events = RuleEngine::new().clear_reveal(&mut state);
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

/// 翻开第二张牌后调用：等待展示窗口结束，再返回清空后的状态。
#[wasm_bindgen(js_name = "resolveRevealLater")]
pub fn resolve_reveal_later(state: JsValue, delay_ms: Option<u32>) -> Promise {
    let parsed: Result<RoundState, _> = from_value(state);
    let delay = delay_ms.unwrap_or(REVEAL_DELAY_MS);

    future_to_promise(async move {
        let mut state = parsed.map_err(JsValue::from)?;
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        let events = RuleEngine::new().clear_reveal(&mut state);
        to_value(&make_resolution(state, events)).map_err(JsValue::from)
    })
}

#[wasm_bindgen(js_name = "isRevealed")]
pub fn is_revealed(state: JsValue, position: usize) -> Result<bool, JsValue> {
    let state: RoundState = from_value(state).map_err(JsValue::from)?;
    Ok(state.is_revealed(position))
}

/// 校验传入状态的完整性，用于测试与热重载导入前的把关。
#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: RoundState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))
}

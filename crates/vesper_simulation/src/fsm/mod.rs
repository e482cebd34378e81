//! State machine core
//!
//! Общая абстракция поведения: state = значение с exit guard (`check_valid`)
//! и покадровым действием (`execute`). Активный state принадлежит машине и
//! заменяется целиком при переходе.
//!
//! Контракт кадра:
//! 1. `check_valid` текущего state: "всё ещё уместен?"
//! 2. false → ровно один переход по политике машины
//! 3. `execute` нового (или старого) state в ТОМ ЖЕ кадре

use rand::Rng;


/// Behaviour state over a per-frame context `C`
pub trait State<C> {
    /// Exit guard: is the *current* state still appropriate?
    fn check_valid(&self, ctx: &C) -> bool;

    /// One frame worth of behaviour
    fn execute(&mut self, ctx: &mut C);
}

/// Пара top-level режимов для двухсторонней политики
pub trait ModePair: Sized {
    /// Режим при спавне
    fn passive() -> Self;
    fn alert() -> Self;
}

/// Two-way machine: `passive ⇄ alert`
///
/// Следующий режим выбирается по persistent alert флагу, а НЕ выводится
/// заново из дистанции. Флаг переключается на каждом переходе. Если флаг и
/// текущий state рассинхронизированы, побеждает флаг.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoWayMachine<S> {
    current: S,
    alerted: bool,
    generation: u32,
}

impl<S: ModePair> Default for TwoWayMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ModePair> TwoWayMachine<S> {
    pub fn new() -> Self {
        Self {
            current: S::passive(),
            alerted: false,
            generation: 0,
        }
    }

    /// Собрать машину из произвольного state и флага
    pub fn from_parts(current: S, alerted: bool) -> Self {
        Self {
            current,
            alerted,
            generation: 0,
        }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut S {
        &mut self.current
    }

    pub fn alerted(&self) -> bool {
        self.alerted
    }

    /// Number of transitions so far
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Evaluate the exit guard; swap modes when it fails. Returns true on transition.
    pub fn evaluate<C>(&mut self, ctx: &C) -> bool
    where
        S: State<C>,
    {
        if self.current.check_valid(ctx) {
            return false;
        }

        self.current = if self.alerted { S::passive() } else { S::alert() };
        self.alerted = !self.alerted;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Transition (if needed) and execute in the same frame
    pub fn step<C>(&mut self, ctx: &mut C) -> bool
    where
        S: State<C>,
    {
        let transitioned = self.evaluate(ctx);
        self.current.execute(ctx);
        transitioned
    }
}

/// Монотонный счётчик токенов для таймеров, взведённых state'ами
///
/// Таймер несёт токен; state принимает продолжение только со своим токеном,
/// так что таймеры старых state-значений игнорируются.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCounter {
    next: u32,
}

impl TokenCounter {
    pub fn issue(&mut self) -> u32 {
        let token = self.next;
        self.next = self.next.wrapping_add(1);
        token
    }
}

/// Uniform draw from `candidates`, rejecting `previous` (reject-and-resample)
///
/// Если кроме `previous` выбирать не из чего: возвращает `previous`.
pub fn pick_excluding<T, R>(candidates: &[T], previous: T, rng: &mut R) -> T
where
    T: Copy + PartialEq,
    R: Rng + ?Sized,
{
    if !candidates.iter().any(|c| *c != previous) {
        return previous;
    }

    loop {
        let candidate = candidates[rng.gen_range(0..candidates.len())];
        if candidate != previous {
            return candidate;
        }
    }
}

// Licensed under the Apache-2.0 license

use super::token::EngineToken;
use super::{Engine, ENGINE_SLOTS};

/// Owns exactly one token per physical engine slot
///
/// All tokens exist from construction onwards, so the registry can be built in
/// a `static` and lookups never race with creation.
pub struct EngineRegistry<T> {
    tokens: [T; ENGINE_SLOTS],
}

impl<T: EngineToken> EngineRegistry<T> {
    /// Create a registry from one available token per slot, in [`Engine::ALL`] order
    #[must_use]
    pub const fn new(tokens: [T; ENGINE_SLOTS]) -> Self {
        Self { tokens }
    }

    /// Token guarding `engine`
    #[must_use]
    pub fn token(&self, engine: Engine) -> &T {
        match engine {
            Engine::Sha1 => &self.tokens[0],
            Engine::Sha256 => &self.tokens[1],
            Engine::Sha512 => &self.tokens[2],
        }
    }

    /// Slots whose token is currently taken
    pub fn held(&self) -> impl Iterator<Item = Engine> + '_ {
        Engine::ALL
            .into_iter()
            .filter(move |engine| self.token(*engine).is_taken())
    }
}

impl<T: EngineToken + Default> Default for EngineRegistry<T> {
    fn default() -> Self {
        Self::new([T::default(), T::default(), T::default()])
    }
}

//! Synchronous calls out to the surrounding game

/// Calls the simulation makes into its host during a tick
pub trait GameHooks {
    /// Run the minigame as a nested modal interaction; true on success
    fn run_minigame(&mut self) -> bool;
}

impl<F: FnMut() -> bool> GameHooks for F {
    fn run_minigame(&mut self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_hooks() {
        let mut calls = 0;
        let mut hooks = || {
            calls += 1;
            false
        };
        assert!(!hooks.run_minigame());
        assert!(!GameHooks::run_minigame(&mut hooks));
        assert_eq!(calls, 2);
    }
}

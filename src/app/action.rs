/// Store writes requested by the input handler. Applied by the main loop
/// through the Button panel's setter.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write a fresh random value to `val`
    Randomize,
    Step { delta: f64 },
    Rename { name: String },
    Quit,
}

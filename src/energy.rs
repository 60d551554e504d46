/// Bounded resource that decays every tick and refills on eating.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EnergyResource {
    value: u32,
    max: u32,
}

impl EnergyResource {
    /// Creates a full resource holding `max` units.
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self { value: max, max }
    }

    /// Creates a resource with an explicit starting value, clamped to `max`.
    #[must_use]
    pub fn with_value(value: u32, max: u32) -> Self {
        Self {
            value: value.min(max),
            max,
        }
    }

    pub fn decrease(&mut self, amount: u32) {
        self.value = self.value.saturating_sub(amount);
    }

    pub fn increase(&mut self, amount: u32) {
        self.value = self.value.saturating_add(amount).min(self.max);
    }

    pub fn refill(&mut self) {
        self.value = self.max;
    }

    #[must_use]
    pub fn is_depleted(self) -> bool {
        self.value == 0
    }

    #[must_use]
    pub fn value(self) -> u32 {
        self.value
    }

    #[must_use]
    pub fn max(self) -> u32 {
        self.max
    }

    /// Fill level in `0.0..=1.0`, used to size the HUD bar.
    #[must_use]
    pub fn fraction(self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.value) / f64::from(self.max)
    }
}

//! Screen identifiers and tab-bar ordering.

use std::fmt;

/// The four registry screens, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Grievances,
    Households,
    Individuals,
    PaymentPlans,
}

impl ScreenId {
    /// Tab order. Also the number-key order.
    pub const ALL: [Self; 4] = [
        Self::Grievances,
        Self::Households,
        Self::Individuals,
        Self::PaymentPlans,
    ];

    /// 1-based number shown in the tab bar.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    /// Screen for a number key, if it maps to one.
    pub fn from_number(n: usize) -> Option<Self> {
        (n >= 1).then(|| Self::ALL.get(n - 1).copied()).flatten()
    }

    /// Next tab, wrapping.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous tab, wrapping.
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Grievances => "Grievances",
            Self::Households => "Households",
            Self::Individuals => "Individuals",
            Self::PaymentPlans => "Payment Plans",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(screen.number()), Some(screen));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(5), None);
    }

    #[test]
    fn next_prev_wrap() {
        assert_eq!(ScreenId::PaymentPlans.next(), ScreenId::Grievances);
        assert_eq!(ScreenId::Grievances.prev(), ScreenId::PaymentPlans);
        for screen in ScreenId::ALL {
            assert_eq!(screen.next().prev(), screen);
        }
    }
}

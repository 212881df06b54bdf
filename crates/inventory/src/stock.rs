//! Stock reconciliation engine.
//!
//! Every action that touches an item's stock is first turned into a
//! [`StockChange`]: a per-field description of what happens to the sealed
//! quantity, the needed quantity, the open flag and the storage location.
//! [`StockChange::apply`] evaluates that description against the current
//! levels (pure, no IO). Stores execute the very same description as one
//! atomic update, so the rules live in exactly one place.
//!
//! The three scan actions treat `quantity_needed` differently on purpose:
//!
//! ```text
//! ScanAdd     needed = max(0, needed - qty)
//! ScanRemove  needed = 1 if needed == 0, else unchanged
//! ScanOpen    needed = needed + 1
//! ```

use larder_core::{DomainError, DomainResult, Quantity};

use crate::item::MAX_LOCATION_LEN;

/// Stock state of one item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StockLevels {
    /// Unopened units on hand.
    pub sealed_quantity: Quantity,
    /// Outstanding amount to buy; positive means "on the shopping list".
    pub quantity_needed: Quantity,
    /// Whether an opened unit is currently in use.
    pub is_open: bool,
}

impl StockLevels {
    pub fn new(sealed_quantity: Quantity, quantity_needed: Quantity, is_open: bool) -> Self {
        Self {
            sealed_quantity,
            quantity_needed,
            is_open,
        }
    }

    pub fn is_on_shopping_list(&self) -> bool {
        self.quantity_needed.is_positive()
    }

    /// Physically present: sealed units left or an open one in use.
    pub fn is_in_stock(&self) -> bool {
        self.sealed_quantity.is_positive() || self.is_open
    }
}

/// A user- or scan-triggered stock action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockAction {
    /// Bought `quantity`; the whole listed need counts as satisfied.
    Purchase { quantity: Quantity },
    /// Put the item on the shopping list with an explicit amount.
    SetNeeded { quantity: Quantity },
    /// Take the item off the shopping list.
    ClearNeeded,
    ToggleOpen,
    /// Direct overwrite from the stock edit form.
    ManualUpdate {
        sealed_quantity: Quantity,
        is_open: bool,
        location: Option<String>,
    },
    /// A "received" barcode scan.
    ScanAdd { quantity: Quantity },
    /// A "consumed" barcode scan.
    ScanRemove { quantity: Quantity },
    /// An "opened" barcode scan.
    ScanOpen,
}

impl StockAction {
    /// Stable action name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StockAction::Purchase { .. } => "purchase",
            StockAction::SetNeeded { .. } => "set_needed",
            StockAction::ClearNeeded => "clear_needed",
            StockAction::ToggleOpen => "toggle_open",
            StockAction::ManualUpdate { .. } => "manual_update",
            StockAction::ScanAdd { .. } => "scan_add",
            StockAction::ScanRemove { .. } => "scan_remove",
            StockAction::ScanOpen => "scan_open",
        }
    }

    /// Input validation performed by callers before the engine runs.
    ///
    /// The engine itself never checks parameters; it only refuses removals
    /// that exceed the sealed quantity.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            StockAction::Purchase { quantity } => {
                if quantity.is_zero() {
                    return Err(DomainError::validation(
                        "quantity purchased must be greater than zero",
                    ));
                }
            }
            StockAction::SetNeeded { quantity } => {
                if *quantity < Quantity::ONE {
                    return Err(DomainError::validation("quantity needed must be at least 1"));
                }
            }
            StockAction::ManualUpdate { location, .. } => {
                if let Some(location) = location {
                    if location.trim().is_empty() {
                        return Err(DomainError::validation("location cannot be blank"));
                    }
                    if location.chars().count() > MAX_LOCATION_LEN {
                        return Err(DomainError::validation(format!(
                            "location cannot exceed {MAX_LOCATION_LEN} characters"
                        )));
                    }
                }
            }
            StockAction::ScanAdd { quantity } | StockAction::ScanRemove { quantity } => {
                if quantity.is_zero() {
                    return Err(DomainError::validation(
                        "barcode quantity must be greater than zero",
                    ));
                }
            }
            StockAction::ClearNeeded | StockAction::ToggleOpen | StockAction::ScanOpen => {}
        }
        Ok(())
    }

    /// Describe the action as a per-field change.
    pub fn change(&self) -> StockChange {
        match self {
            StockAction::Purchase { quantity } => StockChange {
                sealed: SealedChange::Add(*quantity),
                needed: NeededChange::Set(Quantity::ZERO),
                ..StockChange::default()
            },
            StockAction::SetNeeded { quantity } => StockChange {
                needed: NeededChange::Set(*quantity),
                ..StockChange::default()
            },
            StockAction::ClearNeeded => StockChange {
                needed: NeededChange::Set(Quantity::ZERO),
                ..StockChange::default()
            },
            StockAction::ToggleOpen => StockChange {
                open: OpenChange::Toggle,
                ..StockChange::default()
            },
            StockAction::ManualUpdate {
                sealed_quantity,
                is_open,
                location,
            } => StockChange {
                sealed: SealedChange::Set(*sealed_quantity),
                open: OpenChange::Set(*is_open),
                location: LocationChange::Set(location.clone()),
                ..StockChange::default()
            },
            StockAction::ScanAdd { quantity } => StockChange {
                sealed: SealedChange::Add(*quantity),
                needed: NeededChange::ReduceBy(*quantity),
                ..StockChange::default()
            },
            StockAction::ScanRemove { quantity } => StockChange {
                sealed: SealedChange::Remove(*quantity),
                needed: NeededChange::EnrollIfClear(Quantity::ONE),
                ..StockChange::default()
            },
            StockAction::ScanOpen => StockChange {
                needed: NeededChange::Add(Quantity::ONE),
                open: OpenChange::Set(true),
                ..StockChange::default()
            },
        }
    }
}

/// What happens to the sealed quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SealedChange {
    #[default]
    Keep,
    Add(Quantity),
    /// Guarded decrement: refused when it would go below zero.
    Remove(Quantity),
    Set(Quantity),
}

/// What happens to the needed quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NeededChange {
    #[default]
    Keep,
    Set(Quantity),
    Add(Quantity),
    /// Decrement floored at zero.
    ReduceBy(Quantity),
    /// Set to the given amount only when currently zero.
    EnrollIfClear(Quantity),
}

/// What happens to the open flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OpenChange {
    #[default]
    Keep,
    Set(bool),
    Toggle,
}

/// What happens to the storage location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationChange {
    #[default]
    Keep,
    Set(Option<String>),
}

/// Per-field change produced by a [`StockAction`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockChange {
    pub sealed: SealedChange,
    pub needed: NeededChange,
    pub open: OpenChange,
    pub location: LocationChange,
}

/// A guarded removal asked for more than was sealed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub requested: Quantity,
    pub available: Quantity,
}

impl StockChange {
    /// Evaluate the change against `levels`.
    ///
    /// Fails only for a [`SealedChange::Remove`] larger than the sealed
    /// quantity; in that case nothing is applied.
    pub fn apply(&self, levels: StockLevels) -> Result<StockLevels, Shortfall> {
        let sealed_quantity = match self.sealed {
            SealedChange::Keep => levels.sealed_quantity,
            SealedChange::Add(q) => levels.sealed_quantity + q,
            SealedChange::Remove(q) => levels
                .sealed_quantity
                .checked_sub(q)
                .ok_or(Shortfall {
                    requested: q,
                    available: levels.sealed_quantity,
                })?,
            SealedChange::Set(q) => q,
        };

        let quantity_needed = match self.needed {
            NeededChange::Keep => levels.quantity_needed,
            NeededChange::Set(q) => q,
            NeededChange::Add(q) => levels.quantity_needed + q,
            NeededChange::ReduceBy(q) => levels.quantity_needed.saturating_sub(q),
            NeededChange::EnrollIfClear(q) => {
                if levels.quantity_needed.is_zero() {
                    q
                } else {
                    levels.quantity_needed
                }
            }
        };

        let is_open = match self.open {
            OpenChange::Keep => levels.is_open,
            OpenChange::Set(v) => v,
            OpenChange::Toggle => !levels.is_open,
        };

        Ok(StockLevels {
            sealed_quantity,
            quantity_needed,
            is_open,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reconcile(levels: StockLevels, action: &StockAction) -> Result<StockLevels, Shortfall> {
        action.change().apply(levels)
    }

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    fn levels(sealed: &str, needed: &str, is_open: bool) -> StockLevels {
        StockLevels::new(q(sealed), q(needed), is_open)
    }

    #[test]
    fn purchase_adds_stock_and_clears_need() {
        let next = reconcile(
            levels("1", "4", false),
            &StockAction::Purchase { quantity: q("2") },
        )
        .unwrap();
        assert_eq!(next, levels("3", "0", false));
    }

    #[test]
    fn set_and_clear_needed() {
        let start = levels("0", "0", true);
        let listed = reconcile(start, &StockAction::SetNeeded { quantity: q("3") }).unwrap();
        assert_eq!(listed, levels("0", "3", true));
        assert!(listed.is_on_shopping_list());

        let cleared = reconcile(listed, &StockAction::ClearNeeded).unwrap();
        assert_eq!(cleared, start);
        assert!(!cleared.is_on_shopping_list());
    }

    #[test]
    fn manual_update_overwrites_sealed_and_open_only() {
        let action = StockAction::ManualUpdate {
            sealed_quantity: q("7.5"),
            is_open: true,
            location: Some("Pantry".to_string()),
        };
        let next = reconcile(levels("2", "1", false), &action).unwrap();
        assert_eq!(next, levels("7.5", "1", true));
        assert_eq!(
            action.change().location,
            LocationChange::Set(Some("Pantry".to_string()))
        );
    }

    #[test]
    fn scan_add_reduces_need_by_barcode_quantity() {
        let next = reconcile(levels("0", "5", false), &StockAction::ScanAdd { quantity: q("3") }).unwrap();
        assert_eq!(next, levels("3", "2", false));
    }

    #[test]
    fn scan_add_floors_need_at_zero() {
        let next = reconcile(levels("0", "5", false), &StockAction::ScanAdd { quantity: q("7") }).unwrap();
        assert_eq!(next, levels("7", "0", false));
    }

    #[test]
    fn scan_add_without_need_leaves_need_at_zero() {
        let next = reconcile(levels("1", "0", false), &StockAction::ScanAdd { quantity: q("1") }).unwrap();
        assert_eq!(next, levels("2", "0", false));
    }

    #[test]
    fn scan_remove_beyond_sealed_is_refused() {
        let start = levels("2", "0", false);
        let err = reconcile(start, &StockAction::ScanRemove { quantity: q("5") }).unwrap_err();
        assert_eq!(
            err,
            Shortfall {
                requested: q("5"),
                available: q("2"),
            }
        );
    }

    #[test]
    fn scan_remove_enrolls_on_shopping_list_with_one() {
        let next = reconcile(levels("5", "0", false), &StockAction::ScanRemove { quantity: q("2") }).unwrap();
        assert_eq!(next, levels("3", "1", false));
    }

    #[test]
    fn scan_remove_keeps_existing_need() {
        let next = reconcile(levels("5", "3", false), &StockAction::ScanRemove { quantity: q("2") }).unwrap();
        assert_eq!(next, levels("3", "3", false));
    }

    #[test]
    fn scan_remove_of_exact_stock_empties_it() {
        let next = reconcile(levels("2", "0", true), &StockAction::ScanRemove { quantity: q("2") }).unwrap();
        assert_eq!(next, levels("0", "1", true));
    }

    #[test]
    fn scan_open_marks_open_and_increments_need() {
        let once = reconcile(levels("1", "0", false), &StockAction::ScanOpen).unwrap();
        assert_eq!(once, levels("1", "1", true));
        let twice = reconcile(once, &StockAction::ScanOpen).unwrap();
        assert_eq!(twice, levels("1", "2", true));
    }

    #[test]
    fn validation_rejects_zero_purchase_and_small_need() {
        assert!(StockAction::Purchase { quantity: Quantity::ZERO }.validate().is_err());
        assert!(StockAction::SetNeeded { quantity: q("0.5") }.validate().is_err());
        assert!(StockAction::SetNeeded { quantity: q("1") }.validate().is_ok());
        assert!(StockAction::ScanRemove { quantity: Quantity::ZERO }.validate().is_err());
    }

    #[test]
    fn validation_rejects_overlong_location() {
        let action = StockAction::ManualUpdate {
            sealed_quantity: Quantity::ZERO,
            is_open: false,
            location: Some("x".repeat(MAX_LOCATION_LEN + 1)),
        };
        match action.validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("location")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn any_quantity() -> impl Strategy<Value = Quantity> {
        (0i64..100_000).prop_map(|h| Quantity::from_hundredths(h).unwrap())
    }

    fn any_positive_quantity() -> impl Strategy<Value = Quantity> {
        (1i64..100_000).prop_map(|h| Quantity::from_hundredths(h).unwrap())
    }

    fn any_levels() -> impl Strategy<Value = StockLevels> {
        (any_quantity(), any_quantity(), any::<bool>())
            .prop_map(|(s, n, o)| StockLevels::new(s, n, o))
    }

    fn any_action() -> impl Strategy<Value = StockAction> {
        prop_oneof![
            any_positive_quantity().prop_map(|quantity| StockAction::Purchase { quantity }),
            any_positive_quantity().prop_map(|quantity| StockAction::SetNeeded { quantity }),
            Just(StockAction::ClearNeeded),
            Just(StockAction::ToggleOpen),
            (any_quantity(), any::<bool>()).prop_map(|(sealed_quantity, is_open)| {
                StockAction::ManualUpdate {
                    sealed_quantity,
                    is_open,
                    location: None,
                }
            }),
            any_positive_quantity().prop_map(|quantity| StockAction::ScanAdd { quantity }),
            any_positive_quantity().prop_map(|quantity| StockAction::ScanRemove { quantity }),
            Just(StockAction::ScanOpen),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of actions keeps both quantities non-negative,
        /// and a refused removal leaves the levels untouched.
        #[test]
        fn quantities_stay_non_negative(
            start in any_levels(),
            actions in prop::collection::vec(any_action(), 1..20)
        ) {
            let mut current = start;
            for action in &actions {
                match reconcile(current, action) {
                    Ok(next) => current = next,
                    Err(shortfall) => {
                        prop_assert!(matches!(action, StockAction::ScanRemove { .. }), "only ScanRemove may report a shortfall");
                        prop_assert_eq!(shortfall.available, current.sealed_quantity);
                    }
                }
                prop_assert!(current.sealed_quantity.hundredths() >= 0);
                prop_assert!(current.quantity_needed.hundredths() >= 0);
            }
        }

        #[test]
        fn purchase_always_clears_need(start in any_levels(), quantity in any_positive_quantity()) {
            let next = reconcile(start, &StockAction::Purchase { quantity }).unwrap();
            prop_assert!(next.quantity_needed.is_zero());
            prop_assert_eq!(next.sealed_quantity, start.sealed_quantity + quantity);
        }

        #[test]
        fn toggle_open_is_an_involution(start in any_levels()) {
            let once = reconcile(start, &StockAction::ToggleOpen).unwrap();
            let twice = reconcile(once, &StockAction::ToggleOpen).unwrap();
            prop_assert_eq!(once.is_open, !start.is_open);
            prop_assert_eq!(twice, start);
        }
    }
}

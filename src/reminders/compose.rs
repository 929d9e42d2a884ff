// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plain-English meal messages.

use std::collections::BTreeMap;
use std::fmt;

use crate::storage::repository::MealGroup;

/// The four meal slots of a day, in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl MealType {
    pub const ORDER: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Snacks,
        MealType::Dinner,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Snacks => "snacks",
            MealType::Dinner => "dinner",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Snacks => "Snacks",
            MealType::Dinner => "Dinner",
        }
    }

    /// Map a stored meal type name (`Breakfast`, `Evening Snack`) to a slot.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        if name.contains("breakfast") {
            Some(MealType::Breakfast)
        } else if name.contains("lunch") {
            Some(MealType::Lunch)
        } else if name.contains("snack") {
            Some(MealType::Snacks)
        } else if name.contains("dinner") {
            Some(MealType::Dinner)
        } else {
            None
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// `A`, `A and B`, `A, B, and C`.
pub fn join_items(items: &[String]) -> Option<String> {
    match items {
        [] => None,
        [only] => Some(only.clone()),
        [first, second] => Some(format!("{first} and {second}")),
        [init @ .., last] => Some(format!("{}, and {last}", init.join(", "))),
    }
}

/// `Today's Lunch is Dal and Rice`; `None` when nothing is planned.
pub fn meal_message(meal_type: MealType, items: &[String]) -> Option<String> {
    join_items(items).map(|text| format!("Today's {} is {text}", meal_type.title()))
}

/// Group a day's meals by slot. Meal types outside the four slots are dropped.
pub fn meals_by_type(groups: Vec<MealGroup>) -> BTreeMap<MealType, Vec<String>> {
    let mut meals: BTreeMap<MealType, Vec<String>> = BTreeMap::new();
    for group in groups {
        if let Some(meal_type) = MealType::from_name(&group.meal_type) {
            meals.entry(meal_type).or_default().extend(group.items);
        }
    }
    meals.retain(|_, items| !items.is_empty());
    meals
}

/// One line per planned slot, in serving order.
pub fn day_message(meals: &BTreeMap<MealType, Vec<String>>) -> String {
    MealType::ORDER
        .iter()
        .filter_map(|meal_type| {
            meals
                .get(meal_type)
                .and_then(|items| meal_message(*meal_type, items))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::RowId;

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn joins_like_a_sentence() {
        assert_eq!(join_items(&[]), None);
        assert_eq!(join_items(&items(&["Poha"])).unwrap(), "Poha");
        assert_eq!(join_items(&items(&["Dal", "Rice"])).unwrap(), "Dal and Rice");
        assert_eq!(
            join_items(&items(&["Roti", "Dal", "Sabji"])).unwrap(),
            "Roti, Dal, and Sabji"
        );
    }

    #[test]
    fn message_uses_title_case_meal_type() {
        assert_eq!(
            meal_message(MealType::Snacks, &items(&["Fruits"])).unwrap(),
            "Today's Snacks is Fruits"
        );
        assert_eq!(meal_message(MealType::Dinner, &[]), None);
    }

    #[test]
    fn names_map_to_slots() {
        assert_eq!(MealType::from_name("Breakfast"), Some(MealType::Breakfast));
        assert_eq!(MealType::from_name(" evening snack "), Some(MealType::Snacks));
        assert_eq!(MealType::from_name("brunch"), None);
    }

    #[test]
    fn day_message_follows_serving_order() {
        let groups = vec![
            MealGroup {
                meal_type_id: RowId::Int(4),
                meal_type: "dinner".into(),
                items: items(&["Roti", "Dal"]),
            },
            MealGroup {
                meal_type_id: RowId::Int(1),
                meal_type: "breakfast".into(),
                items: items(&["Poha"]),
            },
            MealGroup {
                meal_type_id: RowId::Int(9),
                meal_type: "midnight feast".into(),
                items: items(&["Cake"]),
            },
        ];

        let meals = meals_by_type(groups);
        assert_eq!(meals.len(), 2);
        assert_eq!(
            day_message(&meals),
            "Today's Breakfast is Poha\nToday's Dinner is Roti and Dal"
        );
    }
}

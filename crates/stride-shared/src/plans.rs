//! Workout and diet plan documents.
//!
//! Plans are stored on the user record as opaque JSON strings, sometimes
//! double-encoded (a JSON string whose contents are the plan). Decoding never
//! fails from the caller's point of view: [`WorkoutPlan::parse_or_template`]
//! and [`DietPlan::parse_or_template`] fall back to an empty template.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MacroGoal {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Default for MacroGoal {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 200.0,
            fats: 65.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
}

/// week label -> meal name -> foods
pub type WeekMeals = BTreeMap<String, BTreeMap<String, Vec<FoodItem>>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub goal: MacroGoal,
    #[serde(default)]
    pub weeks: WeekMeals,
}

impl DietPlan {
    pub const MEALS: [&'static str; 4] = ["Breakfast", "Lunch", "Dinner", "Snacks"];

    pub fn template() -> Self {
        let meals = Self::MEALS
            .iter()
            .map(|m| (m.to_string(), Vec::new()))
            .collect();
        let mut weeks = BTreeMap::new();
        weeks.insert("Week 1".to_string(), meals);
        Self {
            name: "My Diet Plan".to_string(),
            goal: MacroGoal::default(),
            weeks,
        }
    }

    pub fn parse_or_template(raw: Option<&str>) -> Self {
        raw.and_then(|r| decode_blob(r).ok())
            .unwrap_or_else(Self::template)
    }

    /// Sum of the known calories of every food in a week.
    pub fn week_calories(&self, week: &str) -> f64 {
        self.weeks
            .get(week)
            .map(|meals| {
                meals
                    .values()
                    .flatten()
                    .filter_map(|f| f.calories)
                    .sum::<f64>()
            })
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub rest: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub weeks: BTreeMap<String, Vec<Exercise>>,
}

impl WorkoutPlan {
    pub fn template() -> Self {
        let mut weeks = BTreeMap::new();
        weeks.insert("Week 1".to_string(), Vec::new());
        Self {
            title: "My Workout Plan".to_string(),
            description: String::new(),
            level: "beginner".to_string(),
            weeks,
        }
    }

    pub fn parse_or_template(raw: Option<&str>) -> Self {
        raw.and_then(|r| decode_blob(r).ok())
            .unwrap_or_else(Self::template)
    }

    pub fn exercise_count(&self) -> usize {
        self.weeks.values().map(Vec::len).sum()
    }
}

/// Decode a plan blob, unwrapping one level of string encoding if present.
pub fn decode_blob<T: DeserializeOwned>(raw: &str) -> Result<T, ModelError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let value = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

/// Encode a plan as the JSON string the backend stores.
pub fn encode_blob<T: Serialize>(plan: &T) -> Result<String, ModelError> {
    Ok(serde_json::to_string(plan)?)
}

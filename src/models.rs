use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutType {
    Running,
    Cycling,
    Swimming,
    Yoga,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 4] = [
        WorkoutType::Running,
        WorkoutType::Cycling,
        WorkoutType::Swimming,
        WorkoutType::Yoga,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
            WorkoutType::Swimming => "Swimming",
            WorkoutType::Yoga => "Yoga",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        WorkoutType::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown workout type '{value}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub workouts: Vec<Workout>,
}

/// Raw form fields. Kept as JSON values so a wrongly typed field becomes a
/// validation message instead of a rejected body.
#[derive(Debug, Default, Deserialize)]
pub struct AddWorkoutRequest {
    #[serde(default)]
    pub name: Value,
    #[serde(default, rename = "type")]
    pub kind: Value,
    #[serde(default)]
    pub minutes: Value,
}

#[derive(Debug, PartialEq, Eq)]
pub struct WorkoutFields {
    pub name: String,
    pub kind: String,
    pub minutes: i64,
}

impl AddWorkoutRequest {
    pub fn into_fields(self) -> Result<WorkoutFields, Vec<String>> {
        let mut errors = Vec::new();
        let name = text_field(self.name, "name", &mut errors);
        let kind = text_field(self.kind, "workout type", &mut errors);
        let minutes = match self.minutes {
            Value::Null => Some(0),
            Value::Number(number) => match number.as_i64() {
                Some(minutes) => Some(minutes),
                None if number.is_u64() => Some(i64::MAX),
                None => None,
            },
            Value::String(raw) => raw.trim().parse::<i64>().ok(),
            _ => None,
        };
        if minutes.is_none() {
            errors.push("minutes must be a whole number".to_string());
        }

        match minutes {
            Some(minutes) if errors.is_empty() => Ok(WorkoutFields {
                name,
                kind,
                minutes,
            }),
            _ => Err(errors),
        }
    }
}

fn text_field(value: Value, label: &str, errors: &mut Vec<String>) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        _ => {
            errors.push(format!("{label} must be text"));
            String::new()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectUserRequest {
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_id: u64,
    pub name: String,
    pub total_minutes: u64,
    pub workout_types: String,
    pub progress_percentage: u8,
    pub weekly_target_minutes: u32,
    pub series: ChartData,
}

#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: u64,
    pub name: String,
    pub workout_types: String,
    pub total_minutes: u64,
}

#[derive(Debug, Serialize)]
pub struct ListPageResponse {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub search: String,
    pub filter_type: String,
    pub has_previous: bool,
    pub has_next: bool,
    pub users: Vec<UserRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workout_type_parses_case_insensitively() {
        assert_eq!("running".parse::<WorkoutType>(), Ok(WorkoutType::Running));
        assert_eq!(" YOGA ".parse::<WorkoutType>(), Ok(WorkoutType::Yoga));
        assert!("Rowing".parse::<WorkoutType>().is_err());
    }

    fn request(body: serde_json::Value) -> AddWorkoutRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn loosely_typed_fields_are_normalized() {
        let fields = request(serde_json::json!({ "name": "Sam", "type": "Yoga", "minutes": "20" }))
            .into_fields()
            .unwrap();
        assert_eq!(fields.minutes, 20);

        let fields = request(serde_json::json!({ "name": null, "type": "Yoga", "minutes": 20 }))
            .into_fields()
            .unwrap();
        assert_eq!(fields.name, "");
    }

    #[test]
    fn wrongly_typed_fields_become_messages() {
        let errors = request(serde_json::json!({ "name": 5, "type": "Yoga", "minutes": 1.5 }))
            .into_fields()
            .unwrap_err();
        assert_eq!(
            errors,
            vec!["name must be text", "minutes must be a whole number"]
        );
    }

    #[test]
    fn user_serializes_in_persisted_layout() {
        let user = User {
            id: 1,
            name: "Sam".to_string(),
            workouts: vec![Workout {
                kind: WorkoutType::Yoga,
                minutes: 20,
            }],
        };
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"name":"Sam","workouts":[{"type":"Yoga","minutes":20}]}"#
        );
    }
}

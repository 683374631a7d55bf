use crate::models::{ChartData, User, UserStats, WorkoutType};

pub const DEFAULT_WEEKLY_TARGET_MINUTES: u32 = 150;

pub fn total_minutes(user: &User) -> u64 {
    user.workouts
        .iter()
        .map(|workout| u64::from(workout.minutes))
        .sum()
}

pub fn workout_type_summary(user: &User) -> String {
    distinct_types(user)
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Minutes per workout type, in the order each type first appears.
pub fn grouped_series(user: &User) -> ChartData {
    let mut groups: Vec<(WorkoutType, u64)> = Vec::new();
    for workout in &user.workouts {
        let minutes = u64::from(workout.minutes);
        match groups.iter_mut().find(|(kind, _)| *kind == workout.kind) {
            Some((_, sum)) => *sum = sum.saturating_add(minutes),
            None => groups.push((workout.kind, minutes)),
        }
    }

    ChartData {
        labels: groups.iter().map(|(kind, _)| kind.to_string()).collect(),
        values: groups.into_iter().map(|(_, sum)| sum).collect(),
    }
}

pub fn progress_percentage(user: &User, weekly_target_minutes: u32) -> u8 {
    let total = total_minutes(user);
    if weekly_target_minutes == 0 {
        return if total > 0 { 100 } else { 0 };
    }

    let percent = (total as f64 / f64::from(weekly_target_minutes) * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

pub fn user_stats(user: &User, weekly_target_minutes: u32) -> UserStats {
    UserStats {
        user_id: user.id,
        name: user.name.clone(),
        total_minutes: total_minutes(user),
        workout_types: workout_type_summary(user),
        progress_percentage: progress_percentage(user, weekly_target_minutes),
        weekly_target_minutes,
        series: grouped_series(user),
    }
}

fn distinct_types(user: &User) -> Vec<WorkoutType> {
    let mut seen = Vec::new();
    for workout in &user.workouts {
        if !seen.contains(&workout.kind) {
            seen.push(workout.kind);
        }
    }
    seen
}

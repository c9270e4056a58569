//! Daily calorie target via the Mifflin–St Jeor equation.

use crate::Gender;

/// Activity multiplier for a mostly sedentary day
pub const DEFAULT_ACTIVITY_LEVEL: f32 = 1.2;

/// Basal metabolic rate in kcal/day
///
/// BMR = 10·weight(kg) + 6.25·height(cm) − 5·age + 5 for men,
/// the same with −161 instead of +5 for women.
pub fn basal_metabolic_rate(weight_kg: f32, height_cm: i32, age: i32, gender: Gender) -> f64 {
    let constant = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg as f64 + 6.25 * height_cm as f64 - 5.0 * age as f64 + constant
}

/// Daily calorie target: BMR scaled by the activity multiplier,
/// truncated to whole calories
pub fn daily_calories(
    weight_kg: f32,
    height_cm: i32,
    age: i32,
    gender: Gender,
    activity_level: f32,
) -> i32 {
    let bmr = basal_metabolic_rate(weight_kg, height_cm, age, gender);
    (bmr * activity_level as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_male_reference_values() {
        // BMR = 10*70 + 6.25*175 - 5*30 + 5 = 1703.75
        let bmr = basal_metabolic_rate(70.0, 175, 30, Gender::Male);
        assert!((bmr - 1703.75).abs() < 1e-9);

        // 1703.75 * 1.2 = 2044.5, truncated
        assert_eq!(
            daily_calories(70.0, 175, 30, Gender::Male, DEFAULT_ACTIVITY_LEVEL),
            2044
        );
    }

    #[test]
    fn test_female_constant_term() {
        // Same inputs differ from male by exactly 166 kcal of BMR
        let male = basal_metabolic_rate(60.0, 165, 25, Gender::Male);
        let female = basal_metabolic_rate(60.0, 165, 25, Gender::Female);
        assert!((male - female - 166.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_scales_target() {
        let sedentary = daily_calories(70.0, 175, 30, Gender::Male, 1.2);
        let active = daily_calories(70.0, 175, 30, Gender::Male, 1.55);
        assert!(active > sedentary);
    }
}

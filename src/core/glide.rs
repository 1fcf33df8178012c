use super::types::{AssetClass, PortfolioAllocation};

/// Largest yearly move toward the conservative target.
pub const MAX_GLIDE_STEP: f64 = 0.05;

/// Target bonds+cash fraction at `age`.
pub fn target_conservative_fraction(age: u32, retirement_age: u32) -> f64 {
    if age >= retirement_age {
        let years_retired = (age - retirement_age) as f64;
        (0.40 + 0.01 * years_retired).min(0.60)
    } else {
        (age as f64 * 0.005).clamp(0.10, 0.40)
    }
}

/// Moves at most [`MAX_GLIDE_STEP`] of weight from the growth classes (pro
/// rata) into bonds. Allocations already at or above the target come back
/// unchanged.
pub fn apply_glide_path(
    allocation: &PortfolioAllocation,
    age: u32,
    retirement_age: u32,
) -> PortfolioAllocation {
    let target = target_conservative_fraction(age, retirement_age);
    let conservative = allocation.conservative_weight();
    if conservative >= target {
        return *allocation;
    }

    let growth = allocation.growth_weight();
    let shift = MAX_GLIDE_STEP.min(target - conservative).min(growth);
    if shift <= 0.0 {
        return *allocation;
    }

    let mut glided = *allocation;
    for class in AssetClass::ALL.into_iter().filter(|c| c.is_growth()) {
        let weight = allocation.weight(class);
        glided.set(class, (weight - shift * weight / growth).max(0.0));
    }
    glided.bonds += shift;
    glided
}
